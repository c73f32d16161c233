use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use strum_macros::{Display, EnumIter, EnumString};

use crate::errors::{RelayError, RelayResult};
use crate::prompt_template::load_prompt;

/// The enhancements a client may ask for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Summarize,
    Improve,
    GenerateTags,
}

impl Action {
    pub fn instruction(&self) -> &'static str {
        match self {
            Action::Summarize => "Please provide a concise summary of the following text:",
            Action::Improve => "Please improve the following text for clarity, grammar, and style:",
            Action::GenerateTags => "Generate 5-10 relevant tags for the following text (return only the tags separated by commas):",
        }
    }

    /// Instruction, a blank line, then the content verbatim.
    pub fn prompt(&self, content: &str) -> RelayResult<String> {
        let template = format!("{}\n\n{{{{ content }}}}", self.instruction());
        load_prompt(&template, &json!({ "content": content }))
            .map_err(|e| RelayError::Configuration(format!("Failed to render prompt: {}", e)))
    }

    pub fn parse(action: &str) -> RelayResult<Self> {
        Action::from_str(action).map_err(|_| {
            RelayError::Validation(format!(
                "Unsupported action '{}', expected one of summarize, improve, generate_tags",
                action
            ))
        })
    }
}

/// Build the upstream prompt for a wire-level action tag.
pub fn build_prompt(action: &str, content: &str) -> RelayResult<String> {
    Action::parse(action)?.prompt(content)
}

/// A validated request to enhance some text.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementRequest {
    content: String,
    action: Action,
}

impl EnhancementRequest {
    pub fn new(content: impl Into<String>, action: &str) -> RelayResult<Self> {
        let content = content.into();
        let action = Action::parse(action)?;
        if content.trim().is_empty() {
            return Err(RelayError::Validation("Content must not be empty".to_string()));
        }
        Ok(Self { content, action })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn prompt(&self) -> RelayResult<String> {
        self.action.prompt(&self.content)
    }
}

/// Body returned by a non-streaming enhancement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancementResult {
    pub result: String,
    pub action: Action,
}
