use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{NoteError, NoteResult};

pub const MAX_TITLE_LEN: usize = 255;
pub const PREVIEW_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn summary(&self) -> NoteSummary {
        NoteSummary {
            id: self.id,
            title: self.title.clone(),
            content: preview(&self.content),
            tags: self.tags.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A note as shown in the list view, with the content cut to a preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied fields for creating or replacing a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl NoteDraft {
    pub fn validate(&self) -> NoteResult<()> {
        if self.title.trim().is_empty() {
            return Err(NoteError::Validation("The title field is required".to_string()));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(NoteError::Validation(format!(
                "The title may not be greater than {} characters",
                MAX_TITLE_LEN
            )));
        }
        if self.content.trim().is_empty() {
            return Err(NoteError::Validation("The content field is required".to_string()));
        }
        Ok(())
    }

    /// Tags trimmed, with empty entries dropped.
    pub fn normalized_tags(&self) -> Vec<String> {
        self.tags
            .iter()
            .flatten()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect()
    }
}

fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_LEN) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            content: content.to_string(),
            tags: None,
        }
    }

    #[test]
    fn test_validate_requires_title_and_content() {
        assert!(draft("Title", "Body").validate().is_ok());
        assert!(matches!(draft(" ", "Body").validate(), Err(NoteError::Validation(_))));
        assert!(matches!(draft("Title", "").validate(), Err(NoteError::Validation(_))));
    }

    #[test]
    fn test_validate_title_length() {
        assert!(draft(&"x".repeat(MAX_TITLE_LEN), "Body").validate().is_ok());
        assert!(draft(&"x".repeat(MAX_TITLE_LEN + 1), "Body").validate().is_err());
    }

    #[test]
    fn test_normalized_tags() {
        let mut d = draft("Title", "Body");
        d.tags = Some(vec![" rust ".into(), "".into(), "  ".into(), "notes".into()]);
        assert_eq!(d.normalized_tags(), vec!["rust", "notes"]);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let short = "é".repeat(PREVIEW_LEN);
        assert_eq!(preview(&short), short);

        let long = "é".repeat(PREVIEW_LEN + 1);
        let cut = preview(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), PREVIEW_LEN + 3);
    }
}
