//! The enhancement relay.
//!
//! A request is validated, turned into a prompt and forwarded to the upstream
//! provider. Streamed replies are reframed into [`RelayEvent`]s, a client
//! contract that does not depend on the upstream's wire grammar:
//!
//! - zero or more [`RelayEvent::Content`] fragments, one per upstream delta,
//!   in upstream order;
//! - exactly one terminal event, [`RelayEvent::Done`] or [`RelayEvent::Error`].
//!
//! Upstream lines that are blank, not `data: ` lines, or not valid JSON are
//! skipped. The relay never retries and imposes no timeout of its own.
use async_stream::stream;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::errors::{RelayError, RelayResult};
use crate::models::enhancement::{EnhancementRequest, EnhancementResult};
use crate::providers::base::{LineStream, Provider};
use crate::providers::utils::openai_delta_content;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// One event sent to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// Append this fragment to the text received so far
    Content(String),
    /// The reply is complete
    Done,
    /// The reply failed; already delivered fragments stand
    Error(String),
}

impl RelayEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error(_))
    }

    pub fn as_content(&self) -> Option<&str> {
        match self {
            Self::Content(text) => Some(text),
            _ => None,
        }
    }

    /// Frame as a server-sent event: `data: <payload>\n\n`
    pub fn to_sse(&self) -> String {
        let payload = match self {
            Self::Content(text) => json!({ "content": text }).to_string(),
            Self::Done => DONE_SENTINEL.to_string(),
            Self::Error(message) => json!({ "error": message }).to_string(),
        };
        format!("{}{}\n\n", DATA_PREFIX, payload)
    }
}

pub type RelayStream = BoxStream<'static, RelayEvent>;

/// What a single upstream line means to the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamChunk {
    Delta(String),
    Done,
    /// Blank lines, comments, keep-alives and deltas without text
    Ignored,
    Malformed(String),
}

pub fn parse_line(line: &str) -> UpstreamChunk {
    let line = line.trim();
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return UpstreamChunk::Ignored;
    };
    if payload == DONE_SENTINEL {
        return UpstreamChunk::Done;
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(chunk) => match openai_delta_content(&chunk) {
            Some(text) if !text.is_empty() => UpstreamChunk::Delta(text.to_string()),
            _ => UpstreamChunk::Ignored,
        },
        Err(e) => UpstreamChunk::Malformed(e.to_string()),
    }
}

/// Turn upstream lines into client events.
///
/// Consumption stops at `[DONE]` or at the first line error, and the line
/// stream is dropped before the terminal event is handed out. A stream that
/// ends without `[DONE]` still finishes with [`RelayEvent::Done`].
pub fn reframe(lines: LineStream) -> RelayStream {
    Box::pin(stream! {
        let mut lines = lines;
        let mut fragments = 0usize;

        let terminal = loop {
            match lines.next().await {
                Some(Ok(line)) => match parse_line(&line) {
                    UpstreamChunk::Delta(text) => {
                        fragments += 1;
                        yield RelayEvent::Content(text);
                    }
                    UpstreamChunk::Done => break RelayEvent::Done,
                    UpstreamChunk::Ignored => {}
                    UpstreamChunk::Malformed(reason) => {
                        debug!(%reason, "skipping malformed upstream chunk");
                    }
                },
                Some(Err(e)) => {
                    warn!(error = %e, fragments, "upstream stream failed");
                    break RelayEvent::Error(e.to_string());
                }
                None => {
                    debug!(fragments, "upstream closed without a done marker");
                    break RelayEvent::Done;
                }
            }
        };

        drop(lines);
        debug!(fragments, "relay stream finished");
        yield terminal;
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Complete,
    Stream,
}

pub enum Enhancement {
    Complete(EnhancementResult),
    Stream(RelayStream),
}

/// Forwards enhancement requests to a [`Provider`].
pub struct Relay {
    provider: Box<dyn Provider>,
}

impl Relay {
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Validate raw client input and run it in the requested mode.
    pub async fn enhance(&self, content: &str, action: &str, mode: Mode) -> RelayResult<Enhancement> {
        let request = EnhancementRequest::new(content, action)?;
        match mode {
            Mode::Complete => self.complete(&request).await.map(Enhancement::Complete),
            Mode::Stream => self.stream(&request).await.map(Enhancement::Stream),
        }
    }

    pub async fn complete(&self, request: &EnhancementRequest) -> RelayResult<EnhancementResult> {
        let prompt = request.prompt()?;
        info!(action = %request.action(), "requesting completion");

        let result = self.provider.complete(&prompt).await?;
        Ok(EnhancementResult {
            result,
            action: request.action(),
        })
    }

    /// Open a streamed enhancement.
    ///
    /// Only validation and configuration failures are returned as `Err`. A
    /// failure to connect becomes a stream holding a single terminal error.
    pub async fn stream(&self, request: &EnhancementRequest) -> RelayResult<RelayStream> {
        let prompt = request.prompt()?;
        info!(action = %request.action(), "opening relay stream");

        match self.provider.stream(&prompt).await {
            Ok(lines) => Ok(reframe(lines)),
            Err(e) if e.is_pre_connect() => Err(e),
            Err(e) => {
                warn!(error = %e, "failed to open upstream stream");
                Ok(failed(e))
            }
        }
    }
}

fn failed(error: RelayError) -> RelayStream {
    Box::pin(stream::once(async move { RelayEvent::Error(error.to_string()) }))
}
