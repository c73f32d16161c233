use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::RelayResult;

/// Raw text lines read from an upstream response body, in wire order.
///
/// The stream is single-pass. Dropping it releases the upstream connection.
pub type LineStream = BoxStream<'static, RelayResult<String>>;

/// Base trait for chat-completion providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send the prompt as a single user message and wait for the full reply text
    async fn complete(&self, prompt: &str) -> RelayResult<String>;

    /// Send the prompt with streaming enabled and hand back the raw response lines
    async fn stream(&self, prompt: &str) -> RelayResult<LineStream>;
}
