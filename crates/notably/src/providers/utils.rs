use std::fmt::Display;

use async_stream::stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};

use super::base::LineStream;
use crate::errors::{RelayError, RelayResult};

/// Build the chat-completion payload for a single user prompt.
pub fn chat_payload(model: &str, prompt: &str, stream: bool) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "user", "content": prompt }
        ],
        "stream": stream
    })
}

/// Pull the first choice's message text out of a non-streaming response
pub fn openai_response_text(response: &Value) -> Option<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(String::from)
}

/// Pull the first choice's delta text out of a streamed chunk
pub fn openai_delta_content(chunk: &Value) -> Option<&str> {
    chunk["choices"][0]["delta"]["content"].as_str()
}

/// Best-effort human readable message from an error response body.
///
/// OpenAI-compatible endpoints answer `{"error": {"message": ...}}`; anything
/// else is passed through as raw text.
pub fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Split a byte stream into text lines.
///
/// Lines may straddle chunk boundaries. The terminating `\n` is removed, a
/// trailing `\r` is left for the caller to trim. A final unterminated line is
/// yielded when the body ends. A transport error is yielded once as
/// [`RelayError::Connection`] and ends the stream.
pub fn split_lines<S, E>(bytes: S) -> LineStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    let err: RelayResult<String> =
                        Err(RelayError::Connection(format!("Stream error: {}", e)));
                    yield err;
                    return;
                }
            };
            buffer.extend_from_slice(&chunk);

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                yield Ok(String::from_utf8_lossy(&line[..pos]).into_owned());
            }
        }

        if !buffer.is_empty() {
            yield Ok(String::from_utf8_lossy(&buffer).into_owned());
        }
    })
}
