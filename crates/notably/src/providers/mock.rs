use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_stream::stream;
use async_trait::async_trait;

use crate::errors::{RelayError, RelayResult};
use crate::providers::base::{LineStream, Provider};

/// A mock provider that replays a scripted upstream for testing.
///
/// Counts calls per mode and how many line streams have been released.
#[derive(Default)]
pub struct MockProvider {
    completion: Option<RelayResult<String>>,
    lines: Mutex<Vec<RelayResult<String>>>,
    connect_error: Option<RelayError>,
    hold_open: bool,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub complete_calls: Arc<AtomicUsize>,
    pub stream_calls: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completion(mut self, text: &str) -> Self {
        self.completion = Some(Ok(text.to_string()));
        self
    }

    pub fn with_lines(self, lines: &[&str]) -> Self {
        *self.lines.lock().unwrap() = lines.iter().map(|l| Ok(l.to_string())).collect();
        self
    }

    pub fn with_line_error(self, error: RelayError) -> Self {
        self.lines.lock().unwrap().push(Err(error));
        self
    }

    pub fn with_connect_error(mut self, error: RelayError) -> Self {
        self.completion = Some(Err(error.clone()));
        self.connect_error = Some(error);
        self
    }

    /// Keep the line stream pending after the scripted lines, like an idle connection
    pub fn held_open(mut self) -> Self {
        self.hold_open = true;
        self
    }
}

struct ReleaseGuard(Arc<AtomicUsize>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, prompt: &str) -> RelayResult<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.completion.clone().unwrap_or_else(|| Ok(String::new()))
    }

    async fn stream(&self, prompt: &str) -> RelayResult<LineStream> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(error) = &self.connect_error {
            return Err(error.clone());
        }

        let lines = std::mem::take(&mut *self.lines.lock().unwrap());
        let guard = ReleaseGuard(self.released.clone());
        let hold_open = self.hold_open;

        Ok(Box::pin(stream! {
            let _guard = guard;
            for line in lines {
                yield line;
            }
            if hold_open {
                futures::future::pending::<()>().await;
            }
        }))
    }
}
