use axum::http::HeaderName;
use notably::{notes::NoteStore, relay::Relay};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub notes: Arc<dyn NoteStore>,
    pub identity_header: HeaderName,
}

impl AppState {
    pub fn new(relay: Relay, notes: Arc<dyn NoteStore>, identity_header: HeaderName) -> Self {
        Self {
            relay: Arc::new(relay),
            notes,
            identity_header,
        }
    }
}
