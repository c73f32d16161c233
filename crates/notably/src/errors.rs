use thiserror::Error;

/// Failures of an enhancement call, from validation through the upstream stream.
///
/// Malformed upstream chunks are not represented here: the reframer skips them.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelayError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Connection error: {0}")]
    Connection(String),
}

impl RelayError {
    /// Errors raised before any upstream connection was attempted.
    pub fn is_pre_connect(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Configuration(_))
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RelayError::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => RelayError::Connection(err.to_string()),
        }
    }
}

pub type RelayResult<T> = Result<T, RelayError>;

/// Failures of the notes store.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NoteError {
    #[error("Note {0} not found")]
    NotFound(u64),

    #[error("Note {0} belongs to another user")]
    Forbidden(u64),

    #[error("Invalid note: {0}")]
    Validation(String),
}

pub type NoteResult<T> = Result<T, NoteError>;
