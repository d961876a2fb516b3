use thiserror::Error;

use crate::dom::page::PageError;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Node could not be started or the script was not found
    #[error("Failed to spawn browser server '{script}': {source}")]
    Spawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Pipe to the browser server broke
    #[error("Browser session I/O error: {0}")]
    Io(String),

    #[error("Failed to parse JSON from {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize {context}: {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The server answered `ok: false`
    #[error("Browser command '{command}' failed: {error}")]
    Protocol { command: String, error: String },
}

impl From<SessionError> for PageError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Protocol { command, error } => PageError::Protocol { command, error },
            other => PageError::Io(other.to_string()),
        }
    }
}
