use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("could not read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported media type: {0}")]
    UnsupportedMediaKind(String),

    #[error("read {generation} was superseded by selection {latest}")]
    StaleIngestion { generation: u64, latest: u64 },

    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
}

impl MediaError {
    /// Stale results are dropped silently rather than shown to the user.
    pub fn is_stale(&self) -> bool {
        matches!(self, MediaError::StaleIngestion { .. })
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;

/// Failures of the external AI collaborators. The message is meant for the user.
#[derive(Debug, Error)]
pub enum AssistError {
    #[error("invalid request: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Failed(String),
}
