use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Clip not found: {0}")]
    ClipNotFound(uuid::Uuid),

    #[error("Track not found: {0}")]
    TrackNotFound(uuid::Uuid),

    #[error("Unsupported media kind: {0}")]
    UnsupportedMediaKind(String),

    #[error("Overlap detected")]
    OverlapDetected,

    #[error("Invalid clip duration: {0}")]
    InvalidDuration(crate::types::TimeUs),

    #[error("Invalid pixel scale: {0}")]
    InvalidPixelScale(f64),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

pub type Result<T> = std::result::Result<T, CoreError>;
