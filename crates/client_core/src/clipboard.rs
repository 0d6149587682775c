use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard is unavailable")]
    Unavailable,
    #[error("clipboard access denied: {0}")]
    Denied(String),
    #[error("{0}")]
    Read(String),
}

#[async_trait]
pub trait ClipboardSource: Send + Sync {
    async fn read_text(&self) -> Result<String, ClipboardError>;
}

pub struct MissingClipboard;

#[async_trait]
impl ClipboardSource for MissingClipboard {
    async fn read_text(&self) -> Result<String, ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}
