use arboard::Clipboard;
use async_trait::async_trait;
use client_core::{ClipboardError, ClipboardSource};

/// Reads the OS clipboard on the blocking pool.
pub struct SystemClipboard;

fn read_clipboard_text() -> Result<String, ClipboardError> {
    let mut clipboard =
        Clipboard::new().map_err(|err| ClipboardError::Read(format!("clipboard unavailable: {err}")))?;
    clipboard.get_text().map_err(|err| match err {
        arboard::Error::ContentNotAvailable => {
            ClipboardError::Read("clipboard does not contain text".to_string())
        }
        arboard::Error::ClipboardOccupied => {
            ClipboardError::Denied("clipboard is held by another application".to_string())
        }
        other => ClipboardError::Read(other.to_string()),
    })
}

#[async_trait]
impl ClipboardSource for SystemClipboard {
    async fn read_text(&self) -> Result<String, ClipboardError> {
        tokio::task::spawn_blocking(read_clipboard_text)
            .await
            .map_err(|err| ClipboardError::Read(err.to_string()))?
    }
}
