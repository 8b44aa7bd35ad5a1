//! Clipboard access via arboard.
//!
//! The engine works in bytes; this backend scopes itself to UTF-8 text,
//! which is the only content type the delivery path produces. Arboard calls
//! are blocking and construct a fresh handle per operation, so each runs
//! under `spawn_blocking`.

use async_trait::async_trait;
use skald_text_injection::error::InjectionError;
use skald_text_injection::ClipboardAccess;

#[derive(Debug, Default)]
pub struct ArboardClipboard;

impl ArboardClipboard {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClipboardAccess for ArboardClipboard {
    async fn contents(&self) -> Result<Vec<u8>, InjectionError> {
        let result = tokio::task::spawn_blocking(|| {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| InjectionError::Other(format!("clipboard open failed: {}", e)))?;
            match clipboard.get_text() {
                Ok(text) => Ok(text.into_bytes()),
                // An empty or non-text clipboard is an empty snapshot, not
                // an error.
                Err(arboard::Error::ContentNotAvailable) => Ok(Vec::new()),
                Err(e) => Err(InjectionError::Other(format!(
                    "clipboard read failed: {}",
                    e
                ))),
            }
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(e) => Err(InjectionError::Other(format!("clipboard task failed: {}", e))),
        }
    }

    async fn set_contents(&self, bytes: Vec<u8>) -> Result<(), InjectionError> {
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let result = tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| InjectionError::Other(format!("clipboard open failed: {}", e)))?;
            clipboard
                .set_text(text)
                .map_err(|e| InjectionError::Other(format!("clipboard write failed: {}", e)))
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(e) => Err(InjectionError::Other(format!("clipboard task failed: {}", e))),
        }
    }
}
