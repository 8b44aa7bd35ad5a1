//! # Scoped Clipboard Acquisition
//!
//! The clipboard is the one resource this engine shares with every other
//! process on the machine. [`ClipboardGuard`] owns it for the short window
//! between save and restore: staging snapshots the current contents and
//! places the outgoing text, and restoration is guaranteed on every exit
//! path — explicit [`ClipboardGuard::restore`] on the normal paths, a
//! spawned restore task when the guard is dropped mid-flight (failure,
//! cancellation, fault). Leaving the user's clipboard polluted is a
//! user-visible regression distinct from injection failure.

use crate::error::InjectionError;
use crate::ClipboardAccess;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ClipboardGuard {
    clipboard: Arc<dyn ClipboardAccess>,
    saved: Option<Vec<u8>>,
    restored: bool,
}

impl std::fmt::Debug for ClipboardGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardGuard")
            .field("saved", &self.saved.as_ref().map(|b| b.len()))
            .field("restored", &self.restored)
            .finish_non_exhaustive()
    }
}

impl ClipboardGuard {
    /// Snapshot the current clipboard contents and place `text` on the
    /// clipboard, verifying the write landed.
    ///
    /// A verification mismatch means another process raced us; the write is
    /// retried once before surfacing
    /// [`InjectionError::ClipboardConflict`]. Even on the error path the
    /// returned-guard-to-be has already been armed, so the prior contents
    /// are restored.
    pub async fn stage(
        clipboard: Arc<dyn ClipboardAccess>,
        text: &str,
    ) -> Result<Self, InjectionError> {
        let saved = match clipboard.contents().await {
            Ok(bytes) => {
                debug!("Saved prior clipboard ({} bytes)", bytes.len());
                Some(bytes)
            }
            Err(e) => {
                debug!("Could not read prior clipboard: {}", e);
                None
            }
        };

        let guard = Self {
            clipboard,
            saved,
            restored: false,
        };

        let payload = text.as_bytes();
        if let Err(first) = Self::write_verified(guard.clipboard.as_ref(), payload).await {
            debug!("Clipboard staging raced ({}), retrying once", first);
            Self::write_verified(guard.clipboard.as_ref(), payload).await?;
        }

        Ok(guard)
    }

    async fn write_verified(
        clipboard: &dyn ClipboardAccess,
        payload: &[u8],
    ) -> Result<(), InjectionError> {
        clipboard.set_contents(payload.to_vec()).await?;
        let current = clipboard.contents().await?;
        if current != payload {
            return Err(InjectionError::ClipboardConflict { phase: "stage" });
        }
        Ok(())
    }

    /// Put the snapshot back. Consumes the guard; the drop safety net is
    /// disarmed first so restoration runs exactly once.
    pub async fn restore(mut self) -> Result<(), InjectionError> {
        self.restored = true;
        if let Some(saved) = self.saved.take() {
            self.clipboard.set_contents(saved).await?;
            debug!("Clipboard restored");
        }
        Ok(())
    }
}

impl Drop for ClipboardGuard {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Some(saved) = self.saved.take() {
            let clipboard = self.clipboard.clone();
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        if let Err(e) = clipboard.set_contents(saved).await {
                            warn!("Clipboard restore on drop failed: {}", e);
                        }
                    });
                }
                Err(_) => {
                    warn!("No async runtime at guard drop; clipboard left unrestored");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MemoryClipboard {
        contents: Mutex<Vec<u8>>,
        writes: AtomicUsize,
        /// When set, every read returns this instead of the stored value,
        /// simulating another process racing the clipboard.
        race_with: Mutex<Option<Vec<u8>>>,
    }

    impl MemoryClipboard {
        fn new(initial: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                contents: Mutex::new(initial.to_vec()),
                writes: AtomicUsize::new(0),
                race_with: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ClipboardAccess for MemoryClipboard {
        async fn contents(&self) -> Result<Vec<u8>, InjectionError> {
            if let Some(raced) = self.race_with.lock().clone() {
                return Ok(raced);
            }
            Ok(self.contents.lock().clone())
        }

        async fn set_contents(&self, bytes: Vec<u8>) -> Result<(), InjectionError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            *self.contents.lock() = bytes;
            Ok(())
        }
    }

    #[tokio::test]
    async fn stage_and_restore_round_trip() {
        let clipboard = MemoryClipboard::new(b"previous contents");
        let guard = ClipboardGuard::stage(clipboard.clone(), "injected").await.unwrap();

        assert_eq!(*clipboard.contents.lock(), b"injected".to_vec());

        guard.restore().await.unwrap();
        assert_eq!(*clipboard.contents.lock(), b"previous contents".to_vec());
    }

    #[tokio::test]
    async fn conflict_is_retried_once_then_surfaced() {
        let clipboard = MemoryClipboard::new(b"previous");
        // Reads after staging started see a foreign value.
        *clipboard.race_with.lock() = Some(b"foreign".to_vec());

        let err = ClipboardGuard::stage(clipboard.clone(), "injected")
            .await
            .expect_err("staging against a racing clipboard must fail");
        assert_eq!(err, InjectionError::ClipboardConflict { phase: "stage" });
        // One initial write plus exactly one retry.
        assert_eq!(clipboard.writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn drop_without_restore_spawns_restoration() {
        let clipboard = MemoryClipboard::new(b"before");
        {
            let _guard = ClipboardGuard::stage(clipboard.clone(), "transient").await.unwrap();
            // Guard dropped here without an explicit restore.
        }
        // Let the spawned restore task run.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(*clipboard.contents.lock(), b"before".to_vec());
    }

    #[tokio::test]
    async fn failed_staging_still_restores_prior_contents() {
        let clipboard = MemoryClipboard::new(b"before");
        *clipboard.race_with.lock() = Some(b"foreign".to_vec());

        let _ = ClipboardGuard::stage(clipboard.clone(), "never lands").await;
        // The guard constructed inside stage was dropped on the error path.
        clipboard.race_with.lock().take();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(*clipboard.contents.lock(), b"before".to_vec());
    }
}
