//! # Clipboard Paste Injector
//!
//! Delivers text atomically: snapshot the clipboard, place the outgoing
//! text, synthesize the platform paste chord, wait a bounded settle delay
//! for the target to consume the paste, then restore the snapshot. The
//! restore runs on every exit path via [`crate::clipboard_guard::ClipboardGuard`].

use crate::clipboard_guard::ClipboardGuard;
use crate::error::InjectionError;
use crate::profile::{CompatibilityProfile, KnownLimitation};
use crate::types::{InjectionConfig, InjectionStrategy, KeyCode, KeyDirection};
use crate::{ClipboardAccess, InputSimulator, TextInjector};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

pub struct ClipboardPasteInjector {
    config: InjectionConfig,
    simulator: Arc<dyn InputSimulator>,
    clipboard: Arc<dyn ClipboardAccess>,
}

impl ClipboardPasteInjector {
    pub fn new(
        config: InjectionConfig,
        simulator: Arc<dyn InputSimulator>,
        clipboard: Arc<dyn ClipboardAccess>,
    ) -> Self {
        Self {
            config,
            simulator,
            clipboard,
        }
    }

    /// `shifted` selects the terminal-style Ctrl+Shift+V chord for targets
    /// where plain Ctrl+V is bound to something else.
    async fn send_paste_chord(&self, shifted: bool) -> Result<(), InjectionError> {
        let modifier = if cfg!(target_os = "macos") {
            KeyCode::Meta
        } else {
            KeyCode::Control
        };

        self.simulator.key_event(modifier, KeyDirection::Press).await?;
        if shifted {
            self.simulator
                .key_event(KeyCode::Shift, KeyDirection::Press)
                .await?;
        }
        let paste = self
            .simulator
            .key_event(KeyCode::Char('v'), KeyDirection::Click)
            .await;
        // Release the modifiers even when the paste key failed, or the user
        // is left with stuck Ctrl/Cmd/Shift keys.
        let mut release = Ok(());
        if shifted {
            release = self
                .simulator
                .key_event(KeyCode::Shift, KeyDirection::Release)
                .await;
        }
        let release_modifier = self
            .simulator
            .key_event(modifier, KeyDirection::Release)
            .await;
        paste?;
        release?;
        release_modifier
    }
}

#[async_trait]
impl TextInjector for ClipboardPasteInjector {
    fn strategy(&self) -> InjectionStrategy {
        InjectionStrategy::ClipboardPaste
    }

    async fn is_available(&self) -> bool {
        self.simulator.is_available().await
    }

    async fn inject_text(
        &self,
        text: &str,
        profile: &CompatibilityProfile,
    ) -> Result<(), InjectionError> {
        let start = Instant::now();
        trace!(
            chars = text.chars().count(),
            "Clipboard paste injection starting"
        );

        let guard = ClipboardGuard::stage(self.clipboard.clone(), text).await?;

        let shifted = profile.has_limitation(KnownLimitation::PasteShortcutIntercepted);
        let paste_result = self.send_paste_chord(shifted).await;

        // Give the target time to read the clipboard before it changes back,
        // whether or not the chord went through.
        tokio::time::sleep(self.config.settle_delay()).await;

        if let Err(e) = guard.restore().await {
            warn!("Clipboard restore failed: {}", e);
        }

        paste_result?;

        debug!(
            "Clipboard paste completed in {}ms",
            start.elapsed().as_millis()
        );
        Ok(())
    }
}
