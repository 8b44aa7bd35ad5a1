//! # Synthetic Keystroke Injector
//!
//! Simulates discrete key-down/up events per character, for legacy controls
//! that ignore Unicode input events and only react to real key traffic.
//! Characters without a key mapping fail the attempt with a partial count;
//! the clipboard fallback picks those texts up.

use crate::error::InjectionError;
use crate::profile::CompatibilityProfile;
use crate::types::{InjectionStrategy, KeyCode, KeyDirection};
use crate::{InputSimulator, TextInjector};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

pub struct SyntheticKeystrokeInjector {
    simulator: Arc<dyn InputSimulator>,
}

impl SyntheticKeystrokeInjector {
    pub fn new(simulator: Arc<dyn InputSimulator>) -> Self {
        Self { simulator }
    }

    /// Map a character to a single key press, if one exists.
    fn key_for(ch: char) -> Option<KeyCode> {
        match ch {
            '\n' => Some(KeyCode::Return),
            '\t' => Some(KeyCode::Tab),
            c if c.is_ascii_graphic() || c == ' ' => Some(KeyCode::Char(c)),
            _ => None,
        }
    }
}

#[async_trait]
impl TextInjector for SyntheticKeystrokeInjector {
    fn strategy(&self) -> InjectionStrategy {
        InjectionStrategy::SyntheticKeystroke
    }

    async fn is_available(&self) -> bool {
        self.simulator.is_available().await
    }

    async fn inject_text(
        &self,
        text: &str,
        profile: &CompatibilityProfile,
    ) -> Result<(), InjectionError> {
        let total = text.chars().count();
        let delay = Duration::from_millis(profile.inter_char_delay_ms);
        let mut sent = 0usize;

        trace!(
            total,
            simulator = self.simulator.name(),
            "Synthetic keystroke injection starting"
        );

        for ch in text.chars() {
            let key = match Self::key_for(ch) {
                Some(key) => key,
                None => {
                    return Err(InjectionError::PartialInjection {
                        injected: sent,
                        total,
                    });
                }
            };

            if let Err(e) = self.simulator.key_event(key, KeyDirection::Click).await {
                if sent > 0 {
                    return Err(InjectionError::PartialInjection {
                        injected: sent,
                        total,
                    });
                }
                return Err(e);
            }
            sent += 1;

            if !delay.is_zero() && sent < total {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(())
    }
}
