//! # Direct Unicode Injector
//!
//! Sends each character as a synthetic Unicode input event. Codepoints
//! outside the Basic Multilingual Plane become two consecutive UTF-16
//! code-unit events, and events are spaced by the profile's inter-character
//! delay so slow input queues are not overrun.

use crate::error::InjectionError;
use crate::profile::CompatibilityProfile;
use crate::types::InjectionStrategy;
use crate::{InputSimulator, TextInjector};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

pub struct DirectUnicodeInjector {
    simulator: Arc<dyn InputSimulator>,
}

impl DirectUnicodeInjector {
    pub fn new(simulator: Arc<dyn InputSimulator>) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl TextInjector for DirectUnicodeInjector {
    fn strategy(&self) -> InjectionStrategy {
        InjectionStrategy::DirectUnicode
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
        let mut units = [0u16; 2];

        trace!(
            total,
            delay_ms = profile.inter_char_delay_ms,
            simulator = self.simulator.name(),
            "Direct unicode injection starting"
        );

        for ch in text.chars() {
            for unit in ch.encode_utf16(&mut units).iter() {
                if let Err(e) = self.simulator.send_unicode_unit(*unit).await {
                    // A mid-string failure leaves a partial prefix in the
                    // target; the clipboard fallback re-delivers atomically.
                    if sent > 0 {
                        return Err(InjectionError::PartialInjection {
                            injected: sent,
                            total,
                        });
                    }
                    return Err(e);
                }
            }
            sent += 1;

            if !delay.is_zero() && sent < total {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ApplicationCategory;
    use crate::types::{KeyCode, KeyDirection};
    use parking_lot::Mutex;

    /// Records every UTF-16 unit; optionally fails after N units.
    struct RecordingSimulator {
        units: Mutex<Vec<u16>>,
        fail_after: Option<usize>,
    }

    impl RecordingSimulator {
        fn new(fail_after: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                units: Mutex::new(Vec::new()),
                fail_after,
            })
        }

        fn typed(&self) -> String {
            String::from_utf16(&self.units.lock()).unwrap()
        }
    }

    #[async_trait]
    impl InputSimulator for RecordingSimulator {
        async fn send_unicode_unit(&self, unit: u16) -> Result<(), InjectionError> {
            let mut units = self.units.lock();
            if let Some(limit) = self.fail_after {
                if units.len() >= limit {
                    return Err(InjectionError::PermissionDenied {
                        reason: "input queue closed".into(),
                    });
                }
            }
            units.push(unit);
            Ok(())
        }

        async fn key_event(
            &self,
            _key: KeyCode,
            _direction: KeyDirection,
        ) -> Result<(), InjectionError> {
            Ok(())
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn profile() -> CompatibilityProfile {
        CompatibilityProfile {
            inter_char_delay_ms: 0,
            ..CompatibilityProfile::safe_default(ApplicationCategory::Generic)
        }
    }

    #[tokio::test]
    async fn surrogate_pairs_become_two_consecutive_units() {
        let simulator = RecordingSimulator::new(None);
        let injector = DirectUnicodeInjector::new(simulator.clone());

        injector.inject_text("Hi 👋", &profile()).await.unwrap();

        // 3 BMP chars + one pair.
        assert_eq!(simulator.units.lock().len(), 5);
        assert_eq!(simulator.typed(), "Hi 👋");
    }

    #[tokio::test]
    async fn mid_string_failure_reports_partial_injection() {
        let simulator = RecordingSimulator::new(Some(3));
        let injector = DirectUnicodeInjector::new(simulator.clone());

        let err = injector.inject_text("abcdef", &profile()).await.unwrap_err();
        assert_eq!(
            err,
            InjectionError::PartialInjection {
                injected: 3,
                total: 6
            }
        );
    }

    #[tokio::test]
    async fn immediate_failure_propagates_the_cause() {
        let simulator = RecordingSimulator::new(Some(0));
        let injector = DirectUnicodeInjector::new(simulator);

        let err = injector.inject_text("abc", &profile()).await.unwrap_err();
        assert!(matches!(err, InjectionError::PermissionDenied { .. }));
    }
}
