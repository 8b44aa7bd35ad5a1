//! A no-op input simulator: always available, does nothing. Used as the
//! harness fallback in environments without input access and as a test
//! double.

use crate::error::InjectionError;
use crate::types::{KeyCode, KeyDirection};
use crate::InputSimulator;
use async_trait::async_trait;
use tracing::trace;

#[derive(Debug, Default)]
pub struct NoOpSimulator;

impl NoOpSimulator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InputSimulator for NoOpSimulator {
    async fn send_unicode_unit(&self, unit: u16) -> Result<(), InjectionError> {
        trace!("NoOpSimulator: dropping unicode unit {:#06x}", unit);
        Ok(())
    }

    async fn key_event(&self, key: KeyCode, direction: KeyDirection) -> Result<(), InjectionError> {
        trace!("NoOpSimulator: dropping key event {:?} {:?}", key, direction);
        Ok(())
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_available_and_always_succeeds() {
        let sim = NoOpSimulator::new();
        assert!(sim.is_available().await);
        sim.send_unicode_unit(0x0041).await.unwrap();
        sim.key_event(KeyCode::Return, KeyDirection::Click).await.unwrap();
    }
}
