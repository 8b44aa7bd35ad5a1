//! Synthetic input via the enigo library.
//!
//! The engine hands us UTF-16 code units; surrogate halves are buffered
//! until their partner arrives and the reassembled codepoint is typed as
//! text. Enigo calls block, so each one runs under `spawn_blocking` with a
//! fresh `Enigo` instance, mirroring how the rest of the stack drives it.

use async_trait::async_trait;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use parking_lot::Mutex;
use skald_text_injection::error::InjectionError;
use skald_text_injection::types::{KeyCode, KeyDirection};
use skald_text_injection::InputSimulator;
use tracing::debug;

pub struct EnigoSimulator {
    /// High surrogate waiting for its low half.
    pending_high: Mutex<Option<u16>>,
}

impl EnigoSimulator {
    /// Returns `None` when enigo cannot reach the display server (missing
    /// permissions, headless session).
    pub fn new() -> Option<Self> {
        match Enigo::new(&Settings::default()) {
            Ok(_) => Some(Self {
                pending_high: Mutex::new(None),
            }),
            Err(e) => {
                debug!("Enigo unavailable: {}", e);
                None
            }
        }
    }

    async fn type_str(text: String) -> Result<(), InjectionError> {
        let result = tokio::task::spawn_blocking(move || {
            let mut enigo = Enigo::new(&Settings::default()).map_err(|e| {
                InjectionError::PermissionDenied {
                    reason: format!("failed to create Enigo: {}", e),
                }
            })?;
            enigo
                .text(&text)
                .map_err(|e| InjectionError::Other(format!("enigo text failed: {}", e)))
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(e) => Err(InjectionError::Other(format!("input task failed: {}", e))),
        }
    }

    fn map_key(key: KeyCode) -> Key {
        match key {
            KeyCode::Return => Key::Return,
            KeyCode::Tab => Key::Tab,
            KeyCode::End => Key::End,
            KeyCode::Control => Key::Control,
            KeyCode::Meta => Key::Meta,
            KeyCode::Shift => Key::Shift,
            KeyCode::Char(c) => Key::Unicode(c),
        }
    }

    fn map_direction(direction: KeyDirection) -> Direction {
        match direction {
            KeyDirection::Press => Direction::Press,
            KeyDirection::Release => Direction::Release,
            KeyDirection::Click => Direction::Click,
        }
    }
}

#[async_trait]
impl InputSimulator for EnigoSimulator {
    async fn send_unicode_unit(&self, unit: u16) -> Result<(), InjectionError> {
        // Reassemble surrogate pairs into the scalar value enigo expects.
        let ch = {
            let mut pending = self.pending_high.lock();
            match (*pending, unit) {
                (None, 0xD800..=0xDBFF) => {
                    *pending = Some(unit);
                    return Ok(());
                }
                (Some(high), 0xDC00..=0xDFFF) => {
                    *pending = None;
                    let scalar =
                        0x10000 + (((high as u32 - 0xD800) << 10) | (unit as u32 - 0xDC00));
                    char::from_u32(scalar).ok_or_else(|| {
                        InjectionError::Other(format!("invalid surrogate pair {:#06x}", scalar))
                    })?
                }
                (Some(_), _) => {
                    // Orphaned high surrogate; drop it and continue.
                    *pending = None;
                    char::from_u32(unit as u32).ok_or_else(|| {
                        InjectionError::Other(format!("invalid code unit {:#06x}", unit))
                    })?
                }
                (None, _) => char::from_u32(unit as u32).ok_or_else(|| {
                    InjectionError::Other(format!("invalid code unit {:#06x}", unit))
                })?,
            }
        };

        Self::type_str(ch.to_string()).await
    }

    async fn key_event(&self, key: KeyCode, direction: KeyDirection) -> Result<(), InjectionError> {
        let key = Self::map_key(key);
        let direction = Self::map_direction(direction);

        let result = tokio::task::spawn_blocking(move || {
            let mut enigo = Enigo::new(&Settings::default()).map_err(|e| {
                InjectionError::PermissionDenied {
                    reason: format!("failed to create Enigo: {}", e),
                }
            })?;
            enigo
                .key(key, direction)
                .map_err(|e| InjectionError::Other(format!("enigo key failed: {}", e)))
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(e) => Err(InjectionError::Other(format!("input task failed: {}", e))),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "enigo"
    }
}
