//! # Core Data Types
//!
//! Strategy identification, input-event primitives, and the engine
//! configuration. Configuration is typically deserialized from the host
//! application's settings layer.

use crate::classify::WindowInfo;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Enumeration of the injection strategies the engine can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InjectionStrategy {
    /// Send each character as a synthetic Unicode input event.
    DirectUnicode,
    /// Swap the clipboard, issue the platform paste chord, restore.
    ClipboardPaste,
    /// Simulate discrete key-down/up events per character.
    SyntheticKeystroke,
    /// Resolve to DirectUnicode or ClipboardPaste by text length.
    Hybrid,
}

impl std::fmt::Display for InjectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InjectionStrategy::DirectUnicode => write!(f, "direct-unicode"),
            InjectionStrategy::ClipboardPaste => write!(f, "clipboard-paste"),
            InjectionStrategy::SyntheticKeystroke => write!(f, "synthetic-keystroke"),
            InjectionStrategy::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Keys the engine may synthesize outside of plain text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Return,
    Tab,
    /// Moves the caret to the end of the field; used for pre-position
    /// correction in targets that reset the caret on external activation.
    End,
    Control,
    Meta,
    Shift,
    /// A printable character reachable as a single key press.
    Char(char),
}

/// Direction of a synthetic key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Press,
    Release,
    /// Press immediately followed by release.
    Click,
}

/// One logical delivery request as it moves through the engine.
///
/// `attempt_number` starts at 1 and increments only when the engine falls
/// back to the next strategy in the profile chain.
#[derive(Debug, Clone)]
pub struct InjectionRequest {
    pub text: String,
    pub target_window: WindowInfo,
    pub attempt_number: u32,
}

impl InjectionRequest {
    pub fn new(text: &str, target_window: WindowInfo) -> Self {
        Self {
            text: text.to_string(),
            target_window,
            attempt_number: 1,
        }
    }
}

/// Configuration for the text injection engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectionConfig {
    /// Upper bound for a single strategy attempt, excluding the settle delay.
    #[serde(default = "default_per_attempt_timeout_ms")]
    pub per_attempt_timeout_ms: u64,

    /// Wait after a paste chord before the clipboard is restored, giving the
    /// target time to consume the pasted contents.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Character count at which a Hybrid profile switches from direct typing
    /// to clipboard paste.
    #[serde(default = "default_hybrid_paste_threshold_chars")]
    pub hybrid_paste_threshold_chars: usize,

    /// Whether to redact text content in logs for privacy.
    #[serde(default = "default_true")]
    pub redact_logs: bool,

    /// Allowlist of application patterns for injection. When non-empty, only
    /// matching processes receive text.
    #[serde(default)]
    pub allowlist: Vec<String>,

    /// Blocklist of application patterns that never receive text (password
    /// managers, lock screens).
    #[serde(default)]
    pub blocklist: Vec<String>,
}

fn default_per_attempt_timeout_ms() -> u64 {
    800
}

fn default_settle_delay_ms() -> u64 {
    100
}

fn default_hybrid_paste_threshold_chars() -> usize {
    24
}

fn default_true() -> bool {
    true
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            per_attempt_timeout_ms: default_per_attempt_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            hybrid_paste_threshold_chars: default_hybrid_paste_threshold_chars(),
            redact_logs: default_true(),
            allowlist: Vec::new(),
            blocklist: Vec::new(),
        }
    }
}

impl InjectionConfig {
    pub fn per_attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.per_attempt_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_from_empty_json() {
        let config: InjectionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.per_attempt_timeout_ms, 800);
        assert_eq!(config.settle_delay_ms, 100);
        assert_eq!(config.hybrid_paste_threshold_chars, 24);
        assert!(config.redact_logs);
        assert!(config.allowlist.is_empty());
        assert!(config.blocklist.is_empty());
    }

    #[test]
    fn config_serde_roundtrip() {
        let config = InjectionConfig {
            per_attempt_timeout_ms: 1500,
            redact_logs: false,
            blocklist: vec!["keepassxc".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: InjectionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.per_attempt_timeout_ms, 1500);
        assert!(!parsed.redact_logs);
        assert_eq!(parsed.blocklist, vec!["keepassxc".to_string()]);
    }

    #[test]
    fn strategy_serde_roundtrip() {
        let strategy = InjectionStrategy::ClipboardPaste;
        let json = serde_json::to_string(&strategy).unwrap();
        let parsed: InjectionStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(strategy, parsed);
    }

    #[test]
    fn request_starts_at_attempt_one() {
        let window = WindowInfo {
            handle: 1,
            process_name: "chrome.exe".to_string(),
            window_class: String::new(),
            title: String::new(),
        };
        let request = InjectionRequest::new("hi", window);
        assert_eq!(request.attempt_number, 1);
        assert_eq!(request.text, "hi");
    }

    #[test]
    fn strategy_display_names() {
        assert_eq!(InjectionStrategy::DirectUnicode.to_string(), "direct-unicode");
        assert_eq!(InjectionStrategy::Hybrid.to_string(), "hybrid");
    }
}
