//! # Error types for the text delivery engine.
//!
//! One structured taxonomy covers every way an injection can go wrong.
//! Recoverability is a property of the variant: recoverable kinds are
//! absorbed into the engine's retry transition, and only the final cause of
//! an exhausted fallback chain reaches the caller.

use crate::classify::ApplicationCategory;
use serde::Serialize;
use thiserror::Error;

/// The primary error type for injection operations.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum InjectionError {
    /// The OS reports no foreground window, or window metadata is denied.
    /// Fatal: there is no target to fall back to.
    #[error("no foreground window available: {reason}")]
    WindowNotFound { reason: String },

    /// The target process blocks synthetic input (e.g. an elevated-privilege
    /// boundary). A different strategy may still get through.
    #[error("target rejected synthetic input: {reason}")]
    PermissionDenied { reason: String },

    /// Some but not all characters landed. The clipboard fallback delivers
    /// the text atomically.
    #[error("only {injected} of {total} characters were delivered")]
    PartialInjection { injected: usize, total: usize },

    /// Another process mutated the clipboard mid-operation.
    #[error("clipboard was modified by another process during '{phase}'")]
    ClipboardConflict { phase: &'static str },

    /// A strategy attempt exceeded its time bound.
    #[error("attempt timed out during '{phase}' after {elapsed_ms}ms")]
    Timeout {
        phase: &'static str,
        elapsed_ms: u64,
    },

    /// The resolved profile explicitly marks this target as unsupported.
    #[error("application category {category:?} is marked unsupported")]
    UnsupportedApplication { category: ApplicationCategory },

    /// A catch-all for unexpected host failures.
    #[error("{0}")]
    Other(String),
}

impl InjectionError {
    /// Whether the engine may absorb this error into a fallback attempt.
    pub fn is_recoverable(&self) -> bool {
        match self {
            InjectionError::PermissionDenied { .. }
            | InjectionError::PartialInjection { .. }
            | InjectionError::ClipboardConflict { .. }
            | InjectionError::Timeout { .. } => true,
            InjectionError::WindowNotFound { .. }
            | InjectionError::UnsupportedApplication { .. }
            | InjectionError::Other(_) => false,
        }
    }

    /// Stable variant name, used as a metrics aggregation key.
    pub fn kind_name(&self) -> &'static str {
        match self {
            InjectionError::WindowNotFound { .. } => "WindowNotFound",
            InjectionError::PermissionDenied { .. } => "PermissionDenied",
            InjectionError::PartialInjection { .. } => "PartialInjection",
            InjectionError::ClipboardConflict { .. } => "ClipboardConflict",
            InjectionError::Timeout { .. } => "Timeout",
            InjectionError::UnsupportedApplication { .. } => "UnsupportedApplication",
            InjectionError::Other(_) => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_kinds() {
        assert!(InjectionError::Timeout {
            phase: "inject",
            elapsed_ms: 800
        }
        .is_recoverable());
        assert!(InjectionError::PartialInjection {
            injected: 3,
            total: 10
        }
        .is_recoverable());
        assert!(InjectionError::ClipboardConflict { phase: "stage" }.is_recoverable());
        assert!(InjectionError::PermissionDenied {
            reason: "elevated target".into()
        }
        .is_recoverable());
    }

    #[test]
    fn fatal_kinds() {
        assert!(!InjectionError::WindowNotFound {
            reason: "desktop focused".into()
        }
        .is_recoverable());
        assert!(!InjectionError::UnsupportedApplication {
            category: ApplicationCategory::Generic
        }
        .is_recoverable());
        assert!(!InjectionError::Other("spawn failed".into()).is_recoverable());
    }

    #[test]
    fn kind_names_are_stable() {
        let err = InjectionError::ClipboardConflict { phase: "restore" };
        assert_eq!(err.kind_name(), "ClipboardConflict");
    }
}
