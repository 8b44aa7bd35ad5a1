//! # Injection outcomes.
//!
//! One [`InjectionResult`] summarizes a logical request regardless of how
//! many internal attempts it took. The caller never sees intermediate
//! attempt failures; only the final cause of an exhausted fallback chain is
//! surfaced, together with enough context (category, attempted strategies)
//! for the surrounding UI to show targeted guidance.

use crate::classify::ApplicationCategory;
use crate::error::InjectionError;
use crate::types::InjectionStrategy;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct InjectionResult {
    /// Whether the text was delivered.
    pub success: bool,
    /// Classification of the target window, when one was obtained.
    pub category: Option<ApplicationCategory>,
    /// The strategy that delivered the text (success) or was tried last
    /// (failure). `None` for the empty-string no-op.
    pub strategy_used: Option<InjectionStrategy>,
    /// Every strategy tried, in order.
    pub strategies_attempted: Vec<InjectionStrategy>,
    /// Attempt count; 1 unless fallback occurred.
    pub attempts: u32,
    /// Total latency of the logical request.
    pub latency_ms: u64,
    /// Best-effort read-back verdict; `None` where the target supports no
    /// introspection.
    pub verified: Option<bool>,
    /// Final, unrecoverable cause when `success` is false.
    pub error: Option<InjectionError>,
}

impl InjectionResult {
    /// The immediate result for an empty injection request: completed,
    /// nothing attempted, no OS calls made.
    pub fn empty_no_op() -> Self {
        Self {
            success: true,
            category: None,
            strategy_used: None,
            strategies_attempted: Vec::new(),
            attempts: 0,
            latency_ms: 0,
            verified: None,
            error: None,
        }
    }

    /// Final error kind name, for logs and aggregation.
    pub fn error_kind(&self) -> Option<&'static str> {
        self.error.as_ref().map(InjectionError::kind_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_no_op_is_success_without_attempts() {
        let result = InjectionResult::empty_no_op();
        assert!(result.success);
        assert_eq!(result.attempts, 0);
        assert!(result.strategy_used.is_none());
        assert!(result.error.is_none());
    }

    #[test]
    fn error_kind_reflects_final_cause() {
        let result = InjectionResult {
            success: false,
            category: Some(ApplicationCategory::Generic),
            strategy_used: Some(InjectionStrategy::ClipboardPaste),
            strategies_attempted: vec![
                InjectionStrategy::DirectUnicode,
                InjectionStrategy::ClipboardPaste,
            ],
            attempts: 2,
            latency_ms: 12,
            verified: None,
            error: Some(InjectionError::Timeout {
                phase: "inject",
                elapsed_ms: 800,
            }),
        };
        assert_eq!(result.error_kind(), Some("Timeout"));
    }
}
