//! # Post-Injection Validation
//!
//! Best-effort confirmation that injected text actually landed. An
//! injection call returning success means the events were queued, not that
//! the target accepted them — applications can silently drop or transform
//! input. Where the target category exposes an introspection surface the
//! validator reads the focused field back and compares its tail against the
//! injected text; everywhere else it stays out of the way and trusts the
//! executor. A validation failure is reported to the caller, never retried
//! here.

use crate::classify::{ApplicationCategory, WindowInfo};
use crate::Introspector;
use std::sync::Arc;
use tracing::{debug, trace};
use unicode_segmentation::UnicodeSegmentation;

pub struct Validator {
    introspector: Option<Arc<dyn Introspector>>,
}

impl Validator {
    pub fn new(introspector: Option<Arc<dyn Introspector>>) -> Self {
        Self { introspector }
    }

    /// Whether this category exposes a read-back surface worth querying.
    pub fn supports_read_back(category: ApplicationCategory) -> bool {
        matches!(
            category,
            ApplicationCategory::Browser | ApplicationCategory::Ide
        )
    }

    /// Compare the injected text against the focused field's content.
    ///
    /// Returns `Some(true)`/`Some(false)` when a read-back was obtained and
    /// compared, `None` when the category has no introspection surface or
    /// the read-back could not be performed (unverified, not failed).
    pub async fn validate(
        &self,
        window: &WindowInfo,
        category: ApplicationCategory,
        expected: &str,
    ) -> Option<bool> {
        if !Self::supports_read_back(category) {
            trace!(category = %category, "Category has no read-back surface, trusting executor");
            return None;
        }

        let introspector = self.introspector.as_ref()?;
        let field = introspector.read_focused_text(window).await?;

        let matched = field_tail_matches(&field, expected);
        debug!(
            category = %category,
            matched,
            field_chars = field.chars().count(),
            "Read-back validation completed"
        );
        Some(matched)
    }
}

/// Grapheme-aware suffix comparison: the field may carry prior content, so
/// the injected text is expected at its tail. Grapheme clusters keep a
/// combining mark at the boundary from producing a false mismatch.
fn field_tail_matches(field: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return true;
    }

    let expected_graphemes: Vec<&str> = expected.graphemes(true).collect();
    let field_graphemes: Vec<&str> = field.graphemes(true).collect();

    if field_graphemes.len() < expected_graphemes.len() {
        return false;
    }

    let tail = &field_graphemes[field_graphemes.len() - expected_graphemes.len()..];
    tail == expected_graphemes.as_slice()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedIntrospector {
        field: Option<String>,
    }

    #[async_trait]
    impl Introspector for FixedIntrospector {
        async fn read_focused_text(&self, _window: &WindowInfo) -> Option<String> {
            self.field.clone()
        }
    }

    fn window() -> WindowInfo {
        WindowInfo {
            handle: 7,
            process_name: "chrome.exe".to_string(),
            window_class: String::new(),
            title: String::new(),
        }
    }

    fn validator(field: Option<&str>) -> Validator {
        Validator::new(Some(Arc::new(FixedIntrospector {
            field: field.map(str::to_string),
        })))
    }

    #[tokio::test]
    async fn matching_tail_validates() {
        let v = validator(Some("Dear team, hello world"));
        let result = v
            .validate(&window(), ApplicationCategory::Browser, "hello world")
            .await;
        assert_eq!(result, Some(true));
    }

    #[tokio::test]
    async fn mismatched_tail_reports_false() {
        let v = validator(Some("something else entirely"));
        let result = v
            .validate(&window(), ApplicationCategory::Browser, "hello world")
            .await;
        assert_eq!(result, Some(false));
    }

    #[tokio::test]
    async fn unsupported_category_is_unverified() {
        let v = validator(Some("anything"));
        let result = v
            .validate(&window(), ApplicationCategory::Terminal, "anything")
            .await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn unreadable_field_is_unverified_not_failed() {
        let v = validator(None);
        let result = v
            .validate(&window(), ApplicationCategory::Ide, "hello")
            .await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn no_introspector_is_unverified() {
        let v = Validator::new(None);
        let result = v
            .validate(&window(), ApplicationCategory::Browser, "hello")
            .await;
        assert_eq!(result, None);
    }

    #[test]
    fn surrogate_pair_emoji_round_trips_in_comparison() {
        assert!(field_tail_matches("note: Hi 👋", "Hi 👋"));
        assert!(!field_tail_matches("note: Hi ?", "Hi 👋"));
    }

    #[test]
    fn empty_expected_always_matches() {
        assert!(field_tail_matches("", ""));
        assert!(field_tail_matches("abc", ""));
    }
}
