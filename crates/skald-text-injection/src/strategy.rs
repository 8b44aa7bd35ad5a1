//! # Strategy Selection
//!
//! Combines the resolved compatibility profile with characteristics of the
//! text itself to pick the strategy the executor will run first. The single
//! hard rule: targets that mangle surrogate pairs never get non-BMP text
//! through synthetic keystrokes — that is a correctness override, not a
//! preference.

use crate::profile::{CompatibilityProfile, KnownLimitation};
use crate::types::{InjectionConfig, InjectionStrategy};
use tracing::debug;

/// Whether the text contains codepoints outside the Basic Multilingual
/// Plane, i.e. anything that needs a surrogate pair in UTF-16.
pub fn contains_non_bmp(text: &str) -> bool {
    text.chars().any(|c| c as u32 > 0xFFFF)
}

/// Pick the strategy for this profile and text.
///
/// Forces [`InjectionStrategy::ClipboardPaste`] when the text carries
/// non-BMP codepoints and the profile is tagged `no-unicode-surrogates`;
/// otherwise the profile's stated preference stands.
pub fn select_strategy(profile: &CompatibilityProfile, text: &str) -> InjectionStrategy {
    if contains_non_bmp(text) && profile.has_limitation(KnownLimitation::NoUnicodeSurrogates) {
        debug!(
            category = %profile.category,
            preferred = %profile.preferred_strategy,
            "Non-BMP text on a surrogate-mangling target, forcing clipboard paste"
        );
        return InjectionStrategy::ClipboardPaste;
    }

    profile.preferred_strategy
}

/// Resolve [`InjectionStrategy::Hybrid`] to a concrete strategy for this
/// text: short text is typed directly (key events reach targets that filter
/// paste), long text goes through the clipboard. Other strategies pass
/// through unchanged.
pub fn resolve_hybrid(
    strategy: InjectionStrategy,
    text: &str,
    config: &InjectionConfig,
) -> InjectionStrategy {
    match strategy {
        InjectionStrategy::Hybrid => {
            if text.chars().count() < config.hybrid_paste_threshold_chars {
                InjectionStrategy::DirectUnicode
            } else {
                InjectionStrategy::ClipboardPaste
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ApplicationCategory;

    fn terminal_profile() -> CompatibilityProfile {
        CompatibilityProfile {
            category: ApplicationCategory::Terminal,
            preferred_strategy: InjectionStrategy::DirectUnicode,
            fallback_strategies: vec![InjectionStrategy::ClipboardPaste],
            inter_char_delay_ms: 5,
            pre_position_correction: false,
            known_limitations: [KnownLimitation::NoUnicodeSurrogates].into_iter().collect(),
        }
    }

    #[test]
    fn detects_non_bmp_codepoints() {
        assert!(!contains_non_bmp("plain ascii"));
        assert!(!contains_non_bmp("BMP: \u{FFFD} \u{2603}"));
        assert!(contains_non_bmp("Hi 👋"));
    }

    #[test]
    fn surrogate_limitation_forces_clipboard() {
        let profile = terminal_profile();
        assert_eq!(
            select_strategy(&profile, "Hi 👋"),
            InjectionStrategy::ClipboardPaste
        );
    }

    #[test]
    fn ascii_text_keeps_profile_preference() {
        let profile = terminal_profile();
        assert_eq!(
            select_strategy(&profile, "echo hello"),
            InjectionStrategy::DirectUnicode
        );
    }

    #[test]
    fn non_bmp_without_limitation_keeps_preference() {
        let mut profile = terminal_profile();
        profile.known_limitations.clear();
        assert_eq!(
            select_strategy(&profile, "Hi 👋"),
            InjectionStrategy::DirectUnicode
        );
    }

    #[test]
    fn selection_never_yields_hybrid_after_resolution() {
        let config = InjectionConfig::default();
        let short = resolve_hybrid(InjectionStrategy::Hybrid, "short", &config);
        let long_text = "a longer sentence that easily crosses the paste threshold";
        let long = resolve_hybrid(InjectionStrategy::Hybrid, long_text, &config);
        assert_eq!(short, InjectionStrategy::DirectUnicode);
        assert_eq!(long, InjectionStrategy::ClipboardPaste);
    }

    #[test]
    fn resolve_hybrid_passes_concrete_strategies_through() {
        let config = InjectionConfig::default();
        assert_eq!(
            resolve_hybrid(InjectionStrategy::SyntheticKeystroke, "abc", &config),
            InjectionStrategy::SyntheticKeystroke
        );
    }
}
