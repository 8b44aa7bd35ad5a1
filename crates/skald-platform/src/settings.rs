//! Compatibility-override loading.
//!
//! The settings layer persists per-process compatibility overrides as TOML;
//! this module parses that document into a [`ProfileTable`] for
//! `ProfileStore::reload`. Parsing is strict — a corrupt document is
//! surfaced to the caller, which keeps the previously loaded table active
//! rather than replacing it with something half-read.

use anyhow::{Context, Result};
use skald_text_injection::profile::ProfileTable;
use std::path::Path;
use tracing::info;

/// Parse a TOML overrides document.
pub fn parse_profile_table(doc: &str) -> Result<ProfileTable> {
    toml::from_str(doc).context("failed to parse compatibility profile table")
}

/// Load a TOML overrides file from disk.
pub fn load_profile_table(path: &Path) -> Result<ProfileTable> {
    let doc = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile table {}", path.display()))?;
    let table = parse_profile_table(&doc)?;
    info!(
        path = %path.display(),
        overrides = table.process_overrides.len(),
        categories = table.categories.len(),
        "Loaded compatibility profile table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skald_text_injection::classify::ApplicationCategory;
    use skald_text_injection::profile::KnownLimitation;
    use skald_text_injection::types::InjectionStrategy;
    use std::io::Write;

    const SAMPLE: &str = r#"
[process_overrides."windowsterminal.exe"]
category = "Terminal"
preferred_strategy = "DirectUnicode"
fallback_strategies = ["ClipboardPaste"]
inter_char_delay_ms = 5
known_limitations = ["no-unicode-surrogates"]

[process_overrides."legacy-erp.exe"]
category = "Generic"
preferred_strategy = "SyntheticKeystroke"
fallback_strategies = ["ClipboardPaste"]
inter_char_delay_ms = 25
pre_position_correction = true
"#;

    #[test]
    fn parses_process_overrides() {
        let table = parse_profile_table(SAMPLE).unwrap();
        assert_eq!(table.process_overrides.len(), 2);

        let terminal = &table.process_overrides["windowsterminal.exe"];
        assert_eq!(terminal.category, ApplicationCategory::Terminal);
        assert_eq!(terminal.preferred_strategy, InjectionStrategy::DirectUnicode);
        assert!(terminal.has_limitation(KnownLimitation::NoUnicodeSurrogates));

        let erp = &table.process_overrides["legacy-erp.exe"];
        assert_eq!(erp.inter_char_delay_ms, 25);
        assert!(erp.pre_position_correction);
        // Omitted fields fall back to their defaults.
        assert!(erp.known_limitations.is_empty());
    }

    #[test]
    fn corrupt_document_is_an_error() {
        assert!(parse_profile_table("process_overrides = 7").is_err());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let table = load_profile_table(file.path()).unwrap();
        assert!(table.process_overrides.contains_key("legacy-erp.exe"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_profile_table(Path::new("/nonexistent/profiles.toml")).is_err());
    }
}
