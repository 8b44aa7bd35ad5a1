//! # Compatibility Profile Store
//!
//! Per-category injection parameters with per-process overrides. The table
//! is immutable once loaded; updates arrive only through an explicit,
//! versioned [`ProfileStore::reload`] that swaps the whole table. Resolution
//! can never leave the engine without a usable profile: an empty or corrupt
//! table falls through to a hardcoded safe default.

use crate::classify::{ApplicationCategory, WindowInfo};
use crate::types::InjectionStrategy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Known input-handling defects of a target, recorded as closed tags so that
/// adding an application means adding table rows, not code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KnownLimitation {
    /// Direct keystroke simulation silently drops or mangles codepoints
    /// outside the Basic Multilingual Plane.
    NoUnicodeSurrogates,
    /// Plain Ctrl+V is bound to something else; paste needs the shifted
    /// chord (common in terminals).
    PasteShortcutIntercepted,
    /// The target must never receive synthetic text at all.
    InjectionUnsupported,
}

/// Injection parameters for one application category or specific process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityProfile {
    pub category: ApplicationCategory,
    /// Strategy to try first.
    pub preferred_strategy: InjectionStrategy,
    /// Ordered fallback chain, tried after the preferred strategy fails.
    #[serde(default)]
    pub fallback_strategies: Vec<InjectionStrategy>,
    /// Spacing between synthetic character events. Some targets drop input
    /// when events arrive faster than their queue drains.
    #[serde(default)]
    pub inter_char_delay_ms: u64,
    /// Nudge the caret to the field end before injecting.
    #[serde(default)]
    pub pre_position_correction: bool,
    #[serde(default)]
    pub known_limitations: HashSet<KnownLimitation>,
}

impl CompatibilityProfile {
    /// Hardcoded last resort when the table itself is empty or corrupt:
    /// clipboard paste with conservative timing and no assumed limitations.
    pub fn safe_default(category: ApplicationCategory) -> Self {
        Self {
            category,
            preferred_strategy: InjectionStrategy::ClipboardPaste,
            fallback_strategies: vec![InjectionStrategy::DirectUnicode],
            inter_char_delay_ms: 10,
            pre_position_correction: false,
            known_limitations: HashSet::new(),
        }
    }

    pub fn has_limitation(&self, limitation: KnownLimitation) -> bool {
        self.known_limitations.contains(&limitation)
    }

    /// Number of strategies the engine may attempt for this profile.
    pub fn max_attempts(&self) -> u32 {
        self.fallback_strategies.len() as u32 + 1
    }
}

/// The full compatibility table: category defaults plus per-process
/// overrides. Process keys are lowercase process names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileTable {
    #[serde(default)]
    pub categories: HashMap<ApplicationCategory, CompatibilityProfile>,
    #[serde(default)]
    pub process_overrides: HashMap<String, CompatibilityProfile>,
}

impl ProfileTable {
    /// The built-in table shipped with the engine.
    pub fn builtin() -> Self {
        let mut categories = HashMap::new();

        categories.insert(
            ApplicationCategory::Browser,
            CompatibilityProfile {
                category: ApplicationCategory::Browser,
                preferred_strategy: InjectionStrategy::DirectUnicode,
                fallback_strategies: vec![InjectionStrategy::ClipboardPaste],
                inter_char_delay_ms: 2,
                pre_position_correction: false,
                known_limitations: HashSet::new(),
            },
        );

        categories.insert(
            ApplicationCategory::Ide,
            CompatibilityProfile {
                category: ApplicationCategory::Ide,
                preferred_strategy: InjectionStrategy::DirectUnicode,
                fallback_strategies: vec![
                    InjectionStrategy::ClipboardPaste,
                    InjectionStrategy::SyntheticKeystroke,
                ],
                // IDEs with autocomplete popups drop events that arrive
                // faster than their input queue drains.
                inter_char_delay_ms: 5,
                pre_position_correction: false,
                known_limitations: HashSet::new(),
            },
        );

        categories.insert(
            ApplicationCategory::OfficeSuite,
            CompatibilityProfile {
                category: ApplicationCategory::OfficeSuite,
                preferred_strategy: InjectionStrategy::ClipboardPaste,
                fallback_strategies: vec![InjectionStrategy::DirectUnicode],
                inter_char_delay_ms: 5,
                // Rich-text frames reset the caret on external activation.
                pre_position_correction: true,
                known_limitations: HashSet::new(),
            },
        );

        categories.insert(
            ApplicationCategory::Terminal,
            CompatibilityProfile {
                category: ApplicationCategory::Terminal,
                preferred_strategy: InjectionStrategy::DirectUnicode,
                fallback_strategies: vec![InjectionStrategy::ClipboardPaste],
                inter_char_delay_ms: 5,
                pre_position_correction: false,
                known_limitations: [
                    KnownLimitation::NoUnicodeSurrogates,
                    KnownLimitation::PasteShortcutIntercepted,
                ]
                .into_iter()
                .collect(),
            },
        );

        categories.insert(
            ApplicationCategory::PlainTextEditor,
            CompatibilityProfile {
                category: ApplicationCategory::PlainTextEditor,
                preferred_strategy: InjectionStrategy::Hybrid,
                fallback_strategies: vec![InjectionStrategy::ClipboardPaste],
                inter_char_delay_ms: 2,
                pre_position_correction: false,
                known_limitations: HashSet::new(),
            },
        );

        categories.insert(
            ApplicationCategory::Generic,
            CompatibilityProfile {
                category: ApplicationCategory::Generic,
                preferred_strategy: InjectionStrategy::Hybrid,
                fallback_strategies: vec![
                    InjectionStrategy::ClipboardPaste,
                    InjectionStrategy::SyntheticKeystroke,
                ],
                inter_char_delay_ms: 5,
                pre_position_correction: false,
                known_limitations: HashSet::new(),
            },
        );

        Self {
            categories,
            process_overrides: HashMap::new(),
        }
    }
}

/// Thread-safe holder of the active [`ProfileTable`].
///
/// Reads clone the profile out; reloads swap the whole table behind the lock
/// and bump the version counter. Nothing mutates the table in place.
pub struct ProfileStore {
    table: RwLock<Arc<ProfileTable>>,
    version: AtomicU64,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new(ProfileTable::builtin())
    }
}

impl ProfileStore {
    pub fn new(table: ProfileTable) -> Self {
        Self {
            table: RwLock::new(Arc::new(table)),
            version: AtomicU64::new(1),
        }
    }

    /// Resolve the profile for a window: process override first, category
    /// default second, hardcoded safe default last.
    pub fn resolve(
        &self,
        window: &WindowInfo,
        category: ApplicationCategory,
    ) -> CompatibilityProfile {
        let table = self.table.read().clone();

        if let Some(profile) = table.process_overrides.get(&window.process_key()) {
            debug!(
                process = %window.process_name,
                strategy = %profile.preferred_strategy,
                "Resolved process override profile"
            );
            let mut profile = profile.clone();
            profile.category = category;
            return profile;
        }

        if let Some(profile) = table.categories.get(&category) {
            return profile.clone();
        }

        debug!(category = %category, "No table entry, using safe default profile");
        CompatibilityProfile::safe_default(category)
    }

    /// Replace the active table. Returns the new table version.
    pub fn reload(&self, table: ProfileTable) -> u64 {
        *self.table.write() = Arc::new(table);
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        info!(version, "Compatibility profile table reloaded");
        version
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}
