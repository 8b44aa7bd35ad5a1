//! # Skald Platform Collaborators
//!
//! Default desktop implementations of the collaborator traits consumed by
//! `skald-text-injection`: foreground-window metadata queries, synthetic
//! input via enigo (feature `enigo`, on by default), clipboard access via
//! arboard, and TOML loading of persisted per-process compatibility
//! overrides supplied by the settings layer.

pub mod clipboard;
pub mod settings;
#[cfg(feature = "enigo")]
pub mod simulator;
pub mod window;

pub use clipboard::ArboardClipboard;
pub use settings::{load_profile_table, parse_profile_table};
#[cfg(feature = "enigo")]
pub use simulator::EnigoSimulator;
pub use window::DesktopWindowProvider;

use skald_text_injection::noop::NoOpSimulator;
use skald_text_injection::types::InjectionConfig;
use skald_text_injection::{InjectionEngine, InputSimulator};
use std::sync::Arc;
use tracing::warn;

/// Build an engine wired to this machine's desktop.
///
/// Falls back to the no-op simulator when no real input backend is usable,
/// so the engine can still classify and dry-run in restricted environments.
pub fn desktop_engine(config: InjectionConfig) -> InjectionEngine {
    #[cfg(feature = "enigo")]
    let simulator: Arc<dyn InputSimulator> = match EnigoSimulator::new() {
        Some(simulator) => Arc::new(simulator),
        None => {
            warn!("Input simulation unavailable, using no-op simulator");
            Arc::new(NoOpSimulator::new())
        }
    };

    #[cfg(not(feature = "enigo"))]
    let simulator: Arc<dyn InputSimulator> = {
        warn!("Built without an input backend, using no-op simulator");
        Arc::new(NoOpSimulator::new())
    };

    InjectionEngine::new(
        config,
        Arc::new(DesktopWindowProvider::new()),
        simulator,
        Arc::new(ArboardClipboard::new()),
    )
}
