//! # Skald Text Delivery Engine
//!
//! This crate delivers finalized dictation text into whatever application
//! currently holds keyboard focus. It classifies the foreground window,
//! resolves a compatibility profile for the target, picks an injection
//! strategy, and drives a bounded inject/validate/retry state machine until
//! the text lands or the fallback chain is exhausted.
//!
//! ## Strategy Support Matrix
//!
//! | Strategy           | Mechanism                          | Best for                 |
//! |--------------------|------------------------------------|--------------------------|
//! | DirectUnicode      | Synthetic Unicode key events       | Browsers, IDEs           |
//! | ClipboardPaste     | Clipboard swap + paste chord       | Office suites, long text |
//! | SyntheticKeystroke | Per-key down/up events             | Legacy Win32 controls    |
//! | Hybrid             | Length-based direct/paste split    | Unknown targets          |
//!
//! The OS is reached exclusively through the collaborator traits below
//! ([`WindowProvider`], [`InputSimulator`], [`ClipboardAccess`],
//! [`Introspector`]), so the engine runs unmodified against the real desktop
//! (see the `skald-platform` crate) or against in-process test doubles.

pub mod classify;
pub mod clipboard_guard;
pub mod clipboard_paste_injector;
pub mod direct_injector;
pub mod error;
pub mod executor;
pub mod keystroke_injector;
pub mod metrics;
pub mod noop;
pub mod outcome;
pub mod processor;
pub mod profile;
pub mod strategy;
pub mod types;
pub mod validator;

// Re-export key components for easy access
pub use classify::{ApplicationCategory, WindowClassifier, WindowInfo};
pub use error::InjectionError;
pub use executor::InjectionEngine;
pub use metrics::InjectionMetrics;
pub use outcome::InjectionResult;
pub use processor::AsyncInjectionProcessor;
pub use profile::{CompatibilityProfile, KnownLimitation, ProfileStore, ProfileTable};
pub use types::{InjectionConfig, InjectionRequest, InjectionStrategy, KeyCode, KeyDirection};

/// Source of foreground-window snapshots.
///
/// A snapshot is fetched fresh for every injection request; the foreground
/// window can change between calls, so implementations must never cache.
#[async_trait::async_trait]
pub trait WindowProvider: Send + Sync {
    /// Return the window currently receiving keyboard input.
    ///
    /// Fails with [`InjectionError::WindowNotFound`] only when the desktop
    /// has no focused window at all or access to window metadata is denied.
    async fn foreground_window(&self) -> Result<WindowInfo, InjectionError>;
}

/// Low-level synthetic input primitive.
///
/// `send_unicode_unit` takes UTF-16 code units so that codepoints outside
/// the Basic Multilingual Plane are delivered as two consecutive events,
/// matching how the underlying OS input queues consume them.
#[async_trait::async_trait]
pub trait InputSimulator: Send + Sync {
    /// Inject a single UTF-16 code unit as a synthetic keyboard event.
    async fn send_unicode_unit(&self, unit: u16) -> Result<(), InjectionError>;

    /// Inject a key event (down, up, or a full click).
    async fn key_event(&self, key: KeyCode, direction: KeyDirection) -> Result<(), InjectionError>;

    /// Whether the simulator can currently reach the OS input queue.
    async fn is_available(&self) -> bool;

    /// Short name for logs and diagnostics.
    fn name(&self) -> &'static str;
}

/// System clipboard access with atomic swap semantics.
///
/// The clipboard is a global resource shared with every other process; the
/// engine treats it as exclusively owned only for the short window between
/// save and restore (see [`clipboard_guard::ClipboardGuard`]).
#[async_trait::async_trait]
pub trait ClipboardAccess: Send + Sync {
    /// Read the current clipboard contents.
    async fn contents(&self) -> Result<Vec<u8>, InjectionError>;

    /// Replace the clipboard contents.
    async fn set_contents(&self, bytes: Vec<u8>) -> Result<(), InjectionError>;
}

/// Best-effort read-back of the focused field, where the target application
/// exposes an accessibility or introspection surface.
#[async_trait::async_trait]
pub trait Introspector: Send + Sync {
    /// Return the focused field's textual content, or `None` when the target
    /// cannot be introspected.
    async fn read_focused_text(&self, window: &WindowInfo) -> Option<String>;
}

/// One concrete injection mechanism, executed by the engine against the
/// collaborator traits.
#[async_trait::async_trait]
pub trait TextInjector: Send + Sync {
    /// The strategy this injector implements.
    fn strategy(&self) -> InjectionStrategy;

    /// Whether the injector is currently usable.
    async fn is_available(&self) -> bool;

    /// Inject text into the focused application using the timing and
    /// corrections described by `profile`.
    async fn inject_text(
        &self,
        text: &str,
        profile: &CompatibilityProfile,
    ) -> Result<(), InjectionError>;
}
