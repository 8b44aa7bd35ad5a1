//! # Injection Engine
//!
//! The engine drives one logical injection request through a bounded state
//! machine: `Classifying → StrategySelected → Injecting → Validating →
//! {Completed | Retrying → StrategySelected | Failed}`. Recoverable attempt
//! failures are absorbed into the `Retrying` transition up to the profile's
//! fallback chain; the caller receives a single [`InjectionResult`] carrying
//! only the final cause.

use crate::classify::{ApplicationCategory, WindowClassifier, WindowInfo};
use crate::clipboard_paste_injector::ClipboardPasteInjector;
use crate::direct_injector::DirectUnicodeInjector;
use crate::error::InjectionError;
use crate::keystroke_injector::SyntheticKeystrokeInjector;
use crate::metrics::InjectionMetrics;
use crate::outcome::InjectionResult;
use crate::profile::{CompatibilityProfile, KnownLimitation, ProfileStore};
use crate::strategy::{resolve_hybrid, select_strategy};
use crate::types::{InjectionConfig, InjectionRequest, InjectionStrategy, KeyCode, KeyDirection};
use crate::validator::Validator;
use crate::{ClipboardAccess, InputSimulator, Introspector, TextInjector, WindowProvider};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// Redact text content for privacy-first logging.
fn redact_text(text: &str, redact: bool) -> String {
    if redact {
        // Fast, stable std hasher; never allocates the raw text into logs.
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let hash = hasher.finish();
        format!("len={} hash={:08x}", text.len(), hash & 0xFFFF_FFFF)
    } else {
        text.to_string()
    }
}

/// Phases of the injection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnginePhase {
    Idle,
    Classifying,
    StrategySelected,
    Injecting,
    Validating,
    Retrying,
    Completed,
    Failed,
}

impl std::fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnginePhase::Idle => write!(f, "IDLE"),
            EnginePhase::Classifying => write!(f, "CLASSIFYING"),
            EnginePhase::StrategySelected => write!(f, "STRATEGY_SELECTED"),
            EnginePhase::Injecting => write!(f, "INJECTING"),
            EnginePhase::Validating => write!(f, "VALIDATING"),
            EnginePhase::Retrying => write!(f, "RETRYING"),
            EnginePhase::Completed => write!(f, "COMPLETED"),
            EnginePhase::Failed => write!(f, "FAILED"),
        }
    }
}

fn transition(phase: &mut EnginePhase, next: EnginePhase) {
    trace!(from = %phase, to = %next, "Engine transition");
    *phase = next;
}

/// The cross-application text delivery engine.
///
/// Holds the collaborator handles, the classifier, the profile store, and
/// the strategy injectors. One engine serves one injection request at a
/// time; hosts that need queuing wrap it in
/// [`crate::processor::AsyncInjectionProcessor`].
pub struct InjectionEngine {
    config: InjectionConfig,
    windows: Arc<dyn WindowProvider>,
    simulator: Arc<dyn InputSimulator>,
    classifier: WindowClassifier,
    profiles: ProfileStore,
    validator: Validator,
    injectors: HashMap<InjectionStrategy, Box<dyn TextInjector>>,
    metrics: Arc<Mutex<InjectionMetrics>>,
    #[cfg(feature = "regex")]
    allowlist_regexes: Vec<regex::Regex>,
    #[cfg(feature = "regex")]
    blocklist_regexes: Vec<regex::Regex>,
}

impl InjectionEngine {
    pub fn new(
        config: InjectionConfig,
        windows: Arc<dyn WindowProvider>,
        simulator: Arc<dyn InputSimulator>,
        clipboard: Arc<dyn ClipboardAccess>,
    ) -> Self {
        Self::with_introspector(config, windows, simulator, clipboard, None)
    }

    /// Build an engine with an introspection surface for read-back
    /// validation.
    pub fn with_introspector(
        config: InjectionConfig,
        windows: Arc<dyn WindowProvider>,
        simulator: Arc<dyn InputSimulator>,
        clipboard: Arc<dyn ClipboardAccess>,
        introspector: Option<Arc<dyn Introspector>>,
    ) -> Self {
        let mut injectors: HashMap<InjectionStrategy, Box<dyn TextInjector>> = HashMap::new();
        injectors.insert(
            InjectionStrategy::DirectUnicode,
            Box::new(DirectUnicodeInjector::new(simulator.clone())),
        );
        injectors.insert(
            InjectionStrategy::SyntheticKeystroke,
            Box::new(SyntheticKeystrokeInjector::new(simulator.clone())),
        );
        injectors.insert(
            InjectionStrategy::ClipboardPaste,
            Box::new(ClipboardPasteInjector::new(
                config.clone(),
                simulator.clone(),
                clipboard,
            )),
        );

        #[cfg(feature = "regex")]
        let allowlist_regexes = compile_patterns(&config.allowlist, "allowlist");
        #[cfg(feature = "regex")]
        let blocklist_regexes = compile_patterns(&config.blocklist, "blocklist");

        Self {
            config,
            windows,
            simulator,
            classifier: WindowClassifier::new(),
            profiles: ProfileStore::default(),
            validator: Validator::new(introspector),
            injectors,
            metrics: Arc::new(Mutex::new(InjectionMetrics::default())),
            #[cfg(feature = "regex")]
            allowlist_regexes,
            #[cfg(feature = "regex")]
            blocklist_regexes,
        }
    }

    /// Inject `text` into the currently focused application.
    ///
    /// The sole entry point used by the transcription pipeline. Returns one
    /// result per logical request regardless of internal attempts.
    pub async fn inject_text(&self, text: &str) -> InjectionResult {
        let start = Instant::now();

        // Boundary: an empty string is a no-op that completes immediately
        // without touching any collaborator.
        if text.is_empty() {
            debug!("Empty text, completing without injection");
            return InjectionResult::empty_no_op();
        }

        if let Ok(mut m) = self.metrics.lock() {
            m.record_request();
        }
        debug!(
            "Injection requested: {}",
            redact_text(text, self.config.redact_logs)
        );

        let mut phase = EnginePhase::Idle;
        transition(&mut phase, EnginePhase::Classifying);

        let window = match self.windows.foreground_window().await {
            Ok(window) => window,
            Err(e) => {
                transition(&mut phase, EnginePhase::Failed);
                return self.finish_failed(None, Vec::new(), 0, None, e, start);
            }
        };
        let category = self.classifier.classify(&window);
        debug!(
            process = %window.process_name,
            category = %category,
            "Foreground window classified"
        );

        if !self.is_app_allowed(&window.process_name) {
            transition(&mut phase, EnginePhase::Failed);
            return self.finish_failed(
                Some(category),
                Vec::new(),
                0,
                None,
                InjectionError::Other(format!(
                    "application {} is not allowed for injection",
                    window.process_name
                )),
                start,
            );
        }

        let profile = self.profiles.resolve(&window, category);
        if profile.has_limitation(KnownLimitation::InjectionUnsupported) {
            transition(&mut phase, EnginePhase::Failed);
            return self.finish_failed(
                Some(category),
                Vec::new(),
                0,
                None,
                InjectionError::UnsupportedApplication { category },
                start,
            );
        }

        let mut request = InjectionRequest::new(text, window.clone());

        transition(&mut phase, EnginePhase::StrategySelected);
        let selected = select_strategy(&profile, text);
        let mut chain = vec![selected];
        for fallback in &profile.fallback_strategies {
            if !chain.contains(fallback) {
                chain.push(*fallback);
            }
        }
        trace!(
            ?chain,
            max_attempts = profile.max_attempts(),
            "Strategy chain prepared"
        );

        let mut attempted: Vec<InjectionStrategy> = Vec::new();
        let mut last_error: Option<InjectionError> = None;
        let total = chain.len();

        for (index, raw) in chain.into_iter().enumerate() {
            let strategy = resolve_hybrid(raw, text, &self.config);
            if attempted.contains(&strategy) {
                trace!(%strategy, "Skipping already-attempted strategy");
                continue;
            }
            let injector = match self.injectors.get(&strategy) {
                Some(injector) => injector,
                None => {
                    trace!(%strategy, "No injector registered, skipping");
                    continue;
                }
            };
            if !injector.is_available().await {
                debug!(%strategy, "Injector unavailable, skipping");
                continue;
            }

            attempted.push(strategy);
            transition(&mut phase, EnginePhase::Injecting);
            debug!(
                %strategy,
                attempt = request.attempt_number,
                of = total,
                "Attempting injection"
            );

            if profile.pre_position_correction {
                // Some rich-text controls reset the caret on external
                // activation; nudge it to the field end first. Best-effort.
                if let Err(e) = self
                    .simulator
                    .key_event(KeyCode::End, KeyDirection::Click)
                    .await
                {
                    warn!("Pre-position correction failed: {}", e);
                }
            }

            if let Ok(mut m) = self.metrics.lock() {
                m.record_attempt(strategy);
            }

            let attempt_start = Instant::now();
            let outcome = match tokio::time::timeout(
                self.config.per_attempt_timeout(),
                injector.inject_text(&request.text, &profile),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(InjectionError::Timeout {
                    phase: "inject",
                    elapsed_ms: attempt_start.elapsed().as_millis() as u64,
                }),
            };
            let attempt_ms = attempt_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => {
                    if let Ok(mut m) = self.metrics.lock() {
                        m.record_attempt_success(strategy, attempt_ms);
                    }

                    transition(&mut phase, EnginePhase::Validating);
                    let verified = self
                        .validator
                        .validate(&request.target_window, category, &request.text)
                        .await;
                    if verified == Some(false) {
                        // Reported to the caller, not retried: the text may
                        // have landed in a way read-back cannot see.
                        info!(%strategy, "Read-back did not confirm the injected text");
                    }

                    transition(&mut phase, EnginePhase::Completed);
                    let latency_ms = start.elapsed().as_millis() as u64;
                    let attempts = attempted.len() as u32;
                    if let Ok(mut m) = self.metrics.lock() {
                        m.record_completed();
                    }
                    info!(
                        %strategy,
                        attempts,
                        latency_ms,
                        "Injected {} chars",
                        request.text.chars().count()
                    );
                    return InjectionResult {
                        success: true,
                        category: Some(category),
                        strategy_used: Some(strategy),
                        strategies_attempted: attempted,
                        attempts,
                        latency_ms,
                        verified,
                        error: None,
                    };
                }
                Err(e) => {
                    if let Ok(mut m) = self.metrics.lock() {
                        m.record_attempt_failure(strategy);
                    }
                    debug!(
                        %strategy,
                        attempt = request.attempt_number,
                        elapsed_ms = attempt_ms,
                        "Strategy failed: {}",
                        e
                    );

                    let recoverable = e.is_recoverable();
                    last_error = Some(e);
                    if !recoverable {
                        break;
                    }
                    if index + 1 < total {
                        transition(&mut phase, EnginePhase::Retrying);
                        request.attempt_number += 1;
                        transition(&mut phase, EnginePhase::StrategySelected);
                    }
                }
            }
        }

        transition(&mut phase, EnginePhase::Failed);
        let strategy_used = attempted.last().copied();
        let attempts = attempted.len() as u32;
        let error = last_error
            .unwrap_or_else(|| InjectionError::Other("no injection strategy available".into()));
        self.finish_failed(Some(category), attempted, attempts, strategy_used, error, start)
    }

    /// Inject with a cancellation signal. Sending on `cancel` aborts the
    /// in-flight request; any staged clipboard contents are restored by the
    /// guard's drop path before new work runs.
    pub async fn inject_text_cancellable(
        &self,
        text: &str,
        cancel: tokio::sync::oneshot::Receiver<()>,
    ) -> InjectionResult {
        let start = Instant::now();
        let cancelled = async move {
            // A dropped sender is not a cancellation request.
            if cancel.await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = self.inject_text(text) => result,
            _ = cancelled => {
                debug!("Injection cancelled by caller");
                InjectionResult {
                    success: false,
                    category: None,
                    strategy_used: None,
                    strategies_attempted: Vec::new(),
                    attempts: 0,
                    latency_ms: start.elapsed().as_millis() as u64,
                    verified: None,
                    error: Some(InjectionError::Other("cancelled by caller".into())),
                }
            }
        }
    }

    /// Diagnostic hook: classification without any injection.
    pub fn classify_only(&self, window: &WindowInfo) -> ApplicationCategory {
        self.classifier.classify(window)
    }

    /// Diagnostic hook: strategy decision without any injection.
    pub fn dry_run_strategy(
        &self,
        profile: &CompatibilityProfile,
        text: &str,
    ) -> InjectionStrategy {
        select_strategy(profile, text)
    }

    /// The compatibility profile store, for resolution and explicit reload.
    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn metrics(&self) -> Arc<Mutex<InjectionMetrics>> {
        self.metrics.clone()
    }

    fn finish_failed(
        &self,
        category: Option<ApplicationCategory>,
        attempted: Vec<InjectionStrategy>,
        attempts: u32,
        strategy_used: Option<InjectionStrategy>,
        error: InjectionError,
        start: Instant,
    ) -> InjectionResult {
        if let Ok(mut m) = self.metrics.lock() {
            m.record_failed(&error);
        }
        error!(
            attempts,
            strategies = ?attempted,
            "Injection failed: {}",
            error
        );
        InjectionResult {
            success: false,
            category,
            strategy_used,
            strategies_attempted: attempted,
            attempts,
            latency_ms: start.elapsed().as_millis() as u64,
            verified: None,
            error: Some(error),
        }
    }

    /// Allowlist/blocklist check against the owning process name.
    fn is_app_allowed(&self, process_name: &str) -> bool {
        if !self.config.allowlist.is_empty() {
            #[cfg(feature = "regex")]
            return self
                .allowlist_regexes
                .iter()
                .any(|re| re.is_match(process_name));
            #[cfg(not(feature = "regex"))]
            return self
                .config
                .allowlist
                .iter()
                .map(|p| strip_anchors(p))
                .any(|p| process_name.contains(&p));
        }

        if !self.config.blocklist.is_empty() {
            #[cfg(feature = "regex")]
            return !self
                .blocklist_regexes
                .iter()
                .any(|re| re.is_match(process_name));
            #[cfg(not(feature = "regex"))]
            return !self
                .config
                .blocklist
                .iter()
                .map(|p| strip_anchors(p))
                .any(|p| process_name.contains(&p));
        }

        true
    }
}

#[cfg(feature = "regex")]
fn compile_patterns(patterns: &[String], which: &str) -> Vec<regex::Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match regex::Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Invalid {} pattern '{}': {}, skipping", which, pattern, e);
                None
            }
        })
        .collect()
}

#[cfg(not(feature = "regex"))]
fn strip_anchors(pattern: &str) -> String {
    let mut s = pattern;
    if let Some(stripped) = s.strip_prefix('^') {
        s = stripped;
    }
    if let Some(stripped) = s.strip_suffix('$') {
        s = stripped;
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redaction_hides_content_but_keeps_length() {
        let redacted = redact_text("secret dictation", true);
        assert!(redacted.starts_with("len=16 hash="));
        assert!(!redacted.contains("secret"));

        assert_eq!(redact_text("visible", false), "visible");
    }

    #[test]
    fn redaction_is_stable_for_equal_text() {
        assert_eq!(redact_text("hello", true), redact_text("hello", true));
    }

    #[test]
    fn phase_display_names() {
        assert_eq!(EnginePhase::StrategySelected.to_string(), "STRATEGY_SELECTED");
        assert_eq!(EnginePhase::Retrying.to_string(), "RETRYING");
    }
}
