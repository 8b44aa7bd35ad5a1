//! # Async Injection Processor
//!
//! High-level interface between the transcription pipeline and the engine.
//! It receives finalized utterances over a channel and performs injections
//! strictly one at a time: input-simulation APIs and the clipboard are
//! global, stateful OS resources, so requests queue behind the one in
//! flight rather than interleave. A cancellation channel aborts the
//! in-flight request (clipboard restoration still runs via the guard).

use crate::executor::InjectionEngine;
use crate::metrics::InjectionMetrics;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Serializes injection requests against a single [`InjectionEngine`].
pub struct AsyncInjectionProcessor {
    engine: Arc<InjectionEngine>,
    /// Finalized utterances from the transcription pipeline.
    text_rx: mpsc::Receiver<String>,
    /// Cancels the request currently in flight, if any.
    cancel_rx: mpsc::Receiver<()>,
    /// Shutdown signal from the host.
    shutdown_rx: mpsc::Receiver<()>,
}

impl AsyncInjectionProcessor {
    pub fn new(
        engine: Arc<InjectionEngine>,
        text_rx: mpsc::Receiver<String>,
        cancel_rx: mpsc::Receiver<()>,
        shutdown_rx: mpsc::Receiver<()>,
    ) -> Self {
        Self {
            engine,
            text_rx,
            cancel_rx,
            shutdown_rx,
        }
    }

    /// Runs the processor loop until shutdown.
    ///
    /// Requests arriving while one is active wait in the channel; a message
    /// on the cancel channel aborts the active request instead.
    pub async fn run(mut self) {
        info!("Injection processor started");
        loop {
            tokio::select! {
                maybe_text = self.text_rx.recv() => {
                    let Some(text) = maybe_text else {
                        info!("Transcription channel closed, stopping processor");
                        break;
                    };
                    if text.is_empty() {
                        continue;
                    }
                    self.inject_one(text).await;
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping processor");
                    break;
                }
            }
        }
    }

    async fn inject_one(&mut self, text: String) {
        let (cancel_tx, cancel_token) = oneshot::channel();
        let engine = self.engine.clone();

        // Forward one cancel message (if any) to the in-flight request
        // while it runs.
        let result = {
            let inject = engine.inject_text_cancellable(&text, cancel_token);
            tokio::pin!(inject);
            let mut cancel_tx = Some(cancel_tx);
            loop {
                tokio::select! {
                    result = &mut inject => break result,
                    cancelled = self.cancel_rx.recv() => {
                        if cancelled.is_some() {
                            debug!("Cancelling in-flight injection");
                            if let Some(tx) = cancel_tx.take() {
                                let _ = tx.send(());
                            }
                        } else {
                            // Cancel senders are gone; just drive the
                            // injection to completion.
                            break (&mut inject).await;
                        }
                    }
                }
            }
        };

        if result.success {
            info!(
                strategy = ?result.strategy_used,
                attempts = result.attempts,
                latency_ms = result.latency_ms,
                "Injection completed"
            );
        } else {
            error!(
                category = ?result.category,
                strategies = ?result.strategies_attempted,
                error = ?result.error_kind(),
                "Injection failed"
            );
        }
    }

    /// Shared metrics handle for external monitoring.
    pub fn metrics(&self) -> Arc<Mutex<InjectionMetrics>> {
        self.engine.metrics()
    }
}
