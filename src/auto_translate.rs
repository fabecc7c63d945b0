//! Post-render auto-translation of page text.
//!
//! After a navigation or language change the translator waits for the page
//! to settle, captures every translatable text node, sends the originals to
//! the backend in one request and writes the translations back in place.
//!
//! Passes are deduplicated per `(route, language)` pair and numbered; a pass
//! that finishes after a newer one has started drops its results, and a node
//! that changed since capture is left alone.

use crate::api::{endpoints, ApiClient};
use crate::dom::{Document, TextNodeSnapshot};
use crate::i18n::{Language, TranslationMetrics};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Composite key used to avoid repeating a pass for the same page and language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunKey {
    pub route: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The base language is active; the page is already in it.
    SkippedBaseLanguage,
    /// A pass for this `(route, language)` pair already ran.
    Duplicate,
    /// No translatable text was found.
    NothingToTranslate,
    /// The request failed; the page keeps its current text.
    Failed,
    /// A newer pass started (or the translator was cancelled) first.
    Superseded,
    Applied {
        /// Nodes overwritten with a translation
        applied: usize,
        /// Nodes that changed or disappeared after capture
        stale: usize,
        /// Nodes captured
        total: usize,
    },
}

#[derive(Debug, Serialize)]
struct TranslateTextsRequest<'a> {
    to: &'a str,
    texts: Vec<String>,
}

pub struct AutoTranslator {
    client: ApiClient,
    document: Arc<RwLock<Document>>,
    settle_delay: Duration,
    last_run: Mutex<Option<RunKey>>,
    generation: AtomicU64,
    metrics: Arc<TranslationMetrics>,
}

impl AutoTranslator {
    pub fn new(
        client: ApiClient,
        document: Arc<RwLock<Document>>,
        settle_delay: Duration,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        Self {
            client,
            document,
            settle_delay,
            last_run: Mutex::new(None),
            generation: AtomicU64::new(0),
            metrics,
        }
    }

    pub fn document(&self) -> &Arc<RwLock<Document>> {
        &self.document
    }

    /// The key of the most recent pass that was started.
    pub fn last_run(&self) -> Option<RunKey> {
        self.last_run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invalidate every in-flight pass without starting a new one.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Run a pass on a background task.
    pub fn spawn(self: &Arc<Self>, route: &str, language: Language) -> JoinHandle<PassOutcome> {
        let translator = Arc::clone(self);
        let route = route.to_string();
        tokio::spawn(async move { translator.run(&route, language).await })
    }

    /// Translate the rendered page for `route` into `language`.
    ///
    /// Failures are logged and never retried here; the next navigation or
    /// language change starts a fresh pass.
    pub async fn run(&self, route: &str, language: Language) -> PassOutcome {
        if language.is_canonical() {
            // Drop in-flight passes and forget the last pair so that coming
            // back to the same language re-translates the page.
            self.cancel();
            *self.last_run.lock().unwrap_or_else(PoisonError::into_inner) = None;
            return PassOutcome::SkippedBaseLanguage;
        }

        let key = RunKey {
            route: route.to_string(),
            language,
        };
        {
            let mut last_run = self.last_run.lock().unwrap_or_else(PoisonError::into_inner);
            if last_run.as_ref() == Some(&key) {
                debug!("Auto-translate already ran for {}:{}", route, language);
                return PassOutcome::Duplicate;
            }
            *last_run = Some(key);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        if !self.is_latest(generation) {
            return PassOutcome::Superseded;
        }

        let snapshot = {
            let document = self.document.read().await;
            TextNodeSnapshot::capture(&document, document.body())
        };
        info!(
            "Auto-translate collected {} nodes for {}:{}",
            snapshot.len(),
            route,
            language
        );
        if snapshot.is_empty() {
            return PassOutcome::NothingToTranslate;
        }

        let request = TranslateTextsRequest {
            to: language.code(),
            texts: snapshot.originals(),
        };

        self.metrics.record_api_call();
        let translated: Vec<serde_json::Value> =
            match self.client.post(endpoints::TRANSLATE_TEXTS, &request).await {
                Ok(translated) => translated,
                Err(e) => {
                    self.metrics.record_api_failure();
                    warn!("Auto-translate failed for {}:{}: {}", route, language, e);
                    return PassOutcome::Failed;
                }
            };

        if translated.len() != snapshot.len() {
            debug!(
                "Auto-translate returned {} texts for {} nodes",
                translated.len(),
                snapshot.len()
            );
        }

        let mut document = self.document.write().await;
        if !self.is_latest(generation) {
            self.metrics.record_stale_discard();
            debug!("Discarding superseded auto-translate pass for {}:{}", route, language);
            return PassOutcome::Superseded;
        }

        let mut applied = 0;
        let mut stale = 0;
        for (entry, value) in snapshot.entries().iter().zip(&translated) {
            let Some(text) = value.as_str().filter(|t| !t.is_empty()) else {
                continue;
            };
            if snapshot.is_current(&document, entry) {
                document.set_text(entry.node, text);
                applied += 1;
            } else {
                stale += 1;
            }
        }

        if applied > 0 {
            self.metrics.record_pass_applied(applied);
        }
        info!(
            "Auto-translate applied {} of {} nodes ({} stale)",
            applied,
            snapshot.len(),
            stale
        );

        PassOutcome::Applied {
            applied,
            stale,
            total: snapshot.len(),
        }
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}
