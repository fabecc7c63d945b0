//! One dashboard session: the language store, the rendered page and the
//! auto-translator, wired so that every route or language change starts a
//! translation pass for the new `(route, language)` pair.

use crate::api::ApiClient;
use crate::auto_translate::{AutoTranslator, PassOutcome};
use crate::config::Config;
use crate::dom::Document;
use crate::i18n::{BundleFetcher, BundleLoad, Language, LanguageStore, TranslationMetrics};
use crate::storage::PreferenceStorage;
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Handle to a background auto-translate pass.
#[derive(Debug)]
pub struct PassHandle {
    handle: JoinHandle<PassOutcome>,
}

impl PassHandle {
    /// Wait for the pass. A pass whose task died reports `Failed`.
    pub async fn wait(self) -> PassOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Auto-translate task failed: {}", e);
                PassOutcome::Failed
            }
        }
    }
}

/// Work started by a language switch.
#[derive(Debug)]
pub struct LanguageChange {
    pub bundle: BundleLoad,
    pub pass: PassHandle,
}

pub struct DashboardSession {
    client: ApiClient,
    store: LanguageStore,
    translator: Arc<AutoTranslator>,
    metrics: Arc<TranslationMetrics>,
    route: Mutex<String>,
}

impl DashboardSession {
    /// Build a session from its parts. The store must already be mounted.
    pub fn new(
        client: ApiClient,
        store: LanguageStore,
        translator: Arc<AutoTranslator>,
        metrics: Arc<TranslationMetrics>,
        route: &str,
    ) -> Self {
        Self {
            client,
            store,
            translator,
            metrics,
            route: Mutex::new(route.to_string()),
        }
    }

    /// Wire a session from configuration, starting on `route`.
    ///
    /// Returns the session and the initial bundle load. Must be called
    /// within a Tokio runtime.
    pub fn start(
        config: &Config,
        storage: Arc<dyn PreferenceStorage>,
        route: &str,
    ) -> Result<(Self, BundleLoad)> {
        let default_language = Language::from_code(&config.default_language)
            .context("Invalid DEFAULT_LANGUAGE")?;

        let client = ApiClient::from_config(config);
        let metrics = Arc::new(TranslationMetrics::new());
        let fetcher = Arc::new(BundleFetcher::standard(
            client.clone(),
            &config.locales_dir,
            Arc::clone(&metrics),
        ));
        let (store, load) = LanguageStore::mount(storage, fetcher, default_language);

        let translator = Arc::new(AutoTranslator::new(
            client.clone(),
            Arc::new(RwLock::new(Document::new())),
            config.auto_translate_delay,
            Arc::clone(&metrics),
        ));

        info!(
            "Dashboard session started on {} in {}",
            route,
            store.language()
        );
        Ok((Self::new(client, store, translator, metrics, route), load))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn store(&self) -> &LanguageStore {
        &self.store
    }

    pub fn translator(&self) -> &Arc<AutoTranslator> {
        &self.translator
    }

    pub fn metrics(&self) -> &Arc<TranslationMetrics> {
        &self.metrics
    }

    /// The rendered page.
    pub fn document(&self) -> &Arc<RwLock<Document>> {
        self.translator.document()
    }

    pub fn route(&self) -> String {
        self.route
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Translate the current page. Call once its first render is done.
    pub fn rendered(&self) -> PassHandle {
        self.pass(&self.route())
    }

    /// Move to `route`. Render the new page before calling this.
    pub fn navigate(&self, route: &str) -> PassHandle {
        {
            let mut current = self.route.lock().unwrap_or_else(PoisonError::into_inner);
            *current = route.to_string();
        }
        self.pass(route)
    }

    /// Switch language: reload the bundle and translate the current page.
    pub fn set_language(&self, code: &str) -> Result<LanguageChange> {
        let bundle = self.store.set_language(code)?;
        let pass = self.pass(&self.route());
        Ok(LanguageChange { bundle, pass })
    }

    /// Stop any in-flight translation pass.
    pub fn close(&self) {
        self.translator.cancel();
    }

    fn pass(&self, route: &str) -> PassHandle {
        PassHandle {
            handle: self.translator.spawn(route, self.store.language()),
        }
    }
}
