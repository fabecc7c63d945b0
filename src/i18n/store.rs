//! Language state store.
//!
//! Owns the active language and its bundle for one application root. The
//! only mutation entry point is [`LanguageStore::set_language`]; bundle
//! reloads run in the background and carry a request token so a slow,
//! older fetch can never overwrite the result of a newer one.

use crate::i18n::{BundleFetcher, BundleOrigin, FetchedBundle, Language, TranslationBundle};
use crate::storage::{read_language_preference, write_language_preference, PreferenceStorage};
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct ActiveState {
    language: Language,
    bundle: Arc<TranslationBundle>,
    origin: BundleOrigin,
}

struct StoreInner {
    state: RwLock<ActiveState>,
    storage: Arc<dyn PreferenceStorage>,
    fetcher: Arc<BundleFetcher>,
    latest_request: AtomicU64,
}

/// Result of one background bundle load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched bundle became active.
    Applied {
        language: Language,
        origin: BundleOrigin,
    },
    /// A newer load was issued before this one completed; its result was dropped.
    Superseded { language: Language },
    /// The load task did not run to completion.
    Aborted,
}

/// Handle to a background bundle load.
///
/// Dropping the handle does not cancel the load.
#[derive(Debug)]
pub struct BundleLoad {
    handle: JoinHandle<LoadOutcome>,
}

impl BundleLoad {
    pub async fn wait(self) -> LoadOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Bundle load task failed: {}", e);
                LoadOutcome::Aborted
            }
        }
    }
}

#[derive(Clone)]
pub struct LanguageStore {
    inner: Arc<StoreInner>,
}

impl LanguageStore {
    /// Create a store from the persisted preference, or `default_language`.
    ///
    /// No network call is made; the active bundle starts as the base bundle
    /// until [`LanguageStore::load_bundle`] completes.
    pub fn new(
        storage: Arc<dyn PreferenceStorage>,
        fetcher: Arc<BundleFetcher>,
        default_language: Language,
    ) -> Self {
        let language = match read_language_preference(storage.as_ref()) {
            Some(code) => Language::from_code(&code).unwrap_or_else(|e| {
                warn!("Ignoring persisted language preference: {}", e);
                default_language
            }),
            None => default_language,
        };
        debug!("Language store initialised with {}", language.code());

        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(ActiveState {
                    language,
                    bundle: fetcher.base(),
                    origin: BundleOrigin::Base,
                }),
                storage,
                fetcher,
                latest_request: AtomicU64::new(0),
            }),
        }
    }

    /// Create the store and start loading the bundle for the initial language.
    ///
    /// Must be called within a Tokio runtime.
    pub fn mount(
        storage: Arc<dyn PreferenceStorage>,
        fetcher: Arc<BundleFetcher>,
        default_language: Language,
    ) -> (Self, BundleLoad) {
        let store = Self::new(storage, fetcher, default_language);
        let load = store.load_bundle();
        (store, load)
    }

    pub fn language(&self) -> Language {
        self.read_state().language
    }

    pub fn bundle(&self) -> Arc<TranslationBundle> {
        Arc::clone(&self.read_state().bundle)
    }

    /// Where the active bundle came from.
    pub fn origin(&self) -> BundleOrigin {
        self.read_state().origin
    }

    /// Resolve a dotted key against the active bundle, or return the key.
    pub fn translate(&self, key: &str) -> String {
        self.read_state().bundle.translate(key)
    }

    pub fn fetcher(&self) -> &Arc<BundleFetcher> {
        &self.inner.fetcher
    }

    /// Switch the active language.
    ///
    /// The in-memory language and both persisted keys are updated together
    /// under the state lock before this returns; the bundle reload runs in
    /// the background. Must be called within a Tokio runtime.
    pub fn set_language(&self, code: &str) -> Result<BundleLoad> {
        let language = Language::from_code(code)?;

        let token = {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            state.language = language;
            if let Err(e) = write_language_preference(self.inner.storage.as_ref(), language.code())
            {
                warn!("Failed to persist language preference: {}", e);
            }
            self.inner.next_token()
        };

        info!("Language set to {}", language.code());
        Ok(self.spawn_load(token, language))
    }

    /// Fetch the bundle for the current language in the background.
    pub fn load_bundle(&self) -> BundleLoad {
        let (token, language) = {
            let state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            (self.inner.next_token(), state.language)
        };
        self.spawn_load(token, language)
    }

    fn spawn_load(&self, token: u64, language: Language) -> BundleLoad {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let fetched = inner.fetcher.fetch(language).await;
            inner.apply(token, fetched)
        });

        BundleLoad { handle }
    }

    fn read_state(&self) -> ActiveState {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StoreInner {
    fn next_token(&self) -> u64 {
        self.latest_request.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(&self, token: u64, fetched: FetchedBundle) -> LoadOutcome {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        let latest = self.latest_request.load(Ordering::SeqCst);
        if token != latest {
            debug!(
                "Discarding stale {} bundle (request {}, latest {})",
                fetched.language.code(),
                token,
                latest
            );
            self.fetcher.metrics().record_stale_discard();
            return LoadOutcome::Superseded {
                language: fetched.language,
            };
        }

        state.bundle = fetched.bundle;
        state.origin = fetched.origin;
        LoadOutcome::Applied {
            language: fetched.language,
            origin: fetched.origin,
        }
    }
}
