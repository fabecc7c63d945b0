//! Bundle fetching with an ordered fallback chain.
//!
//! For a non-canonical language each source is tried in order (remote
//! translation first, then a statically shipped file); the base bundle is
//! the terminal fallback, so a fetch always yields some bundle.

use crate::api::{endpoints, ApiClient};
use crate::i18n::{BundleError, Language, TranslationBundle, TranslationMetrics};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where an active bundle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleOrigin {
    Base,
    Remote,
    StaticFile,
}

/// One link of the fallback chain.
pub trait BundleSource: Send + Sync {
    fn origin(&self) -> BundleOrigin;

    fn load<'a>(
        &'a self,
        language: Language,
        base: &'a TranslationBundle,
    ) -> BoxFuture<'a, Result<TranslationBundle, BundleError>>;
}

#[derive(Debug, Serialize)]
struct TranslateBundleRequest<'a> {
    to: &'a str,
    payload: serde_json::Value,
}

/// Asks the backend to translate the whole base bundle.
pub struct RemoteBundleSource {
    client: ApiClient,
    metrics: Arc<TranslationMetrics>,
}

impl RemoteBundleSource {
    pub fn new(client: ApiClient, metrics: Arc<TranslationMetrics>) -> Self {
        Self { client, metrics }
    }

    async fn translate_base(
        &self,
        language: Language,
        base: &TranslationBundle,
    ) -> Result<TranslationBundle, BundleError> {
        let request = TranslateBundleRequest {
            to: language.code(),
            payload: base.to_value(),
        };

        self.metrics.record_api_call();
        let response: serde_json::Value =
            match self.client.post(endpoints::TRANSLATE, &request).await {
                Ok(value) => value,
                Err(e) => {
                    self.metrics.record_api_failure();
                    return Err(e.into());
                }
            };

        let bundle = TranslationBundle::from_value(response).inspect_err(|_| {
            self.metrics.record_api_failure();
        })?;

        let missing = bundle.missing_keys(base);
        if !missing.is_empty() {
            warn!(
                "Translated bundle for {} is missing {} keys (e.g. {})",
                language.code(),
                missing.len(),
                missing[0]
            );
        }

        Ok(bundle)
    }
}

impl BundleSource for RemoteBundleSource {
    fn origin(&self) -> BundleOrigin {
        BundleOrigin::Remote
    }

    fn load<'a>(
        &'a self,
        language: Language,
        base: &'a TranslationBundle,
    ) -> BoxFuture<'a, Result<TranslationBundle, BundleError>> {
        self.translate_base(language, base).boxed()
    }
}

/// Reads `<dir>/<code>.json` shipped alongside the application.
pub struct StaticFileBundleSource {
    dir: PathBuf,
}

impl StaticFileBundleSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    async fn read(&self, language: Language) -> Result<TranslationBundle, BundleError> {
        let path = self.dir.join(format!("{}.json", language.code()));
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BundleError::NotFound(path));
            }
            Err(source) => return Err(BundleError::Io { path, source }),
        };
        TranslationBundle::from_json_str(&content)
    }
}

impl BundleSource for StaticFileBundleSource {
    fn origin(&self) -> BundleOrigin {
        BundleOrigin::StaticFile
    }

    fn load<'a>(
        &'a self,
        language: Language,
        _base: &'a TranslationBundle,
    ) -> BoxFuture<'a, Result<TranslationBundle, BundleError>> {
        self.read(language).boxed()
    }
}

/// A bundle ready to become active.
#[derive(Debug, Clone)]
pub struct FetchedBundle {
    pub language: Language,
    pub bundle: Arc<TranslationBundle>,
    pub origin: BundleOrigin,
}

pub struct BundleFetcher {
    base: Arc<TranslationBundle>,
    sources: Vec<Box<dyn BundleSource>>,
    metrics: Arc<TranslationMetrics>,
}

impl BundleFetcher {
    /// A fetcher with no sources: every language resolves to `base`.
    pub fn new(base: TranslationBundle, metrics: Arc<TranslationMetrics>) -> Self {
        Self {
            base: Arc::new(base),
            sources: Vec::new(),
            metrics,
        }
    }

    /// Remote translation, then `<locales_dir>/<code>.json`, then the base bundle.
    pub fn standard(
        client: ApiClient,
        locales_dir: impl AsRef<Path>,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        Self::new(TranslationBundle::base().clone(), metrics.clone())
            .with_source(RemoteBundleSource::new(client, metrics))
            .with_source(StaticFileBundleSource::new(locales_dir))
    }

    /// Append a source to the end of the chain.
    pub fn with_source(mut self, source: impl BundleSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn base(&self) -> Arc<TranslationBundle> {
        Arc::clone(&self.base)
    }

    pub fn metrics(&self) -> &Arc<TranslationMetrics> {
        &self.metrics
    }

    /// Resolve the bundle for `language`. Never fails.
    pub async fn fetch(&self, language: Language) -> FetchedBundle {
        if language.is_canonical() {
            debug!("{} is the base language, using base bundle", language.code());
            return self.base_bundle(language);
        }

        for source in &self.sources {
            match source.load(language, &self.base).await {
                Ok(bundle) => {
                    let origin = source.origin();
                    if origin == BundleOrigin::StaticFile {
                        self.metrics.record_static_fallback();
                    }
                    info!("Loaded {} bundle from {:?}", language.code(), origin);
                    return FetchedBundle {
                        language,
                        bundle: Arc::new(bundle),
                        origin,
                    };
                }
                Err(e) => {
                    warn!(
                        "Failed to load {} bundle from {:?}: {}",
                        language.code(),
                        source.origin(),
                        e
                    );
                }
            }
        }

        warn!("Falling back to base bundle for {}", language.code());
        self.metrics.record_base_fallback();
        self.base_bundle(language)
    }

    fn base_bundle(&self, language: Language) -> FetchedBundle {
        FetchedBundle {
            language,
            bundle: self.base(),
            origin: BundleOrigin::Base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    struct CountingSource {
        calls: Arc<AtomicUsize>,
        result: Option<serde_json::Value>,
    }

    impl BundleSource for CountingSource {
        fn origin(&self) -> BundleOrigin {
            BundleOrigin::Remote
        }

        fn load<'a>(
            &'a self,
            _language: Language,
            _base: &'a TranslationBundle,
        ) -> BoxFuture<'a, Result<TranslationBundle, BundleError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = match &self.result {
                Some(value) => TranslationBundle::from_value(value.clone()),
                None => Err(BundleError::Shape("null")),
            };
            async move { result }.boxed()
        }
    }

    fn base() -> TranslationBundle {
        TranslationBundle::from_value(json!({"nav": {"home": "Home"}})).unwrap()
    }

    // ==================== Canonical Tests ====================

    #[tokio::test]
    async fn test_canonical_language_skips_sources() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = BundleFetcher::new(base(), Arc::new(TranslationMetrics::new())).with_source(
            CountingSource {
                calls: calls.clone(),
                result: Some(json!({"nav": {"home": "घर"}})),
            },
        );

        let fetched = fetcher.fetch(Language::ENGLISH).await;
        assert_eq!(fetched.origin, BundleOrigin::Base);
        assert_eq!(fetched.bundle.translate("nav.home"), "Home");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    // ==================== Fallback Chain Tests ====================

    #[tokio::test]
    async fn test_first_successful_source_wins() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let fetcher = BundleFetcher::new(base(), Arc::new(TranslationMetrics::new()))
            .with_source(CountingSource {
                calls: first.clone(),
                result: Some(json!({"nav": {"home": "घर"}})),
            })
            .with_source(CountingSource {
                calls: second.clone(),
                result: Some(json!({"nav": {"home": "unused"}})),
            });

        let fetched = fetcher.fetch(Language::HINDI).await;
        assert_eq!(fetched.bundle.translate("nav.home"), "घर");
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_sources_fail_yields_base() {
        let metrics = Arc::new(TranslationMetrics::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = BundleFetcher::new(base(), metrics.clone()).with_source(CountingSource {
            calls: calls.clone(),
            result: None,
        });

        let fetched = fetcher.fetch(Language::HINDI).await;
        assert_eq!(fetched.origin, BundleOrigin::Base);
        assert_eq!(fetched.language, Language::HINDI);
        assert_eq!(fetched.bundle.translate("nav.home"), "Home");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.base_fallbacks(), 1);
    }

    // ==================== Remote Source Tests ====================

    #[tokio::test]
    async fn test_remote_source_posts_base_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/translate"))
            .and(body_partial_json(json!({"to": "hi", "payload": {"nav": {"home": "Home"}}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nav": {"home": "घर"}})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let metrics = Arc::new(TranslationMetrics::new());
        let fetcher = BundleFetcher::new(base(), metrics.clone()).with_source(
            RemoteBundleSource::new(ApiClient::new(mock_server.uri()), metrics.clone()),
        );

        let fetched = fetcher.fetch(Language::HINDI).await;
        assert_eq!(fetched.origin, BundleOrigin::Remote);
        assert_eq!(fetched.bundle.translate("nav.home"), "घर");
        assert_eq!(metrics.api_calls(), 1);
        assert_eq!(metrics.api_failures(), 0);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_static_file() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/translate"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(
            temp_dir.path().join("mr.json"),
            r#"{"nav": {"home": "मुख्यपृष्ठ"}}"#,
        )
        .unwrap();

        let metrics = Arc::new(TranslationMetrics::new());
        let fetcher =
            BundleFetcher::new(base(), metrics.clone())
                .with_source(RemoteBundleSource::new(
                    ApiClient::new(mock_server.uri()),
                    metrics.clone(),
                ))
                .with_source(StaticFileBundleSource::new(temp_dir.path()));

        let fetched = fetcher.fetch(Language::from_code("mr").unwrap()).await;
        assert_eq!(fetched.origin, BundleOrigin::StaticFile);
        assert_eq!(fetched.bundle.translate("nav.home"), "मुख्यपृष्ठ");
        assert_eq!(metrics.api_failures(), 1);
        assert_eq!(metrics.static_fallbacks(), 1);
    }

    #[tokio::test]
    async fn test_remote_non_object_response_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/translate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "a", "bundle"])))
            .mount(&mock_server)
            .await;

        let metrics = Arc::new(TranslationMetrics::new());
        let fetcher = BundleFetcher::new(base(), metrics.clone()).with_source(
            RemoteBundleSource::new(ApiClient::new(mock_server.uri()), metrics.clone()),
        );

        let fetched = fetcher.fetch(Language::HINDI).await;
        assert_eq!(fetched.origin, BundleOrigin::Base);
        assert_eq!(metrics.api_failures(), 1);
    }

    // ==================== Static Source Tests ====================

    #[tokio::test]
    async fn test_static_source_missing_file_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = StaticFileBundleSource::new(temp_dir.path());

        let result = source.load(Language::from_code("te").unwrap(), &base()).await;
        assert!(matches!(result, Err(BundleError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_static_source_invalid_json_is_parse_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("ml.json"), "{ broken").unwrap();
        let source = StaticFileBundleSource::new(temp_dir.path());

        let result = source.load(Language::from_code("ml").unwrap(), &base()).await;
        assert!(matches!(result, Err(BundleError::Parse(_))));
    }

    #[tokio::test]
    async fn test_standard_chain_uses_shipped_hindi_file() {
        let uri = {
            let mock_server = MockServer::start().await;
            mock_server.uri()
        };

        let locales = Path::new(env!("CARGO_MANIFEST_DIR")).join("locales");
        let metrics = Arc::new(TranslationMetrics::new());
        let fetcher = BundleFetcher::standard(ApiClient::new(uri), locales, metrics.clone());

        let fetched = fetcher.fetch(Language::HINDI).await;
        assert_eq!(fetched.origin, BundleOrigin::StaticFile);
        assert_eq!(fetched.bundle.translate("nav.soilHealth"), "मृदा स्वास्थ्य");
        assert!(metrics.api_failures() >= 1);
    }
}
