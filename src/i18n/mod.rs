//! Internationalization (i18n): languages, bundles and the language store.
//!
//! # Architecture
//!
//! - `registry`: the fixed list of selectable languages
//! - `language`: validated `Language` type
//! - `bundle`: nested key -> string bundles with dotted-path lookup
//! - `fetcher`: fallback chain that obtains a bundle for a language
//! - `store`: the single owner of the active language and bundle
//! - `metrics`: counters for fetches, fallbacks and stale discards
//!
//! # Example
//!
//! ```rust,ignore
//! use beejsebazaar_client::i18n::{BundleFetcher, Language, LanguageStore};
//!
//! let (store, load) = LanguageStore::mount(storage, fetcher, Language::ENGLISH);
//! load.wait().await;
//! let title = store.translate("nav.soilHealth");
//! ```

mod bundle;
mod fetcher;
mod language;
mod metrics;
mod registry;
mod store;

pub use bundle::{BundleError, TranslationBundle};
pub use fetcher::{
    BundleFetcher, BundleOrigin, BundleSource, FetchedBundle, RemoteBundleSource,
    StaticFileBundleSource,
};
pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use store::{BundleLoad, LanguageStore, LoadOutcome};
