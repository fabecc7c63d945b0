//! Translation bundles: nested key -> string maps addressed by dotted paths.

use crate::api::ApiError;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

const BASE_BUNDLE_JSON: &str = include_str!("../../locales/en.json");

static BASE_BUNDLE: OnceLock<TranslationBundle> = OnceLock::new();

/// Why a bundle source could not produce a bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Translation request failed: {0}")]
    Api(#[from] ApiError),

    #[error("No bundled translation file at {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid bundle JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Bundle must be a JSON object, got {0}")]
    Shape(&'static str),
}

/// All UI strings for one language.
///
/// Bundles are replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationBundle {
    root: Map<String, Value>,
}

impl TranslationBundle {
    /// The canonical English bundle shipped with the crate.
    ///
    /// # Panics
    /// Panics if the embedded `locales/en.json` is not a JSON object.
    pub fn base() -> &'static TranslationBundle {
        BASE_BUNDLE.get_or_init(|| {
            TranslationBundle::from_json_str(BASE_BUNDLE_JSON)
                .expect("Embedded base bundle should be a JSON object")
        })
    }

    pub fn empty() -> Self {
        Self { root: Map::new() }
    }

    pub fn from_value(value: Value) -> Result<Self, BundleError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(BundleError::Shape(json_kind(&other))),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, BundleError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// The bundle as a JSON value, e.g. for use as a translation payload.
    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Look up a dotted path such as `nav.soilHealth`.
    ///
    /// Returns `None` if any segment is missing or the leaf is not a string.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut value = self.root.get(first)?;
        for segment in segments {
            value = value.as_object()?.get(segment)?;
        }
        value.as_str()
    }

    /// Look up `key`, returning the key itself when it cannot be resolved.
    pub fn translate(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }

    /// Dotted paths of every string leaf, in document order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(&self.root, "", &mut keys);
        keys
    }

    /// Number of string leaves.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// String leaves of `reference` that this bundle cannot resolve.
    pub fn missing_keys(&self, reference: &TranslationBundle) -> Vec<String> {
        reference
            .keys()
            .into_iter()
            .filter(|key| self.lookup(key).is_none())
            .collect()
    }
}

fn collect_keys(map: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (name, value) in map {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        match value {
            Value::String(_) => out.push(path),
            Value::Object(child) => collect_keys(child, &path, out),
            _ => {}
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
