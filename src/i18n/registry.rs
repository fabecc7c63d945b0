//! Language registry: the fixed list of languages offered in the switcher.
//!
//! Initialised once through `OnceLock` and immutable afterwards.

use std::sync::OnceLock;

/// Metadata for one selectable language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Short language code (e.g., "en", "hi")
    pub code: &'static str,

    /// English name of the language (e.g., "Hindi")
    pub name: &'static str,

    /// Native name of the language (e.g., "हिन्दी")
    pub native_name: &'static str,

    /// Whether this is the base language every bundle is translated from
    pub is_canonical: bool,
}

pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All languages in switcher order.
    pub fn list(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// The base language configuration.
    ///
    /// # Panics
    /// Panics if the built-in list does not contain exactly one canonical
    /// language.
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: true,
        },
        LanguageConfig {
            code: "hi",
            name: "Hindi",
            native_name: "हिन्दी",
            is_canonical: false,
        },
        LanguageConfig {
            code: "mr",
            name: "Marathi",
            native_name: "मराठी",
            is_canonical: false,
        },
        LanguageConfig {
            code: "te",
            name: "Telugu",
            native_name: "తెలుగు",
            is_canonical: false,
        },
        LanguageConfig {
            code: "ml",
            name: "Malayalam",
            native_name: "മലയാളം",
            is_canonical: false,
        },
    ]
}
