use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone)]
pub struct Config {
    // Backend
    pub api_base_url: String,

    // Persisted preferences
    pub storage_path: PathBuf,

    // Translation
    pub locales_dir: PathBuf,
    pub default_language: String,
    pub auto_translate_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("API_BASE_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            bail!("API_BASE_URL must start with http:// or https://, got '{}'", api_base_url);
        }

        Ok(Self {
            api_base_url,

            storage_path: std::env::var("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/preferences.json")),

            locales_dir: std::env::var("LOCALES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("locales")),
            default_language: std::env::var("DEFAULT_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),
            auto_translate_delay: Duration::from_millis(
                std::env::var("AUTO_TRANSLATE_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(100),
            ),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_path: PathBuf::from("data/preferences.json"),
            locales_dir: PathBuf::from("locales"),
            default_language: "en".to_string(),
            auto_translate_delay: Duration::from_millis(100),
        }
    }
}
