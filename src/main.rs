use anyhow::{Context, Result};
use beejsebazaar_client::config::Config;
use beejsebazaar_client::i18n::{LanguageRegistry, LanguageStore, LoadOutcome};
use beejsebazaar_client::session::DashboardSession;
use beejsebazaar_client::storage::FileStorage;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("beejsebazaar_client=info".parse()?),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Using backend at {}", config.api_base_url);

    let storage = Arc::new(FileStorage::open(&config.storage_path));
    let (session, load) = DashboardSession::start(&config, storage, "/dashboard")?;

    match load.wait().await {
        LoadOutcome::Applied { language, origin } => {
            info!("Active language: {} ({:?} bundle)", language, origin);
        }
        outcome => warn!("Initial bundle load did not apply: {:?}", outcome),
    }

    log_languages(session.store());
    info!("{}", session.store().translate("common.appName"));

    let report = session.metrics().report();
    info!("Translation metrics: {}", serde_json::to_string(&report)?);

    Ok(())
}

fn log_languages(store: &LanguageStore) {
    let active = store.language();
    for config in LanguageRegistry::get().list() {
        let marker = if config.code == active.code() { "*" } else { " " };
        info!("{} {} {}", marker, config.code, config.native_name);
    }
}
