// src/main.rs
use std::sync::Arc;

use storage_planner::advisor;
use storage_planner::api::{self, ApiState};
use storage_planner::config::AppConfig;
use storage_planner::inventory::Inventory;
use storage_planner::store::JsonFileStore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    info!("🚀 Storage planner starting...");

    let store = Arc::new(JsonFileStore::new(app_config.store.data_file().clone()));
    let inventory = match Inventory::open(
        store,
        app_config.snap.snap_config(),
        app_config.store.seed_defaults(),
    ) {
        Ok(inventory) => inventory,
        Err(err) => {
            error!(
                "❌ Could not load planner state from {}: {}",
                app_config.store.data_file().display(),
                err
            );
            std::process::exit(1);
        }
    };

    let layout_advisor = match advisor::from_config(&app_config.advisor) {
        Ok(advisor) => Arc::from(advisor),
        Err(err) => {
            error!("❌ Could not set up layout advisor: {}", err);
            std::process::exit(1);
        }
    };

    let state = ApiState::new(inventory, layout_advisor);
    if let Err(err) = api::start_api_server(app_config.api.clone(), state).await {
        error!("❌ API server terminated with an error: {err}");
        std::process::exit(1);
    }
}
