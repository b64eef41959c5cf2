// src/main.rs
use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

use abiostress_lib::server::{self, AppState};
use abiostress_lib::utils::env::load_env;
use abiostress_lib::utils::service_config::ServiceConfig;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    info!("Starting abiotic stress line classifier");
    load_env();

    let config = ServiceConfig::from_env();
    config.log_config();

    let start_time = Instant::now();
    // Artifact parsing and tensor setup are CPU-bound.
    let state = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || AppState::load(&config))
            .await
            .context("Artifact loading task panicked")?
            .context("Failed to load crop models")?
    };
    info!(
        "✅ Loaded {} crop(s) in {:.2?}: {:?}",
        state.crops().len(),
        start_time.elapsed(),
        state.crop_names()
    );

    server::serve(state, &config.bind_addr).await
}
