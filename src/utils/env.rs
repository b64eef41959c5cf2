// src/utils/env.rs
use log::{debug, info};

/// Loads variables from a `.env` file in the working directory, if one exists.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }
}
