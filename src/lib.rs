// src/lib.rs
pub mod artifacts;
pub mod classifier;
pub mod errors;
pub mod features;
pub mod interpretation;
pub mod models;
pub mod prediction;
pub mod server;
pub mod utils;
