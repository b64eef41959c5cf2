// src/bin/inspect_artifacts.rs
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use abiostress_lib::artifacts::{ArtifactStore, SchemaSource};
use abiostress_lib::classifier::WeightPolicy;
use abiostress_lib::models::{CropEntry, CropProfile, SiteObservation};
use abiostress_lib::prediction;
use abiostress_lib::server::state::load_profile;
use abiostress_lib::utils::env::load_env;
use abiostress_lib::utils::service_config::ServiceConfig;

#[derive(Parser)]
#[command(author, version, about = "Load crop artifacts and report what the service would serve", long_about = None)]
struct InspectArgs {
    /// Artifact prefix to inspect (e.g. red3); every catalogued crop when omitted
    #[arg(long)]
    crop: Option<String>,

    /// JSON observation to run through the full prediction pipeline
    #[arg(long)]
    observation: Option<PathBuf>,

    /// Fail on missing weight parameters instead of zero-filling them
    #[arg(long)]
    strict: bool,
}

fn describe_source(source: &SchemaSource) -> String {
    match source {
        SchemaSource::FittedObject => "fitted object".to_string(),
        SchemaSource::ColumnFile(path) => format!("column file {}", path.display()),
    }
}

fn report(profile: &CropProfile) {
    let bundle = &profile.bundle;
    println!("== {} ('{}') ==", profile.name, profile.prefix);
    println!("weights:      {}", bundle.weights_path.display());
    let arch = profile.classifier.architecture();
    let [(_, hidden_1), (_, hidden_2), _] = arch.layer_dims();
    println!(
        "network:      {} -> {} -> {} -> {} classes",
        arch.input_dim, hidden_1, hidden_2, arch.n_classes
    );
    if !bundle.metadata.is_empty() {
        println!("metadata:     {}", serde_json::Value::Object(bundle.metadata.clone()));
    }
    if !bundle.weights.zero_filled().is_empty() {
        println!("zero-filled:  {:?}", bundle.weights.zero_filled());
    }
    println!(
        "numeric ({}, from {}):",
        bundle.numeric_columns.len(),
        describe_source(&bundle.numeric_schema)
    );
    for column in &bundle.numeric_columns {
        println!("  - {}", column);
    }
    println!(
        "categorical ({}, from {}): {:?}",
        bundle.categorical_columns.len(),
        describe_source(&bundle.categorical_schema),
        bundle.categorical_columns
    );
    println!("classes:");
    for label in &bundle.class_labels {
        println!("  - {:<12} {} genes", label, bundle.genes_for(label).len());
    }
}

fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = InspectArgs::parse();

    let config = ServiceConfig::from_env();
    let mut store = ArtifactStore::from_config(&config);
    if args.strict {
        store = store.with_weight_policy(WeightPolicy::Strict);
    }

    let entries: Vec<CropEntry> = match &args.crop {
        Some(prefix) => vec![config
            .crops
            .iter()
            .find(|entry| &entry.prefix == prefix)
            .cloned()
            .unwrap_or_else(|| CropEntry {
                name: prefix.clone(),
                prefix: prefix.clone(),
            })],
        None => config.crops.clone(),
    };

    let observation: Option<SiteObservation> = match &args.observation {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Some(
                serde_json::from_str(&raw)
                    .with_context(|| format!("{} is not a valid observation", path.display()))?,
            )
        }
        None => None,
    };

    let mut failures = 0;
    for entry in &entries {
        let profile = match load_profile(&store, entry) {
            Ok(profile) => profile,
            Err(e) => {
                warn!("⚠️ {} ('{}') failed to load: {}", entry.name, entry.prefix, e);
                failures += 1;
                continue;
            }
        };
        report(&profile);

        if let Some(observation) = &observation {
            let result = prediction::predict(&profile, observation)
                .with_context(|| format!("Prediction failed for {}", profile.name))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        println!();
    }

    info!("Inspected {} crop(s), {} failed", entries.len(), failures);
    if failures == entries.len() {
        bail!("No crop artifacts could be loaded");
    }
    Ok(())
}
