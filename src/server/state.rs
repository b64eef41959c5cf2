// src/server/state.rs
use anyhow::{bail, Result};
use log::{info, warn};

use crate::artifacts::ArtifactStore;
use crate::classifier::Classifier;
use crate::errors::{ServiceError, ServiceResult};
use crate::interpretation::InterpretationLookup;
use crate::models::crop::{find_entry, CropEntry, CropProfile};
use crate::utils::service_config::ServiceConfig;

/// Everything request handlers read. Built once at startup and never
/// mutated afterwards.
#[derive(Debug)]
pub struct AppState {
    catalogue: Vec<CropEntry>,
    default_crop: String,
    crops: Vec<CropProfile>,
    pub interpretations: InterpretationLookup,
}

impl AppState {
    /// Loads every catalogued crop. A crop that fails to load is logged and
    /// left out; startup only fails when no crop loads.
    pub fn load(config: &ServiceConfig) -> Result<Self> {
        let store = ArtifactStore::from_config(config);
        let mut crops = Vec::new();

        for entry in &config.crops {
            match load_profile(&store, entry) {
                Ok(profile) => {
                    info!("🌱 Crop {} ('{}') ready", entry.name, entry.prefix);
                    crops.push(profile);
                }
                Err(e) => warn!("⚠️ Could not load {} ('{}'): {}", entry.name, entry.prefix, e),
            }
        }

        if crops.is_empty() {
            bail!(
                "No crop model could be loaded from {} / {}",
                config.models_dir.display(),
                config.preproc_dir.display()
            );
        }
        info!("Serving {} of {} catalogued crops", crops.len(), config.crops.len());

        Ok(Self::from_profiles(config, crops))
    }

    pub fn from_profiles(config: &ServiceConfig, crops: Vec<CropProfile>) -> Self {
        Self {
            catalogue: config.crops.clone(),
            default_crop: config.default_crop.clone(),
            crops,
            interpretations: InterpretationLookup::from_config(config),
        }
    }

    /// Loaded crops, in catalogue order.
    pub fn crops(&self) -> &[CropProfile] {
        &self.crops
    }

    pub fn crop_names(&self) -> Vec<String> {
        self.crops.iter().map(|c| c.name.clone()).collect()
    }

    /// The loaded crop a request refers to; the default crop when it names none.
    pub fn resolve_crop(&self, requested: Option<&str>) -> ServiceResult<&CropProfile> {
        let requested = requested.unwrap_or(&self.default_crop);
        let entry = find_entry(&self.catalogue, requested).ok_or_else(|| {
            ServiceError::UnsupportedCrop {
                name: requested.to_string(),
                available: self.catalogue.iter().map(|e| e.name.clone()).collect(),
            }
        })?;
        self.crops
            .iter()
            .find(|profile| profile.prefix == entry.prefix)
            .ok_or_else(|| ServiceError::CropUnavailable(entry.name.clone()))
    }

    /// Crop whose schema `/meta` reports when the client does not ask for one.
    pub fn schema_crop(&self) -> Option<&CropProfile> {
        self.resolve_crop(None).ok().or_else(|| self.crops.first())
    }
}

pub fn load_profile(store: &ArtifactStore, entry: &CropEntry) -> ServiceResult<CropProfile> {
    let bundle = store.load(&entry.prefix)?;
    let classifier = Classifier::new(&bundle.weights, bundle.architecture())?;
    Ok(CropProfile {
        name: entry.name.clone(),
        prefix: entry.prefix.clone(),
        bundle,
        classifier,
    })
}
