// src/utils/service_config.rs
use log::{info, warn};
use std::env;
use std::path::PathBuf;

use crate::models::crop::CropEntry;

const DEFAULT_CROPS: &str = "Sandía=red3,Maíz=maiz,Algodón=gh";
const DEFAULT_INTERPRETATION_FILES: &str =
    "Sandía=interpretaciones_sandia.csv,Maíz=interpretaciones_maiz.csv";

/// Runtime configuration for the prediction service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Per-crop metadata, gene panels and weights
    pub models_dir: PathBuf,
    /// Per-crop scaler, encoder and column-list exports
    pub preproc_dir: PathBuf,
    /// Per-crop interpretation tables
    pub interpretation_dir: PathBuf,
    /// Display name → artifact prefix, in catalogue order
    pub crops: Vec<CropEntry>,
    /// Crop used when a prediction request names none
    pub default_crop: String,
    /// Display name → interpretation file name
    pub interpretation_files: Vec<(String, String)>,
    /// Reject weight files with missing parameters instead of zero-filling them
    pub strict_weight_loading: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            models_dir: PathBuf::from("models"),
            preproc_dir: PathBuf::from("preproc"),
            interpretation_dir: PathBuf::from("db"),
            crops: parse_crops(DEFAULT_CROPS),
            default_crop: "Sandía".to_string(),
            interpretation_files: parse_pairs(DEFAULT_INTERPRETATION_FILES),
            strict_weight_loading: false,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let crops = env::var("CROPS")
            .ok()
            .map(|raw| parse_crops(&raw))
            .filter(|crops| !crops.is_empty())
            .unwrap_or(defaults.crops);

        let interpretation_files = env::var("INTERPRETATION_FILES")
            .ok()
            .map(|raw| parse_pairs(&raw))
            .filter(|files| !files.is_empty())
            .unwrap_or(defaults.interpretation_files);

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            models_dir: env::var("MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.models_dir),
            preproc_dir: env::var("PREPROC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.preproc_dir),
            interpretation_dir: env::var("INTERPRETATION_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.interpretation_dir),
            crops,
            default_crop: env::var("DEFAULT_CROP").unwrap_or(defaults.default_crop),
            interpretation_files,
            strict_weight_loading: env::var("STRICT_WEIGHT_LOADING")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<bool>()
                .unwrap_or(false),
        }
    }

    pub fn log_config(&self) {
        info!("🌱 Service configuration:");
        info!("   Bind address: {}", self.bind_addr);
        info!("   Models dir: {}", self.models_dir.display());
        info!("   Preprocessing dir: {}", self.preproc_dir.display());
        info!("   Interpretation dir: {}", self.interpretation_dir.display());
        for crop in &self.crops {
            info!("   Crop {} → prefix '{}'", crop.name, crop.prefix);
        }
        if !self.crops.iter().any(|c| c.name == self.default_crop) {
            warn!(
                "   Default crop '{}' is not in the crop catalogue",
                self.default_crop
            );
        } else {
            info!("   Default crop: {}", self.default_crop);
        }
        if self.strict_weight_loading {
            info!("   Weight loading: STRICT (missing parameters are fatal for the crop)");
        } else {
            info!("   Weight loading: lenient (missing parameters are zero-filled)");
        }
    }

    /// Interpretation files as (crop name, full path), in configuration order.
    pub fn interpretation_paths(&self) -> Vec<(String, PathBuf)> {
        self.interpretation_files
            .iter()
            .map(|(crop, file)| (crop.clone(), self.interpretation_dir.join(file)))
            .collect()
    }
}

fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                warn!("Ignoring malformed configuration entry '{}'", pair);
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

fn parse_crops(raw: &str) -> Vec<CropEntry> {
    parse_pairs(raw)
        .into_iter()
        .map(|(name, prefix)| CropEntry { name, prefix })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.crops.len(), 3);
        assert_eq!(config.crops[0].name, "Sandía");
        assert_eq!(config.crops[0].prefix, "red3");
        assert_eq!(config.crops[2].prefix, "gh");
        assert_eq!(config.default_crop, "Sandía");
        assert!(!config.strict_weight_loading);
    }

    #[test]
    fn test_env_config() {
        env::set_var("CROPS", "Tomate=tom1, Sorgo = sor");
        env::set_var("DEFAULT_CROP", "Tomate");
        env::set_var("STRICT_WEIGHT_LOADING", "true");
        env::set_var("MODELS_DIR", "/srv/models");

        let config = ServiceConfig::from_env();
        assert_eq!(config.crops.len(), 2);
        assert_eq!(config.crops[1].name, "Sorgo");
        assert_eq!(config.crops[1].prefix, "sor");
        assert_eq!(config.default_crop, "Tomate");
        assert!(config.strict_weight_loading);
        assert_eq!(config.models_dir, PathBuf::from("/srv/models"));

        // Clean up
        env::remove_var("CROPS");
        env::remove_var("DEFAULT_CROP");
        env::remove_var("STRICT_WEIGHT_LOADING");
        env::remove_var("MODELS_DIR");
    }

    #[test]
    fn test_malformed_pairs_are_skipped() {
        let pairs = parse_pairs("a=1,broken,=2,b=");
        assert_eq!(pairs, vec![("a".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_interpretation_paths_join_dir() {
        let config = ServiceConfig {
            interpretation_dir: PathBuf::from("/data/db"),
            ..ServiceConfig::default()
        };
        let paths = config.interpretation_paths();
        assert_eq!(paths[0].0, "Sandía");
        assert_eq!(paths[0].1, PathBuf::from("/data/db/interpretaciones_sandia.csv"));
    }
}
