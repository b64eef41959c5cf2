// src/artifacts/scaler.rs
use ndarray::Array1;
use serde::Deserialize;
use std::path::Path;

use crate::errors::{ServiceError, ServiceResult};

use super::store::read_json;

/// JSON export of a fitted standardization transform.
#[derive(Debug, Clone, Deserialize)]
struct ScalerExport {
    #[serde(default)]
    feature_names_in: Option<Vec<String>>,
    #[serde(default)]
    mean: Option<Vec<f64>>,
    #[serde(default)]
    scale: Option<Vec<f64>>,
    #[serde(default)]
    n_features_in: Option<usize>,
}

/// Fitted standardization: `(x - mean) / scale` per numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    feature_names: Option<Vec<String>>,
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn from_path(path: &Path) -> ServiceResult<Self> {
        let export: ScalerExport = read_json(path)?;
        Self::from_export(export).map_err(|reason| ServiceError::corrupt(path, reason))
    }

    fn from_export(export: ScalerExport) -> Result<Self, String> {
        let sizes = [
            ("n_features_in", export.n_features_in),
            ("feature_names_in", export.feature_names_in.as_ref().map(Vec::len)),
            ("mean", export.mean.as_ref().map(Vec::len)),
            ("scale", export.scale.as_ref().map(Vec::len)),
        ];
        let n_features = sizes
            .iter()
            .find_map(|(_, size)| *size)
            .ok_or_else(|| "scaler records no feature count, names, mean or scale".to_string())?;
        if let Some((name, size)) = sizes
            .iter()
            .find(|(_, size)| size.is_some_and(|s| s != n_features))
        {
            return Err(format!(
                "scaler field '{}' has {} entries, expected {}",
                name,
                size.unwrap_or_default(),
                n_features
            ));
        }

        let mean = export
            .mean
            .map(Array1::from)
            .unwrap_or_else(|| Array1::zeros(n_features));
        // Zero-variance columns were fitted with a unit scale.
        let scale = export
            .scale
            .map(|s| Array1::from(s).mapv(|v| if v == 0.0 { 1.0 } else { v }))
            .unwrap_or_else(|| Array1::ones(n_features));

        Ok(Self {
            feature_names: export.feature_names_in,
            mean,
            scale,
        })
    }

    /// Column names recorded when the scaler was fitted, if any.
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, row: &[f64]) -> ServiceResult<Array1<f64>> {
        if row.len() != self.n_features() {
            return Err(ServiceError::InputDimension {
                expected: self.n_features(),
                actual: row.len(),
            });
        }
        let x = Array1::from(row.to_vec());
        Ok((x - &self.mean) / &self.scale)
    }
}

#[cfg(test)]
impl StandardScaler {
    pub(crate) fn new_for_tests(names: &[&str], mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            feature_names: Some(names.iter().map(|s| s.to_string()).collect()),
            mean: Array1::from(mean),
            scale: Array1::from(scale),
        }
    }
}
