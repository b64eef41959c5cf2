// src/artifacts/store.rs
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::classifier::{load_state_dict, Architecture, StateDict, WeightPolicy};
use crate::errors::{ServiceError, ServiceResult};
use crate::utils::candle::inference_device;
use crate::utils::service_config::ServiceConfig;

use super::encoder::OneHotEncoder;
use super::latest::resolve_latest;
use super::scaler::StandardScaler;
use super::schema::{resolve_columns, ColumnFile, ColumnKind, SchemaSource};

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> ServiceResult<T> {
    let text = std::fs::read_to_string(path).map_err(|source| ServiceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| ServiceError::corrupt(path, e.to_string()))
}

#[derive(Debug, Deserialize)]
struct SiteMeta {
    #[serde(default)]
    class_names: Vec<String>,
    #[serde(flatten)]
    extra: Map<String, JsonValue>,
}

/// Everything needed to serve one crop, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub prefix: String,
    /// Scaler input columns, in the order the model expects them
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub numeric_schema: SchemaSource,
    pub categorical_schema: SchemaSource,
    pub scaler: StandardScaler,
    pub encoder: OneHotEncoder,
    pub class_labels: Vec<String>,
    pub gene_panel: HashMap<String, Vec<String>>,
    /// Metadata keys other than the class list, kept verbatim
    pub metadata: Map<String, JsonValue>,
    pub weights: StateDict,
    pub weights_path: PathBuf,
    pub input_dim: usize,
    pub output_dim: usize,
}

impl ArtifactBundle {
    pub fn architecture(&self) -> Architecture {
        Architecture::new(self.input_dim, self.output_dim)
    }

    pub fn genes_for(&self, label: &str) -> &[String] {
        self.gene_panel.get(label).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Resolves and loads per-crop artifacts from the models and
/// preprocessing directories.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    models_dir: PathBuf,
    preproc_dir: PathBuf,
    weight_policy: WeightPolicy,
}

impl ArtifactStore {
    pub fn new(models_dir: impl Into<PathBuf>, preproc_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            preproc_dir: preproc_dir.into(),
            weight_policy: WeightPolicy::default(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        let policy = if config.strict_weight_loading {
            WeightPolicy::Strict
        } else {
            WeightPolicy::Lenient
        };
        Self::new(&config.models_dir, &config.preproc_dir).with_weight_policy(policy)
    }

    pub fn with_weight_policy(mut self, policy: WeightPolicy) -> Self {
        self.weight_policy = policy;
        self
    }

    pub fn load(&self, prefix: &str) -> ServiceResult<ArtifactBundle> {
        debug!("Loading artifacts for prefix '{}'", prefix);

        let meta_path = resolve_latest(&self.models_dir, &format!("{}_site_meta*.json", prefix))?;
        let panel_path =
            resolve_latest(&self.models_dir, &format!("{}_line_gene_panel*.json", prefix))?;
        let weights_path =
            resolve_latest(&self.models_dir, &format!("{}_site_student*.safetensors", prefix))?;
        let scaler_path = resolve_latest(&self.preproc_dir, &format!("{}_scaler*.json", prefix))?;
        let encoder_path = resolve_latest(&self.preproc_dir, &format!("{}_ohe*.json", prefix))?;

        let meta: SiteMeta = read_json(&meta_path)?;
        if meta.class_names.is_empty() {
            return Err(ServiceError::corrupt(&meta_path, "class_names is empty"));
        }
        let gene_panel = load_gene_panel(&panel_path, &meta.class_names)?;

        let scaler = StandardScaler::from_path(&scaler_path)?;
        let encoder = OneHotEncoder::from_path(&encoder_path)?;

        let mut column_file = ColumnFile::new(&self.preproc_dir, prefix);
        let (numeric_columns, numeric_schema) =
            resolve_columns(scaler.feature_names(), &mut column_file, ColumnKind::Numeric)?;
        // An encoder fitted on nothing needs no names to be authoritative.
        let no_inputs: &[String] = &[];
        let fitted_categorical = encoder
            .feature_names()
            .or((encoder.n_inputs() == 0).then_some(no_inputs));
        let (categorical_columns, categorical_schema) =
            resolve_columns(fitted_categorical, &mut column_file, ColumnKind::Categorical)?;

        if numeric_columns.len() != scaler.n_features() {
            return Err(ServiceError::corrupt(
                &scaler_path,
                format!(
                    "scaler expects {} columns but the schema lists {}",
                    scaler.n_features(),
                    numeric_columns.len()
                ),
            ));
        }
        if categorical_columns.len() != encoder.n_inputs() {
            return Err(ServiceError::corrupt(
                &encoder_path,
                format!(
                    "encoder expects {} columns but the schema lists {}",
                    encoder.n_inputs(),
                    categorical_columns.len()
                ),
            ));
        }

        let input_dim = numeric_columns.len() + encoder.output_width();
        let output_dim = meta.class_names.len();
        let arch = Architecture::new(input_dim, output_dim);
        let weights = load_state_dict(&weights_path, arch, self.weight_policy, inference_device())?;

        info!(
            "✅ Loaded '{}': {} numeric + {} categorical columns (input {}), {} classes",
            prefix,
            numeric_columns.len(),
            categorical_columns.len(),
            input_dim,
            output_dim
        );

        Ok(ArtifactBundle {
            prefix: prefix.to_string(),
            numeric_columns,
            categorical_columns,
            numeric_schema,
            categorical_schema,
            scaler,
            encoder,
            class_labels: meta.class_names,
            gene_panel,
            metadata: meta.extra,
            weights,
            weights_path,
            input_dim,
            output_dim,
        })
    }
}

fn load_gene_panel(path: &Path, class_labels: &[String]) -> ServiceResult<HashMap<String, Vec<String>>> {
    let raw: HashMap<String, Option<Vec<String>>> = read_json(path)?;
    let panel: HashMap<String, Vec<String>> = raw
        .into_iter()
        .map(|(label, genes)| (label, genes.unwrap_or_default()))
        .collect();

    let unknown: Vec<&String> = panel
        .keys()
        .filter(|label| !class_labels.contains(label))
        .collect();
    if !unknown.is_empty() {
        warn!(
            "Gene panel {} lists labels that are not model classes: {:?}",
            path.display(),
            unknown
        );
    }
    Ok(panel)
}
