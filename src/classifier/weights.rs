// src/classifier/weights.rs
use candle_core::{DType, Device, Tensor};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::{ServiceError, ServiceResult};

pub const HIDDEN_1: usize = 256;
pub const HIDDEN_2: usize = 128;
pub const DROPOUT_P: f32 = 0.1;

// Checkpoints saved with optimizer state nest the parameters under one of these.
const WRAPPER_KEYS: [&str; 2] = ["model_state_dict", "state_dict"];

// Layer indices inside the sequential stack: linear, relu, dropout, linear, relu, dropout, linear.
pub const LAYER_NAMES: [&str; 3] = ["net.0", "net.3", "net.6"];

/// How to treat parameters the architecture expects but the file lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightPolicy {
    /// Zero-fill missing parameters and keep going.
    #[default]
    Lenient,
    /// Fail the load.
    Strict,
}

/// Parameter layout of the student network for one crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Architecture {
    pub input_dim: usize,
    pub n_classes: usize,
}

impl Architecture {
    pub fn new(input_dim: usize, n_classes: usize) -> Self {
        Self { input_dim, n_classes }
    }

    /// (in, out) width of each linear layer.
    pub fn layer_dims(&self) -> [(usize, usize); 3] {
        [
            (self.input_dim, HIDDEN_1),
            (HIDDEN_1, HIDDEN_2),
            (HIDDEN_2, self.n_classes),
        ]
    }

    /// Expected parameter names and shapes, in layer order.
    pub fn parameters(&self) -> Vec<(String, Vec<usize>)> {
        LAYER_NAMES
            .iter()
            .zip(self.layer_dims())
            .flat_map(|(layer, (fan_in, fan_out))| {
                [
                    (format!("{}.weight", layer), vec![fan_out, fan_in]),
                    (format!("{}.bias", layer), vec![fan_out]),
                ]
            })
            .collect()
    }
}

/// The parameter set conformed to an [`Architecture`]: every expected
/// parameter is present with the expected shape and dtype.
#[derive(Debug, Clone)]
pub struct StateDict {
    tensors: HashMap<String, Tensor>,
    zero_filled: Vec<String>,
}

impl StateDict {
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensors.get(name)
    }

    /// Parameters that were absent from the file and initialised to zero.
    pub fn zero_filled(&self) -> &[String] {
        &self.zero_filled
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}

/// Loads a safetensors weight file and conforms it to `arch`.
pub fn load_state_dict(
    path: &Path,
    arch: Architecture,
    policy: WeightPolicy,
    device: &Device,
) -> ServiceResult<StateDict> {
    let raw = candle_core::safetensors::load(path, device)
        .map_err(|e| ServiceError::model_load(path, e.to_string()))?;
    conform(path, raw, arch, policy, device)
}

/// Strips a checkpoint wrapper prefix, if the file uses one.
fn unwrap_checkpoint(raw: HashMap<String, Tensor>) -> HashMap<String, Tensor> {
    for key in WRAPPER_KEYS {
        let prefix = format!("{}.", key);
        if raw.keys().any(|name| name.starts_with(&prefix)) {
            debug!("Unwrapping weights nested under '{}'", key);
            return raw
                .into_iter()
                .filter_map(|(name, tensor)| {
                    name.strip_prefix(&prefix).map(|inner| (inner.to_string(), tensor))
                })
                .collect();
        }
    }
    raw
}

pub(crate) fn conform(
    path: &Path,
    raw: HashMap<String, Tensor>,
    arch: Architecture,
    policy: WeightPolicy,
    device: &Device,
) -> ServiceResult<StateDict> {
    let mut raw = unwrap_checkpoint(raw);
    let expected = arch.parameters();

    let mut tensors = HashMap::with_capacity(expected.len());
    let mut zero_filled = Vec::new();

    for (name, shape) in &expected {
        match raw.remove(name) {
            Some(tensor) => {
                if tensor.dims() != shape.as_slice() {
                    return Err(ServiceError::model_load(
                        path,
                        format!(
                            "size mismatch for {}: file has {:?}, model expects {:?}",
                            name,
                            tensor.dims(),
                            shape
                        ),
                    ));
                }
                tensors.insert(name.clone(), tensor.to_dtype(DType::F32)?);
            }
            None => zero_filled.push(name.clone()),
        }
    }

    if zero_filled.len() == expected.len() {
        return Err(ServiceError::model_load(
            path,
            "file contains none of the expected network parameters",
        ));
    }
    if !zero_filled.is_empty() {
        if policy == WeightPolicy::Strict {
            return Err(ServiceError::model_load(
                path,
                format!("missing parameters: {:?}", zero_filled),
            ));
        }
        warn!(
            "⚠️ {}: missing parameters {:?} were zero-initialised",
            path.display(),
            zero_filled
        );
        for (name, shape) in expected.iter().filter(|(n, _)| zero_filled.contains(n)) {
            tensors.insert(name.clone(), Tensor::zeros(shape.as_slice(), DType::F32, device)?);
        }
    }
    if !raw.is_empty() {
        let mut ignored: Vec<&String> = raw.keys().collect();
        ignored.sort();
        debug!("{}: ignoring unexpected parameters {:?}", path.display(), ignored);
    }

    info!(
        "Loaded {} parameters from {} ({} → {} → {} → {})",
        tensors.len() - zero_filled.len(),
        path.display(),
        arch.input_dim,
        HIDDEN_1,
        HIDDEN_2,
        arch.n_classes
    );
    Ok(StateDict { tensors, zero_filled })
}

#[cfg(test)]
pub(crate) fn random_parameters(arch: Architecture, device: &Device) -> HashMap<String, Tensor> {
    arch.parameters()
        .into_iter()
        .map(|(name, shape)| {
            let tensor = Tensor::randn(0f32, 0.1, shape.as_slice(), device).unwrap();
            (name, tensor)
        })
        .collect()
}
