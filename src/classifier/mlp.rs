// src/classifier/mlp.rs
use candle_core::{Device, Module, Tensor, D};
use candle_nn::{Dropout, Linear};

use crate::errors::{ServiceError, ServiceResult};
use crate::utils::candle::inference_device;

use super::weights::{Architecture, StateDict, DROPOUT_P, LAYER_NAMES};

/// linear → relu → dropout → linear → relu → dropout → linear
#[derive(Debug, Clone)]
struct StudentMlp {
    hidden_1: Linear,
    hidden_2: Linear,
    output: Linear,
    dropout: Dropout,
}

impl StudentMlp {
    fn new(weights: &StateDict) -> ServiceResult<Self> {
        let layer = |name: &str| -> ServiceResult<Linear> {
            let param = |suffix: &str| {
                let key = format!("{}.{}", name, suffix);
                weights.get(&key).cloned().ok_or_else(|| {
                    ServiceError::model_load(name, format!("parameter {} not loaded", key))
                })
            };
            Ok(Linear::new(param("weight")?, Some(param("bias")?)))
        };
        Ok(Self {
            hidden_1: layer(LAYER_NAMES[0])?,
            hidden_2: layer(LAYER_NAMES[1])?,
            output: layer(LAYER_NAMES[2])?,
            dropout: Dropout::new(DROPOUT_P),
        })
    }

    /// Inference-mode forward pass: dropout is the identity.
    fn logits(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let xs = self.hidden_1.forward(xs)?.relu()?;
        let xs = self.dropout.forward(&xs, false)?;
        let xs = self.hidden_2.forward(&xs)?.relu()?;
        let xs = self.dropout.forward(&xs, false)?;
        self.output.forward(&xs)
    }
}

/// A crop's trained network, ready for inference.
#[derive(Debug, Clone)]
pub struct Classifier {
    net: StudentMlp,
    arch: Architecture,
    device: Device,
}

impl Classifier {
    pub fn new(weights: &StateDict, arch: Architecture) -> ServiceResult<Self> {
        Ok(Self {
            net: StudentMlp::new(weights)?,
            arch,
            device: inference_device().clone(),
        })
    }

    pub fn architecture(&self) -> Architecture {
        self.arch
    }

    /// Class probabilities for one preprocessed feature row, in class-label order.
    pub fn predict(&self, row: &[f32]) -> ServiceResult<Vec<f64>> {
        if row.len() != self.arch.input_dim {
            return Err(ServiceError::InputDimension {
                expected: self.arch.input_dim,
                actual: row.len(),
            });
        }
        let xs = Tensor::from_slice(row, (1, row.len()), &self.device)?;
        let logits = self.net.logits(&xs)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?
            .squeeze(0)?
            .to_vec1::<f32>()?;
        let probs: Vec<f64> = probs.into_iter().map(f64::from).collect();
        if probs.iter().any(|p| !p.is_finite()) {
            return Err(ServiceError::NonFiniteOutput(probs));
        }
        Ok(probs)
    }
}
