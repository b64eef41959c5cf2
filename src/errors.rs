// src/errors.rs
//! Error taxonomy shared by the artifact loader, the prediction pipeline
//! and the interpretation lookup.

use std::path::PathBuf;

use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no file matches '{pattern}' in {dir}; current contents: {existing:?}")]
    ArtifactNotFound {
        pattern: String,
        dir: PathBuf,
        existing: Vec<String>,
    },

    #[error("artifact {path} is corrupt: {reason}")]
    ArtifactCorrupt { path: PathBuf, reason: String },

    #[error("could not load model weights from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("unsupported crop: {name}. Available: {available:?}")]
    UnsupportedCrop { name: String, available: Vec<String> },

    #[error("model not available for {0}")]
    CropUnavailable(String),

    #[error("categorical encoder mismatch: {0}")]
    EncoderMismatch(String),

    #[error("model input has {actual} features, expected {expected}")]
    InputDimension { expected: usize, actual: usize },

    #[error("model produced non-finite probabilities: {0:?}")]
    NonFiniteOutput(Vec<f64>),

    #[error("the interpretation file for {0} does not contain the required columns (ID, Nombre, Funcion)")]
    SchemaColumnMissing(String),

    #[error("{0}")]
    InterpretationNotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read table {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("tensor operation failed: {0}")]
    Tensor(#[from] candle_core::Error),

    #[error("invalid artifact pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl ServiceError {
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ServiceError::ArtifactCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn model_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ServiceError::ModelLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
