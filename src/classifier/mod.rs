// src/classifier/mod.rs
//! Feed-forward classifier over the preprocessed feature vector.

pub mod mlp;
pub mod weights;

pub use mlp::Classifier;
pub use weights::{load_state_dict, Architecture, StateDict, WeightPolicy};
