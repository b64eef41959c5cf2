// src/artifacts/mod.rs
//! Discovery and loading of the frozen per-crop artifact set: class
//! labels, gene panel, fitted scaler and encoder, and model weights.

pub mod encoder;
pub mod latest;
pub mod scaler;
pub mod schema;
pub mod store;

pub use encoder::OneHotEncoder;
pub use latest::resolve_latest;
pub use scaler::StandardScaler;
pub use schema::{ColumnList, SchemaSource};
pub use store::{ArtifactBundle, ArtifactStore};
