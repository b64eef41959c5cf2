pub mod crop;
pub mod observation;
pub mod prediction;

pub use crop::{CropEntry, CropProfile};
pub use observation::{Measurement, ObservationField, SiteObservation};
pub use prediction::PredictionResult;
