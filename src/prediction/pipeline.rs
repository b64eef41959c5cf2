// src/prediction/pipeline.rs
use log::debug;

use crate::errors::ServiceResult;
use crate::features::FeatureMapper;
use crate::models::{CropProfile, PredictionResult, SiteObservation};

use super::resolver::resolve;

/// observation → features → probabilities → resolved (line, genes).
pub fn predict(profile: &CropProfile, observation: &SiteObservation) -> ServiceResult<PredictionResult> {
    let bundle = &profile.bundle;
    let input = FeatureMapper::model_input(observation, bundle)?;
    let probabilities = profile.classifier.predict(&input)?;
    let result = resolve(&probabilities, &bundle.class_labels, &bundle.gene_panel);
    debug!(
        "{}: predicted '{}' (genes from '{}', {} genes)",
        profile.name,
        result.predicted_line,
        result.genes_from_line,
        result.genes.len()
    );
    Ok(result)
}
