// src/features/mapper.rs
use log::{debug, warn};

use crate::artifacts::ArtifactBundle;
use crate::errors::{ServiceError, ServiceResult};
use crate::models::{ObservationField, SiteObservation};
use crate::utils::text::fold;

use super::field_mapping::FIELD_MATCHERS;
use super::texture::{is_texture_column, match_texture_column};

/// Unscaled numeric features, one value per schema column, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub values: Vec<f64>,
    /// Positions of the texture indicator columns
    pub texture_columns: Vec<usize>,
    /// The texture indicator set to 1.0, if the texture was recognised
    pub active_texture: Option<usize>,
    /// Fields whose value could not be read as a number and became 0.0
    pub defaulted_fields: Vec<ObservationField>,
}

pub struct FeatureMapper;

impl FeatureMapper {
    pub fn map(observation: &SiteObservation, bundle: &ArtifactBundle) -> FeatureRow {
        Self::map_columns(observation, &bundle.numeric_columns)
    }

    pub fn map_columns(observation: &SiteObservation, numeric_columns: &[String]) -> FeatureRow {
        let mut values = vec![0.0; numeric_columns.len()];

        let (texture_columns, regular_columns): (Vec<usize>, Vec<usize>) =
            (0..numeric_columns.len()).partition(|&i| is_texture_column(&numeric_columns[i]));
        let folded: Vec<String> = numeric_columns.iter().map(|c| fold(c)).collect();

        let mut defaulted_fields = Vec::new();
        for entry in FIELD_MATCHERS.iter() {
            let value = match observation.measurement(entry.field).as_f64() {
                Some(value) => value,
                None => {
                    warn!(
                        "Field '{}' is not numeric ({:?}); using 0.0",
                        entry.field.key(),
                        observation.measurement(entry.field)
                    );
                    defaulted_fields.push(entry.field);
                    0.0
                }
            };
            for &i in regular_columns.iter().filter(|&&i| entry.matches(&folded[i])) {
                values[i] = value;
            }
        }

        let named_textures: Vec<(usize, &str)> = texture_columns
            .iter()
            .map(|&i| (i, numeric_columns[i].as_str()))
            .collect();
        let active_texture = match_texture_column(&observation.textura_suelo, &named_textures);
        match active_texture {
            Some(i) => values[i] = 1.0,
            None if !texture_columns.is_empty() => debug!(
                "Texture '{}' has no indicator column in this model",
                observation.textura_suelo
            ),
            None => {}
        }

        FeatureRow {
            values,
            texture_columns,
            active_texture,
            defaulted_fields,
        }
    }

    /// The full model input: scaled numeric block followed by the encoded
    /// categorical block.
    pub fn model_input(observation: &SiteObservation, bundle: &ArtifactBundle) -> ServiceResult<Vec<f32>> {
        let row = Self::map(observation, bundle);
        let numeric = bundle.scaler.transform(&row.values)?;

        // Categorical inputs are not collected from clients; the encoder
        // sees empty strings.
        let categorical = if bundle.categorical_columns.is_empty() {
            Vec::new()
        } else {
            bundle
                .encoder
                .transform(&vec![String::new(); bundle.categorical_columns.len()])?
        };

        // A finite reading can still overflow f32 once scaled.
        let scaled = numeric.iter().zip(&bundle.numeric_columns).map(|(&v, column)| {
            let narrowed = v as f32;
            if narrowed.is_finite() {
                narrowed
            } else {
                warn!("Scaled value for '{}' is out of range ({}); using 0.0", column, v);
                0.0
            }
        });
        let input: Vec<f32> = scaled
            .chain(categorical.iter().map(|&v| v as f32))
            .collect();
        if input.len() != bundle.input_dim {
            return Err(ServiceError::InputDimension {
                expected: bundle.input_dim,
                actual: input.len(),
            });
        }
        Ok(input)
    }
}
