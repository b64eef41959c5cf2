// src/artifacts/encoder.rs
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::Path;

use crate::errors::{ServiceError, ServiceResult};

use super::store::read_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
    InfrequentIfExist,
}

#[derive(Debug, Clone, Deserialize)]
struct EncoderExport {
    #[serde(default)]
    feature_names_in: Option<Vec<String>>,
    categories: Vec<Vec<JsonValue>>,
    #[serde(default)]
    handle_unknown: HandleUnknown,
}

/// Fitted one-hot encoder: one indicator per known category, per column.
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoder {
    feature_names: Option<Vec<String>>,
    categories: Vec<Vec<String>>,
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    pub fn from_path(path: &Path) -> ServiceResult<Self> {
        let export: EncoderExport = read_json(path)?;
        if let Some(names) = &export.feature_names_in {
            if names.len() != export.categories.len() {
                return Err(ServiceError::corrupt(
                    path,
                    format!(
                        "encoder lists {} input columns but {} category sets",
                        names.len(),
                        export.categories.len()
                    ),
                ));
            }
        }
        // Category vocabularies may be numeric; they are matched as text.
        let categories = export
            .categories
            .into_iter()
            .map(|values| {
                values
                    .into_iter()
                    .map(|v| match v {
                        JsonValue::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            feature_names: export.feature_names_in,
            categories,
            handle_unknown: export.handle_unknown,
        })
    }

    /// An encoder with no input columns, producing a zero-width block.
    pub fn empty() -> Self {
        Self {
            feature_names: None,
            categories: Vec::new(),
            handle_unknown: HandleUnknown::Ignore,
        }
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn n_inputs(&self) -> usize {
        self.categories.len()
    }

    /// Width of the encoded block.
    pub fn output_width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn transform(&self, row: &[String]) -> ServiceResult<Vec<f64>> {
        if row.len() != self.categories.len() {
            return Err(ServiceError::EncoderMismatch(format!(
                "encoder was fitted on {} columns, got {}",
                self.categories.len(),
                row.len()
            )));
        }

        let mut encoded = Vec::with_capacity(self.output_width());
        for (column, (value, known)) in row.iter().zip(&self.categories).enumerate() {
            let hit = known.iter().position(|category| category == value);
            if hit.is_none() && self.handle_unknown == HandleUnknown::Error {
                return Err(ServiceError::EncoderMismatch(format!(
                    "unknown category '{}' in column {}",
                    value,
                    self.column_label(column)
                )));
            }
            encoded.extend((0..known.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
        }
        Ok(encoded)
    }

    fn column_label(&self, column: usize) -> String {
        self.feature_names
            .as_ref()
            .and_then(|names| names.get(column).cloned())
            .unwrap_or_else(|| format!("#{}", column))
    }
}
