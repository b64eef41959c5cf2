// src/models/prediction.rs
use serde::{Serialize, Serializer};

/// Final answer for one prediction request.
///
/// `predicted_line` is always the most probable class; `genes_from_line`
/// names the class the gene list was actually taken from, which differs
/// when the top class has no genes of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predicted_line: String,
    /// One entry per class label, in class-label order
    #[serde(serialize_with = "serialize_ordered_map")]
    pub probabilities: Vec<(String, f64)>,
    pub genes: Vec<String>,
    pub genes_from_line: String,
}

impl PredictionResult {
    pub fn probability_of(&self, label: &str) -> Option<f64> {
        self.probabilities
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, p)| *p)
    }
}

fn serialize_ordered_map<S: Serializer>(
    entries: &[(String, f64)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_serialize_as_object() {
        let result = PredictionResult {
            predicted_line: "L2".to_string(),
            probabilities: vec![("L2".to_string(), 0.75), ("L1".to_string(), 0.25)],
            genes: vec!["ClHKT1".to_string()],
            genes_from_line: "L2".to_string(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"predicted_line":"L2","probabilities":{"L2":0.75,"L1":0.25},"genes":["ClHKT1"],"genes_from_line":"L2"}"#
        );
        assert_eq!(result.probability_of("L1"), Some(0.25));
        assert_eq!(result.probability_of("L9"), None);
    }
}
