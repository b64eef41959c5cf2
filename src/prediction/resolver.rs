// src/prediction/resolver.rs
use log::debug;
use std::collections::HashMap;

use crate::models::PredictionResult;

/// Index of the largest probability; the first one wins a tie.
fn argmax(probabilities: &[f64]) -> usize {
    probabilities
        .iter()
        .enumerate()
        .fold(0, |best, (i, p)| if *p > probabilities[best] { i } else { best })
}

/// Class indices from most to least probable, ties kept in index order.
fn ranking(probabilities: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
    order
}

/// Applies the gene fallback policy to a probability vector.
///
/// The most probable class is always reported as `predicted_line`. If it
/// has no genes, the genes come from the most probable class that has
/// some; if none does, the gene list is empty and attributed to the top
/// class.
///
/// `probabilities` and `class_labels` must be the same non-empty length.
pub fn resolve(
    probabilities: &[f64],
    class_labels: &[String],
    gene_panel: &HashMap<String, Vec<String>>,
) -> PredictionResult {
    debug_assert_eq!(probabilities.len(), class_labels.len());
    debug_assert!(!class_labels.is_empty());

    let genes_of = |label: &str| gene_panel.get(label).filter(|genes| !genes.is_empty());

    let top = argmax(probabilities);
    let predicted_line = class_labels[top].clone();

    let (genes_from_line, genes) = match genes_of(&predicted_line) {
        Some(genes) => (predicted_line.clone(), genes.clone()),
        None => ranking(probabilities)
            .into_iter()
            .find_map(|i| genes_of(&class_labels[i]).map(|genes| (class_labels[i].clone(), genes.clone())))
            .unwrap_or_else(|| (predicted_line.clone(), Vec::new())),
    };
    if genes_from_line != predicted_line {
        debug!(
            "Line '{}' has no genes; showing genes of '{}'",
            predicted_line, genes_from_line
        );
    }

    PredictionResult {
        predicted_line,
        probabilities: class_labels
            .iter()
            .cloned()
            .zip(probabilities.iter().copied())
            .collect(),
        genes,
        genes_from_line,
    }
}
