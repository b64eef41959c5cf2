// src/artifacts/latest.rs
use log::debug;
use std::path::{Path, PathBuf};

use crate::errors::{ServiceError, ServiceResult};

/// Returns the file in `dir` matching `pattern` that sorts last, which by
/// naming convention is the most recent version of the artifact.
pub fn resolve_latest(dir: &Path, pattern: &str) -> ServiceResult<PathBuf> {
    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );

    let mut candidates: Vec<PathBuf> = glob::glob(&full_pattern)?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();
    candidates.sort();

    match candidates.pop() {
        Some(latest) => {
            debug!(
                "Resolved '{}' in {} to {} ({} older candidates)",
                pattern,
                dir.display(),
                latest.display(),
                candidates.len()
            );
            Ok(latest)
        }
        None => Err(ServiceError::ArtifactNotFound {
            pattern: pattern.to_string(),
            dir: dir.to_path_buf(),
            existing: list_dir(dir),
        }),
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
