// src/artifacts/schema.rs
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::ServiceResult;

use super::latest::resolve_latest;
use super::store::read_json;

/// Side-channel column list written next to the fitted preprocessors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColumnList {
    #[serde(default)]
    pub numeric: Vec<String>,
    #[serde(default)]
    pub categorical: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Where a bundle's column schema came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Names recorded by the fitted scaler or encoder itself.
    FittedObject,
    /// The column-list file, used when the fitted object records no names.
    ColumnFile(PathBuf),
}

/// The column-list file for one crop, only located and read on first use.
pub struct ColumnFile<'a> {
    dir: &'a Path,
    pattern: String,
    loaded: Option<(PathBuf, ColumnList)>,
}

impl<'a> ColumnFile<'a> {
    pub fn new(dir: &'a Path, prefix: &str) -> Self {
        Self {
            dir,
            pattern: format!("{}_columns*.json", prefix),
            loaded: None,
        }
    }

    fn get(&mut self) -> ServiceResult<&(PathBuf, ColumnList)> {
        let loaded = match self.loaded.take() {
            Some(loaded) => loaded,
            None => {
                let path = resolve_latest(self.dir, &self.pattern)?;
                let columns: ColumnList = read_json(&path)?;
                debug!(
                    "Read column list {} ({} numeric, {} categorical)",
                    path.display(),
                    columns.numeric.len(),
                    columns.categorical.len()
                );
                (path, columns)
            }
        };
        Ok(self.loaded.insert(loaded))
    }
}

/// Picks the authoritative column names: the fitted object's own record
/// when it has one, the column-list file otherwise.
pub fn resolve_columns(
    fitted: Option<&[String]>,
    column_file: &mut ColumnFile<'_>,
    kind: ColumnKind,
) -> ServiceResult<(Vec<String>, SchemaSource)> {
    if let Some(names) = fitted {
        return Ok((names.to_vec(), SchemaSource::FittedObject));
    }
    let (path, list) = column_file.get()?;
    let columns = match kind {
        ColumnKind::Numeric => list.numeric.clone(),
        ColumnKind::Categorical => list.categorical.clone(),
    };
    Ok((columns, SchemaSource::ColumnFile(path.clone())))
}
