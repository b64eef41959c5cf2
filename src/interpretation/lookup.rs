// src/interpretation/lookup.rs
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{ServiceError, ServiceResult};
use crate::utils::service_config::ServiceConfig;
use crate::utils::text::fold;

/// Pseudo-crop selecting every available table.
pub const ALL_CROPS: &str = "Todos";

const ID_HEADERS: [&str; 2] = ["id", "id del gen"];
const NAME_HEADERS: [&str; 2] = ["nombre", "name"];
const FUNCTION_HEADERS: [&str; 2] = ["funcion", "function"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpretationRow {
    pub id: String,
    pub nombre: String,
    pub funcion: String,
    pub cultivo: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Id,
    Nombre,
    Funcion,
    Cultivo,
}

impl SearchField {
    /// Unknown field names search the identifier.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("nombre") => SearchField::Nombre,
            Some("funcion") => SearchField::Funcion,
            Some("cultivo") => SearchField::Cultivo,
            _ => SearchField::Id,
        }
    }

    fn value<'a>(&self, row: &'a InterpretationRow) -> &'a str {
        match self {
            SearchField::Id => &row.id,
            SearchField::Nombre => &row.nombre,
            SearchField::Funcion => &row.funcion,
            SearchField::Cultivo => &row.cultivo,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterpretationQuery {
    pub cultivo: Option<String>,
    pub q: Option<String>,
    pub field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpretationPage {
    pub rows: Vec<InterpretationRow>,
    pub total: usize,
    pub cultivos: Vec<String>,
}

/// Reads the configured tables on every call, so a replaced file is
/// visible to the next request without a restart.
#[derive(Debug, Clone)]
pub struct InterpretationLookup {
    files: Vec<(String, PathBuf)>,
}

impl InterpretationLookup {
    pub fn new(files: Vec<(String, PathBuf)>) -> Self {
        Self { files }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.interpretation_paths())
    }

    pub fn lookup(&self, query: &InterpretationQuery) -> ServiceResult<InterpretationPage> {
        let selected = self.select_files(query.cultivo.as_deref())?;

        let mut rows = Vec::new();
        for (crop, path) in &selected {
            rows.extend(read_table(crop, path)?);
        }

        if let Some(needle) = query.q.as_deref().filter(|q| !q.is_empty()) {
            let field = SearchField::parse(query.field.as_deref());
            let needle = needle.to_lowercase();
            rows.retain(|row| field.value(row).to_lowercase().contains(&needle));
        }

        let cultivos = std::iter::once(ALL_CROPS.to_string())
            .chain(
                self.files
                    .iter()
                    .filter(|(_, path)| path.exists())
                    .map(|(crop, _)| crop.clone()),
            )
            .collect();

        Ok(InterpretationPage {
            total: rows.len(),
            rows,
            cultivos,
        })
    }

    fn select_files(&self, crop: Option<&str>) -> ServiceResult<Vec<(String, PathBuf)>> {
        let selected: Vec<(String, PathBuf)> = match crop.filter(|c| *c != ALL_CROPS) {
            Some(requested) => {
                let folded = fold(requested.trim());
                match self.files.iter().find(|(name, _)| fold(name) == folded) {
                    Some((name, path)) if path.exists() => vec![(name.clone(), path.clone())],
                    Some((name, _)) => {
                        return Err(ServiceError::InterpretationNotFound(format!(
                            "Interpretation file for {} not found",
                            name
                        )))
                    }
                    None => Vec::new(),
                }
            }
            None => self
                .files
                .iter()
                .filter(|(_, path)| path.exists())
                .cloned()
                .collect(),
        };

        if selected.is_empty() {
            return Err(ServiceError::InterpretationNotFound(
                "No interpretation files found".to_string(),
            ));
        }
        Ok(selected)
    }
}

fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|candidate| headers.iter().position(|h| h == candidate))
}

fn read_table(crop: &str, path: &Path) -> ServiceResult<Vec<InterpretationRow>> {
    let csv_error = |source| ServiceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(fold)
        .collect();
    let (id, nombre, funcion) = match (
        find_column(&headers, &ID_HEADERS),
        find_column(&headers, &NAME_HEADERS),
        find_column(&headers, &FUNCTION_HEADERS),
    ) {
        (Some(id), Some(nombre), Some(funcion)) => (id, nombre, funcion),
        _ => return Err(ServiceError::SchemaColumnMissing(crop.to_string())),
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let cell = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        rows.push(InterpretationRow {
            id: cell(id),
            nombre: cell(nombre),
            funcion: cell(funcion),
            cultivo: crop.to_string(),
        });
    }
    debug!("Read {} interpretation rows for {} from {}", rows.len(), crop, path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn lookup_with(dir: &Path, tables: &[(&str, &str, Option<&str>)]) -> InterpretationLookup {
        let files = tables
            .iter()
            .map(|(crop, file, content)| {
                let path = dir.join(file);
                if let Some(content) = content {
                    fs::write(&path, content).unwrap();
                }
                (crop.to_string(), path)
            })
            .collect();
        InterpretationLookup::new(files)
    }

    const SANDIA: &str = "ID del gen, Nombre ,Función\n\
                          ClHKT1,Transportador HKT1,Exclusión de Na+\n\
                          ClAPX, Ascorbato peroxidasa ,Estrés oxidativo\n";
    const MAIZ: &str = "id,name,function\nZmNAC1,NAC1,Factor de transcripción\n";

    fn query(cultivo: Option<&str>, q: Option<&str>, field: Option<&str>) -> InterpretationQuery {
        InterpretationQuery {
            cultivo: cultivo.map(String::from),
            q: q.map(String::from),
            field: field.map(String::from),
        }
    }

    #[test]
    fn test_all_tables_combined_and_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = lookup_with(
            dir.path(),
            &[("Sandía", "sandia.csv", Some(SANDIA)), ("Maíz", "maiz.csv", Some(MAIZ))],
        );

        let page = lookup.lookup(&query(None, None, None)).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.cultivos, vec!["Todos", "Sandía", "Maíz"]);
        assert_eq!(
            page.rows[1],
            InterpretationRow {
                id: "ClAPX".to_string(),
                nombre: "Ascorbato peroxidasa".to_string(),
                funcion: "Estrés oxidativo".to_string(),
                cultivo: "Sandía".to_string(),
            }
        );
        assert_eq!(page.rows[2].cultivo, "Maíz");

        let todos = lookup.lookup(&query(Some("Todos"), None, None)).unwrap();
        assert_eq!(todos.total, 3);
    }

    #[test]
    fn test_filter_by_field_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = lookup_with(dir.path(), &[("Sandía", "sandia.csv", Some(SANDIA))]);

        let page = lookup.lookup(&query(None, Some("OXIDATIVO"), Some("funcion"))).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].id, "ClAPX");

        // Unknown field falls back to the identifier.
        let page = lookup.lookup(&query(None, Some("hkt"), Some("bogus"))).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].id, "ClHKT1");

        let page = lookup.lookup(&query(None, Some("sandía"), Some("cultivo"))).unwrap();
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_single_crop_selection() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = lookup_with(
            dir.path(),
            &[("Sandía", "sandia.csv", Some(SANDIA)), ("Maíz", "maiz.csv", Some(MAIZ))],
        );
        let page = lookup.lookup(&query(Some("Maíz"), None, None)).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].id, "ZmNAC1");
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = lookup_with(
            dir.path(),
            &[("Sandía", "sandia.csv", Some(SANDIA)), ("Maíz", "maiz.csv", None)],
        );

        match lookup.lookup(&query(Some("Maíz"), None, None)) {
            Err(ServiceError::InterpretationNotFound(msg)) => assert!(msg.contains("Maíz")),
            other => panic!("expected not found, got {:?}", other),
        }
        assert!(matches!(
            lookup.lookup(&query(Some("Tomate"), None, None)),
            Err(ServiceError::InterpretationNotFound(_))
        ));
        assert_eq!(
            lookup.lookup(&query(None, None, None)).unwrap().cultivos,
            vec!["Todos", "Sandía"]
        );

        let empty = lookup_with(dir.path(), &[("Maíz", "maiz.csv", None)]);
        assert!(matches!(
            empty.lookup(&query(None, None, None)),
            Err(ServiceError::InterpretationNotFound(_))
        ));
    }

    #[test]
    fn test_missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = lookup_with(
            dir.path(),
            &[("Sandía", "sandia.csv", Some("id,nombre\nX,Y\n"))],
        );
        match lookup.lookup(&query(None, None, None)) {
            Err(ServiceError::SchemaColumnMissing(crop)) => assert_eq!(crop, "Sandía"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_file_changes_are_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = lookup_with(dir.path(), &[("Maíz", "maiz.csv", Some(MAIZ))]);
        assert_eq!(lookup.lookup(&query(None, None, None)).unwrap().total, 1);

        fs::write(
            dir.path().join("maiz.csv"),
            format!("{}ZmDREB2,DREB2,Tolerancia a sequía\n", MAIZ),
        )
        .unwrap();
        assert_eq!(lookup.lookup(&query(None, None, None)).unwrap().total, 2);
    }
}
