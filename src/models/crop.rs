// src/models/crop.rs
use crate::artifacts::ArtifactBundle;
use crate::classifier::Classifier;
use crate::utils::text::fold;

/// Catalogue entry: the name clients use and the prefix its artifacts carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropEntry {
    pub name: String,
    pub prefix: String,
}

/// A crop that loaded successfully at startup. Immutable for the life
/// of the process.
#[derive(Debug)]
pub struct CropProfile {
    pub name: String,
    pub prefix: String,
    pub bundle: ArtifactBundle,
    pub classifier: Classifier,
}

/// Finds a catalogue entry by exact display name, then by a case- and
/// accent-insensitive comparison.
pub fn find_entry<'a>(catalogue: &'a [CropEntry], requested: &str) -> Option<&'a CropEntry> {
    let requested = requested.trim();
    catalogue
        .iter()
        .find(|entry| entry.name == requested)
        .or_else(|| {
            let folded = fold(requested);
            catalogue.iter().find(|entry| fold(&entry.name) == folded)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Vec<CropEntry> {
        vec![
            CropEntry { name: "Sandía".to_string(), prefix: "red3".to_string() },
            CropEntry { name: "Maíz".to_string(), prefix: "maiz".to_string() },
        ]
    }

    #[test]
    fn test_find_entry_exact_and_folded() {
        let crops = catalogue();
        assert_eq!(find_entry(&crops, "Sandía").unwrap().prefix, "red3");
        assert_eq!(find_entry(&crops, "sandia").unwrap().prefix, "red3");
        assert_eq!(find_entry(&crops, " MAIZ ").unwrap().prefix, "maiz");
        assert!(find_entry(&crops, "Tomate").is_none());
    }
}
