// src/features/field_mapping.rs
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ObservationField;

/// Column-name patterns that identify where a field's value goes.
pub struct FieldPatterns {
    pub field: ObservationField,
    /// Regular expressions over the folded column name. Unanchored entries
    /// behave as plain substring matches.
    pub patterns: &'static [&'static str],
}

/// Field → patterns. A field fills every column whose folded name matches
/// one of its patterns; artifact generations have used different
/// spellings for the same measurement.
pub const FIELD_PATTERNS: [FieldPatterns; 12] = [
    FieldPatterns { field: ObservationField::Temperatura, patterns: &["temperatura", "temp"] },
    FieldPatterns { field: ObservationField::HumedadRelativa, patterns: &["humedad relativa"] },
    FieldPatterns { field: ObservationField::IntensidadLuminica, patterns: &["intensidad lumin"] },
    FieldPatterns { field: ObservationField::Ph, patterns: &["ph del suelo"] },
    FieldPatterns { field: ObservationField::HumedadSuelo, patterns: &["humedad del suelo"] },
    FieldPatterns { field: ObservationField::CarbonoOrganico, patterns: &["carbono organico"] },
    FieldPatterns { field: ObservationField::NitrogenoTotal, patterns: &["nitrogeno total"] },
    FieldPatterns { field: ObservationField::FosforoSoluble, patterns: &["fosforo soluble"] },
    FieldPatterns { field: ObservationField::AguaPorcentual, patterns: &["peg", "agua"] },
    FieldPatterns { field: ObservationField::Nacl, patterns: &["nacl"] },
    FieldPatterns { field: ObservationField::Cd, patterns: &[r"cd \("] },
    // Anchored: "total (" would otherwise contain "al (".
    FieldPatterns { field: ObservationField::Al, patterns: &[r"^al \("] },
];

/// [`FIELD_PATTERNS`] compiled once, in table order.
pub struct FieldMatcher {
    pub field: ObservationField,
    regexes: Vec<Regex>,
}

impl FieldMatcher {
    /// `folded_column` must already be passed through [`crate::utils::text::fold`].
    pub fn matches(&self, folded_column: &str) -> bool {
        self.regexes.iter().any(|re| re.is_match(folded_column))
    }
}

pub static FIELD_MATCHERS: Lazy<Vec<FieldMatcher>> = Lazy::new(|| {
    FIELD_PATTERNS
        .iter()
        .map(|entry| FieldMatcher {
            field: entry.field,
            regexes: entry
                .patterns
                .iter()
                .filter_map(|pattern| match Regex::new(pattern) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!("Skipping invalid pattern '{}' for {}: {}", pattern, entry.field.key(), e);
                        None
                    }
                })
                .collect(),
        })
        .collect()
});
