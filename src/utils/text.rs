// src/utils/text.rs
//! Text folding used wherever artifact column names or user labels are
//! compared: artifact files exported from different tools disagree on
//! accents and capitalisation ("Carbono orgánico" vs "carbono organico").

/// Lowercases and strips the diacritics that occur in Spanish column names.
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
