// src/features/texture.rs
use crate::utils::text::fold;

/// Stems marking a numeric column as a soil-texture indicator. Stems rather
/// than words so feminine and plural spellings ("Arenosa", "Limosos") count.
pub const TEXTURE_KEYWORDS: [&str; 4] = ["franco", "arenos", "arcillos", "limos"];

/// A user-facing texture category and the column spellings it may have
/// in a model's schema.
pub struct TextureVariants {
    pub category: &'static str,
    pub column_spellings: &'static [&'static str],
}

pub const TEXTURE_VARIANTS: [TextureVariants; 7] = [
    TextureVariants { category: "arenoso", column_spellings: &["Arenoso", "Arenosa"] },
    TextureVariants {
        category: "franco-arenoso",
        column_spellings: &["Franco-arenoso", "Franco-arenosa", "Franco Arenoso"],
    },
    TextureVariants { category: "franco", column_spellings: &["Franco"] },
    TextureVariants {
        category: "franco-arcilloso",
        column_spellings: &["Franco-arcilloso", "Franco Arcilloso"],
    },
    TextureVariants { category: "arcilloso", column_spellings: &["Arcilloso", "Arcillosa"] },
    TextureVariants { category: "limoso", column_spellings: &["Limoso", "Limosa", "Limosos"] },
    TextureVariants {
        category: "franco-limoso",
        column_spellings: &["Franco-limoso", "Franco Limoso"],
    },
];

/// Trim, fold case and accents, and join words with hyphens:
/// `" Franco Arenoso "` → `"franco-arenoso"`.
pub fn normalize_texture(raw: &str) -> String {
    fold(raw.trim()).replace(' ', "-")
}

pub fn is_texture_column(column: &str) -> bool {
    let folded = fold(column);
    TEXTURE_KEYWORDS.iter().any(|keyword| folded.contains(keyword))
}

/// Picks the texture column to activate for a user's texture label.
///
/// `texture_columns` holds (position, name) pairs. Spellings are tried in
/// table order, and for each spelling the columns in schema order, so the
/// result is deterministic when a schema carries several spellings.
pub fn match_texture_column(raw_texture: &str, texture_columns: &[(usize, &str)]) -> Option<usize> {
    let category = normalize_texture(raw_texture);
    let variants = TEXTURE_VARIANTS.iter().find(|v| v.category == category)?;
    variants.column_spellings.iter().find_map(|spelling| {
        let wanted = fold(spelling);
        texture_columns
            .iter()
            .find(|(_, name)| fold(name) == wanted)
            .map(|(position, _)| *position)
    })
}
