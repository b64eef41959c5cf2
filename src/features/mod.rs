// src/features/mod.rs
//! Turns a loosely-typed site observation into the exact numeric row a
//! crop's scaler and network expect.

pub mod field_mapping;
pub mod mapper;
pub mod texture;

pub use field_mapping::{FieldMatcher, FieldPatterns, FIELD_MATCHERS, FIELD_PATTERNS};
pub use mapper::{FeatureMapper, FeatureRow};
pub use texture::{normalize_texture, TextureVariants, TEXTURE_KEYWORDS, TEXTURE_VARIANTS};
