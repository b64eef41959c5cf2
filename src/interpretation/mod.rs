// src/interpretation/mod.rs
//! Static per-crop gene interpretation tables, filtered on request.

pub mod lookup;

pub use lookup::{
    InterpretationLookup, InterpretationPage, InterpretationQuery, InterpretationRow, SearchField,
    ALL_CROPS,
};
