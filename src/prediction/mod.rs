// src/prediction/mod.rs
pub mod pipeline;
pub mod resolver;

pub use pipeline::predict;
pub use resolver::resolve;
