//! Custom Axum extractors.
//!
//! Extractors for parsing and validating request data.

pub mod validated;

pub use validated::{ValidJson, ValidQuery};
