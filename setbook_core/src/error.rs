//! Error types for the setbook_core library.

use crate::validate::Violations;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for setbook_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A record was rejected by the validation engine
    #[error("Validation failed: {0}")]
    Validation(#[from] Violations),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// No catalog entry with the given id
    #[error("Catalog entry not found: {0}")]
    CatalogEntryNotFound(String),

    /// Catalog entry cannot be removed while workouts reference it
    #[error("Catalog entry '{id}' is referenced by {references} workout(s)")]
    CatalogEntryInUse { id: String, references: usize },
}
