#![forbid(unsafe_code)]

//! Core domain model and business logic for Setbook.
//!
//! This crate provides:
//! - Domain types (catalog entries, workouts, exercises, sets) and their drafts
//! - The validation engine that turns drafts into normalized records
//! - Preview derivations (labels, counts) and aggregates (volume, records)
//! - Catalog management
//! - Persistence (WAL, catalog file, CSV export)

pub mod types;
pub mod error;
pub mod validate;
pub mod preview;
pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod wal;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use validate::{
    validate_catalog_entry, validate_set, validate_workout, validate_workout_exercise,
    Violation, Violations,
};
pub use preview::{CatalogEntryPreview, DateDisplay, Preview};
pub use catalog::{build_default_catalog, get_default_catalog, CatalogLookup};
pub use config::Config;
pub use wal::{JsonlSink, StoredWorkout, WorkoutSink};
