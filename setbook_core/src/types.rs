//! Core domain types for Setbook.
//!
//! Every record exists in two shapes:
//! - a *draft*, as submitted by a client, where every field is optional and
//!   enumerations are raw strings
//! - a *normalized* record, produced only by the validation engine, where
//!   required fields are present and defaults have been applied
//!
//! Normalized records convert back into drafts so they can be re-validated.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Enumerations
// ============================================================================

/// Difficulty level of a catalog exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Wire names accepted by the validation engine
    pub const NAMES: &'static [&'static str] = &["beginner", "intermediate", "advanced"];

    /// Parse an exact wire name. Unknown values are never coerced.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit a set's weight was recorded in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lbs,
}

impl WeightUnit {
    /// Wire names accepted by the validation engine
    pub const NAMES: &'static [&'static str] = &["kg", "lbs"];

    /// Unit applied when a weight is recorded without one
    pub const DEFAULT: WeightUnit = WeightUnit::Lbs;

    /// Parse an exact wire name. Unknown values are never coerced.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "kg" => Some(WeightUnit::Kg),
            "lbs" => Some(WeightUnit::Lbs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Reference to an image asset held by the media store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaRef {
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// A reusable exercise definition (e.g., "Bench Press")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub is_active: bool,
}

// ============================================================================
// Workout Types
// ============================================================================

/// One performed set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// May be present without a weight; tolerated but carries no meaning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<WeightUnit>,
}

/// One catalog exercise performed within a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    /// Non-owning reference to a [`CatalogEntry`] by id
    pub exercise_ref: String,
    /// Sets in the order they were performed
    pub sets: Vec<ExerciseSet>,
}

/// A complete tracked workout for one owner
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    /// Opaque id supplied by the identity provider
    pub owner_id: String,
    pub date: DateTime<Utc>,
    pub duration_seconds: f64,
    pub exercises: Vec<WorkoutExercise>,
}

// ============================================================================
// Draft Types
// ============================================================================

/// A numeric draft field kept as the raw JSON value the client sent
///
/// Strings and other non-numbers survive deserialization so validation can
/// report them alongside every other violation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct DraftNumber(Value);

impl DraftNumber {
    /// The value as a number, if the client sent one
    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }

    /// Empty or whitespace-only string
    pub fn is_blank(&self) -> bool {
        matches!(&self.0, Value::String(text) if text.trim().is_empty())
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }
}

impl From<f64> for DraftNumber {
    fn from(value: f64) -> Self {
        DraftNumber(Value::from(value))
    }
}

impl From<u32> for DraftNumber {
    fn from(value: u32) -> Self {
        DraftNumber(Value::from(value))
    }
}

impl From<&str> for DraftNumber {
    fn from(value: &str) -> Self {
        DraftNumber(Value::from(value))
    }
}

/// Numbers print the way `f64` does, strings print bare
impl fmt::Display for DraftNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(text) => f.write_str(text),
            Value::Number(_) => match self.as_f64() {
                Some(n) => write!(f, "{}", n),
                None => write!(f, "{}", self.0),
            },
            other => write!(f, "{}", other),
        }
    }
}

/// Candidate media reference
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Candidate catalog entry
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Candidate set. `reps` is carried as a raw number so fractional input can be reported.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSetDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<DraftNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<DraftNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,
}

/// Candidate workout exercise
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<Vec<ExerciseSetDraft>>,
}

/// Candidate workout session
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// RFC 3339 timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<DraftNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<WorkoutExerciseDraft>>,
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The complete catalog of exercises, keyed by entry id
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub entries: HashMap<String, CatalogEntry>,
}

// ============================================================================
// Normalized -> Draft
// ============================================================================

impl From<&MediaRef> for MediaDraft {
    fn from(media: &MediaRef) -> Self {
        MediaDraft {
            asset: Some(media.asset.clone()),
            alt: media.alt.clone(),
        }
    }
}

impl From<&CatalogEntry> for CatalogEntryDraft {
    fn from(entry: &CatalogEntry) -> Self {
        CatalogEntryDraft {
            id: Some(entry.id.clone()),
            name: Some(entry.name.clone()),
            description: entry.description.clone(),
            difficulty: Some(entry.difficulty.as_str().to_string()),
            media: entry.media.as_ref().map(MediaDraft::from),
            video_url: entry.video_url.clone(),
            is_active: Some(entry.is_active),
        }
    }
}

impl From<&ExerciseSet> for ExerciseSetDraft {
    fn from(set: &ExerciseSet) -> Self {
        ExerciseSetDraft {
            reps: Some(DraftNumber::from(set.reps)),
            weight: set.weight.map(DraftNumber::from),
            weight_unit: set.weight_unit.map(|u| u.as_str().to_string()),
        }
    }
}

impl From<&WorkoutExercise> for WorkoutExerciseDraft {
    fn from(entry: &WorkoutExercise) -> Self {
        WorkoutExerciseDraft {
            exercise_ref: Some(entry.exercise_ref.clone()),
            sets: Some(entry.sets.iter().map(ExerciseSetDraft::from).collect()),
        }
    }
}

impl From<&WorkoutSession> for WorkoutDraft {
    fn from(session: &WorkoutSession) -> Self {
        WorkoutDraft {
            owner_id: Some(session.owner_id.clone()),
            date: Some(session.date.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            duration_seconds: Some(DraftNumber::from(session.duration_seconds)),
            exercises: Some(
                session
                    .exercises
                    .iter()
                    .map(WorkoutExerciseDraft::from)
                    .collect(),
            ),
        }
    }
}
