//! Preview derivations: counts and display labels computed from workouts.
//!
//! All functions are pure and never fail. The `draft_*` variants accept
//! partially-formed records and fall back to literal placeholders instead.

use crate::catalog::CatalogLookup;
use crate::types::*;
use crate::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Title shown when an exercise reference has no resolvable name
pub const UNNAMED_EXERCISE: &str = "Unnamed Exercise";

/// Title shown for a workout without a date
pub const UNDATED_WORKOUT: &str = "Workout (no date)";

/// Rendered in place of an absent weight or unit in set labels
pub const ABSENT_VALUE: &str = "undefined";

/// Rendered in place of a draft date that cannot be parsed
pub const INVALID_DATE: &str = "Invalid Date";

/// Title/subtitle pair handed to the display layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub title: String,
    pub subtitle: String,
}

/// Picker row for a catalog entry, with its image when it has one
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogEntryPreview {
    pub title: String,
    pub subtitle: String,
    pub media: Option<MediaRef>,
}

/// How the viewer wants dates rendered
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateDisplay {
    /// strftime-style pattern
    #[serde(default = "default_date_format")]
    pub format: String,

    /// Viewer's offset from UTC
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Default for DateDisplay {
    fn default() -> Self {
        Self {
            format: default_date_format(),
            utc_offset_minutes: 0,
        }
    }
}

fn default_date_format() -> String {
    // en-US short date, e.g. 1/1/2024
    "%-m/%-d/%Y".into()
}

impl DateDisplay {
    /// Check the pattern and offset are usable
    pub fn validate(&self) -> Result<()> {
        if StrftimeItems::new(&self.format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::Config(format!(
                "Invalid date format '{}'",
                self.format
            )));
        }
        if FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).is_none() {
            return Err(Error::Config(format!(
                "UTC offset of {} minutes is out of range",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// Render a timestamp as a calendar date in the viewer's offset
    pub fn format_date(&self, date: &DateTime<Utc>) -> String {
        let offset = FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        let local = date.with_timezone(&offset);

        let mut out = String::new();
        if write!(out, "{}", local.format(&self.format)).is_err() {
            return local.date_naive().to_string();
        }
        out
    }
}

// ============================================================================
// Counts
// ============================================================================

pub fn exercise_count(session: &WorkoutSession) -> usize {
    session.exercises.len()
}

pub fn total_sets(entry: &WorkoutExercise) -> usize {
    entry.sets.len()
}

// ============================================================================
// Labels
// ============================================================================

/// `"Set: {reps} reps"` / `"Weight: {weight} {unit}"`
///
/// Absent weight or unit render as the literal `undefined`.
pub fn set_label(set: &ExerciseSet) -> Preview {
    label_for_set(
        Some(set.reps.to_string()),
        set.weight.map(|w| w.to_string()),
        set.weight_unit.map(|u| u.as_str()),
    )
}

/// Name over difficulty. Inactive entries preview the same way.
pub fn catalog_entry_preview(entry: &CatalogEntry) -> CatalogEntryPreview {
    CatalogEntryPreview {
        title: entry.name.clone(),
        subtitle: entry.difficulty.to_string(),
        media: entry.media.clone(),
    }
}

pub fn exercise_preview_title<C>(entry: &WorkoutExercise, catalog: &C) -> String
where
    C: CatalogLookup + ?Sized,
{
    resolved_name(catalog, Some(&entry.exercise_ref))
}

pub fn exercise_preview_subtitle(entry: &WorkoutExercise) -> String {
    sets_subtitle(total_sets(entry))
}

pub fn exercise_preview<C>(entry: &WorkoutExercise, catalog: &C) -> Preview
where
    C: CatalogLookup + ?Sized,
{
    Preview {
        title: exercise_preview_title(entry, catalog),
        subtitle: exercise_preview_subtitle(entry),
    }
}

pub fn session_preview_title(session: &WorkoutSession, display: &DateDisplay) -> String {
    format!("Workout on {}", display.format_date(&session.date))
}

pub fn session_preview_subtitle(session: &WorkoutSession) -> String {
    session_subtitle(exercise_count(session), session.duration_seconds)
}

pub fn session_preview(session: &WorkoutSession, display: &DateDisplay) -> Preview {
    Preview {
        title: session_preview_title(session, display),
        subtitle: session_preview_subtitle(session),
    }
}

// ============================================================================
// Drafts
// ============================================================================

/// Values that are not numbers are shown as sent
pub fn draft_set_label(set: &ExerciseSetDraft) -> Preview {
    label_for_set(
        set.reps.as_ref().map(DraftNumber::to_string),
        set.weight.as_ref().map(DraftNumber::to_string),
        set.weight_unit.as_deref(),
    )
}

pub fn draft_exercise_preview<C>(entry: &WorkoutExerciseDraft, catalog: &C) -> Preview
where
    C: CatalogLookup + ?Sized,
{
    Preview {
        title: resolved_name(catalog, entry.exercise_ref.as_deref()),
        subtitle: sets_subtitle(entry.sets.as_ref().map_or(0, Vec::len)),
    }
}

/// An unparseable date renders as `Workout on Invalid Date`
pub fn draft_session_preview(session: &WorkoutDraft, display: &DateDisplay) -> Preview {
    let title = match session.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(date) => format!(
                "Workout on {}",
                display.format_date(&date.with_timezone(&Utc))
            ),
            Err(_) => format!("Workout on {}", INVALID_DATE),
        },
        None => UNDATED_WORKOUT.to_string(),
    };

    Preview {
        title,
        subtitle: session_subtitle(
            session.exercises.as_ref().map_or(0, Vec::len),
            session
                .duration_seconds
                .as_ref()
                .and_then(DraftNumber::as_f64)
                .unwrap_or(0.0),
        ),
    }
}

// ============================================================================
// Shared formatting
// ============================================================================

/// Exactly one is singular; every other count, including zero, is plural
fn sets_subtitle(n: usize) -> String {
    if n == 1 {
        "1 set".to_string()
    } else {
        format!("{} sets", n)
    }
}

fn session_subtitle(exercise_count: usize, duration_seconds: f64) -> String {
    format!("{} exercises • {}s", exercise_count, duration_seconds)
}

fn resolved_name<C>(catalog: &C, exercise_ref: Option<&str>) -> String
where
    C: CatalogLookup + ?Sized,
{
    exercise_ref
        .and_then(|id| catalog.resolve(id))
        .map(|entry| entry.name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNNAMED_EXERCISE)
        .to_string()
}

fn label_for_set(reps: Option<String>, weight: Option<String>, unit: Option<&str>) -> Preview {
    Preview {
        title: format!("Set: {} reps", reps.as_deref().unwrap_or(ABSENT_VALUE)),
        subtitle: format!(
            "Weight: {} {}",
            weight.as_deref().unwrap_or(ABSENT_VALUE),
            unit.unwrap_or(ABSENT_VALUE)
        ),
    }
}
