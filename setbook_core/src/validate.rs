//! Validation engine: turns drafts into normalized records.
//!
//! Every field is checked and every violation is collected before a verdict
//! is returned, so callers can report all problems at once. Validation never
//! mutates its input, and defaults are only applied to records that are
//! accepted.

use crate::catalog::CatalogLookup;
use crate::types::*;
use chrono::{DateTime, Utc};
use std::fmt;
use url::Url;

/// A single field-level or structural problem with a draft
///
/// Paths are dotted and indexed, e.g. `exercises[0].sets[2].reps`.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("{path}: required field is missing")]
    MissingRequiredField { path: String },

    #[error("{path}: {value} is out of range (bound {bound})")]
    OutOfRange { path: String, value: f64, bound: f64 },

    #[error("{path}: '{value}' is not one of [{}]", .allowed.join(", "))]
    InvalidEnum {
        path: String,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("{path}: '{value}' is not a valid URI")]
    InvalidUri { path: String, value: String },

    #[error("{path}: must contain at least one element")]
    EmptySequence { path: String },

    #[error("{path}: no catalog entry with id '{id}'")]
    UnresolvedReference { path: String, id: String },

    #[error("{path}: {value} is not a whole number")]
    NotAnInteger { path: String, value: f64 },

    #[error("{path}: '{value}' is not an RFC 3339 timestamp")]
    InvalidTimestamp { path: String, value: String },

    #[error("{path}: {value} is not a number")]
    NotANumber { path: String, value: String },
}

impl Violation {
    /// Path of the offending field
    pub fn path(&self) -> &str {
        match self {
            Violation::MissingRequiredField { path }
            | Violation::OutOfRange { path, .. }
            | Violation::InvalidEnum { path, .. }
            | Violation::InvalidUri { path, .. }
            | Violation::EmptySequence { path }
            | Violation::UnresolvedReference { path, .. }
            | Violation::NotAnInteger { path, .. }
            | Violation::InvalidTimestamp { path, .. }
            | Violation::NotANumber { path, .. } => path,
        }
    }
}

/// Every violation found in one validation pass, in field order
#[derive(Clone, Debug, PartialEq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Validate a single set
pub fn validate_set(draft: &ExerciseSetDraft) -> Result<ExerciseSet, Violations> {
    let mut checker = Checker::default();
    let set = checker.set(draft, "");
    checker.finish("set", set)
}

/// Validate a catalog entry, defaulting `isActive` to true
pub fn validate_catalog_entry(draft: &CatalogEntryDraft) -> Result<CatalogEntry, Violations> {
    let mut checker = Checker::default();
    let entry = checker.catalog_entry(draft, "");
    checker.finish("catalog entry", entry)
}

/// Validate one workout exercise, resolving its reference against `catalog`
pub fn validate_workout_exercise<C>(
    draft: &WorkoutExerciseDraft,
    catalog: &C,
) -> Result<WorkoutExercise, Violations>
where
    C: CatalogLookup + ?Sized,
{
    let mut checker = Checker::default();
    let entry = checker.workout_exercise(draft, "", catalog);
    checker.finish("workout exercise", entry)
}

/// Validate a complete workout session
///
/// An empty exercise list is accepted; every exercise present must have at
/// least one set and must reference an existing catalog entry (inactive
/// entries still resolve).
pub fn validate_workout<C>(draft: &WorkoutDraft, catalog: &C) -> Result<WorkoutSession, Violations>
where
    C: CatalogLookup + ?Sized,
{
    let mut checker = Checker::default();
    let session = checker.workout(draft, catalog);
    checker.finish("workout", session)
}

// ============================================================================
// Field checks
// ============================================================================

fn field(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn index(prefix: &str, i: usize) -> String {
    format!("{}[{}]", prefix, i)
}

/// Accepts absolute URIs and references relative to an app-defined base
fn parses_as_uri(raw: &str) -> bool {
    if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    match Url::parse(raw) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("https://relative.invalid/")
            .and_then(|base| base.join(raw))
            .is_ok(),
        Err(_) => false,
    }
}

/// Collects violations while building the normalized value.
///
/// Each check returns `None` when it recorded a violation, so the caller can
/// run every check first and combine the results afterwards.
#[derive(Default)]
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn finish<T>(self, kind: &str, value: Option<T>) -> Result<T, Violations> {
        match value {
            Some(value) if self.violations.is_empty() => {
                tracing::debug!("Accepted {}", kind);
                Ok(value)
            }
            _ => {
                debug_assert!(!self.violations.is_empty());
                tracing::debug!("Rejected {} with {} violation(s)", kind, self.violations.len());
                Err(Violations(self.violations))
            }
        }
    }

    fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    fn required_text(&mut self, path: String, value: Option<&String>) -> Option<String> {
        match value {
            Some(text) if !text.trim().is_empty() => Some(text.clone()),
            _ => {
                self.push(Violation::MissingRequiredField { path });
                None
            }
        }
    }

    fn required<T: Copy>(&mut self, path: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.push(Violation::MissingRequiredField {
                path: path.to_string(),
            });
        }
        value
    }

    /// Reads a raw numeric field. The outer `None` means a violation was
    /// recorded; the inner `None` means the field is absent or blank.
    fn number(&mut self, path: &str, value: Option<&DraftNumber>) -> Option<Option<f64>> {
        let Some(raw) = value else {
            return Some(None);
        };
        if raw.is_blank() || raw.raw().is_null() {
            return Some(None);
        }
        match raw.as_f64() {
            Some(number) => Some(Some(number)),
            None => {
                self.push(Violation::NotANumber {
                    path: path.to_string(),
                    value: raw.raw().to_string(),
                });
                None
            }
        }
    }

    fn at_least(&mut self, path: &str, value: f64, bound: f64) -> Option<f64> {
        if value.is_finite() && value >= bound {
            Some(value)
        } else {
            self.push(Violation::OutOfRange {
                path: path.to_string(),
                value,
                bound,
            });
            None
        }
    }

    fn enumeration<T>(
        &mut self,
        path: String,
        raw: &str,
        allowed: &'static [&'static str],
        parse: fn(&str) -> Option<T>,
    ) -> Option<T> {
        let parsed = parse(raw);
        if parsed.is_none() {
            self.push(Violation::InvalidEnum {
                path,
                value: raw.to_string(),
                allowed,
            });
        }
        parsed
    }

    fn reps(&mut self, path: String, value: Option<&DraftNumber>) -> Option<u32> {
        let value = self.number(&path, value)?;
        let value = self.required(&path, value)?;
        if !value.is_finite() || value < 1.0 {
            self.push(Violation::OutOfRange {
                path,
                value,
                bound: 1.0,
            });
            return None;
        }
        if value.fract() != 0.0 {
            self.push(Violation::NotAnInteger { path, value });
            return None;
        }
        if value > f64::from(u32::MAX) {
            self.push(Violation::OutOfRange {
                path,
                value,
                bound: f64::from(u32::MAX),
            });
            return None;
        }
        Some(value as u32)
    }

    fn timestamp(&mut self, path: String, value: Option<&String>) -> Option<DateTime<Utc>> {
        let raw = self.required_text(path.clone(), value)?;
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(parsed) => Some(parsed.with_timezone(&Utc)),
            Err(_) => {
                self.push(Violation::InvalidTimestamp { path, value: raw });
                None
            }
        }
    }

    // ========================================================================
    // Records
    // ========================================================================

    fn set(&mut self, draft: &ExerciseSetDraft, path: &str) -> Option<ExerciseSet> {
        let reps = self.reps(field(path, "reps"), draft.reps.as_ref());

        let weight_path = field(path, "weight");
        let weight = match self.number(&weight_path, draft.weight.as_ref()) {
            Some(Some(weight)) => self.at_least(&weight_path, weight, 0.0).map(Some),
            other => other,
        };

        let unit = match optional_text(draft.weight_unit.as_ref()) {
            Some(raw) => self
                .enumeration(
                    field(path, "weightUnit"),
                    &raw,
                    WeightUnit::NAMES,
                    WeightUnit::from_name,
                )
                .map(Some),
            None => Some(None),
        };

        let (reps, weight, unit) = (reps?, weight?, unit?);
        let weight_unit = unit.or_else(|| weight.map(|_| WeightUnit::DEFAULT));

        Some(ExerciseSet {
            reps,
            weight,
            weight_unit,
        })
    }

    fn catalog_entry(&mut self, draft: &CatalogEntryDraft, path: &str) -> Option<CatalogEntry> {
        let id = self.required_text(field(path, "id"), draft.id.as_ref());
        let name = self.required_text(field(path, "name"), draft.name.as_ref());

        let difficulty = self
            .required_text(field(path, "difficulty"), draft.difficulty.as_ref())
            .and_then(|raw| {
                self.enumeration(
                    field(path, "difficulty"),
                    &raw,
                    Difficulty::NAMES,
                    Difficulty::from_name,
                )
            });

        let media = match &draft.media {
            Some(media) => {
                let media_path = field(path, "media");
                self.required_text(field(&media_path, "asset"), media.asset.as_ref())
                    .map(|asset| {
                        Some(MediaRef {
                            asset,
                            alt: optional_text(media.alt.as_ref()),
                        })
                    })
            }
            None => Some(None),
        };

        let video_url = match optional_text(draft.video_url.as_ref()) {
            Some(raw) if parses_as_uri(&raw) => Some(Some(raw)),
            Some(raw) => {
                self.push(Violation::InvalidUri {
                    path: field(path, "videoUrl"),
                    value: raw,
                });
                None
            }
            None => Some(None),
        };

        Some(CatalogEntry {
            id: id?,
            name: name?,
            description: optional_text(draft.description.as_ref()),
            difficulty: difficulty?,
            media: media?,
            video_url: video_url?,
            is_active: draft.is_active.unwrap_or(true),
        })
    }

    fn workout_exercise<C>(
        &mut self,
        draft: &WorkoutExerciseDraft,
        path: &str,
        catalog: &C,
    ) -> Option<WorkoutExercise>
    where
        C: CatalogLookup + ?Sized,
    {
        let ref_path = field(path, "exerciseRef");
        let exercise_ref = self
            .required_text(ref_path.clone(), draft.exercise_ref.as_ref())
            .and_then(|id| {
                if catalog.resolve(&id).is_some() {
                    Some(id)
                } else {
                    self.push(Violation::UnresolvedReference { path: ref_path, id });
                    None
                }
            });

        let sets_path = field(path, "sets");
        let sets = match &draft.sets {
            None => {
                self.push(Violation::MissingRequiredField { path: sets_path });
                None
            }
            Some(sets) if sets.is_empty() => {
                self.push(Violation::EmptySequence { path: sets_path });
                None
            }
            Some(sets) => {
                let checked: Vec<Option<ExerciseSet>> = sets
                    .iter()
                    .enumerate()
                    .map(|(i, set)| self.set(set, &index(&sets_path, i)))
                    .collect();
                checked.into_iter().collect::<Option<Vec<_>>>()
            }
        };

        Some(WorkoutExercise {
            exercise_ref: exercise_ref?,
            sets: sets?,
        })
    }

    fn workout<C>(&mut self, draft: &WorkoutDraft, catalog: &C) -> Option<WorkoutSession>
    where
        C: CatalogLookup + ?Sized,
    {
        let owner_id = self.required_text("ownerId".to_string(), draft.owner_id.as_ref());
        let date = self.timestamp("date".to_string(), draft.date.as_ref());
        let duration_seconds = self
            .number("durationSeconds", draft.duration_seconds.as_ref())
            .and_then(|duration| self.required("durationSeconds", duration))
            .and_then(|duration| self.at_least("durationSeconds", duration, 0.0));

        let exercises = match &draft.exercises {
            Some(exercises) => {
                let checked: Vec<Option<WorkoutExercise>> = exercises
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| {
                        self.workout_exercise(entry, &index("exercises", i), catalog)
                    })
                    .collect();
                checked.into_iter().collect::<Option<Vec<_>>>()
            }
            None => Some(Vec::new()),
        };

        Some(WorkoutSession {
            owner_id: owner_id?,
            date: date?,
            duration_seconds: duration_seconds?,
            exercises: exercises?,
        })
    }
}

/// Blank optional text is treated as absent
fn optional_text(value: Option<&String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty()).cloned()
}
