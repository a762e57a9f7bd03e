//! Aggregates over many workouts: training volume and personal records.
//!
//! Volume is always reported in kilograms so sets logged in different units
//! can be summed. Sets without a weight contribute no volume.

use crate::types::*;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Exact international avoirdupois pound
pub const KG_PER_LB: f64 = 0.453_592_37;

impl WeightUnit {
    /// Convert a weight in this unit to kilograms
    pub fn to_kg(&self, weight: f64) -> f64 {
        match self {
            WeightUnit::Kg => weight,
            WeightUnit::Lbs => weight * KG_PER_LB,
        }
    }
}

/// Weight of a set in kilograms, if it has one
fn weight_kg(set: &ExerciseSet) -> Option<f64> {
    set.weight
        .map(|w| set.weight_unit.unwrap_or(WeightUnit::DEFAULT).to_kg(w))
}

/// reps × weight, in kilograms
pub fn set_volume_kg(set: &ExerciseSet) -> f64 {
    weight_kg(set).map_or(0.0, |kg| f64::from(set.reps) * kg)
}

pub fn exercise_volume_kg(entry: &WorkoutExercise) -> f64 {
    entry.sets.iter().map(set_volume_kg).sum()
}

pub fn session_volume_kg(session: &WorkoutSession) -> f64 {
    session.exercises.iter().map(exercise_volume_kg).sum()
}

/// Training volume for one ISO week (weeks start on Monday, bucketed in UTC)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeeklyVolume {
    pub iso_year: i32,
    pub iso_week: u32,
    pub workouts: usize,
    pub sets: usize,
    pub volume_kg: f64,
}

/// Volume per ISO week, oldest week first
pub fn weekly_volume(sessions: &[WorkoutSession]) -> Vec<WeeklyVolume> {
    let mut weeks: BTreeMap<(i32, u32), WeeklyVolume> = BTreeMap::new();

    for session in sessions {
        let week = session.date.iso_week();
        let bucket = weeks
            .entry((week.year(), week.week()))
            .or_insert_with(|| WeeklyVolume {
                iso_year: week.year(),
                iso_week: week.week(),
                workouts: 0,
                sets: 0,
                volume_kg: 0.0,
            });
        bucket.workouts += 1;
        bucket.sets += session.exercises.iter().map(|e| e.sets.len()).sum::<usize>();
        bucket.volume_kg += session_volume_kg(session);
    }

    weeks.into_values().collect()
}

/// Heaviest set ever logged for one catalog exercise
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PersonalRecord {
    pub exercise_ref: String,
    /// Weight as logged
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub weight_kg: f64,
    pub reps: u32,
    pub date: DateTime<Utc>,
}

impl PersonalRecord {
    fn beats(&self, other: &PersonalRecord) -> bool {
        if self.weight_kg != other.weight_kg {
            return self.weight_kg > other.weight_kg;
        }
        if self.reps != other.reps {
            return self.reps > other.reps;
        }
        self.date < other.date
    }
}

/// Heaviest set per exercise, sorted by exercise id
///
/// Ties on weight go to the set with more reps, then to the earlier workout.
pub fn personal_records(sessions: &[WorkoutSession]) -> Vec<PersonalRecord> {
    let mut best: HashMap<&str, PersonalRecord> = HashMap::new();

    for session in sessions {
        for entry in &session.exercises {
            for set in &entry.sets {
                let (Some(weight), Some(kg)) = (set.weight, weight_kg(set)) else {
                    continue;
                };
                let candidate = PersonalRecord {
                    exercise_ref: entry.exercise_ref.clone(),
                    weight,
                    weight_unit: set.weight_unit.unwrap_or(WeightUnit::DEFAULT),
                    weight_kg: kg,
                    reps: set.reps,
                    date: session.date,
                };
                let replace = best
                    .get(entry.exercise_ref.as_str())
                    .map_or(true, |current| candidate.beats(current));
                if replace {
                    best.insert(&entry.exercise_ref, candidate);
                }
            }
        }
    }

    let mut records: Vec<PersonalRecord> = best.into_values().collect();
    records.sort_by(|a, b| a.exercise_ref.cmp(&b.exercise_ref));
    records
}
