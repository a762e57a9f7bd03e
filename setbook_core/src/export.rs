//! CSV export of logged workouts, one row per set.
//!
//! The export is written to a temp file, fsynced, then renamed over the
//! destination so a failed export never leaves a truncated file behind.

use crate::catalog::CatalogLookup;
use crate::wal::StoredWorkout;
use crate::{Error, Result};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    workout_id: String,
    date: String,
    owner_id: &'a str,
    duration_seconds: f64,
    exercise_ref: &'a str,
    exercise_name: Option<&'a str>,
    set_index: usize,
    reps: u32,
    weight: Option<f64>,
    weight_unit: Option<&'static str>,
}

/// Write every set of every workout to `csv_path`
///
/// Rows follow workout order, then exercise order, then set order.
/// Returns the number of rows written.
pub fn export_csv<C>(workouts: &[StoredWorkout], catalog: &C, csv_path: &Path) -> Result<usize>
where
    C: CatalogLookup + ?Sized,
{
    let parent = match csv_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(temp.as_file());

    let mut rows = 0;
    for stored in workouts {
        let workout = &stored.workout;
        for entry in &workout.exercises {
            let exercise_name = catalog
                .resolve(&entry.exercise_ref)
                .map(|e| e.name.as_str());
            for (set_index, set) in entry.sets.iter().enumerate() {
                writer.serialize(CsvRow {
                    workout_id: stored.id.to_string(),
                    date: workout.date.to_rfc3339(),
                    owner_id: &workout.owner_id,
                    duration_seconds: workout.duration_seconds,
                    exercise_ref: &entry.exercise_ref,
                    exercise_name,
                    set_index: set_index + 1,
                    reps: set.reps,
                    weight: set.weight,
                    weight_unit: set.weight_unit.map(|u| u.as_str()),
                })?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    drop(writer);
    temp.as_file().sync_all()?;
    temp.persist(csv_path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} sets to {:?}", rows, csv_path);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::wal::{read_workouts, JsonlSink, WorkoutSink};
    use crate::{ExerciseSet, WeightUnit, WorkoutExercise, WorkoutSession};

    fn create_test_workout() -> WorkoutSession {
        WorkoutSession {
            owner_id: "u1".into(),
            date: "2024-01-01T10:00:00Z".parse().unwrap(),
            duration_seconds: 1800.0,
            exercises: vec![
                WorkoutExercise {
                    exercise_ref: "bench-press".into(),
                    sets: vec![
                        ExerciseSet {
                            reps: 10,
                            weight: Some(60.0),
                            weight_unit: Some(WeightUnit::Kg),
                        },
                        ExerciseSet {
                            reps: 8,
                            weight: Some(65.0),
                            weight_unit: Some(WeightUnit::Kg),
                        },
                    ],
                },
                WorkoutExercise {
                    exercise_ref: "retired-move".into(),
                    sets: vec![ExerciseSet {
                        reps: 20,
                        weight: None,
                        weight_unit: None,
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_export_writes_one_row_per_set() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("workouts.wal");
        let csv_path = temp_dir.path().join("workouts.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_workout()).unwrap();
        sink.append(&create_test_workout()).unwrap();

        let workouts = read_workouts(&wal_path).unwrap();
        let count = export_csv(&workouts, &build_default_catalog(), &csv_path).unwrap();
        assert_eq!(count, 6);

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "workout_id");
        assert_eq!(&headers[5], "exercise_name");

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 6);
        assert_eq!(&records[0][5], "Bench Press");
        assert_eq!(&records[0][6], "1");
        assert_eq!(&records[1][6], "2");
        assert_eq!(&records[1][7], "8");
        assert_eq!(&records[1][9], "kg");
        // Unresolved references and bodyweight sets leave empty cells
        assert_eq!(&records[2][5], "");
        assert_eq!(&records[2][8], "");
    }

    #[test]
    fn test_export_replaces_previous_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("workouts.csv");
        std::fs::write(&csv_path, "stale").unwrap();

        let count = export_csv(&[], &build_default_catalog(), &csv_path).unwrap();
        assert_eq!(count, 0);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(!contents.contains("stale"));
    }
}
