//! Write-Ahead Log (WAL) for workout persistence.
//!
//! Workouts are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access. Only normalized [`WorkoutSession`]s can
//! be appended, so a rejected draft never reaches storage.

use crate::{Result, WorkoutSession};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Storage envelope around an accepted workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredWorkout {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub workout: WorkoutSession,
}

/// Workout sink trait for persisting accepted workouts
pub trait WorkoutSink {
    fn append(&mut self, workout: &WorkoutSession) -> Result<StoredWorkout>;
}

/// JSONL-based workout sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl WorkoutSink for JsonlSink {
    fn append(&mut self, workout: &WorkoutSession) -> Result<StoredWorkout> {
        self.ensure_parent_dir()?;

        let stored = StoredWorkout {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            workout: workout.clone(),
        };
        // Serialize before touching the file so a failure leaves no partial line
        let line = serde_json::to_string(&stored)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::info!(
            "Logged workout {} ({} exercises) to WAL",
            stored.id,
            stored.workout.exercises.len()
        );
        Ok(stored)
    }
}

/// Read all workouts from a WAL file, in the order they were logged
pub fn read_workouts(path: &Path) -> Result<Vec<StoredWorkout>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut workouts = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<StoredWorkout>(&line) {
            Ok(workout) => workouts.push(workout),
            Err(e) => {
                tracing::warn!("Failed to parse workout at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} workouts from WAL", workouts.len());
    Ok(workouts)
}
