//! Exercise catalog: lookup, lifecycle and the built-in default entries.
//!
//! Entries are never removed while a workout references them; they are
//! deactivated instead so existing workouts keep resolving.

use crate::types::*;
use crate::validate::validate_catalog_entry;
use crate::{Error, Result};
use fs2::FileExt;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Resolves exercise references for the validation and derivation engines
pub trait CatalogLookup {
    fn resolve(&self, exercise_id: &str) -> Option<&CatalogEntry>;
}

impl CatalogLookup for Catalog {
    fn resolve(&self, exercise_id: &str) -> Option<&CatalogEntry> {
        self.entries.get(exercise_id)
    }
}

impl CatalogLookup for HashMap<String, CatalogEntry> {
    fn resolve(&self, exercise_id: &str) -> Option<&CatalogEntry> {
        self.get(exercise_id)
    }
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with the built-in exercises
///
/// **Note**: prefer `get_default_catalog()` unless the catalog will be modified.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn builtin(
    id: &str,
    name: &str,
    difficulty: Difficulty,
    description: &str,
    video_url: Option<&str>,
) -> CatalogEntry {
    CatalogEntry {
        id: id.into(),
        name: name.into(),
        description: Some(description.into()),
        difficulty,
        media: None,
        video_url: video_url.map(String::from),
        is_active: true,
    }
}

fn build_default_catalog_internal() -> Catalog {
    Catalog::from_entries(vec![
        builtin(
            "bench-press",
            "Bench Press",
            Difficulty::Intermediate,
            "Barbell press from the chest while lying on a flat bench.",
            Some("https://www.youtube.com/watch?v=rT7DgCr-3pg"),
        ),
        builtin(
            "back-squat",
            "Back Squat",
            Difficulty::Intermediate,
            "Barbell squat with the bar across the upper back.",
            Some("https://www.youtube.com/watch?v=ultWZbUMPL8"),
        ),
        builtin(
            "deadlift",
            "Deadlift",
            Difficulty::Advanced,
            "Hinge the barbell from the floor to lockout.",
            Some("https://www.youtube.com/watch?v=op9kVnSso6Q"),
        ),
        builtin(
            "overhead-press",
            "Overhead Press",
            Difficulty::Intermediate,
            "Strict standing barbell press overhead.",
            None,
        ),
        builtin(
            "barbell-row",
            "Barbell Row",
            Difficulty::Intermediate,
            "Bent-over row pulling the bar to the lower chest.",
            None,
        ),
        builtin(
            "pull-up",
            "Pull-up",
            Difficulty::Intermediate,
            "Pull from a dead hang until the chin clears the bar.",
            Some("https://www.youtube.com/watch?v=eGo4IYlbE5g"),
        ),
        builtin(
            "push-up",
            "Push-up",
            Difficulty::Beginner,
            "Bodyweight press from the floor.",
            None,
        ),
        builtin(
            "goblet-squat",
            "Goblet Squat",
            Difficulty::Beginner,
            "Squat holding a dumbbell or kettlebell at the chest.",
            None,
        ),
        builtin(
            "dumbbell-curl",
            "Dumbbell Curl",
            Difficulty::Beginner,
            "Standing elbow flexion with dumbbells.",
            None,
        ),
        builtin(
            "plank",
            "Plank",
            Difficulty::Beginner,
            "Hold a straight-body position on the forearms.",
            None,
        ),
    ])
}

impl Catalog {
    /// Build a catalog keyed by entry id. Later duplicates replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        Catalog {
            entries: entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect(),
        }
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, entry) in &self.entries {
            if id != &entry.id {
                errors.push(format!(
                    "Catalog key '{}' doesn't match entry.id '{}'",
                    id, entry.id
                ));
            }
            if let Err(violations) = validate_catalog_entry(&CatalogEntryDraft::from(entry)) {
                errors.push(format!("Catalog entry '{}': {}", id, violations));
            }
        }

        errors.sort();
        errors
    }

    /// Entries that may be chosen for new workouts, sorted by name
    pub fn selectable(&self) -> Vec<&CatalogEntry> {
        let mut entries: Vec<&CatalogEntry> =
            self.entries.values().filter(|e| e.is_active).collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        entries
    }

    /// All entries, active or not, sorted by name
    pub fn all(&self) -> Vec<&CatalogEntry> {
        let mut entries: Vec<&CatalogEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        entries
    }

    /// Validate a draft and add it, replacing any entry with the same id
    pub fn upsert(&mut self, draft: &CatalogEntryDraft) -> Result<&CatalogEntry> {
        let entry = validate_catalog_entry(draft)?;
        let id = entry.id.clone();
        self.entries.insert(id.clone(), entry);
        self.entries
            .get(&id)
            .ok_or_else(|| Error::CatalogEntryNotFound(id))
    }

    /// Soft-deactivate an entry so it is no longer selectable
    pub fn deactivate(&mut self, exercise_id: &str) -> Result<()> {
        let entry = self
            .entries
            .get_mut(exercise_id)
            .ok_or_else(|| Error::CatalogEntryNotFound(exercise_id.to_string()))?;
        entry.is_active = false;
        tracing::info!("Deactivated catalog entry {}", exercise_id);
        Ok(())
    }

    /// Remove an entry that no workout references
    pub fn remove(&mut self, exercise_id: &str, workouts: &[WorkoutSession]) -> Result<CatalogEntry> {
        let references = workouts
            .iter()
            .filter(|w| w.exercises.iter().any(|e| e.exercise_ref == exercise_id))
            .count();
        if references > 0 {
            return Err(Error::CatalogEntryInUse {
                id: exercise_id.to_string(),
                references,
            });
        }
        self.entries
            .remove(exercise_id)
            .ok_or_else(|| Error::CatalogEntryNotFound(exercise_id.to_string()))
    }

    /// Load a catalog file (a JSON array of entry drafts) with shared locking
    ///
    /// Every entry is validated; the file is rejected if any entry is invalid
    /// or if two entries share an id.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let drafts: Vec<CatalogEntryDraft> = serde_json::from_str(&contents)?;
        let mut entries: Vec<CatalogEntry> = Vec::with_capacity(drafts.len());
        let mut errors = Vec::new();
        for (i, draft) in drafts.iter().enumerate() {
            match validate_catalog_entry(draft) {
                Ok(entry) if entries.iter().any(|seen| seen.id == entry.id) => {
                    errors.push(format!("entry {}: duplicate id '{}'", i, entry.id))
                }
                Ok(entry) => entries.push(entry),
                Err(violations) => errors.push(format!("entry {}: {}", i, violations)),
            }
        }
        if !errors.is_empty() {
            return Err(Error::CatalogValidation(errors.join("; ")));
        }

        tracing::debug!("Loaded {} catalog entries from {:?}", entries.len(), path);
        Ok(Self::from_entries(entries))
    }

    /// Load the catalog file if it exists, otherwise the default catalog
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No catalog file at {:?}, using built-in catalog", path);
            Ok(build_default_catalog())
        }
    }

    /// Save the catalog with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "catalog path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let drafts: Vec<CatalogEntryDraft> =
                self.all().into_iter().map(CatalogEntryDraft::from).collect();
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, &drafts)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} catalog entries to {:?}", self.entries.len(), path);
        Ok(())
    }
}
