//! Integration tests for the setbook binary.
//!
//! These tests verify end-to-end behavior including:
//! - Validation reporting and the log-only-when-valid rule
//! - Workout previews
//! - Catalog deactivation
//! - Stats and CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const VALID_WORKOUT: &str = r#"{
    "ownerId": "u1",
    "date": "2024-01-01T10:00:00Z",
    "durationSeconds": 1800,
    "exercises": [
        {"exerciseRef": "bench-press", "sets": [{"reps": 10, "weight": 60, "weightUnit": "kg"}]}
    ]
}"#;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// The user's own config must not leak into tests, so the config
/// directory points somewhere that never has a config file.
fn cli() -> Command {
    let no_config = std::path::Path::new(env!("CARGO_TARGET_TMPDIR")).join("setbook-no-config");
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("setbook"));
    cmd.env("XDG_CONFIG_HOME", &no_config).env("HOME", &no_config);
    cmd
}

fn write_workout(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, json).expect("Failed to write workout");
    path
}

fn wal_path(data_dir: &Path) -> PathBuf {
    data_dir.join("wal/workouts.wal")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Strength workout log"));
}

#[test]
fn test_validate_prints_previews() {
    let temp_dir = setup_test_dir();
    let file = write_workout(temp_dir.path(), "workout.json", VALID_WORKOUT);

    cli()
        .arg("validate")
        .arg(&file)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout is valid"))
        .stdout(predicate::str::contains("Workout on 1/1/2024"))
        .stdout(predicate::str::contains("1 exercises • 1800s"))
        .stdout(predicate::str::contains("Bench Press (1 set)"))
        .stdout(predicate::str::contains("Set: 10 reps · Weight: 60 kg"));

    // Validation alone never writes
    assert!(!wal_path(temp_dir.path()).exists());
}

#[test]
fn test_validate_reports_every_violation() {
    let temp_dir = setup_test_dir();
    let file = write_workout(
        temp_dir.path(),
        "bad.json",
        r#"{
            "durationSeconds": -5,
            "exercises": [
                {"exerciseRef": "moon-press", "sets": []},
                {"exerciseRef": "deadlift", "sets": [{"reps": 0, "weightUnit": "stone"}]}
            ]
        }"#,
    );

    cli()
        .arg("validate")
        .arg(&file)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("7 violation(s)"))
        .stderr(predicate::str::contains("ownerId: required field is missing"))
        .stderr(predicate::str::contains("date: required field is missing"))
        .stderr(predicate::str::contains("durationSeconds: -5 is out of range"))
        .stderr(predicate::str::contains("exercises[0].exerciseRef: no catalog entry with id 'moon-press'"))
        .stderr(predicate::str::contains("exercises[0].sets: must contain at least one element"))
        .stderr(predicate::str::contains("exercises[1].sets[0].reps"))
        .stderr(predicate::str::contains("'stone' is not one of [kg, lbs]"));
}

#[test]
fn test_validate_reports_wrong_typed_numbers_together() {
    let temp_dir = setup_test_dir();
    let file = write_workout(
        temp_dir.path(),
        "typed.json",
        r#"{"ownerId": "u1", "date": "2024-01-01T10:00:00Z", "durationSeconds": "",
            "exercises": [{"exerciseRef": "bench-press", "sets": [{"reps": "", "weight": "abc"}]}]}"#,
    );

    cli()
        .arg("log")
        .arg(&file)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("3 violation(s)"))
        .stderr(predicate::str::contains("durationSeconds: required field is missing"))
        .stderr(predicate::str::contains("exercises[0].sets[0].reps: required field is missing"))
        .stderr(predicate::str::contains(r#"exercises[0].sets[0].weight: "abc" is not a number"#));

    assert!(!wal_path(temp_dir.path()).exists());
}

#[test]
fn test_log_appends_to_wal() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let file = write_workout(temp_dir.path(), "workout.json", VALID_WORKOUT);

    cli()
        .arg("log")
        .arg(&file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout logged"));

    let wal_content = fs::read_to_string(wal_path(&data_dir)).expect("Failed to read WAL");
    assert_eq!(wal_content.lines().count(), 1);
    assert!(wal_content.contains("bench-press"));
}

#[test]
fn test_rejected_workout_is_not_logged() {
    let temp_dir = setup_test_dir();
    let file = write_workout(
        temp_dir.path(),
        "bad.json",
        r#"{"ownerId": "u1", "date": "2024-01-01T10:00:00Z", "durationSeconds": 60,
            "exercises": [{"exerciseRef": "squat-of-doom", "sets": [{"reps": 5}]}]}"#,
    );

    cli()
        .arg("log")
        .arg(&file)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("squat-of-doom"));

    assert!(!wal_path(temp_dir.path()).exists());
}

#[test]
fn test_show_lists_most_recent_first() {
    let temp_dir = setup_test_dir();
    let first = write_workout(temp_dir.path(), "first.json", VALID_WORKOUT);
    let second = write_workout(
        temp_dir.path(),
        "second.json",
        r#"{"ownerId": "u1", "date": "2024-01-03T10:00:00Z", "durationSeconds": 900,
            "exercises": [{"exerciseRef": "push-up", "sets": [{"reps": 20}, {"reps": 15}]}]}"#,
    );

    for file in [&first, &second] {
        cli()
            .arg("log")
            .arg(file)
            .arg("--data-dir")
            .arg(temp_dir.path())
            .assert()
            .success();
    }

    let output = cli()
        .arg("show")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&output);

    let newer = stdout.find("Workout on 1/3/2024").expect("second workout shown");
    let older = stdout.find("Workout on 1/1/2024").expect("first workout shown");
    assert!(newer < older);
    assert!(stdout.contains("Push-up (2 sets)"));
    assert!(stdout.contains("Set: 20 reps · Weight: undefined undefined"));

    cli()
        .arg("show")
        .arg("--limit")
        .arg("1")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1/3/2024"))
        .stdout(predicate::str::contains("1/1/2024").not());
}

#[test]
fn test_show_with_no_workouts() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("show")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts logged yet"));
}

#[test]
fn test_deactivated_exercise_hidden_but_still_valid() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("deactivate")
        .arg("bench-press")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Deactivated bench-press"));

    assert!(temp_dir.path().join("catalog.json").exists());

    cli()
        .arg("catalog")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Deadlift"))
        .stdout(predicate::str::contains("bench-press").not());

    cli()
        .arg("catalog")
        .arg("--all")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[inactive]"));

    // Existing references keep resolving
    let file = write_workout(temp_dir.path(), "workout.json", VALID_WORKOUT);
    cli()
        .arg("validate")
        .arg(&file)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Bench Press (1 set)"));
}

#[test]
fn test_catalog_lists_name_difficulty_and_image() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("catalog.json"),
        r#"[{"id": "farmer-carry", "name": "Farmer Carry", "difficulty": "beginner",
             "media": {"asset": "image-farmer-carry"}},
            {"id": "sled-push", "name": "Sled Push", "difficulty": "advanced", "isActive": false}]"#,
    )
    .unwrap();

    cli()
        .arg("catalog")
        .arg("--all")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Farmer Carry"))
        .stdout(predicate::str::contains("beginner [image]"))
        .stdout(predicate::str::contains("advanced [inactive]"));
}

#[test]
fn test_deactivate_unknown_exercise_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("deactivate")
        .arg("moon-press")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();

    assert!(!temp_dir.path().join("catalog.json").exists());
}

#[test]
fn test_invalid_catalog_file_is_reported() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("catalog.json"),
        r#"[{"id": "row", "name": "Row", "difficulty": "legendary"}]"#,
    )
    .unwrap();

    cli()
        .arg("catalog")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("legendary"));
}

#[test]
fn test_stats_and_export() {
    let temp_dir = setup_test_dir();
    let file = write_workout(temp_dir.path(), "workout.json", VALID_WORKOUT);

    cli()
        .arg("log")
        .arg(&file)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-W01  1 workouts, 1 sets, 600.0 kg"))
        .stdout(predicate::str::contains("Bench Press"))
        .stdout(predicate::str::contains("60 kg x 10"));

    let csv_path = temp_dir.path().join("out/sets.csv");
    cli()
        .arg("export")
        .arg("--out")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 sets"));

    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    assert!(csv_content.starts_with("workout_id,date,owner_id"));
    assert!(csv_content.contains("bench-press,Bench Press,1,10,60"));
}
