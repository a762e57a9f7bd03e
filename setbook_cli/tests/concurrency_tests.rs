//! Concurrency tests for the setbook binary.
//!
//! Several processes logging at once must not lose or interleave WAL lines.

use assert_cmd::Command;
use std::thread;
use tempfile::TempDir;

/// The user's own config must not leak into tests, so the config
/// directory points somewhere that never has a config file.
fn cli() -> Command {
    let no_config = std::path::Path::new(env!("CARGO_TARGET_TMPDIR")).join("setbook-no-config");
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("setbook"));
    cmd.env("XDG_CONFIG_HOME", &no_config).env("HOME", &no_config);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_concurrent_workout_logging() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let workout = data_dir.join("workout.json");
    std::fs::write(
        &workout,
        r#"{"ownerId": "u1", "date": "2024-01-01T10:00:00Z", "durationSeconds": 60,
            "exercises": [{"exerciseRef": "pull-up", "sets": [{"reps": 8}, {"reps": 6}]}]}"#,
    )
    .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let data_dir = data_dir.clone();
            let workout = workout.clone();
            thread::spawn(move || {
                cli()
                    .arg("log")
                    .arg(&workout)
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("logging thread panicked");
    }

    let wal_content =
        std::fs::read_to_string(data_dir.join("wal/workouts.wal")).expect("Failed to read WAL");
    let lines: Vec<&str> = wal_content.lines().collect();
    assert_eq!(lines.len(), 8, "Expected 8 workouts, got {}", lines.len());

    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).expect("intact JSON line");
        assert_eq!(value["workout"]["exercises"][0]["sets"][1]["reps"], 6);
    }
}
