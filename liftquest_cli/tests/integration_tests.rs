//! Integration tests for the liftquest binary.
//!
//! These tests verify end-to-end behavior including:
//! - Profile management
//! - Workout logging and scoring
//! - CSV rollup operations
//! - Data persistence across runs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::cargo_bin("liftquest").expect("Failed to find liftquest binary")
}

/// Register a 70kg male subject so workouts can be scored
fn register_subject(data_dir: &std::path::Path, subject: &str) {
    cli()
        .args(["profile", "set"])
        .args(["--subject", subject])
        .args(["--bodyweight", "70"])
        .args(["--gender", "male"])
        .args(["--age", "30"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();
}

fn log_workout(data_dir: &std::path::Path, subject: &str, exercise: &str, weight: &str) {
    cli()
        .arg("log")
        .args(["--subject", subject])
        .args(["--exercise", exercise])
        .args(["--sets", "3"])
        .args(["--reps", "10"])
        .args(["--weight", weight])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Workout scoring and progression engine",
        ));
}

#[test]
fn test_profile_set_and_show() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    register_subject(&data_dir, "alex");

    cli()
        .args(["profile", "show"])
        .args(["--subject", "alex"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("alex"))
        .stdout(predicate::str::contains("70 kg"));
}

#[test]
fn test_profile_show_unknown_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["profile", "show"])
        .args(["--subject", "ghost"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_log_requires_profile() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("log")
        .args(["--subject", "ghost"])
        .args(["--exercise", "squat"])
        .args(["--sets", "3"])
        .args(["--reps", "10"])
        .args(["--weight", "60"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn test_log_writes_wal_and_reports_grade() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    register_subject(&data_dir, "alex");

    // 60kg x 10 deadlift at 70kg bodyweight grades Gold
    cli()
        .arg("log")
        .args(["--subject", "alex"])
        .args(["--exercise", "deadlift"])
        .args(["--sets", "3"])
        .args(["--reps", "10"])
        .args(["--weight", "60"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout logged"))
        .stdout(predicate::str::contains("Gold"))
        .stdout(predicate::str::contains("PR!"))
        // Log lines go to stderr, not stdout
        .stdout(predicate::str::contains("INFO").not());

    // Verify WAL file has the entry
    let wal_path = data_dir.join("records.wal");
    let wal_content = fs::read_to_string(&wal_path).expect("Failed to read WAL");
    assert_eq!(wal_content.lines().count(), 1);
    assert!(wal_content.contains("\"exercise_id\":\"deadlift\""));
}

#[test]
fn test_log_reports_level_up() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    register_subject(&data_dir, "alex");

    // First deadlift session earns well past the level-1 gate
    cli()
        .arg("log")
        .args(["--subject", "alex"])
        .args(["--exercise", "deadlift"])
        .args(["--sets", "3"])
        .args(["--reps", "10"])
        .args(["--weight", "60"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("LEVEL UP"));
}

#[test]
fn test_unknown_exercise_needs_body_part() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    register_subject(&data_dir, "alex");

    cli()
        .arg("log")
        .args(["--subject", "alex"])
        .args(["--exercise", "zercher_carry"])
        .args(["--sets", "3"])
        .args(["--reps", "10"])
        .args(["--weight", "60"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure();

    cli()
        .arg("log")
        .args(["--subject", "alex"])
        .args(["--exercise", "zercher_carry"])
        .args(["--sets", "3"])
        .args(["--reps", "10"])
        .args(["--weight", "60"])
        .args(["--body-part", "back"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();
}

#[test]
fn test_estimate_command() {
    cli()
        .arg("estimate")
        .args(["--weight", "60"])
        .args(["--reps", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated 1RM: 78.8 kg"));
}

#[test]
fn test_estimate_all_lists_formulas() {
    cli()
        .arg("estimate")
        .args(["--weight", "100"])
        .args(["--reps", "5"])
        .arg("--all")
        .assert()
        .success()
        .stdout(predicate::str::contains("Epley"))
        .stdout(predicate::str::contains("Brzycki"))
        .stdout(predicate::str::contains("table"));
}

#[test]
fn test_grade_command() {
    cli()
        .arg("grade")
        .args(["--bodyweight", "70"])
        .args(["--weight", "60"])
        .args(["--exercise", "deadlift"])
        .args(["--reps", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grade: Gold"));
}

#[test]
fn test_calories_command() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    register_subject(&data_dir, "alex");

    cli()
        .arg("calories")
        .args(["--subject", "alex"])
        .args(["--exercise", "squat"])
        .args(["--sets", "3"])
        .args(["--reps", "10"])
        .args(["--weight", "80"])
        .args(["--rpe", "8"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Calories:"))
        .stdout(predicate::str::contains("Personalized"));
}

#[test]
fn test_recommend_without_history() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    register_subject(&data_dir, "alex");

    cli()
        .arg("recommend")
        .args(["--subject", "alex"])
        .args(["--exercise", "squat"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No history"));
}

#[test]
fn test_recommend_after_logging() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    register_subject(&data_dir, "alex");
    log_workout(&data_dir, "alex", "squat", "80");

    cli()
        .arg("recommend")
        .args(["--subject", "alex"])
        .args(["--exercise", "squat"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Next session for squat"))
        .stdout(predicate::str::contains("Expected RPE"));
}

#[test]
fn test_rollup_creates_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    register_subject(&data_dir, "alex");

    for _ in 0..3 {
        log_workout(&data_dir, "alex", "squat", "80");
    }

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 3 records"));

    let csv_path = data_dir.join("records.csv");
    assert!(csv_path.exists());

    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    assert!(csv_content.contains("id,subject_id"));
}

#[test]
fn test_rollup_with_cleanup() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    register_subject(&data_dir, "alex");
    log_workout(&data_dir, "alex", "squat", "80");

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned up 1 processed WAL"));

    // Verify processed WAL was removed
    let entries: Vec<_> = fs::read_dir(&data_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".wal.processed"))
        .collect();
    assert_eq!(entries.len(), 0);
}

#[test]
fn test_empty_rollup() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}

#[test]
fn test_state_persistence_across_runs() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    register_subject(&data_dir, "alex");

    log_workout(&data_dir, "alex", "bench_press", "60");

    let state_path = data_dir.join("state.json");
    assert!(state_path.exists());

    // Second run sees the accumulated progression
    cli()
        .arg("log")
        .args(["--subject", "alex"])
        .args(["--exercise", "bench_press"])
        .args(["--sets", "3"])
        .args(["--reps", "10"])
        .args(["--weight", "50"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        // Lighter than the first session, so no new PR
        .stdout(predicate::str::contains("PR!").not());
}

#[test]
fn test_cert_start_requires_eligibility() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    register_subject(&data_dir, "alex");

    cli()
        .args(["cert", "start"])
        .args(["--subject", "alex"])
        .args(["--body-part", "chest"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not eligible"));
}

/// Full gated certification flow through the CLI: bank experience, start an
/// attempt, log the proof lift, submit it, and watch the level advance.
#[test]
fn test_certification_flow() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // Gated mode: experience banks up instead of auto-levelling
    let config_home = temp_dir.path().join("config");
    fs::create_dir_all(config_home.join("liftquest")).unwrap();
    fs::write(
        config_home.join("liftquest/config.toml"),
        "[certification]\ngate_level_ups = true\n",
    )
    .unwrap();

    let gated_cli = || {
        let mut cmd = cli();
        cmd.env("XDG_CONFIG_HOME", &config_home);
        cmd
    };

    let mut cmd = gated_cli();
    cmd.args(["profile", "set"])
        .args(["--subject", "alex"])
        .args(["--bodyweight", "70"])
        .args(["--gender", "male"])
        .args(["--age", "30"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    // Bank enough experience for level 2 eligibility
    let mut cmd = gated_cli();
    cmd.arg("log")
        .args(["--subject", "alex"])
        .args(["--exercise", "deadlift"])
        .args(["--sets", "3"])
        .args(["--reps", "10"])
        .args(["--weight", "60"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Certification available"));

    // Start the attempt; deadlift certifies the back
    let mut cmd = gated_cli();
    let output = cmd
        .args(["cert", "start"])
        .args(["--subject", "alex"])
        .args(["--body-part", "back"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deadlift"))
        .get_output()
        .stdout
        .clone();
    let attempt_id = extract_uuid(&output, "Certification attempt started");

    // 70kg male, back, target 2: round(70 * 1.0 * 1.2) = 84kg x 10 x 3
    let mut cmd = gated_cli();
    let output = cmd
        .arg("log")
        .args(["--subject", "alex"])
        .args(["--exercise", "deadlift"])
        .args(["--sets", "3"])
        .args(["--reps", "10"])
        .args(["--weight", "84"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let entry_id = extract_uuid(&output, "Workout logged");

    let mut cmd = gated_cli();
    cmd.args(["cert", "submit"])
        .args(["--subject", "alex"])
        .args(["--attempt", &attempt_id])
        .args(["--entry", &entry_id])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("level 2 reached"));

    let mut cmd = gated_cli();
    cmd.args(["cert", "status"])
        .args(["--subject", "alex"])
        .args(["--body-part", "back"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("back level 2"));
}

/// Pull the uuid out of a `... <marker> (<uuid>)` output line
fn extract_uuid(stdout: &[u8], marker: &str) -> String {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .find(|l| l.contains(marker))
        .unwrap_or_else(|| panic!("no line containing {marker:?} in output:\n{text}"));
    let start = line.find('(').expect("no opening paren") + 1;
    let end = line.find(')').expect("no closing paren");
    line[start..end].to_string()
}
