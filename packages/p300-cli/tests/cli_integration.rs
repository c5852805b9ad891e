use assert_cmd::Command;
use predicates::prelude::*;

fn p300() -> Command {
    Command::cargo_bin("p300").unwrap()
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_no_args_shows_help() {
    p300()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    p300()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("p300"));
}

#[test]
fn test_help_flag() {
    p300()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("speller"));
}

// =============================================================================
// INFO SUBCOMMAND
// =============================================================================

#[test]
fn test_info_subcommand() {
    p300()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("p300 CLI v"))
        .stdout(predicate::str::contains("Platform:"));
}

#[test]
fn test_info_json() {
    let output = p300().arg("info").arg("--json").assert().success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed.is_object());
    assert!(parsed.get("cli_version").is_some());
    assert!(parsed.get("platform").is_some());
    assert!(parsed.get("arch").is_some());
    let defaults = parsed.get("defaults").unwrap();
    assert_eq!(defaults.get("batch_size").unwrap(), 22);
    assert_eq!(defaults.get("threshold_factor").unwrap(), 3.5);
}

// =============================================================================
// VALIDATE SUBCOMMAND
// =============================================================================

#[test]
fn test_validate_nonexistent_file() {
    p300()
        .arg("validate")
        .arg("--recording")
        .arg("/nonexistent/session.csv")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_validate_malformed_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bad.csv");
    std::fs::write(&path, "Timestamp,Channel1\n0.0,abc\n").unwrap();

    p300()
        .arg("validate")
        .arg("--recording")
        .arg(path.to_str().unwrap())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not a number"));
}

#[test]
fn test_validate_valid_recording() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("session.csv");
    std::fs::write(&path, "Timestamp,Channel1,Channel2\n0.0,1.0,2.0\n0.1,3.0,4.0\n").unwrap();

    p300()
        .arg("validate")
        .arg("--recording")
        .arg(path.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"))
        .stdout(predicate::str::contains("2 samples, 2 channels"));
}

#[test]
fn test_validate_json_output() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("session.csv");
    std::fs::write(
        &path,
        "Timestamp,Channel1,Stimulus,Letter\n0.0,1.0,0,NoLetter\n0.1,2.0,1,K\n",
    )
    .unwrap();

    let output = p300()
        .arg("validate")
        .arg("--recording")
        .arg(path.to_str().unwrap())
        .arg("--json")
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.get("exists").unwrap(), true);
    assert_eq!(parsed.get("parses").unwrap(), true);
    assert_eq!(parsed.get("n_samples").unwrap(), 2);
    assert_eq!(parsed.get("n_channels").unwrap(), 1);
    assert_eq!(parsed.get("n_annotated").unwrap(), 1);
}

// =============================================================================
// RUN SUBCOMMAND — ARGUMENT VALIDATION
// =============================================================================

#[test]
fn test_run_missing_recording_arg() {
    p300()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--recording"));
}

#[test]
fn test_run_nonexistent_recording() {
    p300()
        .arg("run")
        .arg("--recording")
        .arg("/nonexistent/session.csv")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_run_unsupported_extension() {
    let tmp = tempfile::Builder::new().suffix(".edf").tempfile().unwrap();

    p300()
        .arg("run")
        .arg("--recording")
        .arg(tmp.path().to_str().unwrap())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unsupported"));
}

#[test]
fn test_run_inverted_band_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("session.csv");
    std::fs::write(&path, "Timestamp,Channel1\n0.0,1.0\n").unwrap();

    p300()
        .arg("run")
        .arg("--recording")
        .arg(path.to_str().unwrap())
        .arg("--low-hz")
        .arg("40")
        .arg("--high-hz")
        .arg("30")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("band"));
}

#[test]
fn test_run_zero_batch_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("session.csv");
    std::fs::write(&path, "Timestamp,Channel1\n0.0,1.0\n").unwrap();

    p300()
        .arg("run")
        .arg("--recording")
        .arg(path.to_str().unwrap())
        .arg("--batch-size")
        .arg("0")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("batch size"));
}

#[test]
fn test_run_duplicate_alphabet_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("session.csv");
    std::fs::write(&path, "Timestamp,Channel1\n0.0,1.0\n").unwrap();

    p300()
        .arg("run")
        .arg("--recording")
        .arg(path.to_str().unwrap())
        .arg("--alphabet")
        .arg("ABA")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("duplicate"));
}

#[test]
fn test_run_too_short_recording_fails_execution() {
    // Parses fine but is far shorter than the filter padding needs.
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("session.csv");
    let mut content = String::from("Timestamp,Channel1\n");
    for i in 0..10 {
        content.push_str(&format!("{},0.0\n", i as f64 / 128.0));
    }
    std::fs::write(&path, content).unwrap();

    p300()
        .arg("run")
        .arg("--recording")
        .arg(path.to_str().unwrap())
        .arg("--sr")
        .arg("128")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Pipeline execution failed"));
}

// =============================================================================
// BATCH SUBCOMMAND
// =============================================================================

#[test]
fn test_batch_requires_file_source() {
    p300()
        .arg("batch")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("must be specified"));
}

#[test]
fn test_batch_no_matches() {
    p300()
        .arg("batch")
        .arg("--glob")
        .arg("/nonexistent_dir_12345/*.csv")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_batch_dry_run_lists_files() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("a.csv"), "").unwrap();
    std::fs::write(tmp.path().join("b.csv"), "").unwrap();
    std::fs::write(tmp.path().join("a_markers.csv"), "").unwrap();

    let pattern = format!("{}/*.csv", tmp.path().to_str().unwrap());
    p300()
        .arg("batch")
        .arg("--glob")
        .arg(&pattern)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("a.csv"))
        .stdout(predicate::str::contains("b.csv"))
        .stdout(predicate::str::contains("a_markers.csv").not());
}
