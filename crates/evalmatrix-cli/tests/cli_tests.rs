//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn evalmatrix() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("evalmatrix").unwrap()
}

const MATRIX: &str = r#"{
  "session_id": "S-2024-07",
  "session_name": "Habilitation électrique",
  "participants": [
    { "id": "M001", "name": "Alice Martin" },
    { "id": "M002", "name": "Bruno Petit" },
    { "id": "M003", "name": "Chloé Durand" }
  ],
  "competencies": [
    { "id": "C1", "label": "Consignation" },
    { "id": "C2", "label": "Premiers secours" }
  ],
  "scores": [
    { "participant_id": "M001", "competency_id": "C1", "score": 12.0 },
    { "participant_id": "M001", "competency_id": "C2", "score": 8.0 },
    { "participant_id": "M002", "competency_id": "C1", "score": 9.5 }
  ]
}"#;

fn write_matrix(dir: &Path) -> PathBuf {
    let path = dir.join("matrix.json");
    std::fs::write(&path, MATRIX).unwrap();
    path
}

fn stored_scores(path: &Path) -> Vec<serde_json::Value> {
    let content = std::fs::read_to_string(path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    json["scores"].as_array().unwrap().clone()
}

#[test]
fn help_lists_commands() {
    evalmatrix()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("grade"))
        .stdout(predicate::str::contains("attendance"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn version_flag() {
    evalmatrix()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("evalmatrix"));
}

#[test]
fn show_offline_matrix() {
    let dir = TempDir::new().unwrap();
    let input = write_matrix(dir.path());

    evalmatrix()
        .current_dir(dir.path())
        .arg("show")
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Session: Habilitation électrique (3 participants, 2 competencies)",
        ))
        .stdout(predicate::str::contains("10.00"))
        .stdout(predicate::str::contains("9.50"))
        .stdout(predicate::str::contains(
            "Admitted: 1 | Not admitted: 1 | Ungraded: 1",
        ))
        .stdout(predicate::str::contains("Graded cells: 3/6 (50%)"));
}

#[test]
fn show_requires_a_source() {
    evalmatrix().arg("show").assert().failure();
}

#[test]
fn show_nonexistent_input() {
    let dir = TempDir::new().unwrap();
    evalmatrix()
        .current_dir(dir.path())
        .arg("show")
        .arg("--input")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_saves_to_input_file() {
    let dir = TempDir::new().unwrap();
    let input = write_matrix(dir.path());

    evalmatrix()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--input")
        .arg(&input)
        .args(["--set", "M003:C1=15", "--set", "M002:C2=12,5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 5 evaluation(s)"));

    assert_eq!(stored_scores(&input).len(), 5);
}

#[test]
fn grade_clear_removes_score() {
    let dir = TempDir::new().unwrap();
    let input = write_matrix(dir.path());

    evalmatrix()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--input")
        .arg(&input)
        .args(["--set", "M001:C2="])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 2 evaluation(s)"));

    let scores = stored_scores(&input);
    assert!(scores
        .iter()
        .all(|s| !(s["participant_id"] == "M001" && s["competency_id"] == "C2")));
}

#[test]
fn grade_dry_run_prints_batch_without_saving() {
    let dir = TempDir::new().unwrap();
    let input = write_matrix(dir.path());

    evalmatrix()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--input")
        .arg(&input)
        .args(["--set", "M003:C2=20", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"participant_id\": \"M003\""));

    assert_eq!(stored_scores(&input).len(), 3);
}

#[test]
fn grade_out_of_range_is_rejected_but_others_saved() {
    let dir = TempDir::new().unwrap();
    let input = write_matrix(dir.path());

    evalmatrix()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--input")
        .arg(&input)
        .args(["--set", "M001:C1=25", "--set", "M003:C1=11"])
        .assert()
        .success()
        .stderr(predicate::str::contains("invalid score '25'"))
        .stderr(predicate::str::contains("1 edit(s) rejected"));

    let scores = stored_scores(&input);
    assert_eq!(scores.len(), 4);
    let m001_c1 = scores
        .iter()
        .find(|s| s["participant_id"] == "M001" && s["competency_id"] == "C1")
        .unwrap();
    assert_eq!(m001_c1["score"], 12.0);
}

#[test]
fn grade_unknown_participant_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_matrix(dir.path());

    evalmatrix()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--input")
        .arg(&input)
        .args(["--set", "M999:C1=10"])
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown participant: M999"))
        .stdout(predicate::str::contains("No changes to save."));
}

#[test]
fn grade_malformed_edit_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_matrix(dir.path());

    evalmatrix()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--input")
        .arg(&input)
        .args(["--set", "M001C1=10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid edit"));
}

#[test]
fn export_html_and_json() {
    let dir = TempDir::new().unwrap();
    let input = write_matrix(dir.path());
    let out = dir.path().join("out");

    evalmatrix()
        .current_dir(dir.path())
        .arg("export")
        .arg("--input")
        .arg(&input)
        .args(["--format", "all", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("HTML results"))
        .stdout(predicate::str::contains("JSON results"));

    let html = out.join("Resultats_Habilitation_électrique.html");
    let content = std::fs::read_to_string(html).unwrap();
    assert!(content.contains("Résultats de la session - Habilitation électrique"));
    assert!(content.contains("Non admis"));
    assert!(out.join("Resultats_Habilitation_électrique.json").exists());
}

#[test]
fn export_name_override() {
    let dir = TempDir::new().unwrap();
    let input = write_matrix(dir.path());
    let out = dir.path().join("out");

    evalmatrix()
        .current_dir(dir.path())
        .arg("export")
        .arg("--input")
        .arg(&input)
        .args(["--name", "Session 42", "--format", "json", "--output"])
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("Resultats_Session_42.json").exists());
}

#[test]
fn export_unknown_format() {
    let dir = TempDir::new().unwrap();
    let input = write_matrix(dir.path());

    evalmatrix()
        .current_dir(dir.path())
        .arg("export")
        .arg("--input")
        .arg(&input)
        .args(["--format", "pdf", "--output"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: pdf"));
}

#[test]
fn attendance_rejects_bad_date() {
    let dir = TempDir::new().unwrap();
    evalmatrix()
        .current_dir(dir.path())
        .args(["attendance", "--session", "S1", "--date", "11/03/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected YYYY-MM-DD"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    evalmatrix()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created evalmatrix.toml"))
        .stdout(predicate::str::contains("Created matrices/example.json"));

    assert!(dir.path().join("evalmatrix.toml").exists());

    // The example matrix is usable right away.
    evalmatrix()
        .current_dir(dir.path())
        .args(["show", "--input", "matrices/example.json"])
        .env("API_HOST", "localhost")
        .assert()
        .success()
        .stdout(predicate::str::contains("Habilitation électrique"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("evalmatrix.toml"), "# existing").unwrap();

    evalmatrix()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    let content = std::fs::read_to_string(dir.path().join("evalmatrix.toml")).unwrap();
    assert_eq!(content, "# existing");
}
