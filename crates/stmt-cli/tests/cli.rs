use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HDFC_DOCUMENT: &str = r#"{
  "pages": [
    {
      "number": 1,
      "text": "HDFC Bank Credit Card Statement\nStatement Period: 01/01/2025 to 31/01/2025\nDomestic Transactions\n02/01/2025 AMAZON PAY INDIA 1,299.00\n05/01/2025 14:22:10 SWIGGY BANGALORE 450.50 Dr\n09/01/2025 PAYMENT RECEIVED THANK YOU 5,000.00 Cr\n"
    }
  ]
}"#;

const EMPTY_DOCUMENT: &str = r#"{"pages": [{"number": 1, "text": "Nothing to see here"}]}"#;

fn stmt() -> Command {
    Command::cargo_bin("stmt").unwrap()
}

fn write_document(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn process_prints_json_records() {
    let dir = TempDir::new().unwrap();
    let input = write_document(dir.path(), "jan.json", HDFC_DOCUMENT);

    stmt()
        .args(["process", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bank\": \"HDFC\""))
        .stdout(predicate::str::contains("SWIGGY BANGALORE"))
        .stdout(predicate::str::contains("\"accepted\": 3"));
}

#[test]
fn process_writes_csv() {
    let dir = TempDir::new().unwrap();
    let input = write_document(dir.path(), "jan.json", HDFC_DOCUMENT);

    stmt()
        .args(["process", &input, "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "date,description,amount,type,balance,bank,confidence",
        ))
        .stdout(predicate::str::contains("2025-01-05,SWIGGY BANGALORE,-450.50,debit,,hdfc,normal"));
}

#[test]
fn process_to_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_document(dir.path(), "jan.json", HDFC_DOCUMENT);
    let output = dir.path().join("out").join("jan.txt");

    stmt()
        .args(["process", &input, "-f", "text", "-o"])
        .arg(&output)
        .assert()
        .success();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("Bank: HDFC Bank"));
    assert!(text.contains("Period: 2025-01-01 to 2025-01-31"));
}

#[test]
fn process_bank_override() {
    let dir = TempDir::new().unwrap();
    let input = write_document(dir.path(), "jan.json", HDFC_DOCUMENT);

    stmt()
        .args(["process", &input, "--bank", "generic", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains(",generic,low"));
}

#[test]
fn process_missing_input_fails() {
    stmt()
        .args(["process", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_unsupported_extension_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_document(dir.path(), "scan.png", "not an image");

    stmt()
        .args(["process", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn process_strict_rejects_empty_statement() {
    let dir = TempDir::new().unwrap();
    let input = write_document(dir.path(), "empty.json", EMPTY_DOCUMENT);

    stmt().args(["process", &input]).assert().success();

    stmt()
        .args(["process", &input, "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no transaction candidates"));
}

#[test]
fn process_uses_config_file() {
    let dir = TempDir::new().unwrap();
    let input = write_document(dir.path(), "jan.json", HDFC_DOCUMENT);
    let config = write_document(
        dir.path(),
        "config.json",
        r#"{"extraction": {"unmarked_side": "debit"}, "output": {"format": "csv"}}"#,
    );

    stmt()
        .args(["--config", &config, "process", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-01-02,AMAZON PAY INDIA,-1299.00,debit,,hdfc,low"));
}

#[test]
fn batch_organizes_by_bank_and_month() {
    let dir = TempDir::new().unwrap();
    write_document(dir.path(), "jan.json", HDFC_DOCUMENT);
    write_document(dir.path(), "notes.txt", "ignored");
    let out = dir.path().join("out");
    let pattern = dir.path().join("*").display().to_string();

    stmt()
        .args(["batch", &pattern, "--summary", "-j", "2", "-o"])
        .arg(&out)
        .assert()
        .success();

    let written = out.join("hdfc").join("2025-01").join("jan.json");
    assert!(written.exists(), "missing {}", written.display());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,bank,month,records"));
    assert!(summary.contains("jan.json,success,hdfc,2025-01,3"));
}

#[test]
fn batch_continue_on_error_records_failures() {
    let dir = TempDir::new().unwrap();
    write_document(dir.path(), "jan.json", HDFC_DOCUMENT);
    write_document(dir.path(), "broken.json", "{not json");
    let out = dir.path().join("out");
    let pattern = dir.path().join("*.json").display().to_string();

    stmt()
        .args(["batch", &pattern, "--flat", "--summary", "-o"])
        .arg(&out)
        .assert()
        .failure();

    stmt()
        .args(["batch", &pattern, "--flat", "--summary", "--continue-on-error", "-o"])
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("jan.json").exists());
    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("broken.json,error"));
}

#[test]
fn batch_keeps_same_stem_outputs_apart() {
    let dir = TempDir::new().unwrap();
    for sub in ["a", "b"] {
        fs::create_dir_all(dir.path().join(sub)).unwrap();
        write_document(&dir.path().join(sub), "jan.json", HDFC_DOCUMENT);
    }
    let out = dir.path().join("out");
    let pattern = dir.path().join("*").join("jan.json").display().to_string();

    stmt()
        .args(["batch", &pattern, "--flat", "-o"])
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("jan.json").exists());
    assert!(out.join("jan-2.json").exists());
}

#[test]
fn batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.pdf").display().to_string();

    stmt()
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_writes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stmt.json");

    stmt()
        .args(["config", "init", "-o"])
        .arg(&path)
        .assert()
        .success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"unmarked_side\": \"credit\""));

    stmt()
        .args(["config", "init", "-o"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_set_and_get_use_config_flag() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("stmt.json").display().to_string();

    stmt()
        .args(["--config", &path, "config", "set", "extraction.unmarked_side", "debit"])
        .assert()
        .success();

    stmt()
        .args(["--config", &path, "config", "get", "extraction.unmarked_side"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"debit\""));

    stmt()
        .args(["--config", &path, "config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn config_path_succeeds() {
    stmt()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));
}
