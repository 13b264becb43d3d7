use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const MAP: &str = r#"
id: 1
name: map
methods:
  - id: 1
    name: put
    request:
      fields:
        - name: key
          type: String
        - name: ttl
          type: Int64
    response:
      fields:
        - name: previous
          type: String
          nullable: true
  - id: 2
    name: getAll
    request:
      fields:
        - name: keys
          type: ListCN_String
    response:
      fields: []
"#;

/// Helper to get the codecgen binary command
fn codecgen_cmd() -> Command {
    let mut cmd = Command::cargo_bin("codecgen").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn protocol_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("map.yaml"), MAP).unwrap();
    dir
}

#[test]
fn generates_codecs_and_prints_a_summary() {
    let protocol = protocol_dir();
    let output = TempDir::new().unwrap();

    codecgen_cmd()
        .arg("--protocol-dir")
        .arg(protocol.path())
        .arg("--output")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("java"))
        .stdout(predicate::str::contains("cpp"))
        .stdout(predicate::str::contains("map.getAll"));

    assert!(output.path().join("java/codec/MapPutCodec.java").is_file());
    assert!(output.path().join("cpp/codec/codecs.h").is_file());
}

#[test]
fn skipped_artifacts_are_logged_as_warnings() {
    let protocol = protocol_dir();
    let output = TempDir::new().unwrap();

    codecgen_cmd()
        .arg("-p")
        .arg(protocol.path())
        .arg("-o")
        .arg(output.path())
        .args(["--lang", "cpp"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "[map.getAll] contains missing type mapping 'ListCN_String'. Skipping codec generation.",
        ));

    assert!(!output.path().join("java").exists());
}

#[test]
fn config_file_applies_the_ignore_list() {
    let protocol = protocol_dir();
    let output = TempDir::new().unwrap();
    let config = output.path().join("codecgen.yaml");
    fs::write(&config, "languages:\n  java:\n    ignore_services: [1]\n").unwrap();

    codecgen_cmd()
        .arg("-p")
        .arg(protocol.path())
        .arg("-o")
        .arg(output.path())
        .args(["--lang", "java"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert!(!output.path().join("java/codec/MapPutCodec.java").exists());
}

#[test]
fn invalid_documents_fail_with_nonzero_exit() {
    let protocol = protocol_dir();
    fs::write(protocol.path().join("broken.yaml"), "id: 1\n").unwrap();
    let output = TempDir::new().unwrap();

    codecgen_cmd()
        .arg("-p")
        .arg(protocol.path())
        .arg("-o")
        .arg(output.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("schema validation failed"))
        .stderr(predicate::str::contains("1 service document(s) failed schema validation"));

    assert!(!output.path().join("out").exists());
}

#[test]
fn missing_protocol_dir_is_an_error() {
    let output = TempDir::new().unwrap();

    codecgen_cmd()
        .arg("-p")
        .arg(output.path().join("absent"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn unknown_language_is_rejected_by_the_parser() {
    let protocol = protocol_dir();

    codecgen_cmd()
        .arg("-p")
        .arg(protocol.path())
        .args(["--lang", "cobol"])
        .assert()
        .failure();
}

#[test]
fn json_logs_go_to_stderr() {
    let protocol = protocol_dir();
    let output = TempDir::new().unwrap();

    codecgen_cmd()
        .arg("-p")
        .arg(protocol.path())
        .arg("-o")
        .arg(output.path())
        .args(["--lang", "cpp", "--json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("\"level\":\"WARN\""));
}
