use std::{fs, path::PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

const SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "name": {"type": "string"},
        "version": {"type": "string"},
        "authors": {"items": {"properties": {"name": {}, "email": {}}}}
    }
}"#;

const UNNORMALIZED: &str = r#"{"version": "1.0.0", "license": "MIT", "name": "demo", "authors": [{"email": "jane@example.com", "name": "Jane"}]}
"#;

const NORMALIZED: &str = r#"{
    "name": "demo",
    "version": "1.0.0",
    "authors": [
        {
            "name": "Jane",
            "email": "jane@example.com"
        }
    ],
    "license": "MIT"
}
"#;

fn cli() -> Command {
    let mut command = Command::cargo_bin("json-normalizer").expect("Binary exists");
    command.env_remove("RUST_LOG");
    command
}

fn workspace(document: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("Temporary directory");
    fs::write(dir.path().join("schema.json"), SCHEMA).expect("Writable file");
    fs::write(dir.path().join("document.json"), document).expect("Writable file");
    dir
}

fn path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn prints_normalized_document() {
    let dir = workspace(UNNORMALIZED);
    cli()
        .arg("--schema")
        .arg(path(&dir, "schema.json"))
        .arg(path(&dir, "document.json"))
        .assert()
        .success()
        .stdout(NORMALIZED);
}

#[test]
fn reads_standard_input() {
    let dir = workspace(UNNORMALIZED);
    cli()
        .arg("--schema")
        .arg(path(&dir, "schema.json"))
        .write_stdin(UNNORMALIZED)
        .assert()
        .success()
        .stdout(NORMALIZED);
}

#[test]
fn accepts_schema_uris() {
    let dir = workspace(UNNORMALIZED);
    let uri = url::Url::from_file_path(dir.path().join("schema.json")).expect("Absolute path");
    cli()
        .arg("--schema")
        .arg(uri.as_str())
        .arg(path(&dir, "document.json"))
        .assert()
        .success()
        .stdout(NORMALIZED);
}

#[test]
fn custom_indentation() {
    let dir = workspace("{\n\t\"version\": \"1.0.0\",\n\t\"name\": \"demo\"\n}\n");
    cli()
        .arg("--schema")
        .arg(path(&dir, "schema.json"))
        .arg("--indent")
        .arg("2")
        .arg(path(&dir, "document.json"))
        .assert()
        .success()
        .stdout("{\n  \"name\": \"demo\",\n  \"version\": \"1.0.0\"\n}\n");
}

#[test]
fn check_reports_unnormalized_documents() {
    let dir = workspace(UNNORMALIZED);
    let document = path(&dir, "document.json");
    let output = cli()
        .arg("--schema")
        .arg(path(&dir, "schema.json"))
        .arg("--check")
        .arg(&document)
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains(&format!("{} is not normalized", document.display())));
}

#[test]
fn check_accepts_normalized_documents() {
    let dir = workspace(NORMALIZED);
    cli()
        .arg("--schema")
        .arg(path(&dir, "schema.json"))
        .arg("--check")
        .arg(path(&dir, "document.json"))
        .assert()
        .success()
        .stdout("");
}

#[test]
fn check_accepts_other_layouts() {
    for document in [
        "{\n  \"name\": \"demo\",\n  \"version\": \"1.0.0\"\n}\n",
        "{\r\n    \"name\": \"demo\",\r\n    \"version\": \"1.0.0\"\r\n}\r\n",
        "{\n\t\"name\": \"demo\",\n\t\"version\": \"1.0.0\"\n}",
    ] {
        let dir = workspace(document);
        cli()
            .arg("--schema")
            .arg(path(&dir, "schema.json"))
            .arg("--check")
            .arg(path(&dir, "document.json"))
            .assert()
            .success();
    }
}

#[test]
fn write_keeps_the_layout() {
    let dir = workspace("{\r\n  \"version\": \"1.0.0\",\r\n  \"name\": \"demo\"\r\n}\r\n");
    cli()
        .arg("--schema")
        .arg(path(&dir, "schema.json"))
        .arg("--write")
        .arg(path(&dir, "document.json"))
        .assert()
        .success();
    let written = fs::read_to_string(dir.path().join("document.json")).expect("Readable file");
    assert_eq!(
        written,
        "{\r\n  \"name\": \"demo\",\r\n  \"version\": \"1.0.0\"\r\n}\r\n"
    );
}

#[test]
fn write_rewrites_files() {
    let dir = workspace(UNNORMALIZED);
    cli()
        .arg("--schema")
        .arg(path(&dir, "schema.json"))
        .arg("--write")
        .arg(path(&dir, "document.json"))
        .assert()
        .success()
        .stdout("");
    let written = fs::read_to_string(dir.path().join("document.json")).expect("Readable file");
    assert_eq!(written, NORMALIZED);
}

#[test]
fn rejects_invalid_documents() {
    let dir = workspace(r#"{"name": 42}"#);
    let output = cli()
        .arg("--schema")
        .arg(path(&dir, "schema.json"))
        .arg(path(&dir, "document.json"))
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();
    let stderr = stderr(&output);
    assert!(stderr.contains("Original JSON is not valid according to schema"));
    assert!(stderr.contains("42 is not of type \"string\""));
}

#[test]
fn continues_after_failures() {
    let dir = workspace(UNNORMALIZED);
    fs::write(dir.path().join("broken.json"), "{").expect("Writable file");
    let output = cli()
        .arg("--schema")
        .arg(path(&dir, "schema.json"))
        .arg(path(&dir, "broken.json"))
        .arg(path(&dir, "document.json"))
        .assert()
        .failure()
        .stdout(NORMALIZED)
        .get_output()
        .clone();
    assert!(stderr(&output).contains("is not valid JSON"));
}

#[test]
fn missing_schema_file() {
    let dir = workspace(UNNORMALIZED);
    let output = cli()
        .arg("--schema")
        .arg(path(&dir, "missing.json"))
        .arg(path(&dir, "document.json"))
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();
    assert!(stderr(&output).contains("could not be opened"));
}

#[test]
fn schema_is_required() {
    cli().arg("document.json").assert().failure().code(2);
}

#[test]
fn composer_json() {
    let dir = tempfile::tempdir().expect("Temporary directory");
    fs::write(
        dir.path().join("composer-schema.json"),
        r#"{"type": "object", "properties": {"name": {"type": "string"}, "require": {"type": "object"}}}"#,
    )
    .expect("Writable file");
    fs::write(
        dir.path().join("composer.json"),
        "{\"require\": {\"foo/bar\": \"^2.0|^1.0\", \"php\": \"^8.1\"}, \"name\": \"acme/demo\"}\n",
    )
    .expect("Writable file");
    cli()
        .arg("--composer")
        .arg("--schema")
        .arg(path(&dir, "composer-schema.json"))
        .arg(path(&dir, "composer.json"))
        .assert()
        .success()
        .stdout(
            "{\n    \"name\": \"acme/demo\",\n    \"require\": {\n        \"php\": \"^8.1\",\n        \"foo/bar\": \"^1.0 || ^2.0\"\n    }\n}\n",
        );
}
