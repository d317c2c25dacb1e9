//! Command-line behaviour of the `bo-testability` binary.

use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

const MODEL: &str = r#"
classes:
  - name: Foo
    props:
      - name: Name
        type: string
        compulsory: true
      - name: Nickname
        type: string
"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bo-testability"))
}

#[test]
fn test_generate_prints_json_lines() {
    let model = write_temp(MODEL);
    let output = bin()
        .args(["generate", "--class", "Foo", "--count", "3", "--seed", "5"])
        .arg("--class-defs")
        .arg(model.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    for foo in &lines {
        assert_eq!(foo["class"], "Foo");
        assert!(foo["props"]["Name"].is_string());
        assert!(foo["props"]["Nickname"].is_null());
    }
}

#[test]
fn test_generate_with_seed_is_reproducible() {
    let model = write_temp(MODEL);
    let run = || {
        bin()
            .args(["generate", "--class", "Foo", "--count", "2", "--seed", "11"])
            .arg("--class-defs")
            .arg(model.path())
            .output()
            .unwrap()
    };
    let first = run();
    assert!(first.status.success(), "{first:?}");
    assert_eq!(first.stdout, run().stdout);
}

#[test]
fn test_generate_applies_config_overrides() {
    let model = write_temp(MODEL);
    let config = write_temp("[generators]\nstring = \"name_list\"\n");
    let output = bin()
        .args(["generate", "--class", "Foo"])
        .arg("--class-defs")
        .arg(model.path())
        .arg("--config")
        .arg(config.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let foo: serde_json::Value =
        serde_json::from_str(String::from_utf8(output.stdout).unwrap().trim()).unwrap();
    assert_eq!(foo["props"]["Name"], "Aaliyah");
}

#[test]
fn test_generate_unknown_class_fails() {
    let model = write_temp(MODEL);
    let output = bin()
        .args(["generate", "--class", "Bar"])
        .arg("--class-defs")
        .arg(model.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Bar"), "{stderr}");
}

#[test]
fn test_check_reports_definition_problems() {
    let good = write_temp(MODEL);
    let output = bin()
        .arg("check")
        .arg("--class-defs")
        .arg(good.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let bad = write_temp(
        r#"
classes:
  - name: Order
    props:
      - name: OrderID
        type: guid
    relationships:
      - name: Customer
        related_class: Customer
        cardinality: single
"#,
    );
    let output = bin()
        .arg("check")
        .arg("--class-defs")
        .arg(bad.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Customer"), "{stdout}");
}
