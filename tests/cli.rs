use assert_fs::prelude::*;
use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_relnote-conv"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_cli_prints_lines_and_summary() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("notes.json");
    input
        .write_str(r#"{"001": {"Title": "Q3 Update", "Body": "<p>Fixed bugs</p>"}}"#)
        .unwrap();
    let out = temp.child("out");

    let output = run_cli(&[
        "--input",
        input.path().to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("title : Q3Update"));
    assert!(stdout.contains("File has been created successfully."));
    assert!(stdout.contains("Conversion Summary"));
    out.child("Q3Update.txt").assert("Fixed bugs");
}

#[test]
fn test_cli_failed_write_still_exits_zero() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("notes.json");
    input
        .write_str(r#"{"1": {"Title": "../Escaped", "Body": "up"}}"#)
        .unwrap();
    let out = temp.child("out");

    let output = run_cli(&[
        "--input",
        input.path().to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: "));
    assert!(!temp.child("Escaped.txt").path().exists());
}

#[test]
fn test_cli_empty_input_warns() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("notes.json");
    input.write_str("{}").unwrap();

    let output = run_cli(&["--input", input.path().to_str().unwrap(), "--dry-run"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No release notes"));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Conversion Summary"));
}
