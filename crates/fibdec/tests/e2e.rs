//! End-to-end CLI integration tests.

use assert_cmd::Command;
use predicates::prelude::*;

const F100: &str = "354224848179261915075";

fn fibdec() -> Command {
    let mut cmd = Command::cargo_bin("fibdec").expect("binary not found");
    cmd.env_remove("FIBDEC_INDEX");
    cmd
}

#[test]
fn help_flag() {
    fibdec()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fibonacci"));
}

#[test]
fn version_flag() {
    fibdec()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fibdec"));
}

#[test]
fn compute_f100_quiet() {
    fibdec()
        .args(["-n", "100", "-q"])
        .assert()
        .success()
        .stdout(format!("{F100}\n"));
}

#[test]
fn compute_f0_and_f1() {
    fibdec().args(["-n", "0", "-q"]).assert().success().stdout("0\n");
    fibdec().args(["-n", "1", "-q"]).assert().success().stdout("1\n");
}

#[test]
fn default_output_names_the_algorithm() {
    fibdec()
        .args(["-n", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DecimalFastDoubling"))
        .stdout(predicate::str::contains("F(10) = 55"));
}

#[test]
fn reference_algorithm() {
    fibdec()
        .args(["-n", "100", "--algo", "reference", "-q"])
        .assert()
        .success()
        .stdout(format!("{F100}\n"));
}

#[test]
fn index_from_environment() {
    fibdec()
        .env("FIBDEC_INDEX", "12")
        .arg("-q")
        .assert()
        .success()
        .stdout("144\n");
}

#[test]
fn verify_flag() {
    fibdec()
        .args(["-n", "1000", "--verify", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("849228875\n"));
}

#[test]
fn range_prints_one_value_per_line() {
    fibdec()
        .args(["-n", "10", "--to", "14", "-q"])
        .assert()
        .success()
        .stdout("55\n89\n144\n233\n377\n");
}

#[test]
fn inverted_range_is_config_error() {
    fibdec()
        .args(["-n", "20", "--to", "10"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("below start"));
}

#[test]
fn invalid_algorithm() {
    fibdec()
        .args(["-n", "10", "--algo", "invalid"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("unknown calculator"));
}

#[test]
fn invalid_memory_limit() {
    fibdec()
        .args(["-n", "10", "--memory-limit", "lots"])
        .assert()
        .code(4);
}

#[test]
fn memory_limit_too_small_fails_allocation() {
    fibdec()
        .args(["-n", "1000", "--memory-limit", "32", "-q"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[test]
fn json_lines_output() {
    let output = fibdec()
        .args(["-n", "20", "--to", "21", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["index"], 20);
    assert_eq!(lines[0]["value"], "6765");
    assert_eq!(lines[1]["value"], "10946");
}

#[test]
fn device_backend() {
    fibdec()
        .args(["--device", "-n", "100", "-q"])
        .assert()
        .success()
        .stdout(format!("{F100}\n"));
}

#[test]
fn device_rejects_index_past_limit() {
    fibdec()
        .args(["--device", "-n", "600", "-q"])
        .assert()
        .code(4);
}

#[test]
fn device_buffer_too_small() {
    fibdec()
        .args(["--device", "--buffer-size", "8", "-n", "100", "-q"])
        .assert()
        .code(5);
}

#[test]
fn device_and_service_conflict() {
    fibdec().args(["--device", "--service"]).assert().failure();
}

#[test]
fn service_backend() {
    fibdec()
        .args(["--service", "-n", "5", "--to", "7", "-q"])
        .assert()
        .success()
        .stdout("5\n8\n13\n");
}

#[test]
fn output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fib.txt");
    fibdec()
        .args(["-n", "100", "-q", "-o", path.to_str().unwrap()])
        .assert()
        .success();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), format!("{F100}\n"));
}

#[test]
fn completion_bash() {
    fibdec()
        .args(["--completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fibdec"));
}
