//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "linkpulse-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("LinkPulse"),
        "Should show app description"
    );
    assert!(stdout.contains("run"), "Should show run command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "linkpulse-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("lp"), "Should show binary name");
}

/// A short quiet run over one scenario completes and prints the ranking
#[test]
fn test_run_scenario_quiet() {
    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "linkpulse-cli",
            "--",
            "--quiet",
            "run",
            "--scenario",
            "B",
            "--strategy",
            "ewma",
            "--ticks",
            "10",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "run should succeed: {stdout}");
    assert!(
        stdout.contains("End-of-run summary"),
        "Should print the ranking: {stdout}"
    );
    assert!(stdout.contains("eth0"), "Ranking should list interfaces");
}

/// JSON output is parseable and carries the summary
#[test]
fn test_run_scenario_json() {
    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "linkpulse-cli",
            "--",
            "--format",
            "json",
            "run",
            "--scenario",
            "A",
            "--strategy",
            "raw",
            "--ticks",
            "20",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "run should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout should be JSON");
    assert_eq!(report["scenario"], "A");
    assert_eq!(report["summary"].as_array().unwrap().len(), 4);
}

/// Unknown scenarios are rejected
#[test]
fn test_unknown_scenario_fails() {
    let output = Command::new("cargo")
        .args([
            "run", "-p", "linkpulse-cli", "--", "run", "--scenario", "Z",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown scenario"), "stderr: {stderr}");
}
