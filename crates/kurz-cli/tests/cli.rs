//! End-to-end tests for the `kurz` and `kurz-logs` binaries.
//!
//! Cluster invocations are pointed at `true`/`false` via `--kubectl-bin`
//! so no real cluster CLI is needed.

use assert_cmd::Command;
use predicates::prelude::*;

fn kurz(state_path: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("kurz").expect("kurz binary");
    cmd.env("KURZ_STATE_PATH", state_path);
    cmd.env_remove("KURZ_SHORT_ALIASES");
    cmd
}

#[test]
fn unknown_resource_exits_two_and_names_the_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    kurz(&dir.path().join("ns"))
        .args(["zz.del", "something"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown resource 'zz'"));
}

#[test]
fn argument_mismatch_exits_two_and_names_the_entry() {
    let dir = tempfile::tempdir().expect("tempdir");
    kurz(&dir.path().join("ns"))
        .args(["scale", "a=1", "bad"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bad"));
}

#[test]
fn use_round_trips_the_persisted_namespace() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = dir.path().join("ns");

    kurz(&state)
        .args(["use", "team-a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to namespace 'team-a'."));

    kurz(&state)
        .arg("use")
        .assert()
        .success()
        .stdout(predicate::str::contains("Current namespace: team-a"));
}

#[test]
fn current_namespace_defaults_without_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    kurz(&dir.path().join("absent"))
        .arg("use")
        .assert()
        .success()
        .stdout(predicate::str::contains("Current namespace: default"));
}

#[test]
fn delegated_exit_code_is_propagated() {
    let dir = tempfile::tempdir().expect("tempdir");
    kurz(&dir.path().join("ns"))
        .args(["--kubectl-bin", "true", "po"])
        .assert()
        .code(0);

    kurz(&dir.path().join("ns"))
        .args(["--kubectl-bin", "false", "po"])
        .assert()
        .code(1);
}

#[test]
fn listing_shows_aliases_and_actions() {
    let dir = tempfile::tempdir().expect("tempdir");
    kurz(&dir.path().join("ns"))
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("pods"))
        .stdout(predicate::str::contains("drain"));
}

#[test]
fn json_listing_parses() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = kurz(&dir.path().join("ns"))
        .args(["--list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid json");
    assert!(value["aliases"].as_array().is_some_and(|a| !a.is_empty()));
}

#[test]
fn missing_token_is_a_usage_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    kurz(&dir.path().join("ns")).assert().failure();
}

#[test]
fn logs_wrapper_fails_cleanly_without_a_cluster() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cmd = Command::cargo_bin("kurz-logs").expect("kurz-logs binary");
    cmd.env("KURZ_STATE_PATH", dir.path().join("ns"));
    // Point the tunnel at a hopeless target with a tight retry budget; the
    // wrapper must fail fast and report an error rather than hang.
    cmd.args([
        "--target",
        "svc/does-not-exist",
        "--attempts",
        "2",
        "query",
        "{}",
    ]);
    cmd.timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
