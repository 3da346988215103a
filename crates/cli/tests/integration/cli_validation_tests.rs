//! CLI argument validation tests.
//!
//! These tests verify that the CLI properly validates arguments and provides
//! helpful error messages without reading a snapshot.

use predicates::prelude::*;

use super::helpers::{morpho_cmd, USDC};

#[test]
fn test_help_output() {
    morpho_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("morpho-p2p"))
        .stdout(predicate::str::contains("markets"))
        .stdout(predicate::str::contains("user"))
        .stdout(predicate::str::contains("capacity"))
        .stdout(predicate::str::contains("simulate"));
}

#[test]
fn test_invalid_command() {
    morpho_cmd()
        .arg("invalid_command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_markets_missing_snapshot() {
    morpho_cmd()
        .arg("markets")
        .env_remove("MORPHO_P2P_SNAPSHOT")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_invalid_output_format() {
    morpho_cmd()
        .args(["markets", "--snapshot", "s.json", "--format", "invalid_format"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_capacity_invalid_operation() {
    morpho_cmd()
        .args(["capacity", "--snapshot", "s.json", "--market", USDC])
        .args(["--operation", "lend"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown operation"));
}

#[test]
fn test_capacity_invalid_market() {
    morpho_cmd()
        .args(["capacity", "--snapshot", "s.json", "--market", "0x1234"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_simulate_requires_operations() {
    morpho_cmd()
        .args(["simulate", "--snapshot", "s.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--op"));
}

#[test]
fn test_simulate_invalid_operation_format() {
    morpho_cmd()
        .args(["simulate", "--snapshot", "s.json", "--op", "supply:100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected kind:market:amount[:unwrap]"));
}

#[test]
fn test_simulate_help() {
    morpho_cmd()
        .args(["simulate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--op"))
        .stdout(predicate::str::contains("--snapshot"))
        .stdout(predicate::str::contains("MORPHO_P2P_SNAPSHOT"));
}
