//! Integration tests for the simulate command.

use predicates::prelude::*;

use super::helpers::{morpho_cmd, snapshot_file, UNKNOWN, USDC, WETH};

#[test]
fn test_simulate_supply() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["simulate", "--op", &format!("supply:{}:100", USDC), "--snapshot"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("100.0000"))
        .stdout(predicate::str::contains("Simulation succeeded"));
}

#[test]
fn test_simulate_sequence_with_max() {
    let file = snapshot_file();

    morpho_cmd()
        .args([
            "simulate",
            "--op",
            &format!("supplyCollateral:{}:max", USDC),
            "--op",
            &format!("borrow:{}:0.1:unwrap", WETH),
            "--snapshot",
        ])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("borrow (unwrap)"))
        .stdout(predicate::str::contains("Simulation succeeded"));
}

#[test]
fn test_simulate_borrow_over_capacity_warns() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["simulate", "--op", &format!("borrow:{}:2000", USDC), "--snapshot"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning:"))
        .stdout(predicate::str::contains("collateral capacity reached at operation 0"));
}

#[test]
fn test_simulate_unknown_market_aborts() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["simulate", "--op", &format!("withdraw:{}:max", UNKNOWN), "--snapshot"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborted:"))
        .stdout(predicate::str::contains("unknown market"));
}

#[test]
fn test_simulate_json_output() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["simulate", "--format", "json"])
        .args(["--op", &format!("repay:{}:10", USDC), "--snapshot"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"steps\""))
        .stdout(predicate::str::contains("insufficientBalance"));
}

#[test]
fn test_simulate_unknown_market_amount_needs_decimals() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["simulate", "--op", &format!("supply:{}:1.5", UNKNOWN), "--snapshot"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown market"));
}
