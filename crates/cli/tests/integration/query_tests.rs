//! Integration tests for markets, user and capacity commands.

use predicates::prelude::*;

use super::helpers::{
    create_test_snapshot, morpho_cmd, snapshot_file, write_snapshot, UNKNOWN, USDC, WETH,
};

#[test]
fn test_markets_table() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["markets", "--snapshot"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("WETH"))
        .stdout(predicate::str::contains("USDC"))
        .stdout(predicate::str::contains("P2P Supply APY"));
}

#[test]
fn test_markets_json_output() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["markets", "--format", "json", "--snapshot"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"symbol\": \"USDC\""))
        .stdout(predicate::str::contains("p2p_supply_index"));
}

#[test]
fn test_snapshot_from_env() {
    let file = snapshot_file();

    morpho_cmd()
        .arg("markets")
        .env("MORPHO_P2P_SNAPSHOT", file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("WETH"));
}

#[test]
fn test_user_detail() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["user", "--snapshot"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Health Factor"))
        .stdout(predicate::str::contains("∞"))
        .stdout(predicate::str::contains("$1.50K"))
        .stdout(predicate::str::contains("WETH"));
}

#[test]
fn test_user_json_output() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["user", "--format", "json", "--snapshot"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("health_factor"))
        .stdout(predicate::str::contains("borrow_capacity"));
}

#[test]
fn test_capacity_single_operation() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["capacity", "--market", USDC, "--operation", "supply", "--snapshot"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("500.0000"))
        .stdout(predicate::str::contains("wallet balance"));
}

#[test]
fn test_capacity_all_operations() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["capacity", "--market", WETH, "--snapshot"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("withdrawCollateral"))
        .stdout(predicate::str::contains("borrow capacity"))
        .stdout(predicate::str::contains("claimRewards"));
}

#[test]
fn test_capacity_json_output() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["capacity", "--format", "json", "--market", USDC, "--operation", "borrow"])
        .arg("--snapshot")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reason\": \"borrowCapacity\""));
}

#[test]
fn test_capacity_unknown_market() {
    let file = snapshot_file();

    morpho_cmd()
        .args(["capacity", "--market", UNKNOWN, "--snapshot"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown market"));
}

#[test]
fn test_snapshot_without_global_context() {
    let mut snapshot = create_test_snapshot();
    snapshot.global = None;
    let file = write_snapshot(&snapshot);

    morpho_cmd()
        .args(["markets", "--snapshot"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incomplete snapshot"));
}

#[test]
fn test_missing_snapshot_file() {
    morpho_cmd()
        .args(["markets", "--snapshot", "/nonexistent/snapshot.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load snapshot"));
}
