//! Test helper utilities for CLI integration tests.

#![allow(deprecated)] // Command::cargo_bin deprecation

use std::io::Write;

use alloy_primitives::{Address, U256};
use assert_cmd::Command;
use morpho_p2p_sim::{
    GlobalContext, MarketConfig, ScaledMarketState, Snapshot, UserContext, UserScaledPosition,
    WAD,
};
use tempfile::NamedTempFile;

pub const WETH: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";
pub const USDC: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const UNKNOWN: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// Create a CLI command.
pub fn morpho_cmd() -> Command {
    Command::cargo_bin("morpho-p2p").unwrap()
}

fn price(usd: u64) -> U256 {
    U256::from(usd) * U256::from(100_000_000u64)
}

/// WETH at $2000 (wrapped native) and USDC at $1; the user holds 1 WETH of
/// collateral and 500 USDC in their wallet.
pub fn create_test_snapshot() -> Snapshot {
    let weth = Address::repeat_byte(0xee);
    let usdc = Address::repeat_byte(0xaa);
    let usdc_unit = U256::from(1_000_000u64);

    let mut weth_state = ScaledMarketState::new(weth, 1_000);
    weth_state.chain_usd_price = price(2_000);
    weth_state.pool_liquidity = U256::from(1_000u64) * WAD;

    let mut usdc_state = ScaledMarketState::new(usdc, 1_000);
    usdc_state.chain_usd_price = price(1);
    usdc_state.pool_liquidity = U256::from(1_000_000u64) * usdc_unit;

    let mut weth_position = UserScaledPosition::empty(weth);
    weth_position.scaled_collateral = WAD;
    let mut usdc_position = UserScaledPosition::empty(usdc);
    usdc_position.wallet_balance = U256::from(500u64) * usdc_unit;

    Snapshot::default()
        .with_market(
            weth_state,
            MarketConfig {
                underlying: weth,
                symbol: "WETH".to_string(),
                decimals: 18,
                collateral_factor: U256::from(8_000u64),
                borrowable_factor: U256::from(7_500u64),
                wrapped_native: true,
                ..Default::default()
            },
        )
        .with_market(
            usdc_state,
            MarketConfig {
                underlying: usdc,
                symbol: "USDC".to_string(),
                decimals: 6,
                collateral_factor: U256::from(8_500u64),
                borrowable_factor: U256::from(8_000u64),
                ..Default::default()
            },
        )
        .with_position(weth_position)
        .with_position(usdc_position)
        .with_global(GlobalContext {
            block: 100,
            timestamp: 1_000,
            ..Default::default()
        })
        .with_user(UserContext {
            address: Address::repeat_byte(0x11),
            native_balance: WAD,
            ..Default::default()
        })
}

/// Write a snapshot to a temporary JSON file.
pub fn write_snapshot(snapshot: &Snapshot) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string_pretty(snapshot).unwrap().as_bytes())
        .unwrap();
    file
}

/// Write the default test snapshot to a temporary JSON file.
pub fn snapshot_file() -> NamedTempFile {
    write_snapshot(&create_test_snapshot())
}
