//! Shared fixtures for integration tests.

use alloy_primitives::{Address, U256};
use morpho_p2p_sim::math::HALF_PERCENT;
use morpho_p2p_sim::{
    GlobalContext, MarketConfig, ScaledMarketState, Snapshot, UserContext, UserScaledPosition,
    WAD,
};

/// Fixture timestamp for every market and the global context.
pub const START: u64 = 1_000;

pub fn weth() -> Address {
    Address::repeat_byte(0xee)
}

pub fn usdc() -> Address {
    Address::repeat_byte(0xaa)
}

pub fn user() -> Address {
    Address::repeat_byte(0x11)
}

pub fn usdc_amount(units: u64) -> U256 {
    U256::from(units) * U256::from(1_000_000u64)
}

/// Two markets: WETH at $2000 (CF 80%, BF 75%) and USDC at $1 (CF 85%,
/// BF 80%). The user holds 1 WETH of collateral and 500 USDC in their wallet.
pub fn create_test_snapshot() -> Snapshot {
    let mut weth_state = ScaledMarketState::new(weth(), START);
    weth_state.chain_usd_price = U256::from(2_000u64) * U256::from(100_000_000u64);
    weth_state.pool_liquidity = U256::from(1_000u64) * WAD;
    let weth_config = MarketConfig {
        underlying: weth(),
        symbol: "WETH".to_string(),
        decimals: 18,
        collateral_factor: U256::from(8_000u64),
        borrowable_factor: U256::from(7_500u64),
        p2p_index_cursor: HALF_PERCENT,
        wrapped_native: true,
        ..Default::default()
    };

    let mut usdc_state = ScaledMarketState::new(usdc(), START);
    usdc_state.chain_usd_price = U256::from(100_000_000u64);
    usdc_state.pool_liquidity = usdc_amount(1_000_000);
    usdc_state.scaled_pool_supply = usdc_amount(2_000_000);
    usdc_state.scaled_pool_borrow = usdc_amount(1_000_000);
    let usdc_config = MarketConfig {
        underlying: usdc(),
        symbol: "USDC".to_string(),
        decimals: 6,
        collateral_factor: U256::from(8_500u64),
        borrowable_factor: U256::from(8_000u64),
        p2p_index_cursor: HALF_PERCENT,
        ..Default::default()
    };

    let mut weth_position = UserScaledPosition::empty(weth());
    weth_position.scaled_collateral = WAD;
    let mut usdc_position = UserScaledPosition::empty(usdc());
    usdc_position.wallet_balance = usdc_amount(500);

    Snapshot::default()
        .with_market(weth_state, weth_config)
        .with_market(usdc_state, usdc_config)
        .with_position(weth_position)
        .with_position(usdc_position)
        .with_global(GlobalContext {
            timestamp: START,
            ..Default::default()
        })
        .with_user(UserContext {
            address: user(),
            native_balance: U256::from(2u64) * WAD,
            ..Default::default()
        })
}
