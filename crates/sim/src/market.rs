//! Market aggregate view.
//!
//! Turns a [`ScaledMarketState`] into real amounts, rates, APYs and matching
//! ratios. Views are derived, never persisted: they can always be rebuilt
//! from the snapshot they come from.
//!
//! # Example
//!
//! ```rust
//! use morpho_p2p_sim::market::compute_market_view;
//! use morpho_p2p_sim::state::{MarketConfig, ScaledMarketState};
//! use alloy_primitives::{Address, U256};
//!
//! let underlying = Address::repeat_byte(1);
//! let mut state = ScaledMarketState::new(underlying, 0);
//! state.scaled_morpho_supply_on_pool = U256::from(1_000u64);
//! let config = MarketConfig { underlying, decimals: 6, ..Default::default() };
//!
//! let view = compute_market_view(&state, &config);
//! assert_eq!(view.total_morpho_supply, U256::from(1_000u64));
//! assert_eq!(view.supply_matching_ratio, U256::ZERO);
//! ```

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::math::{mul_div_down, pow10, ratio, ray_mul, zero_floor_sub, PRICE_UNIT};
use crate::p2p_index::{compute_p2p_rates, compute_proportion_idle, rate_to_apy, P2PRatesParams};
use crate::state::{MarketConfig, ScaledMarketState, Snapshot};

/// Decimals of the USD price scale (wad) plus the oracle's 8 decimals.
const PRICE_DECIMALS: u8 = 26;

/// Rescales an 8-decimal oracle price to a wad price per native unit.
///
/// `chain_price * 10^(18 + 8 - decimals) / 10^8`. Assets with more than 26
/// decimals are priced at zero.
pub fn usd_price(chain_usd_price: U256, decimals: u8) -> U256 {
    if decimals > PRICE_DECIMALS {
        return U256::ZERO;
    }
    mul_div_down(chain_usd_price, pow10(PRICE_DECIMALS - decimals), PRICE_UNIT)
}

/// USD value (wad) of a native amount.
pub fn to_usd(amount: U256, usd_price: U256) -> U256 {
    mul_div_down(amount, usd_price, PRICE_UNIT)
}

/// Native amount worth `usd` (wad). Zero when the price is zero.
pub fn from_usd(usd: U256, usd_price: U256) -> U256 {
    mul_div_down(usd, PRICE_UNIT, usd_price)
}

/// Derived view of one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketView {
    pub underlying: Address,
    pub symbol: String,
    pub decimals: u8,

    /// Ray
    pub pool_supply_index: U256,
    pub pool_borrow_index: U256,
    pub p2p_supply_index: U256,
    pub p2p_borrow_index: U256,

    /// Ray per year
    pub pool_supply_rate: U256,
    pub pool_borrow_rate: U256,
    pub p2p_supply_rate: U256,
    pub p2p_borrow_rate: U256,

    /// Percent
    pub pool_supply_apy: U256,
    pub pool_borrow_apy: U256,
    pub p2p_supply_apy: U256,
    pub p2p_borrow_apy: U256,

    /// Pool-wide totals (native)
    pub total_pool_supply: U256,
    pub total_pool_borrow: U256,

    /// Protocol balances (native)
    pub morpho_supply_in_p2p: U256,
    pub morpho_supply_on_pool: U256,
    pub total_morpho_supply: U256,
    pub morpho_borrow_in_p2p: U256,
    pub morpho_borrow_on_pool: U256,
    pub total_morpho_borrow: U256,
    pub total_morpho_collateral: U256,
    pub idle_supply: U256,

    /// Share of protocol supply/borrow that is peer-to-peer (percent)
    pub supply_matching_ratio: U256,
    pub borrow_matching_ratio: U256,

    /// Native
    pub pool_liquidity: U256,
    /// usd8
    pub chain_usd_price: U256,
    /// Wad per native unit
    pub usd_price: U256,

    /// Room left under the supply cap (native); `None` when uncapped
    pub supply_cap_remaining: Option<U256>,
    /// Room left under the borrow cap (native); `None` when uncapped
    pub borrow_cap_remaining: Option<U256>,

    pub last_update_timestamp: u64,
}

impl MarketView {
    /// USD value (wad) of a native amount of this asset.
    pub fn to_usd(&self, amount: U256) -> U256 {
        to_usd(amount, self.usd_price)
    }

    /// Native amount of this asset worth `usd` (wad).
    pub fn from_usd(&self, usd: U256) -> U256 {
        from_usd(usd, self.usd_price)
    }
}

fn cap_remaining(cap: U256, total: U256) -> Option<U256> {
    if cap.is_zero() {
        None
    } else {
        Some(zero_floor_sub(cap, total))
    }
}

/// Derives the view of a market from its state as stored.
///
/// The state is used as-is; age it first with
/// [`accrue_market`](crate::p2p_index::accrue_market) to view it at a later
/// timestamp.
pub fn compute_market_view(state: &ScaledMarketState, config: &MarketConfig) -> MarketView {
    let supply = state.indexes.supply;
    let borrow = state.indexes.borrow;
    let reserve = &state.pool_reserve;

    let proportion_idle =
        compute_proportion_idle(state.idle_supply, &state.deltas.supply, supply.p2p_index);
    let p2p_rates = compute_p2p_rates(&P2PRatesParams {
        pool_supply_rate_per_year: reserve.liquidity_rate,
        pool_borrow_rate_per_year: reserve.variable_borrow_rate,
        pool_supply_index: supply.pool_index,
        pool_borrow_index: borrow.pool_index,
        p2p_supply_index: supply.p2p_index,
        p2p_borrow_index: borrow.p2p_index,
        p2p_index_cursor: config.p2p_index_cursor,
        reserve_factor: config.p2p_reserve_factor,
        deltas: state.deltas,
        proportion_idle,
    });

    let total_pool_supply = ray_mul(state.scaled_pool_supply, supply.pool_index);
    let total_pool_borrow = ray_mul(state.scaled_pool_borrow, borrow.pool_index);

    let morpho_supply_in_p2p = ray_mul(state.deltas.supply.scaled_p2p_total, supply.p2p_index);
    let morpho_supply_on_pool = ray_mul(state.scaled_morpho_supply_on_pool, supply.pool_index);
    let total_morpho_supply = morpho_supply_in_p2p + morpho_supply_on_pool;

    let morpho_borrow_in_p2p = ray_mul(state.deltas.borrow.scaled_p2p_total, borrow.p2p_index);
    let morpho_borrow_on_pool = ray_mul(state.scaled_morpho_borrow_on_pool, borrow.pool_index);
    let total_morpho_borrow = morpho_borrow_in_p2p + morpho_borrow_on_pool;

    MarketView {
        underlying: state.underlying,
        symbol: config.symbol.clone(),
        decimals: config.decimals,
        pool_supply_index: supply.pool_index,
        pool_borrow_index: borrow.pool_index,
        p2p_supply_index: supply.p2p_index,
        p2p_borrow_index: borrow.p2p_index,
        pool_supply_rate: reserve.liquidity_rate,
        pool_borrow_rate: reserve.variable_borrow_rate,
        p2p_supply_rate: p2p_rates.p2p_supply_rate,
        p2p_borrow_rate: p2p_rates.p2p_borrow_rate,
        pool_supply_apy: rate_to_apy(reserve.liquidity_rate),
        pool_borrow_apy: rate_to_apy(reserve.variable_borrow_rate),
        p2p_supply_apy: rate_to_apy(p2p_rates.p2p_supply_rate),
        p2p_borrow_apy: rate_to_apy(p2p_rates.p2p_borrow_rate),
        total_pool_supply,
        total_pool_borrow,
        morpho_supply_in_p2p,
        morpho_supply_on_pool,
        total_morpho_supply,
        morpho_borrow_in_p2p,
        morpho_borrow_on_pool,
        total_morpho_borrow,
        total_morpho_collateral: ray_mul(state.scaled_morpho_collateral, supply.pool_index),
        idle_supply: state.idle_supply,
        supply_matching_ratio: ratio(morpho_supply_in_p2p, total_morpho_supply),
        borrow_matching_ratio: ratio(morpho_borrow_in_p2p, total_morpho_borrow),
        pool_liquidity: state.pool_liquidity,
        chain_usd_price: state.chain_usd_price,
        usd_price: usd_price(state.chain_usd_price, config.decimals),
        supply_cap_remaining: cap_remaining(config.supply_cap, total_pool_supply),
        borrow_cap_remaining: cap_remaining(config.borrow_cap, total_pool_borrow),
        last_update_timestamp: state.indexes.last_update_timestamp,
    }
}

/// Views of every configured market, aged to the snapshot's timestamp.
///
/// Returns [`SimError::MissingData`] when the global context was never fetched.
pub fn get_markets_data(snapshot: &Snapshot) -> Result<Vec<MarketView>> {
    let global = snapshot
        .global
        .as_ref()
        .ok_or(SimError::missing("global context"))?;
    let aged = snapshot.accrue(global.timestamp);
    Ok(market_views(&aged))
}

/// Views of every configured market in an already aged snapshot.
pub(crate) fn market_views(snapshot: &Snapshot) -> Vec<MarketView> {
    snapshot
        .markets
        .iter()
        .filter_map(|(address, state)| {
            snapshot
                .configs
                .get(address)
                .map(|config| compute_market_view(state, config))
        })
        .collect()
}

/// View of one market in an already aged snapshot.
pub(crate) fn market_view(snapshot: &Snapshot, market: &Address) -> Result<MarketView> {
    let state = snapshot
        .markets
        .get(market)
        .ok_or(SimError::UnknownMarket { market: *market })?;
    let config = snapshot
        .configs
        .get(market)
        .ok_or(SimError::MissingConfig { market: *market })?;
    Ok(compute_market_view(state, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{HALF_PERCENT, PERCENT, RAY, WAD};
    use crate::state::{GlobalContext, MarketSideDelta};

    fn usdc() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn create_test_market() -> (ScaledMarketState, MarketConfig) {
        let mut state = ScaledMarketState::new(usdc(), 1_000);
        state.scaled_pool_supply = U256::from(10_000_000_000u64);
        state.scaled_pool_borrow = U256::from(6_000_000_000u64);
        state.scaled_morpho_supply_on_pool = U256::from(300_000_000u64);
        state.scaled_morpho_borrow_on_pool = U256::from(100_000_000u64);
        state.deltas.supply = MarketSideDelta {
            scaled_delta: U256::ZERO,
            scaled_p2p_total: U256::from(100_000_000u64),
        };
        state.deltas.borrow = MarketSideDelta {
            scaled_delta: U256::ZERO,
            scaled_p2p_total: U256::from(100_000_000u64),
        };
        state.pool_reserve.liquidity_rate = RAY * U256::from(2u8) / U256::from(100u8);
        state.pool_reserve.variable_borrow_rate = RAY * U256::from(4u8) / U256::from(100u8);
        state.pool_liquidity = U256::from(4_000_000_000u64);
        state.chain_usd_price = U256::from(100_000_000u64);

        let config = MarketConfig {
            underlying: usdc(),
            symbol: "USDC".to_string(),
            decimals: 6,
            collateral_factor: U256::from(8_000u64),
            borrowable_factor: U256::from(7_500u64),
            p2p_reserve_factor: U256::ZERO,
            p2p_index_cursor: HALF_PERCENT,
            supply_cap: U256::from(12_000_000_000u64),
            ..Default::default()
        };
        (state, config)
    }

    #[test]
    fn test_usd_price_rescales_to_wad() {
        // $1 for a 6-decimals asset
        assert_eq!(
            usd_price(U256::from(100_000_000u64), 6),
            U256::from(10u64).pow(U256::from(20u8))
        );
        // $2000 for an 18-decimals asset
        assert_eq!(
            usd_price(U256::from(200_000_000_000u64), 18),
            U256::from(200_000_000_000u64)
        );
        assert_eq!(usd_price(U256::from(1u64), 30), U256::ZERO);
    }

    #[test]
    fn test_to_and_from_usd() {
        let price = usd_price(U256::from(100_000_000u64), 6);
        let one_usdc = U256::from(1_000_000u64);
        assert_eq!(to_usd(one_usdc, price), WAD);
        assert_eq!(from_usd(WAD, price), one_usdc);
        assert_eq!(from_usd(WAD, U256::ZERO), U256::ZERO);
    }

    #[test]
    fn test_market_view_balances() {
        let (state, config) = create_test_market();
        let view = compute_market_view(&state, &config);

        assert_eq!(view.total_pool_supply, U256::from(10_000_000_000u64));
        assert_eq!(view.morpho_supply_in_p2p, U256::from(100_000_000u64));
        assert_eq!(view.morpho_supply_on_pool, U256::from(300_000_000u64));
        assert_eq!(view.total_morpho_supply, U256::from(400_000_000u64));
        assert_eq!(view.total_morpho_borrow, U256::from(200_000_000u64));
        assert_eq!(view.supply_matching_ratio, U256::from(2_500u64));
        assert_eq!(view.borrow_matching_ratio, HALF_PERCENT);
        assert_eq!(view.supply_cap_remaining, Some(U256::from(2_000_000_000u64)));
        assert_eq!(view.borrow_cap_remaining, None);
        assert_eq!(view.symbol, "USDC");
    }

    #[test]
    fn test_market_view_rates_and_apys() {
        let (state, config) = create_test_market();
        let view = compute_market_view(&state, &config);

        assert_eq!(view.p2p_supply_rate, RAY * U256::from(3u8) / U256::from(100u8));
        assert_eq!(view.p2p_borrow_rate, view.p2p_supply_rate);
        assert!(view.pool_supply_apy < view.p2p_supply_apy);
        assert!(view.p2p_borrow_apy < view.pool_borrow_apy);
    }

    #[test]
    fn test_matching_ratio_zero_for_empty_market() {
        let state = ScaledMarketState::new(usdc(), 0);
        let config = MarketConfig::default();
        let view = compute_market_view(&state, &config);
        assert_eq!(view.total_morpho_supply, U256::ZERO);
        assert_eq!(view.supply_matching_ratio, U256::ZERO);
        assert_eq!(view.borrow_matching_ratio, U256::ZERO);
    }

    #[test]
    fn test_fully_matched_market() {
        let (mut state, config) = create_test_market();
        state.scaled_morpho_supply_on_pool = U256::ZERO;
        let view = compute_market_view(&state, &config);
        assert_eq!(view.supply_matching_ratio, PERCENT);
    }

    #[test]
    fn test_get_markets_data_requires_global() {
        let (state, config) = create_test_market();
        let snapshot = Snapshot::default().with_market(state, config);
        assert_eq!(
            get_markets_data(&snapshot),
            Err(SimError::MissingData {
                what: "global context"
            })
        );
    }

    #[test]
    fn test_get_markets_data_ages_markets() {
        let (state, config) = create_test_market();
        let snapshot = Snapshot::default()
            .with_market(state, config)
            .with_global(GlobalContext {
                timestamp: 1_000 + 86_400,
                ..Default::default()
            });
        let views = get_markets_data(&snapshot).unwrap();
        assert_eq!(views.len(), 1);
        assert!(views[0].pool_supply_index > RAY);
        assert!(views[0].total_morpho_supply > U256::from(400_000_000u64));
        assert_eq!(views[0].last_update_timestamp, 87_400);
    }

    #[test]
    fn test_market_view_lookup_errors() {
        let snapshot = Snapshot::default();
        assert_eq!(
            market_view(&snapshot, &usdc()),
            Err(SimError::UnknownMarket { market: usdc() })
        );
    }
}
