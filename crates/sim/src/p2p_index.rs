//! Peer-to-peer index and rate model.
//!
//! Peer-to-peer positions grow at a "mid" rate between the pool supply and
//! pool borrow rates, positioned by the market's `p2p_index_cursor` and
//! skewed by the `p2p_reserve_factor`. The part of the peer-to-peer principal
//! that is not actually matched (the *delta*, resting on the pool) grows at
//! the pool rate instead, and idle supply does not grow at all.
//!
//! # Index update
//!
//! ```text
//! pool_growth   = new_pool_index / last_pool_index
//! p2p_growth    = percent_avg(supply_growth, borrow_growth, cursor)
//! supply_growth'= p2p_growth - fee * (p2p_growth - supply_growth)
//! borrow_growth'= p2p_growth + fee * (borrow_growth - p2p_growth)
//!
//! new_p2p_index = last_p2p_index * ((1 - δ - ι) * growth' + δ * pool_growth + ι)
//! ```
//!
//! where `δ` is the delta proportion and `ι` the idle proportion (supply side
//! only). When the pool supply growth exceeds the borrow growth (only
//! possible through donations to the pool), both peer-to-peer sides take the
//! borrow growth so suppliers never out-earn borrowers.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::math::{
    compounded_interest, min, percent_avg, percent_mul, ray_div, ray_div_up, ray_mul,
    ray_to_percent, zero_floor_sub, RAY, SECONDS_PER_YEAR,
};
use crate::pool_index::{compute_pool_indexes, PoolIndexesParams};
use crate::state::{
    MarketConfig, MarketDeltas, MarketIndexes, MarketSideDelta, PoolReserveState,
    ScaledMarketState, SideIndexes,
};

/// Inputs to [`compute_p2p_indexes`]. Indexes are ray, factors percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct P2PIndexesParams {
    pub last_pool_supply_index: U256,
    pub last_pool_borrow_index: U256,
    pub last_p2p_supply_index: U256,
    pub last_p2p_borrow_index: U256,
    /// Aged pool supply index
    pub pool_supply_index: U256,
    /// Aged pool borrow index
    pub pool_borrow_index: U256,
    pub p2p_index_cursor: U256,
    pub reserve_factor: U256,
    pub deltas: MarketDeltas,
    /// Share of peer-to-peer supply parked idle (ray)
    pub proportion_idle: U256,
}

/// Peer-to-peer indexes (ray).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct P2PIndexes {
    pub p2p_supply_index: U256,
    pub p2p_borrow_index: U256,
}

/// Growth factors over one aging period (ray).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthFactors {
    pub pool_supply_growth: U256,
    pub pool_borrow_growth: U256,
    pub p2p_supply_growth: U256,
    pub p2p_borrow_growth: U256,
}

/// Computes pool and peer-to-peer growth factors between two index states.
pub fn compute_growth_factors(
    last_pool_supply_index: U256,
    last_pool_borrow_index: U256,
    pool_supply_index: U256,
    pool_borrow_index: U256,
    p2p_index_cursor: U256,
    reserve_factor: U256,
) -> GrowthFactors {
    let pool_supply_growth = ray_div(pool_supply_index, last_pool_supply_index);
    let pool_borrow_growth = ray_div(pool_borrow_index, last_pool_borrow_index);

    let (p2p_supply_growth, p2p_borrow_growth) = skewed_mid(
        pool_supply_growth,
        pool_borrow_growth,
        p2p_index_cursor,
        reserve_factor,
    );

    GrowthFactors {
        pool_supply_growth,
        pool_borrow_growth,
        p2p_supply_growth,
        p2p_borrow_growth,
    }
}

/// Mid value between a supply-side and a borrow-side quantity, skewed by the
/// reserve factor. Works on growth factors and on rates alike.
fn skewed_mid(
    supply_side: U256,
    borrow_side: U256,
    cursor: U256,
    reserve_factor: U256,
) -> (U256, U256) {
    if supply_side > borrow_side {
        return (borrow_side, borrow_side);
    }

    let mid = percent_avg(supply_side, borrow_side, cursor);
    let supply = mid - percent_mul(mid - supply_side, reserve_factor);
    let borrow = mid + percent_mul(borrow_side - mid, reserve_factor);
    (supply, borrow)
}

/// Share of peer-to-peer supply that is parked idle (ray, capped at one).
///
/// Zero when there is no idle supply or no peer-to-peer supply.
pub fn compute_proportion_idle(
    idle_supply: U256,
    supply_delta: &MarketSideDelta,
    p2p_supply_index: U256,
) -> U256 {
    if idle_supply.is_zero() || supply_delta.scaled_p2p_total.is_zero() {
        return U256::ZERO;
    }
    let total_p2p_supplied = ray_mul(supply_delta.scaled_p2p_total, p2p_supply_index);
    if total_p2p_supplied.is_zero() {
        return RAY;
    }
    min(ray_div_up(idle_supply, total_p2p_supplied), RAY)
}

/// Share of peer-to-peer principal that is unmatched and sits on the pool
/// (ray), bounded by `1 - proportion_idle`.
///
/// Zero when the peer-to-peer total is zero.
pub fn compute_proportion_delta(
    delta: &MarketSideDelta,
    pool_index: U256,
    p2p_index: U256,
    proportion_idle: U256,
) -> U256 {
    if delta.scaled_p2p_total.is_zero() || delta.scaled_delta.is_zero() {
        return U256::ZERO;
    }
    let p2p_amount = ray_mul(delta.scaled_p2p_total, p2p_index);
    let upper = zero_floor_sub(RAY, proportion_idle);
    if p2p_amount.is_zero() {
        return upper;
    }
    min(
        ray_div_up(ray_mul(delta.scaled_delta, pool_index), p2p_amount),
        upper,
    )
}

fn compute_p2p_index(
    pool_growth: U256,
    p2p_growth: U256,
    last_pool_index: U256,
    last_p2p_index: U256,
    delta: &MarketSideDelta,
    proportion_idle: U256,
) -> U256 {
    if delta.scaled_p2p_total.is_zero()
        || (delta.scaled_delta.is_zero() && proportion_idle.is_zero())
    {
        return ray_mul(last_p2p_index, p2p_growth);
    }

    let proportion_idle = min(proportion_idle, RAY);
    let proportion_delta =
        compute_proportion_delta(delta, last_pool_index, last_p2p_index, proportion_idle);
    let matched = zero_floor_sub(zero_floor_sub(RAY, proportion_delta), proportion_idle);

    ray_mul(
        last_p2p_index,
        ray_mul(matched, p2p_growth) + ray_mul(proportion_delta, pool_growth) + proportion_idle,
    )
}

/// Computes the new peer-to-peer supply and borrow indexes.
///
/// # Example
///
/// ```rust
/// use morpho_p2p_sim::p2p_index::{compute_p2p_indexes, P2PIndexesParams};
/// use morpho_p2p_sim::math::{HALF_PERCENT, RAY};
/// use morpho_p2p_sim::state::MarketDeltas;
/// use alloy_primitives::U256;
///
/// let indexes = compute_p2p_indexes(&P2PIndexesParams {
///     last_pool_supply_index: RAY,
///     last_pool_borrow_index: RAY,
///     last_p2p_supply_index: RAY,
///     last_p2p_borrow_index: RAY,
///     pool_supply_index: RAY * U256::from(3u8) / U256::from(2u8),
///     pool_borrow_index: RAY * U256::from(2u8),
///     p2p_index_cursor: HALF_PERCENT,
///     reserve_factor: U256::ZERO,
///     deltas: MarketDeltas::default(),
///     proportion_idle: U256::ZERO,
/// });
///
/// assert_eq!(indexes.p2p_supply_index, RAY * U256::from(7u8) / U256::from(4u8));
/// assert_eq!(indexes.p2p_borrow_index, indexes.p2p_supply_index);
/// ```
pub fn compute_p2p_indexes(params: &P2PIndexesParams) -> P2PIndexes {
    let growth = compute_growth_factors(
        params.last_pool_supply_index,
        params.last_pool_borrow_index,
        params.pool_supply_index,
        params.pool_borrow_index,
        params.p2p_index_cursor,
        params.reserve_factor,
    );

    P2PIndexes {
        p2p_supply_index: compute_p2p_index(
            growth.pool_supply_growth,
            growth.p2p_supply_growth,
            params.last_pool_supply_index,
            params.last_p2p_supply_index,
            &params.deltas.supply,
            params.proportion_idle,
        ),
        p2p_borrow_index: compute_p2p_index(
            growth.pool_borrow_growth,
            growth.p2p_borrow_growth,
            params.last_pool_borrow_index,
            params.last_p2p_borrow_index,
            &params.deltas.borrow,
            U256::ZERO,
        ),
    }
}

/// Inputs to [`compute_p2p_rates`]. Rates are ray per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct P2PRatesParams {
    pub pool_supply_rate_per_year: U256,
    pub pool_borrow_rate_per_year: U256,
    pub pool_supply_index: U256,
    pub pool_borrow_index: U256,
    pub p2p_supply_index: U256,
    pub p2p_borrow_index: U256,
    pub p2p_index_cursor: U256,
    pub reserve_factor: U256,
    pub deltas: MarketDeltas,
    pub proportion_idle: U256,
}

/// Blended peer-to-peer rates (ray per year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct P2PRates {
    pub p2p_supply_rate: U256,
    pub p2p_borrow_rate: U256,
}

/// Computes the rates experienced by peer-to-peer suppliers and borrowers.
///
/// Same blend as the index update, applied to instantaneous rates: the
/// unmatched share earns/pays the pool rate and the idle share earns nothing.
pub fn compute_p2p_rates(params: &P2PRatesParams) -> P2PRates {
    let (mid_supply, mid_borrow) = skewed_mid(
        params.pool_supply_rate_per_year,
        params.pool_borrow_rate_per_year,
        params.p2p_index_cursor,
        params.reserve_factor,
    );

    let mut p2p_supply_rate = mid_supply;
    if !params.deltas.supply.scaled_p2p_total.is_zero()
        && (!params.deltas.supply.scaled_delta.is_zero() || !params.proportion_idle.is_zero())
    {
        let proportion_idle = min(params.proportion_idle, RAY);
        let proportion_delta = compute_proportion_delta(
            &params.deltas.supply,
            params.pool_supply_index,
            params.p2p_supply_index,
            proportion_idle,
        );
        let matched = zero_floor_sub(zero_floor_sub(RAY, proportion_delta), proportion_idle);
        p2p_supply_rate = ray_mul(mid_supply, matched)
            + ray_mul(params.pool_supply_rate_per_year, proportion_delta);
    }

    let mut p2p_borrow_rate = mid_borrow;
    if !params.deltas.borrow.scaled_p2p_total.is_zero()
        && !params.deltas.borrow.scaled_delta.is_zero()
    {
        let proportion_delta = compute_proportion_delta(
            &params.deltas.borrow,
            params.pool_borrow_index,
            params.p2p_borrow_index,
            U256::ZERO,
        );
        p2p_borrow_rate = ray_mul(mid_borrow, RAY - proportion_delta)
            + ray_mul(params.pool_borrow_rate_per_year, proportion_delta);
    }

    P2PRates {
        p2p_supply_rate,
        p2p_borrow_rate,
    }
}

/// Converts a yearly rate (ray) to an APY in percent base.
///
/// The rate is compounded every second over one year with the same Taylor
/// expansion the pool uses, then rounded half-up to 4 decimals.
pub fn rate_to_apy(rate_per_year: U256) -> U256 {
    ray_to_percent(compounded_interest(rate_per_year, SECONDS_PER_YEAR) - RAY)
}

/// Ages a market to `now`.
///
/// The pool reserve indexes are aged with the pool model, then fed with the
/// stored indexes into the peer-to-peer model. The successor's stored and
/// reserve indexes are the aged ones and both timestamps equal `now`. A
/// market already at or past `now` is returned unchanged.
pub fn accrue_market(
    state: &ScaledMarketState,
    config: &MarketConfig,
    now: u64,
) -> ScaledMarketState {
    if now <= state.indexes.last_update_timestamp {
        return state.clone();
    }

    let pool = compute_pool_indexes(&PoolIndexesParams {
        last_pool_supply_index: state.pool_reserve.liquidity_index,
        last_pool_borrow_index: state.pool_reserve.variable_borrow_index,
        last_update_timestamp: state.pool_reserve.last_update_timestamp,
        pool_supply_rate_per_year: state.pool_reserve.liquidity_rate,
        pool_borrow_rate_per_year: state.pool_reserve.variable_borrow_rate,
        current_timestamp: now,
    });

    let proportion_idle = compute_proportion_idle(
        state.idle_supply,
        &state.deltas.supply,
        state.indexes.supply.p2p_index,
    );

    let p2p = compute_p2p_indexes(&P2PIndexesParams {
        last_pool_supply_index: state.indexes.supply.pool_index,
        last_pool_borrow_index: state.indexes.borrow.pool_index,
        last_p2p_supply_index: state.indexes.supply.p2p_index,
        last_p2p_borrow_index: state.indexes.borrow.p2p_index,
        pool_supply_index: pool.pool_supply_index,
        pool_borrow_index: pool.pool_borrow_index,
        p2p_index_cursor: config.p2p_index_cursor,
        reserve_factor: config.p2p_reserve_factor,
        deltas: state.deltas,
        proportion_idle,
    });

    ScaledMarketState {
        indexes: MarketIndexes {
            supply: SideIndexes {
                pool_index: pool.pool_supply_index,
                p2p_index: p2p.p2p_supply_index,
            },
            borrow: SideIndexes {
                pool_index: pool.pool_borrow_index,
                p2p_index: p2p.p2p_borrow_index,
            },
            last_update_timestamp: now,
        },
        pool_reserve: PoolReserveState {
            liquidity_index: pool.pool_supply_index,
            variable_borrow_index: pool.pool_borrow_index,
            last_update_timestamp: now,
            ..state.pool_reserve
        },
        ..state.clone()
    }
}
