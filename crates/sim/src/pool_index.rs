//! Pool index model.
//!
//! Ages the underlying pool's supply (liquidity) and borrow (variable debt)
//! indexes forward in time exactly like the pool's reserve logic does:
//! linear interest on the supply side, third-order Taylor compounding on the
//! borrow side.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::math::{compounded_interest, linear_interest, ray_mul};

/// Inputs to [`compute_pool_indexes`]. Indexes and rates are ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolIndexesParams {
    pub last_pool_supply_index: U256,
    pub last_pool_borrow_index: U256,
    pub last_update_timestamp: u64,
    /// Pool supply rate (ray per year)
    pub pool_supply_rate_per_year: U256,
    /// Pool variable borrow rate (ray per year)
    pub pool_borrow_rate_per_year: U256,
    pub current_timestamp: u64,
}

/// Aged pool indexes (ray).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolIndexes {
    pub pool_supply_index: U256,
    pub pool_borrow_index: U256,
}

/// Returns the pool indexes as of `current_timestamp`.
///
/// When `current_timestamp <= last_update_timestamp` the last indexes are
/// returned unchanged.
///
/// # Example
///
/// ```rust
/// use morpho_p2p_sim::pool_index::{compute_pool_indexes, PoolIndexesParams};
/// use morpho_p2p_sim::math::RAY;
/// use alloy_primitives::U256;
///
/// let indexes = compute_pool_indexes(&PoolIndexesParams {
///     last_pool_supply_index: RAY,
///     last_pool_borrow_index: RAY,
///     last_update_timestamp: 1_000,
///     pool_supply_rate_per_year: RAY / U256::from(100u8),
///     pool_borrow_rate_per_year: RAY / U256::from(50u8),
///     current_timestamp: 1_000 + 86_400,
/// });
///
/// assert!(indexes.pool_supply_index > RAY);
/// assert!(indexes.pool_borrow_index > indexes.pool_supply_index);
/// ```
pub fn compute_pool_indexes(params: &PoolIndexesParams) -> PoolIndexes {
    if params.current_timestamp <= params.last_update_timestamp {
        return PoolIndexes {
            pool_supply_index: params.last_pool_supply_index,
            pool_borrow_index: params.last_pool_borrow_index,
        };
    }

    let elapsed = params.current_timestamp - params.last_update_timestamp;

    let supply_growth = linear_interest(params.pool_supply_rate_per_year, elapsed);
    let borrow_growth = compounded_interest(params.pool_borrow_rate_per_year, elapsed);

    PoolIndexes {
        pool_supply_index: ray_mul(supply_growth, params.last_pool_supply_index),
        pool_borrow_index: ray_mul(borrow_growth, params.last_pool_borrow_index),
    }
}
