//! Capacity limiter.
//!
//! Computes the maximum amount a user can move with a given operation on a
//! given market, together with the constraint that binds it. Each operation
//! has an ordered list of candidate limits; the smallest wins and ties go to
//! the earliest candidate in the list.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SimError};
use crate::market::{from_usd, market_view, MarketView};
use crate::math::{mul_div_down, percent_div_down, zero_floor_sub, LT_LOWER_BOUND};
use crate::operation::OperationType;
use crate::state::Snapshot;
use crate::user::{user_view, UserMarketView, UserView};

/// Why a capacity is limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CapacityLimitReason {
    /// Limited by the user's wallet balance
    WalletBalance,
    /// The operation is paused on this market
    OperationPaused,
    /// The asset has no price
    ZeroPrice,
    /// Limited by the market's supply or borrow cap
    Cap,
    /// Limited by the user's borrow or liquidation headroom
    BorrowCapacity,
    /// Limited by liquidity available on the pool
    PoolLiquidity,
    /// Limited by the user's position on the market
    Balance,
}

/// A capacity limit with its binding reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityLimit {
    /// Native units of the market's asset (wad for native coin and rewards)
    pub value: U256,
    pub reason: CapacityLimitReason,
}

impl CapacityLimit {
    /// Create a new capacity limit.
    pub fn new(value: U256, reason: CapacityLimitReason) -> Self {
        Self { value, reason }
    }
}

/// Picks the smallest candidate; ties resolve to the earliest one.
///
/// `None` candidates are unbounded and never bind.
fn bind_min(
    candidates: &[(Option<U256>, CapacityLimitReason)],
    market: Address,
    operation: OperationType,
) -> Result<CapacityLimit> {
    let minimum = candidates
        .iter()
        .filter_map(|(value, _)| *value)
        .min()
        .ok_or(SimError::UnresolvedLimiter { market, operation })?;

    candidates
        .iter()
        .find(|(value, _)| *value == Some(minimum))
        .map(|(_, reason)| CapacityLimit::new(minimum, *reason))
        .ok_or(SimError::UnresolvedLimiter { market, operation })
}

/// Collateral (native) that can be withdrawn while keeping the liquidation
/// value above the debt. `None` when nothing constrains it.
pub(crate) fn withdraw_collateral_headroom(
    user: &UserView,
    position: &UserMarketView,
) -> Option<U256> {
    if user.total_borrow_usd.is_zero() || position.risk.collateral_factor.is_zero() {
        return None;
    }
    let headroom_usd = zero_floor_sub(user.liquidation_value, user.total_borrow_usd);
    let collateral_usd = percent_div_down(headroom_usd, position.risk.collateral_factor);
    let unreduced_usd = mul_div_down(
        collateral_usd,
        LT_LOWER_BOUND,
        LT_LOWER_BOUND - U256::from(1u8),
    );
    Some(from_usd(unreduced_usd, position.usd_price))
}

fn market_capacity(
    market: &MarketView,
    user: &UserView,
    position: &UserMarketView,
    operation: OperationType,
) -> Result<CapacityLimit> {
    let address = market.underlying;
    match operation {
        OperationType::Supply | OperationType::SupplyCollateral => bind_min(
            &[
                (Some(position.wallet_balance), CapacityLimitReason::WalletBalance),
                (market.supply_cap_remaining, CapacityLimitReason::Cap),
            ],
            address,
            operation,
        ),
        OperationType::Borrow => {
            let headroom = from_usd(user.borrow_capacity_remaining(), position.usd_price);
            bind_min(
                &[
                    (Some(headroom), CapacityLimitReason::BorrowCapacity),
                    (Some(market.pool_liquidity), CapacityLimitReason::PoolLiquidity),
                    (market.borrow_cap_remaining, CapacityLimitReason::Cap),
                ],
                address,
                operation,
            )
        }
        OperationType::Repay => bind_min(
            &[
                (Some(position.wallet_balance), CapacityLimitReason::WalletBalance),
                (Some(position.total_borrow), CapacityLimitReason::Balance),
            ],
            address,
            operation,
        ),
        OperationType::Withdraw => {
            let cap_headroom = market
                .borrow_cap_remaining
                .map(|remaining| position.supply_on_pool + remaining);
            bind_min(
                &[
                    (Some(market.pool_liquidity), CapacityLimitReason::PoolLiquidity),
                    (cap_headroom, CapacityLimitReason::Cap),
                    (Some(position.total_supply), CapacityLimitReason::Balance),
                ],
                address,
                operation,
            )
        }
        OperationType::WithdrawCollateral => bind_min(
            &[
                (Some(position.collateral), CapacityLimitReason::Balance),
                (
                    withdraw_collateral_headroom(user, position),
                    CapacityLimitReason::BorrowCapacity,
                ),
                (Some(market.pool_liquidity), CapacityLimitReason::PoolLiquidity),
            ],
            address,
            operation,
        ),
        OperationType::ClaimRewards | OperationType::Wrap => {
            Err(SimError::UnresolvedLimiter {
                market: address,
                operation,
            })
        }
    }
}

/// Capacity on an already aged snapshot.
pub(crate) fn max_capacity(
    snapshot: &Snapshot,
    market: &Address,
    operation: OperationType,
) -> Result<Option<CapacityLimit>> {
    // Not guarded by market flags nor prices
    match operation {
        OperationType::ClaimRewards => {
            return Ok(snapshot.user.as_ref().map(|user| {
                CapacityLimit::new(user.claimable_rewards, CapacityLimitReason::Balance)
            }));
        }
        OperationType::Wrap => {
            return Ok(snapshot.user.as_ref().map(|user| {
                CapacityLimit::new(user.native_balance, CapacityLimitReason::WalletBalance)
            }));
        }
        _ => {}
    }

    let (Some(config), Some(_), Some(_), Some(_)) = (
        snapshot.configs.get(market),
        snapshot.markets.get(market),
        snapshot.global.as_ref(),
        snapshot.positions.get(market),
    ) else {
        return Ok(None);
    };

    let market_view = market_view(snapshot, market)?;
    let user = user_view(snapshot)?;
    let position = user
        .market(market)
        .ok_or(SimError::missing("user position"))?;

    let limit = if position.usd_price.is_zero() {
        CapacityLimit::new(U256::ZERO, CapacityLimitReason::ZeroPrice)
    } else if config.pause.is_paused(operation) {
        CapacityLimit::new(U256::ZERO, CapacityLimitReason::OperationPaused)
    } else {
        market_capacity(&market_view, &user, position, operation)?
    };

    debug!(
        %market,
        %operation,
        value = %limit.value,
        reason = ?limit.reason,
        "computed max capacity"
    );

    Ok(Some(limit))
}

/// Maximum amount allowed for `operation` on `market`, and why.
///
/// The snapshot is aged to its global timestamp first. Returns `Ok(None)`
/// when the market, its config, the global context or the user position has
/// never been fetched (the user context for `claimRewards` and `wrap`).
///
/// # Example
///
/// ```rust
/// use morpho_p2p_sim::capacity::get_user_max_capacity;
/// use morpho_p2p_sim::operation::OperationType;
/// use morpho_p2p_sim::state::Snapshot;
/// use alloy_primitives::Address;
///
/// let snapshot = Snapshot::default();
/// let limit = get_user_max_capacity(&snapshot, &Address::ZERO, OperationType::Supply);
/// assert_eq!(limit, Ok(None));
/// ```
pub fn get_user_max_capacity(
    snapshot: &Snapshot,
    market: &Address,
    operation: OperationType,
) -> Result<Option<CapacityLimit>> {
    match snapshot.global.as_ref() {
        Some(global) => max_capacity(&snapshot.accrue(global.timestamp), market, operation),
        None => max_capacity(snapshot, market, operation),
    }
}
