//! User aggregate view.
//!
//! Converts a user's scaled positions into real amounts, USD values, risk
//! metrics (liquidation value, borrow capacity, health factor) and the APYs
//! the user actually experiences given their peer-to-peer / pool split.

use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::market::{compute_market_view, to_usd, usd_price, MarketView};
use crate::math::{
    mul_div_down, percent_mul_down, ratio, ray_mul, usage_ratio, wad_div_down, zero_floor_sub,
    LT_LOWER_BOUND,
};
use crate::state::{GlobalContext, MarketConfig, ScaledMarketState, Snapshot, UserScaledPosition};

/// Risk parameters in force for a market, after the e-mode override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskParams {
    /// Percent
    pub collateral_factor: U256,
    /// Percent
    pub borrowable_factor: U256,
    /// usd8
    pub chain_usd_price: U256,
}

/// Applies the active e-mode category to a market's factors and price.
///
/// The override applies when the market belongs to the category the global
/// context reports as active (non-zero id). The price is only overridden
/// when the category has its own price source with a fetched price.
pub fn effective_risk_params(
    state: &ScaledMarketState,
    config: &MarketConfig,
    global: &GlobalContext,
) -> RiskParams {
    let e_mode = &global.e_mode;
    if e_mode.id == 0 || config.e_mode_category_id != e_mode.id {
        return RiskParams {
            collateral_factor: config.collateral_factor,
            borrowable_factor: config.borrowable_factor,
            chain_usd_price: state.chain_usd_price,
        };
    }

    let chain_usd_price = match e_mode.price {
        Some(price) if !e_mode.price_source.is_zero() => price,
        _ => state.chain_usd_price,
    };

    RiskParams {
        collateral_factor: e_mode.liquidation_threshold,
        borrowable_factor: e_mode.ltv,
        chain_usd_price,
    }
}

/// Reduces a USD value by the liquidation-threshold safety factor
/// `(LT_LOWER_BOUND - 1) / LT_LOWER_BOUND`, then applies `factor` (percent).
pub fn risk_adjusted_value(usd: U256, factor: U256) -> U256 {
    let reduced = mul_div_down(usd, LT_LOWER_BOUND - U256::from(1u8), LT_LOWER_BOUND);
    percent_mul_down(reduced, factor)
}

/// A user's position on one market, in real units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMarketView {
    pub market: Address,
    pub symbol: String,
    pub decimals: u8,

    /// Native
    pub supply_in_p2p: U256,
    pub supply_on_pool: U256,
    pub total_supply: U256,
    pub borrow_in_p2p: U256,
    pub borrow_on_pool: U256,
    pub total_borrow: U256,
    pub collateral: U256,
    pub wallet_balance: U256,

    /// Wad
    pub supply_usd: U256,
    pub borrow_usd: U256,
    pub collateral_usd: U256,
    pub liquidation_value: U256,
    pub borrow_capacity: U256,

    /// Percent
    pub supply_matching_ratio: U256,
    pub borrow_matching_ratio: U256,
    pub experienced_supply_apy: U256,
    pub experienced_borrow_apy: U256,
    pub experienced_collateral_apy: U256,

    /// Wad per native unit, e-mode price applied
    pub usd_price: U256,
    pub risk: RiskParams,
}

/// Aggregate view over every market the user has a position on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub user: Option<Address>,
    pub markets: Vec<UserMarketView>,

    /// Wad
    pub total_supply_usd: U256,
    pub total_borrow_usd: U256,
    pub total_collateral_usd: U256,
    pub liquidation_value: U256,
    pub borrow_capacity: U256,

    /// Wad; `U256::MAX` when the user has no debt
    pub health_factor: U256,
    /// Percent; `U256::MAX` for debt against zero capacity
    pub borrow_capacity_used: U256,
    /// Percent; `U256::MAX` for debt against zero liquidation value
    pub liquidation_value_used: U256,
    /// Signed percent
    pub net_apy: I256,
}

impl UserView {
    /// Position on `market`, if the user has one.
    pub fn market(&self, market: &Address) -> Option<&UserMarketView> {
        self.markets.iter().find(|view| view.market == *market)
    }

    /// Borrow capacity left (wad), floored at zero.
    pub fn borrow_capacity_remaining(&self) -> U256 {
        zero_floor_sub(self.borrow_capacity, self.total_borrow_usd)
    }
}

fn weighted_apy(first: U256, first_apy: U256, second: U256, second_apy: U256) -> U256 {
    let total = first + second;
    if total.is_zero() {
        return second_apy;
    }
    (first * first_apy + second * second_apy) / total
}

/// Derives a user's view of one market.
pub fn compute_user_market_view(
    position: &UserScaledPosition,
    market: &MarketView,
    risk: RiskParams,
) -> UserMarketView {
    let supply_in_p2p = ray_mul(position.scaled_supply_in_p2p, market.p2p_supply_index);
    let supply_on_pool = ray_mul(position.scaled_supply_on_pool, market.pool_supply_index);
    let borrow_in_p2p = ray_mul(position.scaled_borrow_in_p2p, market.p2p_borrow_index);
    let borrow_on_pool = ray_mul(position.scaled_borrow_on_pool, market.pool_borrow_index);
    let collateral = ray_mul(position.scaled_collateral, market.pool_supply_index);

    let total_supply = supply_in_p2p + supply_on_pool;
    let total_borrow = borrow_in_p2p + borrow_on_pool;

    let price = usd_price(risk.chain_usd_price, market.decimals);
    let collateral_usd = to_usd(collateral, price);

    UserMarketView {
        market: market.underlying,
        symbol: market.symbol.clone(),
        decimals: market.decimals,
        supply_in_p2p,
        supply_on_pool,
        total_supply,
        borrow_in_p2p,
        borrow_on_pool,
        total_borrow,
        collateral,
        wallet_balance: position.wallet_balance,
        supply_usd: to_usd(total_supply, price),
        borrow_usd: to_usd(total_borrow, price),
        collateral_usd,
        liquidation_value: risk_adjusted_value(collateral_usd, risk.collateral_factor),
        borrow_capacity: risk_adjusted_value(collateral_usd, risk.borrowable_factor),
        supply_matching_ratio: ratio(supply_in_p2p, total_supply),
        borrow_matching_ratio: ratio(borrow_in_p2p, total_borrow),
        experienced_supply_apy: weighted_apy(
            supply_in_p2p,
            market.p2p_supply_apy,
            supply_on_pool,
            market.pool_supply_apy,
        ),
        experienced_borrow_apy: weighted_apy(
            borrow_in_p2p,
            market.p2p_borrow_apy,
            borrow_on_pool,
            market.pool_borrow_apy,
        ),
        experienced_collateral_apy: market.pool_supply_apy,
        usd_price: price,
        risk,
    }
}

fn to_signed(value: U256) -> I256 {
    I256::try_from(value).unwrap_or(I256::MAX)
}

/// Signed net APY (percent) of a set of positions.
///
/// Normalised by `supply + collateral - borrow`, or by `supply + collateral`
/// when that difference is exactly zero. Zero when both normalisers are zero.
pub fn compute_net_apy(markets: &[UserMarketView]) -> I256 {
    let mut weighted = I256::ZERO;
    let mut supply = U256::ZERO;
    let mut collateral = U256::ZERO;
    let mut borrow = U256::ZERO;

    for view in markets {
        weighted += to_signed(view.supply_usd * view.experienced_supply_apy);
        weighted += to_signed(view.collateral_usd * view.experienced_collateral_apy);
        weighted -= to_signed(view.borrow_usd * view.experienced_borrow_apy);
        supply += view.supply_usd;
        collateral += view.collateral_usd;
        borrow += view.borrow_usd;
    }

    let assets = to_signed(supply + collateral);
    let mut normaliser = assets - to_signed(borrow);
    if normaliser.is_zero() {
        normaliser = assets;
    }
    if normaliser.is_zero() {
        return I256::ZERO;
    }
    weighted / normaliser
}

/// Aggregates per-market views into a user view.
pub fn aggregate_user_view(user: Option<Address>, markets: Vec<UserMarketView>) -> UserView {
    let mut total_supply_usd = U256::ZERO;
    let mut total_borrow_usd = U256::ZERO;
    let mut total_collateral_usd = U256::ZERO;
    let mut liquidation_value = U256::ZERO;
    let mut borrow_capacity = U256::ZERO;

    for view in &markets {
        total_supply_usd += view.supply_usd;
        total_borrow_usd += view.borrow_usd;
        total_collateral_usd += view.collateral_usd;
        liquidation_value += view.liquidation_value;
        borrow_capacity += view.borrow_capacity;
    }

    let health_factor = if total_borrow_usd.is_zero() {
        U256::MAX
    } else {
        wad_div_down(liquidation_value, total_borrow_usd)
    };

    let net_apy = compute_net_apy(&markets);

    UserView {
        user,
        total_supply_usd,
        total_borrow_usd,
        total_collateral_usd,
        liquidation_value,
        borrow_capacity,
        health_factor,
        borrow_capacity_used: usage_ratio(total_borrow_usd, borrow_capacity),
        liquidation_value_used: usage_ratio(total_borrow_usd, liquidation_value),
        net_apy,
        markets,
    }
}

/// Per-market user views of an already aged snapshot.
pub(crate) fn user_market_views(snapshot: &Snapshot) -> Result<Vec<UserMarketView>> {
    let global = snapshot
        .global
        .as_ref()
        .ok_or(SimError::missing("global context"))?;

    snapshot
        .positions
        .values()
        .map(|position| {
            let state = snapshot
                .markets
                .get(&position.market)
                .ok_or(SimError::UnknownMarket {
                    market: position.market,
                })?;
            let config = snapshot
                .configs
                .get(&position.market)
                .ok_or(SimError::MissingConfig {
                    market: position.market,
                })?;
            let market = compute_market_view(state, config);
            let risk = effective_risk_params(state, config, global);
            Ok(compute_user_market_view(position, &market, risk))
        })
        .collect()
}

/// User view of an already aged snapshot.
pub(crate) fn user_view(snapshot: &Snapshot) -> Result<UserView> {
    let markets = user_market_views(snapshot)?;
    Ok(aggregate_user_view(
        snapshot.user.as_ref().map(|user| user.address),
        markets,
    ))
}

/// Computes the user view, aged to the snapshot's timestamp.
///
/// Returns [`SimError::MissingData`] when the global context was never
/// fetched, and [`SimError::UnknownMarket`] for a position on a market the
/// snapshot does not hold.
pub fn compute_user_view(snapshot: &Snapshot) -> Result<UserView> {
    let global = snapshot
        .global
        .as_ref()
        .ok_or(SimError::missing("global context"))?;
    user_view(&snapshot.accrue(global.timestamp))
}

/// Per-market user views of the markets the user has a position in, aged to
/// the snapshot's timestamp.
///
/// Wallet-only rows are left out; they still feed [`compute_user_view`].
pub fn get_user_markets_data(snapshot: &Snapshot) -> Result<Vec<UserMarketView>> {
    let global = snapshot
        .global
        .as_ref()
        .ok_or(SimError::missing("global context"))?;
    let aged = snapshot.accrue(global.timestamp);
    let markets = user_market_views(&aged)?;
    Ok(markets
        .into_iter()
        .filter(|view| {
            aged.positions
                .get(&view.market)
                .is_some_and(UserScaledPosition::has_position)
        })
        .collect())
}
