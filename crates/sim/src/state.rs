//! Snapshot data model.
//!
//! Balances are stored *scaled*: a real amount is recovered by multiplying
//! by the matching index (pool or peer-to-peer). Every numeric field names
//! its base in its doc: **ray** (1e27), **wad** (1e18), **percent** (1e4 =
//! 100%), **native** (asset decimals) or **usd8** (8-decimal oracle price).
//!
//! Data that was never fetched is `None` or absent from the maps, which is
//! distinct from data fetched as zero.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::math::RAY;
use crate::operation::OperationType;
use crate::p2p_index::accrue_market;

/// Unmatched amount and peer-to-peer total for one side of a market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSideDelta {
    /// Unmatched peer-to-peer principal resting on the pool (pool-index scaled)
    pub scaled_delta: U256,
    /// Aggregate peer-to-peer principal (p2p-index scaled)
    pub scaled_p2p_total: U256,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDeltas {
    pub supply: MarketSideDelta,
    pub borrow: MarketSideDelta,
}

/// Pool and peer-to-peer index for one side (ray).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideIndexes {
    pub pool_index: U256,
    pub p2p_index: U256,
}

impl Default for SideIndexes {
    fn default() -> Self {
        Self {
            pool_index: RAY,
            p2p_index: RAY,
        }
    }
}

/// Indexes stored by the protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketIndexes {
    pub supply: SideIndexes,
    pub borrow: SideIndexes,
    pub last_update_timestamp: u64,
}

/// The underlying pool's own reserve accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserveState {
    /// Pool supply index (ray)
    pub liquidity_index: U256,
    /// Pool variable borrow index (ray)
    pub variable_borrow_index: U256,
    /// Pool supply rate (ray per year)
    pub liquidity_rate: U256,
    /// Pool variable borrow rate (ray per year)
    pub variable_borrow_rate: U256,
    pub last_update_timestamp: u64,
}

impl Default for PoolReserveState {
    fn default() -> Self {
        Self {
            liquidity_index: RAY,
            variable_borrow_index: RAY,
            liquidity_rate: U256::ZERO,
            variable_borrow_rate: U256::ZERO,
            last_update_timestamp: 0,
        }
    }
}

/// Per-market protocol state in scaled units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaledMarketState {
    pub underlying: Address,
    /// Pool-wide scaled supply
    pub scaled_pool_supply: U256,
    /// Pool-wide scaled variable debt
    pub scaled_pool_borrow: U256,
    pub scaled_morpho_supply_on_pool: U256,
    pub scaled_morpho_borrow_on_pool: U256,
    pub scaled_morpho_collateral: U256,
    pub deltas: MarketDeltas,
    /// Supply not matched nor deposited on the pool (native)
    pub idle_supply: U256,
    pub indexes: MarketIndexes,
    pub pool_reserve: PoolReserveState,
    /// Liquidity available to borrow or withdraw from the pool (native)
    pub pool_liquidity: U256,
    /// Oracle price of the underlying (usd8)
    pub chain_usd_price: U256,
}

impl ScaledMarketState {
    /// Creates an empty market with unit indexes at `timestamp`.
    pub fn new(underlying: Address, timestamp: u64) -> Self {
        Self {
            underlying,
            indexes: MarketIndexes {
                last_update_timestamp: timestamp,
                ..Default::default()
            },
            pool_reserve: PoolReserveState {
                last_update_timestamp: timestamp,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Pause flags of a market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PauseStatuses {
    pub is_supply_paused: bool,
    pub is_supply_collateral_paused: bool,
    pub is_borrow_paused: bool,
    pub is_repay_paused: bool,
    pub is_withdraw_paused: bool,
    pub is_withdraw_collateral_paused: bool,
    pub is_liquidate_collateral_paused: bool,
    pub is_liquidate_borrow_paused: bool,
    pub is_p2p_disabled: bool,
    pub is_deprecated: bool,
}

impl PauseStatuses {
    /// Whether the flag guarding `operation` is set.
    ///
    /// `claimRewards` and `wrap` are not guarded by market flags.
    pub fn is_paused(&self, operation: OperationType) -> bool {
        match operation {
            OperationType::Supply => self.is_supply_paused,
            OperationType::SupplyCollateral => self.is_supply_collateral_paused,
            OperationType::Borrow => self.is_borrow_paused,
            OperationType::Repay => self.is_repay_paused,
            OperationType::Withdraw => self.is_withdraw_paused,
            OperationType::WithdrawCollateral => self.is_withdraw_collateral_paused,
            OperationType::ClaimRewards | OperationType::Wrap => false,
        }
    }
}

/// Static per-market configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub underlying: Address,
    pub symbol: String,
    pub decimals: u8,
    /// Liquidation threshold (percent)
    pub collateral_factor: U256,
    /// Loan-to-value (percent)
    pub borrowable_factor: U256,
    /// Share of the p2p spread kept by the protocol (percent)
    pub p2p_reserve_factor: U256,
    /// Position of the p2p mid rate between pool rates (percent)
    pub p2p_index_cursor: U256,
    /// Native; zero means uncapped
    pub supply_cap: U256,
    /// Native; zero means uncapped
    pub borrow_cap: U256,
    #[serde(default)]
    pub pause: PauseStatuses,
    pub e_mode_category_id: u8,
    /// The underlying is the wrapped chain coin
    #[serde(default)]
    pub wrapped_native: bool,
}

/// One user's position on one market.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserScaledPosition {
    pub market: Address,
    /// Pool-index scaled
    pub scaled_collateral: U256,
    /// P2P-index scaled
    pub scaled_supply_in_p2p: U256,
    /// Pool-index scaled
    pub scaled_supply_on_pool: U256,
    /// P2P-index scaled
    pub scaled_borrow_in_p2p: U256,
    /// Pool-index scaled
    pub scaled_borrow_on_pool: U256,
    /// Native
    pub wallet_balance: U256,
    pub nonce: U256,
    /// Native
    pub approval: U256,
    /// Native
    pub permit2_approval: U256,
}

impl UserScaledPosition {
    /// A position holding nothing on `market`.
    pub fn empty(market: Address) -> Self {
        Self {
            market,
            ..Default::default()
        }
    }

    /// Whether the user holds anything on the protocol for this market.
    pub fn has_position(&self) -> bool {
        !(self.scaled_collateral.is_zero()
            && self.scaled_supply_in_p2p.is_zero()
            && self.scaled_supply_on_pool.is_zero()
            && self.scaled_borrow_in_p2p.is_zero()
            && self.scaled_borrow_on_pool.is_zero())
    }
}

/// Efficiency-mode category of the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EModeCategory {
    /// Zero means no category
    pub id: u8,
    /// Overrides the borrowable factor (percent)
    pub ltv: U256,
    /// Overrides the collateral factor (percent)
    pub liquidation_threshold: U256,
    /// Oracle overriding market prices; zero address means none
    pub price_source: Address,
    /// Price of `price_source` (usd8)
    pub price: Option<U256>,
}

/// Gas price fields (wei).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeData {
    pub gas_price: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

/// Chain-level context shared by every market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalContext {
    pub block: u64,
    pub timestamp: u64,
    /// usd8
    pub eth_usd_price: U256,
    #[serde(default)]
    pub e_mode: EModeCategory,
    #[serde(default)]
    pub fee_data: FeeData,
}

/// Per-user data not tied to a market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub address: Address,
    /// Native chain coin (wad)
    pub native_balance: U256,
    /// Pending rewards (wad)
    pub claimable_rewards: U256,
    /// Claimed rewards held in the wallet (wad)
    pub rewards_balance: U256,
}

/// Everything the models need, keyed by underlying address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub global: Option<GlobalContext>,
    pub user: Option<UserContext>,
    #[serde(default)]
    pub markets: BTreeMap<Address, ScaledMarketState>,
    #[serde(default)]
    pub configs: BTreeMap<Address, MarketConfig>,
    #[serde(default)]
    pub positions: BTreeMap<Address, UserScaledPosition>,
}

impl Snapshot {
    /// Adds a market with its config, replacing any previous entry.
    pub fn with_market(mut self, state: ScaledMarketState, config: MarketConfig) -> Self {
        self.configs.insert(state.underlying, config);
        self.markets.insert(state.underlying, state);
        self
    }

    /// Adds a user position, replacing any previous entry.
    pub fn with_position(mut self, position: UserScaledPosition) -> Self {
        self.positions.insert(position.market, position);
        self
    }

    /// Set the global context.
    pub fn with_global(mut self, global: GlobalContext) -> Self {
        self.global = Some(global);
        self
    }

    /// Set the user context.
    pub fn with_user(mut self, user: UserContext) -> Self {
        self.user = Some(user);
        self
    }

    /// Market addresses that have both a state and a config.
    pub fn market_addresses(&self) -> impl Iterator<Item = &Address> {
        self.markets
            .keys()
            .filter(|address| self.configs.contains_key(*address))
    }

    /// Returns a successor snapshot whose markets are aged to `timestamp`.
    ///
    /// Markets without a config are carried over unchanged.
    pub fn accrue(&self, timestamp: u64) -> Snapshot {
        let markets = self
            .markets
            .iter()
            .map(|(address, state)| {
                let aged = match self.configs.get(address) {
                    Some(config) => accrue_market(state, config, timestamp),
                    None => state.clone(),
                };
                (*address, aged)
            })
            .collect();

        debug!(
            timestamp,
            markets = self.markets.len(),
            "accrued snapshot"
        );

        Snapshot {
            markets,
            ..self.clone()
        }
    }
}
