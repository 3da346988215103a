//! Transaction-sequence simulator.
//!
//! Folds a list of hypothetical [`Operation`]s over a [`Snapshot`], producing
//! one derived state per applied step. Every step consumes an immutable
//! snapshot and produces a successor; nothing is mutated in place.
//!
//! Errors come in two classes (see [`SimulationErrorKind::is_blocking`]):
//! blocking errors end the fold without a final state, non-blocking ones are
//! recorded while the fold continues so the caller can still show the
//! hypothetical end state. Only the first error of a fold is kept.
//!
//! # Example
//!
//! ```rust
//! use morpho_p2p_sim::simulator::simulate;
//! use morpho_p2p_sim::state::{GlobalContext, Snapshot};
//!
//! let snapshot = Snapshot::default().with_global(GlobalContext::default());
//! let outcome = simulate(&snapshot, &[]);
//! assert!(outcome.error.is_none());
//! assert!(outcome.final_state.is_some());
//! ```

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capacity::{max_capacity, withdraw_collateral_headroom};
use crate::error::SimError;
use crate::market::{from_usd, market_views, usd_price, MarketView};
use crate::math::{min, ray_div, ray_mul, zero_floor_sub, WAD};
use crate::operation::{Operation, OperationType};
use crate::state::{MarketConfig, ScaledMarketState, Snapshot, UserContext, UserScaledPosition};
use crate::user::{effective_risk_params, user_view, UserView};

/// Health factor (wad) under which a simulated end state is flagged.
pub const HEALTH_FACTOR_THRESHOLD: U256 = WAD;

/// Kinds of simulation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
pub enum SimulationErrorKind {
    #[error("unknown market")]
    UnknownMarket,
    #[error("missing data")]
    MissingData,
    #[error("operation disabled")]
    OperationDisabled,
    #[error("operation paused")]
    OperationPaused,
    #[error("insufficient wallet balance")]
    InsufficientWalletBalance,
    #[error("insufficient pool liquidity")]
    InsufficientLiquidity,
    #[error("supply cap reached")]
    SupplyCapReached,
    #[error("borrow cap reached")]
    BorrowCapReached,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("collateral capacity reached")]
    CollateralCapacityReached,
}

impl SimulationErrorKind {
    /// Whether the error ends the fold.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            SimulationErrorKind::UnknownMarket
                | SimulationErrorKind::MissingData
                | SimulationErrorKind::OperationDisabled
                | SimulationErrorKind::OperationPaused
        )
    }
}

impl From<&SimError> for SimulationErrorKind {
    fn from(error: &SimError) -> Self {
        match error {
            SimError::UnknownMarket { .. } => SimulationErrorKind::UnknownMarket,
            _ => SimulationErrorKind::MissingData,
        }
    }
}

/// An error recorded while folding, with the index of the offending operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind} at operation {index}")]
pub struct SimulationError {
    pub index: usize,
    pub kind: SimulationErrorKind,
    /// `None` when the error is not tied to an operation
    pub operation: Option<Operation>,
}

/// A snapshot together with the views derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedState {
    pub snapshot: Snapshot,
    pub markets: Vec<MarketView>,
    pub user: UserView,
}

impl SimulatedState {
    /// Derives views of an already aged snapshot.
    pub fn derive(snapshot: Snapshot) -> Result<Self, SimError> {
        let markets = market_views(&snapshot);
        let user = user_view(&snapshot)?;
        Ok(Self {
            snapshot,
            markets,
            user,
        })
    }

    /// Market view of `market`, if known.
    pub fn market(&self, market: &Address) -> Option<&MarketView> {
        self.markets.iter().find(|view| view.underlying == *market)
    }
}

/// Result of a fold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// State after each applied operation
    pub steps: Vec<SimulatedState>,
    /// State after the whole list; `None` after a blocking error
    pub final_state: Option<SimulatedState>,
    /// First recorded error
    pub error: Option<SimulationError>,
}

impl SimulationOutcome {
    fn record(&mut self, index: usize, kind: SimulationErrorKind, operation: Option<Operation>) {
        if self.error.is_some() {
            return;
        }
        debug!(index, %kind, blocking = kind.is_blocking(), "recorded simulation error");
        self.error = Some(SimulationError {
            index,
            kind,
            operation,
        });
    }

    /// Whether the fold was aborted.
    pub fn is_aborted(&self) -> bool {
        self.final_state.is_none()
    }
}

/// Simulates `operations` against `snapshot` with the default health factor
/// threshold.
pub fn simulate(snapshot: &Snapshot, operations: &[Operation]) -> SimulationOutcome {
    simulate_with_threshold(snapshot, operations, HEALTH_FACTOR_THRESHOLD)
}

/// Simulates `operations` against `snapshot`.
///
/// The snapshot is first aged to its global timestamp. After the fold, an end
/// state whose health factor is under `health_factor_threshold` is flagged as
/// [`SimulationErrorKind::CollateralCapacityReached`] on the last operation.
pub fn simulate_with_threshold(
    snapshot: &Snapshot,
    operations: &[Operation],
    health_factor_threshold: U256,
) -> SimulationOutcome {
    let mut outcome = SimulationOutcome::default();

    let Some(global) = snapshot.global.as_ref() else {
        outcome.record(0, SimulationErrorKind::MissingData, operations.first().copied());
        return outcome;
    };

    let mut current = match SimulatedState::derive(snapshot.accrue(global.timestamp)) {
        Ok(state) => state,
        Err(error) => {
            outcome.record(0, (&error).into(), operations.first().copied());
            return outcome;
        }
    };

    for (index, operation) in operations.iter().enumerate() {
        let transition = match apply_operation(&current, operation) {
            Ok(transition) => transition,
            Err(kind) => {
                outcome.record(index, kind, Some(*operation));
                return outcome;
            }
        };

        debug!(
            index,
            kind = %operation.kind,
            market = %operation.market,
            amount = %transition.amount,
            "applied operation"
        );

        for kind in transition.issues {
            outcome.record(index, kind, Some(*operation));
        }

        current = match SimulatedState::derive(transition.snapshot) {
            Ok(state) => state,
            Err(error) => {
                outcome.record(index, (&error).into(), Some(*operation));
                return outcome;
            }
        };
        outcome.steps.push(current.clone());
    }

    if let Some(last) = operations.len().checked_sub(1) {
        if current.user.health_factor < health_factor_threshold {
            outcome.record(
                last,
                SimulationErrorKind::CollateralCapacityReached,
                operations.last().copied(),
            );
        }
    }

    outcome.final_state = Some(current);
    outcome
}

/// Successor snapshot of one operation plus its non-blocking issues.
struct Transition {
    snapshot: Snapshot,
    amount: U256,
    issues: Vec<SimulationErrorKind>,
}

type StepResult = std::result::Result<Transition, SimulationErrorKind>;

/// Resolves the "use all available" sentinel through the capacity limiter.
fn resolve_amount(snapshot: &Snapshot, operation: &Operation) -> Result<U256, SimulationErrorKind> {
    if !operation.is_max() {
        return Ok(operation.amount);
    }
    match max_capacity(snapshot, &operation.market, operation.kind) {
        Ok(Some(limit)) => Ok(limit.value),
        Ok(None) => Err(SimulationErrorKind::MissingData),
        Err(error) => Err((&error).into()),
    }
}

fn apply_operation(state: &SimulatedState, operation: &Operation) -> StepResult {
    let snapshot = &state.snapshot;

    match operation.kind {
        OperationType::ClaimRewards => return claim_rewards(snapshot, operation),
        OperationType::Wrap => return wrap(snapshot, operation),
        _ => {}
    }

    let (Some(market), Some(config)) = (
        snapshot.markets.get(&operation.market),
        snapshot.configs.get(&operation.market),
    ) else {
        return Err(SimulationErrorKind::UnknownMarket);
    };
    let global = snapshot.global.as_ref().ok_or(SimulationErrorKind::MissingData)?;

    let amount = resolve_amount(snapshot, operation)?;

    let opens_exposure = matches!(
        operation.kind,
        OperationType::Supply | OperationType::SupplyCollateral | OperationType::Borrow
    );
    if config.pause.is_deprecated && opens_exposure {
        return Err(SimulationErrorKind::OperationDisabled);
    }
    if config.pause.is_paused(operation.kind) {
        return Err(SimulationErrorKind::OperationPaused);
    }
    if operation.unwrap {
        if !operation.kind.supports_unwrap() || !config.wrapped_native {
            return Err(SimulationErrorKind::OperationDisabled);
        }
        if snapshot.user.is_none() {
            return Err(SimulationErrorKind::MissingData);
        }
    }

    let mut step = Step::new(snapshot, market, config, operation.unwrap);
    match operation.kind {
        OperationType::Supply => step.supply(amount),
        OperationType::SupplyCollateral => step.supply_collateral(amount),
        OperationType::Borrow => {
            let risk = effective_risk_params(market, config, global);
            let price = usd_price(risk.chain_usd_price, config.decimals);
            let headroom = from_usd(state.user.borrow_capacity_remaining(), price);
            step.borrow(amount, headroom)
        }
        OperationType::Repay => step.repay(amount),
        OperationType::Withdraw => step.withdraw(amount),
        OperationType::WithdrawCollateral => {
            let headroom = state
                .user
                .market(&operation.market)
                .and_then(|position| withdraw_collateral_headroom(&state.user, position));
            step.withdraw_collateral(amount, headroom)
        }
        OperationType::ClaimRewards | OperationType::Wrap => {}
    }

    Ok(step.finish(snapshot))
}

fn claim_rewards(snapshot: &Snapshot, operation: &Operation) -> StepResult {
    let mut user = snapshot.user.ok_or(SimulationErrorKind::MissingData)?;
    let mut issues = Vec::new();

    let mut amount = resolve_amount(snapshot, operation)?;
    if amount > user.claimable_rewards {
        issues.push(SimulationErrorKind::InsufficientBalance);
        amount = user.claimable_rewards;
    }
    user.claimable_rewards -= amount;
    user.rewards_balance += amount;

    Ok(Transition {
        snapshot: Snapshot {
            user: Some(user),
            ..snapshot.clone()
        },
        amount,
        issues,
    })
}

fn wrap(snapshot: &Snapshot, operation: &Operation) -> StepResult {
    let config = snapshot
        .configs
        .get(&operation.market)
        .ok_or(SimulationErrorKind::UnknownMarket)?;
    if !snapshot.markets.contains_key(&operation.market) {
        return Err(SimulationErrorKind::UnknownMarket);
    }
    if !config.wrapped_native {
        return Err(SimulationErrorKind::OperationDisabled);
    }
    let mut user = snapshot.user.ok_or(SimulationErrorKind::MissingData)?;
    let mut issues = Vec::new();

    let amount = resolve_amount(snapshot, operation)?;
    if amount > user.native_balance {
        issues.push(SimulationErrorKind::InsufficientWalletBalance);
    }
    user.native_balance = zero_floor_sub(user.native_balance, amount);

    let mut position = snapshot
        .positions
        .get(&operation.market)
        .cloned()
        .unwrap_or_else(|| UserScaledPosition::empty(operation.market));
    position.wallet_balance += amount;

    let mut successor = snapshot.clone();
    successor.user = Some(user);
    successor.positions.insert(operation.market, position);

    Ok(Transition {
        snapshot: successor,
        amount,
        issues,
    })
}

/// Removes `amount` (real) from a scaled balance.
///
/// Returns the new scaled balance and the scaled amount removed. Removing at
/// least the whole balance clears it exactly.
fn remove_scaled(scaled: U256, amount: U256, index: U256) -> (U256, U256) {
    if amount >= ray_mul(scaled, index) {
        return (U256::ZERO, scaled);
    }
    let removed = min(ray_div(amount, index), scaled);
    (scaled - removed, removed)
}

/// Working copy of the market, position and user touched by one operation.
struct Step<'a> {
    config: &'a MarketConfig,
    market: ScaledMarketState,
    position: UserScaledPosition,
    user: Option<UserContext>,
    unwrap: bool,
    amount: U256,
    issues: Vec<SimulationErrorKind>,
}

impl<'a> Step<'a> {
    fn new(
        snapshot: &Snapshot,
        market: &ScaledMarketState,
        config: &'a MarketConfig,
        unwrap: bool,
    ) -> Self {
        let position = snapshot
            .positions
            .get(&market.underlying)
            .cloned()
            .unwrap_or_else(|| UserScaledPosition::empty(market.underlying));
        Self {
            config,
            market: market.clone(),
            position,
            user: snapshot.user,
            unwrap,
            amount: U256::ZERO,
            issues: Vec::new(),
        }
    }

    fn finish(self, snapshot: &Snapshot) -> Transition {
        let mut successor = snapshot.clone();
        successor.user = self.user;
        successor
            .positions
            .insert(self.position.market, self.position);
        successor
            .markets
            .insert(self.market.underlying, self.market);
        Transition {
            snapshot: successor,
            amount: self.amount,
            issues: self.issues,
        }
    }

    fn issue(&mut self, kind: SimulationErrorKind) {
        self.issues.push(kind);
    }

    /// Amount that can be matched peer-to-peer against `counterpart`.
    fn matchable(&self, amount: U256, counterpart: U256) -> U256 {
        if self.config.pause.is_p2p_disabled {
            U256::ZERO
        } else {
            min(amount, counterpart)
        }
    }

    fn debit_wallet(&mut self, amount: U256) {
        if amount > self.position.wallet_balance {
            self.issue(SimulationErrorKind::InsufficientWalletBalance);
        }
        self.position.wallet_balance = zero_floor_sub(self.position.wallet_balance, amount);
    }

    fn pay_out(&mut self, amount: U256) {
        match self.user.as_mut() {
            Some(user) if self.unwrap => user.native_balance += amount,
            _ => self.position.wallet_balance += amount,
        }
    }

    /// Clamps `amount` to `balance`, recording an issue when it exceeds it.
    fn clamp_to_balance(&mut self, amount: U256, balance: U256) -> U256 {
        if amount > balance {
            self.issue(SimulationErrorKind::InsufficientBalance);
            return balance;
        }
        amount
    }

    fn check_liquidity(&mut self, amount: U256) {
        if amount > self.market.pool_liquidity {
            self.issue(SimulationErrorKind::InsufficientLiquidity);
        }
    }

    fn check_supply_cap(&mut self, amount: U256) {
        let cap = self.config.supply_cap;
        let total = ray_mul(
            self.market.scaled_pool_supply,
            self.market.indexes.supply.pool_index,
        );
        if !cap.is_zero() && total + amount > cap {
            self.issue(SimulationErrorKind::SupplyCapReached);
        }
    }

    fn check_borrow_cap(&mut self, amount: U256) {
        let cap = self.config.borrow_cap;
        let total = ray_mul(
            self.market.scaled_pool_borrow,
            self.market.indexes.borrow.pool_index,
        );
        if !cap.is_zero() && total + amount > cap {
            self.issue(SimulationErrorKind::BorrowCapReached);
        }
    }

    fn add_supply_on_pool(&mut self, amount: U256) -> U256 {
        let scaled = ray_div(amount, self.market.indexes.supply.pool_index);
        self.market.scaled_morpho_supply_on_pool += scaled;
        self.market.scaled_pool_supply += scaled;
        scaled
    }

    fn remove_supply_on_pool(&mut self, amount: U256) {
        let (rest, removed) = remove_scaled(
            self.market.scaled_morpho_supply_on_pool,
            amount,
            self.market.indexes.supply.pool_index,
        );
        self.market.scaled_morpho_supply_on_pool = rest;
        self.market.scaled_pool_supply = zero_floor_sub(self.market.scaled_pool_supply, removed);
    }

    fn add_borrow_on_pool(&mut self, amount: U256) -> U256 {
        let scaled = ray_div(amount, self.market.indexes.borrow.pool_index);
        self.market.scaled_morpho_borrow_on_pool += scaled;
        self.market.scaled_pool_borrow += scaled;
        scaled
    }

    fn remove_borrow_on_pool(&mut self, amount: U256) {
        let (rest, removed) = remove_scaled(
            self.market.scaled_morpho_borrow_on_pool,
            amount,
            self.market.indexes.borrow.pool_index,
        );
        self.market.scaled_morpho_borrow_on_pool = rest;
        self.market.scaled_pool_borrow = zero_floor_sub(self.market.scaled_pool_borrow, removed);
    }

    /// Grows both peer-to-peer totals by a matched amount.
    fn add_p2p(&mut self, amount: U256) {
        let indexes = self.market.indexes;
        self.market.deltas.supply.scaled_p2p_total += ray_div(amount, indexes.supply.p2p_index);
        self.market.deltas.borrow.scaled_p2p_total += ray_div(amount, indexes.borrow.p2p_index);
    }

    fn morpho_supply_on_pool(&self) -> U256 {
        ray_mul(
            self.market.scaled_morpho_supply_on_pool,
            self.market.indexes.supply.pool_index,
        )
    }

    fn morpho_borrow_on_pool(&self) -> U256 {
        ray_mul(
            self.market.scaled_morpho_borrow_on_pool,
            self.market.indexes.borrow.pool_index,
        )
    }

    fn supply(&mut self, amount: U256) {
        self.amount = amount;
        self.debit_wallet(amount);
        self.check_supply_cap(amount);

        let matched = self.matchable(amount, self.morpho_borrow_on_pool());
        if !matched.is_zero() {
            // promote pool borrowers
            self.remove_borrow_on_pool(matched);
            self.add_p2p(matched);
            self.position.scaled_supply_in_p2p +=
                ray_div(matched, self.market.indexes.supply.p2p_index);
        }

        let scaled = self.add_supply_on_pool(amount - matched);
        self.position.scaled_supply_on_pool += scaled;
        self.market.pool_liquidity += amount;
    }

    fn supply_collateral(&mut self, amount: U256) {
        self.amount = amount;
        self.debit_wallet(amount);
        self.check_supply_cap(amount);

        let scaled = ray_div(amount, self.market.indexes.supply.pool_index);
        self.market.scaled_morpho_collateral += scaled;
        self.market.scaled_pool_supply += scaled;
        self.position.scaled_collateral += scaled;
        self.market.pool_liquidity += amount;
    }

    fn borrow(&mut self, amount: U256, headroom: U256) {
        self.amount = amount;
        if amount > headroom {
            self.issue(SimulationErrorKind::CollateralCapacityReached);
        }
        self.check_liquidity(amount);
        self.check_borrow_cap(amount);

        let matched = self.matchable(amount, self.morpho_supply_on_pool());
        if !matched.is_zero() {
            // promote pool suppliers
            self.remove_supply_on_pool(matched);
            self.add_p2p(matched);
            self.position.scaled_borrow_in_p2p +=
                ray_div(matched, self.market.indexes.borrow.p2p_index);
        }

        let scaled = self.add_borrow_on_pool(amount - matched);
        self.position.scaled_borrow_on_pool += scaled;
        self.market.pool_liquidity = zero_floor_sub(self.market.pool_liquidity, amount);
        self.pay_out(amount);
    }

    fn repay(&mut self, amount: U256) {
        let indexes = self.market.indexes;

        let on_pool = ray_mul(self.position.scaled_borrow_on_pool, indexes.borrow.pool_index);
        let in_p2p = ray_mul(self.position.scaled_borrow_in_p2p, indexes.borrow.p2p_index);
        let amount = self.clamp_to_balance(amount, on_pool + in_p2p);
        self.amount = amount;
        self.debit_wallet(amount);

        let from_pool = min(amount, on_pool);
        if !from_pool.is_zero() {
            let (rest, removed) = remove_scaled(
                self.position.scaled_borrow_on_pool,
                from_pool,
                indexes.borrow.pool_index,
            );
            self.position.scaled_borrow_on_pool = rest;
            self.market.scaled_morpho_borrow_on_pool =
                zero_floor_sub(self.market.scaled_morpho_borrow_on_pool, removed);
            self.market.scaled_pool_borrow = zero_floor_sub(self.market.scaled_pool_borrow, removed);
        }

        let from_p2p = amount - from_pool;
        if !from_p2p.is_zero() {
            let (rest, _) = remove_scaled(
                self.position.scaled_borrow_in_p2p,
                from_p2p,
                indexes.borrow.p2p_index,
            );
            self.position.scaled_borrow_in_p2p = rest;

            // the freed suppliers are matched with pool borrowers first
            let promoted = self.matchable(from_p2p, self.morpho_borrow_on_pool());
            if !promoted.is_zero() {
                self.remove_borrow_on_pool(promoted);
            }

            // the rest of them go back to the pool
            let demoted = from_p2p - promoted;
            if !demoted.is_zero() {
                let deltas = &mut self.market.deltas;
                deltas.borrow.scaled_p2p_total = zero_floor_sub(
                    deltas.borrow.scaled_p2p_total,
                    ray_div(demoted, indexes.borrow.p2p_index),
                );
                deltas.supply.scaled_p2p_total = zero_floor_sub(
                    deltas.supply.scaled_p2p_total,
                    ray_div(demoted, indexes.supply.p2p_index),
                );
                self.add_supply_on_pool(demoted);
            }
        }

        self.market.pool_liquidity += amount;
    }

    fn withdraw(&mut self, amount: U256) {
        let indexes = self.market.indexes;

        let on_pool = ray_mul(self.position.scaled_supply_on_pool, indexes.supply.pool_index);
        let in_p2p = ray_mul(self.position.scaled_supply_in_p2p, indexes.supply.p2p_index);
        let amount = self.clamp_to_balance(amount, on_pool + in_p2p);
        self.amount = amount;
        self.check_liquidity(amount);

        let from_pool = min(amount, on_pool);
        if !from_pool.is_zero() {
            let (rest, removed) = remove_scaled(
                self.position.scaled_supply_on_pool,
                from_pool,
                indexes.supply.pool_index,
            );
            self.position.scaled_supply_on_pool = rest;
            self.market.scaled_morpho_supply_on_pool =
                zero_floor_sub(self.market.scaled_morpho_supply_on_pool, removed);
            self.market.scaled_pool_supply = zero_floor_sub(self.market.scaled_pool_supply, removed);
        }

        let from_p2p = amount - from_pool;
        if !from_p2p.is_zero() {
            let (rest, _) = remove_scaled(
                self.position.scaled_supply_in_p2p,
                from_p2p,
                indexes.supply.p2p_index,
            );
            self.position.scaled_supply_in_p2p = rest;

            // the freed borrowers are matched with pool suppliers first
            let promoted = self.matchable(from_p2p, self.morpho_supply_on_pool());
            if !promoted.is_zero() {
                self.remove_supply_on_pool(promoted);
            }

            // the rest of them borrow from the pool again
            let demoted = from_p2p - promoted;
            if !demoted.is_zero() {
                self.check_borrow_cap(demoted);
                let deltas = &mut self.market.deltas;
                deltas.supply.scaled_p2p_total = zero_floor_sub(
                    deltas.supply.scaled_p2p_total,
                    ray_div(demoted, indexes.supply.p2p_index),
                );
                deltas.borrow.scaled_p2p_total = zero_floor_sub(
                    deltas.borrow.scaled_p2p_total,
                    ray_div(demoted, indexes.borrow.p2p_index),
                );
                self.add_borrow_on_pool(demoted);
            }
        }

        self.market.pool_liquidity = zero_floor_sub(self.market.pool_liquidity, amount);
        self.pay_out(amount);
    }

    fn withdraw_collateral(&mut self, amount: U256, headroom: Option<U256>) {
        let pool_index = self.market.indexes.supply.pool_index;

        let collateral = ray_mul(self.position.scaled_collateral, pool_index);
        let amount = self.clamp_to_balance(amount, collateral);
        self.amount = amount;
        if headroom.is_some_and(|headroom| amount > headroom) {
            self.issue(SimulationErrorKind::CollateralCapacityReached);
        }
        self.check_liquidity(amount);

        let (rest, removed) = remove_scaled(self.position.scaled_collateral, amount, pool_index);
        self.position.scaled_collateral = rest;
        self.market.scaled_morpho_collateral =
            zero_floor_sub(self.market.scaled_morpho_collateral, removed);
        self.market.scaled_pool_supply = zero_floor_sub(self.market.scaled_pool_supply, removed);
        self.market.pool_liquidity = zero_floor_sub(self.market.pool_liquidity, amount);
        self.pay_out(amount);
    }
}
