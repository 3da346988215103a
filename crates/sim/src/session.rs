//! Session state machine.
//!
//! A [`Session`] holds the latest snapshot and the latest operation list and
//! decides when to re-run the simulation. Every transition takes the current
//! time explicitly and returns the [`SessionEvent`]s it produced; nothing is
//! pushed anywhere from here (see [`crate::publisher`]).
//!
//! Recompute policy:
//! - a new operation list is simulated immediately,
//! - a new snapshot is simulated immediately if the debounce window has
//!   elapsed since the last simulation, otherwise it is marked pending and
//!   flushed by [`Session::poll`],
//! - an empty operation list discards the simulation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy_primitives::{Address, U256};
use tracing::{debug, warn};

use crate::capacity::{get_user_max_capacity, CapacityLimit};
use crate::error::{ProviderError, Result, SimError};
use crate::market::{get_markets_data, MarketView};
use crate::operation::{Operation, OperationType};
use crate::provider::{fetch_snapshot, GlobalFetcher, MarketFetcher, UserFetcher};
use crate::simulator::{
    simulate_with_threshold, SimulatedState, SimulationError, SimulationOutcome,
    HEALTH_FACTOR_THRESHOLD,
};
use crate::state::Snapshot;
use crate::user::{compute_user_view, get_user_markets_data, UserMarketView, UserView};

/// Default minimum time between two data-driven simulations.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Configuration for a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Minimum time between two simulations triggered by new data
    pub debounce: Duration,
    /// Health factor (wad) under which a simulated end state is flagged
    pub health_factor_threshold: U256,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            health_factor_threshold: HEALTH_FACTOR_THRESHOLD,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debounce window for data-driven simulations.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the health factor threshold (wad).
    pub fn with_health_factor_threshold(mut self, threshold: U256) -> Self {
        self.health_factor_threshold = threshold;
        self
    }
}

/// A change produced by a session transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    MarketsUpdated(Vec<MarketView>),
    UserUpdated(UserView),
    /// Final simulated state; `None` when there is no simulation or it aborted
    SimulationUpdated(Option<SimulatedState>),
    /// First simulation error; `None` when the last fold was clean
    SimulationErrorUpdated(Option<SimulationError>),
}

/// Holds the latest snapshot and operation list.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: SessionConfig,
    snapshot: Option<Arc<Snapshot>>,
    operations: Vec<Operation>,
    outcome: Option<SimulationOutcome>,
    last_simulation: Option<Instant>,
    pending: bool,
}

impl Session {
    /// Create an empty session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// The session's configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The latest applied snapshot.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.clone()
    }

    /// The retained operation list.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Outcome of the last simulation.
    pub fn outcome(&self) -> Option<&SimulationOutcome> {
        self.outcome.as_ref()
    }

    /// Whether a data-driven simulation is waiting for the debounce window.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Replaces the snapshot and re-derives views.
    ///
    /// The retained operation list is re-simulated now or once the debounce
    /// window has elapsed.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot, now: Instant) -> Vec<SessionEvent> {
        let snapshot = Arc::new(snapshot);
        let mut events = Vec::new();

        match get_markets_data(&snapshot) {
            Ok(markets) => events.push(SessionEvent::MarketsUpdated(markets)),
            Err(error) => warn!(%error, "skipped markets update"),
        }
        match compute_user_view(&snapshot) {
            Ok(user) => events.push(SessionEvent::UserUpdated(user)),
            Err(error) => warn!(%error, "skipped user update"),
        }
        self.snapshot = Some(snapshot);

        if self.operations.is_empty() {
            return events;
        }

        if self.window_elapsed(now) {
            events.extend(self.run_simulation(now));
        } else {
            debug!(operations = self.operations.len(), "deferred simulation");
            self.pending = true;
        }
        events
    }

    /// Replaces the operation list and simulates it immediately.
    ///
    /// An empty list discards the current simulation.
    pub fn set_operations(
        &mut self,
        operations: Vec<Operation>,
        now: Instant,
    ) -> Vec<SessionEvent> {
        if operations.is_empty() {
            return self.reset();
        }
        self.operations = operations;
        self.run_simulation(now)
    }

    /// Flushes a pending simulation once the debounce window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Vec<SessionEvent> {
        if !self.pending || !self.window_elapsed(now) {
            return Vec::new();
        }
        debug!(operations = self.operations.len(), "flushing deferred simulation");
        self.run_simulation(now)
    }

    /// Drops the operation list and the simulation state.
    pub fn reset(&mut self) -> Vec<SessionEvent> {
        self.operations.clear();
        self.outcome = None;
        self.pending = false;
        vec![
            SessionEvent::SimulationUpdated(None),
            SessionEvent::SimulationErrorUpdated(None),
        ]
    }

    /// Fetches a fresh snapshot from the providers and applies it.
    pub async fn refresh<M, U, G>(
        &mut self,
        markets: &M,
        users: &U,
        global: &G,
        user: Option<Address>,
        now: Instant,
    ) -> std::result::Result<Vec<SessionEvent>, ProviderError>
    where
        M: MarketFetcher + ?Sized,
        U: UserFetcher + ?Sized,
        G: GlobalFetcher + ?Sized,
    {
        let snapshot = fetch_snapshot(markets, users, global, user, None).await?;
        Ok(self.apply_snapshot(snapshot, now))
    }

    fn window_elapsed(&self, now: Instant) -> bool {
        self.last_simulation
            .is_none_or(|last| now.saturating_duration_since(last) >= self.config.debounce)
    }

    fn run_simulation(&mut self, now: Instant) -> Vec<SessionEvent> {
        self.pending = false;
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Vec::new();
        };

        let outcome = simulate_with_threshold(
            snapshot,
            &self.operations,
            self.config.health_factor_threshold,
        );
        self.last_simulation = Some(now);

        let events = vec![
            SessionEvent::SimulationUpdated(outcome.final_state.clone()),
            SessionEvent::SimulationErrorUpdated(outcome.error),
        ];
        self.outcome = Some(outcome);
        events
    }

    fn current(&self) -> Result<&Snapshot> {
        self.snapshot
            .as_deref()
            .ok_or(SimError::missing("snapshot"))
    }

    /// Market views of the latest snapshot.
    pub fn markets_data(&self) -> Result<Vec<MarketView>> {
        get_markets_data(self.current()?)
    }

    /// User view of the latest snapshot.
    pub fn user_view(&self) -> Result<UserView> {
        compute_user_view(self.current()?)
    }

    /// Per-market user views of the latest snapshot.
    pub fn user_markets_data(&self) -> Result<Vec<UserMarketView>> {
        get_user_markets_data(self.current()?)
    }

    /// Capacity limit on the latest snapshot.
    pub fn max_capacity(
        &self,
        market: &Address,
        operation: OperationType,
    ) -> Result<Option<CapacityLimit>> {
        get_user_max_capacity(self.current()?, market, operation)
    }
}
