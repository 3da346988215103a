//! Peer-to-Peer Lending Simulation SDK
//!
//! Off-chain accounting for a lending layer that matches suppliers and
//! borrowers peer-to-peer on top of an underlying pool, falling back to the
//! pool for whatever cannot be matched.
//!
//! # Overview
//!
//! The SDK allows you to:
//! - Age pool and peer-to-peer indexes to any timestamp
//! - Derive market views (rates, APYs, totals, matching ratios)
//! - Derive user views (balances, USD values, health factor, net APY)
//! - Compute the maximum amount of any operation and what bounds it
//! - Simulate a batch of operations and inspect every intermediate state
//! - Keep a debounced session over changing data and publish its outputs
//!
//! # Example
//!
//! ```rust
//! use morpho_p2p_sim::{simulate, Operation, Snapshot};
//! use alloy_primitives::{Address, U256};
//!
//! let snapshot = Snapshot::default();
//! let outcome = simulate(&snapshot, &[Operation::supply(Address::ZERO, U256::from(100u64))]);
//!
//! // no global context was ever fetched
//! assert!(outcome.is_aborted());
//! ```

pub mod capacity;
pub mod error;
pub mod market;
pub mod math;
pub mod operation;
pub mod p2p_index;
pub mod pool_index;
pub mod provider;
pub mod publisher;
pub mod session;
pub mod simulator;
pub mod state;
pub mod user;

// Re-export commonly used types
pub use error::{ProviderError, SimError};

// Math exports
pub use math::{RoundingDirection, PERCENT, RAY, SECONDS_PER_YEAR, WAD};

// Index exports
pub use p2p_index::{
    accrue_market, compute_p2p_indexes, compute_p2p_rates, P2PIndexes, P2PIndexesParams,
    P2PRates, P2PRatesParams,
};
pub use pool_index::{compute_pool_indexes, PoolIndexes, PoolIndexesParams};

// State exports
pub use operation::{Operation, OperationType, MAX_AMOUNT};
pub use state::{
    GlobalContext, MarketConfig, PauseStatuses, ScaledMarketState, Snapshot, UserContext,
    UserScaledPosition,
};

// View exports
pub use capacity::{get_user_max_capacity, CapacityLimit, CapacityLimitReason};
pub use market::{get_markets_data, MarketView};
pub use user::{compute_user_view, get_user_markets_data, UserMarketView, UserView};

// Simulation exports
pub use simulator::{
    simulate, simulate_with_threshold, SimulatedState, SimulationError, SimulationErrorKind,
    SimulationOutcome,
};

// Session exports
pub use provider::{fetch_snapshot, GlobalFetcher, MarketFetcher, StaticProvider, UserFetcher};
pub use publisher::Publisher;
pub use session::{Session, SessionConfig, SessionEvent};
