//! Error types for the simulation library.

use alloy_primitives::Address;
use thiserror::Error;

use crate::operation::OperationType;

/// Internal contract violations raised by the models.
///
/// These are not user-facing simulation outcomes (see
/// [`crate::simulator::SimulationError`]); they signal that a computation was
/// invoked without the data it needs, or that a decision table was left
/// without a matching branch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// A required piece of the snapshot has never been fetched
    #[error("Missing {what} in snapshot")]
    MissingData { what: &'static str },

    /// No market with this underlying exists in the snapshot
    #[error("Unknown market {market}")]
    UnknownMarket { market: Address },

    /// No market config for this underlying exists in the snapshot
    #[error("Missing config for market {market}")]
    MissingConfig { market: Address },

    /// The capacity limiter found a minimum that none of its candidates matched
    #[error("No limiter matched the {operation:?} capacity on market {market}")]
    UnresolvedLimiter {
        market: Address,
        operation: OperationType,
    },
}

impl SimError {
    pub(crate) fn missing(what: &'static str) -> Self {
        Self::MissingData { what }
    }
}

/// Errors raised by data providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Reading a snapshot file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot file could not be parsed
    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// The provider has no data for the requested user
    #[error("No positions for user {user}")]
    UnknownUser { user: Address },

    /// The provider has no global context
    #[error("Global context unavailable")]
    GlobalUnavailable,
}

/// Result type alias for model computations.
pub type Result<T> = std::result::Result<T, SimError>;
