//! Hypothetical user operations fed to the simulator.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Sentinel amount meaning "use everything the capacity limiter allows".
pub const MAX_AMOUNT: U256 = U256::MAX;

/// Kinds of user operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationType {
    Supply,
    SupplyCollateral,
    Borrow,
    Repay,
    Withdraw,
    WithdrawCollateral,
    ClaimRewards,
    Wrap,
}

impl OperationType {
    /// All operation kinds, in display order.
    pub const ALL: [OperationType; 8] = [
        OperationType::Supply,
        OperationType::SupplyCollateral,
        OperationType::Borrow,
        OperationType::Repay,
        OperationType::Withdraw,
        OperationType::WithdrawCollateral,
        OperationType::ClaimRewards,
        OperationType::Wrap,
    ];

    /// Canonical camelCase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Supply => "supply",
            OperationType::SupplyCollateral => "supplyCollateral",
            OperationType::Borrow => "borrow",
            OperationType::Repay => "repay",
            OperationType::Withdraw => "withdraw",
            OperationType::WithdrawCollateral => "withdrawCollateral",
            OperationType::ClaimRewards => "claimRewards",
            OperationType::Wrap => "wrap",
        }
    }

    /// Whether the operation can pay out native coin instead of the wrapped token.
    pub fn supports_unwrap(&self) -> bool {
        matches!(
            self,
            OperationType::Borrow | OperationType::Withdraw | OperationType::WithdrawCollateral
        )
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown operation name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown operation '{0}'")]
pub struct ParseOperationTypeError(pub String);

impl FromStr for OperationType {
    type Err = ParseOperationTypeError;

    /// Accepts camelCase, snake_case and kebab-case names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        OperationType::ALL
            .into_iter()
            .find(|op| op.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| ParseOperationTypeError(s.to_string()))
    }
}

/// A single hypothetical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationType,
    /// Underlying address of the target market
    pub market: Address,
    /// Amount in the asset's native units, or [`MAX_AMOUNT`]
    pub amount: U256,
    /// Pay out native coin instead of the wrapped token
    #[serde(default)]
    pub unwrap: bool,
}

impl Operation {
    /// Create an operation without unwrapping.
    pub fn new(kind: OperationType, market: Address, amount: U256) -> Self {
        Self {
            kind,
            market,
            amount,
            unwrap: false,
        }
    }

    /// Supply `amount` to `market`.
    pub fn supply(market: Address, amount: U256) -> Self {
        Self::new(OperationType::Supply, market, amount)
    }

    /// Supply `amount` as collateral to `market`.
    pub fn supply_collateral(market: Address, amount: U256) -> Self {
        Self::new(OperationType::SupplyCollateral, market, amount)
    }

    /// Borrow `amount` from `market`.
    pub fn borrow(market: Address, amount: U256) -> Self {
        Self::new(OperationType::Borrow, market, amount)
    }

    /// Repay `amount` of debt on `market`.
    pub fn repay(market: Address, amount: U256) -> Self {
        Self::new(OperationType::Repay, market, amount)
    }

    /// Withdraw `amount` of supply from `market`.
    pub fn withdraw(market: Address, amount: U256) -> Self {
        Self::new(OperationType::Withdraw, market, amount)
    }

    /// Withdraw `amount` of collateral from `market`.
    pub fn withdraw_collateral(market: Address, amount: U256) -> Self {
        Self::new(OperationType::WithdrawCollateral, market, amount)
    }

    /// Claims every pending reward; `market` is informational only.
    pub fn claim_rewards(market: Address) -> Self {
        Self::new(OperationType::ClaimRewards, market, MAX_AMOUNT)
    }

    /// Wraps native coin into the wrapped-native market `market`.
    pub fn wrap(market: Address, amount: U256) -> Self {
        Self::new(OperationType::Wrap, market, amount)
    }

    /// Returns a copy that pays out native coin.
    pub fn with_unwrap(mut self) -> Self {
        self.unwrap = true;
        self
    }

    /// Whether the amount is the "use all available" sentinel.
    pub fn is_max(&self) -> bool {
        self.amount == MAX_AMOUNT
    }
}
