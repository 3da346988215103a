//! CLI argument definitions using clap.

use std::path::PathBuf;
use std::str::FromStr;

use alloy_primitives::Address;
use clap::{Parser, Subcommand, ValueEnum};
use morpho_p2p_sim::OperationType;

/// Morpho P2P CLI - Inspect and simulate positions from a snapshot
#[derive(Parser, Debug)]
#[command(name = "morpho-p2p")]
#[command(
    about = "CLI tool for inspecting and simulating peer-to-peer lending positions",
    long_about = None
)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List markets with indexes, APYs and matching ratios
    Markets(SnapshotArgs),
    /// Show the user's positions and health
    User(SnapshotArgs),
    /// Maximum amount per operation and the binding constraint
    Capacity(CapacityArgs),
    /// Simulate a sequence of operations
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
pub struct SnapshotArgs {
    /// Snapshot JSON file (can also use MORPHO_P2P_SNAPSHOT env var)
    #[arg(long, env = "MORPHO_P2P_SNAPSHOT")]
    pub snapshot: PathBuf,
}

#[derive(Parser, Debug)]
pub struct CapacityArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Market underlying address
    #[arg(long)]
    pub market: Address,

    /// Operation to query (omit to query every operation)
    #[arg(long)]
    pub operation: Option<OperationType>,
}

#[derive(Parser, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Operation as kind:market:amount[:unwrap], amount in human-readable
    /// units (e.g., "100.5") or "max"; repeat for a sequence
    #[arg(long = "op", required = true)]
    pub ops: Vec<OperationArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Amount of an operation before decimals are known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AmountArg {
    Max,
    Units(String),
}

/// An operation as given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationArg {
    pub kind: OperationType,
    pub market: Address,
    pub amount: AmountArg,
    pub unwrap: bool,
}

impl FromStr for OperationArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (kind, market, amount, unwrap) = match parts.as_slice() {
            [kind, market, amount] => (*kind, *market, *amount, false),
            [kind, market, amount, "unwrap"] => (*kind, *market, *amount, true),
            _ => {
                return Err(format!(
                    "Invalid operation: {} (expected kind:market:amount[:unwrap])",
                    s
                ))
            }
        };

        let kind = kind.parse::<OperationType>().map_err(|e| e.to_string())?;
        let market = market
            .parse::<Address>()
            .map_err(|e| format!("Invalid market address {}: {}", market, e))?;
        let amount = if amount.eq_ignore_ascii_case("max") {
            AmountArg::Max
        } else if !amount.is_empty() && amount.chars().all(|c| c.is_ascii_digit() || c == '.') {
            AmountArg::Units(amount.to_string())
        } else {
            return Err(format!("Invalid amount: {}", amount));
        };

        Ok(OperationArg {
            kind,
            market,
            amount,
            unwrap,
        })
    }
}
