//! Command implementations.

pub mod capacity;
pub mod markets;
pub mod simulate;
pub mod user;

pub use capacity::run_capacity;
pub use markets::run_markets;
pub use simulate::run_simulate;
pub use user::run_user;

use std::path::Path;

use alloy_primitives::U256;
use anyhow::{Context, Result};
use morpho_p2p_sim::{fetch_snapshot, Snapshot, StaticProvider};

/// Load a snapshot file through the provider interfaces.
async fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let provider = StaticProvider::from_json_file(path)
        .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
    let user = provider.snapshot().user.map(|context| context.address);

    fetch_snapshot(&provider, &provider, &provider, user, None)
        .await
        .with_context(|| format!("Incomplete snapshot {}", path.display()))
}

/// Parse a human-readable amount string to U256 given decimals.
fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let parts: Vec<&str> = amount.split('.').collect();

    let (integer_part, fractional_part) = match parts.as_slice() {
        [integer] => (*integer, ""),
        [integer, fraction] => (*integer, *fraction),
        _ => anyhow::bail!("Invalid amount format: {}", amount),
    };

    // Pad or truncate the fractional part to match decimals
    let fractional_padded = if fractional_part.len() > decimals as usize {
        &fractional_part[..decimals as usize]
    } else {
        fractional_part
    };

    let fractional_padded = format!("{:0<width$}", fractional_padded, width = decimals as usize);

    let combined = format!("{}{}", integer_part, fractional_padded);
    let combined = combined.trim_start_matches('0');

    if combined.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(combined, 10)
        .with_context(|| format!("Failed to parse amount: {}", amount))
}
