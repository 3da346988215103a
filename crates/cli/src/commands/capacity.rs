//! Capacity command implementation.

use anyhow::{Context, Result};
use morpho_p2p_sim::{get_user_max_capacity, OperationType};
use serde_json::json;

use super::load_snapshot;
use crate::cli::{CapacityArgs, OutputFormat};
use crate::output::format_capacity_table;

pub async fn run_capacity(args: &CapacityArgs, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot.snapshot).await?;
    let decimals = snapshot
        .configs
        .get(&args.market)
        .map(|config| config.decimals)
        .with_context(|| format!("Unknown market {}", args.market))?;

    let operations = match args.operation {
        Some(operation) => vec![operation],
        None => OperationType::ALL.to_vec(),
    };

    let limits = operations
        .into_iter()
        .map(|operation| {
            get_user_max_capacity(&snapshot, &args.market, operation)
                .map(|limit| (operation, limit))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match format {
        OutputFormat::Table => {
            println!("{}", format_capacity_table(&limits, decimals));
        }
        OutputFormat::Json => {
            let entries: Vec<_> = limits
                .iter()
                .map(|(operation, limit)| json!({ "operation": operation, "limit": limit }))
                .collect();
            let json = serde_json::to_string_pretty(&entries)?;
            println!("{}", json);
        }
    }

    Ok(())
}
