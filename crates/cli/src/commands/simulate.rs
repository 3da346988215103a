//! Simulate command implementation.

use anyhow::{Context, Result};
use morpho_p2p_sim::{simulate, Operation, OperationType, Snapshot, MAX_AMOUNT};

use super::{load_snapshot, parse_amount};
use crate::cli::{AmountArg, OperationArg, OutputFormat, SimulateArgs};
use crate::output::format_simulation;

/// Resolve human-readable amounts with the market's decimals.
fn to_operation(snapshot: &Snapshot, arg: &OperationArg) -> Result<Operation> {
    let amount = match &arg.amount {
        AmountArg::Max => MAX_AMOUNT,
        AmountArg::Units(units) => {
            let decimals = match snapshot.configs.get(&arg.market) {
                Some(config) => config.decimals,
                // native coin and reward amounts
                None if matches!(arg.kind, OperationType::ClaimRewards | OperationType::Wrap) => {
                    18
                }
                None => anyhow::bail!("Unknown market {}", arg.market),
            };
            parse_amount(units, decimals)
                .with_context(|| format!("Invalid amount for {}", arg.kind))?
        }
    };

    let operation = Operation::new(arg.kind, arg.market, amount);
    Ok(if arg.unwrap {
        operation.with_unwrap()
    } else {
        operation
    })
}

pub async fn run_simulate(args: &SimulateArgs, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot.snapshot).await?;
    let operations = args
        .ops
        .iter()
        .map(|arg| to_operation(&snapshot, arg))
        .collect::<Result<Vec<_>>>()?;

    let outcome = simulate(&snapshot, &operations);

    match format {
        OutputFormat::Table => {
            println!("{}", format_simulation(&operations, &outcome));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)?;
            println!("{}", json);
        }
    }

    Ok(())
}
