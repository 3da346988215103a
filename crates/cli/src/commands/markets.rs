//! Markets command implementation.

use anyhow::Result;
use morpho_p2p_sim::get_markets_data;

use super::load_snapshot;
use crate::cli::{OutputFormat, SnapshotArgs};
use crate::output::format_markets_table;

pub async fn run_markets(args: &SnapshotArgs, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot).await?;
    let markets = get_markets_data(&snapshot)?;

    match format {
        OutputFormat::Table => {
            println!("{}", format_markets_table(&markets));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&markets)?;
            println!("{}", json);
        }
    }

    Ok(())
}
