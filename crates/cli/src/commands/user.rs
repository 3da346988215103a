//! User command implementation.

use anyhow::Result;
use morpho_p2p_sim::compute_user_view;

use super::load_snapshot;
use crate::cli::{OutputFormat, SnapshotArgs};
use crate::output::format_user_detail;

pub async fn run_user(args: &SnapshotArgs, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot).await?;
    let user = compute_user_view(&snapshot)?;

    match format {
        OutputFormat::Table => {
            println!("{}", format_user_detail(&user));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&user)?;
            println!("{}", json);
        }
    }

    Ok(())
}
