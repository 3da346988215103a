//! Morpho P2P CLI - Inspect and simulate positions from a snapshot.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::{run_capacity, run_markets, run_simulate, run_user};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Markets(args) => {
            run_markets(&args, cli.format).await?;
        }
        Commands::User(args) => {
            run_user(&args, cli.format).await?;
        }
        Commands::Capacity(args) => {
            run_capacity(&args, cli.format).await?;
        }
        Commands::Simulate(args) => {
            run_simulate(&args, cli.format).await?;
        }
    }

    Ok(())
}
