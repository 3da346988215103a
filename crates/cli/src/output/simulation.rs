//! Output formatting for simulation results.

use colored::Colorize;
use morpho_p2p_sim::{Operation, SimulationOutcome};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use super::detail::colored_health_factor;
use super::{format_amount, format_percent, truncate_address};

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Health Factor")]
    health_factor: String,
    #[tabled(rename = "Capacity Used")]
    capacity_used: String,
}

/// One row per applied step, then the outcome.
pub fn format_simulation(operations: &[Operation], outcome: &SimulationOutcome) -> String {
    let mut output = String::new();

    let rows: Vec<StepRow> = outcome
        .steps
        .iter()
        .zip(operations)
        .enumerate()
        .map(|(index, (step, operation))| {
            let market = step.market(&operation.market);
            let symbol = market
                .map(|m| m.symbol.clone())
                .unwrap_or_else(|| truncate_address(&format!("{}", operation.market)));
            let decimals = market.map_or(18, |m| m.decimals);
            let unwrap = if operation.unwrap { " (unwrap)" } else { "" };

            StepRow {
                index,
                operation: format!("{}{}", operation.kind, unwrap),
                market: symbol,
                amount: format_amount(operation.amount, decimals),
                health_factor: colored_health_factor(step.user.health_factor),
                capacity_used: format_percent(step.user.borrow_capacity_used),
            }
        })
        .collect();

    if !rows.is_empty() {
        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::left()));
        output.push_str(&table.to_string());
        output.push('\n');
    }

    match (&outcome.error, &outcome.final_state) {
        (None, Some(_)) => {
            output.push_str(&format!("{}\n", "Simulation succeeded".green().bold()));
        }
        (Some(error), Some(_)) => {
            output.push_str(&format!("{} {}\n", "Warning:".yellow().bold(), error));
        }
        (Some(error), None) => {
            output.push_str(&format!("{} {}\n", "Aborted:".red().bold(), error));
        }
        (None, None) => {
            output.push_str(&format!("{}\n", "Aborted".red().bold()));
        }
    }

    output
}
