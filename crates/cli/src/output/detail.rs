//! Detailed output formatting for a user's account.

use alloy_primitives::U256;
use colored::Colorize;
use morpho_p2p_sim::{UserView, WAD};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use super::{
    format_amount, format_health_factor, format_percent, format_signed_percent, format_usd,
};

#[derive(Tabled)]
struct UserMarketRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Supplied")]
    supply: String,
    #[tabled(rename = "Collateral")]
    collateral: String,
    #[tabled(rename = "Borrowed")]
    borrow: String,
    #[tabled(rename = "Wallet")]
    wallet: String,
    #[tabled(rename = "Matched (S/B)")]
    matching: String,
    #[tabled(rename = "Supply APY")]
    supply_apy: String,
    #[tabled(rename = "Borrow APY")]
    borrow_apy: String,
}

/// Health factor coloured by how close it is to liquidation.
pub(crate) fn colored_health_factor(health_factor: U256) -> String {
    let text = format_health_factor(health_factor);
    if health_factor < WAD {
        text.red().bold().to_string()
    } else if health_factor < WAD + WAD / U256::from(10u8) {
        text.yellow().to_string()
    } else {
        text.green().to_string()
    }
}

pub fn format_user_detail(user: &UserView) -> String {
    let mut output = String::new();

    let title = user
        .user
        .map(|address| format!("User {}", address))
        .unwrap_or_else(|| "User".to_string());

    // Header
    output.push_str(&format!("{}\n", "=".repeat(60)));
    output.push_str(&format!("{}\n", title.bold()));
    output.push_str(&format!("{}\n\n", "=".repeat(60)));

    // Health
    output.push_str(&format!("{}\n", "Health".cyan().bold()));
    output.push_str(&format!(
        "  Health Factor:     {}\n",
        colored_health_factor(user.health_factor)
    ));
    output.push_str(&format!(
        "  Borrow Capacity:   {} (used {})\n",
        format_usd(user.borrow_capacity),
        format_percent(user.borrow_capacity_used)
    ));
    output.push_str(&format!(
        "  Liquidation Value: {} (used {})\n",
        format_usd(user.liquidation_value),
        format_percent(user.liquidation_value_used)
    ));
    output.push_str(&format!(
        "  Net APY:           {}\n\n",
        format_signed_percent(user.net_apy)
    ));

    // Totals
    output.push_str(&format!("{}\n", "Totals (USD)".cyan().bold()));
    output.push_str(&format!("  Supplied:   {}\n", format_usd(user.total_supply_usd)));
    output.push_str(&format!(
        "  Collateral: {}\n",
        format_usd(user.total_collateral_usd)
    ));
    output.push_str(&format!("  Borrowed:   {}\n\n", format_usd(user.total_borrow_usd)));

    // Positions
    output.push_str(&format!("{}\n", "Positions".cyan().bold()));
    if user.markets.is_empty() {
        output.push_str("  No positions found.\n");
        return output;
    }

    let rows: Vec<UserMarketRow> = user
        .markets
        .iter()
        .map(|m| UserMarketRow {
            symbol: m.symbol.clone(),
            supply: format_amount(m.total_supply, m.decimals),
            collateral: format_amount(m.collateral, m.decimals),
            borrow: format_amount(m.total_borrow, m.decimals),
            wallet: format_amount(m.wallet_balance, m.decimals),
            matching: format!(
                "{} / {}",
                format_percent(m.supply_matching_ratio),
                format_percent(m.borrow_matching_ratio)
            ),
            supply_apy: format_percent(m.experienced_supply_apy),
            borrow_apy: format_percent(m.experienced_borrow_apy),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()));
    output.push_str(&table.to_string());
    output.push('\n');

    output
}
