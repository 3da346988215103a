//! Table formatting for market and capacity lists.

use morpho_p2p_sim::{CapacityLimit, CapacityLimitReason, MarketView, OperationType};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use super::{format_amount, format_percent, truncate_address};

#[derive(Tabled)]
struct MarketRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Pool Supply APY")]
    pool_supply_apy: String,
    #[tabled(rename = "P2P Supply APY")]
    p2p_supply_apy: String,
    #[tabled(rename = "P2P Borrow APY")]
    p2p_borrow_apy: String,
    #[tabled(rename = "Pool Borrow APY")]
    pool_borrow_apy: String,
    #[tabled(rename = "Morpho Supply")]
    total_supply: String,
    #[tabled(rename = "Morpho Borrow")]
    total_borrow: String,
    #[tabled(rename = "Matched (S/B)")]
    matching: String,
}

#[derive(Tabled)]
struct CapacityRow {
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Max Amount")]
    value: String,
    #[tabled(rename = "Limited By")]
    reason: String,
}

fn reason_label(reason: CapacityLimitReason) -> &'static str {
    match reason {
        CapacityLimitReason::WalletBalance => "wallet balance",
        CapacityLimitReason::OperationPaused => "operation paused",
        CapacityLimitReason::ZeroPrice => "zero price",
        CapacityLimitReason::Cap => "market cap",
        CapacityLimitReason::BorrowCapacity => "borrow capacity",
        CapacityLimitReason::PoolLiquidity => "pool liquidity",
        CapacityLimitReason::Balance => "position balance",
    }
}

pub fn format_markets_table(markets: &[MarketView]) -> String {
    if markets.is_empty() {
        return "No markets found.".to_string();
    }

    let rows: Vec<MarketRow> = markets
        .iter()
        .map(|m| MarketRow {
            symbol: m.symbol.clone(),
            market: truncate_address(&format!("{}", m.underlying)),
            pool_supply_apy: format_percent(m.pool_supply_apy),
            p2p_supply_apy: format_percent(m.p2p_supply_apy),
            p2p_borrow_apy: format_percent(m.p2p_borrow_apy),
            pool_borrow_apy: format_percent(m.pool_borrow_apy),
            total_supply: format_amount(m.total_morpho_supply, m.decimals),
            total_borrow: format_amount(m.total_morpho_borrow, m.decimals),
            matching: format!(
                "{} / {}",
                format_percent(m.supply_matching_ratio),
                format_percent(m.borrow_matching_ratio)
            ),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()));

    table.to_string()
}

/// Capacity per operation; `decimals` applies to market operations, native
/// coin and reward amounts are always 18 decimals.
pub fn format_capacity_table(
    limits: &[(OperationType, Option<CapacityLimit>)],
    decimals: u8,
) -> String {
    let rows: Vec<CapacityRow> = limits
        .iter()
        .map(|(operation, limit)| {
            let decimals = match operation {
                OperationType::ClaimRewards | OperationType::Wrap => 18,
                _ => decimals,
            };
            match limit {
                Some(limit) => CapacityRow {
                    operation: operation.to_string(),
                    value: format_amount(limit.value, decimals),
                    reason: reason_label(limit.reason).to_string(),
                },
                None => CapacityRow {
                    operation: operation.to_string(),
                    value: "-".to_string(),
                    reason: "missing data".to_string(),
                },
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()));

    table.to_string()
}
