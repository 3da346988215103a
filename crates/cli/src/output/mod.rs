//! Output formatting for CLI results.

pub mod detail;
pub mod simulation;
pub mod table;

pub use detail::format_user_detail;
pub use simulation::format_simulation;
pub use table::{format_capacity_table, format_markets_table};

use alloy_primitives::{I256, U256};
use morpho_p2p_sim::math::{
    percent_to_decimal, signed_percent_to_decimal, to_decimal, wad_to_decimal,
};
use rust_decimal::Decimal;

const UNBOUNDED: &str = "∞";

fn truncate_address(addr: &str) -> String {
    if addr.len() > 10 {
        format!("{}...{}", &addr[..6], &addr[addr.len() - 4..])
    } else {
        addr.to_string()
    }
}

/// Native amount with its decimals applied.
fn format_amount(value: U256, decimals: u8) -> String {
    if value == U256::MAX {
        return "max".to_string();
    }
    format!("{:.4}", to_decimal(value, decimals).round_dp(4))
}

/// Percent-base value (10_000 = 100%).
fn format_percent(value: U256) -> String {
    if value == U256::MAX {
        return UNBOUNDED.to_string();
    }
    percent_to_decimal(value)
        .checked_mul(Decimal::ONE_HUNDRED)
        .map_or_else(|| UNBOUNDED.to_string(), |p| format!("{:.2}%", p.round_dp(2)))
}

fn format_signed_percent(value: I256) -> String {
    signed_percent_to_decimal(value)
        .checked_mul(Decimal::ONE_HUNDRED)
        .map_or_else(|| UNBOUNDED.to_string(), |p| format!("{:.2}%", p.round_dp(2)))
}

/// Wad USD value.
fn format_usd(value: U256) -> String {
    let v = wad_to_decimal(value);
    let thousand = Decimal::from(1_000);
    let million = Decimal::from(1_000_000);
    if v >= million {
        format!("${:.2}M", (v / million).round_dp(2))
    } else if v >= thousand {
        format!("${:.2}K", (v / thousand).round_dp(2))
    } else {
        format!("${:.2}", v.round_dp(2))
    }
}

/// Wad health factor; unbounded without debt.
fn format_health_factor(value: U256) -> String {
    if value == U256::MAX {
        return UNBOUNDED.to_string();
    }
    format!("{:.4}", wad_to_decimal(value).round_dp(4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use morpho_p2p_sim::WAD;

    #[test]
    fn test_truncate_address() {
        assert_eq!(
            truncate_address("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            "0xaaaa...aaaa"
        );
        assert_eq!(truncate_address("0x1234"), "0x1234");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(U256::from(1_500_000u64), 6), "1.5000");
        assert_eq!(format_amount(U256::MAX, 18), "max");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(U256::from(513u64)), "5.13%");
        assert_eq!(format_percent(U256::MAX), UNBOUNDED);
        assert_eq!(format_signed_percent(I256::try_from(-200i64).unwrap()), "-2.00%");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(U256::from(1_498u64) * WAD), "$1.50K");
        assert_eq!(format_usd(U256::from(12u64) * WAD), "$12.00");
        assert_eq!(format_usd(U256::from(2_500_000u64) * WAD), "$2.50M");
    }

    #[test]
    fn test_format_health_factor() {
        assert_eq!(format_health_factor(U256::MAX), UNBOUNDED);
        assert_eq!(format_health_factor(WAD + WAD / U256::from(2u8)), "1.5000");
    }
}
