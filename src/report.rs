use std::fmt::Write;

use chrono::Local;

use crate::data::{AtrReading, RankedSymbol, ScoredResult};
use crate::utils::{thousands, trim_price};

pub fn volume_table(ranked: &[RankedSymbol]) -> String {
    let mut out = String::new();
    let rule = "=".repeat(80);
    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "TOP {} UM FUTURES COINS BY 24HR VOLUME", ranked.len());
    let _ = writeln!(out, "Updated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "{}", rule);

    for r in ranked {
        let _ = writeln!(
            out,
            "{:>3}. {:<12} | Price: ${:<12} | Change: {:>8} | Volume: ${:>15}",
            r.rank,
            r.base_asset,
            trim_price(r.last_price),
            format!("{:.2}%", r.price_change_percent),
            thousands(r.quote_volume)
        );
    }
    let _ = writeln!(out, "\n{}", rule);
    out
}

/// Expects readings already sorted by ATR percentage.
pub fn atr_table(readings: &[AtrReading], min_atr_pct: f64) -> String {
    if readings.is_empty() {
        return "No symbols found meeting the criteria.\n".to_string();
    }

    let mut out = String::new();
    let rule = "=".repeat(80);
    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "Found {} symbols with ATR% >= {}%", readings.len(), min_atr_pct);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "{:<15} {:<12} {:<12} {:<10} {:<8} Multiplier",
        "Symbol", "Price", "ATR Value", "ATR %", "Period"
    );
    let _ = writeln!(out, "{}", "-".repeat(80));

    for r in readings {
        let _ = writeln!(
            out,
            "{:<15} ${:<11.4} {:<12.6} {:<9.3}% {:<8} {}",
            r.symbol, r.current_price, r.atr, r.atr_pct, r.period, r.multiplier
        );
    }
    out
}

pub fn pump_table(coins: &[ScoredResult]) -> String {
    if coins.is_empty() {
        return "\nNo significantly pumped coins found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "\nTOP PUMPED COINS (Found {} candidates)", coins.len());
    let _ = writeln!(out, "{}", "=".repeat(96));
    let _ = writeln!(
        out,
        "{:<4} {:<15} {:<6} {:<8} {:<12} {:<12} {:<9} {:<11}",
        "Rank", "Symbol", "Score", "24h %", "Price", "Vol(USDT)", "Max Hr %", "From High %"
    );
    let _ = writeln!(out, "{}", "-".repeat(96));

    for (i, c) in coins.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<15} {:<6} {:>6.2}% {:<12.6} {:>8.2}M {:>7.2}% {:>9.2}%",
            i + 1,
            c.symbol,
            c.pump_score,
            c.price_change_24h,
            c.current_price,
            c.quote_volume_24h / 1_000_000.0,
            c.metrics.max_hourly_pump_pct,
            c.metrics.distance_from_high_pct
        );
    }

    out.push_str("\nLegend:\n");
    out.push_str("- Score: Composite pump score (higher = more significant pump)\n");
    out.push_str("- 24h %: 24-hour price change percentage\n");
    out.push_str("- Vol(USDT): 24-hour trading volume in millions USDT\n");
    out.push_str("- Max Hr %: Biggest single hour pump in last 24h\n");
    out.push_str("- From High %: Distance from 24h high (lower = still near peak)\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tables_say_so() {
        assert!(atr_table(&[], 0.2).contains("No symbols found"));
        assert!(pump_table(&[]).contains("No significantly pumped coins"));
    }

    #[test]
    fn volume_table_lists_every_row() {
        let ranked = vec![RankedSymbol {
            rank: 1,
            symbol: "BTCUSDT".to_string(),
            base_asset: "BTC".to_string(),
            last_price: 65000.5,
            price_change_percent: 1.234,
            quote_volume: 12_345_678_901.0,
        }];
        let table = volume_table(&ranked);
        assert!(table.contains("TOP 1 UM FUTURES"));
        assert!(table.contains("BTC"));
        assert!(table.contains("65000.5"));
        assert!(table.contains("1.23%"));
        assert!(table.contains("12,345,678,901"));
    }
}
