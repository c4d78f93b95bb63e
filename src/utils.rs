use chrono::{DateTime, Utc};

use crate::error::{ScanError, ScanResult};

pub fn tradingview_symbol(symbol: &str) -> String {
    format!("BINANCE:{}.P", symbol)
}

pub fn watchlist_line(symbols: &[String]) -> String {
    symbols
        .iter()
        .map(|s| tradingview_symbol(s))
        .collect::<Vec<_>>()
        .join(",")
}

/// Fixed six decimals with trailing zeros dropped.
pub fn trim_price(price: f64) -> String {
    let s = format!("{:.6}", price);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Integer part with thousands separators, e.g. `1,234,567`.
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Watch-list file for one quote asset's listing. A custom name only fits a single listing.
pub fn symbols_file_name(quote: &str, listings: usize, output: Option<&str>) -> ScanResult<String> {
    match (output, listings) {
        (Some(name), 1) => Ok(name.to_string()),
        (Some(name), _) => Err(ScanError::Configuration(format!(
            "--output {} needs a single quote asset; {} listings would share it",
            name, listings
        ))),
        (None, 1) if quote == "USDT" => Ok("binance_symbols.txt".to_string()),
        (None, _) => Ok(format!("binance_{}_symbols.txt", quote.to_lowercase())),
    }
}

pub fn atr_file_name(now: DateTime<Utc>) -> String {
    format!("atr_scan_results_{}.txt", now.timestamp())
}

pub fn pump_file_name(now: DateTime<Utc>) -> String {
    format!("pumped_coins_{}.json", now.format("%Y%m%d_%H%M%S"))
}
