use std::cmp::Ordering;

use crate::data::{RankedSymbol, SymbolInfo, TickerSnapshot};

/// Delivery month tags carried by dated (non-perpetual) contract symbols.
const DELIVERY_TAGS: [&str; 4] = ["0325", "0626", "0927", "1228"];

/// Descending order for sort keys. `-0.0` equals `0.0` and NaN sorts last.
pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    fn key(v: f64) -> f64 {
        if v.is_nan() {
            f64::NEG_INFINITY
        } else {
            v + 0.0
        }
    }
    key(b).total_cmp(&key(a))
}

/// Sort by 24h quote volume, largest first. Equal volumes keep their input order.
pub fn rank_by_quote_volume(tickers: &[TickerSnapshot]) -> Vec<TickerSnapshot> {
    let mut ranked = tickers.to_vec();
    ranked.sort_by(|a, b| descending(a.quote_volume, b.quote_volume));
    ranked
}

pub fn top_by_quote_volume(tickers: &[TickerSnapshot], quote: &str, top_n: usize) -> Vec<RankedSymbol> {
    rank_by_quote_volume(tickers)
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, t)| RankedSymbol {
            rank: i + 1,
            base_asset: t.symbol.strip_suffix(quote).unwrap_or(&t.symbol).to_string(),
            symbol: t.symbol,
            last_price: t.last_price,
            price_change_percent: t.price_change_percent,
            quote_volume: t.quote_volume,
        })
        .collect()
}

/// True for dated delivery contracts such as `BTCUSDT_250328`.
pub fn is_dated_contract(symbol: &str) -> bool {
    symbol.contains('_') || DELIVERY_TAGS.iter().any(|tag| symbol.contains(tag))
}

/// Selects the instruments a scan runs over.
#[derive(Debug, Clone)]
pub struct SymbolUniverse {
    pub quote: String,
    pub excluded: Vec<String>,
}

impl SymbolUniverse {
    pub fn new(quote: &str, excluded: &[String]) -> Self {
        Self {
            quote: quote.to_uppercase(),
            excluded: excluded.to_vec(),
        }
    }

    fn admits(&self, symbol: &str) -> bool {
        symbol.ends_with(&self.quote) && !self.excluded.iter().any(|e| e == symbol)
    }

    /// Tradable perpetuals of this quote asset, sorted by name.
    pub fn perpetuals(&self, infos: &[SymbolInfo]) -> Vec<String> {
        let mut symbols: Vec<String> = infos
            .iter()
            .filter(|i| i.is_tradable_perpetual() && self.admits(&i.symbol))
            .map(|i| i.symbol.clone())
            .collect();
        symbols.sort();
        symbols
    }

    /// Tickers of this quote asset with dated contracts dropped.
    pub fn tickers(&self, tickers: &[TickerSnapshot]) -> Vec<TickerSnapshot> {
        tickers
            .iter()
            .filter(|t| self.admits(&t.symbol) && !is_dated_contract(&t.symbol))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str, quote_volume: f64) -> TickerSnapshot {
        TickerSnapshot {
            symbol: symbol.to_string(),
            last_price: 1.0,
            price_change: 0.0,
            price_change_percent: 0.0,
            volume: 0.0,
            quote_volume,
            trade_count: 0,
            high_price: 1.0,
            low_price: 1.0,
            open_price: 1.0,
        }
    }

    #[test]
    fn ranks_descending_and_stable() {
        let input = vec![
            ticker("AUSDT", 5.0),
            ticker("BUSDT", 9.0),
            ticker("CUSDT", 5.0),
            ticker("DUSDT", 1.0),
            ticker("EUSDT", 5.0),
        ];
        let ranked: Vec<String> = rank_by_quote_volume(&input)
            .into_iter()
            .map(|t| t.symbol)
            .collect();
        assert_eq!(ranked, vec!["BUSDT", "AUSDT", "CUSDT", "EUSDT", "DUSDT"]);
    }

    #[test]
    fn ranked_output_is_non_increasing() {
        let input: Vec<TickerSnapshot> = (0..50)
            .map(|i| ticker(&format!("S{}USDT", i), ((i * 37) % 11) as f64))
            .collect();
        let ranked = rank_by_quote_volume(&input);
        assert_eq!(ranked.len(), input.len());
        assert!(ranked.windows(2).all(|w| w[0].quote_volume >= w[1].quote_volume));
    }

    #[test]
    fn signed_zero_ties_and_nan_sorts_last() {
        let input = vec![
            ticker("AUSDT", 0.0),
            ticker("BUSDT", f64::NAN),
            ticker("CUSDT", -0.0),
            ticker("DUSDT", 5.0),
        ];
        let ranked = rank_by_quote_volume(&input);
        let order: Vec<&str> = ranked.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(order, vec!["DUSDT", "AUSDT", "CUSDT", "BUSDT"]);
    }

    #[test]
    fn empty_input_ranks_empty() {
        assert!(rank_by_quote_volume(&[]).is_empty());
        assert!(top_by_quote_volume(&[], "USDT", 10).is_empty());
    }

    #[test]
    fn top_n_strips_quote_for_base_asset() {
        let input = vec![ticker("ETHUSDT", 2.0), ticker("BTCUSDT", 3.0), ticker("SOLUSDT", 1.0)];
        let top = top_by_quote_volume(&input, "USDT", 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[0].base_asset, "BTC");
        assert_eq!(top[1].symbol, "ETHUSDT");
    }

    #[test]
    fn dated_contracts_are_detected() {
        assert!(is_dated_contract("BTCUSDT_250328"));
        assert!(is_dated_contract("ETHUSDT0626"));
        assert!(!is_dated_contract("BTCUSDT"));
    }
}
