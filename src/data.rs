use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    Perpetual,
    CurrentQuarter,
    NextQuarter,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolStatus {
    Trading,
    PendingTrading,
    PreDelivering,
    Delivering,
    Delivered,
    Settling,
    Close,
    #[serde(other)]
    Other,
}

/// Quote asset selection for the symbol listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum QuoteFilter {
    Usdt,
    Usdc,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub base_asset: String,
    #[serde(default)]
    pub quote_asset: String,
    pub contract_type: ContractType,
    pub status: SymbolStatus,
}

impl SymbolInfo {
    pub fn is_tradable_perpetual(&self) -> bool {
        self.contract_type == ContractType::Perpetual && self.status == SymbolStatus::Trading
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub quote_volume: f64,
}

/// 24h rolling window statistics for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub symbol: String,
    pub last_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub volume: f64,
    pub quote_volume: f64,
    pub trade_count: u64,
    pub high_price: f64,
    pub low_price: f64,
    pub open_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSymbol {
    pub rank: usize,
    pub symbol: String,
    pub base_asset: String,
    pub last_price: f64,
    pub price_change_percent: f64,
    pub quote_volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub price_range_pct: f64,
    pub distance_from_high_pct: f64,
    pub avg_trade_size: f64,
    pub avg_hourly_volatility: f64,
    pub max_hourly_pump_pct: f64,
    pub volume_spike_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub symbol: String,
    pub current_price: f64,
    pub price_change_24h: f64,
    pub volume_24h: f64,
    pub quote_volume_24h: f64,
    pub trade_count_24h: u64,
    pub high_24h: f64,
    pub low_24h: f64,
    #[serde(flatten)]
    pub metrics: Metrics,
    pub pump_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtrReading {
    pub symbol: String,
    pub current_price: f64,
    pub atr: f64,
    pub atr_pct: f64,
    pub period: usize,
    pub multiplier: f64,
}

/// Result of processing one symbol inside a batch scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome<T> {
    Scored(T),
    Skipped { symbol: String, reason: String },
}

impl<T> ScanOutcome<T> {
    pub fn skipped(symbol: &str, reason: impl Into<String>) -> Self {
        ScanOutcome::Skipped {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    pub fn scored(self) -> Option<T> {
        match self {
            ScanOutcome::Scored(value) => Some(value),
            ScanOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ScanOutcome::Skipped { .. })
    }
}

/// Collected outcomes of a batch, split into kept values and skip reasons.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport<T> {
    pub results: Vec<T>,
    pub skipped: Vec<(String, String)>,
}

impl<T> ScanReport<T> {
    pub fn from_outcomes(outcomes: Vec<ScanOutcome<T>>) -> Self {
        let mut results = Vec::new();
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                ScanOutcome::Scored(value) => results.push(value),
                ScanOutcome::Skipped { symbol, reason } => skipped.push((symbol, reason)),
            }
        }
        Self { results, skipped }
    }
}
