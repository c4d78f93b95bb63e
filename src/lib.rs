//! Futures market screener: volume ranking, ATR scan and pump scoring over
//! public USD-M futures market data, with TradingView watch-list output.

pub mod config;
pub mod data;
pub mod data_manager;
pub mod engine;
pub mod error;
pub mod exchange;
pub mod indicators;
pub mod pump;
pub mod ranking;
pub mod report;
pub mod rest_client;
pub mod utils;


pub use config::AppConfig;
pub use data::{AtrReading, Candle, Metrics, ScanOutcome, ScanReport, ScoredResult, TickerSnapshot};
pub use engine::ScanEngine;
pub use error::{IndicatorError, ScanError, ScanResult};
pub use exchange::MarketDataSource;
pub use indicators::TechnicalIndicators;
pub use pump::PumpScorer;
pub use rest_client::BinanceFuturesClient;
