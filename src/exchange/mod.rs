use async_trait::async_trait;
use crate::data::{Candle, SymbolInfo, TickerSnapshot};
use crate::error::ScanResult;

/// Read-only market data the scanner depends on. Injected so scans can run
/// against the live exchange or an in-memory fixture.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn exchange_info(&self) -> ScanResult<Vec<SymbolInfo>>;
    async fn ticker_24h(&self) -> ScanResult<Vec<TickerSnapshot>>;
    /// Most recent `limit` candles, oldest first.
    async fn klines(&self, symbol: &str, interval: &str, limit: usize) -> ScanResult<Vec<Candle>>;
}
