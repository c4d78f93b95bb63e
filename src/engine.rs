use std::time::Duration;

use futures_util::{stream, StreamExt};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::data::{AtrReading, Candle, RankedSymbol, ScanOutcome, ScanReport, ScoredResult};
use crate::error::{ScanError, ScanResult};
use crate::exchange::MarketDataSource;
use crate::indicators::TechnicalIndicators;
use crate::pump::PumpScorer;
use crate::ranking::{descending, top_by_quote_volume, SymbolUniverse};

const PROGRESS_EVERY: usize = 50;

/// Runs the screener commands against an injected market data source.
pub struct ScanEngine<C: MarketDataSource> {
    pub client: C,
    pub config: AppConfig,
}

impl<C: MarketDataSource> ScanEngine<C> {
    pub fn new(client: C, config: AppConfig) -> Self {
        Self { client, config }
    }

    /// Active perpetuals for each quote asset, from a single exchange-info call.
    pub async fn perpetual_symbols(&self, quotes: &[&str]) -> ScanResult<Vec<(String, Vec<String>)>> {
        let infos = self.client.exchange_info().await?;
        debug!("Exchange info returned {} symbols", infos.len());

        Ok(quotes
            .iter()
            .map(|quote| {
                let universe = SymbolUniverse::new(quote, &[]);
                (universe.quote.clone(), universe.perpetuals(&infos))
            })
            .collect())
    }

    pub async fn top_by_volume(&self, top_n: usize) -> ScanResult<Vec<RankedSymbol>> {
        info!("Fetching 24hr ticker statistics...");
        let tickers = self.client.ticker_24h().await?;
        let universe = SymbolUniverse::new(&self.config.ranking.quote_asset, &[]);
        let candidates = universe.tickers(&tickers);

        Ok(top_by_quote_volume(&candidates, &universe.quote, top_n))
    }

    /// ATR percentage of every active perpetual, keeping those at or above the configured minimum.
    pub async fn scan_atr(&self) -> ScanResult<ScanReport<AtrReading>> {
        let atr = &self.config.atr;
        let quote = self.config.ranking.quote_asset.as_str();
        let symbols = self
            .perpetual_symbols(&[quote])
            .await?
            .into_iter()
            .flat_map(|(_, symbols)| symbols)
            .collect::<Vec<_>>();
        info!("Found {} active symbols", symbols.len());

        let fetched = self
            .fetch_candles(symbols, &atr.interval, self.config.atr_candle_limit())
            .await?;

        let outcomes = fetched
            .into_iter()
            .map(|(symbol, candles)| match candles {
                Ok(candles) => atr_reading(&symbol, &candles, atr.period, atr.multiplier),
                Err(e) => ScanOutcome::skipped(&symbol, format!("{}: {}", e.kind(), e)),
            })
            .collect();

        let mut report = ScanReport::from_outcomes(outcomes);
        report.results.retain(|r| r.atr_pct >= atr.min_atr_pct);
        report.results.sort_by(|a, b| descending(a.atr_pct, b.atr_pct));
        log_skips(&report.skipped);
        Ok(report)
    }

    /// Score symbols that moved up more than the prefilter threshold and keep the top scorers.
    pub async fn find_pumped(&self) -> ScanResult<ScanReport<ScoredResult>> {
        let pump = &self.config.pump;

        info!("Fetching 24h ticker data...");
        let tickers = self.client.ticker_24h().await?;
        let universe = SymbolUniverse::new(&self.config.ranking.quote_asset, &pump.excluded_symbols);
        let tickers = universe.tickers(&tickers);
        info!("Analyzing {} symbols...", tickers.len());

        let candidates: Vec<_> = tickers
            .into_iter()
            .filter(|t| t.price_change_percent > pump.min_price_change_pct)
            .collect();
        info!(
            "Found {} coins with >{}% gains, analyzing in detail...",
            candidates.len(),
            pump.min_price_change_pct
        );

        let symbols = candidates.iter().map(|t| t.symbol.clone()).collect();
        let fetched = self
            .fetch_candles(symbols, &pump.interval, pump.candle_limit)
            .await?;

        let outcomes = candidates
            .iter()
            .zip(fetched)
            .map(|(ticker, (symbol, candles))| match candles {
                Ok(candles) if candles.is_empty() => ScanOutcome::skipped(&symbol, "no candle data"),
                Ok(candles) => ScanOutcome::Scored(PumpScorer::evaluate(ticker, &candles)),
                Err(e) => ScanOutcome::skipped(&symbol, format!("{}: {}", e.kind(), e)),
            })
            .collect();

        let mut report = ScanReport::from_outcomes(outcomes);
        report.results.retain(|r| r.pump_score >= pump.min_score);
        PumpScorer::rank(&mut report.results);
        report.results.truncate(pump.top_n);
        log_skips(&report.skipped);
        Ok(report)
    }

    /// Klines for each symbol, in input order. Failures stay attached to their symbol,
    /// except a rate limit, which stops the batch before more requests go out.
    async fn fetch_candles(
        &self,
        symbols: Vec<String>,
        interval: &str,
        limit: usize,
    ) -> ScanResult<Vec<(String, ScanResult<Vec<Candle>>)>> {
        let total = symbols.len();
        let delay = Duration::from_millis(self.config.exchange.request_delay_ms);
        let concurrency = self.config.exchange.concurrency.max(1);

        let mut done = 0;
        let mut out = Vec::with_capacity(total);
        let mut pending = Box::pin(
            stream::iter(symbols)
                .map(|symbol| async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let candles = self.client.klines(&symbol, interval, limit).await;
                    (symbol, candles)
                })
                .buffered(concurrency),
        );

        while let Some((symbol, candles)) = pending.next().await {
            if let Err(ScanError::RateLimit(msg)) = candles {
                warn!("Rate limited at {} after {}/{} symbols, stopping", symbol, done, total);
                return Err(ScanError::RateLimit(msg));
            }
            done += 1;
            if done % PROGRESS_EVERY == 0 {
                info!("Processed {}/{} symbols...", done, total);
            }
            out.push((symbol, candles));
        }
        Ok(out)
    }
}

/// ATR reading for one symbol, or the reason it could not be computed.
pub fn atr_reading(symbol: &str, candles: &[Candle], period: usize, multiplier: f64) -> ScanOutcome<AtrReading> {
    let atr = match TechnicalIndicators::calculate_atr(candles, period) {
        Ok(atr) => atr,
        Err(e) => return ScanOutcome::skipped(symbol, e.to_string()),
    };
    // calculate_atr guarantees at least period + 1 candles
    let current_price = candles[candles.len() - 1].close;

    ScanOutcome::Scored(AtrReading {
        symbol: symbol.to_string(),
        current_price,
        atr,
        atr_pct: TechnicalIndicators::atr_percentage(atr, current_price, multiplier),
        period,
        multiplier,
    })
}

fn log_skips(skipped: &[(String, String)]) {
    for (symbol, reason) in skipped {
        warn!("Skipped {}: {}", symbol, reason);
    }
}
