use crate::data::{Candle, Metrics, ScoredResult, TickerSnapshot};
use crate::indicators::TechnicalIndicators;
use crate::ranking::descending;

/// Candles in the volume spike window: the last `SPIKE_RECENT` against the `SPIKE_BASELINE` before them.
pub const SPIKE_WINDOW: usize = 24;
pub const SPIKE_RECENT: usize = 6;
pub const SPIKE_BASELINE: usize = SPIKE_WINDOW - SPIKE_RECENT;

/// Quote volume under which a score is halved.
pub const MIN_LIQUID_QUOTE_VOLUME: f64 = 1_000_000.0;

pub struct PumpScorer;

impl PumpScorer {
    /// Derive the scoring metrics for one symbol from its 24h ticker and hourly candles.
    pub fn metrics(ticker: &TickerSnapshot, candles: &[Candle]) -> Metrics {
        let price_range_pct = if ticker.low_price > 0.0 {
            (ticker.high_price - ticker.low_price) / ticker.low_price * 100.0
        } else {
            0.0
        };
        let distance_from_high_pct = if ticker.high_price > 0.0 {
            (ticker.high_price - ticker.last_price) / ticker.high_price * 100.0
        } else {
            0.0
        };
        let avg_trade_size = if ticker.trade_count > 0 {
            ticker.quote_volume / ticker.trade_count as f64
        } else {
            0.0
        };

        Metrics {
            price_range_pct,
            distance_from_high_pct,
            avg_trade_size,
            avg_hourly_volatility: TechnicalIndicators::avg_abs_change_pct(candles),
            max_hourly_pump_pct: TechnicalIndicators::max_gap_up_pct(candles),
            volume_spike_ratio: Self::volume_spike_ratio(candles),
        }
    }

    /// Recent volume against a baseline rescaled to the same number of candles.
    pub fn volume_spike_ratio(candles: &[Candle]) -> f64 {
        if candles.len() < SPIKE_WINDOW {
            return 0.0;
        }
        let window = &candles[candles.len() - SPIKE_WINDOW..];
        let (baseline, recent) = window.split_at(SPIKE_BASELINE);

        let recent_volume: f64 = recent.iter().map(|c| c.volume).sum();
        let previous_volume: f64 = baseline.iter().map(|c| c.volume).sum();
        let scale = (SPIKE_BASELINE / SPIKE_RECENT) as f64;

        if previous_volume > 0.0 {
            recent_volume / (previous_volume / scale)
        } else {
            0.0
        }
    }

    pub fn score(price_change_percent: f64, quote_volume: f64, metrics: &Metrics) -> f64 {
        let mut score: f64 = match price_change_percent {
            p if p > 50.0 => 40.0,
            p if p > 30.0 => 30.0,
            p if p > 15.0 => 20.0,
            p if p > 5.0 => 10.0,
            _ => 0.0,
        };

        score += match metrics.volume_spike_ratio {
            v if v > 5.0 => 25.0,
            v if v > 3.0 => 20.0,
            v if v > 2.0 => 15.0,
            v if v > 1.5 => 10.0,
            _ => 0.0,
        };

        score += match metrics.max_hourly_pump_pct {
            m if m > 20.0 => 20.0,
            m if m > 15.0 => 15.0,
            m if m > 10.0 => 10.0,
            m if m > 5.0 => 5.0,
            _ => 0.0,
        };

        // already dumped from the high
        score *= match metrics.distance_from_high_pct {
            d if d > 30.0 => 0.5,
            d if d > 20.0 => 0.7,
            d if d > 10.0 => 0.85,
            _ => 1.0,
        };

        if quote_volume < MIN_LIQUID_QUOTE_VOLUME {
            score *= 0.5;
        }

        (score * 100.0).round() / 100.0
    }

    pub fn evaluate(ticker: &TickerSnapshot, candles: &[Candle]) -> ScoredResult {
        let metrics = Self::metrics(ticker, candles);
        let pump_score = Self::score(ticker.price_change_percent, ticker.quote_volume, &metrics);

        ScoredResult {
            symbol: ticker.symbol.clone(),
            current_price: ticker.last_price,
            price_change_24h: ticker.price_change_percent,
            volume_24h: ticker.volume,
            quote_volume_24h: ticker.quote_volume,
            trade_count_24h: ticker.trade_count,
            high_24h: ticker.high_price,
            low_24h: ticker.low_price,
            metrics,
            pump_score,
        }
    }

    /// Stable sort by score, highest first.
    pub fn rank(results: &mut [ScoredResult]) {
        results.sort_by(|a, b| descending(a.pump_score, b.pump_score));
    }
}
