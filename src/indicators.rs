use crate::data::Candle;
use crate::error::IndicatorError;

/// Volatility indicators over chronological candle series.
pub struct TechnicalIndicators;

impl TechnicalIndicators {
    /// Calculate Simple Moving Average (SMA)
    pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
        if period == 0 || values.len() < period {
            return Vec::new();
        }

        values
            .windows(period)
            .map(|w| w.iter().sum::<f64>() / period as f64)
            .collect()
    }

    /// True range of every candle that has a predecessor, so the output is one shorter than the input.
    pub fn true_ranges(candles: &[Candle]) -> Vec<f64> {
        candles
            .windows(2)
            .map(|pair| {
                let prev_close = pair[0].close;
                let c = &pair[1];
                let high_low = c.high - c.low;
                let high_close = (c.high - prev_close).abs();
                let low_close = (c.low - prev_close).abs();
                high_low.max(high_close).max(low_close)
            })
            .collect()
    }

    /// Average True Range as the simple mean of the last `period` true ranges.
    pub fn calculate_atr(candles: &[Candle], period: usize) -> Result<f64, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidPeriod(period));
        }

        let tr = Self::true_ranges(candles);
        Self::calculate_sma(&tr, period)
            .last()
            .copied()
            .ok_or(IndicatorError::InsufficientData {
                required: period + 1,
                available: candles.len(),
            })
    }

    /// ATR scaled by `multiplier` and expressed as a percentage of `current_price`.
    pub fn atr_percentage(atr: f64, current_price: f64, multiplier: f64) -> f64 {
        if current_price <= 0.0 {
            return 0.0;
        }
        (atr * multiplier / current_price) * 100.0
    }

    /// Mean absolute close-to-close change, in percent.
    pub fn avg_abs_change_pct(candles: &[Candle]) -> f64 {
        let changes: Vec<f64> = candles
            .windows(2)
            .filter(|pair| pair[0].close != 0.0)
            .map(|pair| ((pair[1].close - pair[0].close) / pair[0].close * 100.0).abs())
            .collect();

        if changes.is_empty() {
            return 0.0;
        }
        changes.iter().sum::<f64>() / changes.len() as f64
    }

    /// Largest rise from a close to the next candle's high, in percent, floored at zero.
    pub fn max_gap_up_pct(candles: &[Candle]) -> f64 {
        candles
            .windows(2)
            .filter(|pair| pair[0].close != 0.0)
            .map(|pair| (pair[1].high - pair[0].close) / pair[0].close * 100.0)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(i: i64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            open_time: Utc.timestamp_opt(1_700_000_000 + i * 60, 0).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1.0,
            quote_volume: close,
        }
    }

    fn flat(n: usize, price: f64) -> Vec<Candle> {
        (0..n).map(|i| candle(i as i64, price, price, price)).collect()
    }

    #[test]
    fn test_sma_calculations() {
        let prices = vec![5.0, 7.0, 13.0, 16.0, 18.0];
        let sma = TechnicalIndicators::calculate_sma(&prices, 5);
        assert_eq!(sma, vec![11.8]);
        assert!(TechnicalIndicators::calculate_sma(&prices, 6).is_empty());
        assert!(TechnicalIndicators::calculate_sma(&prices, 0).is_empty());
    }

    #[test]
    fn true_range_uses_previous_close_gap() {
        // gap up: prev close 10, candle 12..11 -> |12 - 10| = 2 beats 12 - 11 = 1
        let candles = vec![candle(0, 10.0, 9.0, 10.0), candle(1, 12.0, 11.0, 11.5)];
        assert_eq!(TechnicalIndicators::true_ranges(&candles), vec![2.0]);

        // gap down: prev close 10, candle 8..7 -> |7 - 10| = 3
        let candles = vec![candle(0, 10.0, 9.0, 10.0), candle(1, 8.0, 7.0, 7.5)];
        assert_eq!(TechnicalIndicators::true_ranges(&candles), vec![3.0]);
    }

    #[test]
    fn flat_series_has_zero_atr() {
        let candles = flat(30, 42.0);
        let atr = TechnicalIndicators::calculate_atr(&candles, 14).unwrap();
        assert_eq!(atr, 0.0);
        assert_eq!(TechnicalIndicators::atr_percentage(atr, 42.0, 1.5), 0.0);
    }

    #[test]
    fn atr_averages_only_the_most_recent_period() {
        let candles = vec![
            candle(0, 10.0, 10.0, 10.0),
            candle(1, 20.0, 10.0, 10.0), // tr 10, outside the window
            candle(2, 11.0, 10.0, 10.0), // tr 1
            candle(3, 13.0, 10.0, 10.0), // tr 3
        ];
        let atr = TechnicalIndicators::calculate_atr(&candles, 2).unwrap();
        assert!((atr - 2.0).abs() < 1e-12);
    }

    #[test]
    fn insufficient_candles_are_reported_not_zeroed() {
        let candles = flat(14, 5.0);
        let err = TechnicalIndicators::calculate_atr(&candles, 14).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                required: 15,
                available: 14
            }
        );
        assert!(TechnicalIndicators::calculate_atr(&[], 1).is_err());
    }

    #[test]
    fn exactly_period_plus_one_candles_is_enough() {
        let candles = vec![candle(0, 10.0, 10.0, 10.0), candle(1, 12.0, 9.0, 11.0)];
        assert_eq!(TechnicalIndicators::calculate_atr(&candles, 1), Ok(3.0));
        assert_eq!(
            TechnicalIndicators::calculate_atr(&candles[..1], 1),
            Err(IndicatorError::InsufficientData {
                required: 2,
                available: 1
            })
        );
    }

    #[test]
    fn zero_period_is_rejected() {
        let candles = flat(5, 5.0);
        assert_eq!(
            TechnicalIndicators::calculate_atr(&candles, 0),
            Err(IndicatorError::InvalidPeriod(0))
        );
    }

    #[test]
    fn atr_is_deterministic() {
        let candles: Vec<Candle> = (0..60)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.37).sin() * 3.0;
                candle(i, base + 0.9, base - 1.1, base + 0.05)
            })
            .collect();
        let a = TechnicalIndicators::calculate_atr(&candles, 21).unwrap();
        let b = TechnicalIndicators::calculate_atr(&candles, 21).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
        assert!(a > 0.0);
    }

    #[test]
    fn atr_percentage_guards_non_positive_price() {
        assert_eq!(TechnicalIndicators::atr_percentage(2.0, 0.0, 1.0), 0.0);
        assert_eq!(TechnicalIndicators::atr_percentage(2.0, -5.0, 1.0), 0.0);
        assert!((TechnicalIndicators::atr_percentage(2.0, 100.0, 0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hourly_change_helpers() {
        let candles = vec![
            candle(0, 100.0, 100.0, 100.0),
            candle(1, 130.0, 100.0, 110.0),
            candle(2, 112.0, 95.0, 99.0),
        ];
        // |+10%| and |-10%|
        assert!((TechnicalIndicators::avg_abs_change_pct(&candles) - 10.0).abs() < 1e-9);
        // 130 vs 100 -> 30%, 112 vs 110 -> ~1.8%
        assert!((TechnicalIndicators::max_gap_up_pct(&candles) - 30.0).abs() < 1e-9);
        assert_eq!(TechnicalIndicators::max_gap_up_pct(&candles[..1]), 0.0);
        assert_eq!(TechnicalIndicators::avg_abs_change_pct(&[]), 0.0);
    }
}
