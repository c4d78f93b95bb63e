use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::config::ExchangeConfig;
use crate::data::{Candle, SymbolInfo, TickerSnapshot};
use crate::error::{ScanError, ScanResult};
use crate::exchange::MarketDataSource;

/// Public USD-M futures REST endpoints. No credentials are needed.
pub struct BinanceFuturesClient {
    pub client: Client,
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTicker {
    symbol: String,
    #[serde(deserialize_with = "de_f64")]
    last_price: f64,
    #[serde(deserialize_with = "de_f64")]
    price_change: f64,
    #[serde(deserialize_with = "de_f64")]
    price_change_percent: f64,
    #[serde(deserialize_with = "de_f64")]
    volume: f64,
    #[serde(deserialize_with = "de_f64")]
    quote_volume: f64,
    count: u64,
    #[serde(deserialize_with = "de_f64")]
    high_price: f64,
    #[serde(deserialize_with = "de_f64")]
    low_price: f64,
    #[serde(deserialize_with = "de_f64")]
    open_price: f64,
}

impl From<RawTicker> for TickerSnapshot {
    fn from(raw: RawTicker) -> Self {
        Self {
            symbol: raw.symbol,
            last_price: raw.last_price,
            price_change: raw.price_change,
            price_change_percent: raw.price_change_percent,
            volume: raw.volume,
            quote_volume: raw.quote_volume,
            trade_count: raw.count,
            high_price: raw.high_price,
            low_price: raw.low_price,
            open_price: raw.open_price,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

impl BinanceFuturesClient {
    pub fn new(cfg: &ExchangeConfig) -> ScanResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> ScanResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_response(status, &body));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl MarketDataSource for BinanceFuturesClient {
    async fn exchange_info(&self) -> ScanResult<Vec<SymbolInfo>> {
        let json = self.get_json("/fapi/v1/exchangeInfo", &[]).await?;
        let info: ExchangeInfo = serde_json::from_value(json)?;
        Ok(info.symbols)
    }

    async fn ticker_24h(&self) -> ScanResult<Vec<TickerSnapshot>> {
        let json = self.get_json("/fapi/v1/ticker/24hr", &[]).await?;
        parse_tickers(json)
    }

    async fn klines(&self, symbol: &str, interval: &str, limit: usize) -> ScanResult<Vec<Candle>> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        let json = self.get_json("/fapi/v1/klines", &query).await?;
        parse_klines(&json)
    }
}

pub(crate) fn map_error_response(status: StatusCode, body: &str) -> ScanError {
    let detail = match serde_json::from_str::<ApiError>(body) {
        Ok(api) => format!("{} (code {})", api.msg, api.code),
        Err(_) => body.to_string(),
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::IM_A_TEAPOT => {
            ScanError::RateLimit(format!("HTTP {}: {}", status.as_u16(), detail))
        }
        _ => ScanError::ExchangeApi(format!("HTTP {}: {}", status.as_u16(), detail)),
    }
}

pub(crate) fn parse_tickers(json: Value) -> ScanResult<Vec<TickerSnapshot>> {
    let raw: Vec<RawTicker> = serde_json::from_value(json)?;
    Ok(raw.into_iter().map(TickerSnapshot::from).collect())
}

/// Klines arrive as positional arrays:
/// `[open_time, open, high, low, close, volume, close_time, quote_volume, ...]`.
pub(crate) fn parse_klines(json: &Value) -> ScanResult<Vec<Candle>> {
    let rows = json
        .as_array()
        .ok_or_else(|| ScanError::InvalidMarketData("Kline response is not an array".to_string()))?;

    let mut candles = Vec::with_capacity(rows.len());
    for row in rows {
        let arr = row
            .as_array()
            .filter(|a| a.len() >= 8)
            .ok_or_else(|| ScanError::InvalidMarketData(format!("Malformed kline row: {}", row)))?;

        let open_ms = arr[0]
            .as_i64()
            .ok_or_else(|| ScanError::InvalidMarketData("Kline open time is not an integer".to_string()))?;
        let open_time = DateTime::from_timestamp_millis(open_ms)
            .ok_or_else(|| ScanError::InvalidMarketData(format!("Kline open time out of range: {}", open_ms)))?;

        candles.push(Candle {
            open_time,
            open: value_f64(&arr[1])?,
            high: value_f64(&arr[2])?,
            low: value_f64(&arr[3])?,
            close: value_f64(&arr[4])?,
            volume: value_f64(&arr[5])?,
            quote_volume: value_f64(&arr[7])?,
        });
    }

    candles.sort_by_key(|c| c.open_time);
    Ok(candles)
}

fn value_f64(v: &Value) -> ScanResult<f64> {
    match v {
        Value::String(s) => f64::from_str(s)
            .map_err(|_| ScanError::InvalidMarketData(format!("Invalid number string: {}", s))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ScanError::InvalidMarketData(format!("Invalid number: {}", n))),
        other => Err(ScanError::InvalidMarketData(format!("Expected number, got {}", other))),
    }
}

fn de_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumberVisitor;

    impl<'de> Visitor<'de> for NumberVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_str<E: de::Error>(self, s: &str) -> Result<f64, E> {
            f64::from_str(s).map_err(|_| E::custom(format!("Invalid numeric string: {}", s)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }
    }

    deserializer.deserialize_any(NumberVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_string_encoded_tickers() {
        let body = json!([{
            "symbol": "BTCUSDT",
            "priceChange": "-94.99999800",
            "priceChangePercent": "-1.960",
            "weightedAvgPrice": "0.29628482",
            "lastPrice": "4.00000200",
            "lastQty": "200.00000000",
            "openPrice": "99.00000000",
            "highPrice": "100.00000000",
            "lowPrice": "0.10000000",
            "volume": "8913.30000000",
            "quoteVolume": "15.30000000",
            "openTime": 1499783499040i64,
            "closeTime": 1499869899040i64,
            "firstId": 28385,
            "lastId": 28460,
            "count": 76
        }]);
        let tickers = parse_tickers(body).unwrap();
        assert_eq!(tickers.len(), 1);
        let t = &tickers[0];
        assert_eq!(t.symbol, "BTCUSDT");
        assert_eq!(t.trade_count, 76);
        assert!((t.last_price - 4.000002).abs() < 1e-12);
        assert!((t.price_change_percent + 1.96).abs() < 1e-12);
        assert!((t.quote_volume - 15.3).abs() < 1e-12);
    }

    #[test]
    fn parses_number_encoded_tickers() {
        let body = json!([{
            "symbol": "ETHUSDT",
            "priceChange": -12.5,
            "priceChangePercent": -0.5,
            "lastPrice": 2487,
            "openPrice": 2499.5,
            "highPrice": 2510,
            "lowPrice": 2450.25,
            "volume": 1200,
            "quoteVolume": 2984400.75,
            "count": 9000
        }]);
        let t = &parse_tickers(body).unwrap()[0];
        assert_eq!(t.last_price, 2487.0);
        assert_eq!(t.price_change, -12.5);
        assert_eq!(t.high_price, 2510.0);
        assert_eq!(t.quote_volume, 2984400.75);
        assert_eq!(t.trade_count, 9000);
    }

    #[test]
    fn rejects_non_numeric_ticker_fields() {
        let body = json!([{
            "symbol": "BTCUSDT",
            "priceChange": "x",
            "priceChangePercent": "0",
            "lastPrice": "1",
            "openPrice": "1",
            "highPrice": "1",
            "lowPrice": "1",
            "volume": "1",
            "quoteVolume": "1",
            "count": 1
        }]);
        assert!(matches!(parse_tickers(body), Err(ScanError::InvalidMarketData(_))));
    }

    #[test]
    fn parses_klines_oldest_first() {
        let body = json!([
            [1700003600000i64, "2.0", "2.5", "1.9", "2.4", "300", 1700007199999i64, "720", 10, "1", "1", "0"],
            [1700000000000i64, "1.0", "2.1", "0.9", "2.0", "100", 1700003599999i64, "150", 5, "1", "1", "0"]
        ]);
        let candles = parse_klines(&body).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open_time.timestamp_millis(), 1700000000000);
        assert_eq!(candles[0].close, 2.0);
        assert_eq!(candles[1].high, 2.5);
        assert_eq!(candles[1].quote_volume, 720.0);
    }

    #[test]
    fn parses_number_encoded_klines() {
        let body = json!([
            [1700000000000i64, 1.5, 2, 1.25, 1.75, 400, 1700003599999i64, 700.5, 12, 1, 1, 0]
        ]);
        let candles = parse_klines(&body).unwrap();
        assert_eq!(candles[0].open, 1.5);
        assert_eq!(candles[0].high, 2.0);
        assert_eq!(candles[0].volume, 400.0);
        assert_eq!(candles[0].quote_volume, 700.5);

        let bad = json!([[1700000000000i64, true, 2, 1, 1, 1, 0, 1, 1, 1, 1, 0]]);
        assert!(matches!(parse_klines(&bad), Err(ScanError::InvalidMarketData(_))));
    }

    #[test]
    fn malformed_kline_rows_are_invalid_data() {
        let short_row = json!([[1700000000000i64, "1.0", "2.0"]]);
        assert!(matches!(parse_klines(&short_row), Err(ScanError::InvalidMarketData(_))));
        assert!(parse_klines(&json!({"code": -1})).is_err());
    }

    #[test]
    fn error_responses_map_to_scan_errors() {
        let err = map_error_response(
            StatusCode::BAD_REQUEST,
            r#"{"code":-1121,"msg":"Invalid symbol."}"#,
        );
        match err {
            ScanError::ExchangeApi(msg) => {
                assert!(msg.contains("Invalid symbol."));
                assert!(msg.contains("-1121"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = map_error_response(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, ScanError::RateLimit(_)));
    }

    #[test]
    fn exchange_info_symbols_deserialize() {
        let body = json!({
            "timezone": "UTC",
            "symbols": [
                {"symbol": "BTCUSDT", "baseAsset": "BTC", "quoteAsset": "USDT", "contractType": "PERPETUAL", "status": "TRADING"},
                {"symbol": "BTCUSDT_250328", "baseAsset": "BTC", "quoteAsset": "USDT", "contractType": "CURRENT_QUARTER", "status": "TRADING"},
                {"symbol": "XYZUSDT", "baseAsset": "XYZ", "quoteAsset": "USDT", "contractType": "TRADIFI_PERPETUAL", "status": "SETTLING"}
            ]
        });
        let info: ExchangeInfo = serde_json::from_value(body).unwrap();
        assert_eq!(info.symbols.len(), 3);
        assert!(info.symbols[0].is_tradable_perpetual());
        assert!(!info.symbols[1].is_tradable_perpetual());
        assert!(!info.symbols[2].is_tradable_perpetual());
    }
}
