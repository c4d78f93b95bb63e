use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use crate::error::{ScanError, ScanResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub request_delay_ms: u64, // pause before each per-symbol request
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub quote_asset: String,
    pub top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtrConfig {
    pub period: usize,
    pub multiplier: f64,
    pub interval: String,
    pub min_atr_pct: f64,
    pub extra_candles: usize, // fetched on top of period
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpConfig {
    pub min_score: f64,
    pub top_n: usize,
    pub min_price_change_pct: f64,
    pub interval: String,
    pub candle_limit: usize,
    pub excluded_symbols: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub exchange: ExchangeConfig,
    pub ranking: RankingConfig,
    pub atr: AtrConfig,
    pub pump: PumpConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            exchange: ExchangeConfig {
                base_url: "https://fapi.binance.com".to_string(),
                timeout_secs: 10,
                request_delay_ms: 100,
                concurrency: 1,
            },
            ranking: RankingConfig {
                quote_asset: "USDT".to_string(),
                top_n: 100,
            },
            atr: AtrConfig {
                period: 50,
                multiplier: 0.5,
                interval: "1m".to_string(),
                min_atr_pct: 0.2,
                extra_candles: 50,
            },
            pump: PumpConfig {
                min_score: 25.0,
                top_n: 25,
                min_price_change_pct: 5.0,
                interval: "1h".to_string(),
                candle_limit: 24,
                excluded_symbols: ["USDCUSDT", "TUSDUSDT", "BUSDUSDT", "FDUSDUSDT"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            output: OutputConfig {
                dir: ".".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> ScanResult<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ScanError::Configuration(format!("Invalid {}", name))),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> ScanResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables that are set.
    pub fn apply_env(&mut self) -> ScanResult<()> {
        if let Ok(url) = env::var("BINANCE_FAPI_URL") {
            self.exchange.base_url = url;
        }
        if let Some(v) = parse_var("HTTP_TIMEOUT_SECS")? {
            self.exchange.timeout_secs = v;
        }
        if let Some(v) = parse_var("REQUEST_DELAY_MS")? {
            self.exchange.request_delay_ms = v;
        }
        if let Some(v) = parse_var("FETCH_CONCURRENCY")? {
            self.exchange.concurrency = v;
        }

        if let Ok(quote) = env::var("QUOTE_ASSET") {
            self.ranking.quote_asset = quote.to_uppercase();
        }
        if let Some(v) = parse_var("RANK_TOP_N")? {
            self.ranking.top_n = v;
        }

        if let Some(v) = parse_var("ATR_PERIOD")? {
            self.atr.period = v;
        }
        if let Some(v) = parse_var("ATR_MULTIPLIER")? {
            self.atr.multiplier = v;
        }
        if let Ok(interval) = env::var("ATR_INTERVAL") {
            self.atr.interval = interval;
        }
        if let Some(v) = parse_var("ATR_MIN_PCT")? {
            self.atr.min_atr_pct = v;
        }

        if let Some(v) = parse_var("PUMP_MIN_SCORE")? {
            self.pump.min_score = v;
        }
        if let Some(v) = parse_var("PUMP_TOP_N")? {
            self.pump.top_n = v;
        }

        if let Ok(dir) = env::var("OUTPUT_DIR") {
            self.output.dir = dir;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: &str) -> ScanResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScanError::Configuration(format!("Failed to read config file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| ScanError::Configuration(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &str) -> ScanResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScanError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ScanError::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ScanResult<()> {
        url::Url::parse(&self.exchange.base_url)
            .map_err(|e| ScanError::Configuration(format!("Invalid base url {}: {}", self.exchange.base_url, e)))?;

        if self.exchange.timeout_secs == 0 {
            return Err(ScanError::Configuration("Timeout must be greater than 0".to_string()));
        }

        if self.exchange.concurrency == 0 {
            return Err(ScanError::Configuration("Concurrency must be greater than 0".to_string()));
        }

        if self.ranking.quote_asset.is_empty() {
            return Err(ScanError::Configuration("Quote asset cannot be empty".to_string()));
        }

        if self.atr.period == 0 {
            return Err(ScanError::Configuration("ATR period must be greater than 0".to_string()));
        }

        if self.atr.multiplier < 0.0 || !self.atr.multiplier.is_finite() {
            return Err(ScanError::Configuration("ATR multiplier must be a non-negative number".to_string()));
        }

        if self.atr.extra_candles == 0 {
            return Err(ScanError::Configuration("ATR needs at least one extra candle".to_string()));
        }

        // Binance caps klines at 1500 per request
        if self.atr_candle_limit() > 1500 {
            return Err(ScanError::Configuration("ATR period plus extra candles exceeds 1500".to_string()));
        }

        if self.pump.candle_limit == 0 || self.pump.candle_limit > 1500 {
            return Err(ScanError::Configuration("Pump candle limit must be between 1 and 1500".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ScanError::Configuration(format!("Invalid log level: {}", self.logging.level)));
        }

        Ok(())
    }

    /// Candles requested per symbol by the ATR scan.
    pub fn atr_candle_limit(&self) -> usize {
        self.atr.period + self.atr.extra_candles
    }
}
