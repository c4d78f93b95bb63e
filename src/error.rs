use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Exchange API error: {0}")]
    ExchangeApi(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Invalid market data: {0}")]
    InvalidMarketData(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<reqwest::Error> for ScanError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScanError::Network(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            ScanError::Network(format!("Connection error: {}", err))
        } else if err.is_decode() {
            ScanError::InvalidMarketData(format!("Response decode error: {}", err))
        } else {
            ScanError::Network(format!("HTTP error: {}", err))
        }
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(err: serde_json::Error) -> Self {
        ScanError::InvalidMarketData(format!("JSON parsing error: {}", err))
    }
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Output(format!("I/O error: {}", err))
    }
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Failures of the indicator math that must not be mistaken for a computed zero.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} candles, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid period: {0}")]
    InvalidPeriod(usize),
}

impl ScanError {
    /// Short label used when a symbol is skipped.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::ExchangeApi(_) => "exchange_api",
            ScanError::Network(_) => "network",
            ScanError::RateLimit(_) => "rate_limit",
            ScanError::InvalidMarketData(_) => "invalid_market_data",
            ScanError::Configuration(_) => "configuration",
            ScanError::Output(_) => "output",
        }
    }
}
