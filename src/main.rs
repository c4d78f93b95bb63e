use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use futures_screener::data::QuoteFilter;
use futures_screener::data_manager::DataManager;
use futures_screener::utils::{atr_file_name, pump_file_name, symbols_file_name};
use futures_screener::{report, AppConfig, BinanceFuturesClient, ScanEngine};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "futures_screener")]
#[command(about = "Screens USD-M futures by volume, ATR and pump score", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file; environment variables apply when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List active perpetual symbols and save them as a watch-list
    Symbols {
        #[arg(short, long, value_enum, default_value = "usdt")]
        quote: QuoteFilter,

        /// Output file name; rejected with `--quote both`
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Rank perpetuals by 24h quote volume
    Rank {
        #[arg(short, long)]
        top: Option<usize>,

        #[arg(short, long, default_value = "binance_top_volume.txt")]
        output: String,
    },

    /// Scan perpetuals for ATR as a percentage of price
    Atr {
        #[arg(long)]
        period: Option<usize>,

        #[arg(long)]
        multiplier: Option<f64>,

        /// Kline interval (1m, 5m, 15m, 1h, 4h, 1d)
        #[arg(long)]
        interval: Option<String>,

        /// Minimum ATR percentage to keep
        #[arg(long)]
        min_pct: Option<f64>,

        #[arg(short, long)]
        output: Option<String>,
    },

    /// Find recently pumped coins
    Pump {
        #[arg(long)]
        min_score: Option<f64>,

        #[arg(short, long)]
        top: Option<usize>,

        #[arg(short, long)]
        output: Option<String>,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };

    if let Some(level) = &cli.log_level {
        config.logging.level = level.to_lowercase();
    }

    match &cli.command {
        Commands::Rank { top: Some(n), .. } => config.ranking.top_n = *n,
        Commands::Atr { period, multiplier, interval, min_pct, .. } => {
            if let Some(p) = period {
                config.atr.period = *p;
            }
            if let Some(m) = multiplier {
                config.atr.multiplier = *m;
            }
            if let Some(i) = interval {
                config.atr.interval = i.clone();
            }
            if let Some(m) = min_pct {
                config.atr.min_atr_pct = *m;
            }
        }
        Commands::Pump { min_score, top, .. } => {
            if let Some(s) = min_score {
                config.pump.min_score = *s;
            }
            if let Some(t) = top {
                config.pump.top_n = *t;
            }
        }
        _ => {}
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let level = Level::from_str(&config.logging.level).unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let client = BinanceFuturesClient::new(&config.exchange)?;
    let output = DataManager::new(&config.output.dir)?;
    let engine = ScanEngine::new(client, config);

    match cli.command {
        Commands::Symbols { quote, output: file } => {
            let quotes: &[&str] = match quote {
                QuoteFilter::Usdt => &["USDT"],
                QuoteFilter::Usdc => &["USDC"],
                QuoteFilter::Both => &["USDT", "USDC"],
            };
            // reject a shared --output before any request goes out
            symbols_file_name(quotes[0], quotes.len(), file.as_deref())?;
            let listings = engine
                .perpetual_symbols(quotes)
                .await
                .context("Failed to fetch exchange info")?;

            for (quote, symbols) in &listings {
                let name = symbols_file_name(quote, listings.len(), file.as_deref())?;
                info!("Found {} active {} perpetual futures", symbols.len(), quote);
                output.save_watchlist(&name, symbols)?;
            }
        }

        Commands::Rank { output: file, .. } => {
            let ranked = engine
                .top_by_volume(engine.config.ranking.top_n)
                .await
                .context("Failed to fetch 24hr tickers")?;
            print!("{}", report::volume_table(&ranked));

            let symbols: Vec<String> = ranked.into_iter().map(|r| r.symbol).collect();
            output.save_watchlist(&file, &symbols)?;
        }

        Commands::Atr { output: file, .. } => {
            let scan = engine.scan_atr().await.context("ATR scan failed")?;
            print!("{}", report::atr_table(&scan.results, engine.config.atr.min_atr_pct));

            if scan.results.is_empty() {
                info!("No results to save.");
            } else {
                let name = file.unwrap_or_else(|| atr_file_name(Utc::now()));
                let symbols: Vec<String> = scan.results.into_iter().map(|r| r.symbol).collect();
                output.save_watchlist(&name, &symbols)?;
            }
        }

        Commands::Pump { output: file, .. } => {
            let scan = engine.find_pumped().await.context("Pump scan failed")?;
            print!("{}", report::pump_table(&scan.results));

            let name = file.unwrap_or_else(|| pump_file_name(Utc::now()));
            output.save_json(&name, &scan.results)?;
        }
    }

    Ok(())
}
