//! CLI definition and dispatch.
//!
//! Every command prints one JSON [`ApiResponse`] envelope to stdout and maps
//! failures to the exit codes of [`TickerfolioError`]. Progress goes to the
//! tracing subscriber on stderr.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::{CsvLedgerAdapter, CsvPriceAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{self, AnalysisParams, PortfolioAnalysis};
use crate::domain::batch::{compute_batch, indicator_history, IndicatorRequest};
use crate::domain::config_validation::validate_config;
use crate::domain::error::TickerfolioError;
use crate::domain::indicator::{IndicatorParams, IndicatorSet};
use crate::domain::ledger::apply_all;
use crate::domain::price::PriceSeries;
use crate::domain::quote::{self, price_maps, Quote};
use crate::domain::signal::{self, IndicatorSignal, Recommendation};
use crate::domain::snapshot::{compose, PortfolioSnapshot};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::price_port::PricePort;

#[derive(Parser, Debug)]
#[command(name = "tickerfolio", about = "Portfolio and technical-indicator analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the indicator set for one or more symbols
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long = "symbol", required = true)]
        symbols: Vec<String>,
        /// Last date to include (YYYY-MM-DD); defaults to the latest bar
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Emit the indicator set for every bar instead of one as-of point
        #[arg(long)]
        history: bool,
    },
    /// Latest price and daily change for a symbol
    Quote {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// Trend-based buy/sell/hold recommendation for a symbol
    Recommend {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// Value the ledger's holdings at the latest prices
    Snapshot {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Snapshot plus sector, risk and performance analysis
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Check configuration, ledger and price files
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// JSON envelope written to stdout by every command.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndicatorReport {
    #[serde(flatten)]
    pub indicators: IndicatorSet,
    pub signals: Vec<IndicatorSignal>,
}

#[derive(Debug, Serialize)]
pub struct HistoryReport {
    pub symbol: String,
    pub history: Vec<IndicatorSet>,
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub symbols: usize,
    pub transactions: usize,
    pub open_holdings: usize,
}

/// Paths and benchmark read from the `[data]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub prices_dir: PathBuf,
    pub ledger: PathBuf,
    pub benchmark: Option<String>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Indicators {
            config,
            symbols,
            as_of,
            history,
        } => {
            if history {
                emit(run_history(&config, &symbols))
            } else {
                emit(run_indicators(&config, &symbols, as_of))
            }
        }
        Command::Quote { config, symbol } => emit(run_quote(&config, &symbol)),
        Command::Recommend { config, symbol } => emit(run_recommend(&config, &symbol)),
        Command::Snapshot { config } => emit(run_snapshot(&config)),
        Command::Analyze { config } => emit(run_analyze(&config)),
        Command::Validate { config } => emit(run_validate(&config)),
    }
}

fn emit<T: Serialize>(result: Result<T, TickerfolioError>) -> ExitCode {
    let (response, code) = match result {
        Ok(data) => (ApiResponse::ok(data), ExitCode::SUCCESS),
        Err(e) => {
            error!("{e}");
            (ApiResponse::err(e.to_string()), ExitCode::from(&e))
        }
    };

    match serde_json::to_string_pretty(&response) {
        Ok(json) => {
            println!("{json}");
            code
        }
        Err(e) => {
            error!("failed to serialize response: {e}");
            ExitCode::from(1)
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TickerfolioError> {
    info!("Loading config from {}", path.display());
    let adapter =
        FileConfigAdapter::from_file(path).map_err(|e| TickerfolioError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
    validate_config(&adapter)?;
    Ok(adapter)
}

pub fn build_data_config(config: &dyn ConfigPort) -> Result<DataConfig, TickerfolioError> {
    let required = |key: &str| {
        config
            .get_string("data", key)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| TickerfolioError::ConfigMissing {
                section: "data".into(),
                key: key.into(),
            })
    };

    Ok(DataConfig {
        prices_dir: PathBuf::from(required("prices_dir")?),
        ledger: PathBuf::from(required("ledger")?),
        benchmark: config
            .get_string("data", "benchmark")
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty()),
    })
}

pub fn build_indicator_params(config: &dyn ConfigPort) -> IndicatorParams {
    let d = IndicatorParams::default();
    let period = |key: &str, default: usize| {
        config.get_int("indicators", key, default as i64).max(0) as usize
    };

    IndicatorParams {
        sma_period: period("sma_period", d.sma_period),
        ema_period: period("ema_period", d.ema_period),
        rsi_period: period("rsi_period", d.rsi_period),
        macd_fast: period("macd_fast", d.macd_fast),
        macd_slow: period("macd_slow", d.macd_slow),
        macd_signal: period("macd_signal", d.macd_signal),
        bollinger_period: period("bollinger_period", d.bollinger_period),
        bollinger_multiplier: config.get_double(
            "indicators",
            "bollinger_multiplier",
            d.bollinger_multiplier,
        ),
    }
}

pub fn build_analysis_params(config: &dyn ConfigPort) -> AnalysisParams {
    let d = AnalysisParams::default();
    AnalysisParams {
        risk_free_rate: config.get_double("analysis", "risk_free_rate", d.risk_free_rate),
        concentration_threshold_pct: config.get_double(
            "analysis",
            "concentration_threshold_pct",
            d.concentration_threshold_pct,
        ),
        loss_threshold_pct: config.get_double(
            "analysis",
            "loss_threshold_pct",
            d.loss_threshold_pct,
        ),
        volatility_threshold: config.get_double(
            "analysis",
            "volatility_threshold",
            d.volatility_threshold,
        ),
        beta_threshold: config.get_double("analysis", "beta_threshold", d.beta_threshold),
    }
}

/// Symbol to sector map; symbols are upper-cased since INI keys are folded.
pub fn build_sectors(config: &dyn ConfigPort) -> HashMap<String, String> {
    config
        .section_entries("sectors")
        .into_iter()
        .map(|(symbol, sector)| (symbol.to_uppercase(), sector.trim().to_string()))
        .collect()
}

/// Index of the last bar on or before the end of `date`.
fn resolve_as_of(series: &PriceSeries, date: Option<NaiveDate>) -> Result<usize, TickerfolioError> {
    let no_data = || TickerfolioError::NoData {
        symbol: series.symbol().to_string(),
    };
    match date {
        None => series.len().checked_sub(1).ok_or_else(no_data),
        Some(d) => {
            let end_of_day = d.and_hms_opt(23, 59, 59).ok_or_else(no_data)?;
            series.index_at_or_before(end_of_day).ok_or_else(no_data)
        }
    }
}

fn fetch_all(
    prices: &dyn PricePort,
    symbols: &[String],
) -> Result<Vec<PriceSeries>, TickerfolioError> {
    symbols
        .iter()
        .map(|s| prices.fetch_series(&s.trim().to_uppercase()))
        .collect()
}

fn run_indicators(
    config_path: &Path,
    symbols: &[String],
    as_of: Option<NaiveDate>,
) -> Result<Vec<IndicatorReport>, TickerfolioError> {
    let config = load_config(config_path)?;
    let data = build_data_config(&config)?;
    let params = build_indicator_params(&config);
    let prices = CsvPriceAdapter::new(data.prices_dir);

    let series = fetch_all(&prices, symbols)?;
    let requests = series
        .iter()
        .map(|s| {
            Ok(IndicatorRequest {
                series: s,
                as_of: resolve_as_of(s, as_of)?,
            })
        })
        .collect::<Result<Vec<_>, TickerfolioError>>()?;

    let started = Instant::now();
    let results = compute_batch(&requests, &params);
    info!(
        symbols = requests.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "computed indicator batch"
    );

    results
        .into_iter()
        .map(|r| {
            let indicators = r?;
            let signals = signal::signals(&indicators);
            Ok(IndicatorReport {
                indicators,
                signals,
            })
        })
        .collect()
}

fn run_history(
    config_path: &Path,
    symbols: &[String],
) -> Result<Vec<HistoryReport>, TickerfolioError> {
    let config = load_config(config_path)?;
    let data = build_data_config(&config)?;
    let params = build_indicator_params(&config);
    let prices = CsvPriceAdapter::new(data.prices_dir);

    let mut reports = Vec::with_capacity(symbols.len());
    for series in fetch_all(&prices, symbols)? {
        let started = Instant::now();
        let history = indicator_history(&series, &params)?;
        info!(
            symbol = series.symbol(),
            points = history.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "computed indicator history"
        );
        reports.push(HistoryReport {
            symbol: series.symbol().to_string(),
            history,
        });
    }
    Ok(reports)
}

fn run_quote(config_path: &Path, symbol: &str) -> Result<Quote, TickerfolioError> {
    let config = load_config(config_path)?;
    let data = build_data_config(&config)?;
    let series = CsvPriceAdapter::new(data.prices_dir).fetch_series(&symbol.to_uppercase())?;
    Ok(quote::quote(&series)?)
}

fn run_recommend(config_path: &Path, symbol: &str) -> Result<Recommendation, TickerfolioError> {
    let config = load_config(config_path)?;
    let data = build_data_config(&config)?;
    let series = CsvPriceAdapter::new(data.prices_dir).fetch_series(&symbol.to_uppercase())?;
    let as_of = resolve_as_of(&series, None)?;
    Ok(signal::recommend(&series, as_of)?)
}

fn run_snapshot(config_path: &Path) -> Result<PortfolioSnapshot, TickerfolioError> {
    let config = load_config(config_path)?;
    let data = build_data_config(&config)?;
    let prices = CsvPriceAdapter::new(data.prices_dir);
    let ledger = CsvLedgerAdapter::new(data.ledger);
    let (snapshot, _) = build_snapshot(&prices, &ledger)?;
    Ok(snapshot)
}

fn run_analyze(config_path: &Path) -> Result<PortfolioAnalysis, TickerfolioError> {
    let config = load_config(config_path)?;
    let data = build_data_config(&config)?;
    let prices = CsvPriceAdapter::new(data.prices_dir);
    let ledger = CsvLedgerAdapter::new(data.ledger);

    build_analysis(
        &prices,
        &ledger,
        data.benchmark.as_deref(),
        &build_sectors(&config),
        &build_analysis_params(&config),
    )
}

fn run_validate(config_path: &Path) -> Result<ValidationReport, TickerfolioError> {
    let config = load_config(config_path)?;
    info!("Config validated successfully");
    let data = build_data_config(&config)?;
    let prices = CsvPriceAdapter::new(data.prices_dir);
    let ledger = CsvLedgerAdapter::new(data.ledger);

    validate_data(&prices, &ledger)
}

/// Replays the ledger and values its open holdings at the latest prices.
///
/// Returns the price series of the open holdings alongside the snapshot.
pub fn build_snapshot(
    prices: &dyn PricePort,
    ledger: &dyn LedgerPort,
) -> Result<(PortfolioSnapshot, Vec<PriceSeries>), TickerfolioError> {
    let transactions = ledger.fetch_transactions()?;
    let holdings = apply_all(&transactions)?;
    info!(
        transactions = transactions.len(),
        holdings = holdings.len(),
        "replayed ledger"
    );

    let series = holdings
        .iter()
        .filter(|h| h.is_open())
        .map(|h| prices.fetch_series(&h.symbol))
        .collect::<Result<Vec<_>, _>>()?;

    let (latest, previous) = price_maps(&series);
    let snapshot = compose(&holdings, &latest, &previous)?;
    Ok((snapshot, series))
}

pub fn build_analysis(
    prices: &dyn PricePort,
    ledger: &dyn LedgerPort,
    benchmark: Option<&str>,
    sectors: &HashMap<String, String>,
    params: &AnalysisParams,
) -> Result<PortfolioAnalysis, TickerfolioError> {
    let (snapshot, history) = build_snapshot(prices, ledger)?;

    let benchmark_series = match benchmark {
        Some(symbol) => match prices.fetch_series(symbol) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!("benchmark {} unavailable, using beta 1.0: {}", symbol, e);
                None
            }
        },
        None => None,
    };

    Ok(analysis::analyze(
        &snapshot,
        &history,
        benchmark_series.as_ref(),
        sectors,
        params,
    ))
}

/// Loads every price file and replays the ledger without valuing it.
pub fn validate_data(
    prices: &dyn PricePort,
    ledger: &dyn LedgerPort,
) -> Result<ValidationReport, TickerfolioError> {
    let symbols = prices.list_symbols()?;
    for symbol in &symbols {
        let series = prices.fetch_series(symbol)?;
        if series.is_empty() {
            warn!("price file for {} has no bars", symbol);
        }
    }

    let transactions = ledger.fetch_transactions()?;
    let holdings = apply_all(&transactions)?;

    Ok(ValidationReport {
        symbols: symbols.len(),
        transactions: transactions.len(),
        open_holdings: holdings.iter().filter(|h| h.is_open()).count(),
    })
}
