//! Domain error types.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Which side of a price pair a snapshot was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceKind {
    Latest,
    PreviousClose,
}

impl fmt::Display for PriceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceKind::Latest => write!(f, "latest price"),
            PriceKind::PreviousClose => write!(f, "previous close"),
        }
    }
}

/// Failures of the pure analytics core.
///
/// Every variant is a local computation failure: nothing here is retryable
/// and nothing is repaired or clamped on the caller's behalf.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalyticsError {
    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    /// A sell exceeding the held shares by more than
    /// [`SHARE_EPSILON`](crate::domain::ledger::SHARE_EPSILON).
    #[error(
        "oversell of {symbol} in transaction {transaction_id}: selling {requested} shares, holding {held}"
    )]
    Oversell {
        symbol: String,
        transaction_id: u64,
        requested: f64,
        held: f64,
    },

    #[error("missing {kind} for {symbol}")]
    MissingPrice { symbol: String, kind: PriceKind },

    #[error("non-monotonic series for {symbol}: bar {index} at {timestamp} does not follow its predecessor")]
    NonMonotonicSeries {
        symbol: String,
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("invalid bar {index} for {symbol}: {reason}")]
    InvalidBar {
        symbol: String,
        index: usize,
        reason: String,
    },

    #[error("invalid transaction {id}: {reason}")]
    InvalidTransaction { id: u64, reason: String },

    #[error("duplicate transaction id {id}")]
    DuplicateTransaction { id: u64 },

    #[error("symbol mismatch: expected {expected}, found {found}")]
    SymbolMismatch { expected: String, found: String },

    #[error("as-of index {as_of} out of range for {symbol} ({len} bars)")]
    AsOfOutOfRange {
        symbol: String,
        as_of: usize,
        len: usize,
    },

    #[error("invalid indicator parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Top-level error type for tickerfolio.
#[derive(Debug, thiserror::Error)]
pub enum TickerfolioError {
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TickerfolioError> for std::process::ExitCode {
    fn from(err: &TickerfolioError) -> Self {
        let code: u8 = match err {
            TickerfolioError::Io(_) => 1,
            TickerfolioError::ConfigParse { .. }
            | TickerfolioError::ConfigMissing { .. }
            | TickerfolioError::ConfigInvalid { .. }
            | TickerfolioError::Analytics(AnalyticsError::InvalidParameter { .. }) => 2,
            TickerfolioError::Data { .. }
            | TickerfolioError::Analytics(AnalyticsError::NonMonotonicSeries { .. })
            | TickerfolioError::Analytics(AnalyticsError::InvalidBar { .. }) => 3,
            TickerfolioError::Analytics(AnalyticsError::Oversell { .. })
            | TickerfolioError::Analytics(AnalyticsError::InvalidTransaction { .. })
            | TickerfolioError::Analytics(AnalyticsError::DuplicateTransaction { .. })
            | TickerfolioError::Analytics(AnalyticsError::SymbolMismatch { .. }) => 4,
            TickerfolioError::NoData { .. }
            | TickerfolioError::Analytics(AnalyticsError::InsufficientData { .. })
            | TickerfolioError::Analytics(AnalyticsError::MissingPrice { .. })
            | TickerfolioError::Analytics(AnalyticsError::AsOfOutOfRange { .. }) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
