//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values
//!
//! The per-indicator calculators produce full series over a bar slice; the
//! [`set`] module picks the values at one as-of point into an [`IndicatorSet`].

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod set;
pub mod sma;
pub(crate) mod stddev;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use set::{compute_indicators, compute_indicators_with, BollingerBands, IndicatorParams, IndicatorSet};
pub use sma::calculate_sma;

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

impl IndicatorPoint {
    pub(crate) fn ready(timestamp: NaiveDateTime, value: IndicatorValue) -> Self {
        IndicatorPoint {
            timestamp,
            valid: true,
            value,
        }
    }

    pub(crate) fn warmup(timestamp: NaiveDateTime, value: IndicatorValue) -> Self {
        IndicatorPoint {
            timestamp,
            valid: false,
            value,
        }
    }
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

impl IndicatorValue {
    pub fn as_simple(&self) -> Option<f64> {
        match *self {
            IndicatorValue::Simple(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        multiplier: f64,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn empty(indicator_type: IndicatorType) -> Self {
        IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        }
    }

    /// The last point, if it is past warmup.
    pub fn last_valid(&self) -> Option<&IndicatorPoint> {
        self.values.last().filter(|p| p.valid)
    }

    /// Raw simple values, 0.0 where the point is not a simple value.
    pub fn simple_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|p| p.value.as_simple().unwrap_or(0.0))
            .collect()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger { period, multiplier } => {
                write!(f, "BOLLINGER({},{})", period, multiplier)
            }
        }
    }
}
