//! Point-in-time indicator snapshot for one symbol.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::error::AnalyticsError;
use crate::domain::indicator::{bollinger, macd};
use crate::domain::indicator::{
    calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi, calculate_sma,
    IndicatorSeries, IndicatorValue,
};
use crate::domain::price::PriceSeries;

/// Lookback windows used by [`compute_indicators_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub sma_period: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            sma_period: 20,
            ema_period: 20,
            rsi_period: 14,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            bollinger_multiplier: bollinger::DEFAULT_MULTIPLIER,
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        let periods = [
            ("sma_period", self.sma_period),
            ("ema_period", self.ema_period),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(invalid(name, "period must be at least 1"));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(invalid("macd_fast", "fast period must be shorter than slow period"));
        }
        if !self.bollinger_multiplier.is_finite() || self.bollinger_multiplier <= 0.0 {
            return Err(invalid("bollinger_multiplier", "multiplier must be positive"));
        }
        Ok(())
    }

    /// Bars needed before every indicator in the set has a value.
    pub fn minimum_bars(&self) -> usize {
        [
            self.sma_period,
            self.ema_period,
            self.rsi_period + 1,
            self.macd_slow.max(self.macd_fast),
            self.bollinger_period,
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }
}

fn invalid(name: &str, reason: &str) -> AnalyticsError {
    AnalyticsError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub symbol: String,
    pub as_of_timestamp: NaiveDateTime,
    pub price: f64,
    pub sma: f64,
    pub ema: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bollinger: BollingerBands,
}

/// Indicators at bar `as_of` using the default windows
/// (SMA-20, EMA-20, RSI-14, MACD 12/26/9, Bollinger 20/2).
pub fn compute_indicators(series: &PriceSeries, as_of: usize) -> Result<IndicatorSet, AnalyticsError> {
    compute_indicators_with(series, as_of, &IndicatorParams::default())
}

/// Indicators at bar `as_of`, recomputed from every bar up to and including it.
pub fn compute_indicators_with(
    series: &PriceSeries,
    as_of: usize,
    params: &IndicatorParams,
) -> Result<IndicatorSet, AnalyticsError> {
    params.validate()?;

    let symbol = series.symbol();
    if as_of >= series.len() {
        return Err(AnalyticsError::AsOfOutOfRange {
            symbol: symbol.to_string(),
            as_of,
            len: series.len(),
        });
    }

    let window = &series.bars()[..=as_of];
    let minimum = params.minimum_bars();
    if window.len() < minimum {
        return Err(AnalyticsError::InsufficientData {
            symbol: symbol.to_string(),
            bars: window.len(),
            minimum,
        });
    }

    let sma = last_point(&calculate_sma(window, params.sma_period), symbol, |v| v.as_simple())?;
    let ema = last_point(&calculate_ema(window, params.ema_period), symbol, |v| v.as_simple())?;
    let rsi = last_point(&calculate_rsi(window, params.rsi_period), symbol, |v| v.as_simple())?;

    let macd_series = calculate_macd(
        window,
        params.macd_fast,
        params.macd_slow,
        params.macd_signal,
    );
    let (macd, macd_signal, macd_histogram) =
        last_point(&macd_series, symbol, |v| match *v {
            IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } => Some((line, signal, histogram)),
            _ => None,
        })?;

    let bollinger_series = calculate_bollinger(
        window,
        params.bollinger_period,
        params.bollinger_multiplier,
    );
    let bollinger = last_point(&bollinger_series, symbol, |v| match *v {
        IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        } => Some(BollingerBands {
            upper,
            middle,
            lower,
        }),
        _ => None,
    })?;

    let bar = &window[as_of];
    Ok(IndicatorSet {
        symbol: symbol.to_string(),
        as_of_timestamp: bar.timestamp,
        price: bar.price,
        sma,
        ema,
        rsi,
        macd,
        macd_signal,
        macd_histogram,
        bollinger,
    })
}

/// Extracts the final valid point of `series`; a series still in warmup
/// at the window end is reported as insufficient data.
fn last_point<T>(
    series: &IndicatorSeries,
    symbol: &str,
    extract: impl Fn(&IndicatorValue) -> Option<T>,
) -> Result<T, AnalyticsError> {
    series
        .last_valid()
        .and_then(|p| extract(&p.value))
        .ok_or_else(|| AnalyticsError::InsufficientData {
            symbol: symbol.to_string(),
            bars: series.values.len(),
            minimum: series.values.len() + 1,
        })
}
