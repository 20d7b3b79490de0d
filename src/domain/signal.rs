//! Trading signals derived from indicator values.
//!
//! Two layers:
//! - [`signals`]: one buy/sell/hold reading per indicator in an [`IndicatorSet`]
//! - [`recommend`]: a trend call from price against SMA(20) and SMA(50),
//!   filtered by RSI(14)

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use crate::domain::error::AnalyticsError;
use crate::domain::indicator::{calculate_rsi, calculate_sma, IndicatorSeries, IndicatorSet};
use crate::domain::price::PriceSeries;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

pub const TREND_SHORT_PERIOD: usize = 20;
pub const TREND_LONG_PERIOD: usize = 50;
pub const TREND_RSI_PERIOD: usize = 14;

const TREND_CONFIDENCE: f64 = 0.8;
const HOLD_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl SignalKind {
    fn gerund(self) -> &'static str {
        match self {
            SignalKind::Buy => "buying",
            SignalKind::Sell => "selling",
            SignalKind::Hold => "holding",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "buy"),
            SignalKind::Sell => write!(f, "sell"),
            SignalKind::Hold => write!(f, "hold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSignal {
    pub indicator: &'static str,
    pub kind: SignalKind,
    pub value: f64,
}

/// Reads each indicator of `set` as a buy, sell or hold.
pub fn signals(set: &IndicatorSet) -> Vec<IndicatorSignal> {
    let rsi = if set.rsi < RSI_OVERSOLD {
        SignalKind::Buy
    } else if set.rsi > RSI_OVERBOUGHT {
        SignalKind::Sell
    } else {
        SignalKind::Hold
    };

    let macd = sign_signal(set.macd_histogram, 0.0);

    let bollinger = if set.price < set.bollinger.lower {
        SignalKind::Buy
    } else if set.price > set.bollinger.upper {
        SignalKind::Sell
    } else {
        SignalKind::Hold
    };

    let sma = sign_signal(set.price, set.sma);

    vec![
        IndicatorSignal {
            indicator: "rsi",
            kind: rsi,
            value: set.rsi,
        },
        IndicatorSignal {
            indicator: "macd",
            kind: macd,
            value: set.macd_histogram,
        },
        IndicatorSignal {
            indicator: "bollinger",
            kind: bollinger,
            value: set.price,
        },
        IndicatorSignal {
            indicator: "sma",
            kind: sma,
            value: set.sma,
        },
    ]
}

fn sign_signal(value: f64, reference: f64) -> SignalKind {
    if value > reference {
        SignalKind::Buy
    } else if value < reference {
        SignalKind::Sell
    } else {
        SignalKind::Hold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub symbol: String,
    pub as_of_timestamp: NaiveDateTime,
    pub kind: SignalKind,
    pub confidence: f64,
    pub summary: String,
    pub price: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub rsi: f64,
}

/// Trend recommendation for `series` at bar `as_of`, using only bars up to
/// and including it.
///
/// Buy when price > SMA(20) > SMA(50) and RSI < 70; sell when
/// price < SMA(20) < SMA(50) and RSI > 30; hold otherwise.
pub fn recommend(series: &PriceSeries, as_of: usize) -> Result<Recommendation, AnalyticsError> {
    let symbol = series.symbol();
    if as_of >= series.len() {
        return Err(AnalyticsError::AsOfOutOfRange {
            symbol: symbol.to_string(),
            as_of,
            len: series.len(),
        });
    }

    let window = &series.bars()[..=as_of];
    let minimum = TREND_LONG_PERIOD.max(TREND_RSI_PERIOD + 1);
    if window.len() < minimum {
        return Err(AnalyticsError::InsufficientData {
            symbol: symbol.to_string(),
            bars: window.len(),
            minimum,
        });
    }

    let insufficient = || AnalyticsError::InsufficientData {
        symbol: symbol.to_string(),
        bars: window.len(),
        minimum,
    };
    let last = |s: IndicatorSeries| s.last_valid().and_then(|p| p.value.as_simple());

    let sma_short = last(calculate_sma(window, TREND_SHORT_PERIOD)).ok_or_else(insufficient)?;
    let sma_long = last(calculate_sma(window, TREND_LONG_PERIOD)).ok_or_else(insufficient)?;
    let rsi = last(calculate_rsi(window, TREND_RSI_PERIOD)).ok_or_else(insufficient)?;

    let bar = &window[as_of];
    let price = bar.price;

    let (kind, confidence) = if price > sma_short && sma_short > sma_long && rsi < RSI_OVERBOUGHT {
        (SignalKind::Buy, TREND_CONFIDENCE)
    } else if price < sma_short && sma_short < sma_long && rsi > RSI_OVERSOLD {
        (SignalKind::Sell, TREND_CONFIDENCE)
    } else {
        (SignalKind::Hold, HOLD_CONFIDENCE)
    };

    Ok(Recommendation {
        symbol: symbol.to_string(),
        as_of_timestamp: bar.timestamp,
        kind,
        confidence,
        summary: format!("Technical analysis suggests {} {}", kind.gerund(), symbol),
        price,
        sma_short,
        sma_long,
        rsi,
    })
}
