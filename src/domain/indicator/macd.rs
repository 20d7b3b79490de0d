//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: the MACD line exists from bar slow-1. Until `signal` MACD values
//! exist the signal line is their running mean, so a series of `slow` bars
//! already yields a valid point.

use crate::domain::indicator::ema::Ema;
use crate::domain::indicator::{
    calculate_ema, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::price::PriceBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    if fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries::empty(indicator_type);
    }

    let ema_fast = calculate_ema(bars, fast);
    let ema_slow = calculate_ema(bars, slow);
    let mut signal = Ema::new(signal_period);

    let values = bars
        .iter()
        .zip(ema_fast.values.iter().zip(&ema_slow.values))
        .map(|(bar, (f, s))| {
            let (Some(f), Some(s)) = (valid_simple(f), valid_simple(s)) else {
                return IndicatorPoint::warmup(bar.timestamp, macd_value(0.0, 0.0));
            };
            let line = f - s;
            signal.push(line);
            IndicatorPoint::ready(bar.timestamp, macd_value(line, signal.current()))
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

fn valid_simple(point: &IndicatorPoint) -> Option<f64> {
    point.value.as_simple().filter(|_| point.valid)
}

fn macd_value(line: f64, signal: f64) -> IndicatorValue {
    IndicatorValue::Macd {
        line,
        signal,
        histogram: line - signal,
    }
}
