//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::stddev::mean_and_stddev;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PriceBar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

pub fn calculate_bollinger(
    bars: &[PriceBar],
    period: usize,
    multiplier: f64,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger { period, multiplier };
    if period == 0 {
        return IndicatorSeries::empty(indicator_type);
    }

    let mut values = Vec::with_capacity(bars.len());
    let warmup = period - 1;
    let prices: Vec<f64> = bars.iter().map(|b| b.price).collect();

    for (i, bar) in bars.iter().enumerate() {
        let valid = i >= warmup;

        let (upper, middle, lower) = if valid {
            let (middle, stddev) = mean_and_stddev(&prices[i + 1 - period..=i]);
            (middle + multiplier * stddev, middle, middle - multiplier * stddev)
        } else {
            (0.0, 0.0, 0.0)
        };

        let value = IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        };
        values.push(if valid {
            IndicatorPoint::ready(bar.timestamp, value)
        } else {
            IndicatorPoint::warmup(bar.timestamp, value)
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
