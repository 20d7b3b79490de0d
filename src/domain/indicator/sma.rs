//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(P[i-n+1..=i]). Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PriceBar;

pub fn calculate_sma(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::empty(IndicatorType::Sma(period));
    }

    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let valid = i + 1 >= period;
        let value = if valid {
            let window = &bars[i + 1 - period..=i];
            window.iter().map(|b| b.price).sum::<f64>() / period as f64
        } else {
            0.0
        };

        let value = IndicatorValue::Simple(value);
        values.push(if valid {
            IndicatorPoint::ready(bar.timestamp, value)
        } else {
            IndicatorPoint::warmup(bar.timestamp, value)
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
