//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are invalid (need n price changes to compute initial average).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PriceBar;

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    if let Some(first) = bars.first() {
        values.push(IndicatorPoint::warmup(first.timestamp, IndicatorValue::Simple(0.0)));
    }

    let mut averages = (period > 0).then(|| WilderAverages::new(period));
    for pair in bars.windows(2) {
        let bar = &pair[1];
        let change = bar.price - pair[0].price;
        let point = match averages.as_mut().and_then(|w| w.push(change)) {
            Some(rsi) => IndicatorPoint::ready(bar.timestamp, IndicatorValue::Simple(rsi)),
            None => IndicatorPoint::warmup(bar.timestamp, IndicatorValue::Simple(0.0)),
        };
        values.push(point);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

struct WilderAverages {
    period: usize,
    seen: usize,
    gain: f64,
    loss: f64,
}

impl WilderAverages {
    fn new(period: usize) -> Self {
        WilderAverages {
            period,
            seen: 0,
            gain: 0.0,
            loss: 0.0,
        }
    }

    /// Feeds one price change; yields the RSI once `period` changes are in.
    fn push(&mut self, change: f64) -> Option<f64> {
        let n = self.period as f64;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if self.seen < self.period {
            self.seen += 1;
            self.gain += gain;
            self.loss += loss;
            if self.seen < self.period {
                return None;
            }
            self.gain /= n;
            self.loss /= n;
        } else {
            self.gain = (self.gain * (n - 1.0) + gain) / n;
            self.loss = (self.loss * (n - 1.0) + loss) / n;
        }
        Some(rsi_from_averages(self.gain, self.loss))
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
    rsi.clamp(0.0, 100.0)
}
