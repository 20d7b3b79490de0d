//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1). The first n prices seed the average with their mean, then
//! EMA[i] = P[i]*k + EMA[i-1]*(1-k). Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PriceBar;

pub fn calculate_ema(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Ema(period);
    if period == 0 {
        return IndicatorSeries::empty(indicator_type);
    }

    let mut ema = Ema::new(period);
    let values = bars
        .iter()
        .map(|bar| match ema.push(bar.price) {
            Some(v) => IndicatorPoint::ready(bar.timestamp, IndicatorValue::Simple(v)),
            None => IndicatorPoint::warmup(bar.timestamp, IndicatorValue::Simple(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// Incremental EMA over a stream of values.
///
/// Until `period` values have been seen, [`Ema::current`] is their running
/// mean; afterwards it follows the exponential recurrence.
#[derive(Debug, Clone)]
pub(crate) struct Ema {
    period: usize,
    k: f64,
    seen: usize,
    sum: f64,
    value: f64,
}

impl Ema {
    pub(crate) fn new(period: usize) -> Self {
        Ema {
            period,
            k: 2.0 / (period as f64 + 1.0),
            seen: 0,
            sum: 0.0,
            value: 0.0,
        }
    }

    /// Feeds one value and returns the EMA once the seed window is full.
    pub(crate) fn push(&mut self, x: f64) -> Option<f64> {
        if self.seen < self.period {
            self.seen += 1;
            self.sum += x;
            self.value = self.sum / self.seen as f64;
            return (self.seen == self.period).then_some(self.value);
        }
        self.value = x * self.k + self.value * (1.0 - self.k);
        Some(self.value)
    }

    pub(crate) fn current(&self) -> f64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    #[test]
    fn ema_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_ema(&bars, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn ema_period_1() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&bars, 1);

        assert!(series.values.iter().all(|p| p.valid));

        if let IndicatorValue::Simple(v) = series.values[0].value {
            assert!((v - 10.0).abs() < f64::EPSILON);
        }
        if let IndicatorValue::Simple(v) = series.values[1].value {
            assert!((v - 20.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_seed_is_sma() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&bars, 3);

        if let IndicatorValue::Simple(v) = series.values[2].value {
            let expected_sma = (10.0 + 20.0 + 30.0) / 3.0;
            assert!((v - expected_sma).abs() < f64::EPSILON);
        } else {
            panic!("Expected Simple value");
        }
    }

    #[test]
    fn ema_recursive_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_ema(&bars, 3);

        let k = 2.0 / 4.0;
        let sma = (10.0 + 20.0 + 30.0) / 3.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        let values = series.simple_values();
        assert!((values[2] - sma).abs() < f64::EPSILON);
        assert!((values[3] - ema_3).abs() < f64::EPSILON);
        assert!((values[4] - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_equal_prices() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0, 100.0]);
        let series = calculate_ema(&bars, 3);

        for v in &series.simple_values()[2..] {
            assert!((v - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_indicator_type() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&bars, 5);

        assert_eq!(series.indicator_type, IndicatorType::Ema(5));
    }

    #[test]
    fn ema_empty_bars() {
        let series = calculate_ema(&[], 3);
        assert!(series.values.is_empty());
    }

    #[test]
    fn ema_period_0() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_ema(&bars, 0);
        assert!(series.values.is_empty());
    }

    #[test]
    fn running_mean_before_seed() {
        let mut ema = Ema::new(3);
        assert_eq!(ema.push(10.0), None);
        assert!((ema.current() - 10.0).abs() < f64::EPSILON);
        assert_eq!(ema.push(20.0), None);
        assert!((ema.current() - 15.0).abs() < f64::EPSILON);
        assert_eq!(ema.push(30.0), Some(20.0));
    }

    #[test]
    fn recurrence_uses_two_over_n_plus_one() {
        let mut ema = Ema::new(1);
        assert_eq!(ema.push(10.0), Some(10.0));
        // k = 1 for a one-period average
        assert_eq!(ema.push(4.0), Some(4.0));

        let mut ema = Ema::new(9);
        for _ in 0..9 {
            ema.push(0.0);
        }
        let v = ema.push(10.0).unwrap_or_default();
        assert!((v - 2.0).abs() < 1e-12);
    }
}
