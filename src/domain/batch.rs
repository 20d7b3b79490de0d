//! Parallel indicator computation over many requests.
//!
//! Every request is a pure function of its own series, so requests run on the
//! global rayon pool with no shared state. Results keep request order.

use rayon::prelude::*;

use crate::domain::error::AnalyticsError;
use crate::domain::indicator::{compute_indicators_with, IndicatorParams, IndicatorSet};
use crate::domain::price::PriceSeries;

#[derive(Debug, Clone, Copy)]
pub struct IndicatorRequest<'a> {
    pub series: &'a PriceSeries,
    pub as_of: usize,
}

/// Computes each request independently; one failing request does not
/// affect the others.
pub fn compute_batch(
    requests: &[IndicatorRequest<'_>],
    params: &IndicatorParams,
) -> Vec<Result<IndicatorSet, AnalyticsError>> {
    requests
        .par_iter()
        .map(|req| compute_indicators_with(req.series, req.as_of, params))
        .collect()
}

/// Indicator sets for every bar of `series` from the first one with a
/// complete window to the last.
pub fn indicator_history(
    series: &PriceSeries,
    params: &IndicatorParams,
) -> Result<Vec<IndicatorSet>, AnalyticsError> {
    params.validate()?;

    let minimum = params.minimum_bars();
    if series.len() < minimum {
        return Err(AnalyticsError::InsufficientData {
            symbol: series.symbol().to_string(),
            bars: series.len(),
            minimum,
        });
    }

    (minimum - 1..series.len())
        .into_par_iter()
        .map(|as_of| compute_indicators_with(series, as_of, params))
        .collect::<Result<Vec<_>, _>>()
}
