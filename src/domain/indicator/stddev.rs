//! Population standard deviation.
//!
//! STDDEV = sqrt(sum((x - mean)^2) / n) over a non-empty window.

/// Mean and population standard deviation of `values`.
pub(crate) fn mean_and_stddev(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
