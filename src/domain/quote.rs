//! Latest-price quotes and the price maps fed to the snapshot composer.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::error::AnalyticsError;
use crate::domain::price::PriceSeries;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub as_of_timestamp: NaiveDateTime,
    pub current_price: f64,
    pub previous_close: f64,
    pub daily_change: f64,
    pub daily_change_pct: f64,
    pub volume: u64,
}

/// Quotes the last bar of `series` against the one before it.
pub fn quote(series: &PriceSeries) -> Result<Quote, AnalyticsError> {
    let (latest, previous) = match (series.latest(), series.previous()) {
        (Some(latest), Some(previous)) => (latest, previous),
        _ => {
            return Err(AnalyticsError::InsufficientData {
                symbol: series.symbol().to_string(),
                bars: series.len(),
                minimum: 2,
            });
        }
    };

    let daily_change = latest.price - previous.price;
    Ok(Quote {
        symbol: series.symbol().to_string(),
        as_of_timestamp: latest.timestamp,
        current_price: latest.price,
        previous_close: previous.price,
        daily_change,
        daily_change_pct: daily_change / previous.price * 100.0,
        volume: latest.volume,
    })
}

/// Latest and previous-close price maps keyed by symbol.
///
/// A one-bar series contributes a latest price only; an empty series
/// contributes nothing.
pub fn price_maps<'a>(
    series: impl IntoIterator<Item = &'a PriceSeries>,
) -> (HashMap<String, f64>, HashMap<String, f64>) {
    let mut latest = HashMap::new();
    let mut previous = HashMap::new();

    for s in series {
        if let Some(bar) = s.latest() {
            latest.insert(s.symbol().to_string(), bar.price);
        }
        if let Some(bar) = s.previous() {
            previous.insert(s.symbol().to_string(), bar.price);
        }
    }

    (latest, previous)
}
