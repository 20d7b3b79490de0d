//! Portfolio analysis: sector allocation, risk, performance and
//! rebalancing hints layered on a [`PortfolioSnapshot`].

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::indicator::stddev::mean_and_stddev;
use crate::domain::price::PriceSeries;
use crate::domain::snapshot::PortfolioSnapshot;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const UNCLASSIFIED_SECTOR: &str = "Unclassified";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    pub risk_free_rate: f64,
    pub concentration_threshold_pct: f64,
    pub loss_threshold_pct: f64,
    pub volatility_threshold: f64,
    pub beta_threshold: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        AnalysisParams {
            risk_free_rate: 0.0,
            concentration_threshold_pct: 50.0,
            loss_threshold_pct: 20.0,
            volatility_threshold: 0.2,
            beta_threshold: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub beta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_return_pct: f64,
    pub daily_return_pct: f64,
    pub cost_basis: f64,
    pub market_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioAnalysis {
    pub total_value: f64,
    pub daily_change: f64,
    pub daily_change_pct: f64,
    pub sector_allocation: BTreeMap<String, f64>,
    pub risk: RiskMetrics,
    pub performance: PerformanceMetrics,
    pub recommendations: Vec<String>,
}

/// Full analysis of `snapshot`.
///
/// `history` supplies the price series of held symbols; series for symbols
/// not in the snapshot are ignored. `sectors` maps symbol to sector name.
pub fn analyze(
    snapshot: &PortfolioSnapshot,
    history: &[PriceSeries],
    benchmark: Option<&PriceSeries>,
    sectors: &HashMap<String, String>,
    params: &AnalysisParams,
) -> PortfolioAnalysis {
    let held: HashSet<&str> = snapshot.holdings.iter().map(|r| r.symbol.as_str()).collect();
    let held_history: Vec<&PriceSeries> = history
        .iter()
        .filter(|s| held.contains(s.symbol()))
        .collect();

    let sector_allocation = sector_allocation(snapshot, sectors);
    let risk = risk_metrics(&held_history, benchmark, params.risk_free_rate);
    let performance = performance(snapshot);
    let recommendations = recommendations(snapshot, &sector_allocation, &risk, params);

    PortfolioAnalysis {
        total_value: snapshot.total_value,
        daily_change: snapshot.daily_change,
        daily_change_pct: snapshot.daily_change_pct,
        sector_allocation,
        risk,
        performance,
        recommendations,
    }
}

/// Share of total market value per sector, in percent.
pub fn sector_allocation(
    snapshot: &PortfolioSnapshot,
    sectors: &HashMap<String, String>,
) -> BTreeMap<String, f64> {
    let mut allocation: BTreeMap<String, f64> = BTreeMap::new();
    if snapshot.total_value <= 0.0 {
        return allocation;
    }

    for row in &snapshot.holdings {
        let sector = sectors
            .get(&row.symbol)
            .map(String::as_str)
            .unwrap_or(UNCLASSIFIED_SECTOR);
        *allocation.entry(sector.to_string()).or_insert(0.0) += row.market_value;
    }

    for value in allocation.values_mut() {
        *value = *value / snapshot.total_value * 100.0;
    }
    allocation
}

/// Volatility, Sharpe ratio and beta from daily simple returns.
///
/// - volatility: mean of each symbol's annualised return stddev
/// - sharpe: equal-weight portfolio returns, annualised, net of `risk_free_rate`
/// - beta: against `benchmark` on shared timestamps, 1.0 without one
pub fn risk_metrics(
    history: &[&PriceSeries],
    benchmark: Option<&PriceSeries>,
    risk_free_rate: f64,
) -> RiskMetrics {
    let stddevs: Vec<f64> = history
        .iter()
        .map(|s| s.returns())
        .filter(|r| r.len() >= 2)
        .map(|r| mean_and_stddev(&r).1)
        .collect();
    let volatility = if stddevs.is_empty() {
        0.0
    } else {
        stddevs.iter().sum::<f64>() / stddevs.len() as f64 * TRADING_DAYS_PER_YEAR.sqrt()
    };

    let per_symbol: Vec<Vec<(NaiveDateTime, f64)>> =
        history.iter().map(|s| dated_returns(s)).collect();
    let portfolio_returns = equal_weight_returns(&per_symbol);
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    let values: Vec<f64> = portfolio_returns.values().copied().collect();
    let sharpe_ratio = if values.len() < 2 {
        0.0
    } else {
        let (mean, stddev) = mean_and_stddev(&values);
        if stddev > 0.0 {
            (mean - daily_rf) / stddev * TRADING_DAYS_PER_YEAR.sqrt()
        } else {
            0.0
        }
    };

    let beta = benchmark
        .map(|b| beta(&portfolio_returns, &dated_returns(b)))
        .unwrap_or(1.0);

    RiskMetrics {
        volatility,
        sharpe_ratio,
        beta,
    }
}

pub fn performance(snapshot: &PortfolioSnapshot) -> PerformanceMetrics {
    let total_return_pct = if snapshot.total_cost == 0.0 {
        0.0
    } else {
        (snapshot.total_value - snapshot.total_cost) / snapshot.total_cost * 100.0
    };

    PerformanceMetrics {
        total_return_pct,
        daily_return_pct: snapshot.daily_change_pct,
        cost_basis: snapshot.total_cost,
        market_value: snapshot.total_value,
    }
}

pub fn recommendations(
    snapshot: &PortfolioSnapshot,
    sector_allocation: &BTreeMap<String, f64>,
    risk: &RiskMetrics,
    params: &AnalysisParams,
) -> Vec<String> {
    let mut out = Vec::new();

    let max_sector = sector_allocation.values().copied().fold(0.0_f64, f64::max);
    if max_sector > params.concentration_threshold_pct {
        out.push(
            "Consider reducing exposure to concentrated sectors for better diversification"
                .to_string(),
        );
    }
    if risk.volatility > params.volatility_threshold {
        out.push("Portfolio volatility is high. Consider adding more defensive stocks".to_string());
    }
    if risk.beta > params.beta_threshold {
        out.push("Portfolio beta is high. Consider adding more defensive positions".to_string());
    }

    let floor = 1.0 - params.loss_threshold_pct / 100.0;
    for row in &snapshot.holdings {
        if row.current_price < row.average_cost * floor {
            out.push(format!(
                "Consider reviewing {} position due to significant loss",
                row.symbol
            ));
        }
    }

    out
}

/// Returns keyed by the timestamp of the later bar of each pair.
fn dated_returns(series: &PriceSeries) -> Vec<(NaiveDateTime, f64)> {
    series
        .bars()
        .windows(2)
        .map(|w| (w[1].timestamp, (w[1].price - w[0].price) / w[0].price))
        .collect()
}

/// Mean return across whichever symbols have a return at each timestamp.
fn equal_weight_returns(per_symbol: &[Vec<(NaiveDateTime, f64)>]) -> BTreeMap<NaiveDateTime, f64> {
    let mut sums: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();
    for returns in per_symbol {
        for &(ts, r) in returns {
            let entry = sums.entry(ts).or_insert((0.0, 0));
            entry.0 += r;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(ts, (sum, count))| (ts, sum / count as f64))
        .collect()
}

fn beta(portfolio: &BTreeMap<NaiveDateTime, f64>, benchmark: &[(NaiveDateTime, f64)]) -> f64 {
    let pairs: Vec<(f64, f64)> = benchmark
        .iter()
        .filter_map(|(ts, m)| portfolio.get(ts).map(|p| (*p, *m)))
        .collect();
    if pairs.len() < 2 {
        return 1.0;
    }

    let n = pairs.len() as f64;
    let mean_p = pairs.iter().map(|(p, _)| p).sum::<f64>() / n;
    let mean_m = pairs.iter().map(|(_, m)| m).sum::<f64>() / n;
    let covariance = pairs
        .iter()
        .map(|(p, m)| (p - mean_p) * (m - mean_m))
        .sum::<f64>()
        / n;
    let variance = pairs.iter().map(|(_, m)| (m - mean_m).powi(2)).sum::<f64>() / n;

    if variance == 0.0 {
        1.0
    } else {
        covariance / variance
    }
}
