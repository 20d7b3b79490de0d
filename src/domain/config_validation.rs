//! Configuration validation.
//!
//! Checks every field before a command runs. Optional keys fall back to
//! their defaults when absent, but a present value must parse and be in range.

use crate::domain::error::TickerfolioError;
use crate::domain::indicator::IndicatorParams;
use crate::ports::config_port::ConfigPort;

const INDICATOR_PERIODS: [&str; 7] = [
    "sma_period",
    "ema_period",
    "rsi_period",
    "macd_fast",
    "macd_slow",
    "macd_signal",
    "bollinger_period",
];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TickerfolioError> {
    validate_data_config(config)?;
    validate_indicator_config(config)?;
    validate_analysis_config(config)?;
    validate_sectors(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TickerfolioError> {
    for key in ["prices_dir", "ledger"] {
        match config.get_string("data", key) {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(TickerfolioError::ConfigMissing {
                    section: "data".to_string(),
                    key: key.to_string(),
                })
            }
        }
    }
    if let Some(b) = config.get_string("data", "benchmark") {
        if b.trim().is_empty() {
            return Err(invalid("data", "benchmark", "benchmark must not be empty"));
        }
    }
    Ok(())
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), TickerfolioError> {
    for key in INDICATOR_PERIODS {
        if let Some(raw) = config.get_string("indicators", key) {
            match raw.trim().parse::<i64>() {
                Ok(v) if v >= 1 => {}
                _ => {
                    return Err(invalid(
                        "indicators",
                        key,
                        &format!("{} must be a positive integer", key),
                    ))
                }
            }
        }
    }

    if let Some(v) = parse_double(config, "indicators", "bollinger_multiplier")? {
        if v <= 0.0 {
            return Err(invalid(
                "indicators",
                "bollinger_multiplier",
                "bollinger_multiplier must be positive",
            ));
        }
    }

    let defaults = IndicatorParams::default();
    let fast = config.get_int("indicators", "macd_fast", defaults.macd_fast as i64);
    let slow = config.get_int("indicators", "macd_slow", defaults.macd_slow as i64);
    if fast >= slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }
    Ok(())
}

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), TickerfolioError> {
    if let Some(v) = parse_double(config, "analysis", "risk_free_rate")? {
        if !(0.0..1.0).contains(&v) {
            return Err(invalid(
                "analysis",
                "risk_free_rate",
                "risk_free_rate must be between 0 and 1",
            ));
        }
    }
    if let Some(v) = parse_double(config, "analysis", "concentration_threshold_pct")? {
        if v <= 0.0 || v > 100.0 {
            return Err(invalid(
                "analysis",
                "concentration_threshold_pct",
                "concentration_threshold_pct must be in (0, 100]",
            ));
        }
    }
    if let Some(v) = parse_double(config, "analysis", "loss_threshold_pct")? {
        if v <= 0.0 || v >= 100.0 {
            return Err(invalid(
                "analysis",
                "loss_threshold_pct",
                "loss_threshold_pct must be in (0, 100)",
            ));
        }
    }
    for key in ["volatility_threshold", "beta_threshold"] {
        if let Some(v) = parse_double(config, "analysis", key)? {
            if v < 0.0 {
                return Err(invalid(
                    "analysis",
                    key,
                    &format!("{} must be non-negative", key),
                ));
            }
        }
    }
    Ok(())
}

fn validate_sectors(config: &dyn ConfigPort) -> Result<(), TickerfolioError> {
    for (symbol, sector) in config.section_entries("sectors") {
        if sector.trim().is_empty() {
            return Err(invalid(
                "sectors",
                &symbol,
                "sector name must not be empty",
            ));
        }
    }
    Ok(())
}

fn parse_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, TickerfolioError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(invalid(section, key, &format!("{} must be a number", key))),
        },
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> TickerfolioError {
    TickerfolioError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
