//! tickerfolio: portfolio valuation and technical-indicator analytics.
//!
//! Hexagonal architecture: pure analytics in [`domain`], port traits in
//! [`ports`], CSV and INI implementations in [`adapters`], and the command
//! line front end in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
