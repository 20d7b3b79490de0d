//! Port traits the CLI drives the domain through.

pub mod config_port;
pub mod ledger_port;
pub mod price_port;
