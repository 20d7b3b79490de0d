//! Core domain types and logic.
//!
//! Everything here is pure: no I/O, no logging, typed errors only.

pub mod analysis;
pub mod batch;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod ledger;
pub mod price;
pub mod quote;
pub mod signal;
pub mod snapshot;
pub mod transaction;
