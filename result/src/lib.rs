//! Execution results and result validation for the Credi ledger.

pub mod check;
pub mod config;
pub mod types;

pub use {check::*, config::*, types::*};
