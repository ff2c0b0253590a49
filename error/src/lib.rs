//! Credi errors.
//!
//! [`error::CrediError`] is the program's error taxonomy, surfaced to callers
//! as `ProgramError::Custom` codes. [`error::LedgerError`] describes a
//! misconfigured ledger harness and is raised as a panic.

pub mod error;
