//! # Credi
//!
//! The Credi program owns a single piece of state: the credential mint. Its
//! only instruction, `initialize`, takes an account from "uninitialized" to
//! "initialized" exactly once.
//!
//! The program never writes to the ledger directly. Given an [`Invocation`],
//! the processor validates the request and returns a [`StateDelta`]: the
//! complete set of account writes the instruction proposes. The ledger that
//! invoked it commits the delta as one unit, or discards it. This keeps the
//! handler a pure function of its inputs.
//!
//! ```rust,ignore
//! use {
//!     credi_program::{instruction, ProgramConfig},
//!     trezoa_pubkey::Pubkey,
//! };
//!
//! let payer = Pubkey::new_unique();
//! let config = ProgramConfig::default();
//!
//! // The default configuration derives one canonical address from `b"mint"`.
//! let (target, _bump) = config
//!     .resolution
//!     .expected_address(&credi_program::ID, &payer)
//!     .unwrap();
//!
//! let instruction = instruction::initialize(&credi_program::ID, &payer, &target);
//! ```
//!
//! Target addresses are resolved through [`address::AddressResolution`].
//! They are either derived from a seed (optionally scoped to the signer)
//! or supplied by the caller, who must then co-sign.
//!
//! [`Invocation`]: entrypoint::Invocation
//! [`StateDelta`]: entrypoint::StateDelta

pub mod address;
pub mod config;
pub mod entrypoint;
pub mod instruction;
pub mod processor;
pub mod state;
pub mod system;

pub use {
    config::{ProgramConfig, StateLayout},
    credi_error::error::CrediError,
    processor::CrediProcessor,
};
use trezoa_pubkey::Pubkey;

/// The Credi program ID.
pub const ID: Pubkey = trezoa_pubkey::pubkey!("84DES1yt9xCXdQf5j9iRphCT1cGYm6Y9vdFsZYkqmfSi");

pub const fn id() -> Pubkey {
    ID
}
