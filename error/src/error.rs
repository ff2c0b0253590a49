//! Credi errors. `CrediError` is returned by the program and is never a
//! panic. `LedgerError` represents misconfiguration of the ledger harness
//! and will throw a panic.

use {
    trezoa_program_error::ProgramError, trezoa_pubkey::Pubkey, std::fmt::Display,
    thiserror::Error,
};

/// Offset of the first program error code, so codes never collide with the
/// built-in `ProgramError` variants.
pub const ERROR_CODE_OFFSET: u32 = 6000;

/// Errors returned by the `initialize` handler.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[repr(u32)]
pub enum CrediError {
    /// The target account already carries a state discriminator.
    #[error("Account is already initialized")]
    AlreadyInitialized = ERROR_CODE_OFFSET,
    /// The payer did not sign, or a supplied target did not co-sign.
    #[error("Signer is not authorized to create or fund the account")]
    Unauthorized,
    /// The payer cannot cover the rent-exempt minimum, or the existing
    /// allocation is too small for the state layout.
    #[error("Account allocation failed")]
    AllocationFailed,
    /// The target account is owned by another program.
    #[error("Account is owned by a different program")]
    OwnershipMismatch,
    /// The target does not match the address derived from the seeds.
    #[error("Account address does not match the derived address")]
    AddressMismatch,
}

impl CrediError {
    pub const ALL: [CrediError; 5] = [
        CrediError::AlreadyInitialized,
        CrediError::Unauthorized,
        CrediError::AllocationFailed,
        CrediError::OwnershipMismatch,
        CrediError::AddressMismatch,
    ];

    /// The custom error code reported through `ProgramError::Custom`.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Whether resubmitting the same request can succeed once the caller
    /// fixes the environment (for example, funds the payer).
    pub const fn is_retryable(self) -> bool {
        matches!(self, CrediError::AllocationFailed)
    }

    /// Map a custom error code back to its variant.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|err| err.code() == code)
    }

    /// Extract a `CrediError` from a program error, if it carries one.
    pub fn from_program_error(error: &ProgramError) -> Option<Self> {
        match error {
            ProgramError::Custom(code) => Self::from_code(*code),
            _ => None,
        }
    }
}

impl From<CrediError> for ProgramError {
    fn from(error: CrediError) -> Self {
        ProgramError::Custom(error.code())
    }
}

#[derive(Debug, Error)]
pub enum LedgerError<'a> {
    /// An account required by the instruction was not provided.
    #[error("    [CREDI]: An account required by the instruction was not provided: {0}")]
    AccountMissing(&'a Pubkey),
    /// Program targeted by the instruction is not registered with the ledger.
    #[error("    [CREDI]: Program targeted by the instruction is not registered: {0}")]
    ProgramNotRegistered(&'a Pubkey),
    /// The account store lock was poisoned by a panicking writer.
    #[error("    [CREDI]: Account store lock poisoned")]
    StorePoisoned,
}

pub trait LedgerPanic<T> {
    fn or_panic_with(self, error: LedgerError) -> T;
}

impl<T, E> LedgerPanic<T> for Result<T, E>
where
    E: Display,
{
    fn or_panic_with(self, ledger_err: LedgerError) -> T {
        self.unwrap_or_else(|err| panic!("{}: {}", ledger_err, err))
    }
}

impl<T> LedgerPanic<T> for Option<T> {
    fn or_panic_with(self, ledger_err: LedgerError) -> T {
        self.unwrap_or_else(|| panic!("{}", ledger_err))
    }
}
