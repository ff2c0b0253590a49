//! Result types for Credi instruction execution.

use {
    trezoa_account::Account,
    trezoa_hash::Hash,
    trezoa_program_error::ProgramError,
    trezoa_pubkey::Pubkey,
    trezoa_transaction_error::TransactionError,
    std::fmt,
};

/// The outcome of executing an instruction or chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgramResult {
    /// The program executed successfully and its writes were accepted.
    Success,
    /// The program returned an error.
    Failure(ProgramError),
    /// The ledger refused the transaction: the program's writes broke a
    /// ledger rule, or lost a race at commit time.
    Rejected(TransactionError),
}

impl ProgramResult {
    /// Returns `true` if the program succeeded.
    pub const fn is_ok(&self) -> bool {
        matches!(self, ProgramResult::Success)
    }

    /// Returns `true` if the program failed or the ledger rejected it.
    pub const fn is_err(&self) -> bool {
        !self.is_ok()
    }

    /// The custom error code, if the program failed with one.
    pub fn custom_code(&self) -> Option<u32> {
        match self {
            ProgramResult::Failure(ProgramError::Custom(code)) => Some(*code),
            _ => None,
        }
    }
}

impl From<Result<(), ProgramError>> for ProgramResult {
    fn from(result: Result<(), ProgramError>) -> Self {
        match result {
            Ok(()) => ProgramResult::Success,
            Err(err) => ProgramResult::Failure(err),
        }
    }
}

impl fmt::Display for ProgramResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramResult::Success => write!(f, "success"),
            ProgramResult::Failure(err) => write!(f, "program error: {err}"),
            ProgramResult::Rejected(err) => write!(f, "transaction rejected: {err}"),
        }
    }
}

/// Identifier of an executed transaction, displayed in base58 like a
/// signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TransactionId(pub Hash);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The overall result of the instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstructionResult {
    /// The time taken to execute the instruction, in microseconds.
    pub execution_time: u64,
    /// The result code of the program's execution.
    pub program_result: ProgramResult,
    /// Program log lines recorded during execution.
    pub logs: Vec<String>,
    /// The resulting accounts after executing the instruction.
    ///
    /// This includes all accounts provided to the processor, in the order
    /// they were provided. Any accounts that were modified will maintain
    /// their original position in this list, but with updated state. On
    /// failure, every account is returned unchanged.
    pub resulting_accounts: Vec<(Pubkey, Account)>,
    /// Identifier of the transaction, set once it succeeds.
    pub transaction_id: Option<TransactionId>,
}

impl Default for InstructionResult {
    fn default() -> Self {
        Self {
            execution_time: 0,
            program_result: ProgramResult::Success,
            logs: vec![],
            resulting_accounts: vec![],
            transaction_id: None,
        }
    }
}

impl InstructionResult {
    /// Get an account from the resulting accounts by its pubkey.
    pub fn get_account(&self, pubkey: &Pubkey) -> Option<&Account> {
        self.resulting_accounts
            .iter()
            .find(|(k, _)| k == pubkey)
            .map(|(_, a)| a)
    }

    /// Fold the result of the next instruction of a chain into this one.
    pub fn absorb(&mut self, other: Self) {
        self.execution_time += other.execution_time;
        self.program_result = other.program_result;
        self.logs.extend(other.logs);
        self.resulting_accounts = other.resulting_accounts;
        self.transaction_id = other.transaction_id;
    }
}
