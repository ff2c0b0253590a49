//! The interface between a ledger and the program it invokes.

use {
    trezoa_account::Account, trezoa_clock::Clock, trezoa_program_error::ProgramError,
    trezoa_pubkey::Pubkey, trezoa_rent::Rent, trezoa_svm_log_collector::LogCollector,
};

/// An account as seen by the program: its pre-instruction state plus the
/// privileges the instruction grants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstructionAccount {
    pub pubkey: Pubkey,
    pub account: Account,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// Everything a processor may read while handling one instruction.
pub struct Invocation<'a> {
    pub program_id: &'a Pubkey,
    /// Accounts in instruction order, duplicates merged.
    pub accounts: &'a [InstructionAccount],
    pub data: &'a [u8],
    pub rent: &'a Rent,
    pub clock: &'a Clock,
    pub log_collector: &'a mut LogCollector,
}

impl Invocation<'_> {
    /// Record a program log line.
    pub fn log(&mut self, message: &str) {
        self.log_collector.log(&format!("Program log: {message}"));
    }
}

/// The account writes proposed by one instruction. Nothing in a delta is
/// visible until the ledger commits all of it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateDelta {
    pub writes: Vec<(Pubkey, Account)>,
}

impl StateDelta {
    /// Stage a write, replacing any earlier write to the same key.
    pub fn write(&mut self, pubkey: Pubkey, account: Account) {
        match self.writes.iter_mut().find(|(key, _)| *key == pubkey) {
            Some((_, staged)) => *staged = account,
            None => self.writes.push((pubkey, account)),
        }
    }

    pub fn get(&self, pubkey: &Pubkey) -> Option<&Account> {
        self.writes
            .iter()
            .find(|(key, _)| key == pubkey)
            .map(|(_, account)| account)
    }
}

/// A program the ledger can invoke.
pub trait Processor: Send + Sync {
    fn process(&self, invocation: &mut Invocation) -> Result<StateDelta, ProgramError>;
}
