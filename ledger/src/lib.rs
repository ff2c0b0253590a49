//! # Credi Ledger
//!
//! An in-process ledger for executing Credi instructions. It stands in for
//! the externally operated ledger the program is deployed to. It provides
//! the same contract: an instruction runs against a snapshot of accounts,
//! and its writes either all land or none do.
//!
//! The ledger does not emulate a validator. Registered programs are plain
//! Rust [`Processor`]s that return the writes they propose. The ledger
//! checks those writes against the privileges of the instruction and then
//! hands back the resulting accounts.
//!
//! Two flavors are offered:
//!
//! * [`Ledger`] is stateless. Every call takes an explicit list of accounts
//!   and returns the resulting accounts.
//! * [`LedgerContext`] wraps a `Ledger` and an injected [`AccountStore`].
//!   Accounts are loaded from the store and committed back atomically.
//!
//! ```rust,ignore
//! use {
//!     credi_ledger::{result::Check, Ledger},
//!     credi_program::{instruction, ProgramConfig},
//!     trezoa_account::Account,
//!     trezoa_pubkey::Pubkey,
//! };
//!
//! let config = ProgramConfig::default();
//! let ledger = Ledger::new(&credi_program::ID, config.clone());
//!
//! let payer = Pubkey::new_unique();
//! let ix = instruction::initialize_derived(&credi_program::ID, &payer, &config).unwrap();
//! let target = ix.accounts[0].pubkey;
//!
//! ledger.process_and_validate_instruction(
//!     &ix,
//!     &[
//!         (target, Account::default()),
//!         (payer, Account::new(1_000_000_000, 0, &trezoa_sdk_ids::system_program::id())),
//!     ],
//!     &[
//!         Check::success(),
//!         Check::account(&target).initialized().rent_exempt().build(),
//!     ],
//! );
//! ```
//!
//! ## Concurrency
//!
//! `LedgerContext` splits execution into [`LedgerContext::prepare`], which
//! reads accounts under a shared lock, and [`LedgerContext::commit`], which
//! takes the store's write lock. Commit compares every writable account
//! against the snapshot the instruction ran on. If any of them changed in
//! between, the transaction is rejected with `TransactionError::AccountInUse`
//! and nothing is written. Two racing initializations of the same account
//! therefore produce exactly one success.

pub mod account_store;
mod compile_accounts;
pub mod program;
pub mod sysvar;

pub use credi_result as result;
use {
    crate::{
        account_store::AccountStore,
        compile_accounts::{compile_accounts, writable_keys},
        program::ProgramCache,
        sysvar::Sysvars,
    },
    credi_error::error::{LedgerError, LedgerPanic},
    credi_program::{
        entrypoint::{InstructionAccount, Invocation, Processor, StateDelta},
        CrediProcessor, ProgramConfig,
    },
    credi_result::{Check, CheckContext, Config, InstructionResult, ProgramResult, TransactionId},
    sha2::{Digest, Sha256},
    trezoa_account::Account,
    trezoa_hash::Hash,
    trezoa_instruction::{error::InstructionError, AccountMeta, Instruction},
    trezoa_pubkey::Pubkey,
    trezoa_svm_log_collector::LogCollector,
    trezoa_transaction_error::TransactionError,
    std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc, RwLock,
        },
        time::Instant,
    },
};

/// Log target program log lines are re-emitted under.
pub const PROGRAM_LOG_TARGET: &str = "credi_ledger::program_log";

/// The ledger, providing a simple interface for executing Credi
/// instructions.
///
/// All fields can be manipulated through a handful of helper methods, but
/// users can also directly access and modify them if they desire more control.
pub struct Ledger {
    pub config: Config,
    pub program_cache: ProgramCache,
    pub sysvars: Sysvars,
    sequence: AtomicU64,
}

impl Default for Ledger {
    fn default() -> Self {
        trezoa_logger::setup_with_default("credi_ledger=info,credi_ledger::program_log=debug");
        Self {
            config: Config::default(),
            program_cache: ProgramCache::default(),
            sysvars: Sysvars::default(),
            sequence: AtomicU64::new(0),
        }
    }
}

impl CheckContext for Ledger {
    fn is_rent_exempt(&self, lamports: u64, space: usize, owner: Pubkey) -> bool {
        owner.eq(&Pubkey::default()) && lamports == 0
            || self.sysvars.rent.is_exempt(lamports, space)
    }

    fn is_initialized(&self, account: &Account) -> bool {
        if self.program_cache.is_registered(&account.owner) {
            credi_program::state::is_initialized_account(&account.owner, account)
        } else {
            account
                .data
                .get(..8)
                .is_some_and(|discriminator| discriminator.iter().any(|byte| *byte != 0))
        }
    }
}

impl Ledger {
    /// Create a new ledger with the Credi program registered at `program_id`.
    pub fn new(program_id: &Pubkey, config: ProgramConfig) -> Self {
        let mut ledger = Self::default();
        ledger.add_program(program_id, "credi_program", CrediProcessor::new(config));
        ledger
    }

    /// Register a program with the ledger.
    pub fn add_program<P: Processor + 'static>(
        &mut self,
        program_id: &Pubkey,
        name: &str,
        processor: P,
    ) {
        self.program_cache.add_program(program_id, name, processor);
    }

    /// Warp the ledger to a slot by updating the clock.
    pub fn warp_to_slot(&mut self, slot: u64) {
        self.sysvars.warp_to_slot(slot)
    }

    fn next_transaction_id(&self, instruction: &Instruction) -> TransactionId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Sha256::new();
        hasher.update(sequence.to_le_bytes());
        hasher.update(instruction.program_id.as_ref());
        for AccountMeta { pubkey, .. } in &instruction.accounts {
            hasher.update(pubkey.as_ref());
        }
        hasher.update(&instruction.data);
        TransactionId(Hash::new_from_array(hasher.finalize().into()))
    }

    fn process_instruction_chain_element(
        &self,
        index: usize,
        instruction: &Instruction,
        accounts: &[(Pubkey, Account)],
    ) -> InstructionResult {
        let program_id = &instruction.program_id;
        let processor = self
            .program_cache
            .load_program(program_id)
            .or_panic_with(LedgerError::ProgramNotRegistered(program_id));
        let instruction_accounts = compile_accounts(instruction, accounts, &self.program_cache);

        let mut log_collector = LogCollector::default();
        log_collector.log(&format!("Program {program_id} invoke [1]"));

        let start = Instant::now();
        let raw_result = processor.process(&mut Invocation {
            program_id,
            accounts: &instruction_accounts,
            data: &instruction.data,
            rent: &self.sysvars.rent,
            clock: &self.sysvars.clock,
            log_collector: &mut log_collector,
        });
        let execution_time = start.elapsed().as_micros() as u64;

        let verified = raw_result
            .map_err(ProgramResult::Failure)
            .and_then(|delta| {
                verify_delta(index, program_id, &instruction_accounts, &delta)
                    .map(|()| delta)
                    .map_err(ProgramResult::Rejected)
            });

        let (program_result, resulting_accounts, transaction_id) = match verified {
            Ok(delta) => {
                log_collector.log(&format!("Program {program_id} success"));
                (
                    ProgramResult::Success,
                    apply_delta(accounts, &delta),
                    Some(self.next_transaction_id(instruction)),
                )
            }
            Err(program_result) => {
                let reason = match &program_result {
                    ProgramResult::Failure(err) => err.to_string(),
                    ProgramResult::Rejected(err) => err.to_string(),
                    ProgramResult::Success => unreachable!(),
                };
                log_collector.log(&format!("Program {program_id} failed: {reason}"));
                (program_result, accounts.to_vec(), None)
            }
        };

        let logs = log_collector.get_recorded_content().to_vec();
        for line in &logs {
            log::debug!(target: PROGRAM_LOG_TARGET, "{line}");
        }

        InstructionResult {
            execution_time,
            program_result,
            logs,
            resulting_accounts,
            transaction_id,
        }
    }

    fn process_chain(
        &self,
        instructions: &[(&Instruction, &[Check])],
        accounts: &[(Pubkey, Account)],
    ) -> InstructionResult {
        let mut composite_result = InstructionResult {
            resulting_accounts: accounts.to_vec(),
            ..Default::default()
        };

        for (index, (instruction, checks)) in instructions.iter().enumerate() {
            let this_result = self.process_instruction_chain_element(
                index,
                instruction,
                &composite_result.resulting_accounts,
            );

            this_result.run_checks(checks, &self.config, self);

            composite_result.absorb(this_result);

            if composite_result.program_result.is_err() {
                // A failed chain takes no effect at all.
                composite_result.resulting_accounts = accounts.to_vec();
                composite_result.transaction_id = None;
                break;
            }
        }

        composite_result
    }

    /// Process an instruction against the provided accounts. The returned
    /// result is an `InstructionResult`, containing:
    ///
    /// * `execution_time`: The time taken to execute the instruction.
    /// * `program_result`: The result code of the program's execution.
    /// * `logs`: The program log lines.
    /// * `resulting_accounts`: The resulting accounts after the instruction,
    ///   or the unchanged inputs if it failed.
    /// * `transaction_id`: The identifier of a successful transaction.
    ///
    /// Every account the instruction references must be provided, except for
    /// registered programs and builtins.
    pub fn process_instruction(
        &self,
        instruction: &Instruction,
        accounts: &[(Pubkey, Account)],
    ) -> InstructionResult {
        self.process_instruction_chain_element(0, instruction, accounts)
    }

    /// Process a chain of instructions. Account changes are carried from one
    /// instruction to the next. The returned result contains the total
    /// execution time, the logs of every instruction, and the program result
    /// of the _last_ instruction executed.
    ///
    /// The chain stops at the first failure, in which case the resulting
    /// accounts are the unchanged inputs.
    pub fn process_instruction_chain(
        &self,
        instructions: &[Instruction],
        accounts: &[(Pubkey, Account)],
    ) -> InstructionResult {
        let instructions: Vec<(&Instruction, &[Check])> = instructions
            .iter()
            .map(|instruction| (instruction, &[] as &[Check]))
            .collect();
        self.process_chain(&instructions, accounts)
    }

    /// Process an instruction, then perform checks on the result. Panics if
    /// any checks fail, unless `config.panic` is disabled.
    pub fn process_and_validate_instruction(
        &self,
        instruction: &Instruction,
        accounts: &[(Pubkey, Account)],
        checks: &[Check],
    ) -> InstructionResult {
        let result = self.process_instruction(instruction, accounts);
        result.run_checks(checks, &self.config, self);
        result
    }

    /// Process a chain of instructions, performing each instruction's checks
    /// on its own result.
    pub fn process_and_validate_instruction_chain(
        &self,
        instructions: &[(&Instruction, &[Check])],
        accounts: &[(Pubkey, Account)],
    ) -> InstructionResult {
        self.process_chain(instructions, accounts)
    }

    /// Convert this ledger into a `LedgerContext` for stateful testing.
    ///
    /// Program accounts are loaded into the store unless it already holds
    /// accounts at those keys.
    pub fn with_context<AS: AccountStore>(self, mut account_store: AS) -> LedgerContext<AS> {
        self.program_cache
            .get_all_keyed_program_accounts()
            .into_iter()
            .for_each(|(pubkey, account)| {
                if account_store.get_account(&pubkey).is_none() {
                    account_store.store_account(pubkey, account);
                }
            });
        LedgerContext {
            ledger: self,
            account_store: Arc::new(RwLock::new(account_store)),
        }
    }
}

fn apply_delta(accounts: &[(Pubkey, Account)], delta: &StateDelta) -> Vec<(Pubkey, Account)> {
    accounts
        .iter()
        .map(|(pubkey, account)| {
            let account = delta.get(pubkey).unwrap_or(account);
            (*pubkey, account.clone())
        })
        .collect()
}

/// Check the writes a program proposes against the instruction's accounts.
///
/// Programs may only write accounts marked writable. They may change the
/// data and owner of accounts they own, or of fresh system accounts they
/// allocate. They may debit accounts they own, or system accounts that
/// signed. Lamports must balance.
fn verify_delta(
    index: usize,
    program_id: &Pubkey,
    accounts: &[InstructionAccount],
    delta: &StateDelta,
) -> Result<(), TransactionError> {
    let instruction_err = |err| TransactionError::InstructionError(index as u8, err);

    let mut lamports_before: u128 = 0;
    let mut lamports_after: u128 = 0;

    for (pubkey, post) in &delta.writes {
        let Some(pre) = accounts.iter().find(|a| &a.pubkey == pubkey) else {
            return Err(TransactionError::InvalidWritableAccount);
        };
        if !pre.is_writable {
            return Err(TransactionError::InvalidWritableAccount);
        }
        let before = &pre.account;
        let owned = before.owner == *program_id;
        let allocated = before.owner == trezoa_sdk_ids::system_program::ID
            && before.data.is_empty()
            && post.owner == *program_id;

        if post.executable != before.executable {
            return Err(instruction_err(InstructionError::ExecutableModified));
        }
        if post.owner != before.owner && !allocated {
            return Err(instruction_err(InstructionError::ModifiedProgramId));
        }
        if post.data != before.data && !owned && !allocated {
            return Err(instruction_err(InstructionError::ExternalAccountDataModified));
        }
        if post.lamports < before.lamports
            && !owned
            && !(before.owner == trezoa_sdk_ids::system_program::ID && pre.is_signer)
        {
            return Err(instruction_err(InstructionError::ExternalAccountLamportSpend));
        }

        lamports_before += u128::from(before.lamports);
        lamports_after += u128::from(post.lamports);
    }

    if lamports_before != lamports_after {
        return Err(TransactionError::UnbalancedTransaction);
    }
    Ok(())
}

/// An executed transaction that has not been committed yet.
pub struct PendingTransaction {
    loaded: Vec<(Pubkey, Account)>,
    writable: Vec<Pubkey>,
    /// The result of executing against the loaded snapshot.
    pub result: InstructionResult,
}

/// A stateful wrapper around `Ledger` that loads accounts from, and commits
/// them to, an account store.
///
/// Account state is only persisted if execution succeeded and none of the
/// writable accounts changed since they were loaded. Otherwise the store is
/// left untouched.
///
/// The API mirrors `Ledger`, except that the `accounts` slice is no longer
/// required. The context may be shared across threads when the store can.
pub struct LedgerContext<AS: AccountStore> {
    pub ledger: Ledger,
    pub account_store: Arc<RwLock<AS>>,
}

impl<AS: AccountStore> LedgerContext<AS> {
    fn load_account(&self, store: &AS, pubkey: &Pubkey) -> Account {
        // First try the store, then the registered programs, then the
        // store's default.
        store.get_account(pubkey).unwrap_or_else(|| {
            self.ledger
                .program_cache
                .maybe_create_program_account(pubkey)
                .unwrap_or_else(|| store.default_account(pubkey))
        })
    }

    fn load_accounts_for_instructions<'a>(
        &self,
        instructions: impl Iterator<Item = &'a Instruction>,
    ) -> Vec<(Pubkey, Account)> {
        let store = self
            .account_store
            .read()
            .or_panic_with(LedgerError::StorePoisoned);
        let mut seen = HashSet::new();
        instructions
            .flat_map(|instruction| instruction.accounts.iter())
            .filter(|AccountMeta { pubkey, .. }| seen.insert(*pubkey))
            .map(|AccountMeta { pubkey, .. }| (*pubkey, self.load_account(&store, pubkey)))
            .collect()
    }

    fn prepare_with_checks(&self, instructions: &[(&Instruction, &[Check])]) -> PendingTransaction {
        let loaded =
            self.load_accounts_for_instructions(instructions.iter().map(|(ix, _)| *ix));
        let result = self.ledger.process_chain(instructions, &loaded);
        PendingTransaction {
            writable: writable_keys(instructions.iter().map(|(ix, _)| *ix)),
            loaded,
            result,
        }
    }

    /// Execute an instruction against the current store without committing.
    pub fn prepare(&self, instruction: &Instruction) -> PendingTransaction {
        self.prepare_chain(std::slice::from_ref(instruction))
    }

    /// Execute a chain of instructions against the current store without
    /// committing.
    pub fn prepare_chain(&self, instructions: &[Instruction]) -> PendingTransaction {
        let instructions: Vec<(&Instruction, &[Check])> = instructions
            .iter()
            .map(|instruction| (instruction, &[] as &[Check]))
            .collect();
        self.prepare_with_checks(&instructions)
    }

    /// Commit a prepared transaction.
    ///
    /// Under the store's write lock, every writable account is compared with
    /// the snapshot the transaction executed on. On any difference the
    /// transaction is rejected with `TransactionError::AccountInUse` and no
    /// account is written. Failed transactions are returned as is.
    pub fn commit(&self, pending: PendingTransaction) -> InstructionResult {
        let PendingTransaction {
            loaded,
            writable,
            mut result,
        } = pending;
        if result.program_result.is_err() {
            return result;
        }

        let mut store = self
            .account_store
            .write()
            .or_panic_with(LedgerError::StorePoisoned);

        let stale = writable.iter().find(|pubkey| {
            let read = loaded.iter().find(|(k, _)| k == *pubkey).map(|(_, a)| a);
            read != Some(&self.load_account(&store, pubkey))
        });
        if let Some(pubkey) = stale {
            log::warn!("Rejecting transaction: account {pubkey} changed since it was loaded");
            result.program_result = ProgramResult::Rejected(TransactionError::AccountInUse);
            result.resulting_accounts = loaded;
            result.transaction_id = None;
            return result;
        }

        for (pubkey, account) in &result.resulting_accounts {
            let changed = loaded.iter().any(|(k, a)| k == pubkey && a != account);
            if changed && writable.contains(pubkey) {
                store.store_account(*pubkey, account.clone());
            }
        }
        if let Some(transaction_id) = &result.transaction_id {
            log::info!("Committed transaction {transaction_id}");
        }
        result
    }

    /// Process an instruction and commit its writes.
    pub fn process_instruction(&self, instruction: &Instruction) -> InstructionResult {
        self.commit(self.prepare(instruction))
    }

    /// Process a chain of instructions and commit their writes as one unit.
    pub fn process_instruction_chain(&self, instructions: &[Instruction]) -> InstructionResult {
        self.commit(self.prepare_chain(instructions))
    }

    /// Process an instruction, perform checks on the result, and commit.
    ///
    /// The checks see the executed result, before any commit-time rejection.
    pub fn process_and_validate_instruction(
        &self,
        instruction: &Instruction,
        checks: &[Check],
    ) -> InstructionResult {
        self.commit(self.prepare_with_checks(&[(instruction, checks)]))
    }

    /// Process a chain of instructions, perform each instruction's checks,
    /// and commit.
    pub fn process_and_validate_instruction_chain(
        &self,
        instructions: &[(&Instruction, &[Check])],
    ) -> InstructionResult {
        self.commit(self.prepare_with_checks(instructions))
    }

    /// Submit an instruction, returning its transaction identifier on
    /// success or the program result it failed with.
    pub fn submit(&self, instruction: &Instruction) -> Result<TransactionId, ProgramResult> {
        let result = self.process_instruction(instruction);
        match (result.program_result, result.transaction_id) {
            (ProgramResult::Success, Some(transaction_id)) => Ok(transaction_id),
            (program_result, _) => Err(program_result),
        }
    }

    /// Read an account from the store.
    pub fn get_account(&self, pubkey: &Pubkey) -> Option<Account> {
        self.account_store
            .read()
            .or_panic_with(LedgerError::StorePoisoned)
            .get_account(pubkey)
    }
}

