use {
    credi_ledger::{
        result::{Check, ProgramResult},
        Ledger,
    },
    credi_program::entrypoint::{Invocation, Processor, StateDelta},
    trezoa_account::Account,
    trezoa_instruction::{error::InstructionError, AccountMeta, Instruction},
    trezoa_program_error::ProgramError,
    trezoa_pubkey::Pubkey,
    trezoa_transaction_error::TransactionError,
};

/// A program that proposes a fixed set of writes derived from its accounts.
struct Stub(fn(&Invocation) -> StateDelta);

impl Processor for Stub {
    fn process(&self, invocation: &mut Invocation) -> Result<StateDelta, ProgramError> {
        Ok((self.0)(&*invocation))
    }
}

const OWNED: usize = 0;
const EXTERNAL: usize = 1;
const FUNDER: usize = 2;
const READONLY: usize = 3;

/// Stage `index` with `edit` applied to its pre-instruction state.
fn edited(invocation: &Invocation, index: usize, edit: impl FnOnce(&mut Account)) -> StateDelta {
    let mut delta = StateDelta::default();
    stage(&mut delta, invocation, index, edit);
    delta
}

fn stage(
    delta: &mut StateDelta,
    invocation: &Invocation,
    index: usize,
    edit: impl FnOnce(&mut Account),
) {
    let info = &invocation.accounts[index];
    let mut account = info.account.clone();
    edit(&mut account);
    delta.write(info.pubkey, account);
}

fn write_readonly(invocation: &Invocation) -> StateDelta {
    edited(invocation, READONLY, |_| {})
}

fn write_unlisted(_: &Invocation) -> StateDelta {
    let mut delta = StateDelta::default();
    delta.write(Pubkey::new_unique(), Account::default());
    delta
}

fn flip_executable(invocation: &Invocation) -> StateDelta {
    edited(invocation, OWNED, |account| account.executable = true)
}

fn reassign_external(invocation: &Invocation) -> StateDelta {
    let program_id = *invocation.program_id;
    edited(invocation, EXTERNAL, |account| account.owner = program_id)
}

fn write_external_data(invocation: &Invocation) -> StateDelta {
    edited(invocation, EXTERNAL, |account| account.data[0] = 1)
}

fn move_from_funder(invocation: &Invocation) -> StateDelta {
    let mut delta = StateDelta::default();
    stage(&mut delta, invocation, OWNED, |account| account.lamports += 100);
    stage(&mut delta, invocation, FUNDER, |account| account.lamports -= 100);
    delta
}

fn mint_lamports(invocation: &Invocation) -> StateDelta {
    edited(invocation, OWNED, |account| account.lamports += 1)
}

struct Fixture {
    ledger: Ledger,
    program_id: Pubkey,
    keys: [Pubkey; 4],
    accounts: Vec<(Pubkey, Account)>,
}

impl Fixture {
    fn new(stub: fn(&Invocation) -> StateDelta) -> Self {
        let program_id = Pubkey::new_unique();
        let mut ledger = Ledger::default();
        ledger.add_program(&program_id, "stub", Stub(stub));

        let keys = [(); 4].map(|_| Pubkey::new_unique());
        let system = trezoa_sdk_ids::system_program::id();
        let accounts = vec![
            (keys[OWNED], Account::new(1_000, 8, &program_id)),
            (keys[EXTERNAL], Account::new(1_000, 8, &Pubkey::new_unique())),
            (keys[FUNDER], Account::new(1_000, 0, &system)),
            (keys[READONLY], Account::new(1_000, 0, &system)),
        ];

        Self {
            ledger,
            program_id,
            keys,
            accounts,
        }
    }

    fn instruction(&self, funder_signs: bool) -> Instruction {
        Instruction::new_with_bytes(
            self.program_id,
            &[],
            vec![
                AccountMeta::new(self.keys[OWNED], false),
                AccountMeta::new(self.keys[EXTERNAL], false),
                AccountMeta::new(self.keys[FUNDER], funder_signs),
                AccountMeta::new_readonly(self.keys[READONLY], false),
            ],
        )
    }

    fn assert_rejected(&self, error: TransactionError) {
        let result = self.ledger.process_and_validate_instruction(
            &self.instruction(false),
            &self.accounts,
            &[Check::rejected(error)],
        );
        assert_eq!(result.resulting_accounts, self.accounts);
        assert!(result.transaction_id.is_none());
    }
}

#[test]
fn test_writes_outside_writable_accounts_are_rejected() {
    Fixture::new(write_readonly).assert_rejected(TransactionError::InvalidWritableAccount);
    Fixture::new(write_unlisted).assert_rejected(TransactionError::InvalidWritableAccount);
}

#[test]
fn test_executable_flag_is_immutable() {
    Fixture::new(flip_executable).assert_rejected(TransactionError::InstructionError(
        0,
        InstructionError::ExecutableModified,
    ));
}

#[test]
fn test_external_accounts_are_protected() {
    Fixture::new(reassign_external).assert_rejected(TransactionError::InstructionError(
        0,
        InstructionError::ModifiedProgramId,
    ));
    Fixture::new(write_external_data).assert_rejected(TransactionError::InstructionError(
        0,
        InstructionError::ExternalAccountDataModified,
    ));
}

#[test]
fn test_debits_require_ownership_or_signature() {
    let fixture = Fixture::new(move_from_funder);
    fixture.assert_rejected(TransactionError::InstructionError(
        0,
        InstructionError::ExternalAccountLamportSpend,
    ));

    // Once the funder signs, the same transfer goes through.
    let result = fixture.ledger.process_and_validate_instruction(
        &fixture.instruction(true),
        &fixture.accounts,
        &[
            Check::success(),
            Check::account(&fixture.keys[OWNED]).lamports(1_100).build(),
            Check::account(&fixture.keys[FUNDER]).lamports(900).build(),
        ],
    );
    assert!(result.transaction_id.is_some());
}

#[test]
fn test_lamports_must_balance() {
    Fixture::new(mint_lamports).assert_rejected(TransactionError::UnbalancedTransaction);
}

#[test]
fn test_rejection_reports_chain_position() {
    let mut fixture = Fixture::new(move_from_funder);
    let flipper = Pubkey::new_unique();
    fixture
        .ledger
        .add_program(&flipper, "flipper", Stub(flip_executable));

    let transfer = fixture.instruction(true);
    let mut flip = fixture.instruction(true);
    flip.program_id = flipper;

    // The flipper does not own the account it flips, but the executable
    // check runs first.
    let result = fixture.ledger.process_and_validate_instruction_chain(
        &[(&transfer, &[Check::success()][..]), (&flip, &[][..])],
        &fixture.accounts,
    );
    assert_eq!(
        result.program_result,
        ProgramResult::Rejected(TransactionError::InstructionError(
            1,
            InstructionError::ExecutableModified,
        ))
    );
    assert_eq!(result.resulting_accounts, fixture.accounts);
}
