use {
    credi_ledger::{result::ProgramResult, Ledger, LedgerContext},
    credi_program::{instruction, state::CrediState, CrediError, ProgramConfig},
    rayon::prelude::*,
    trezoa_account::Account,
    trezoa_pubkey::Pubkey,
    trezoa_transaction_error::TransactionError,
    std::collections::HashMap,
};

const BASE_LAMPORTS: u64 = 10_000_000_000;

fn funded_context(payers: &[Pubkey]) -> LedgerContext<HashMap<Pubkey, Account>> {
    let store = payers
        .iter()
        .map(|payer| {
            (
                *payer,
                Account::new(BASE_LAMPORTS, 0, &trezoa_sdk_ids::system_program::id()),
            )
        })
        .collect::<HashMap<_, _>>();
    Ledger::new(&credi_program::ID, ProgramConfig::default()).with_context(store)
}

#[test]
fn test_interleaved_initialize_commits_once() {
    let alice = Pubkey::new_unique();
    let bob = Pubkey::new_unique();
    let context = funded_context(&[alice, bob]);
    let config = ProgramConfig::default();

    let ix_alice = instruction::initialize_derived(&credi_program::ID, &alice, &config).unwrap();
    let ix_bob = instruction::initialize_derived(&credi_program::ID, &bob, &config).unwrap();
    let target = ix_alice.accounts[0].pubkey;
    assert_eq!(target, ix_bob.accounts[0].pubkey);

    // Both read the account while it is still uninitialized.
    let pending_alice = context.prepare(&ix_alice);
    let pending_bob = context.prepare(&ix_bob);
    assert!(pending_alice.result.program_result.is_ok());
    assert!(pending_bob.result.program_result.is_ok());

    let committed = context.commit(pending_alice);
    assert!(committed.program_result.is_ok());
    assert!(committed.transaction_id.is_some());

    let rejected = context.commit(pending_bob);
    assert_eq!(
        rejected.program_result,
        ProgramResult::Rejected(TransactionError::AccountInUse)
    );
    assert!(rejected.transaction_id.is_none());

    // Alice's state stands, and Bob paid nothing.
    let state = CrediState::unpack(&context.get_account(&target).unwrap().data).unwrap();
    assert_eq!(state.authority, alice);
    assert_eq!(context.get_account(&bob).unwrap().lamports, BASE_LAMPORTS);

    // Retrying now observes the committed state.
    assert_eq!(
        context.submit(&ix_bob),
        Err(ProgramResult::Failure(CrediError::AlreadyInitialized.into()))
    );
}

#[test]
fn test_failed_transactions_are_not_committed() {
    let payer = Pubkey::new_unique();
    let context = funded_context(&[]);
    let config = ProgramConfig::default();
    let ix = instruction::initialize_derived(&credi_program::ID, &payer, &config).unwrap();
    let target = ix.accounts[0].pubkey;

    // The payer has no account, so allocation fails.
    assert_eq!(
        context.submit(&ix),
        Err(ProgramResult::Failure(CrediError::AllocationFailed.into()))
    );
    assert_eq!(context.get_account(&target), None);
    assert_eq!(context.get_account(&payer), None);
}

#[test]
fn test_concurrent_initialize_exactly_one_succeeds() {
    let payers: Vec<Pubkey> = (0..32).map(|_| Pubkey::new_unique()).collect();
    let context = funded_context(&payers);
    let config = ProgramConfig::default();

    let instructions: Vec<_> = payers
        .iter()
        .map(|payer| instruction::initialize_derived(&credi_program::ID, payer, &config).unwrap())
        .collect();
    let target = instructions[0].accounts[0].pubkey;

    let outcomes: Vec<_> = instructions
        .par_iter()
        .map(|ix| context.submit(ix))
        .collect();

    let successes: Vec<_> = outcomes
        .iter()
        .zip(&payers)
        .filter_map(|(outcome, payer)| outcome.as_ref().ok().map(|_| *payer))
        .collect();
    assert_eq!(successes.len(), 1);

    for outcome in outcomes.iter().filter_map(|outcome| outcome.as_ref().err()) {
        assert!(
            *outcome == ProgramResult::Failure(CrediError::AlreadyInitialized.into())
                || *outcome == ProgramResult::Rejected(TransactionError::AccountInUse),
            "unexpected outcome: {outcome:?}"
        );
    }

    // Never partially written: the committed state is the winner's, in full.
    let state = CrediState::unpack(&context.get_account(&target).unwrap().data).unwrap();
    assert_eq!(state.authority, successes[0]);
    for payer in payers.iter().filter(|payer| **payer != successes[0]) {
        assert_eq!(context.get_account(payer).unwrap().lamports, BASE_LAMPORTS);
    }
}
