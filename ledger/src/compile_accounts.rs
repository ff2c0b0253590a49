//! Instruction account compilation, with key deduplication, privilege
//! merging, and program account stubbing.

use {
    crate::program::ProgramCache,
    credi_error::error::{LedgerError, LedgerPanic},
    credi_program::entrypoint::InstructionAccount,
    trezoa_account::Account,
    trezoa_instruction::Instruction,
    trezoa_pubkey::Pubkey,
};

/// Resolve every account an instruction references.
///
/// A key listed more than once appears once, in the position of its first
/// occurrence, with the union of its signer and writable privileges.
/// Accounts missing from `accounts` fall back to registered program stubs.
/// Anything else missing is a harness misconfiguration and panics.
pub fn compile_accounts(
    instruction: &Instruction,
    accounts: &[(Pubkey, Account)],
    program_cache: &ProgramCache,
) -> Vec<InstructionAccount> {
    let mut compiled: Vec<InstructionAccount> = Vec::with_capacity(instruction.accounts.len());

    for meta in &instruction.accounts {
        if let Some(existing) = compiled.iter_mut().find(|a| a.pubkey == meta.pubkey) {
            existing.is_signer |= meta.is_signer;
            existing.is_writable |= meta.is_writable;
            continue;
        }

        let account = accounts
            .iter()
            .find(|(k, _)| k == &meta.pubkey)
            .map(|(_, a)| a.clone())
            .or_else(|| program_cache.maybe_create_program_account(&meta.pubkey))
            .or_panic_with(LedgerError::AccountMissing(&meta.pubkey));

        compiled.push(InstructionAccount {
            pubkey: meta.pubkey,
            account,
            is_signer: meta.is_signer,
            is_writable: meta.is_writable,
        });
    }

    compiled
}

/// Keys the instructions may write, in instruction order, deduplicated.
pub fn writable_keys<'a>(instructions: impl Iterator<Item = &'a Instruction>) -> Vec<Pubkey> {
    let mut keys = Vec::new();
    instructions
        .flat_map(|instruction| instruction.accounts.iter())
        .filter(|meta| meta.is_writable)
        .for_each(|meta| {
            if !keys.contains(&meta.pubkey) {
                keys.push(meta.pubkey);
            }
        });
    keys
}
