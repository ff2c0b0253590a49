//! Module for working with programs registered on the ledger.

use {
    credi_program::entrypoint::Processor,
    trezoa_account::Account,
    trezoa_pubkey::Pubkey,
    trezoa_rent::Rent,
    std::{collections::HashMap, sync::Arc},
};

/// Loader keys, re-exported from `trezoa_sdk_ids` for convenience.
pub mod loader_keys {
    pub use trezoa_sdk_ids::native_loader::ID as NATIVE_LOADER;
}

/// Builtins whose accounts are always available, even though the ledger
/// never invokes them directly.
const BUILTINS: &[(Pubkey, &str)] = &[(trezoa_sdk_ids::system_program::ID, "system_program")];

struct CacheEntry {
    name: String,
    processor: Arc<dyn Processor>,
}

/// Programs the ledger can invoke, keyed by program ID.
#[derive(Default)]
pub struct ProgramCache {
    entries: HashMap<Pubkey, CacheEntry>,
}

impl ProgramCache {
    /// Register a program, replacing any previous registration.
    pub fn add_program<P: Processor + 'static>(
        &mut self,
        program_id: &Pubkey,
        name: &str,
        processor: P,
    ) {
        self.entries.insert(
            *program_id,
            CacheEntry {
                name: name.to_string(),
                processor: Arc::new(processor),
            },
        );
    }

    /// Load a program from the cache.
    pub fn load_program(&self, program_id: &Pubkey) -> Option<Arc<dyn Processor>> {
        self.entries
            .get(program_id)
            .map(|entry| Arc::clone(&entry.processor))
    }

    pub fn is_registered(&self, program_id: &Pubkey) -> bool {
        self.entries.contains_key(program_id)
    }

    // Program accounts are stubs. The ledger invokes processors directly, so
    // the accounts only exist to satisfy account lookups.
    pub(crate) fn get_all_keyed_program_accounts(&self) -> Vec<(Pubkey, Account)> {
        self.entries
            .iter()
            .map(|(program_id, entry)| {
                create_keyed_account_for_builtin_program(program_id, &entry.name)
            })
            .chain(BUILTINS.iter().map(|(program_id, name)| {
                create_keyed_account_for_builtin_program(program_id, name)
            }))
            .collect()
    }

    pub(crate) fn maybe_create_program_account(&self, pubkey: &Pubkey) -> Option<Account> {
        if let Some(entry) = self.entries.get(pubkey) {
            return Some(create_keyed_account_for_builtin_program(pubkey, &entry.name).1);
        }
        BUILTINS
            .iter()
            .find(|(program_id, _)| program_id == pubkey)
            .map(|(program_id, name)| create_keyed_account_for_builtin_program(program_id, name).1)
    }
}

/// Create a key and account for a builtin program.
pub fn create_keyed_account_for_builtin_program(
    program_id: &Pubkey,
    name: &str,
) -> (Pubkey, Account) {
    let data = name.as_bytes().to_vec();
    let lamports = Rent::default().minimum_balance(data.len());
    let account = Account {
        lamports,
        data,
        owner: loader_keys::NATIVE_LOADER,
        executable: true,
        ..Default::default()
    };
    (*program_id, account)
}
