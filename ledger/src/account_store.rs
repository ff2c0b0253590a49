//! A trait for implementing an account store, to be used with the
//! `LedgerContext`.

use {trezoa_account::Account, trezoa_pubkey::Pubkey, std::collections::HashMap};

/// A trait for implementing an account store, to be used with the
/// `LedgerContext`.
///
/// The store only needs single-account reads and writes. The context
/// serializes commits behind its own lock, so a batch of writes is never
/// observed half-applied.
pub trait AccountStore {
    /// Returns the account to use when no account exists at `pubkey`.
    fn default_account(&self, _pubkey: &Pubkey) -> Account {
        Account::default()
    }

    /// Get an account at the given public key.
    fn get_account(&self, pubkey: &Pubkey) -> Option<Account>;

    /// Store an account at the given public key.
    fn store_account(&mut self, pubkey: Pubkey, account: Account);
}

impl AccountStore for HashMap<Pubkey, Account> {
    fn get_account(&self, pubkey: &Pubkey) -> Option<Account> {
        self.get(pubkey).cloned()
    }

    fn store_account(&mut self, pubkey: Pubkey, account: Account) {
        self.insert(pubkey, account);
    }
}
