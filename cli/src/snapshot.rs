//! JSON ledger snapshots.

use {
    credi_ledger::program::loader_keys::NATIVE_LOADER,
    serde::{Deserialize, Serialize},
    trezoa_account::Account,
    trezoa_pubkey::Pubkey,
    std::{
        collections::{HashMap, HashSet},
        fs::File,
        io::BufReader,
        str::FromStr,
    },
};

#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Snapshot {
    pub accounts: Vec<SnapshotAccount>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SnapshotAccount {
    pub pubkey: String,
    pub lamports: u64,
    pub owner: String,
    /// Hex-encoded account data.
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub executable: bool,
    #[serde(default)]
    pub rent_epoch: u64,
}

impl Snapshot {
    pub fn try_load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn save(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Decode into an account store.
    pub fn into_store(self) -> Result<HashMap<Pubkey, Account>, Box<dyn std::error::Error>> {
        self.accounts
            .into_iter()
            .map(|entry| -> Result<(Pubkey, Account), Box<dyn std::error::Error>> {
                let pubkey = Pubkey::from_str(&entry.pubkey)
                    .map_err(|err| format!("Invalid pubkey `{}`: {err}", entry.pubkey))?;
                let owner = Pubkey::from_str(&entry.owner)
                    .map_err(|err| format!("Invalid owner `{}`: {err}", entry.owner))?;
                let data = hex::decode(&entry.data)
                    .map_err(|err| format!("Invalid data for {pubkey}: {err}"))?;
                let account = Account {
                    lamports: entry.lamports,
                    data,
                    owner,
                    executable: entry.executable,
                    rent_epoch: entry.rent_epoch,
                };
                Ok((pubkey, account))
            })
            .collect()
    }

    /// Encode an account store, sorted by address.
    ///
    /// Program stubs the ledger added to the store are left out, unless the
    /// snapshot was `loaded` with an account at that address.
    pub fn from_store(store: &HashMap<Pubkey, Account>, loaded: &HashSet<Pubkey>) -> Self {
        let mut accounts: Vec<SnapshotAccount> = store
            .iter()
            .filter(|(pubkey, account)| loaded.contains(*pubkey) || !is_program_stub(account))
            .map(|(pubkey, account)| SnapshotAccount {
                pubkey: pubkey.to_string(),
                lamports: account.lamports,
                owner: account.owner.to_string(),
                data: hex::encode(&account.data),
                executable: account.executable,
                rent_epoch: account.rent_epoch,
            })
            .collect();
        accounts.sort_by(|a, b| a.pubkey.cmp(&b.pubkey));
        Self { accounts }
    }
}

fn is_program_stub(account: &Account) -> bool {
    account.executable && account.owner == NATIVE_LOADER
}
