//! YAML check files.

use {
    credi_ledger::result::Check,
    serde::Deserialize,
    trezoa_program_error::ProgramError,
    trezoa_pubkey::Pubkey,
    std::{fs::File, io::BufReader, str::FromStr},
};

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub checks: Vec<CheckEntry>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CheckEntry {
    Named(NamedCheck),
    Error { error: u32 },
    Account { account: AccountCheckEntry },
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NamedCheck {
    Success,
    AllRentExempt,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountCheckEntry {
    pub pubkey: String,
    pub initialized: Option<bool>,
    pub owner: Option<String>,
    pub space: Option<usize>,
    pub lamports: Option<u64>,
    #[serde(default)]
    pub rent_exempt: bool,
}

/// A check with its addresses decoded, so `Check`s can borrow them.
pub enum ResolvedCheck {
    Success,
    AllRentExempt,
    Error(u32),
    Account {
        pubkey: Pubkey,
        initialized: Option<bool>,
        owner: Option<Pubkey>,
        space: Option<usize>,
        lamports: Option<u64>,
        rent_exempt: bool,
    },
}

fn parse_pubkey(value: &str) -> Result<Pubkey, Box<dyn std::error::Error>> {
    Pubkey::from_str(value).map_err(|err| format!("Invalid pubkey `{value}`: {err}").into())
}

impl ConfigFile {
    pub fn try_load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(BufReader::new(file))?)
    }

    pub fn resolve(&self) -> Result<Vec<ResolvedCheck>, Box<dyn std::error::Error>> {
        self.checks
            .iter()
            .map(|entry| -> Result<ResolvedCheck, Box<dyn std::error::Error>> {
                Ok(match entry {
                    CheckEntry::Named(NamedCheck::Success) => ResolvedCheck::Success,
                    CheckEntry::Named(NamedCheck::AllRentExempt) => ResolvedCheck::AllRentExempt,
                    CheckEntry::Error { error } => ResolvedCheck::Error(*error),
                    CheckEntry::Account { account } => ResolvedCheck::Account {
                        pubkey: parse_pubkey(&account.pubkey)?,
                        initialized: account.initialized,
                        owner: account.owner.as_deref().map(parse_pubkey).transpose()?,
                        space: account.space,
                        lamports: account.lamports,
                        rent_exempt: account.rent_exempt,
                    },
                })
            })
            .collect()
    }
}

impl ResolvedCheck {
    pub fn to_check(&self) -> Check<'_> {
        match self {
            ResolvedCheck::Success => Check::success(),
            ResolvedCheck::AllRentExempt => Check::all_rent_exempt(),
            ResolvedCheck::Error(code) => Check::err(ProgramError::Custom(*code)),
            ResolvedCheck::Account {
                pubkey,
                initialized,
                owner,
                space,
                lamports,
                rent_exempt,
            } => {
                let mut check = Check::account(pubkey);
                match initialized {
                    Some(true) => check = check.initialized(),
                    Some(false) => check = check.uninitialized(),
                    None => {}
                }
                if let Some(owner) = owner {
                    check = check.owner(owner);
                }
                if let Some(space) = space {
                    check = check.space(*space);
                }
                if let Some(lamports) = lamports {
                    check = check.lamports(*lamports);
                }
                if *rent_exempt {
                    check = check.rent_exempt();
                }
                check.build()
            }
        }
    }
}
