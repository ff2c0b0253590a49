//! The credential mint state and account lifecycle classification.
//!
//! Layout (little-endian, fixed offsets):
//!
//! | offset | size | field            |
//! |-------:|-----:|------------------|
//! | 0      | 8    | discriminator    |
//! | 8      | 1    | version          |
//! | 9      | 1    | bump             |
//! | 10     | 32   | authority        |
//! | 42     | 32   | mint_authority   |
//! | 74     | 1    | freeze tag       |
//! | 75     | 32   | freeze_authority |
//! | 107    | 1    | decimals         |
//! | 108    | 1    | non_transferable |
//! | 109    | 8    | supply           |
//! | 117    | 8    | initialized_slot |

use {
    crate::config::StateLayout, credi_error::error::CrediError, trezoa_account::Account,
    trezoa_program_error::ProgramError, trezoa_pubkey::Pubkey,
};

/// `sha256("account:CredentialMint")[..8]`.
pub const DISCRIMINATOR: [u8; 8] = [238, 26, 57, 27, 254, 89, 58, 152];

pub const STATE_VERSION: u8 = 1;

const VERSION: usize = 8;
const BUMP: usize = 9;
const AUTHORITY: usize = 10;
const MINT_AUTHORITY: usize = 42;
const FREEZE_TAG: usize = 74;
const FREEZE_AUTHORITY: usize = 75;
const DECIMALS: usize = 107;
const NON_TRANSFERABLE: usize = 108;
const SUPPLY: usize = 109;
const INITIALIZED_SLOT: usize = 117;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrediState {
    pub version: u8,
    pub bump: u8,
    /// The signer that funded initialization.
    pub authority: Pubkey,
    pub mint_authority: Pubkey,
    pub freeze_authority: Option<Pubkey>,
    pub decimals: u8,
    pub non_transferable: bool,
    pub supply: u64,
    pub initialized_slot: u64,
}

impl CrediState {
    pub const LEN: usize = 125;

    /// The canonical initial state for the account at `address`. The mint
    /// and freeze authorities are the state account itself.
    pub fn new_initial(
        address: &Pubkey,
        bump: u8,
        authority: &Pubkey,
        layout: &StateLayout,
        slot: u64,
    ) -> Self {
        Self {
            version: STATE_VERSION,
            bump,
            authority: *authority,
            mint_authority: *address,
            freeze_authority: layout.freeze_authority.then_some(*address),
            decimals: layout.decimals,
            non_transferable: layout.non_transferable,
            supply: 0,
            initialized_slot: slot,
        }
    }

    /// Write the discriminator and state into `dst`, zeroing any bytes past
    /// `LEN`.
    pub fn pack_into_slice(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        if dst.len() < Self::LEN {
            return Err(ProgramError::AccountDataTooSmall);
        }
        dst[..VERSION].copy_from_slice(&DISCRIMINATOR);
        dst[VERSION] = self.version;
        dst[BUMP] = self.bump;
        dst[AUTHORITY..MINT_AUTHORITY].copy_from_slice(self.authority.as_ref());
        dst[MINT_AUTHORITY..FREEZE_TAG].copy_from_slice(self.mint_authority.as_ref());
        match &self.freeze_authority {
            Some(freeze_authority) => {
                dst[FREEZE_TAG] = 1;
                dst[FREEZE_AUTHORITY..DECIMALS].copy_from_slice(freeze_authority.as_ref());
            }
            None => {
                dst[FREEZE_TAG] = 0;
                dst[FREEZE_AUTHORITY..DECIMALS].fill(0);
            }
        }
        dst[DECIMALS] = self.decimals;
        dst[NON_TRANSFERABLE] = u8::from(self.non_transferable);
        dst[SUPPLY..INITIALIZED_SLOT].copy_from_slice(&self.supply.to_le_bytes());
        dst[INITIALIZED_SLOT..Self::LEN].copy_from_slice(&self.initialized_slot.to_le_bytes());
        dst[Self::LEN..].fill(0);
        Ok(())
    }

    pub fn unpack(src: &[u8]) -> Result<Self, ProgramError> {
        if src.len() < Self::LEN {
            return Err(ProgramError::AccountDataTooSmall);
        }
        if src[..VERSION] != DISCRIMINATOR || src[VERSION] != STATE_VERSION {
            return Err(ProgramError::InvalidAccountData);
        }
        let freeze_authority = match src[FREEZE_TAG] {
            0 => None,
            1 => Some(read_pubkey(&src[FREEZE_AUTHORITY..DECIMALS])),
            _ => return Err(ProgramError::InvalidAccountData),
        };
        let non_transferable = match src[NON_TRANSFERABLE] {
            0 => false,
            1 => true,
            _ => return Err(ProgramError::InvalidAccountData),
        };
        Ok(Self {
            version: src[VERSION],
            bump: src[BUMP],
            authority: read_pubkey(&src[AUTHORITY..MINT_AUTHORITY]),
            mint_authority: read_pubkey(&src[MINT_AUTHORITY..FREEZE_TAG]),
            freeze_authority,
            decimals: src[DECIMALS],
            non_transferable,
            supply: read_u64(&src[SUPPLY..INITIALIZED_SLOT]),
            initialized_slot: read_u64(&src[INITIALIZED_SLOT..Self::LEN]),
        })
    }
}

fn read_pubkey(src: &[u8]) -> Pubkey {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(src);
    Pubkey::new_from_array(bytes)
}

fn read_u64(src: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(src);
    u64::from_le_bytes(bytes)
}

/// Where an account stands with respect to this program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountState {
    /// No lamports and no data: the account does not exist yet.
    Absent,
    /// System-owned with lamports but no data, for example pre-funded by a
    /// transfer to the derived address.
    Prefunded,
    /// Program-owned with all-zero data.
    Allocated,
    Initialized(CrediState),
}

impl AccountState {
    /// Classify `account` against `program_id`.
    ///
    /// Program-owned data with any non-zero discriminator counts as already
    /// initialized, so foreign or corrupt state is never overwritten.
    pub fn classify(program_id: &Pubkey, account: &Account) -> Result<Self, CrediError> {
        if account.executable {
            return Err(CrediError::OwnershipMismatch);
        }
        if account.owner == *program_id {
            if account.data.len() >= DISCRIMINATOR.len()
                && account.data[..DISCRIMINATOR.len()] == DISCRIMINATOR
            {
                return CrediState::unpack(&account.data)
                    .map(Self::Initialized)
                    .map_err(|_| CrediError::AlreadyInitialized);
            }
            if account.data.iter().all(|byte| *byte == 0) {
                return Ok(Self::Allocated);
            }
            return Err(CrediError::AlreadyInitialized);
        }
        if account.owner == trezoa_sdk_ids::system_program::ID {
            if !account.data.is_empty() {
                return Err(CrediError::OwnershipMismatch);
            }
            if account.lamports == 0 {
                return Ok(Self::Absent);
            }
            return Ok(Self::Prefunded);
        }
        Err(CrediError::OwnershipMismatch)
    }

    pub const fn is_initialized(&self) -> bool {
        matches!(self, Self::Initialized(_))
    }
}

/// Whether `initialize` treats `account` as already initialized.
///
/// A program-owned account is uninitialized only while it classifies as
/// allocated. Anything else it holds, including unreadable state, counts as
/// initialized.
pub fn is_initialized_account(program_id: &Pubkey, account: &Account) -> bool {
    AccountState::classify(program_id, account)
        .map_or(account.owner == *program_id, |state| state.is_initialized())
}
