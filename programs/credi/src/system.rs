//! Account allocation, modelled on the system program's `create_account`.
//!
//! The program cannot perform incremental writes, so allocation is computed
//! as the post-state of the payer and the target. The caller folds both
//! into the instruction's delta.

use {
    credi_error::error::CrediError,
    trezoa_account::Account,
    trezoa_pubkey::Pubkey,
    trezoa_rent::Rent,
};

/// Maximum permitted size of account data.
pub const MAX_PERMITTED_DATA_LENGTH: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// The payer after funding the target.
    pub payer: Account,
    /// The target: rent-exempt, zero-filled, assigned to the owner.
    pub target: Account,
    /// Lamports moved from the payer to the target.
    pub lamports: u64,
}

/// Create `target` with `space` bytes owned by `owner`, funded by `payer`.
///
/// A pre-funded target is only topped up to the rent-exempt minimum.
pub fn create_account(
    payer: &Account,
    target: &Account,
    space: usize,
    owner: &Pubkey,
    rent: &Rent,
) -> Result<Allocation, CrediError> {
    if space > MAX_PERMITTED_DATA_LENGTH {
        return Err(CrediError::AllocationFailed);
    }
    // Only a plain system account can be debited by a transfer.
    if payer.owner != trezoa_sdk_ids::system_program::ID || !payer.data.is_empty() {
        return Err(CrediError::AllocationFailed);
    }
    if target.owner != trezoa_sdk_ids::system_program::ID || !target.data.is_empty() {
        return Err(CrediError::AllocationFailed);
    }

    let required = rent.minimum_balance(space);
    let lamports = required.saturating_sub(target.lamports);
    let payer_lamports = payer
        .lamports
        .checked_sub(lamports)
        .ok_or(CrediError::AllocationFailed)?;
    let target_lamports = target
        .lamports
        .checked_add(lamports)
        .ok_or(CrediError::AllocationFailed)?;

    Ok(Allocation {
        payer: Account {
            lamports: payer_lamports,
            ..payer.clone()
        },
        target: Account {
            lamports: target_lamports,
            data: vec![0; space],
            owner: *owner,
            executable: false,
            rent_epoch: target.rent_epoch,
        },
        lamports,
    })
}

/// Check that an account the program already owns can hold `space` bytes
/// and stays rent-exempt.
pub fn check_allocation(target: &Account, space: usize, rent: &Rent) -> Result<(), CrediError> {
    if target.data.len() < space || !rent.is_exempt(target.lamports, target.data.len()) {
        return Err(CrediError::AllocationFailed);
    }
    Ok(())
}
