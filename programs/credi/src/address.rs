//! Target address resolution for `initialize`.

use {credi_error::error::CrediError, trezoa_pubkey::Pubkey};

/// The seed of the canonical credential mint address.
pub const DEFAULT_SEED: &[u8] = b"mint";

/// Maximum length of a single derivation seed.
pub const MAX_SEED_LEN: usize = 32;

/// Whether the derived address is shared by every signer or unique to one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeedScope {
    /// Seeds: `[seed]`. One account for the whole program.
    #[default]
    Global,
    /// Seeds: `[seed, signer]`. One account per signer.
    PerSigner,
}

/// How the target account of `initialize` is named.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressResolution {
    /// The target must be the program-derived address of the seeds.
    Derived { seed: Vec<u8>, scope: SeedScope },
    /// The caller names the target. The target must co-sign, since it is a
    /// key-pair account rather than one the program can sign for.
    ///
    /// This is the one mode where the payer is not the only signer. The
    /// payer still authorizes and funds the call, and the target's signature
    /// only proves the caller holds its key. Use `Derived` where a single
    /// signer is required.
    Supplied,
}

impl Default for AddressResolution {
    fn default() -> Self {
        Self::Derived {
            seed: DEFAULT_SEED.to_vec(),
            scope: SeedScope::Global,
        }
    }
}

/// A validated target address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub address: Pubkey,
    /// The canonical bump, for derived addresses only.
    pub bump: Option<u8>,
}

/// Derive the program address for `seed` under the given scope.
///
/// Returns `None` if the seed is too long or no viable bump exists.
pub fn derive_address(
    program_id: &Pubkey,
    seed: &[u8],
    scope: SeedScope,
    signer: &Pubkey,
) -> Option<(Pubkey, u8)> {
    if seed.len() > MAX_SEED_LEN {
        return None;
    }
    match scope {
        SeedScope::Global => Pubkey::try_find_program_address(&[seed], program_id),
        SeedScope::PerSigner => {
            Pubkey::try_find_program_address(&[seed, signer.as_ref()], program_id)
        }
    }
}

impl AddressResolution {
    /// Build a derived resolution scoped to each signer.
    pub fn per_signer(seed: &[u8]) -> Self {
        Self::Derived {
            seed: seed.to_vec(),
            scope: SeedScope::PerSigner,
        }
    }

    /// The address a request from `signer` must target, if it is derived.
    pub fn expected_address(&self, program_id: &Pubkey, signer: &Pubkey) -> Option<(Pubkey, u8)> {
        match self {
            Self::Derived { seed, scope } => derive_address(program_id, seed, *scope, signer),
            Self::Supplied => None,
        }
    }

    /// Validate `target` against this resolution strategy.
    pub fn resolve(
        &self,
        program_id: &Pubkey,
        signer: &Pubkey,
        target: &Pubkey,
        target_is_signer: bool,
    ) -> Result<ResolvedAddress, CrediError> {
        if target == signer {
            return Err(CrediError::AddressMismatch);
        }
        match self {
            Self::Derived { .. } => {
                let (address, bump) = self
                    .expected_address(program_id, signer)
                    .ok_or(CrediError::AddressMismatch)?;
                if address != *target {
                    return Err(CrediError::AddressMismatch);
                }
                Ok(ResolvedAddress {
                    address,
                    bump: Some(bump),
                })
            }
            Self::Supplied => {
                if !target_is_signer {
                    return Err(CrediError::Unauthorized);
                }
                Ok(ResolvedAddress {
                    address: *target,
                    bump: None,
                })
            }
        }
    }
}
