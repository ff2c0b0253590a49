//! Program configuration: address resolution and the initial state layout.

use crate::{address::AddressResolution, state::CrediState};

/// Extension headroom allocated after the state, zero-filled.
pub const DEFAULT_RESERVED_SPACE: usize = 8;

/// Values written into a freshly initialized account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateLayout {
    /// Credentials are whole units by default.
    pub decimals: u8,
    /// Set the state account itself as freeze authority.
    pub freeze_authority: bool,
    pub non_transferable: bool,
    /// Zeroed bytes allocated past `CrediState::LEN`.
    pub reserved_space: usize,
}

impl Default for StateLayout {
    fn default() -> Self {
        Self {
            decimals: 0,
            freeze_authority: true,
            non_transferable: true,
            reserved_space: DEFAULT_RESERVED_SPACE,
        }
    }
}

impl StateLayout {
    /// Total bytes allocated for the account.
    pub const fn space(&self) -> usize {
        CrediState::LEN + self.reserved_space
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramConfig {
    pub resolution: AddressResolution,
    pub layout: StateLayout,
}

impl ProgramConfig {
    /// Configuration where the caller names (and co-signs for) the target.
    pub fn supplied() -> Self {
        Self {
            resolution: AddressResolution::Supplied,
            ..Default::default()
        }
    }

    /// Configuration deriving one account per signer from `seed`.
    pub fn per_signer(seed: &[u8]) -> Self {
        Self {
            resolution: AddressResolution::per_signer(seed),
            ..Default::default()
        }
    }
}
