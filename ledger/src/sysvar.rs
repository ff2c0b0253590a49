//! Sysvars visible to programs executed by the ledger.

use {trezoa_clock::Clock, trezoa_rent::Rent};

/// The ledger's sysvars.
#[derive(Clone, Debug, Default)]
pub struct Sysvars {
    pub clock: Clock,
    pub rent: Rent,
}

impl Sysvars {
    /// Warp the clock to a slot. Slots never move backwards.
    pub fn warp_to_slot(&mut self, slot: u64) {
        if slot < self.clock.slot {
            log::warn!(
                "Ignoring warp from slot {} back to slot {}",
                self.clock.slot,
                slot
            );
            return;
        }
        self.clock.slot = slot;
    }
}
