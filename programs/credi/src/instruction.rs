//! Instruction encoding and builders.

use {
    crate::config::ProgramConfig,
    trezoa_instruction::{AccountMeta, Instruction},
    trezoa_program_error::ProgramError,
    trezoa_pubkey::Pubkey,
};

/// `sha256("global:initialize")[..8]`.
pub const INITIALIZE_DISCRIMINATOR: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrediInstruction {
    /// Create and initialize the credential mint state.
    ///
    /// Accounts expected:
    ///
    /// 0. `[writable]` The target state account. Must also sign when the
    ///    program is configured for caller-supplied addresses.
    /// 1. `[writable, signer]` The payer and authority.
    /// 2. `[]` The system program.
    Initialize,
}

impl CrediInstruction {
    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::Initialize => INITIALIZE_DISCRIMINATOR.to_vec(),
        }
    }

    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        if data == INITIALIZE_DISCRIMINATOR.as_slice() {
            Ok(Self::Initialize)
        } else {
            Err(ProgramError::InvalidInstructionData)
        }
    }
}

fn initialize_with_metas(
    program_id: &Pubkey,
    payer: &Pubkey,
    target: &Pubkey,
    target_is_signer: bool,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &CrediInstruction::Initialize.pack(),
        vec![
            AccountMeta::new(*target, target_is_signer),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(trezoa_sdk_ids::system_program::ID, false),
        ],
    )
}

/// Build `initialize` for a program-derived target.
pub fn initialize(program_id: &Pubkey, payer: &Pubkey, target: &Pubkey) -> Instruction {
    initialize_with_metas(program_id, payer, target, false)
}

/// Build `initialize` for a caller-supplied target, which co-signs.
pub fn initialize_signed_target(
    program_id: &Pubkey,
    payer: &Pubkey,
    target: &Pubkey,
) -> Instruction {
    initialize_with_metas(program_id, payer, target, true)
}

/// Build `initialize` targeting the address `config` derives for `payer`.
///
/// Returns `None` when the configuration expects a caller-supplied target.
pub fn initialize_derived(
    program_id: &Pubkey,
    payer: &Pubkey,
    config: &ProgramConfig,
) -> Option<Instruction> {
    let (target, _) = config.resolution.expected_address(program_id, payer)?;
    Some(initialize(program_id, payer, &target))
}
