//! The `initialize` handler.

use {
    crate::{
        config::ProgramConfig,
        entrypoint::{InstructionAccount, Invocation, Processor, StateDelta},
        instruction::CrediInstruction,
        state::{AccountState, CrediState},
        system,
    },
    credi_error::error::CrediError,
    trezoa_program_error::ProgramError,
};

/// Processes Credi instructions under a fixed configuration.
#[derive(Clone, Debug, Default)]
pub struct CrediProcessor {
    config: ProgramConfig,
}

impl CrediProcessor {
    pub const fn new(config: ProgramConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &ProgramConfig {
        &self.config
    }
}

impl Processor for CrediProcessor {
    fn process(&self, invocation: &mut Invocation) -> Result<StateDelta, ProgramError> {
        match CrediInstruction::unpack(invocation.data)? {
            CrediInstruction::Initialize => {
                invocation.log("Instruction: Initialize");
                process_initialize(&self.config, invocation)
            }
        }
    }
}

fn process_initialize(
    config: &ProgramConfig,
    invocation: &mut Invocation,
) -> Result<StateDelta, ProgramError> {
    let accounts = invocation.accounts;
    let [target_info, payer_info, system_program_info, ..] = accounts else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    let InstructionAccount {
        pubkey: target,
        account: target_account,
        ..
    } = target_info;
    let InstructionAccount {
        pubkey: payer,
        account: payer_account,
        ..
    } = payer_info;

    if system_program_info.pubkey != trezoa_sdk_ids::system_program::ID {
        return Err(ProgramError::IncorrectProgramId);
    }
    if !payer_info.is_signer || !payer_info.is_writable {
        return Err(CrediError::Unauthorized.into());
    }
    if !target_info.is_writable {
        return Err(ProgramError::InvalidArgument);
    }

    let resolved = config.resolution.resolve(
        invocation.program_id,
        payer,
        target,
        target_info.is_signer,
    )?;

    // Everything below only stages writes. If any step fails, the delta is
    // dropped and no account is touched.
    let space = config.layout.space();
    let mut delta = StateDelta::default();
    let mut target_after = match AccountState::classify(invocation.program_id, target_account)? {
        AccountState::Initialized(_) => return Err(CrediError::AlreadyInitialized.into()),
        AccountState::Absent | AccountState::Prefunded => {
            let allocation = system::create_account(
                payer_account,
                target_account,
                space,
                invocation.program_id,
                invocation.rent,
            )?;
            invocation.log(&format!(
                "Allocated {} bytes for {}, funded with {} lamports",
                space, target, allocation.lamports
            ));
            delta.write(*payer, allocation.payer);
            allocation.target
        }
        AccountState::Allocated => {
            system::check_allocation(target_account, space, invocation.rent)?;
            target_account.clone()
        }
    };

    let state = CrediState::new_initial(
        &resolved.address,
        resolved.bump.unwrap_or_default(),
        payer,
        &config.layout,
        invocation.clock.slot,
    );
    state.pack_into_slice(&mut target_after.data)?;
    delta.write(*target, target_after);

    invocation.log(&format!("Credential mint initialized: {}", resolved.address));
    Ok(delta)
}
