use {
    credi_program::{
        state::{is_initialized_account, AccountState, CrediState, DISCRIMINATOR},
        CrediError, StateLayout,
    },
    sha2::{Digest, Sha256},
    trezoa_account::Account,
    trezoa_program_error::ProgramError,
    trezoa_pubkey::Pubkey,
};

#[test]
fn test_discriminators_match_their_preimages() {
    let account = Sha256::digest(b"account:CredentialMint");
    assert_eq!(&account[..8], &DISCRIMINATOR);

    let instruction = Sha256::digest(b"global:initialize");
    assert_eq!(
        &instruction[..8],
        &credi_program::instruction::INITIALIZE_DISCRIMINATOR
    );
}

#[test]
fn test_initial_state_layout() {
    let address = Pubkey::new_unique();
    let authority = Pubkey::new_unique();
    let layout = StateLayout::default();

    let state = CrediState::new_initial(&address, 254, &authority, &layout, 42);
    let mut data = vec![0xff; layout.space()];
    state.pack_into_slice(&mut data).unwrap();

    assert_eq!(data.len(), CrediState::LEN + 8);
    assert_eq!(&data[..8], &DISCRIMINATOR);
    assert_eq!(data[8], 1); // version
    assert_eq!(data[9], 254); // bump
    assert_eq!(&data[10..42], authority.as_ref());
    assert_eq!(&data[42..74], address.as_ref());
    assert_eq!(data[74], 1);
    assert_eq!(&data[75..107], address.as_ref());
    assert_eq!(data[107], 0); // decimals
    assert_eq!(data[108], 1); // non-transferable
    assert_eq!(&data[109..117], &0u64.to_le_bytes());
    assert_eq!(&data[117..125], &42u64.to_le_bytes());
    // Reserved space is zeroed, whatever was there before.
    assert!(data[CrediState::LEN..].iter().all(|byte| *byte == 0));

    assert_eq!(CrediState::unpack(&data).unwrap(), state);
}

#[test]
fn test_initial_state_without_freeze_authority() {
    let address = Pubkey::new_unique();
    let layout = StateLayout {
        freeze_authority: false,
        decimals: 2,
        ..Default::default()
    };
    let state = CrediState::new_initial(&address, 0, &Pubkey::new_unique(), &layout, 0);
    assert_eq!(state.freeze_authority, None);
    assert_eq!(state.decimals, 2);

    let mut data = vec![0; CrediState::LEN];
    state.pack_into_slice(&mut data).unwrap();
    assert_eq!(data[74], 0);
    assert!(data[75..107].iter().all(|byte| *byte == 0));
}

#[test]
fn test_unpack_rejects_bad_data() {
    assert_eq!(
        CrediState::unpack(&[0; 10]),
        Err(ProgramError::AccountDataTooSmall)
    );
    assert_eq!(
        CrediState::unpack(&[0; CrediState::LEN]),
        Err(ProgramError::InvalidAccountData)
    );

    let state = CrediState::new_initial(
        &Pubkey::new_unique(),
        1,
        &Pubkey::new_unique(),
        &StateLayout::default(),
        0,
    );
    let mut data = vec![0; CrediState::LEN];
    state.pack_into_slice(&mut data).unwrap();
    data[108] = 7;
    assert_eq!(
        CrediState::unpack(&data),
        Err(ProgramError::InvalidAccountData)
    );

    assert_eq!(
        state.pack_into_slice(&mut [0; 12]),
        Err(ProgramError::AccountDataTooSmall)
    );
}

#[test]
fn test_classify_account_lifecycle() {
    let program_id = credi_program::id();
    let system = trezoa_sdk_ids::system_program::id();

    // Does not exist.
    assert_eq!(
        AccountState::classify(&program_id, &Account::default()),
        Ok(AccountState::Absent)
    );

    // Someone transferred lamports to the address ahead of time.
    assert_eq!(
        AccountState::classify(&program_id, &Account::new(1_000, 0, &system)),
        Ok(AccountState::Prefunded)
    );

    // Allocated by the program, still zeroed.
    assert_eq!(
        AccountState::classify(&program_id, &Account::new(1_000_000, 133, &program_id)),
        Ok(AccountState::Allocated)
    );

    // Initialized.
    let address = Pubkey::new_unique();
    let state = CrediState::new_initial(
        &address,
        3,
        &Pubkey::new_unique(),
        &StateLayout::default(),
        9,
    );
    let mut account = Account::new(1_000_000, CrediState::LEN, &program_id);
    state.pack_into_slice(&mut account.data).unwrap();
    assert_eq!(
        AccountState::classify(&program_id, &account),
        Ok(AccountState::Initialized(state))
    );
    assert!(is_initialized_account(&program_id, &account));

    // Same bytes under another owner.
    account.owner = Pubkey::new_unique();
    assert_eq!(
        AccountState::classify(&program_id, &account),
        Err(CrediError::OwnershipMismatch)
    );
    assert!(!is_initialized_account(&program_id, &account));
}

#[test]
fn test_classify_never_treats_foreign_data_as_uninitialized() {
    let program_id = credi_program::id();

    // Program-owned, but holding some other state.
    let mut account = Account::new(1_000_000, CrediState::LEN, &program_id);
    account.data[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(
        AccountState::classify(&program_id, &account),
        Err(CrediError::AlreadyInitialized)
    );
    assert!(is_initialized_account(&program_id, &account));

    // Our discriminator followed by garbage.
    account.data[..8].copy_from_slice(&DISCRIMINATOR);
    account.data[8] = 99;
    assert_eq!(
        AccountState::classify(&program_id, &account),
        Err(CrediError::AlreadyInitialized)
    );
    assert!(is_initialized_account(&program_id, &account));

    // A valid version with an invalid freeze tag.
    account.data[8] = 1;
    account.data[74] = 2;
    assert_eq!(
        AccountState::classify(&program_id, &account),
        Err(CrediError::AlreadyInitialized)
    );
    assert!(is_initialized_account(&program_id, &account));

    // System-owned with data (e.g. a nonce account).
    let nonce = Account::new(1_000_000, 80, &trezoa_sdk_ids::system_program::id());
    assert_eq!(
        AccountState::classify(&program_id, &nonce),
        Err(CrediError::OwnershipMismatch)
    );
    assert!(!is_initialized_account(&program_id, &nonce));

    // Executable accounts are never targets.
    let mut program = Account::new(1, 0, &trezoa_sdk_ids::native_loader::id());
    program.executable = true;
    assert_eq!(
        AccountState::classify(&program_id, &program),
        Err(CrediError::OwnershipMismatch)
    );
}
