use {
    credi_program::{
        address::{derive_address, AddressResolution, SeedScope, DEFAULT_SEED, MAX_SEED_LEN},
        CrediError,
    },
    trezoa_pubkey::Pubkey,
};

#[test]
fn test_derived_address_is_deterministic() {
    let program_id = credi_program::id();
    let first = derive_address(&program_id, DEFAULT_SEED, SeedScope::Global, &Pubkey::new_unique());
    let second = derive_address(&program_id, DEFAULT_SEED, SeedScope::Global, &Pubkey::new_unique());

    // Global addresses ignore the signer.
    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(
        first,
        Pubkey::try_find_program_address(&[b"mint"], &program_id)
    );

    // And depend on the program.
    let other = derive_address(
        &Pubkey::new_unique(),
        DEFAULT_SEED,
        SeedScope::Global,
        &Pubkey::new_unique(),
    );
    assert_ne!(first, other);
}

#[test]
fn test_per_signer_addresses_differ() {
    let program_id = credi_program::id();
    let alice = Pubkey::new_unique();
    let bob = Pubkey::new_unique();

    let resolution = AddressResolution::per_signer(b"credential");
    let (for_alice, _) = resolution.expected_address(&program_id, &alice).unwrap();
    let (for_bob, _) = resolution.expected_address(&program_id, &bob).unwrap();
    assert_ne!(for_alice, for_bob);
    assert_eq!(
        Some(for_alice),
        resolution
            .expected_address(&program_id, &alice)
            .map(|(address, _)| address)
    );
}

#[test]
fn test_oversized_seed_has_no_address() {
    let seed = [7u8; MAX_SEED_LEN + 1];
    assert_eq!(
        derive_address(
            &credi_program::id(),
            &seed,
            SeedScope::Global,
            &Pubkey::new_unique()
        ),
        None
    );
}

#[test]
fn test_resolve_derived() {
    let program_id = credi_program::id();
    let signer = Pubkey::new_unique();
    let resolution = AddressResolution::default();
    let (expected, bump) = resolution.expected_address(&program_id, &signer).unwrap();

    let resolved = resolution
        .resolve(&program_id, &signer, &expected, false)
        .unwrap();
    assert_eq!(resolved.address, expected);
    assert_eq!(resolved.bump, Some(bump));

    assert_eq!(
        resolution.resolve(&program_id, &signer, &Pubkey::new_unique(), false),
        Err(CrediError::AddressMismatch)
    );
}

#[test]
fn test_resolve_supplied() {
    let program_id = credi_program::id();
    let signer = Pubkey::new_unique();
    let target = Pubkey::new_unique();
    let resolution = AddressResolution::Supplied;

    assert_eq!(
        resolution.resolve(&program_id, &signer, &target, false),
        Err(CrediError::Unauthorized)
    );

    let resolved = resolution
        .resolve(&program_id, &signer, &target, true)
        .unwrap();
    assert_eq!(resolved.address, target);
    assert_eq!(resolved.bump, None);

    // The signer's own wallet is never a valid target.
    assert_eq!(
        resolution.resolve(&program_id, &signer, &signer, true),
        Err(CrediError::AddressMismatch)
    );
}
