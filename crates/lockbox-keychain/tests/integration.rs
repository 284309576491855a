//! Integration tests for the lockbox-keychain crate.
//!
//! These tests exercise the full lifecycle of credentials and key pairs
//! against the in-memory reference vault: store, retrieve, update, delete,
//! and the scope/synchronizability semantics.

use lockbox_keychain::keys::DEFAULT_KEY_SIZE_BITS;
use lockbox_keychain::model::CredentialsTag;
use lockbox_keychain::{
    Credentials, CredentialsFilter, CredentialsStore, KeyStore, KeyTag, KeychainError,
    MemoryVault, StorageOption,
};

/// Route structured logs through the test harness, honoring `RUST_LOG`.
fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ═══════════════════════════════════════════════════════════════════════
//  Credential lifecycle
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn credential_store_update_delete_scenario() {
    init_tracing();
    let vault = MemoryVault::new();
    let store = CredentialsStore::new(&vault);

    let tag = CredentialsTag::generic("svc", StorageOption::Keychain);
    let filter = CredentialsFilter::for_service("svc");

    // Store.
    store
        .store(&Credentials::new("@a", "p1"), &tag, false)
        .unwrap();

    // Retrieve.
    let found = store.retrieve("@a", &filter).unwrap().unwrap();
    assert_eq!(found.username, "@a");
    assert_eq!(found.password, "p1");

    // Update to a new username and password.
    store
        .update(
            &filter.clone().with_username("@a"),
            &Credentials::new("@b", "p2"),
            &tag,
        )
        .unwrap();
    assert_eq!(store.retrieve("@a", &filter).unwrap(), None);
    let moved = store.retrieve("@b", &filter).unwrap().unwrap();
    assert_eq!(moved.username, "@b");
    assert_eq!(moved.password, "p2");

    // Delete, then verify the lookup is a clean miss, not an error.
    store
        .delete(&filter.clone().with_username("@b"))
        .unwrap();
    assert_eq!(store.retrieve("@b", &filter).unwrap(), None);
}

#[test]
fn replace_semantics_end_to_end() {
    init_tracing();
    let vault = MemoryVault::new();
    let store = CredentialsStore::new(&vault);
    let tag = CredentialsTag::generic("svc", StorageOption::Keychain);
    let filter = CredentialsFilter::for_service("svc");

    store
        .store(&Credentials::new("alice", "old"), &tag, false)
        .unwrap();

    // Rejected without opt-in, entry untouched.
    let result = store.store(&Credentials::new("alice", "new"), &tag, false);
    assert!(matches!(result, Err(KeychainError::DuplicateItem)));
    assert_eq!(
        store.retrieve("alice", &filter).unwrap().unwrap().password,
        "old"
    );

    // Replaced with opt-in, exactly one entry remains.
    store
        .store(&Credentials::new("alice", "new"), &tag, true)
        .unwrap();
    let all = store.retrieve_all(&filter).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].password, "new");
}

#[test]
fn synchronizable_and_local_scopes_are_independent() {
    init_tracing();
    let vault = MemoryVault::new();
    let store = CredentialsStore::new(&vault);
    let filter = CredentialsFilter::for_service("svc");

    store
        .store(
            &Credentials::new("alice", "local-pw"),
            &CredentialsTag::generic("svc", StorageOption::Keychain),
            false,
        )
        .unwrap();
    store
        .store(
            &Credentials::new("alice", "synced-pw"),
            &CredentialsTag::generic("svc", StorageOption::KeychainSynchronizable),
            false,
        )
        .unwrap();

    // No synchronizability filter: entries from both scopes come back.
    let all = store.retrieve_all(&filter).unwrap();
    assert_eq!(all.len(), 2);

    // Pinned filters see exactly one scope each.
    assert_eq!(
        store
            .retrieve("alice", &filter.clone().with_synchronizable(false))
            .unwrap()
            .unwrap()
            .password,
        "local-pw"
    );
    assert_eq!(
        store
            .retrieve("alice", &filter.clone().with_synchronizable(true))
            .unwrap()
            .unwrap()
            .password,
        "synced-pw"
    );

    // Deleting one scope leaves the other retrievable.
    store
        .delete(
            &filter
                .clone()
                .with_username("alice")
                .with_synchronizable(true),
        )
        .unwrap();
    assert!(store
        .retrieve("alice", &filter.clone().with_synchronizable(true))
        .unwrap()
        .is_none());
    assert!(store
        .retrieve("alice", &filter.clone().with_synchronizable(false))
        .unwrap()
        .is_some());
}

#[test]
fn generic_and_internet_namespaces_are_distinct() {
    init_tracing();
    let vault = MemoryVault::new();
    let store = CredentialsStore::new(&vault);

    store
        .store(
            &Credentials::new("alice", "generic-pw"),
            &CredentialsTag::generic("example.com", StorageOption::Keychain),
            false,
        )
        .unwrap();
    store
        .store(
            &Credentials::new("alice", "internet-pw"),
            &CredentialsTag::internet("example.com", StorageOption::Keychain),
            false,
        )
        .unwrap();

    assert_eq!(
        store
            .retrieve("alice", &CredentialsFilter::for_service("example.com"))
            .unwrap()
            .unwrap()
            .password,
        "generic-pw"
    );
    assert_eq!(
        store
            .retrieve("alice", &CredentialsFilter::for_server("example.com"))
            .unwrap()
            .unwrap()
            .password,
        "internet-pw"
    );

    // Bulk delete sweeps both classes.
    store.delete_all(&CredentialsFilter::default()).unwrap();
    assert!(vault.is_empty());
}

#[test]
fn metadata_survives_the_round_trip() {
    init_tracing();
    let vault = MemoryVault::new();
    let store = CredentialsStore::new(&vault);
    let tag = CredentialsTag::generic("svc", StorageOption::Keychain);

    let mut creds = Credentials::new("alice", "pw");
    creds.label = Some("work account".into());
    creds.description = Some("CI deploy login".into());
    creds.comment = Some("rotated quarterly".into());

    store.store(&creds, &tag, false).unwrap();
    let found = store
        .retrieve("alice", &CredentialsFilter::for_service("svc"))
        .unwrap()
        .unwrap();
    assert_eq!(found, creds);
}

// ═══════════════════════════════════════════════════════════════════════
//  Key pair lifecycle
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn key_pair_lifecycle() {
    init_tracing();
    let vault = MemoryVault::new();
    let keys = KeyStore::new(&vault);
    let tag = KeyTag::new("com.example.signing");

    // Create.
    let pair = keys
        .create_key(
            &tag,
            DEFAULT_KEY_SIZE_BITS,
            &StorageOption::SecureEnclave {
                user_presence: true,
            },
        )
        .unwrap();

    // Retrieve both halves.
    assert_eq!(
        keys.retrieve_public_key(&tag).unwrap().as_ref(),
        Some(&pair.public_key)
    );
    assert_eq!(
        keys.retrieve_private_key(&tag).unwrap().as_ref(),
        Some(&pair.private_key)
    );

    // Delete, twice — the second pass must also succeed.
    keys.delete_keys(&tag).unwrap();
    keys.delete_keys(&tag).unwrap();
    assert_eq!(keys.retrieve_public_key(&tag).unwrap(), None);
}

#[test]
fn credentials_and_keys_share_a_vault_without_interference() {
    init_tracing();
    let vault = MemoryVault::new();
    let store = CredentialsStore::new(&vault);
    let keys = KeyStore::new(&vault);

    store
        .store(
            &Credentials::new("alice", "pw"),
            &CredentialsTag::generic("svc", StorageOption::Keychain),
            false,
        )
        .unwrap();
    keys.create_key(
        &KeyTag::new("com.example.signing"),
        DEFAULT_KEY_SIZE_BITS,
        &StorageOption::Keychain,
    )
    .unwrap();

    // Wiping credentials leaves the key pair alone.
    store.delete_all(&CredentialsFilter::default()).unwrap();
    assert!(keys
        .retrieve_private_key(&KeyTag::new("com.example.signing"))
        .unwrap()
        .is_some());
}
