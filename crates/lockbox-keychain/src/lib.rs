//! Typed credential and key-pair storage over a platform secure vault.
//!
//! This crate maps a small domain model — username/password credentials,
//! credential tags/scopes, and key tags — onto the attribute-query protocol
//! of a platform secure vault (keychain). The vault itself is an external
//! collaborator injected behind the [`Vault`] trait; the value here is the
//! query construction, the access-control and duplicate-handling policy,
//! and the tolerant decoding of results.
//!
//! # Modules
//!
//! - [`model`] — immutable domain value types.
//! - [`query`] — typed attribute maps and the query builders.
//! - [`access`] — storage-scope to access-control resolution.
//! - [`vault`] — the vault primitive protocol and status codes.
//! - [`memory`] — in-memory reference vault (test double).
//! - [`store`] — credential operations.
//! - [`keys`] — key-pair operations.
//! - [`decode`] — raw record decoding.
//! - [`error`] — unified error types.
//!
//! # Quick Start
//!
//! ```rust
//! use lockbox_keychain::memory::MemoryVault;
//! use lockbox_keychain::model::{Credentials, CredentialsFilter, CredentialsTag, StorageOption};
//! use lockbox_keychain::store::CredentialsStore;
//!
//! # fn example() -> lockbox_keychain::Result<()> {
//! // In production this would be the platform vault handle.
//! let vault = MemoryVault::new();
//! let store = CredentialsStore::new(&vault);
//!
//! let tag = CredentialsTag::generic("com.example.app", StorageOption::Keychain);
//! store.store(&Credentials::new("alice", "hunter2"), &tag, false)?;
//!
//! let found = store.retrieve("alice", &CredentialsFilter::for_service("com.example.app"))?;
//! assert_eq!(found.map(|c| c.password.clone()), Some("hunter2".to_owned()));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Concurrency
//!
//! Every operation is a synchronous, reentrant round trip to the vault; the
//! crate holds no mutable state and needs no internal locking. Callers
//! wanting non-blocking behavior offload whole calls to their own execution
//! context. Concurrent replace sequences racing on the same entry are not
//! serialized here.

pub mod access;
pub mod decode;
pub mod error;
pub mod keys;
pub mod memory;
pub mod model;
pub mod query;
pub mod store;
pub mod vault;

// Re-export the most commonly used types at the crate root for convenience.
pub use access::AccessControl;
pub use error::{KeychainError, Result};
pub use keys::KeyStore;
pub use memory::MemoryVault;
pub use model::{
    AccessGroupFilter, Credentials, CredentialsFilter, CredentialsKind, CredentialsTag,
    KeyHandle, KeyPair, KeyTag, StorageOption,
};
pub use query::{AttributeKey, AttributeMap, AttributeValue};
pub use store::CredentialsStore;
pub use vault::{KeyPairRecord, Vault, VaultStatus};
