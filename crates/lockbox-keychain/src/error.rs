//! Keychain error types.
//!
//! All operations in this crate surface errors through [`KeychainError`],
//! which mirrors the status domain of the underlying platform vault. Each
//! variant carries enough context for callers to decide how to handle the
//! failure without inspecting opaque strings.
//!
//! # Propagation policy
//!
//! - [`KeychainError::ItemNotFound`] is non-fatal and is absorbed at read
//!   sites (empty result) and delete sites (success).
//! - [`KeychainError::DuplicateItem`] is recoverable via the replace-duplicate
//!   retry in [`CredentialsStore::store`](crate::store::CredentialsStore::store),
//!   otherwise surfaced.
//! - All other variants propagate to the immediate caller untouched.

/// Unified error type for the Lockbox keychain.
#[derive(Debug, thiserror::Error)]
pub enum KeychainError {
    /// No vault entry matched the query.
    ///
    /// Read paths coerce this to an empty result and delete paths coerce it
    /// to success; it only reaches callers through unmediated vault calls.
    #[error("item not found in vault")]
    ItemNotFound,

    /// An entry with the same identity already exists in the vault.
    #[error("duplicate item in vault")]
    DuplicateItem,

    /// The process lacks the entitlement required to reach the vault.
    ///
    /// This is a fatal configuration error and is never retried.
    #[error("process is missing the vault access entitlement")]
    MissingEntitlement,

    /// The requested access-control policy could not be produced.
    #[error("access control creation failed: {reason}")]
    AccessControlCreationFailed { reason: String },

    /// A vault record violated the expected attribute contract.
    #[error("unexpected record shape: {reason}")]
    UnexpectedRecordShape { reason: String },

    /// Opaque passthrough of an unmapped vault status code.
    #[error("vault returned unmapped status {0}")]
    Other(i32),
}

impl KeychainError {
    /// Whether this error aborts a tolerant bulk operation.
    ///
    /// Bulk deletes continue past non-fatal per-class failures but must stop
    /// immediately on configuration or policy errors.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingEntitlement | Self::AccessControlCreationFailed { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KeychainError>;
