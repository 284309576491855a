//! The vault primitive protocol.
//!
//! The platform vault is an external, process-wide resource. Rather than
//! reaching for it as a global, every operation in this crate takes an
//! injected [`Vault`] handle — which is also what makes the whole crate
//! testable against [`MemoryVault`](crate::memory::MemoryVault).
//!
//! The protocol is four primitives: add, copy-matching, delete, and key-pair
//! generation. There is no update primitive; updates are done as delete plus
//! add. Every primitive returns a [`VaultStatus`] rather than an error so
//! the executor layer owns the mapping onto the error taxonomy.

use crate::error::{KeychainError, Result};
use crate::query::AttributeMap;

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// Platform status code for "item not found" (`errSecItemNotFound`).
pub const CODE_ITEM_NOT_FOUND: i32 = -25300;
/// Platform status code for "duplicate item" (`errSecDuplicateItem`).
pub const CODE_DUPLICATE_ITEM: i32 = -25299;
/// Platform status code for "missing entitlement" (`errSecMissingEntitlement`).
pub const CODE_MISSING_ENTITLEMENT: i32 = -34018;
/// Platform status code for "invalid parameters" (`errSecParam`).
pub const CODE_PARAM: i32 = -50;

/// Outcome of a vault primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultStatus {
    Success,
    ItemNotFound,
    DuplicateItem,
    MissingEntitlement,
    /// Any other platform status code, passed through opaquely.
    Other(i32),
}

impl VaultStatus {
    /// Map a raw platform status code into the known domain.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            CODE_ITEM_NOT_FOUND => Self::ItemNotFound,
            CODE_DUPLICATE_ITEM => Self::DuplicateItem,
            CODE_MISSING_ENTITLEMENT => Self::MissingEntitlement,
            other => Self::Other(other),
        }
    }

    /// Map onto the error taxonomy. Success becomes `Ok(())`; everything
    /// else becomes the corresponding typed error.
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Success => Ok(()),
            Self::ItemNotFound => Err(KeychainError::ItemNotFound),
            Self::DuplicateItem => Err(KeychainError::DuplicateItem),
            Self::MissingEntitlement => Err(KeychainError::MissingEntitlement),
            Self::Other(code) => Err(KeychainError::Other(code)),
        }
    }
}

// ---------------------------------------------------------------------------
// Protocol trait
// ---------------------------------------------------------------------------

/// Raw records returned by the vault's key-pair generator, one per half.
/// Each record carries at least the key-ref attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPairRecord {
    pub public_key: AttributeMap,
    pub private_key: AttributeMap,
}

/// Capability handle for the platform vault.
///
/// Implementations must be `Send + Sync`; every call is a synchronous round
/// trip with no caching on either side. The crate defines no cancellation
/// or timeout contract — the call either returns or the caller's execution
/// context imposes a deadline.
pub trait Vault: Send + Sync {
    /// Insert a new entry described by `query`.
    fn add(&self, query: &AttributeMap) -> VaultStatus;

    /// Return every entry matching `query`, honoring its return flags and
    /// match limit. The batch is finite and fully materialized.
    fn copy_matching(&self, query: &AttributeMap) -> (VaultStatus, Vec<AttributeMap>);

    /// Remove every entry matching `query`.
    fn delete(&self, query: &AttributeMap) -> VaultStatus;

    /// Generate an asymmetric key pair as described by `query` and file both
    /// halves in the vault. The cryptography is entirely the vault's; this
    /// crate only constructs the request.
    fn generate_key_pair(&self, query: &AttributeMap) -> (VaultStatus, Option<KeyPairRecord>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_mapping() {
        assert_eq!(VaultStatus::from_code(0), VaultStatus::Success);
        assert_eq!(VaultStatus::from_code(-25300), VaultStatus::ItemNotFound);
        assert_eq!(VaultStatus::from_code(-25299), VaultStatus::DuplicateItem);
        assert_eq!(
            VaultStatus::from_code(-34018),
            VaultStatus::MissingEntitlement
        );
        assert_eq!(VaultStatus::from_code(-50), VaultStatus::Other(-50));
    }

    #[test]
    fn status_into_result() {
        assert!(VaultStatus::Success.into_result().is_ok());
        assert!(matches!(
            VaultStatus::ItemNotFound.into_result(),
            Err(KeychainError::ItemNotFound)
        ));
        assert!(matches!(
            VaultStatus::DuplicateItem.into_result(),
            Err(KeychainError::DuplicateItem)
        ));
        assert!(matches!(
            VaultStatus::MissingEntitlement.into_result(),
            Err(KeychainError::MissingEntitlement)
        ));
        assert!(matches!(
            VaultStatus::Other(-50).into_result(),
            Err(KeychainError::Other(-50))
        ));
    }
}
