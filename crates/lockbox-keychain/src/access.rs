//! Access-control resolution.
//!
//! Maps a [`StorageOption`] onto the access-control descriptor attached to a
//! vault query. Only secure-hardware storage needs a descriptor: plain
//! entries use the vault's default accessibility and synchronizable entries
//! carry the synchronizable flag on the query instead (the vault refuses a
//! custom descriptor on mirrored items).

use serde::{Deserialize, Serialize};

use crate::error::{KeychainError, Result};
use crate::model::StorageOption;

/// Descriptor attached to a query to constrain where key material lives and
/// what the user must do before it can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    /// Key material is restricted to secure hardware on this device and is
    /// never included in backups or device transfers.
    pub hardware_backed: bool,

    /// Every private-key use requires a biometric or passcode challenge.
    pub user_presence: bool,
}

/// Resolve the access control for a credential entry.
///
/// Secure-enclave storage cannot hold password payloads, only key pairs; a
/// caller requesting it for a credential is rejected here, before any vault
/// call is attempted.
pub fn resolve_for_credentials(storage: &StorageOption) -> Result<Option<AccessControl>> {
    match storage {
        StorageOption::Keychain | StorageOption::KeychainSynchronizable => Ok(None),
        StorageOption::SecureEnclave { .. } => Err(KeychainError::AccessControlCreationFailed {
            reason: "secure enclave storage holds key pairs, not credentials".into(),
        }),
    }
}

/// Resolve the access control for a key pair.
pub fn resolve_for_keys(storage: &StorageOption) -> Result<Option<AccessControl>> {
    match storage {
        StorageOption::Keychain | StorageOption::KeychainSynchronizable => Ok(None),
        StorageOption::SecureEnclave { user_presence } => Ok(Some(AccessControl {
            hardware_backed: true,
            user_presence: *user_presence,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_storage_has_no_descriptor() {
        assert_eq!(resolve_for_credentials(&StorageOption::Keychain).unwrap(), None);
        assert_eq!(resolve_for_keys(&StorageOption::Keychain).unwrap(), None);
    }

    #[test]
    fn synchronizable_storage_has_no_descriptor() {
        // The synchronizable flag lives on the query, not in a descriptor.
        assert_eq!(
            resolve_for_credentials(&StorageOption::KeychainSynchronizable).unwrap(),
            None
        );
        assert_eq!(
            resolve_for_keys(&StorageOption::KeychainSynchronizable).unwrap(),
            None
        );
    }

    #[test]
    fn secure_enclave_for_keys_produces_descriptor() {
        let descriptor = resolve_for_keys(&StorageOption::SecureEnclave {
            user_presence: true,
        })
        .unwrap()
        .unwrap();
        assert!(descriptor.hardware_backed);
        assert!(descriptor.user_presence);

        let descriptor = resolve_for_keys(&StorageOption::SecureEnclave {
            user_presence: false,
        })
        .unwrap()
        .unwrap();
        assert!(descriptor.hardware_backed);
        assert!(!descriptor.user_presence);
    }

    #[test]
    fn secure_enclave_for_credentials_is_rejected() {
        let result = resolve_for_credentials(&StorageOption::SecureEnclave {
            user_presence: false,
        });
        assert!(matches!(
            result,
            Err(KeychainError::AccessControlCreationFailed { .. })
        ));
    }
}
