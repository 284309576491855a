//! Asymmetric key-pair operations over the vault.
//!
//! [`KeyStore`] drives the vault's key-pair generator and looks up the
//! resulting opaque handles by application tag. The cryptography — key
//! generation, hardware residency, presence prompting — belongs entirely to
//! the vault; this module only constructs the requests and decodes the
//! handles.
//!
//! Hardware-backed storage is mutually exclusive with synchronization,
//! which the [`StorageOption`] shape already guarantees: the secure-enclave
//! variant has no synchronizable form.

use crate::access;
use crate::decode;
use crate::error::{KeychainError, Result};
use crate::model::{KeyAlgorithm, KeyHandle, KeyPair, KeyTag, StorageOption};
use crate::query::{self, KeyClass};
use crate::vault::{Vault, VaultStatus};

/// Default key size for the elliptic-curve algorithm.
pub const DEFAULT_KEY_SIZE_BITS: u32 = 256;

/// Synchronous, stateless key store over an injected vault handle.
pub struct KeyStore<'v> {
    vault: &'v dyn Vault,
}

impl<'v> KeyStore<'v> {
    pub fn new(vault: &'v dyn Vault) -> Self {
        Self { vault }
    }

    /// Generate a key pair filed under `tag`.
    ///
    /// All three storage options are valid for keys. Secure-enclave storage
    /// attaches an access-control descriptor requiring hardware-backed
    /// residency, plus a presence challenge on each private-key use when
    /// requested.
    pub fn create_key(
        &self,
        tag: &KeyTag,
        size_bits: u32,
        storage: &StorageOption,
    ) -> Result<KeyPair> {
        let access_control = access::resolve_for_keys(storage)?;
        let request = query::generate_key_query(
            tag,
            KeyAlgorithm::EllipticCurve,
            size_bits,
            storage.synchronizable(),
            access_control.as_ref(),
        );

        let (status, record) = self.vault.generate_key_pair(&request);
        status.into_result()?;
        let record = record.ok_or_else(|| KeychainError::UnexpectedRecordShape {
            reason: "key generation succeeded but returned no record".into(),
        })?;

        let pair = KeyPair {
            public_key: decode::decode_key_ref(&record.public_key)?,
            private_key: decode::decode_key_ref(&record.private_key)?,
        };
        tracing::info!(tag = %tag, size_bits, "created key pair");
        Ok(pair)
    }

    /// Look up the public half of the pair filed under `tag`.
    ///
    /// A missing key is `Ok(None)`, never an error.
    pub fn retrieve_public_key(&self, tag: &KeyTag) -> Result<Option<KeyHandle>> {
        self.retrieve_half(tag, KeyClass::Public)
    }

    /// Look up the private half of the pair filed under `tag`.
    pub fn retrieve_private_key(&self, tag: &KeyTag) -> Result<Option<KeyHandle>> {
        self.retrieve_half(tag, KeyClass::Private)
    }

    fn retrieve_half(&self, tag: &KeyTag, key_class: KeyClass) -> Result<Option<KeyHandle>> {
        let lookup = query::key_query(tag, KeyAlgorithm::EllipticCurve, key_class);
        match self.vault.copy_matching(&lookup) {
            (VaultStatus::ItemNotFound, _) => Ok(None),
            (status, records) => {
                status.into_result()?;
                let record =
                    records
                        .first()
                        .ok_or_else(|| KeychainError::UnexpectedRecordShape {
                            reason: "key lookup succeeded with an empty batch".into(),
                        })?;
                Ok(Some(decode::decode_key_ref(record)?))
            }
        }
    }

    /// Delete both halves of the pair filed under `tag`.
    ///
    /// Idempotent per half. A non-fatal failure on one half is logged and
    /// the other half is still attempted; a fatal failure aborts.
    pub fn delete_keys(&self, tag: &KeyTag) -> Result<()> {
        for key_class in [KeyClass::Public, KeyClass::Private] {
            let wipe = query::key_delete_query(tag, KeyAlgorithm::EllipticCurve, key_class);
            match self.vault.delete(&wipe) {
                VaultStatus::Success | VaultStatus::ItemNotFound => {}
                status => {
                    if let Err(err) = status.into_result() {
                        if err.is_fatal() {
                            return Err(err);
                        }
                        tracing::warn!(
                            tag = %tag,
                            half = key_class.as_str(),
                            error = %err,
                            "key delete failed for one half, continuing"
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
