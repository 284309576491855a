//! Credential operations over the vault.
//!
//! [`CredentialsStore`] is the public surface for username/password secrets:
//! store, retrieve, retrieve-all, update, delete, and bulk delete. It owns
//! the executor logic — invoking vault primitives, mapping status codes onto
//! the error taxonomy, and the add-with-replace retry protocol.
//!
//! # Non-atomicity
//!
//! The vault protocol has no transactions. Replacing an entry (and
//! `update`, which is delete-then-store) runs as two primitives; a crash
//! between them leaves the entry absent. Two concurrent replace sequences
//! racing on the same `(username, tag)` may interleave their delete+insert
//! steps — callers needing atomicity across calls must serialize externally.

use crate::access::{self, AccessControl};
use crate::decode;
use crate::error::Result;
use crate::model::{Credentials, CredentialsFilter, CredentialsTag};
use crate::query::{
    self, AttributeKey, AttributeMap, AttributeValue, ItemClass, MatchLimit,
};
use crate::vault::{Vault, VaultStatus};

/// Synchronous, stateless credential store over an injected vault handle.
///
/// Safe to call from any thread; every operation is a fresh round trip to
/// the vault with no caching in between.
pub struct CredentialsStore<'v> {
    vault: &'v dyn Vault,
}

impl<'v> CredentialsStore<'v> {
    pub fn new(vault: &'v dyn Vault) -> Self {
        Self { vault }
    }

    /// Store a credential pair under `tag`.
    ///
    /// With `replace_duplicates`, an existing entry for the same
    /// `(username, tag)` is deleted and the add retried exactly once with
    /// replacement disabled, so a deletion that silently no-ops cannot
    /// recurse. The delete-then-insert is not transactional (see module
    /// docs).
    ///
    /// # Errors
    ///
    /// Returns [`KeychainError::DuplicateItem`](crate::KeychainError::DuplicateItem)
    /// when the entry exists and replacement is disabled, and
    /// [`KeychainError::AccessControlCreationFailed`](crate::KeychainError::AccessControlCreationFailed)
    /// when `tag` requests secure-enclave storage, which cannot hold
    /// credentials.
    pub fn store(
        &self,
        credentials: &Credentials,
        tag: &CredentialsTag,
        replace_duplicates: bool,
    ) -> Result<()> {
        // Policy check before any vault call.
        let access_control = access::resolve_for_credentials(&tag.storage)?;
        self.store_attempt(credentials, tag, access_control.as_ref(), replace_duplicates)
    }

    fn store_attempt(
        &self,
        credentials: &Credentials,
        tag: &CredentialsTag,
        access_control: Option<&AccessControl>,
        replace: bool,
    ) -> Result<()> {
        let insert = query::add_query(tag, credentials, access_control);
        match self.vault.add(&insert) {
            VaultStatus::Success => {
                tracing::info!(username = credentials.username, "stored credential");
                Ok(())
            }
            VaultStatus::DuplicateItem if replace => {
                let existing = CredentialsFilter::from_tag(tag, Some(&credentials.username));
                match self.vault.delete(&query::delete_query(&existing)) {
                    // A vanished entry means another writer got there first;
                    // the retried add settles it either way.
                    VaultStatus::ItemNotFound => {}
                    status => status.into_result()?,
                }
                self.store_attempt(credentials, tag, access_control, false)
            }
            status => status.into_result(),
        }
    }

    /// Retrieve the credential stored for `username` under `filter`'s scope.
    ///
    /// A missing entry is `Ok(None)`, never an error.
    pub fn retrieve(
        &self,
        username: &str,
        filter: &CredentialsFilter,
    ) -> Result<Option<Credentials>> {
        let mut filter = filter.clone();
        filter.username = Some(username.to_owned());

        // Single lookup: override the builder's match-everything default.
        let extras = AttributeMap::new().with(
            AttributeKey::MatchLimit,
            AttributeValue::Limit(MatchLimit::One),
        );
        let found = self.retrieve_all_with(&filter, Some(&extras))?;
        Ok(found.into_iter().next())
    }

    /// Retrieve every credential matching `filter`.
    ///
    /// An omitted synchronizability filter returns entries from both the
    /// local and the synchronizable scope. Malformed records are skipped,
    /// not errors. No match is an empty vec.
    pub fn retrieve_all(&self, filter: &CredentialsFilter) -> Result<Vec<Credentials>> {
        self.retrieve_all_with(filter, None)
    }

    /// [`retrieve_all`](Self::retrieve_all) with caller-supplied query
    /// entries merged last-writer-wins over the builder defaults.
    pub fn retrieve_all_with(
        &self,
        filter: &CredentialsFilter,
        extras: Option<&AttributeMap>,
    ) -> Result<Vec<Credentials>> {
        let lookup = query::copy_matching_query(filter, extras);
        match self.vault.copy_matching(&lookup) {
            (VaultStatus::ItemNotFound, _) => Ok(Vec::new()),
            (status, records) => {
                status.into_result()?;
                Ok(decode::decode_credentials(&records))
            }
        }
    }

    /// Replace whatever `filter` selects with `new_credentials` filed under
    /// `new_tag`. Defined as delete followed by store; not transactional
    /// (see module docs). Deleting nothing is fine — update doubles as
    /// insert.
    pub fn update(
        &self,
        filter: &CredentialsFilter,
        new_credentials: &Credentials,
        new_tag: &CredentialsTag,
    ) -> Result<()> {
        self.delete(filter)?;
        self.store(new_credentials, new_tag, false)
    }

    /// Delete every entry matching `filter`. Idempotent: a missing entry is
    /// success.
    pub fn delete(&self, filter: &CredentialsFilter) -> Result<()> {
        match self.vault.delete(&query::delete_query(filter)) {
            VaultStatus::ItemNotFound => Ok(()),
            VaultStatus::Success => {
                tracing::info!(?filter, "deleted credentials");
                Ok(())
            }
            status => status.into_result(),
        }
    }

    /// Delete matching entries across both credential item classes.
    ///
    /// Each class is attempted independently: not-found is success, a
    /// non-fatal failure is logged and the remaining classes still run, a
    /// fatal failure (missing entitlement) aborts immediately.
    pub fn delete_all(&self, filter: &CredentialsFilter) -> Result<()> {
        for class in ItemClass::CREDENTIAL_CLASSES {
            let mut wipe = query::delete_query(filter);
            wipe.set(AttributeKey::Class, AttributeValue::Class(class));

            match self.vault.delete(&wipe) {
                VaultStatus::Success | VaultStatus::ItemNotFound => {}
                status => {
                    if let Err(err) = status.into_result() {
                        if err.is_fatal() {
                            return Err(err);
                        }
                        tracing::warn!(
                            class = %class,
                            error = %err,
                            "bulk delete failed for item class, continuing"
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
