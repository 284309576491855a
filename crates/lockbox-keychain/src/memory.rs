//! In-memory reference vault.
//!
//! [`MemoryVault`] implements the full attribute-matching semantics of the
//! platform vault in process memory: class and field equality, tri-state
//! synchronizable matching, duplicate detection on insert, match limits, and
//! return-flag handling. It backs every test in this crate and is exported
//! so downstream callers can use it as a drop-in test double.
//!
//! Nothing here is secure storage — entries live in plain memory and vanish
//! with the process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::query::{AttributeKey, AttributeMap, AttributeValue, MatchLimit, SyncMatch};
use crate::vault::{KeyPairRecord, Vault, VaultStatus, CODE_PARAM};

/// Query fields that participate in matching. Everything else (return
/// flags, match limit, payload, partition flag) is control data.
const FILTER_KEYS: [AttributeKey; 8] = [
    AttributeKey::Account,
    AttributeKey::Service,
    AttributeKey::Server,
    AttributeKey::AccessGroup,
    AttributeKey::ApplicationTag,
    AttributeKey::KeyClass,
    AttributeKey::KeyType,
    AttributeKey::Label,
];

/// Fields forming an entry's identity for duplicate detection.
const IDENTITY_KEYS: [AttributeKey; 6] = [
    AttributeKey::Class,
    AttributeKey::Account,
    AttributeKey::Service,
    AttributeKey::Server,
    AttributeKey::AccessGroup,
    AttributeKey::Synchronizable,
];

/// Process-memory vault honoring the attribute protocol.
#[derive(Debug, Default)]
pub struct MemoryVault {
    items: RwLock<Vec<AttributeMap>>,
    denied_groups: RwLock<Vec<String>>,
    key_counter: AtomicU64,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a missing entitlement: any query naming `group` as its
    /// access group fails with the missing-entitlement status.
    pub fn deny_access_group(&self, group: impl Into<String>) {
        self.denied_groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(group.into());
    }

    /// Number of entries currently held. Test observability only.
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_denied(&self, query: &AttributeMap) -> bool {
        match query.str_value(AttributeKey::AccessGroup) {
            Some(group) => self
                .denied_groups
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .any(|g| g == group),
            None => false,
        }
    }

    /// Whether a stored item satisfies every filtering field of `query`.
    fn matches(stored: &AttributeMap, query: &AttributeMap) -> bool {
        if let Some(wanted) = query.class_value() {
            if stored.class_value() != Some(wanted) {
                return false;
            }
        }

        for key in FILTER_KEYS {
            if let Some(wanted) = query.get(key) {
                if stored.get(key) != Some(wanted) {
                    return false;
                }
            }
        }

        match query.sync_value() {
            // Explicit wildcard: both scopes match.
            Some(SyncMatch::Any) | None => true,
            Some(SyncMatch::Only(flag)) => stored.sync_value() == Some(SyncMatch::Only(flag)),
        }
    }

    /// Whether two entries collide on identity (class, account, namespace,
    /// access group, synchronization scope).
    fn same_identity(a: &AttributeMap, b: &AttributeMap) -> bool {
        IDENTITY_KEYS.iter().all(|key| a.get(*key) == b.get(*key))
    }

    /// Project a stored item into a result record per the query's return
    /// flags.
    fn project(stored: &AttributeMap, query: &AttributeMap) -> AttributeMap {
        let attributes = query.bool_value(AttributeKey::ReturnAttributes) == Some(true);
        let data = query.bool_value(AttributeKey::ReturnData) == Some(true);
        let key_ref = query.bool_value(AttributeKey::ReturnRef) == Some(true);

        let mut record = AttributeMap::new();
        for (key, value) in stored.iter() {
            let include = match key {
                AttributeKey::ValueData => data,
                AttributeKey::KeyRef => key_ref,
                AttributeKey::UseDataProtection | AttributeKey::AccessControl => false,
                _ => attributes,
            };
            if include {
                record.set(*key, value.clone());
            }
        }
        record
    }
}

impl Vault for MemoryVault {
    fn add(&self, query: &AttributeMap) -> VaultStatus {
        if self.is_denied(query) {
            return VaultStatus::MissingEntitlement;
        }
        if query.class_value().is_none() {
            return VaultStatus::Other(CODE_PARAM);
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if items.iter().any(|stored| Self::same_identity(stored, query)) {
            return VaultStatus::DuplicateItem;
        }

        items.push(query.clone());
        VaultStatus::Success
    }

    fn copy_matching(&self, query: &AttributeMap) -> (VaultStatus, Vec<AttributeMap>) {
        if self.is_denied(query) {
            return (VaultStatus::MissingEntitlement, Vec::new());
        }
        // The protocol requires at least one return flag on copy queries.
        let any_return = [
            AttributeKey::ReturnAttributes,
            AttributeKey::ReturnData,
            AttributeKey::ReturnRef,
        ]
        .iter()
        .any(|key| query.bool_value(*key) == Some(true));
        if !any_return {
            return (VaultStatus::Other(CODE_PARAM), Vec::new());
        }

        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let mut records: Vec<AttributeMap> = items
            .iter()
            .filter(|stored| Self::matches(stored, query))
            .map(|stored| Self::project(stored, query))
            .collect();

        if records.is_empty() {
            return (VaultStatus::ItemNotFound, records);
        }
        if query.limit_value() == Some(MatchLimit::One) {
            records.truncate(1);
        }
        (VaultStatus::Success, records)
    }

    fn delete(&self, query: &AttributeMap) -> VaultStatus {
        if self.is_denied(query) {
            return VaultStatus::MissingEntitlement;
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let before = items.len();
        items.retain(|stored| !Self::matches(stored, query));

        if items.len() == before {
            VaultStatus::ItemNotFound
        } else {
            VaultStatus::Success
        }
    }

    fn generate_key_pair(&self, query: &AttributeMap) -> (VaultStatus, Option<KeyPairRecord>) {
        if self.is_denied(query) {
            return (VaultStatus::MissingEntitlement, None);
        }

        let Some(tag) = query.str_value(AttributeKey::ApplicationTag) else {
            return (VaultStatus::Other(CODE_PARAM), None);
        };
        let Some(key_type) = query.get(AttributeKey::KeyType).cloned() else {
            return (VaultStatus::Other(CODE_PARAM), None);
        };
        let size = query.uint_value(AttributeKey::KeySizeBits).unwrap_or(256);
        let sync = query.sync_value().unwrap_or(SyncMatch::Only(false));

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        // A key pair is already filed under this tag.
        if items.iter().any(|stored| {
            stored.class_value() == Some(crate::query::ItemClass::Key)
                && stored.str_value(AttributeKey::ApplicationTag) == Some(tag)
        }) {
            return (VaultStatus::DuplicateItem, None);
        }

        let serial = self.key_counter.fetch_add(1, Ordering::Relaxed);
        let mut halves = Vec::with_capacity(2);
        for key_class in [crate::query::KeyClass::Public, crate::query::KeyClass::Private] {
            let handle = format!("mem-key:{tag}:{}:{serial}", key_class.as_str());
            let mut item = AttributeMap::new()
                .with(
                    AttributeKey::Class,
                    AttributeValue::Class(crate::query::ItemClass::Key),
                )
                .with(
                    AttributeKey::ApplicationTag,
                    AttributeValue::Str(tag.to_owned()),
                )
                .with(AttributeKey::KeyType, key_type.clone())
                .with(
                    AttributeKey::KeyClass,
                    AttributeValue::KeyClass(key_class),
                )
                .with(AttributeKey::KeySizeBits, AttributeValue::Uint(size))
                .with(AttributeKey::Synchronizable, AttributeValue::Sync(sync))
                .with(
                    AttributeKey::KeyRef,
                    AttributeValue::Bytes(handle.into_bytes()),
                );
            if let Some(descriptor) = query.access_control_value() {
                item.set(
                    AttributeKey::AccessControl,
                    AttributeValue::AccessControl(descriptor),
                );
            }
            halves.push(item);
        }

        items.extend(halves.iter().cloned());
        drop(items);

        let record = KeyPairRecord {
            public_key: halves[0].clone(),
            private_key: halves[1].clone(),
        };
        (VaultStatus::Success, Some(record))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
