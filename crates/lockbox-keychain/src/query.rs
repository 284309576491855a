//! Typed attribute maps and query construction.
//!
//! The vault speaks a dictionary protocol: every primitive takes a mapping
//! of attribute name to value. Assembling those mappings ad hoc is where
//! most keychain bugs live, so this module keeps the whole vocabulary in two
//! closed enums ([`AttributeKey`], [`AttributeValue`]) and builds every
//! query through pure functions from domain values.
//!
//! # Normalization rules
//!
//! - An omitted selector field produces no entry — the vault does not filter
//!   on it — with one exception: an omitted synchronizability filter emits
//!   an explicit *match both* wildcard, because the vault's own default is
//!   to silently exclude synchronizable entries.
//! - The presence of a server value selects the internet-password item
//!   class; absence selects the generic-password class.
//! - Caller-supplied extra entries merge last-writer-wins over builder
//!   defaults.
//! - The data-protection partition flag is set unconditionally on every
//!   query.

use crate::access::AccessControl;
use crate::model::{
    AccessGroupFilter, Credentials, CredentialsFilter, CredentialsKind, CredentialsTag,
    KeyAlgorithm, KeyTag,
};

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// The vault's item classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemClass {
    GenericPassword,
    InternetPassword,
    Key,
}

impl ItemClass {
    /// The two classes a credential entry can live in, in bulk-delete order.
    pub const CREDENTIAL_CLASSES: [ItemClass; 2] =
        [ItemClass::GenericPassword, ItemClass::InternetPassword];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenericPassword => "generic-password",
            Self::InternetPassword => "internet-password",
            Self::Key => "key",
        }
    }
}

impl std::fmt::Display for ItemClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which half of an asymmetric key pair an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    Public,
    Private,
}

impl KeyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

/// How many records a copy-matching call may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchLimit {
    One,
    All,
}

/// Tri-state synchronizability matcher.
///
/// `Only(bool)` pins one scope; `Any` is the explicit wildcard matching
/// entries in both scopes. Add queries always use `Only` — a new entry has
/// exactly one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMatch {
    Only(bool),
    Any,
}

/// Closed set of attribute names the vault protocol understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKey {
    Class,
    Account,
    Service,
    Server,
    ValueData,
    Synchronizable,
    AccessGroup,
    AccessControl,
    Label,
    Description,
    Comment,
    ApplicationTag,
    KeyType,
    KeyClass,
    KeySizeBits,
    KeyRef,
    ReturnAttributes,
    ReturnData,
    ReturnRef,
    MatchLimit,
    UseDataProtection,
}

impl AttributeKey {
    /// Stable name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Account => "account",
            Self::Service => "service",
            Self::Server => "server",
            Self::ValueData => "value-data",
            Self::Synchronizable => "synchronizable",
            Self::AccessGroup => "access-group",
            Self::AccessControl => "access-control",
            Self::Label => "label",
            Self::Description => "description",
            Self::Comment => "comment",
            Self::ApplicationTag => "application-tag",
            Self::KeyType => "key-type",
            Self::KeyClass => "key-class",
            Self::KeySizeBits => "key-size-bits",
            Self::KeyRef => "key-ref",
            Self::ReturnAttributes => "return-attributes",
            Self::ReturnData => "return-data",
            Self::ReturnRef => "return-ref",
            Self::MatchLimit => "match-limit",
            Self::UseDataProtection => "use-data-protection",
        }
    }
}

/// The value shapes attribute entries carry.
#[derive(Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Str(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Uint(u32),
    Class(ItemClass),
    KeyClass(KeyClass),
    KeyType(KeyAlgorithm),
    Sync(SyncMatch),
    Limit(MatchLimit),
    AccessControl(AccessControl),
}

impl std::fmt::Debug for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "Str({s:?})"),
            // Byte payloads may be password material; show only the length.
            Self::Bytes(b) => write!(f, "Bytes(<{} bytes>)", b.len()),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Uint(n) => write!(f, "Uint({n})"),
            Self::Class(c) => write!(f, "Class({c})"),
            Self::KeyClass(k) => write!(f, "KeyClass({})", k.as_str()),
            Self::KeyType(t) => write!(f, "KeyType({t:?})"),
            Self::Sync(s) => write!(f, "Sync({s:?})"),
            Self::Limit(l) => write!(f, "Limit({l:?})"),
            Self::AccessControl(a) => write!(f, "AccessControl({a:?})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Attribute map
// ---------------------------------------------------------------------------

/// Insertion-ordered attribute mapping with last-writer-wins `set`.
///
/// This is the single shape every vault primitive consumes and produces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeMap {
    entries: Vec<(AttributeKey, AttributeValue)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any earlier value for the same key.
    pub fn set(&mut self, key: AttributeKey, value: AttributeValue) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Builder-style `set`.
    pub fn with(mut self, key: AttributeKey, value: AttributeValue) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: AttributeKey) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, key: AttributeKey) -> bool {
        self.get(key).is_some()
    }

    /// Merge `extras` over this map, overriding existing entries for the
    /// same key (last-writer-wins).
    pub fn merge(&mut self, extras: &AttributeMap) {
        for (key, value) in extras.iter() {
            self.set(*key, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(AttributeKey, AttributeValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // -- Typed accessors ----------------------------------------------------

    pub fn str_value(&self, key: AttributeKey) -> Option<&str> {
        match self.get(key) {
            Some(AttributeValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn bytes_value(&self, key: AttributeKey) -> Option<&[u8]> {
        match self.get(key) {
            Some(AttributeValue::Bytes(b)) => Some(b),
            _ => None,
        }
    }

    pub fn bool_value(&self, key: AttributeKey) -> Option<bool> {
        match self.get(key) {
            Some(AttributeValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn uint_value(&self, key: AttributeKey) -> Option<u32> {
        match self.get(key) {
            Some(AttributeValue::Uint(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn class_value(&self) -> Option<ItemClass> {
        match self.get(AttributeKey::Class) {
            Some(AttributeValue::Class(c)) => Some(*c),
            _ => None,
        }
    }

    pub fn key_class_value(&self) -> Option<KeyClass> {
        match self.get(AttributeKey::KeyClass) {
            Some(AttributeValue::KeyClass(k)) => Some(*k),
            _ => None,
        }
    }

    pub fn sync_value(&self) -> Option<SyncMatch> {
        match self.get(AttributeKey::Synchronizable) {
            Some(AttributeValue::Sync(s)) => Some(*s),
            _ => None,
        }
    }

    pub fn limit_value(&self) -> Option<MatchLimit> {
        match self.get(AttributeKey::MatchLimit) {
            Some(AttributeValue::Limit(l)) => Some(*l),
            _ => None,
        }
    }

    pub fn access_control_value(&self) -> Option<AccessControl> {
        match self.get(AttributeKey::AccessControl) {
            Some(AttributeValue::AccessControl(a)) => Some(*a),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Credential queries
// ---------------------------------------------------------------------------

/// Build the insert query for a credential: selector, password payload, and
/// access-control attributes.
pub fn add_query(
    tag: &CredentialsTag,
    credentials: &Credentials,
    access_control: Option<&AccessControl>,
) -> AttributeMap {
    let mut query = AttributeMap::new();

    let class = match &tag.kind {
        CredentialsKind::GenericPassword { service } => {
            query.set(
                AttributeKey::Class,
                AttributeValue::Class(ItemClass::GenericPassword),
            );
            query.set(AttributeKey::Service, AttributeValue::Str(service.clone()));
            ItemClass::GenericPassword
        }
        CredentialsKind::InternetPassword { server } => {
            query.set(
                AttributeKey::Class,
                AttributeValue::Class(ItemClass::InternetPassword),
            );
            query.set(AttributeKey::Server, AttributeValue::Str(server.clone()));
            ItemClass::InternetPassword
        }
    };

    query.set(
        AttributeKey::Account,
        AttributeValue::Str(credentials.username.clone()),
    );
    query.set(
        AttributeKey::ValueData,
        AttributeValue::Bytes(credentials.password.as_bytes().to_vec()),
    );
    query.set(
        AttributeKey::Synchronizable,
        AttributeValue::Sync(SyncMatch::Only(tag.storage.synchronizable())),
    );

    if let Some(group) = &tag.access_group {
        query.set(AttributeKey::AccessGroup, AttributeValue::Str(group.clone()));
    }
    if let Some(label) = &credentials.label {
        query.set(AttributeKey::Label, AttributeValue::Str(label.clone()));
    }
    if let Some(description) = &credentials.description {
        query.set(
            AttributeKey::Description,
            AttributeValue::Str(description.clone()),
        );
    }
    if let Some(comment) = &credentials.comment {
        query.set(AttributeKey::Comment, AttributeValue::Str(comment.clone()));
    }
    if let Some(descriptor) = access_control {
        query.set(
            AttributeKey::AccessControl,
            AttributeValue::AccessControl(*descriptor),
        );
    }

    query.set(AttributeKey::UseDataProtection, AttributeValue::Bool(true));

    tracing::debug!(class = %class, account = credentials.username, "built add query");
    query
}

/// Shared selector base for copy-matching and delete queries.
fn selector_query(filter: &CredentialsFilter) -> AttributeMap {
    let mut query = AttributeMap::new();

    // A server value selects the internet-password class; its absence
    // selects generic-password. Callers who mean a generic credential must
    // never supply a server string.
    if let Some(server) = &filter.server {
        query.set(
            AttributeKey::Class,
            AttributeValue::Class(ItemClass::InternetPassword),
        );
        query.set(AttributeKey::Server, AttributeValue::Str(server.clone()));
    } else {
        query.set(
            AttributeKey::Class,
            AttributeValue::Class(ItemClass::GenericPassword),
        );
        if let Some(service) = &filter.service {
            query.set(AttributeKey::Service, AttributeValue::Str(service.clone()));
        }
    }

    if let Some(username) = &filter.username {
        query.set(AttributeKey::Account, AttributeValue::Str(username.clone()));
    }
    if let AccessGroupFilter::Specific(group) = &filter.access_group {
        query.set(AttributeKey::AccessGroup, AttributeValue::Str(group.clone()));
    }

    // An omitted synchronizability filter must become an explicit wildcard;
    // the vault's own default excludes synchronizable entries.
    let sync = match filter.synchronizable {
        Some(flag) => SyncMatch::Only(flag),
        None => SyncMatch::Any,
    };
    query.set(AttributeKey::Synchronizable, AttributeValue::Sync(sync));

    query.set(AttributeKey::UseDataProtection, AttributeValue::Bool(true));
    query
}

/// Build a copy-matching query returning attributes and data for every
/// matching entry. Entries in `extras` override builder defaults for the
/// same field.
pub fn copy_matching_query(
    filter: &CredentialsFilter,
    extras: Option<&AttributeMap>,
) -> AttributeMap {
    let mut query = selector_query(filter);
    query.set(AttributeKey::ReturnAttributes, AttributeValue::Bool(true));
    query.set(AttributeKey::ReturnData, AttributeValue::Bool(true));
    query.set(
        AttributeKey::MatchLimit,
        AttributeValue::Limit(MatchLimit::All),
    );
    if let Some(extras) = extras {
        query.merge(extras);
    }
    query
}

/// Build a delete query for every entry matching the selector.
pub fn delete_query(filter: &CredentialsFilter) -> AttributeMap {
    selector_query(filter)
}

// ---------------------------------------------------------------------------
// Key queries
// ---------------------------------------------------------------------------

/// Base key selector: application tag, key algorithm, and the partition
/// flag. No account or server fields apply to keys.
fn key_selector(tag: &KeyTag, algorithm: KeyAlgorithm, key_class: KeyClass) -> AttributeMap {
    AttributeMap::new()
        .with(AttributeKey::Class, AttributeValue::Class(ItemClass::Key))
        .with(
            AttributeKey::ApplicationTag,
            AttributeValue::Str(tag.as_str().to_owned()),
        )
        .with(AttributeKey::KeyType, AttributeValue::KeyType(algorithm))
        .with(AttributeKey::KeyClass, AttributeValue::KeyClass(key_class))
        .with(AttributeKey::UseDataProtection, AttributeValue::Bool(true))
}

/// Build a lookup query for one half of a key pair. The return-reference
/// flag is mandatory: key lookups yield opaque handles, never raw material.
pub fn key_query(tag: &KeyTag, algorithm: KeyAlgorithm, key_class: KeyClass) -> AttributeMap {
    key_selector(tag, algorithm, key_class)
        .with(AttributeKey::ReturnRef, AttributeValue::Bool(true))
        .with(
            AttributeKey::MatchLimit,
            AttributeValue::Limit(MatchLimit::One),
        )
}

/// Build a delete query for one half of a key pair.
pub fn key_delete_query(
    tag: &KeyTag,
    algorithm: KeyAlgorithm,
    key_class: KeyClass,
) -> AttributeMap {
    key_selector(tag, algorithm, key_class)
}

/// Build the request driving the vault's key-pair generator.
pub fn generate_key_query(
    tag: &KeyTag,
    algorithm: KeyAlgorithm,
    size_bits: u32,
    synchronizable: bool,
    access_control: Option<&AccessControl>,
) -> AttributeMap {
    let mut query = AttributeMap::new()
        .with(AttributeKey::Class, AttributeValue::Class(ItemClass::Key))
        .with(
            AttributeKey::ApplicationTag,
            AttributeValue::Str(tag.as_str().to_owned()),
        )
        .with(AttributeKey::KeyType, AttributeValue::KeyType(algorithm))
        .with(AttributeKey::KeySizeBits, AttributeValue::Uint(size_bits))
        .with(
            AttributeKey::Synchronizable,
            AttributeValue::Sync(SyncMatch::Only(synchronizable)),
        );
    if let Some(descriptor) = access_control {
        query.set(
            AttributeKey::AccessControl,
            AttributeValue::AccessControl(*descriptor),
        );
    }
    query.set(AttributeKey::UseDataProtection, AttributeValue::Bool(true));
    query
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
