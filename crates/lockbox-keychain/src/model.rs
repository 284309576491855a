//! Domain model for stored secrets.
//!
//! The vault itself only understands attribute maps; these are the typed
//! values the rest of the crate translates to and from. All of them are
//! immutable value types — replacing a stored credential means delete plus
//! insert, never an in-place patch.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A username/password pair with optional descriptive metadata.
///
/// Identity for lookups is `(username, owning tag)` — the password and the
/// metadata fields do not participate in matching. Password material is
/// wiped from memory when the value is dropped.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    /// Account name the secret belongs to.
    pub username: String,

    /// The secret itself, stored as the vault entry's data payload.
    pub password: String,

    /// Free-form description shown by vault browsers.
    pub description: Option<String>,

    /// Free-form comment.
    pub comment: Option<String>,

    /// Human-readable label (e.g. "work account").
    pub label: Option<String>,
}

impl Credentials {
    /// Create a credential pair with no metadata.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            description: None,
            comment: None,
            label: None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never leak the password through Debug output or logs.
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("description", &self.description)
            .field("comment", &self.comment)
            .field("label", &self.label)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// The kind of credential entry, matching the vault's two password classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsKind {
    /// A credential filed under an application-defined service name.
    GenericPassword { service: String },
    /// A credential filed under a network server name.
    InternetPassword { server: String },
}

/// Identifies where a credential is filed — a namespace key combining the
/// entry kind with the storage scope and an optional sharing group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsTag {
    pub kind: CredentialsKind,
    pub storage: StorageOption,
    /// Partition identifier allowing multiple processes to share entries.
    pub access_group: Option<String>,
}

impl CredentialsTag {
    /// Tag for a generic (service-keyed) credential.
    pub fn generic(service: impl Into<String>, storage: StorageOption) -> Self {
        Self {
            kind: CredentialsKind::GenericPassword {
                service: service.into(),
            },
            storage,
            access_group: None,
        }
    }

    /// Tag for an internet (server-keyed) credential.
    pub fn internet(server: impl Into<String>, storage: StorageOption) -> Self {
        Self {
            kind: CredentialsKind::InternetPassword {
                server: server.into(),
            },
            storage,
            access_group: None,
        }
    }

    /// File entries under a shared access group.
    pub fn with_access_group(mut self, group: impl Into<String>) -> Self {
        self.access_group = Some(group.into());
        self
    }
}

/// Identifies an asymmetric key pair by application tag string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTag(String);

impl KeyTag {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KeyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Storage options and filters
// ---------------------------------------------------------------------------

/// Policy controlling where a secret lives and what guards its use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageOption {
    /// Local vault entry; never exported across devices.
    Keychain,

    /// Mirrored across the user's devices. Synchronizable entries cannot
    /// carry a custom access-control descriptor.
    KeychainSynchronizable,

    /// Private key material never leaves secure hardware. Valid for key
    /// pairs only; mutually exclusive with synchronization. When
    /// `user_presence` is set, every private-key use requires a biometric
    /// or passcode challenge.
    SecureEnclave { user_presence: bool },
}

impl StorageOption {
    /// Whether entries under this option mirror across devices.
    pub fn synchronizable(&self) -> bool {
        matches!(self, Self::KeychainSynchronizable)
    }
}

/// How to filter on the access-group partition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessGroupFilter {
    /// Match entries in any access group.
    #[default]
    Any,
    /// Match only entries filed under a specific group.
    Specific(String),
}

/// Selector for credential lookups and deletes.
///
/// Every field is optional; an omitted field means "do not filter on this
/// field". Omitting `synchronizable` matches both synchronizable and
/// non-synchronizable entries — the builder emits an explicit wildcard so
/// the vault cannot fall back to its local-only default.
///
/// The presence of `server` selects the internet-password item class;
/// absence selects the generic-password class. A caller who means a generic
/// credential must never supply a server string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CredentialsFilter {
    pub username: Option<String>,
    pub service: Option<String>,
    pub server: Option<String>,
    pub access_group: AccessGroupFilter,
    pub synchronizable: Option<bool>,
}

impl CredentialsFilter {
    /// Filter for generic credentials under a service name.
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
            ..Self::default()
        }
    }

    /// Filter for internet credentials under a server name.
    pub fn for_server(server: impl Into<String>) -> Self {
        Self {
            server: Some(server.into()),
            ..Self::default()
        }
    }

    /// Restrict the filter to one account name.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Restrict the filter to one synchronization scope.
    pub fn with_synchronizable(mut self, synchronizable: bool) -> Self {
        self.synchronizable = Some(synchronizable);
        self
    }

    /// Restrict the filter to a specific access group.
    pub fn with_access_group(mut self, group: impl Into<String>) -> Self {
        self.access_group = AccessGroupFilter::Specific(group.into());
        self
    }

    /// The selector that identifies exactly the entries a tag owns for one
    /// account — used by the replace-duplicate retry and by update.
    pub fn from_tag(tag: &CredentialsTag, username: Option<&str>) -> Self {
        let (service, server) = match &tag.kind {
            CredentialsKind::GenericPassword { service } => (Some(service.clone()), None),
            CredentialsKind::InternetPassword { server } => (None, Some(server.clone())),
        };
        Self {
            username: username.map(str::to_owned),
            service,
            server,
            access_group: match &tag.access_group {
                Some(group) => AccessGroupFilter::Specific(group.clone()),
                None => AccessGroupFilter::Any,
            },
            synchronizable: Some(tag.storage.synchronizable()),
        }
    }
}

// ---------------------------------------------------------------------------
// Key handles
// ---------------------------------------------------------------------------

/// The key algorithm requested from the vault's generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAlgorithm {
    /// NIST P-256 elliptic curve — the only algorithm secure hardware
    /// accepts, so also the crate-wide default.
    EllipticCurve,
}

/// Opaque reference to one half of a key pair held by the vault.
///
/// The handle never contains exportable private key material; it is only
/// meaningful when passed back to the vault that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHandle(Vec<u8>);

impl KeyHandle {
    pub fn new(raw: Vec<u8>) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Both halves of a generated key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: KeyHandle,
    pub private_key: KeyHandle,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
