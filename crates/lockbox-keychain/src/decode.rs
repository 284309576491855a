//! Decoding raw vault records back into domain values.
//!
//! Copy-matching returns one attribute map per entry. Batch decoding is
//! tolerant: a record missing its password payload or account name is
//! skipped with a warning rather than failing the whole batch, so a
//! partially corrupt vault never blocks retrieval of the remaining valid
//! entries. Single-record decoding (key handles) stays strict.

use crate::error::{KeychainError, Result};
use crate::model::{Credentials, KeyHandle};
use crate::query::{AttributeKey, AttributeMap};

/// Decode a single credential record, requiring the account name and a
/// UTF-8 password payload.
pub fn decode_credentials_record(record: &AttributeMap) -> Result<Credentials> {
    let username = record
        .str_value(AttributeKey::Account)
        .ok_or_else(|| KeychainError::UnexpectedRecordShape {
            reason: "record has no account attribute".into(),
        })?;

    let payload = record
        .bytes_value(AttributeKey::ValueData)
        .ok_or_else(|| KeychainError::UnexpectedRecordShape {
            reason: "record has no password payload".into(),
        })?;

    let password =
        std::str::from_utf8(payload).map_err(|_| KeychainError::UnexpectedRecordShape {
            reason: "password payload is not valid UTF-8".into(),
        })?;

    Ok(Credentials {
        username: username.to_owned(),
        password: password.to_owned(),
        description: record
            .str_value(AttributeKey::Description)
            .map(str::to_owned),
        comment: record.str_value(AttributeKey::Comment).map(str::to_owned),
        label: record.str_value(AttributeKey::Label).map(str::to_owned),
    })
}

/// Decode a batch of credential records, skipping malformed ones.
///
/// The result is eager and finite — the vault primitive returns a single
/// materialized batch, not a stream.
pub fn decode_credentials(records: &[AttributeMap]) -> Vec<Credentials> {
    let mut decoded = Vec::with_capacity(records.len());
    for record in records {
        match decode_credentials_record(record) {
            Ok(credentials) => decoded.push(credentials),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed vault record");
            }
        }
    }
    tracing::debug!(
        total = records.len(),
        decoded = decoded.len(),
        "decoded credential batch"
    );
    decoded
}

/// Decode the opaque key reference out of a key record.
pub fn decode_key_ref(record: &AttributeMap) -> Result<KeyHandle> {
    let raw = record
        .bytes_value(AttributeKey::KeyRef)
        .ok_or_else(|| KeychainError::UnexpectedRecordShape {
            reason: "key record has no key reference".into(),
        })?;
    Ok(KeyHandle::new(raw.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::AttributeValue;

    fn well_formed(username: &str, password: &str) -> AttributeMap {
        AttributeMap::new()
            .with(
                AttributeKey::Account,
                AttributeValue::Str(username.to_owned()),
            )
            .with(
                AttributeKey::ValueData,
                AttributeValue::Bytes(password.as_bytes().to_vec()),
            )
    }

    #[test]
    fn decodes_full_record() {
        let record = well_formed("alice", "p1")
            .with(AttributeKey::Label, AttributeValue::Str("work".into()))
            .with(AttributeKey::Comment, AttributeValue::Str("c".into()));

        let creds = decode_credentials_record(&record).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "p1");
        assert_eq!(creds.label.as_deref(), Some("work"));
        assert_eq!(creds.comment.as_deref(), Some("c"));
        assert_eq!(creds.description, None);
    }

    #[test]
    fn batch_skips_record_missing_payload() {
        let good = well_formed("alice", "p1");
        let missing_payload = AttributeMap::new().with(
            AttributeKey::Account,
            AttributeValue::Str("ghost".to_owned()),
        );

        let decoded = decode_credentials(&[good, missing_payload]);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].username, "alice");
    }

    #[test]
    fn batch_skips_record_missing_account() {
        let orphan = AttributeMap::new().with(
            AttributeKey::ValueData,
            AttributeValue::Bytes(b"p".to_vec()),
        );
        assert!(decode_credentials(&[orphan]).is_empty());
    }

    #[test]
    fn non_utf8_payload_is_unexpected_shape() {
        let record = AttributeMap::new()
            .with(AttributeKey::Account, AttributeValue::Str("a".into()))
            .with(
                AttributeKey::ValueData,
                AttributeValue::Bytes(vec![0xff, 0xfe]),
            );
        assert!(matches!(
            decode_credentials_record(&record),
            Err(KeychainError::UnexpectedRecordShape { .. })
        ));
    }

    #[test]
    fn key_ref_decode() {
        let record = AttributeMap::new().with(
            AttributeKey::KeyRef,
            AttributeValue::Bytes(b"handle".to_vec()),
        );
        let handle = decode_key_ref(&record).unwrap();
        assert_eq!(handle.as_bytes(), b"handle");

        let empty = AttributeMap::new();
        assert!(matches!(
            decode_key_ref(&empty),
            Err(KeychainError::UnexpectedRecordShape { .. })
        ));
    }
}
