//! # Referenced Token claims
//!
//! The `status` claim (`65535`) of a Referenced Token points at the token's
//! entry in a Status List Token: `{"status_list": {"idx": 42, "uri": "..."}}`.

use ciborium::Value;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::lookup::ClaimMap;
use super::payload::{from_slice, to_vec};
use super::{claim_key, field};
use crate::err;
use crate::error::{Err, Result};
use crate::status_list::StatusListEntry;

/// The `status` claim of a Referenced Token.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusClaim {
    /// Reference to the token's entry in a status list.
    pub status_list: StatusListEntry,
}

impl StatusClaim {
    /// CBOR map representation.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let entry = Value::Map(vec![
            (Value::Text(field::IDX.into()), Value::Integer((self.status_list.idx as u64).into())),
            (Value::Text(field::URI.into()), Value::Text(self.status_list.uri.clone())),
        ]);
        Value::Map(vec![(Value::Text(field::STATUS_LIST.into()), entry)])
    }

    /// Read the claim from a decoded map.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the `status_list` reference is absent,
    /// and a decode error when its members are malformed.
    pub fn from_map(map: &ClaimMap) -> Result<Self> {
        let Some(entry) = map.map(field::STATUS_LIST)? else {
            err!(Err::NotFound, "No status_list found in status claim");
        };
        let Some(idx) = entry.integer(field::IDX)? else {
            err!(Err::NotFound, "No idx found in status_list");
        };
        let Some(uri) = entry.text(field::URI)? else {
            err!(Err::NotFound, "No uri found in status_list");
        };

        Ok(Self {
            status_list: StatusListEntry {
                idx,
                uri: uri.to_string(),
            },
        })
    }
}

/// Claims set of a Referenced Token in CWT format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferencedCwtPayload {
    /// Subject (`2`).
    pub sub: Option<String>,

    /// Issued at (`6`).
    pub iat: Option<i64>,

    /// Expiration time (`4`).
    pub exp: Option<i64>,

    /// Status reference (`65535`).
    pub status: StatusClaim,
}

impl ReferencedCwtPayload {
    /// CBOR map representation with integer labels in canonical order.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut entries = vec![];
        if let Some(sub) = &self.sub {
            entries.push((Value::Integer(claim_key::SUB.into()), Value::Text(sub.clone())));
        }
        if let Some(exp) = self.exp {
            entries.push((Value::Integer(claim_key::EXP.into()), Value::Integer(exp.into())));
        }
        if let Some(iat) = self.iat {
            entries.push((Value::Integer(claim_key::IAT.into()), Value::Integer(iat.into())));
        }
        entries.push((Value::Integer(claim_key::STATUS.into()), self.status.to_value()));
        Value::Map(entries)
    }

    /// Encode to CBOR bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if CBOR serialization fails.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        to_vec(&self.to_value())
    }
}

/// Build the `status` claim pointing at `idx` in the list published at `uri`.
#[must_use]
pub fn create_cwt_status_claim(idx: usize, uri: &str) -> StatusClaim {
    StatusClaim {
        status_list: StatusListEntry {
            idx,
            uri: uri.to_string(),
        },
    }
}

/// Encode the `status` claim on its own.
///
/// # Errors
///
/// Returns an error if CBOR serialization fails.
pub fn encode_cwt_status_claim(idx: usize, uri: &str) -> Result<Vec<u8>> {
    to_vec(&create_cwt_status_claim(idx, uri).to_value())
}

/// Decode a `status` claim produced by [`encode_cwt_status_claim`].
///
/// # Errors
///
/// Returns a decode error for malformed CBOR and a not-found error when the
/// `status_list` reference is absent.
#[instrument(level = "debug", skip(cbor))]
pub fn decode_cwt_status_claim(cbor: &[u8]) -> Result<StatusListEntry> {
    let value = from_slice(cbor)?;
    StatusClaim::from_map(&ClaimMap::from_value(&value)?).map(|claim| claim.status_list)
}

/// Build the claims set of a Referenced Token.
#[must_use]
pub fn create_referenced_cwt_payload(
    entry: StatusListEntry, subject: Option<&str>, issued_at: Option<i64>, exp: Option<i64>,
) -> ReferencedCwtPayload {
    ReferencedCwtPayload {
        sub: subject.map(ToString::to_string),
        iat: issued_at,
        exp,
        status: StatusClaim { status_list: entry },
    }
}

/// Build and encode the claims set of a Referenced Token.
///
/// # Errors
///
/// Returns an error if CBOR serialization fails.
pub fn encode_referenced_cwt_payload(
    entry: StatusListEntry, subject: Option<&str>, issued_at: Option<i64>, exp: Option<i64>,
) -> Result<Vec<u8>> {
    create_referenced_cwt_payload(entry, subject, issued_at, exp).to_vec()
}

/// Extract the status list reference from a Referenced Token's claims set.
///
/// # Errors
///
/// Returns a not-found error when the `status` claim or its `status_list`
/// reference is absent.
#[instrument(level = "debug", skip(cbor))]
pub fn get_status_list_from_cwt(cbor: &[u8]) -> Result<StatusListEntry> {
    let value = from_slice(cbor)?;
    let claims = ClaimMap::from_value(&value)?;

    let Some(status) = claims.map(claim_key::STATUS)? else {
        err!(Err::NotFound, "No status claim found in CWT payload");
    };
    StatusClaim::from_map(&status).map(|claim| claim.status_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_claim() {
        let cbor = encode_cwt_status_claim(42, "https://example.com/1").expect("should encode");
        let entry = decode_cwt_status_claim(&cbor).expect("should decode");

        assert_eq!(entry.idx, 42);
        assert_eq!(entry.uri, "https://example.com/1");
    }

    // A claims set built by hand, with the reference nested under 65535.
    #[test]
    fn nested_status_claim() {
        let entry = Value::Map(vec![
            (Value::Text("idx".into()), Value::Integer(42.into())),
            (Value::Text("uri".into()), Value::Text("https://example.com/1".into())),
        ]);
        let status = Value::Map(vec![(Value::Text("status_list".into()), entry)]);
        let claims = Value::Map(vec![(Value::Integer(65535.into()), status.clone())]);

        let decoded = get_status_list_from_cwt(&to_vec(&claims).expect("should encode"))
            .expect("should decode");
        assert_eq!(decoded.idx, 42);
        assert_eq!(decoded.uri, "https://example.com/1");

        let decoded = decode_cwt_status_claim(&to_vec(&status).expect("should encode"))
            .expect("should decode");
        assert_eq!(decoded.idx, 42);
    }

    #[test]
    fn referenced_payload() {
        let entry = StatusListEntry {
            idx: 7,
            uri: "https://example.com/1".into(),
        };
        let subject = Some("https://example.com/token");
        let cbor = encode_referenced_cwt_payload(entry.clone(), subject, Some(1_000_000), None)
            .expect("should encode");

        assert_eq!(get_status_list_from_cwt(&cbor).expect("should decode"), entry);
    }

    #[test]
    fn missing_claims() {
        let claims = Value::Map(vec![(Value::Integer(2.into()), Value::Text("sub".into()))]);
        let err = get_status_list_from_cwt(&to_vec(&claims).expect("should encode"))
            .expect_err("should fail");
        assert!(matches!(err.code(), Err::NotFound));
        assert_eq!(err.to_string(), "No status claim found in CWT payload");

        let claims = Value::Map(vec![(Value::Integer(65535.into()), Value::Map(vec![]))]);
        let err = get_status_list_from_cwt(&to_vec(&claims).expect("should encode"))
            .expect_err("should fail");
        assert_eq!(err.to_string(), "No status_list found in status claim");
    }
}
