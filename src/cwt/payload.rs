//! # Status List Token claims
//!
//! Builds, encodes and decodes the claims set of a Status List Token in CWT
//! format.

use ciborium::Value;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::lookup::ClaimMap;
use super::{claim_key, field};
use crate::err;
use crate::error::{Err, Result};
use crate::status_list::{BitsPerStatus, StatusList};

/// Optional claims of a Status List Token.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PayloadOptions {
    /// Expiration time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Maximum time, in seconds, a consumer may cache the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,

    /// URI of a registry aggregating multiple status lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_uri: Option<String>,
}

/// The `status_list` claim: a compressed status list and its bit width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusListCbor {
    /// Bits per status.
    pub bits: BitsPerStatus,

    /// Compressed status list bytes.
    pub lst: Vec<u8>,

    /// URI of a registry aggregating multiple status lists.
    pub aggregation_uri: Option<String>,
}

impl StatusListCbor {
    /// Compress `list` into a `status_list` claim.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be compressed.
    pub fn new(list: &StatusList, aggregation_uri: Option<&str>) -> Result<Self> {
        Ok(Self {
            bits: list.bits_per_status(),
            lst: list.compress_status_list_to_bytes()?,
            aggregation_uri: aggregation_uri.filter(|uri| !uri.is_empty()).map(ToString::to_string),
        })
    }

    /// CBOR map representation.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut entries = vec![
            (Value::Text(field::BITS.into()), Value::Integer(u8::from(self.bits).into())),
            (Value::Text(field::LST.into()), Value::Bytes(self.lst.clone())),
        ];
        if let Some(uri) = &self.aggregation_uri {
            entries.push((Value::Text(field::AGGREGATION_URI.into()), Value::Text(uri.clone())));
        }
        Value::Map(entries)
    }

    /// Read the claim from a decoded map.
    ///
    /// # Errors
    ///
    /// Returns an error when `bits` or `lst` is missing or malformed.
    pub fn from_map(map: &ClaimMap) -> Result<Self> {
        let Some(bits) = map.integer::<u64>(field::BITS)? else {
            err!(Err::NotFound, "No bits found in status_list");
        };
        let Some(lst) = map.bytes(field::LST)? else {
            err!(Err::NotFound, "No lst found in status_list");
        };

        Ok(Self {
            bits: BitsPerStatus::try_from(bits)?,
            lst: lst.to_vec(),
            aggregation_uri: map.text(field::AGGREGATION_URI)?.map(ToString::to_string),
        })
    }

    /// Decompress into a [`StatusList`].
    ///
    /// # Errors
    ///
    /// Returns a decompression error when `lst` is corrupt.
    pub fn status_list(&self) -> Result<StatusList> {
        StatusList::decompress_status_list_from_bytes(&self.lst, self.bits.into())
    }
}

/// Claims set of a Status List Token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusListCwtPayload {
    /// Subject (`2`): URI of the Status List Token.
    pub sub: String,

    /// Issued at (`6`).
    pub iat: i64,

    /// Expiration time (`4`).
    pub exp: Option<i64>,

    /// Time to live (`65534`).
    pub ttl: Option<u64>,

    /// Status list (`65533`).
    pub status_list: StatusListCbor,
}

impl StatusListCwtPayload {
    /// CBOR map representation with integer labels in canonical order.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut entries = vec![(Value::Integer(claim_key::SUB.into()), Value::Text(self.sub.clone()))];
        if let Some(exp) = self.exp {
            entries.push((Value::Integer(claim_key::EXP.into()), Value::Integer(exp.into())));
        }
        entries.push((Value::Integer(claim_key::IAT.into()), Value::Integer(self.iat.into())));
        entries.push((Value::Integer(claim_key::STATUS_LIST.into()), self.status_list.to_value()));
        if let Some(ttl) = self.ttl {
            entries.push((Value::Integer(claim_key::TTL.into()), Value::Integer(ttl.into())));
        }
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

/// A decoded Status List Token claims set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusListCwt {
    /// Subject: URI of the Status List Token.
    pub subject: String,

    /// Issued at.
    pub issued_at: i64,

    /// Expiration time.
    pub exp: Option<i64>,

    /// Time to live, in seconds.
    pub ttl: Option<u64>,

    /// The decompressed status list.
    pub status_list: StatusList,

    /// URI of a registry aggregating multiple status lists.
    pub aggregation_uri: Option<String>,
}

/// Build the claims set of a Status List Token.
///
/// # Errors
///
/// Returns a validation error when `subject` is empty or `issued_at` is 0,
/// and a compression error if the list cannot be compressed.
pub fn create_status_list_cwt_payload(
    list: &StatusList, subject: &str, issued_at: i64, options: &PayloadOptions,
) -> Result<StatusListCwtPayload> {
    if subject.is_empty() {
        err!(Err::Validation, "subject is required");
    }
    if issued_at == 0 {
        err!(Err::Validation, "issuedAt is required");
    }

    Ok(StatusListCwtPayload {
        sub: subject.to_string(),
        iat: issued_at,
        exp: options.exp,
        ttl: options.ttl,
        status_list: StatusListCbor::new(list, options.aggregation_uri.as_deref())?,
    })
}

/// Encode only the `status_list` claim (`{bits, lst[, aggregation_uri]}`).
///
/// # Errors
///
/// Returns an error if the list cannot be compressed or serialized.
#[instrument(level = "debug", skip(list))]
pub fn encode_status_list_to_cbor(list: &StatusList, aggregation_uri: Option<&str>) -> Result<Vec<u8>> {
    to_vec(&StatusListCbor::new(list, aggregation_uri)?.to_value())
}

/// Decode a `status_list` claim produced by [`encode_status_list_to_cbor`].
///
/// # Errors
///
/// Returns an error when the bytes are not a valid `status_list` map.
#[instrument(level = "debug", skip(cbor))]
pub fn decode_status_list_from_cbor(cbor: &[u8]) -> Result<StatusList> {
    let value = from_slice(cbor)?;
    StatusListCbor::from_map(&ClaimMap::from_value(&value)?)?.status_list()
}

/// Build and encode the claims set of a Status List Token.
///
/// # Errors
///
/// Returns the errors of [`create_status_list_cwt_payload`], and an error if
/// CBOR serialization fails.
#[instrument(level = "debug", skip(list, options))]
pub fn encode_cwt_payload(
    list: &StatusList, subject: &str, issued_at: i64, options: &PayloadOptions,
) -> Result<Vec<u8>> {
    create_status_list_cwt_payload(list, subject, issued_at, options)?.to_vec()
}

/// Decode the claims set of a Status List Token.
///
/// # Errors
///
/// Returns a decode error for malformed CBOR, a not-found error when a
/// required claim is absent, and a decompression error when the embedded list
/// is corrupt.
#[instrument(level = "debug", skip(cbor))]
pub fn decode_cwt_payload(cbor: &[u8]) -> Result<StatusListCwt> {
    let value = from_slice(cbor)?;
    let claims = ClaimMap::from_value(&value)?;

    let Some(subject) = claims.text(claim_key::SUB)? else {
        err!(Err::NotFound, "No subject found in CWT payload");
    };
    let Some(issued_at) = claims.integer(claim_key::IAT)? else {
        err!(Err::NotFound, "No issuedAt found in CWT payload");
    };
    let Some(status_list) = claims.map(claim_key::STATUS_LIST)? else {
        err!(Err::NotFound, "No status_list found in CWT payload");
    };
    let status_list = StatusListCbor::from_map(&status_list)?;
    tracing::debug!("decoded status list claim with {} bits per status", status_list.bits);

    Ok(StatusListCwt {
        subject: subject.to_string(),
        issued_at,
        exp: claims.integer(claim_key::EXP)?,
        ttl: claims.integer(claim_key::TTL)?,
        status_list: status_list.status_list()?,
        aggregation_uri: status_list.aggregation_uri,
    })
}

/// Decode a Status List Token claims set and return only its status list.
///
/// # Errors
///
/// Returns the errors of [`decode_cwt_payload`].
pub fn get_list_from_status_list_cwt(cbor: &[u8]) -> Result<StatusList> {
    decode_cwt_payload(cbor).map(|payload| payload.status_list)
}

pub(super) fn to_vec(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)?;
    Ok(buf)
}

pub(super) fn from_slice(cbor: &[u8]) -> Result<Value> {
    Ok(ciborium::from_reader(cbor)?)
}
