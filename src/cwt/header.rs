//! # COSE header
//!
//! Protected header of a Status List Token in CWT format.

use ciborium::Value;
use coset::{Header, HeaderBuilder};
use serde::{Deserialize, Serialize};

use super::{header_key, CWT_STATUS_LIST_TYPE};
use crate::crypto::Algorithm;

/// Key identifier, as text or raw bytes.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum KeyId {
    /// Text identifier, encoded in the header as its UTF-8 bytes.
    Text(String),

    /// Raw identifier bytes.
    Bytes(Vec<u8>),
}

impl KeyId {
    /// Identifier bytes as carried in the `kid` header.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.as_bytes().to_vec(),
            Self::Bytes(bytes) => bytes.clone(),
        }
    }
}

impl From<&str> for KeyId {
    fn from(kid: &str) -> Self {
        Self::Text(kid.to_string())
    }
}

impl From<String> for KeyId {
    fn from(kid: String) -> Self {
        Self::Text(kid)
    }
}

impl From<Vec<u8>> for KeyId {
    fn from(kid: Vec<u8>) -> Self {
        Self::Bytes(kid)
    }
}

/// A single DER-encoded certificate or a chain of them.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum X5Chain {
    /// Single certificate.
    Single(Vec<u8>),

    /// Certificate chain, leaf first.
    Chain(Vec<Vec<u8>>),
}

impl X5Chain {
    fn to_value(&self) -> Value {
        match self {
            Self::Single(cert) => Value::Bytes(cert.clone()),
            Self::Chain(certs) => Value::Array(certs.iter().cloned().map(Value::Bytes).collect()),
        }
    }
}

/// Key resolution parameters for the header.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Key identifier (`4`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<KeyId>,

    /// Certificate or certificate chain (`33`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x5chain: Option<X5Chain>,

    /// Certificate thumbprint (`34`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x5t: Option<Vec<u8>>,

    /// Certificate URI (`35`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x5u: Option<String>,
}

/// How a verifier should resolve the signing key: a bare key identifier or
/// a full set of header options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyResolution {
    /// Sets only `kid`.
    Kid(KeyId),

    /// Sets whichever of `kid`, `x5chain`, `x5t` and `x5u` are present.
    Options(HeaderOptions),
}

impl From<KeyId> for KeyResolution {
    fn from(kid: KeyId) -> Self {
        Self::Kid(kid)
    }
}

impl From<HeaderOptions> for KeyResolution {
    fn from(options: HeaderOptions) -> Self {
        Self::Options(options)
    }
}

/// Build the protected header of a Status List Token: `alg` and `typ`, plus
/// any key resolution parameters.
#[must_use]
pub fn create_status_list_cwt_header(alg: Algorithm, key: Option<KeyResolution>) -> Header {
    let mut builder = HeaderBuilder::new()
        .algorithm(alg.to_cose())
        .value(header_key::TYPE, Value::Text(CWT_STATUS_LIST_TYPE.into()));

    match key {
        None => {}
        Some(KeyResolution::Kid(kid)) => builder = builder.key_id(kid.to_bytes()),
        Some(KeyResolution::Options(options)) => {
            if let Some(kid) = options.kid {
                builder = builder.key_id(kid.to_bytes());
            }
            if let Some(x5chain) = options.x5chain {
                builder = builder.value(header_key::X5CHAIN, x5chain.to_value());
            }
            if let Some(x5t) = options.x5t {
                builder = builder.value(header_key::X5T, Value::Bytes(x5t));
            }
            if let Some(x5u) = options.x5u {
                builder = builder.value(header_key::X5U, Value::Text(x5u));
            }
        }
    }

    builder.build()
}

/// Value of an integer-labelled parameter in `header`.
pub(super) fn parameter(header: &Header, label: i64) -> Option<&Value> {
    header.rest.iter().find(|(l, _)| *l == coset::Label::Int(label)).map(|(_, v)| v)
}
