//! # Cryptographic Capabilities
//!
//! Status List Tokens are signed by code layered above the status list codec.
//! This module describes the capabilities that layer consumes: a [`Signer`]
//! and a [`Verifier`] injected by the caller, the [`Algorithm`] lookup table
//! shared by JOSE and COSE envelopes, and the [`HashAlgorithm`]s the
//! algorithms rely on.
//!
//! Key generation and key storage are left to implementers.

use std::fmt::{self, Display};
use std::future::Future;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{Err, Error, Result};

/// Signer provides digital signing for Status List Tokens.
pub trait Signer: Send + Sync {
    /// Algorithm used by the signer.
    fn algorithm(&self) -> Algorithm;

    /// Identifier of the key the verifier should use, placed in the token's
    /// `kid` header when present.
    fn key_id(&self) -> Option<String>;

    /// Sign the message, returning the raw signature bytes.
    fn try_sign(&self, msg: &[u8]) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;
}

/// Verifier provides signature verification for Status List Tokens.
pub trait Verifier: Send + Sync {
    /// Returns `true` when `signature` is a valid signature of `msg`.
    fn verify(
        &self, msg: &[u8], signature: &[u8],
    ) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

/// Signature algorithms usable for Status List Tokens.
///
/// [IANA COSE Algorithms](https://www.iana.org/assignments/cose/cose.xhtml#algorithms)
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// ECDSA using P-256 and SHA-256.
    ES256,

    /// ECDSA using P-384 and SHA-384.
    ES384,

    /// ECDSA using P-521 and SHA-512.
    ES512,

    /// EdDSA (Ed25519).
    EdDSA,

    /// RSASSA-PSS using SHA-256.
    PS256,

    /// RSASSA-PSS using SHA-384.
    PS384,

    /// RSASSA-PSS using SHA-512.
    PS512,

    /// RSASSA-PKCS1-v1_5 using SHA-256.
    RS256,

    /// RSASSA-PKCS1-v1_5 using SHA-384.
    RS384,

    /// RSASSA-PKCS1-v1_5 using SHA-512.
    RS512,
}

/// Key and hash parameters of an [`Algorithm`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor {
    /// COSE algorithm identifier.
    pub cose: i64,

    /// Key algorithm family, e.g. `ECDSA`.
    pub key_algorithm: &'static str,

    /// Named curve for elliptic-curve algorithms.
    pub curve: Option<&'static str>,

    /// Hash algorithm, when the signature scheme uses a separate one.
    pub hash: Option<HashAlgorithm>,
}

const fn descriptor(
    cose: i64, key_algorithm: &'static str, curve: Option<&'static str>,
    hash: Option<HashAlgorithm>,
) -> Descriptor {
    Descriptor {
        cose,
        key_algorithm,
        curve,
        hash,
    }
}

impl Algorithm {
    /// Every supported algorithm.
    pub const ALL: [Self; 10] = [
        Self::ES256,
        Self::ES384,
        Self::ES512,
        Self::EdDSA,
        Self::PS256,
        Self::PS384,
        Self::PS512,
        Self::RS256,
        Self::RS384,
        Self::RS512,
    ];

    /// Key and hash parameters for the algorithm.
    #[must_use]
    pub const fn descriptor(self) -> Descriptor {
        use HashAlgorithm::{Sha256, Sha384, Sha512};

        match self {
            Self::ES256 => descriptor(-7, "ECDSA", Some("P-256"), Some(Sha256)),
            Self::ES384 => descriptor(-35, "ECDSA", Some("P-384"), Some(Sha384)),
            Self::ES512 => descriptor(-36, "ECDSA", Some("P-521"), Some(Sha512)),
            Self::EdDSA => descriptor(-8, "EdDSA", Some("Ed25519"), None),
            Self::PS256 => descriptor(-37, "RSA-PSS", None, Some(Sha256)),
            Self::PS384 => descriptor(-38, "RSA-PSS", None, Some(Sha384)),
            Self::PS512 => descriptor(-39, "RSA-PSS", None, Some(Sha512)),
            Self::RS256 => descriptor(-257, "RSASSA-PKCS1-v1_5", None, Some(Sha256)),
            Self::RS384 => descriptor(-258, "RSASSA-PKCS1-v1_5", None, Some(Sha384)),
            Self::RS512 => descriptor(-259, "RSASSA-PKCS1-v1_5", None, Some(Sha512)),
        }
    }

    /// COSE algorithm identifier.
    #[must_use]
    pub const fn cose_id(self) -> i64 {
        self.descriptor().cose
    }

    /// Look up an algorithm by its COSE identifier.
    ///
    /// # Errors
    ///
    /// Returns an error for an identifier with no supported algorithm.
    pub fn from_cose_id(id: i64) -> Result<Self> {
        Self::ALL.into_iter().find(|alg| alg.cose_id() == id).ok_or_else(|| {
            Error::new(
                Err::Signature(anyhow!("unsupported COSE algorithm {id}")),
                format!("unsupported COSE algorithm {id}"),
            )
        })
    }

    /// Map to the `coset` algorithm registry.
    #[must_use]
    pub const fn to_cose(self) -> coset::iana::Algorithm {
        use coset::iana;

        match self {
            Self::ES256 => iana::Algorithm::ES256,
            Self::ES384 => iana::Algorithm::ES384,
            Self::ES512 => iana::Algorithm::ES512,
            Self::EdDSA => iana::Algorithm::EdDSA,
            Self::PS256 => iana::Algorithm::PS256,
            Self::PS384 => iana::Algorithm::PS384,
            Self::PS512 => iana::Algorithm::PS512,
            Self::RS256 => iana::Algorithm::RS256,
            Self::RS384 => iana::Algorithm::RS384,
            Self::RS512 => iana::Algorithm::RS512,
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter().find(|alg| alg.to_string() == s).ok_or_else(|| {
            Error::new(
                Err::Signature(anyhow!("unsupported JOSE algorithm {s}")),
                format!("unsupported JOSE algorithm {s}"),
            )
        })
    }
}

/// Hash algorithms used by the supported signature algorithms.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256
    #[serde(rename = "sha-256")]
    Sha256,

    /// SHA-384
    #[serde(rename = "sha-384")]
    Sha384,

    /// SHA-512
    #[serde(rename = "sha-512")]
    Sha512,
}

impl HashAlgorithm {
    /// Hash `data`.
    #[must_use]
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

// accepts "sha-256", "sha256", "SHA-256", "SHA256", etc.
impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.replace('-', "").to_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(Error::new(
                Err::Signature(anyhow!("unsupported hash algorithm {s}")),
                format!("Unsupported algorithm: {s}"),
            )),
        }
    }
}
