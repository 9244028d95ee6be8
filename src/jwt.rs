//! # JWT Transport
//!
//! Embeds a [`StatusList`] in, and extracts it from, JSON Web Token claims.
//! A Status List Token carries the compressed list, base64url-encoded, under
//! the `status_list` claim:
//!
//! ```json
//! {
//!   "sub": "https://example.com/statuslists/1",
//!   "iat": 1686920170,
//!   "status_list": { "bits": 1, "lst": "eNrbuRgAAhcBXQ" }
//! }
//! ```
//!
//! A Referenced Token points at its status with the `status` claim.
//!
//! [Status List Token in JWT Format](https://datatracker.ietf.org/doc/html/draft-ietf-oauth-status-list#name-status-list-token-in-jwt-fo)

use anyhow::anyhow;
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::crypto::{Algorithm, Signer, Verifier};
use crate::cwt::StatusClaim;
use crate::err;
use crate::error::{Err, Error, Result};
use crate::status_list::{BitsPerStatus, StatusList, StatusListEntry};

/// JWT `typ` header value for a Status List Token.
pub const JWT_STATUS_LIST_TYPE: &str = "statuslist+jwt";

/// JWT claim names.
pub mod claim {
    /// Status reference of a Referenced Token.
    pub const STATUS: &str = "status";

    /// Status list.
    pub const STATUS_LIST: &str = "status_list";

    /// Time to live, in seconds.
    pub const TTL: &str = "ttl";

    /// Index of the Referenced Token in the status list.
    pub const IDX: &str = "idx";

    /// URI of the Status List Token.
    pub const URI: &str = "uri";

    /// Bits per status.
    pub const BITS: &str = "bits";

    /// Base64url-encoded compressed status list.
    pub const LST: &str = "lst";

    /// Aggregation URI.
    pub const AGGREGATION_URI: &str = "aggregation_uri";
}

/// JOSE header of a Status List Token.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct JwtHeader {
    /// Signature algorithm.
    pub alg: Algorithm,

    /// Token type. Set to [`JWT_STATUS_LIST_TYPE`] for Status List Tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Key identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Any other header parameters.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl JwtHeader {
    /// A header for `alg` with no other parameters.
    #[must_use]
    pub fn new(alg: Algorithm) -> Self {
        Self {
            alg,
            typ: None,
            kid: None,
            params: Map::new(),
        }
    }
}

/// The `status_list` claim of a JWT Status List Token.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusListJwtClaim {
    /// Bits per status.
    pub bits: BitsPerStatus,

    /// Compressed status list, base64url-encoded without padding.
    pub lst: String,

    /// URI of a registry aggregating multiple status lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_uri: Option<String>,
}

impl StatusListJwtClaim {
    /// Compress and encode `list` into a `status_list` claim.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be compressed.
    pub fn new(list: &StatusList, aggregation_uri: Option<String>) -> Result<Self> {
        Ok(Self {
            bits: list.bits_per_status(),
            lst: Base64UrlUnpadded::encode_string(&list.compress_status_list_to_bytes()?),
            aggregation_uri: aggregation_uri.filter(|uri| !uri.is_empty()),
        })
    }

    /// Decode and decompress into a [`StatusList`].
    ///
    /// # Errors
    ///
    /// Returns a decode error when `lst` is not base64url, and a
    /// decompression error when it is corrupt.
    pub fn status_list(&self) -> Result<StatusList> {
        let compressed = Base64UrlUnpadded::decode_vec(self.lst.trim_end_matches('='))
            .map_err(|e| Err::Decode(anyhow!("issue decoding lst: {e}")))?;
        StatusList::decompress_status_list_from_bytes(&compressed, self.bits.into())
    }
}

/// Claims of a Status List Token or a Referenced Token.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct JwtPayload {
    /// Subject: URI of the Status List Token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issued at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Maximum time, in seconds, a consumer may cache the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,

    /// Status list carried by a Status List Token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_list: Option<StatusListJwtClaim>,

    /// Status reference carried by a Referenced Token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusClaim>,

    /// Any other claims.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

/// A decoded compact JWS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Jwt {
    /// The JOSE header.
    pub header: JwtHeader,

    /// The claims.
    pub payload: JwtPayload,

    /// Raw signature bytes.
    pub signature: Vec<u8>,
}

/// Add the status list to the header and payload of a Status List Token.
///
/// Sets `typ` to [`JWT_STATUS_LIST_TYPE`] and `status_list` to the
/// compressed list. An `aggregation_uri` already present on the payload's
/// `status_list` is kept.
///
/// # Errors
///
/// Returns a validation error when `sub` or `iat` is missing (an empty `sub`
/// or an `iat` of 0 counts as missing), and an error if the list cannot be
/// compressed.
pub fn create_header_and_payload(
    list: &StatusList, mut payload: JwtPayload, mut header: JwtHeader,
) -> Result<(JwtHeader, JwtPayload)> {
    if payload.sub.as_deref().map_or(true, str::is_empty) {
        err!(Err::Validation, "sub field is required");
    }
    if payload.iat.map_or(true, |iat| iat == 0) {
        err!(Err::Validation, "iat field is required");
    }

    let aggregation_uri = payload.status_list.take().and_then(|claim| claim.aggregation_uri);
    header.typ = Some(JWT_STATUS_LIST_TYPE.to_string());
    payload.status_list = Some(StatusListJwtClaim::new(list, aggregation_uri)?);

    Ok((header, payload))
}

/// Decode a compact JWS without verifying its signature.
///
/// # Errors
///
/// Returns a decode error unless the token has exactly three segments, each
/// valid base64url, with JSON header and payload, and a header `alg` this
/// crate supports.
#[instrument(level = "debug", skip(jwt))]
pub fn decode(jwt: &str) -> Result<Jwt> {
    let [header, payload, signature] = segments(jwt)?;

    let decoded = Base64UrlUnpadded::decode_vec(header)
        .map_err(|e| Err::Decode(anyhow!("issue decoding header: {e}")))?;
    let header = serde_json::from_slice(&decoded)
        .map_err(|e| Err::Decode(anyhow!("issue deserializing header: {e}")))?;
    let payload = deserialize_payload(payload)?;
    let signature = Base64UrlUnpadded::decode_vec(signature)
        .map_err(|e| Err::Decode(anyhow!("issue decoding signature: {e}")))?;

    Ok(Jwt {
        header,
        payload,
        signature,
    })
}

/// Decode only the claims of a compact JWS. The header and signature
/// segments are neither parsed nor verified.
///
/// # Errors
///
/// Returns a decode error unless the token has exactly three segments and
/// the middle one is base64url-encoded JSON.
#[instrument(level = "debug", skip(jwt))]
pub fn decode_payload(jwt: &str) -> Result<JwtPayload> {
    let [_, payload, _] = segments(jwt)?;
    deserialize_payload(payload)
}

fn segments(jwt: &str) -> Result<[&str; 3]> {
    let mut parts = jwt.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok([header, payload, signature]),
        _ => Err(Err::Decode(anyhow!("invalid Compact JWS format")).into()),
    }
}

fn deserialize_payload(payload: &str) -> Result<JwtPayload> {
    let decoded = Base64UrlUnpadded::decode_vec(payload)
        .map_err(|e| Err::Decode(anyhow!("issue decoding payload: {e}")))?;
    serde_json::from_slice(&decoded)
        .map_err(|e| Err::Decode(anyhow!("issue deserializing payload: {e}")).into())
}

/// Extract the status list from a Status List Token without verifying its
/// signature.
///
/// # Errors
///
/// Returns the errors of [`decode_payload`], a not-found error when the token
/// has no `status_list` claim, and a decompression error when the list is
/// corrupt.
pub fn get_list_from_status_list_jwt(jwt: &str) -> Result<StatusList> {
    let Some(claim) = decode_payload(jwt)?.status_list else {
        err!(Err::NotFound, "No status_list found in JWT payload");
    };
    claim.status_list()
}

/// Extract the status list reference from a Referenced Token without
/// verifying its signature.
///
/// # Errors
///
/// Returns the errors of [`decode_payload`], and a not-found error when the
/// token has no `status` claim.
pub fn get_status_list_from_jwt(jwt: &str) -> Result<StatusListEntry> {
    let Some(status) = decode_payload(jwt)?.status else {
        err!(Err::NotFound, "No status claim found in JWT payload");
    };
    Ok(status.status_list)
}

/// Sign the header and payload, returning a compact JWS.
///
/// # Errors
///
/// Returns a decode error if either part cannot be serialized, and a
/// signature error when the signer fails.
#[instrument(level = "debug", skip_all)]
pub async fn sign(header: &JwtHeader, payload: &JwtPayload, signer: &impl Signer) -> Result<String> {
    let header_enc = Base64UrlUnpadded::encode_string(&serde_json::to_vec(header)?);
    let payload_enc = Base64UrlUnpadded::encode_string(&serde_json::to_vec(payload)?);
    let signing_input = format!("{header_enc}.{payload_enc}");

    let signature = signer
        .try_sign(signing_input.as_bytes())
        .await
        .map_err(|e| Error::new(Err::Signature(e), "issue signing status list token"))?;
    let sig_enc = Base64UrlUnpadded::encode_string(&signature);

    Ok(format!("{signing_input}.{sig_enc}"))
}

/// Verify a compact JWS and return the decoded token.
///
/// # Errors
///
/// Returns the errors of [`decode`], and a signature error when the
/// signature does not verify.
#[instrument(level = "debug", skip_all)]
pub async fn verify(jwt: &str, verifier: &impl Verifier) -> Result<Jwt> {
    let decoded = decode(jwt)?;
    let Some((signing_input, _)) = jwt.rsplit_once('.') else {
        return Err(Err::Decode(anyhow!("invalid Compact JWS format")).into());
    };

    let valid = verifier
        .verify(signing_input.as_bytes(), &decoded.signature)
        .await
        .map_err(|e| Error::new(Err::Signature(e), "issue verifying status list token"))?;
    if !valid {
        return Err(Err::Signature(anyhow!("signature is invalid")).into());
    }

    tracing::debug!("verified {:?} token", decoded.header.typ);
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn unsigned(header: &Value, payload: &Value) -> String {
        let header = Base64UrlUnpadded::encode_string(header.to_string().as_bytes());
        let payload = Base64UrlUnpadded::encode_string(payload.to_string().as_bytes());
        format!("{header}.{payload}.")
    }

    fn list() -> StatusList {
        StatusList::new(vec![1, 0, 0, 1, 1, 1, 0, 1, 1, 1, 0, 0, 0, 1, 0, 1], 1).expect("should create")
    }

    #[test]
    fn header_and_payload() {
        let payload = JwtPayload {
            sub: Some("https://example.com/statuslists/1".into()),
            iat: Some(1_686_920_170),
            ttl: Some(43200),
            ..JwtPayload::default()
        };
        let header = JwtHeader {
            kid: Some("12".into()),
            ..JwtHeader::new(Algorithm::ES256)
        };

        let (header, payload) = create_header_and_payload(&list(), payload, header).expect("should create");
        assert_eq!(header.typ.as_deref(), Some("statuslist+jwt"));
        assert_eq!(header.kid.as_deref(), Some("12"));

        let claim = payload.status_list.expect("should have status_list");
        assert_eq!(claim.bits, BitsPerStatus::One);
        assert_eq!(claim.status_list().expect("should decode").encode_status_list(), vec![0xb9, 0xa3]);
    }

    #[test]
    fn required_claims() {
        let header = JwtHeader::new(Algorithm::ES256);

        let payload = JwtPayload {
            iat: Some(1_686_920_170),
            ..JwtPayload::default()
        };
        let err = create_header_and_payload(&list(), payload, header.clone()).expect_err("should fail");
        assert!(matches!(err.code(), Err::Validation));
        assert_eq!(err.to_string(), "sub field is required");

        let payload = JwtPayload {
            sub: Some("https://example.com/statuslists/1".into()),
            ..JwtPayload::default()
        };
        let err = create_header_and_payload(&list(), payload, header).expect_err("should fail");
        assert_eq!(err.to_string(), "iat field is required");
    }

    #[test]
    fn list_from_token() {
        let jwt = unsigned(
            &json!({"alg": "ES256", "typ": "statuslist+jwt", "kid": "12"}),
            &json!({
                "sub": "https://example.com/statuslists/1",
                "iat": 1_686_920_170,
                "exp": 2_291_720_170_i64,
                "status_list": {"bits": 1, "lst": "eNrbuRgAAhcBXQ"}
            }),
        );

        let decoded = get_list_from_status_list_jwt(&jwt).expect("should decode");
        assert_eq!(decoded.bits_per_status(), BitsPerStatus::One);
        for (i, status) in [1, 0, 0, 1, 1, 1, 0, 1, 1, 1, 0, 0, 0, 1, 0, 1].into_iter().enumerate() {
            assert_eq!(decoded.get_status(i).expect("should get"), status);
        }
    }

    // The unverified extractors read only the claims, so any header works.
    #[test]
    fn foreign_header() {
        let payload = json!({
            "sub": "https://example.com/statuslists/1",
            "iat": 1_686_920_170,
            "status_list": {"bits": 1, "lst": "eNrbuRgAAhcBXQ"},
            "status": {"status_list": {"idx": 3, "uri": "https://example.com/statuslists/0"}}
        });

        for header in [
            json!({"alg": "ES256K", "typ": "statuslist+jwt", "kid": "did:example:123#key-0"}),
            json!({"alg": "HS256"}),
            json!({"typ": "statuslist+jwt"}),
        ] {
            let jwt = unsigned(&header, &payload);

            let decoded = get_list_from_status_list_jwt(&jwt).expect("should decode");
            assert_eq!(decoded.len(), 16);
            assert_eq!(decoded.get_status(3).expect("should get"), 1);

            let entry = get_status_list_from_jwt(&jwt).expect("should decode");
            assert_eq!(entry.idx, 3);

            // the typed header still requires a supported `alg`
            let err = decode(&jwt).expect_err("should fail");
            assert!(matches!(err.code(), Err::Decode(_)));
        }
    }

    #[test]
    fn empty_signature() {
        let jwt = unsigned(
            &json!({"alg": "EdDSA"}),
            &json!({"sub": "https://example.com/statuslists/1", "iat": 1_686_920_170}),
        );
        assert!(jwt.ends_with('.'));

        let decoded = decode(&jwt).expect("should decode");
        assert_eq!(decoded.header.alg, Algorithm::EdDSA);
        assert!(decoded.signature.is_empty());
        assert_eq!(decode_payload(&jwt).expect("should decode"), decoded.payload);
    }

    #[test]
    fn empty_aggregation_uri() {
        let claim = StatusListJwtClaim::new(&list(), Some(String::new())).expect("should create");
        assert_eq!(claim.aggregation_uri, None);

        let claim = StatusListJwtClaim::new(&list(), Some("https://example.com/statuslists".into()))
            .expect("should create");
        assert_eq!(claim.aggregation_uri.as_deref(), Some("https://example.com/statuslists"));
    }

    #[test]
    fn reference_from_token() {
        let jwt = unsigned(
            &json!({"alg": "ES256", "kid": "11"}),
            &json!({
                "iss": "https://example.com/issuer",
                "status": {"status_list": {"idx": 0, "uri": "https://example.com/statuslists/1"}}
            }),
        );

        let entry = get_status_list_from_jwt(&jwt).expect("should decode");
        assert_eq!(entry.idx, 0);
        assert_eq!(entry.uri, "https://example.com/statuslists/1");

        let decoded = decode(&jwt).expect("should decode");
        assert_eq!(decoded.payload.claims.get("iss"), Some(&json!("https://example.com/issuer")));
    }

    #[test]
    fn missing_claims() {
        let jwt = unsigned(&json!({"alg": "ES256"}), &json!({"sub": "https://example.com/1"}));

        let err = get_list_from_status_list_jwt(&jwt).expect_err("should fail");
        assert!(matches!(err.code(), Err::NotFound));
        let err = get_status_list_from_jwt(&jwt).expect_err("should fail");
        assert_eq!(err.to_string(), "No status claim found in JWT payload");
    }

    #[test]
    fn malformed_token() {
        for jwt in ["", "abc", "a.b", "a.b.c.d"] {
            let err = decode(jwt).expect_err("should fail");
            assert!(matches!(err.code(), Err::Decode(_)));
            assert_eq!(err.to_string(), "invalid Compact JWS format");

            let err = decode_payload(jwt).expect_err("should fail");
            assert_eq!(err.to_string(), "invalid Compact JWS format");
        }

        let err = get_list_from_status_list_jwt("!!.??.").expect_err("should fail");
        assert!(matches!(err.code(), Err::Decode(_)));
    }
}
