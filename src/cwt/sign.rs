//! # COSE signing
//!
//! Wraps a CWT claims set in a tagged `COSE_Sign1` structure, signed with an
//! injected [`Signer`], and checks such a structure with an injected
//! [`Verifier`].

use anyhow::anyhow;
use ciborium::Value;
use coset::{CoseSign1, CoseSign1Builder, Header, TaggedCborSerializable};
use tracing::instrument;

use super::header::{create_status_list_cwt_header, parameter, KeyResolution};
use super::payload::{encode_cwt_payload, PayloadOptions};
use super::{header_key, CWT_STATUS_LIST_TYPE};
use crate::crypto::{Signer, Verifier};
use crate::err;
use crate::error::{Err, Error, Result};
use crate::status_list::StatusList;

/// Sign an encoded claims set, returning a tagged `COSE_Sign1`.
///
/// # Errors
///
/// Returns a signature error when the signer fails, and a decode error if
/// the structure cannot be serialized.
#[instrument(level = "debug", skip_all)]
pub async fn sign(payload: Vec<u8>, header: Header, signer: &impl Signer) -> Result<Vec<u8>> {
    let unsigned = CoseSign1Builder::new().protected(header).payload(payload).build();
    let signature = signer
        .try_sign(&unsigned.tbs_data(b""))
        .await
        .map_err(|e| Error::new(Err::Signature(e), "issue signing status list token"))?;

    let cose_sign_1 = CoseSign1 {
        signature,
        ..unsigned
    };
    Ok(cose_sign_1.to_tagged_vec()?)
}

/// Build, encode and sign a Status List Token in CWT format.
///
/// The header takes its algorithm from the signer, and its `kid` from the
/// signer's key identifier when it has one.
///
/// # Errors
///
/// Returns the errors of [`encode_cwt_payload`] and [`sign`].
pub async fn issue(
    list: &StatusList, subject: &str, issued_at: i64, options: &PayloadOptions,
    signer: &impl Signer,
) -> Result<Vec<u8>> {
    let key = signer.key_id().map(|kid| KeyResolution::Kid(kid.into()));
    let header = create_status_list_cwt_header(signer.algorithm(), key);
    let payload = encode_cwt_payload(list, subject, issued_at, options)?;
    sign(payload, header, signer).await
}

/// Verify a tagged `COSE_Sign1` Status List Token, returning its encoded
/// claims set.
///
/// # Errors
///
/// Returns a decode error for a malformed token or wrong `typ`, a signature
/// error when the signature does not verify, and a not-found error when the
/// token has no payload.
#[instrument(level = "debug", skip_all)]
pub async fn verify(token: &[u8], verifier: &impl Verifier) -> Result<Vec<u8>> {
    let cose_sign_1 = CoseSign1::from_tagged_slice(token)?;

    let typ = parameter(&cose_sign_1.protected.header, header_key::TYPE);
    if typ != Some(&Value::Text(CWT_STATUS_LIST_TYPE.into())) {
        return Err(Err::Decode(anyhow!("token typ is not {CWT_STATUS_LIST_TYPE}")).into());
    }

    let valid = verifier
        .verify(&cose_sign_1.tbs_data(b""), &cose_sign_1.signature)
        .await
        .map_err(|e| Error::new(Err::Signature(e), "issue verifying status list token"))?;
    if !valid {
        return Err(Err::Signature(anyhow!("signature is invalid")).into());
    }

    let Some(payload) = cose_sign_1.payload else {
        err!(Err::NotFound, "No payload found in CWT");
    };
    tracing::debug!("verified status list token");
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use sha2::{Digest, Sha256};

    use super::*;
    use crate::crypto::Algorithm;
    use crate::cwt::get_list_from_status_list_cwt;

    // Keyed digest standing in for a real signature scheme.
    struct Keyed(&'static [u8]);

    impl Keyed {
        fn mac(&self, msg: &[u8]) -> Vec<u8> {
            Sha256::new().chain_update(self.0).chain_update(msg).finalize().to_vec()
        }
    }

    impl Signer for Keyed {
        fn algorithm(&self) -> Algorithm {
            Algorithm::ES256
        }

        fn key_id(&self) -> Option<String> {
            Some("key-1".into())
        }

        async fn try_sign(&self, msg: &[u8]) -> anyhow::Result<Vec<u8>> {
            Ok(self.mac(msg))
        }
    }

    impl Verifier for Keyed {
        async fn verify(&self, msg: &[u8], signature: &[u8]) -> anyhow::Result<bool> {
            Ok(self.mac(msg) == signature)
        }
    }

    fn list() -> StatusList {
        StatusList::new(vec![1, 0, 0, 1, 1, 1, 0, 1], 1).expect("should create")
    }

    #[tokio::test]
    async fn sign_and_verify() {
        let signer = Keyed(b"secret");
        let token = issue(&list(), "https://example.com/1", 1_000_000, &PayloadOptions::default(), &signer)
            .await
            .expect("should issue");

        let cose_sign_1 = CoseSign1::from_tagged_slice(&token).expect("should parse");
        assert_eq!(cose_sign_1.protected.header.key_id, b"key-1".to_vec());

        let payload = verify(&token, &signer).await.expect("should verify");
        let decoded = get_list_from_status_list_cwt(&payload).expect("should decode");
        assert_eq!(decoded.get_status(3).expect("should get"), 1);
    }

    #[tokio::test]
    async fn wrong_key() {
        let token = issue(
            &list(),
            "https://example.com/1",
            1_000_000,
            &PayloadOptions::default(),
            &Keyed(b"secret"),
        )
        .await
        .expect("should issue");

        let err = verify(&token, &Keyed(b"other")).await.expect_err("should fail");
        assert!(matches!(err.code(), Err::Signature(_)));
    }

    #[tokio::test]
    async fn wrong_type() {
        let signer = Keyed(b"secret");
        let header = coset::HeaderBuilder::new().algorithm(Algorithm::ES256.to_cose()).build();
        let token = sign(vec![0xa0], header, &signer).await.expect("should sign");

        let err = verify(&token, &signer).await.expect_err("should fail");
        assert!(matches!(err.code(), Err::Decode(_)));
    }
}
