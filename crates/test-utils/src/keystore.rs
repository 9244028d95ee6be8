//! Ed25519 keys for signing and verifying Status List Tokens.

use anyhow::anyhow;
use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::{SecretKey, Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use token_status_list::crypto::{Algorithm, Signer, Verifier};

pub const ISSUER_KID: &str = "did:web:example.com#key-0";
const ISSUER_SECRET: &str = "btvu4hBlWsQzQkFc5VP576wb7_ha0RZK9MZzS6oumNA";

/// Status list issuer's key pair.
#[derive(Clone, Debug)]
pub struct IssuerKeystore {
    signing_key: SigningKey,
    kid: Option<String>,
}

impl Default for IssuerKeystore {
    fn default() -> Self {
        Self::new()
    }
}

impl IssuerKeystore {
    /// The fixed issuer key, identified by [`ISSUER_KID`].
    ///
    /// # Panics
    ///
    /// Panics if the hard-coded secret is malformed.
    #[must_use]
    pub fn new() -> Self {
        let decoded = Base64UrlUnpadded::decode_vec(ISSUER_SECRET).expect("secret should decode");
        let secret_key: SecretKey = decoded.try_into().expect("secret should be 32 bytes");
        Self {
            signing_key: SigningKey::from_bytes(&secret_key),
            kid: Some(ISSUER_KID.to_string()),
        }
    }

    /// A freshly generated key with no key identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
            kid: None,
        }
    }

    /// Verifier for this key's signatures.
    #[must_use]
    pub fn verifier(&self) -> IssuerVerifier {
        IssuerVerifier(self.signing_key.verifying_key())
    }
}

impl Signer for IssuerKeystore {
    fn algorithm(&self) -> Algorithm {
        Algorithm::EdDSA
    }

    fn key_id(&self) -> Option<String> {
        self.kid.clone()
    }

    async fn try_sign(&self, msg: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(self.signing_key.sign(msg).to_bytes().to_vec())
    }
}

/// Verifies signatures made by an [`IssuerKeystore`].
#[derive(Clone, Debug)]
pub struct IssuerVerifier(VerifyingKey);

impl Verifier for IssuerVerifier {
    async fn verify(&self, msg: &[u8], signature: &[u8]) -> anyhow::Result<bool> {
        let signature = Signature::from_slice(signature)
            .map_err(|e| anyhow!("unable to build signature: {e}"))?;
        Ok(self.0.verify(msg, &signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_verify() {
        let keystore = IssuerKeystore::new();
        let signature = keystore.try_sign(b"status list").await.expect("should sign");

        let verifier = keystore.verifier();
        assert!(verifier.verify(b"status list", &signature).await.expect("should verify"));
        assert!(!verifier.verify(b"other", &signature).await.expect("should verify"));

        let other = IssuerKeystore::generate().verifier();
        assert!(!other.verify(b"status list", &signature).await.expect("should verify"));
    }
}
