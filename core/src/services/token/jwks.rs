//! JWK construction and RFC 7638 thumbprints for RSA public keys

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::jwk::{
    AlgorithmParameters, CommonParameters, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse,
    RSAKeyParameters, RSAKeyType,
};
use sha2::{Digest, Sha256};

/// Base64url (no padding) modulus and exponent of an RSA public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicComponents {
    pub n: String,
    pub e: String,
}

impl RsaPublicComponents {
    /// Encode big-endian modulus and exponent bytes
    pub fn from_be_bytes(n: &[u8], e: &[u8]) -> Self {
        Self {
            n: URL_SAFE_NO_PAD.encode(n),
            e: URL_SAFE_NO_PAD.encode(e),
        }
    }

    /// RFC 7638 thumbprint: SHA-256 over the canonical `{e,kty,n}` JSON
    pub fn thumbprint(&self) -> String {
        // Members in lexicographic order with no whitespace
        let canonical = format!(r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#, self.e, self.n);
        URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes()))
    }

    /// Signing JWK with `use=sig`, `alg=RS256` and the given key id
    pub fn to_jwk(&self, kid: &str) -> Jwk {
        Jwk {
            common: CommonParameters {
                public_key_use: Some(PublicKeyUse::Signature),
                key_algorithm: Some(KeyAlgorithm::RS256),
                key_id: Some(kid.to_string()),
                ..Default::default()
            },
            algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
                key_type: RSAKeyType::RSA,
                n: self.n.clone(),
                e: self.e.clone(),
            }),
        }
    }
}

/// Select the key matching `kid`
///
/// A token without a `kid` is accepted only when the set holds exactly one
/// RSA key.
pub fn select_key<'a>(set: &'a JwkSet, kid: Option<&str>) -> Option<&'a Jwk> {
    match kid {
        Some(kid) => set.find(kid),
        None => {
            let mut rsa = set
                .keys
                .iter()
                .filter(|k| matches!(k.algorithm, AlgorithmParameters::RSA(_)));
            match (rsa.next(), rsa.next()) {
                (Some(only), None) => Some(only),
                _ => None,
            }
        }
    }
}
