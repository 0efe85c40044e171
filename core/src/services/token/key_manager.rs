//! RS256 key provider for access token signing and key-set publication

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use auth_shared::JwtConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{DecodingKey, EncodingKey};
use ring::rsa::{KeyPair, PublicKeyComponents};
use tracing::info;

use crate::errors::{DomainError, TokenError};

use super::jwks::RsaPublicComponents;
use super::verifier::VerificationKeySource;

const PKCS8_LABEL: &str = "PRIVATE KEY";
const PKCS1_LABEL: &str = "RSA PRIVATE KEY";

/// Owner of the single active RS256 signing key
///
/// Loaded once at startup and shared behind an `Arc`. The private key never
/// leaves this type; verifiers only see the public [`DecodingKey`] and the
/// published [`JwkSet`].
pub struct KeyProvider {
    /// Private key for signing access tokens
    encoding_key: EncodingKey,
    /// Public key for local verification
    decoding_key: DecodingKey,
    /// RFC 7638 thumbprint, used as `kid`
    key_id: String,
    /// Published key set
    key_set: JwkSet,
    /// Where the key was loaded from
    source: PathBuf,
}

impl std::fmt::Debug for KeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyProvider")
            .field("key_id", &self.key_id)
            .field("source", &self.source)
            .finish()
    }
}

impl KeyProvider {
    /// Loads the key pair from a PEM file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a PKCS#8 (`PRIVATE KEY`) or PKCS#1 (`RSA PRIVATE KEY`) PEM file
    ///
    /// # Returns
    ///
    /// * `Ok(KeyProvider)` - Keys loaded and key set derived
    /// * `Err(DomainError)` - `KeyUnavailable` if the file is missing or not an RSA key
    ///
    /// # Example
    ///
    /// ```no_run
    /// use auth_core::services::token::KeyProvider;
    ///
    /// let keys = KeyProvider::from_file("certs/private.pem")?;
    /// println!("Signing with kid {}", keys.key_id());
    /// # Ok::<(), auth_core::errors::DomainError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let pem = fs::read_to_string(path).map_err(|e| {
            TokenError::key_unavailable(format!(
                "Failed to read private key {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut provider = Self::from_pem(&pem)?;
        provider.source = path.to_path_buf();
        Ok(provider)
    }

    /// Loads the key pair from a PEM string
    pub fn from_pem(pem: &str) -> Result<Self, DomainError> {
        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| TokenError::key_unavailable(format!("Invalid private key: {}", e)))?;

        let components = public_components(pem)?;
        let key_id = components.thumbprint();

        let decoding_key = DecodingKey::from_rsa_components(&components.n, &components.e)
            .map_err(|e| TokenError::key_unavailable(format!("Invalid public key: {}", e)))?;

        let key_set = JwkSet {
            keys: vec![components.to_jwk(&key_id)],
        };

        Ok(Self {
            encoding_key,
            decoding_key,
            key_id,
            key_set,
            source: PathBuf::from("memory"),
        })
    }

    /// Loads the key configured by `JWT_PRIVATE_KEY` or `JWT_PRIVATE_KEY_PATH`
    ///
    /// The inline key takes precedence over the path.
    pub fn from_config(config: &JwtConfig) -> Result<Self, DomainError> {
        let provider = match (&config.private_key_pem, &config.private_key_path) {
            (Some(pem), _) => Self::from_pem(pem)?,
            (None, Some(path)) => Self::from_file(path)?,
            (None, None) => {
                return Err(TokenError::key_unavailable(
                    "Neither JWT_PRIVATE_KEY nor JWT_PRIVATE_KEY_PATH is set",
                )
                .into())
            }
        };

        info!(kid = %provider.key_id, source = %provider.source.display(), "Loaded RS256 signing key");
        Ok(provider)
    }

    /// Returns the encoding key for signing access tokens
    pub fn signing_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the decoding key matching the signing key
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Thumbprint key id, stable for a given key
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// The public key-set document served at `/.well-known/jwks.json`
    pub fn public_key_set(&self) -> &JwkSet {
        &self.key_set
    }
}

#[async_trait]
impl VerificationKeySource for KeyProvider {
    async fn verification_key(&self, kid: Option<&str>) -> Result<DecodingKey, DomainError> {
        match kid {
            Some(kid) if kid != self.key_id => Err(TokenError::TokenMalformed.into()),
            _ => Ok(self.decoding_key.clone()),
        }
    }
}

/// Extract modulus and exponent from the private key PEM
fn public_components(pem: &str) -> Result<RsaPublicComponents, DomainError> {
    let (label, der) = decode_pem(pem)?;

    let key_pair = match label.as_str() {
        PKCS8_LABEL => KeyPair::from_pkcs8(&der),
        PKCS1_LABEL => KeyPair::from_der(&der),
        other => {
            return Err(TokenError::key_unavailable(format!(
                "Unsupported PEM block: {}",
                other
            ))
            .into())
        }
    }
    .map_err(|e| TokenError::key_unavailable(format!("Rejected RSA key: {}", e)))?;

    let public = PublicKeyComponents::<Vec<u8>>::from(key_pair.public());
    Ok(RsaPublicComponents::from_be_bytes(&public.n, &public.e))
}

/// Decode the first PEM block into its label and DER bytes
fn decode_pem(pem: &str) -> Result<(String, Vec<u8>), DomainError> {
    let malformed = || TokenError::key_unavailable("Malformed PEM");

    let mut lines = pem.lines().map(str::trim).skip_while(|l| !l.starts_with("-----BEGIN "));
    let label = lines
        .next()
        .and_then(|l| l.strip_prefix("-----BEGIN "))
        .and_then(|l| l.strip_suffix("-----"))
        .ok_or_else(malformed)?
        .to_string();

    let end = format!("-----END {}-----", label);
    let body: String = lines.take_while(|l| *l != end).collect();

    let der = STANDARD.decode(body).map_err(|_| malformed())?;
    Ok((label, der))
}
