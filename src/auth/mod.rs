use chrono::{Duration, Utc};
use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::{EncodePrivateKey, EncodePublicKey};
use ed25519_dalek::{SigningKey, VerifyingKey};
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Algorithm family every token is signed and verified with
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::EdDSA;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Member id the token was issued for
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("key encoding failed: {0}")]
    KeyEncoding(String),
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("token lifetime of {0} hours is out of range")]
    InvalidLifetime(u64),
}

/// Signs bearer tokens with a keypair generated for the lifetime of the process.
pub struct TokenIssuer {
    signing_key: SigningKey,
    encoding_key: EncodingKey,
    public_key_pem: String,
    issuer: String,
    lifetime: Duration,
}

impl TokenIssuer {
    /// Generate a fresh Ed25519 keypair from the OS RNG.
    pub fn generate(config: &SecurityConfig) -> Result<Self, JwtError> {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_signing_key(signing_key, config)
    }

    fn from_signing_key(signing_key: SigningKey, config: &SecurityConfig) -> Result<Self, JwtError> {
        let private_pem = signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| JwtError::KeyEncoding(e.to_string()))?;
        let encoding_key = EncodingKey::from_ed_pem(private_pem.as_bytes())
            .map_err(|e| JwtError::KeyEncoding(e.to_string()))?;
        let public_key_pem = signing_key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| JwtError::KeyEncoding(e.to_string()))?;

        let hours = config.jwt_expiry_hours;
        let lifetime = i64::try_from(hours)
            .ok()
            .and_then(Duration::try_hours)
            .filter(|lifetime| Utc::now().checked_add_signed(*lifetime).is_some())
            .ok_or(JwtError::InvalidLifetime(hours))?;

        Ok(Self {
            signing_key,
            encoding_key,
            public_key_pem,
            issuer: config.jwt_issuer.clone(),
            lifetime,
        })
    }

    /// Issue a token bound to `member_id`, valid for the configured lifetime.
    pub fn issue(&self, member_id: Uuid) -> Result<String, JwtError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| JwtError::TokenGeneration("expiry out of range".to_string()))?;
        let claims = Claims {
            sub: member_id,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(TOKEN_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Copy of the verification key.
    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

/// Everything the access-control middleware needs to check a token.
#[derive(Clone)]
pub struct VerificationKeys {
    pub decoding_key: DecodingKey,
    pub issuer: String,
}

impl VerificationKeys {
    pub fn from_public_key(key: &VerifyingKey, issuer: impl Into<String>) -> Result<Self, JwtError> {
        let pem = key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| JwtError::KeyEncoding(e.to_string()))?;
        let decoding_key = DecodingKey::from_ed_pem(pem.as_bytes())
            .map_err(|e| JwtError::KeyEncoding(e.to_string()))?;
        Ok(Self {
            decoding_key,
            issuer: issuer.into(),
        })
    }

    pub fn for_issuer(issuer: &TokenIssuer) -> Result<Self, JwtError> {
        Self::from_public_key(&issuer.public_key(), issuer.issuer())
    }
}
