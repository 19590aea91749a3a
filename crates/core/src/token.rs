//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a key handed in at construction.
//! Every token carries a random `jti`, so two logins in the same second
//! still yield distinct tokens.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Identity, Role};

/// Claims embedded in every bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub role: Role,
    /// Expiry, unix seconds
    pub exp: i64,
    /// Issued at, unix seconds
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            username: self.username.clone(),
            role: self.role,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A freshly signed token and the claims inside it
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenSigner {
    /// Create a signer from a symmetric secret.
    ///
    /// `lifetime` is added to the issue time to produce each token's `exp`.
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issue(&self, username: &str, role: Role) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| Error::TokenSigning("token expiry out of range".into()))?;
        let claims = Claims {
            username: username.to_string(),
            role,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::TokenSigning(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// Structurally broken tokens yield [`Error::MalformedToken`]; well-formed
    /// tokens with a bad signature or past expiry yield [`Error::InvalidToken`].
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidToken
                | JwtErrorKind::Base64(_)
                | JwtErrorKind::Json(_)
                | JwtErrorKind::Utf8(_)
                | JwtErrorKind::MissingRequiredClaim(_) => Error::MalformedToken,
                _ => Error::InvalidToken,
            })
    }
}

/// Generate a random 256-bit secret, base64 encoded.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes";

    fn signer() -> TokenSigner {
        TokenSigner::new(SECRET, Duration::minutes(20))
    }

    #[test]
    fn test_issue_and_verify() {
        let signer = signer();
        let issued = signer.issue("alice", Role::Admin).unwrap();
        let claims = signer.verify(&issued.token).unwrap();

        assert_eq!(claims, issued.claims);
        assert_eq!(claims.identity().username, "alice");
        assert!(claims.identity().is_admin());
    }

    #[test]
    fn test_expiry_window() {
        let issued = signer().issue("alice", Role::User).unwrap();
        let expected = Utc::now().timestamp() + 20 * 60;
        assert!((issued.claims.exp - expected).abs() < 5);
        assert_eq!(issued.claims.expires_at().timestamp(), issued.claims.exp);
    }

    #[test]
    fn test_tokens_are_unique() {
        let signer = signer();
        let first = signer.issue("alice", Role::User).unwrap();
        let second = signer.issue("alice", Role::User).unwrap();
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(signer().verify("not-a-token"), Err(Error::MalformedToken)));
        assert!(matches!(signer().verify("a.b.c"), Err(Error::MalformedToken)));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let other = TokenSigner::new(b"another_secret_key_32_bytes_long!", Duration::minutes(20));
        let issued = other.issue("alice", Role::User).unwrap();
        assert!(matches!(signer().verify(&issued.token), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_expired_is_invalid() {
        let expired = TokenSigner::new(SECRET, Duration::minutes(-5));
        let issued = expired.issue("alice", Role::User).unwrap();
        assert!(matches!(signer().verify(&issued.token), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        let signer = TokenSigner::new(SECRET, Duration::MAX);
        assert!(matches!(
            signer.issue("alice", Role::User),
            Err(Error::TokenSigning(_))
        ));
    }

    #[test]
    fn test_generated_secret() {
        let secret = generate_secret();
        assert_eq!(STANDARD.decode(&secret).unwrap().len(), 32);
        assert_ne!(secret, generate_secret());
    }
}
