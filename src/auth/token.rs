//! Signed identity tokens (JWT, HS256)

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::{AuthConfig, MAX_TOKEN_TTL_MINUTES},
    error::AppError,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is invalid")]
    Invalid,

    #[error("Token has expired")]
    Expired,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired => AppError::Unauthorized,
            TokenError::Signing(msg) => AppError::Internal(msg),
        }
    }
}

/// JWT claims carried by access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies access tokens with the configured secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let ttl_minutes = config.token_ttl_minutes.min(MAX_TOKEN_TTL_MINUTES) as i64;

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            default_ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign a token for `subject_id` expiring `ttl` from now.
    pub fn issue(&self, subject_id: i32, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject_id.to_string(),
            iat: now,
            exp: now + ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature and expiry and return the subject id.
    pub fn verify(&self, token: &str) -> Result<i32, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        // exp == now counts as expired
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        data.claims.sub.parse().map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn service(secret: &str) -> TokenService {
        TokenService::new(&AuthConfig::new(secret, 60))
    }

    #[test]
    fn oversized_ttl_is_clamped() {
        let tokens = TokenService::new(&AuthConfig::new(SECRET, u64::MAX));
        assert_eq!(
            tokens.default_ttl(),
            Duration::minutes(MAX_TOKEN_TTL_MINUTES as i64)
        );
    }

    #[test]
    fn issued_token_verifies_to_subject() {
        let tokens = service(SECRET);
        let token = tokens.issue(42, tokens.default_ttl()).unwrap();
        assert_eq!(tokens.verify(&token), Ok(42));
    }

    #[test]
    fn default_ttl_comes_from_config() {
        assert_eq!(service(SECRET).default_ttl(), Duration::minutes(60));
    }

    #[test]
    fn zero_ttl_is_expired() {
        let tokens = service(SECRET);
        let token = tokens.issue(42, Duration::zero()).unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn past_expiry_is_expired() {
        let tokens = service(SECRET);
        let token = tokens.issue(42, Duration::minutes(-5)).unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_signed_with_other_key_is_invalid() {
        let other = service("another-secret-that-is-long-enough-too");
        let token = other.issue(42, Duration::minutes(5)).unwrap();
        assert_eq!(service(SECRET).verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let tokens = service(SECRET);
        let token = tokens.issue(42, Duration::minutes(5)).unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &Claims { sub: "1".into(), iat: 0, exp: i64::MAX / 2 },
            &EncodingKey::from_secret(b"forged"),
        )
        .unwrap();
        let forged_payload: Vec<&str> = forged.split('.').collect();
        parts[1] = forged_payload[1];

        assert_eq!(tokens.verify(&parts.join(".")), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(service(SECRET).verify("not.a.token"), Err(TokenError::Invalid));
        assert_eq!(service(SECRET).verify(""), Err(TokenError::Invalid));
    }

    #[test]
    fn non_numeric_subject_is_invalid() {
        let tokens = service(SECRET);
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Claims { sub: "admin".into(), iat: now, exp: now + 300 },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::Invalid));
    }
}
