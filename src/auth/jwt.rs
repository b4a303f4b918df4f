//! JWT Token Handler
//! Mission: Issue and validate signed bearer tokens

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Fixed token lifetime. Expired tokens require a fresh login; there is no
/// refresh mechanism.
pub const TOKEN_TTL_MINUTES: i64 = 30;

/// Token validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Malformed,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token expired"),
            TokenError::Malformed => write!(f, "Invalid token"),
        }
    }
}

impl std::error::Error for TokenError {}

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Generate a JWT token for a username, expiring in [`TOKEN_TTL_MINUTES`]
    pub fn generate_token(&self, username: &str) -> Result<String> {
        self.generate_token_with_ttl(username, TOKEN_TTL_MINUTES)
    }

    /// Generate a token with an explicit TTL in minutes
    pub fn generate_token_with_ttl(&self, username: &str, ttl_minutes: i64) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(chrono::Duration::minutes(ttl_minutes))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: username.to_string(),
            exp: expiration,
        };

        debug!(
            "Generating JWT for {}, expires in {}m",
            username, ttl_minutes
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        // Expiry is exact: no grace period once `exp` has passed
        let mut validation = Validation::default();
        validation.leeway = 0;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?;

        debug!("Validated JWT for {}", decoded.claims.sub);

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_generation_and_validation() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());

        let token = handler.generate_token("admin").unwrap();
        assert!(!token.is_empty());

        let claims = handler.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn test_expired_token_rejected_as_expired() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());

        let token = handler.generate_token_with_ttl("admin", -5).unwrap();

        let result = handler.validate_token(&token);
        assert_eq!(result.unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_token_just_past_expiry_rejected() {
        let secret = "test-secret-key-12345";
        let handler = JwtHandler::new(secret.to_string());

        // A token whose expiry passed seconds ago must already be rejected;
        // validity ends at exp, not at exp plus a grace period.
        let claims = Claims {
            sub: "admin".to_string(),
            exp: (Utc::now().timestamp() - 30) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let result = handler.validate_token(&token);
        assert_eq!(result.unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_garbage_token_rejected_as_malformed() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());

        let result = handler.validate_token("invalid.token.here");
        assert_eq!(result.unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_different_secrets_reject() {
        let handler1 = JwtHandler::new("secret1".to_string());
        let handler2 = JwtHandler::new("secret2".to_string());

        let token = handler1.generate_token("admin").unwrap();

        let result = handler2.validate_token(&token);
        assert_eq!(result.unwrap_err(), TokenError::Malformed);
    }
}
