/// Shared JWT module for Pixwall services
///
/// Tokens are issued by the auth side and verified here with HS256 against a
/// secret shared through process configuration.
///
/// ## Usage
///
/// ```rust
/// use crypto_core::jwt::JwtKeys;
/// use uuid::Uuid;
///
/// let keys = JwtKeys::from_secret("a-shared-secret-that-is-long-enough!");
/// let token = keys.generate_access_token(Uuid::new_v4(), "alice").unwrap();
/// let claims = keys.validate_token(&token).unwrap().claims;
/// assert_eq!(claims.username, "alice");
/// ```
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 1;

/// Only HS256 is accepted; tokens signed with anything else are rejected.
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Data Structures
// ============================================================================

/// JWT claims carried by bearer tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Caller user ID (UUID string)
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Caller display name
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

// ============================================================================
// Key Storage
// ============================================================================

/// Signing and verification keys derived from one shared secret.
///
/// Built once at startup and shared behind an `Arc`.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("algorithm", &JWT_ALGORITHM)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    // ========================================================================
    // Token Generation
    // ========================================================================

    /// Generate an access token valid for one hour.
    ///
    /// Token issuance belongs to the auth side; this exists for tests and
    /// local tooling.
    pub fn generate_access_token(&self, user_id: Uuid, username: &str) -> Result<String> {
        self.generate_token(user_id, username, Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS))
    }

    /// Generate a token with an explicit lifetime (negative values yield an
    /// already-expired token).
    pub fn generate_token(&self, user_id: Uuid, username: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();

        let claims = Claims {
            user_id: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| anyhow!("Failed to generate token: {e}"))
    }

    // ========================================================================
    // Token Validation
    // ========================================================================

    /// Validate and decode a JWT token (without the "Bearer " prefix).
    ///
    /// ## Errors
    ///
    /// Returns error if:
    /// - Token signature is invalid
    /// - Token is expired
    /// - Token format is malformed
    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| anyhow!("Token validation failed: {e}"))
    }

    /// Extract the caller identity from a validated token.
    pub fn identity_from_token(&self, token: &str) -> Result<(Uuid, String)> {
        let claims = self.validate_token(token)?.claims;
        let user_id = Uuid::parse_str(&claims.user_id)
            .map_err(|e| anyhow!("Invalid user ID format in token: {e}"))?;
        Ok((user_id, claims.username))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-min-32-chars-long!!!";

    #[test]
    fn test_generate_access_token() {
        let keys = JwtKeys::from_secret(TEST_SECRET);
        let token = keys
            .generate_access_token(Uuid::new_v4(), "testuser")
            .expect("Failed to generate token");

        assert_eq!(token.matches('.').count(), 2); // JWT has 3 parts
    }

    #[test]
    fn test_validate_valid_token() {
        let keys = JwtKeys::from_secret(TEST_SECRET);
        let user_id = Uuid::new_v4();
        let token = keys.generate_access_token(user_id, "testuser").unwrap();

        let claims = keys.validate_token(&token).unwrap().claims;
        assert_eq!(claims.user_id, user_id.to_string());
        assert_eq!(claims.username, "testuser");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_claims_use_camel_case_user_id() {
        let claims = Claims {
            user_id: "abc".into(),
            username: "bob".into(),
            iat: 1,
            exp: 2,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], "abc");
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_validate_invalid_token() {
        let keys = JwtKeys::from_secret(TEST_SECRET);
        assert!(keys.validate_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtKeys::from_secret("wrong-secret-key!!!!!!!!!!!!!!!!!");
        let verifier = JwtKeys::from_secret(TEST_SECRET);
        let token = issuer.generate_access_token(Uuid::new_v4(), "mallory").unwrap();

        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = JwtKeys::from_secret(TEST_SECRET);
        let token = keys
            .generate_token(Uuid::new_v4(), "late", Duration::minutes(-5))
            .unwrap();

        assert!(keys.validate_token(&token).is_err());
    }

    #[test]
    fn test_identity_from_token() {
        let keys = JwtKeys::from_secret(TEST_SECRET);
        let user_id = Uuid::new_v4();
        let token = keys.generate_access_token(user_id, "carol").unwrap();

        let (id, name) = keys.identity_from_token(&token).unwrap();
        assert_eq!(id, user_id);
        assert_eq!(name, "carol");
    }

    #[test]
    fn test_identity_requires_uuid_subject() {
        let keys = JwtKeys::from_secret(TEST_SECRET);
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: "65f1c0ffee".into(),
            username: "dave".into(),
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(keys.validate_token(&token).is_ok());
        assert!(keys.identity_from_token(&token).is_err());
    }
}
