/// Integration tests for crypto-core JWT functionality
///
/// This test module covers:
/// - Token round trips through the public API
/// - Rejection of expired, tampered and foreign-signed tokens
use chrono::Duration;
use crypto_core::jwt::JwtKeys;
use crypto_core::{validate_secret_strength, SecretStrength};
use uuid::Uuid;

const TEST_SECRET: &str = "integration-secret-Xq9!Lm2#Pz7$Rw4&Tn8";

#[test]
fn test_round_trip_preserves_identity() {
    let keys = JwtKeys::from_secret(TEST_SECRET);
    let user_id = Uuid::new_v4();

    let token = keys.generate_access_token(user_id, "integration-user").unwrap();
    let (id, username) = keys.identity_from_token(&token).unwrap();

    assert_eq!(id, user_id);
    assert_eq!(username, "integration-user");
}

#[test]
fn test_tampered_payload_rejected() {
    let keys = JwtKeys::from_secret(TEST_SECRET);
    let token = keys.generate_access_token(Uuid::new_v4(), "alice").unwrap();

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let other = keys.generate_access_token(Uuid::new_v4(), "mallory").unwrap();
    parts[1] = other.split('.').nth(1).unwrap().to_string();
    let forged = parts.join(".");

    assert!(keys.validate_token(&forged).is_err());
}

#[test]
fn test_expired_token_rejected() {
    let keys = JwtKeys::from_secret(TEST_SECRET);
    let token = keys
        .generate_token(Uuid::new_v4(), "alice", Duration::hours(-1))
        .unwrap();

    assert!(keys.identity_from_token(&token).is_err());
}

#[test]
fn test_keys_debug_redacts_secret() {
    let keys = JwtKeys::from_secret(TEST_SECRET);
    let rendered = format!("{:?}", keys);

    assert!(rendered.contains("REDACTED"));
    assert!(!rendered.contains(TEST_SECRET));
}

#[test]
fn test_integration_secret_is_not_weak() {
    assert_ne!(validate_secret_strength(TEST_SECRET), SecretStrength::Weak);
}
