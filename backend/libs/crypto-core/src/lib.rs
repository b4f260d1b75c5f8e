//! Shared cryptographic helpers for Pixwall services.
//!
//! - `jwt`: HS256 bearer token signing and verification against a shared secret
//! - `secret`: strength classification for configured signing secrets
pub mod jwt;
pub mod secret;

pub use jwt::{Claims, JwtKeys};
pub use secret::{validate_secret_strength, SecretStrength};
