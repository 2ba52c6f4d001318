//! # Hashing de Passwords y Tokens
//! src/users/auth.rs
//!
//! Colaboradores externos del núcleo. Las implementaciones por defecto
//! usan SHA256; el diseño del protocolo de autenticación queda fuera.

use crate::error::AuthError;
use crate::users::model::UserId;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub type AuthResult<T> = std::result::Result<T, AuthError>;

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> AuthResult<String>;

    /// `Ok(false)` si el password no coincide
    fn verify(&self, hash: &str, password: &str) -> AuthResult<bool>;
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: UserId) -> AuthResult<String>;

    fn validate(&self, token: &str) -> AuthResult<UserId>;
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    to_hex(&hasher.finalize())
}

/// Comparación sin cortocircuito
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

/// Hash `salt$sha256(salt || password)` con salt aleatorio de 16 bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl PasswordHasher for Sha256Hasher {
    fn hash(&self, password: &str) -> AuthResult<String> {
        let salt: [u8; 16] = rand::thread_rng().gen();
        let salt = to_hex(&salt);
        let digest = sha256_hex(&[salt.as_bytes(), password.as_bytes()]);
        Ok(format!("{}${}", salt, digest))
    }

    fn verify(&self, hash: &str, password: &str) -> AuthResult<bool> {
        let (salt, expected) = hash
            .split_once('$')
            .ok_or_else(|| AuthError::Hash("malformed password hash".to_string()))?;

        let digest = sha256_hex(&[salt.as_bytes(), password.as_bytes()]);
        Ok(constant_time_eq(&digest, expected))
    }
}

/// Tokens `user_id.expires.firma`, firma = sha256(secret|user_id|expires)
#[derive(Debug, Clone)]
pub struct DigestTokenIssuer {
    secret: String,
    ttl: Duration,
}

impl DigestTokenIssuer {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    fn sign(&self, user_id: UserId, expires: u64) -> String {
        sha256_hex(&[
            self.secret.as_bytes(),
            b"|",
            user_id.to_string().as_bytes(),
            b"|",
            expires.to_string().as_bytes(),
        ])
    }

    fn epoch_secs(at: SystemTime) -> u64 {
        at.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
    }

    pub fn issue_at(&self, user_id: UserId, now: SystemTime) -> String {
        let expires = Self::epoch_secs(now).saturating_add(self.ttl.as_secs());
        format!("{}.{}.{}", user_id, expires, self.sign(user_id, expires))
    }

    pub fn validate_at(&self, token: &str, now: SystemTime) -> AuthResult<UserId> {
        let mut parts = token.splitn(3, '.');
        let (Some(id), Some(expires), Some(signature)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken);
        };

        let user_id: UserId = id.parse().map_err(|_| AuthError::InvalidToken)?;
        let expires: u64 = expires.parse().map_err(|_| AuthError::InvalidToken)?;

        if !constant_time_eq(&self.sign(user_id, expires), signature) {
            return Err(AuthError::InvalidToken);
        }
        if Self::epoch_secs(now) > expires {
            return Err(AuthError::Expired);
        }

        Ok(user_id)
    }
}

impl TokenIssuer for DigestTokenIssuer {
    fn issue(&self, user_id: UserId) -> AuthResult<String> {
        Ok(self.issue_at(user_id, SystemTime::now()))
    }

    fn validate(&self, token: &str) -> AuthResult<UserId> {
        self.validate_at(token, SystemTime::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Passwords ====================

    #[test]
    fn test_hash_and_verify() {
        let hasher = Sha256Hasher;
        let hash = hasher.hash("hunter22").unwrap();

        assert!(!hash.contains("hunter22"));
        assert!(hasher.verify(&hash, "hunter22").unwrap());
        assert!(!hasher.verify(&hash, "hunter23").unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = Sha256Hasher;
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            Sha256Hasher.verify("no-separator", "x"),
            Err(AuthError::Hash(_))
        ));
    }

    // ==================== Tokens ====================

    #[test]
    fn test_token_round_trip() {
        let issuer = DigestTokenIssuer::new("secret", Duration::from_secs(60));
        let token = issuer.issue(42).unwrap();

        assert_eq!(issuer.validate(&token).unwrap(), 42);
    }

    #[test]
    fn test_token_wrong_secret_or_tampered() {
        let issuer = DigestTokenIssuer::new("secret", Duration::from_secs(60));
        let other = DigestTokenIssuer::new("other", Duration::from_secs(60));
        let token = issuer.issue(42).unwrap();

        assert_eq!(other.validate(&token), Err(AuthError::InvalidToken));

        let tampered = token.replacen("42", "43", 1);
        assert_eq!(issuer.validate(&tampered), Err(AuthError::InvalidToken));
        assert_eq!(issuer.validate("garbage"), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_token_expires() {
        let issuer = DigestTokenIssuer::new("secret", Duration::from_secs(60));
        let issued = UNIX_EPOCH + Duration::from_secs(1_000_000);
        let token = issuer.issue_at(7, issued);

        assert_eq!(issuer.validate_at(&token, issued + Duration::from_secs(59)), Ok(7));
        assert_eq!(
            issuer.validate_at(&token, issued + Duration::from_secs(61)),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let issuer = DigestTokenIssuer::new("secret", Duration::MAX);
        let issued = UNIX_EPOCH + Duration::from_secs(1_000_000);
        let token = issuer.issue_at(9, issued);

        assert!(token.starts_with(&format!("9.{}.", u64::MAX)));
        assert_eq!(issuer.validate_at(&token, issued + Duration::from_secs(86_400)), Ok(9));
    }
}
