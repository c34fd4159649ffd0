//! Customer accounts and password hashing.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct CustomerUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Stored as `sha256$<salt hex>$<digest hex>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn create(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Self::with_salt(password, &salt)
    }

    fn with_salt(password: &str, salt: &[u8]) -> Self {
        Self(format!("{SCHEME}${}${}", to_hex(salt), to_hex(&digest(salt, password))))
    }

    pub fn parse(stored: &str) -> Result<Self, PasswordError> {
        let mut parts = stored.split('$');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(SCHEME), Some(salt), Some(hash), None) if from_hex(salt).is_some() && from_hex(hash).is_some() => {
                Ok(Self(stored.to_string()))
            }
            _ => Err(PasswordError::Malformed),
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        let mut parts = self.0.split('$').skip(1);
        let (Some(salt), Some(expected)) = (parts.next().and_then(from_hex), parts.next().and_then(from_hex)) else {
            return false;
        };
        let actual = digest(&salt, password);
        actual.len() == expected.len() && actual.iter().zip(&expected).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Fixed hash that no password matches. Checking against it costs the
    /// same as a real check, for logins with an unknown email.
    pub fn decoy() -> &'static PasswordHash {
        static DECOY: OnceLock<PasswordHash> = OnceLock::new();
        DECOY.get_or_init(|| {
            let mut hash = PasswordHash::with_salt("", &[0u8; SALT_LEN]);
            hash.0.replace_range(hash.0.len() - 64.., &"0".repeat(64));
            hash
        })
    }
}

impl CustomerUser {
    pub fn check_password(&self, password: &str) -> bool {
        PasswordHash::parse(&self.password_hash).map(|h| h.verify(password)).unwrap_or(false)
    }
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.is_empty() || s.len() % 2 != 0 { return None; }
    (0..s.len()).step_by(2).map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("Malformed password hash")]
    Malformed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordHash::create("correct horse");
        assert!(hash.as_str().starts_with("sha256$"));
        assert!(hash.verify("correct horse"));
        assert!(!hash.verify("Correct horse"));
    }

    #[test]
    fn test_salt_changes_hash() {
        assert_ne!(PasswordHash::create("same"), PasswordHash::create("same"));
        assert_eq!(PasswordHash::with_salt("same", b"salt"), PasswordHash::with_salt("same", b"salt"));
    }

    #[test]
    fn test_decoy_matches_nothing() {
        let decoy = PasswordHash::decoy();
        assert!(PasswordHash::parse(decoy.as_str()).is_ok());
        assert!(!decoy.verify(""));
        assert!(!decoy.verify("secret123"));
    }

    #[test]
    fn test_parse_rejects_plaintext() {
        assert_eq!(PasswordHash::parse("hunter22"), Err(PasswordError::Malformed));
        assert_eq!(PasswordHash::parse("sha256$zz$00"), Err(PasswordError::Malformed));
    }

    #[test]
    fn test_serialization_omits_hash() {
        let user = CustomerUser {
            id: Uuid::nil(), name: "Ann".into(), email: "ann@example.com".into(),
            password_hash: PasswordHash::create("secret123").as_str().into(),
            phone: None, address: None, created_at: Utc::now(),
        };
        assert!(user.check_password("secret123"));
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
