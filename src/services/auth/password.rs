/*
 * Responsibility
 * - One-way password hashing behind a narrow trait (hash / verify)
 * - The hash string is self-describing (PHC format: algorithm, params, salt, digest)
 */
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("salt generation failed: {0}")]
    Salt(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Swappable password hashing capability.
pub trait CredentialVerifier: Send + Sync {
    /// Salted one-way hash. Hashing the same plaintext twice gives different outputs.
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// `false` for a mismatch and for a stored hash that cannot be parsed.
    fn verify(&self, plaintext: &str, password_hash: &str) -> bool;
}

#[derive(Default)]
pub struct Argon2Verifier {
    argon2: Argon2<'static>,
}

impl Argon2Verifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::fill(&mut salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;

        let phc = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;

        Ok(phc.to_string())
    }

    fn verify(&self, plaintext: &str, password_hash: &str) -> bool {
        match PasswordHash::new(password_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let v = Argon2Verifier::new();
        let h = v.hash("correct horse").unwrap();

        assert!(h.starts_with("$argon2"));
        assert!(v.verify("correct horse", &h));
        assert!(!v.verify("correct horsE", &h));
        assert!(!v.verify("", &h));
    }

    #[test]
    fn same_plaintext_gets_a_fresh_salt() {
        let v = Argon2Verifier::new();
        let a = v.hash("s3cret").unwrap();
        let b = v.hash("s3cret").unwrap();

        assert_ne!(a, b);
        assert!(v.verify("s3cret", &a));
        assert!(v.verify("s3cret", &b));
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let v = Argon2Verifier::new();
        let h = v.hash("plaintext-marker").unwrap();
        assert!(!h.contains("plaintext-marker"));
    }

    #[test]
    fn malformed_hash_does_not_verify() {
        let v = Argon2Verifier::new();
        assert!(!v.verify("pw", "not-a-phc-string"));
        assert!(!v.verify("pw", ""));
    }
}
