//! # Cryptographic Utilities
//!
//! Secret hashing and random identifier generation.
//!
//! ## Invariants
//! - Secrets are only stored as Argon2id PHC strings
//! - Verification compares digests in constant time

use std::fmt;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::{distributions::Alphanumeric, Rng};
use subtle::ConstantTimeEq;

use super::errors::{AuthError, AuthResult};

/// Argon2id hasher with an optional server-side pepper.
///
/// The pepper is mixed in as the Argon2 secret input, so a leaked data
/// directory alone is not enough to run an offline guessing attack.
#[derive(Clone)]
pub struct SecretHasher {
    pepper: Option<Vec<u8>>,
    params: Params,
}

impl SecretHasher {
    /// Hasher with default Argon2id cost parameters
    pub fn new(pepper: Option<String>) -> Self {
        Self {
            pepper: pepper.map(String::into_bytes),
            params: Params::default(),
        }
    }

    /// Hasher with explicit memory (KiB) and iteration cost.
    ///
    /// Low values are only appropriate for tests and local development.
    pub fn with_cost(pepper: Option<String>, memory_kib: u32, iterations: u32) -> AuthResult<Self> {
        let params =
            Params::new(memory_kib, iterations, 1, None).map_err(|_| AuthError::HashFailure)?;
        Ok(Self {
            pepper: pepper.map(String::into_bytes),
            params,
        })
    }

    fn argon2(&self, params: Params) -> AuthResult<Argon2<'_>> {
        match &self.pepper {
            Some(pepper) => {
                Argon2::new_with_secret(pepper.as_slice(), Algorithm::Argon2id, Version::V0x13, params)
                    .map_err(|_| AuthError::HashFailure)
            }
            None => Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)),
        }
    }

    /// Hash a secret with a fresh random salt
    pub fn hash(&self, secret: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2(self.params.clone())?
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::HashFailure)
    }

    /// Recompute the hash of `secret` with the stored salt and parameters
    /// and compare it against the stored digest.
    ///
    /// Fails with `HashFailure` if the stored string is not a usable PHC hash.
    pub fn verify(&self, secret: &str, stored: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(stored).map_err(|_| AuthError::HashFailure)?;
        let params = Params::try_from(&parsed).map_err(|_| AuthError::HashFailure)?;
        let salt = parsed.salt.ok_or(AuthError::HashFailure)?;
        let expected = parsed.hash.ok_or(AuthError::HashFailure)?;

        let recomputed = self
            .argon2(params)?
            .hash_password(secret.as_bytes(), salt)
            .map_err(|_| AuthError::HashFailure)?;
        let actual = recomputed.hash.ok_or(AuthError::HashFailure)?;

        Ok(constant_time_eq(actual.as_bytes(), expected.as_bytes()))
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for SecretHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretHasher")
            .field("peppered", &self.pepper.is_some())
            .field("params", &self.params)
            .finish()
    }
}

/// Generate a random alphanumeric identifier of exactly `len` characters
/// from the operating system RNG.
pub fn generate_id(len: usize) -> String {
    rand::rngs::OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Constant-time comparison of two byte slices
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> SecretHasher {
        SecretHasher::with_cost(None, 8, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("pw123").unwrap();

        assert_ne!(hash, "pw123");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("pw123", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn test_same_secret_produces_unique_hashes() {
        let hasher = hasher();
        let hash1 = hasher.hash("same").unwrap();
        let hash2 = hasher.hash("same").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("same", &hash1).unwrap());
        assert!(hasher.verify("same", &hash2).unwrap());
    }

    #[test]
    fn test_verify_uses_stored_parameters() {
        let cheap = hasher();
        let hash = cheap.hash("pw").unwrap();

        // A hasher configured with other costs still verifies old hashes
        let other = SecretHasher::with_cost(None, 16, 2).unwrap();
        assert!(other.verify("pw", &hash).unwrap());
    }

    #[test]
    fn test_pepper_is_required_to_verify() {
        let peppered = SecretHasher::with_cost(Some("pepper".into()), 8, 1).unwrap();
        let hash = peppered.hash("pw").unwrap();

        assert!(peppered.verify("pw", &hash).unwrap());
        assert!(!hasher().verify("pw", &hash).unwrap());
    }

    #[test]
    fn test_malformed_stored_hash() {
        let result = hasher().verify("pw", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::HashFailure)));
    }

    #[test]
    fn test_debug_hides_pepper() {
        let hasher = SecretHasher::with_cost(Some("s3cret".into()), 8, 1).unwrap();
        assert!(!format!("{:?}", hasher).contains("s3cret"));
    }

    #[test]
    fn test_generate_id() {
        let a = generate_id(20);
        let b = generate_id(20);

        assert_eq!(a.len(), 20);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_constant_time_comparison() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hello!"));
    }
}
