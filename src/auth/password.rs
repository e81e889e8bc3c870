use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::PasswordConfig;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Encoding(String),
    #[error("malformed password hash: {0}")]
    MalformedHash(String),
}

/// Salted Argon2id hashing with the cost factors taken from configuration.
#[derive(Clone)]
pub struct PasswordCodec {
    argon2: Argon2<'static>,
}

impl PasswordCodec {
    pub fn new(cfg: &PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| PasswordError::Encoding(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                PasswordError::Encoding(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` on mismatch. Verification uses the parameters encoded in
    /// `hash`, so hashes made under older cost settings keep working.
    pub fn verify(&self, plain: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            PasswordError::MalformedHash(e.to_string())
        })?;
        match self.argon2.verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
        }
    }
}

impl Default for PasswordCodec {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordCodec {
        PasswordCodec::new(&PasswordConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .expect("valid params")
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let codec = cheap();
        let password = "Secur3P@ssw0rd!";
        let hash = codec.hash(password).expect("hashing should succeed");
        assert!(codec.verify(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let codec = cheap();
        let hash = codec.hash("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!codec.verify("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let codec = cheap();
        let a = codec.hash("secret1").unwrap();
        let b = codec.hash("secret1").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("secret1"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = cheap().verify("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }

    #[test]
    fn verify_accepts_hash_from_other_cost_settings() {
        let hash = PasswordCodec::default().hash("secret1").unwrap();
        assert!(cheap().verify("secret1", &hash).unwrap());
    }

    #[test]
    fn rejects_invalid_cost_factors() {
        let err = PasswordCodec::new(&PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .err()
        .expect("params must be rejected");
        assert!(matches!(err, PasswordError::Encoding(_)));
    }
}
