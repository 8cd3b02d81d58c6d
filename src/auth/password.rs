//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`)
//! that carry the algorithm, version, cost parameters and salt, so stored
//! hashes keep verifying after the default parameters change.

use crate::types::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes a password using Argon2id with a fresh random salt.
///
/// Two calls with the same password return different strings.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verifies a password against a stored PHC hash.
///
/// A malformed hash and a wrong password both return `false`; the former is
/// logged so it can be told apart during diagnostics.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
            return false;
        }
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => true,
        Err(argon2::password_hash::Error::Password) => false,
        Err(e) => {
            tracing::warn!(error = %e, "password hash could not be checked");
            false
        }
    }
}

/// [`hash_password`] on the blocking pool, for use from async handlers.
pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

/// [`verify_password`] on the blocking pool, for use from async handlers.
pub async fn verify_password_blocking(password: String, hash: String) -> bool {
    match tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await {
        Ok(verified) => verified,
        Err(e) => {
            tracing::error!(error = %e, "password verification task failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "test_password_123";

        let hash = hash_password(password).expect("should hash password");

        // Hash should not equal the original password
        assert_ne!(hash, password);

        assert!(
            hash.starts_with("$argon2id$"),
            "hash should be an Argon2id PHC string"
        );
    }

    #[test]
    fn test_hash_embeds_parameters() {
        let hash = hash_password("whatever").expect("should hash password");
        let parsed = PasswordHash::new(&hash).expect("hash should parse");

        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert!(parsed.salt.is_some(), "salt should be embedded");
        assert!(parsed.params.get("m").is_some());
        assert!(parsed.params.get("t").is_some());
        assert!(parsed.params.get("p").is_some());
    }

    #[test]
    fn test_password_verification_success() {
        let password = "secure_password_456";

        let hash = hash_password(password).expect("should hash password");

        assert!(
            verify_password(password, &hash),
            "correct password should verify successfully"
        );
    }

    #[test]
    fn test_password_verification_failure() {
        let hash = hash_password("correct_password").expect("should hash password");

        assert!(
            !verify_password("wrong_password", &hash),
            "wrong password should fail verification"
        );
    }

    #[test]
    fn test_hashing_is_salted() {
        let password = "same-password";

        let first = hash_password(password).expect("should hash password");
        let second = hash_password(password).expect("should hash password");

        assert_ne!(first, second, "each hash should use a fresh salt");
        assert!(verify_password(password, &first));
        assert!(verify_password(password, &second));
    }

    #[test]
    fn test_correct_and_wrong_password_scenario() {
        let hash = hash_password("correct-password").expect("should hash password");

        assert!(verify_password("correct-password", &hash));
        assert!(!verify_password("wrong-password", &hash));
        assert!(!verify_password("correct-password", "not-a-real-hash"));
    }

    #[test]
    fn test_malformed_hashes_do_not_verify() {
        let hash = hash_password("pw").expect("should hash password");
        let truncated = &hash[..hash.len() / 2];
        let unknown_algorithm = hash.replacen("argon2id", "scrypt", 1);

        for candidate in ["", "$", "$argon2id$", truncated, unknown_algorithm.as_str()] {
            assert!(
                !verify_password("pw", candidate),
                "malformed hash {:?} should not verify",
                candidate
            );
        }
    }

    #[test]
    fn test_hashes_with_other_parameters_still_verify() {
        use argon2::{Algorithm, Params, Version};

        let params = Params::new(8 * 1024, 3, 1, None).expect("valid params");
        let salt = SaltString::generate(&mut OsRng);
        let legacy = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(b"old-account", &salt)
            .expect("should hash")
            .to_string();

        assert!(verify_password("old-account", &legacy));
        assert!(!verify_password("old-account!", &legacy));
    }

    #[test]
    fn test_empty_password_is_accepted_by_hasher() {
        let hash = hash_password("").expect("hasher imposes no length policy");
        assert!(verify_password("", &hash));
        assert!(!verify_password(" ", &hash));
    }
}
