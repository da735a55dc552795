use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use rand_core::OsRng;

/// Hash a secret (password or raw refresh token) with Argon2id and a fresh
/// random salt. The PHC string embeds the salt and parameters.
pub fn hash_secret(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow!("Hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Compare a secret against a stored PHC hash. A mismatch is `Ok(false)`;
/// only a malformed stored hash is an error.
pub fn verify_secret(plain: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("Stored hash is malformed: {}", e))?;

    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("Verification failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verify_roundtrip() {
        let hash = hash_secret("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_secret("correct horse", &hash).unwrap());
        assert!(!verify_secret("wrong horse", &hash).unwrap());
    }

    #[test]
    fn salts_differ_per_hash() {
        let a = hash_secret("same").unwrap();
        let b = hash_secret("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_secret("x", "not-a-phc-string").is_err());
    }
}
