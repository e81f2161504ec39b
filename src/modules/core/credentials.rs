//! Password hashing
//!
//! Passwords are stored as the lowercase hex SHA-256 digest of their UTF-8
//! bytes. The digest is unsalted so that seeded rows and rows written by the
//! API stay comparable.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hash a plaintext password
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    format!("{:x}", digest)
}

/// Check a plaintext password against a stored hash in constant time
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let candidate = hash_password(password);
    candidate.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_hex() {
        let hash = hash_password("secret");
        assert_eq!(
            hash,
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
        assert_eq!(hash, hash_password("secret"));
        assert_ne!(hash, "secret");
    }

    #[test]
    fn test_verify_password() {
        let stored = hash_password("prueba123");
        assert!(verify_password("prueba123", &stored));
        assert!(!verify_password("prueba124", &stored));
        assert!(!verify_password("prueba123", "prueba123"));
        assert!(!verify_password("prueba123", ""));
    }
}
