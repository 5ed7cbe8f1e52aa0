//! Password-based key derivation using PBKDF2-HMAC-SHA256
//!
//! Derivation is deterministic so that two parties who share a password
//! arrive at the same key without exchanging anything else. The salt is a
//! fixed constant shared by every installation; this keeps envelopes
//! interoperable but gives no protection against precomputed dictionaries.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use super::secure_memory::{SymmetricKey, KEY_SIZE};

/// Fixed salt shared by every installation (known weakness, kept for interop)
pub const PASSWORD_SALT: &[u8] = b"hashfi-salt";

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derive a 256-bit AES-GCM key from a password
///
/// Any string is accepted, including the empty one.
pub fn derive_key(password: &str) -> SymmetricKey {
    let mut key_bytes = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        PASSWORD_SALT,
        PBKDF2_ITERATIONS,
        key_bytes.as_mut_slice(),
    );

    debug!(iterations = PBKDF2_ITERATIONS, "Derived key from password");
    SymmetricKey::new(*key_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_matches_reference_vector() {
        let key = derive_key("correct horse");
        assert_eq!(
            hex::encode(key.as_bytes()),
            "dbe425e158940a1b561bd26cdb66e71b86b50528d9f6f0571ef3e30150b9b86b"
        );
    }

    #[test]
    fn test_derive_key_deterministic() {
        let key1 = derive_key("test-password-123");
        let key2 = derive_key("test-password-123");

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_passwords() {
        let key1 = derive_key("password1");
        let key2 = derive_key("password2");

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_empty_password_accepted() {
        let key = derive_key("");
        assert_eq!(
            hex::encode(key.as_bytes()),
            "8ad54df1b28382fcd820e798e4080b601c90840a94218219e99a5f4253437a07"
        );
    }
}
