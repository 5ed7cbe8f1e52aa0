//! Secure memory handling with automatic zeroization

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Opaque 256-bit AES-GCM key - automatically zeroed when dropped
///
/// Only [`derive_key`](super::derive_key) and [`import_raw_key`](super::import_raw_key)
/// construct one. The raw bytes never leave the crate, and the type is
/// deliberately neither `Clone` nor serializable.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    key: [u8; KEY_SIZE],
}

impl SymmetricKey {
    pub(crate) fn new(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Password or hex key input - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    /// Create a new secret string
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Get the secret value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_key_holds_bytes() {
        let key = SymmetricKey::new([42u8; KEY_SIZE]);
        assert_eq!(key.as_bytes(), &[42u8; KEY_SIZE]);
    }

    #[test]
    fn test_secret_string_expose() {
        let secret = SecretString::from("my-secret");
        assert_eq!(secret.expose(), "my-secret");
    }

    #[test]
    fn test_debug_redacted() {
        let key = SymmetricKey::new([7u8; KEY_SIZE]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains('7'));

        let secret = SecretString::from("hunter2");
        let debug = format!("{:?}", secret);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_zeroize_clears_key() {
        let mut key = SymmetricKey::new([0xAB; KEY_SIZE]);
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; KEY_SIZE]);
    }
}
