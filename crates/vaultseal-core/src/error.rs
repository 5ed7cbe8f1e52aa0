//! Error types for vaultseal-core

use thiserror::Error;

/// Result type alias for envelope and vault operations
pub type Result<T> = std::result::Result<T, SealError>;

/// Envelope and vault error types
///
/// None of the messages carry key bytes, plaintext or secret contents.
#[derive(Error, Debug)]
pub enum SealError {
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    #[error("Unknown key mode '{0}', expected 'password' or 'raw-hex'")]
    UnknownKeyMode(String),

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Wrong key and tampered ciphertext are deliberately indistinguishable.
    #[error("Authentication failed - wrong key or corrupted data")]
    AuthenticationFailure,

    #[error("Malformed vault: {0}")]
    MalformedVault(String),

    #[error("Decrypted data is not valid UTF-8 text")]
    InvalidText,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Vault entry not found: {0}")]
    EntryNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
