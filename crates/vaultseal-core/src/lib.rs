//! # vaultseal-core
//!
//! Core envelope functionality for VaultSeal including:
//! - AES-256-GCM envelopes in the `base64(nonce):base64(ciphertext||tag)` text form
//! - PBKDF2-HMAC-SHA256 password keys and hex-encoded raw keys
//! - Vault export/import as a single encrypted, portable file
//! - Vault store backends (in-memory and encrypted file) with zeroize-on-drop keys

pub mod crypto;
pub mod error;
pub mod settings;
pub mod storage;
pub mod sync;
pub mod vault;

pub use crypto::{
    decrypt, decrypt_string, derive_key, encrypt, encrypt_string, encrypt_with_rng,
    generate_raw_key_hex, import_raw_key, Envelope, KeyMode, KeySource, SecretString,
    SymmetricKey,
};
pub use error::{Result, SealError};
pub use settings::{default_config_dir, Settings, SettingsManager};
pub use storage::{EncryptedFileVaultStore, MemoryVaultStore, VaultStore};
pub use sync::{export_from_store, import_into_store, ImportReport};
pub use vault::{export_vault, import_vault, VaultMap};
