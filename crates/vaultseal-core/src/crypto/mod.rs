//! Cryptographic primitives for message envelopes and vault files
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption in a portable text envelope
//! - PBKDF2-HMAC-SHA256 key derivation from passwords
//! - Raw 256-bit key import from hex and random key generation
//! - Secure memory handling with zeroize

mod envelope;
mod key_derivation;
mod key_source;
mod raw_key;
mod secure_memory;

pub use envelope::{
    decrypt, decrypt_string, encrypt, encrypt_string, encrypt_with_rng, Envelope, NONCE_SIZE,
    TAG_SIZE,
};
pub use key_derivation::{derive_key, PASSWORD_SALT, PBKDF2_ITERATIONS};
pub use key_source::{KeyMode, KeySource};
pub use raw_key::{generate_raw_key_hex, import_raw_key};
pub use secure_memory::{SecretString, SymmetricKey, KEY_SIZE};
