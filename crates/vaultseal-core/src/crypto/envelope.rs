//! AES-256-GCM authenticated encryption
//!
//! Envelope format: `{nonce_b64}:{ciphertext_and_tag_b64}`
//! - Nonce: 12 bytes (96 bits), fresh from a CSPRNG for every encryption
//! - Ciphertext: same length as the plaintext, followed by the 16-byte tag
//! - Base64: standard alphabet with padding
//!
//! The format carries no version or header, so envelopes are bit-compatible
//! with any other AES-GCM implementation that uses the same layout.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use zeroize::Zeroize;

use super::SymmetricKey;
use crate::error::{Result, SealError};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

const SEPARATOR: char = ':';

/// A nonce and the ciphertext sealed under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Nonce used for this encryption
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with the authentication tag appended
    pub ciphertext: Vec<u8>,
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            STANDARD.encode(self.nonce),
            SEPARATOR,
            STANDARD.encode(&self.ciphertext)
        )
    }
}

impl FromStr for Envelope {
    type Err = SealError;

    /// Parse from the format: `{nonce_b64}:{ciphertext_and_tag_b64}`
    ///
    /// Leading and trailing whitespace is ignored so that envelopes read
    /// back from files or terminals parse unchanged.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        let (nonce_b64, ciphertext_b64) = s.split_once(SEPARATOR).ok_or_else(|| {
            SealError::MalformedEnvelope("expected nonce:ciphertext".to_string())
        })?;
        if ciphertext_b64.contains(SEPARATOR) {
            return Err(SealError::MalformedEnvelope(
                "unexpected extra ':' separator".to_string(),
            ));
        }

        let nonce_bytes = STANDARD
            .decode(nonce_b64)
            .map_err(|e| SealError::MalformedEnvelope(format!("invalid nonce base64: {}", e)))?;
        let ciphertext = STANDARD.decode(ciphertext_b64).map_err(|e| {
            SealError::MalformedEnvelope(format!("invalid ciphertext base64: {}", e))
        })?;

        let nonce: [u8; NONCE_SIZE] = nonce_bytes.as_slice().try_into().map_err(|_| {
            SealError::MalformedEnvelope(format!(
                "invalid nonce length: expected {}, got {}",
                NONCE_SIZE,
                nonce_bytes.len()
            ))
        })?;
        if ciphertext.len() < TAG_SIZE {
            return Err(SealError::MalformedEnvelope(format!(
                "ciphertext too short: expected at least {} bytes, got {}",
                TAG_SIZE,
                ciphertext.len()
            )));
        }

        Ok(Self { nonce, ciphertext })
    }
}

/// Encrypt plaintext using AES-256-GCM with a nonce from the OS CSPRNG
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey) -> Result<Envelope> {
    encrypt_with_rng(plaintext, key, &mut OsRng)
}

/// Encrypt plaintext using AES-256-GCM, drawing the nonce from `rng`
///
/// The caller must supply a cryptographically secure source; a nonce that
/// repeats under the same key breaks both confidentiality and integrity.
pub fn encrypt_with_rng<R>(plaintext: &[u8], key: &SymmetricKey, rng: &mut R) -> Result<Envelope>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| SealError::Encryption(e.to_string()))?;

    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce);

    // aes-gcm appends the auth tag to the ciphertext
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| SealError::Encryption(e.to_string()))?;

    debug!(plaintext_len = plaintext.len(), "Sealed envelope");
    Ok(Envelope { nonce, ciphertext })
}

/// Decrypt and authenticate an envelope
///
/// Fails with [`SealError::AuthenticationFailure`] for both a wrong key and
/// a modified envelope; no plaintext is returned unless the tag verifies.
pub fn decrypt(envelope: &Envelope, key: &SymmetricKey) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| SealError::Encryption(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(&envelope.nonce), envelope.ciphertext.as_slice())
        .map_err(|_| SealError::AuthenticationFailure)
}

/// Encrypt a string and return the envelope text
pub fn encrypt_string(plaintext: &str, key: &SymmetricKey) -> Result<String> {
    let envelope = encrypt(plaintext.as_bytes(), key)?;
    Ok(envelope.to_string())
}

/// Decrypt envelope text and return the plaintext as a string
pub fn decrypt_string(envelope_text: &str, key: &SymmetricKey) -> Result<String> {
    let envelope: Envelope = envelope_text.parse()?;
    let plaintext = decrypt(&envelope, key)?;
    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        SealError::InvalidText
    })
}
