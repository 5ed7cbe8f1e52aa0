//! Selection between password-derived and raw keys

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::key_derivation::derive_key;
use super::raw_key::import_raw_key;
use super::secure_memory::{SecretString, SymmetricKey};
use crate::error::{Result, SealError};

/// How the key for an operation is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyMode {
    /// PBKDF2 over a shared password
    #[default]
    Password,
    /// A 64-digit hex string used directly as the key
    RawHex,
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMode::Password => f.write_str("password"),
            KeyMode::RawHex => f.write_str("raw-hex"),
        }
    }
}

impl FromStr for KeyMode {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "password" | "pw" => Ok(KeyMode::Password),
            "raw-hex" | "raw" | "hex" | "random" => Ok(KeyMode::RawHex),
            other => Err(SealError::UnknownKeyMode(other.to_string())),
        }
    }
}

/// Mode-specific key input
///
/// This is the single place where the key for an operation is decided;
/// envelope and vault code only ever receive the resolved [`SymmetricKey`].
#[derive(Debug)]
pub enum KeySource {
    Password(SecretString),
    RawHex(SecretString),
}

impl KeySource {
    /// Pair a mode with its input
    pub fn new(mode: KeyMode, input: impl Into<SecretString>) -> Self {
        match mode {
            KeyMode::Password => KeySource::Password(input.into()),
            KeyMode::RawHex => KeySource::RawHex(input.into()),
        }
    }

    pub fn password(password: impl Into<SecretString>) -> Self {
        Self::new(KeyMode::Password, password)
    }

    pub fn raw_hex(hex_key: impl Into<SecretString>) -> Self {
        Self::new(KeyMode::RawHex, hex_key)
    }

    pub fn mode(&self) -> KeyMode {
        match self {
            KeySource::Password(_) => KeyMode::Password,
            KeySource::RawHex(_) => KeyMode::RawHex,
        }
    }

    /// Produce the key for this source
    ///
    /// Password derivation cannot fail; raw keys fail with
    /// [`SealError::MalformedKey`].
    pub fn resolve(&self) -> Result<SymmetricKey> {
        match self {
            KeySource::Password(password) => Ok(derive_key(password.expose())),
            KeySource::RawHex(hex_key) => import_raw_key(hex_key.expose()),
        }
    }
}
