//! Raw 256-bit keys exchanged as hex strings

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use super::secure_memory::{SymmetricKey, KEY_SIZE};
use crate::error::{Result, SealError};

/// Import a hex-encoded 256-bit key
///
/// No stretching is applied; the key material must already be uniformly
/// random (see [`generate_raw_key_hex`]). Surrounding whitespace is ignored
/// and hex digits may be upper or lower case.
pub fn import_raw_key(hex_key: &str) -> Result<SymmetricKey> {
    let hex_key = hex_key.trim();

    let mut key_bytes = Zeroizing::new([0u8; KEY_SIZE]);
    hex::decode_to_slice(hex_key, key_bytes.as_mut_slice()).map_err(|e| match e {
        // Never echo the offending character, it is key material
        hex::FromHexError::InvalidHexCharacter { index, .. } => {
            SealError::MalformedKey(format!("invalid hex digit at position {}", index))
        }
        _ => SealError::MalformedKey(format!(
            "expected {} hex digits, got {}",
            KEY_SIZE * 2,
            hex_key.len()
        )),
    })?;

    Ok(SymmetricKey::new(*key_bytes))
}

/// Generate 32 random bytes from the OS CSPRNG, hex encoded
pub fn generate_raw_key_hex() -> String {
    let mut key_bytes = Zeroizing::new([0u8; KEY_SIZE]);
    OsRng.fill_bytes(key_bytes.as_mut_slice());
    hex::encode(key_bytes.as_slice())
}
