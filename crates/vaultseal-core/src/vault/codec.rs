//! Vault serialization through the envelope

use std::collections::BTreeMap;
use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::{decrypt, encrypt, Envelope, SymmetricKey};
use crate::error::{Result, SealError};

/// Secret name -> secret content
///
/// Ordered so that the serialized form is canonical.
pub type VaultMap = BTreeMap<String, String>;

/// Serialize entries to a JSON object and seal them into envelope text
///
/// The returned text is the complete content of a vault file.
pub fn export_vault(entries: &VaultMap, key: &SymmetricKey) -> Result<String> {
    let payload = Zeroizing::new(serde_json::to_vec(entries)?);
    let envelope = encrypt(&payload, key)?;

    debug!(entries = entries.len(), "Exported vault");
    Ok(envelope.to_string())
}

/// Open vault text and parse the entries it contains
///
/// Either the whole map is returned or an error; entries are never
/// partially recovered.
pub fn import_vault(text: &str, key: &SymmetricKey) -> Result<VaultMap> {
    let envelope: Envelope = text.parse()?;
    let payload = Zeroizing::new(decrypt(&envelope, key)?);

    // serde_json messages can quote the offending value, keep only the position
    let entries: VaultMap = serde_json::from_slice(&payload).map_err(|e| {
        SealError::MalformedVault(format!(
            "expected a JSON object of string values ({:?} error at line {} column {})",
            e.classify(),
            e.line(),
            e.column()
        ))
    })?;

    debug!(entries = entries.len(), "Imported vault");
    Ok(entries)
}
