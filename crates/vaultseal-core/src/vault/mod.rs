//! Vault export and import
//!
//! A vault file is a single envelope whose plaintext is a JSON object
//! mapping secret names to secret contents.

mod codec;

pub use codec::{export_vault, import_vault, VaultMap};
