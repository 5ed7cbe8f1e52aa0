//! Vault store backends
//!
//! The envelope and vault codec never persist anything themselves; the
//! stores here are the collaborators that export reads from and import
//! writes into:
//! 1. In-memory (tests and short-lived sessions)
//! 2. Encrypted file (each entry sealed under a store key)

mod encrypted_file;
mod memory;
mod traits;

pub use encrypted_file::EncryptedFileVaultStore;
pub use memory::MemoryVaultStore;
pub use traits::VaultStore;
