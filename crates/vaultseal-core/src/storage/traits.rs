//! Vault store trait definition

use crate::error::Result;
use async_trait::async_trait;

/// Named secret storage used by vault export and import
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// List the names of all stored secrets
    async fn list(&self) -> Result<Vec<String>>;

    /// Get the content of a secret, `EntryNotFound` if absent
    async fn get(&self, name: &str) -> Result<String>;

    /// Store a secret, replacing any existing content
    async fn put(&self, name: &str, content: &str) -> Result<()>;

    /// Delete a secret; deleting an absent name is not an error
    async fn delete(&self, name: &str) -> Result<()>;

    /// Get a human-readable name for this backend
    fn backend_name(&self) -> &'static str;
}
