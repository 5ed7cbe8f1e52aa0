//! In-memory vault store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use zeroize::Zeroize;

use super::VaultStore;
use crate::error::{Result, SealError};

/// Vault store backed by a `HashMap`; contents are zeroed on drop
#[derive(Default)]
pub struct MemoryVaultStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryVaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl VaultStore for MemoryVaultStore {
    async fn list(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn get(&self, name: &str) -> Result<String> {
        self.entries
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| SealError::EntryNotFound(name.to_string()))
    }

    async fn put(&self, name: &str, content: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        if let Some(mut previous) = entries.insert(name.to_string(), content.to_string()) {
            previous.zeroize();
        }

        debug!("Stored entry: {}", name);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        if let Some(mut removed) = self.entries.write().await.remove(name) {
            removed.zeroize();
            debug!("Deleted entry: {}", name);
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "In-Memory Store"
    }
}

impl Drop for MemoryVaultStore {
    fn drop(&mut self) {
        for content in self.entries.get_mut().values_mut() {
            content.zeroize();
        }
    }
}
