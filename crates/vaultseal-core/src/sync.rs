//! Moving whole vaults between a store and a vault file
//!
//! Export reads every entry and fails if any entry cannot be read;
//! unreadable entries are never skipped. Import
//! is all-or-nothing up to the point where the file is decrypted and
//! parsed; writing the recovered entries back is best-effort, and failed
//! entries are reported rather than rolled back.

use tracing::{info, warn};

use crate::crypto::SymmetricKey;
use crate::error::Result;
use crate::storage::VaultStore;
use crate::vault::{export_vault, import_vault, VaultMap};

/// Outcome of writing imported entries into a store
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Names written successfully
    pub imported: Vec<String>,
    /// Names that failed, with the store's error message
    pub failed: Vec<(String, String)>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.imported.len() + self.failed.len()
    }
}

/// Read every entry from `store` and seal them into vault text
pub async fn export_from_store(store: &dyn VaultStore, key: &SymmetricKey) -> Result<String> {
    let mut entries = VaultMap::new();

    for name in store.list().await? {
        let content = store.get(&name).await?;
        entries.insert(name, content);
    }

    let text = export_vault(&entries, key)?;

    info!(
        "Exported {} entries from {}",
        entries.len(),
        store.backend_name()
    );
    Ok(text)
}

/// Decrypt vault text and write each entry into `store`
pub async fn import_into_store(
    store: &dyn VaultStore,
    text: &str,
    key: &SymmetricKey,
) -> Result<ImportReport> {
    let entries = import_vault(text, key)?;
    let mut report = ImportReport::default();

    for (name, content) in &entries {
        match store.put(name, content).await {
            Ok(()) => report.imported.push(name.clone()),
            Err(e) => {
                warn!("Failed to import entry {}: {}", name, e);
                report.failed.push((name.clone(), e.to_string()));
            }
        }
    }

    info!(
        "Imported {} of {} entries into {}",
        report.imported.len(),
        report.total(),
        store.backend_name()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::import_raw_key;
    use crate::error::SealError;
    use crate::storage::MemoryVaultStore;
    use async_trait::async_trait;

    fn test_key() -> SymmetricKey {
        import_raw_key(&"3c".repeat(32)).unwrap()
    }

    /// Store that refuses to read or write names starting with "bad"
    struct PickyStore {
        inner: MemoryVaultStore,
    }

    #[async_trait]
    impl VaultStore for PickyStore {
        async fn list(&self) -> Result<Vec<String>> {
            self.inner.list().await
        }

        async fn get(&self, name: &str) -> Result<String> {
            if name.starts_with("bad") {
                return Err(SealError::Storage("backend unavailable".to_string()));
            }
            self.inner.get(name).await
        }

        async fn put(&self, name: &str, content: &str) -> Result<()> {
            if name.starts_with("bad") {
                return Err(SealError::Storage("quota exceeded".to_string()));
            }
            self.inner.put(name, content).await
        }

        async fn delete(&self, name: &str) -> Result<()> {
            self.inner.delete(name).await
        }

        fn backend_name(&self) -> &'static str {
            "Picky Store"
        }
    }

    #[tokio::test]
    async fn test_export_then_import_into_empty_store() {
        let key = test_key();
        let source = MemoryVaultStore::new();
        source.put("email", "hunter2").await.unwrap();
        source.put("ssh", "-----BEGIN KEY-----").await.unwrap();

        let text = export_from_store(&source, &key).await.unwrap();

        let target = MemoryVaultStore::new();
        let report = import_into_store(&target, &text, &key).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.imported, vec!["email", "ssh"]);
        assert_eq!(target.get("email").await.unwrap(), "hunter2");
        assert_eq!(target.get("ssh").await.unwrap(), "-----BEGIN KEY-----");
    }

    #[tokio::test]
    async fn test_import_is_best_effort() {
        let key = test_key();
        let mut entries = VaultMap::new();
        entries.insert("bad-entry".to_string(), "x".to_string());
        entries.insert("good-entry".to_string(), "y".to_string());
        let text = export_vault(&entries, &key).unwrap();

        let store = PickyStore {
            inner: MemoryVaultStore::new(),
        };
        let report = import_into_store(&store, &text, &key).await.unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.total(), 2);
        assert_eq!(report.imported, vec!["good-entry"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "bad-entry");
        assert!(report.failed[0].1.contains("quota exceeded"));
        assert_eq!(store.get("good-entry").await.unwrap(), "y");
    }

    #[tokio::test]
    async fn test_import_with_wrong_key_writes_nothing() {
        let source = MemoryVaultStore::new();
        source.put("a", "1").await.unwrap();
        let text = export_from_store(&source, &test_key()).await.unwrap();

        let target = MemoryVaultStore::new();
        let wrong = import_raw_key(&"c3".repeat(32)).unwrap();
        let result = import_into_store(&target, &text, &wrong).await;

        assert!(matches!(result, Err(SealError::AuthenticationFailure)));
        assert!(target.is_empty().await);
    }

    #[tokio::test]
    async fn test_export_fails_on_unreadable_entry() {
        let store = PickyStore {
            inner: MemoryVaultStore::new(),
        };
        store.inner.put("bad-entry", "x").await.unwrap();
        store.inner.put("good-entry", "y").await.unwrap();

        let result = export_from_store(&store, &test_key()).await;
        assert!(matches!(result, Err(SealError::Storage(msg)) if msg == "backend unavailable"));
    }

    #[tokio::test]
    async fn test_export_empty_store() {
        let key = test_key();
        let text = export_from_store(&MemoryVaultStore::new(), &key).await.unwrap();

        assert!(import_vault(&text, &key).unwrap().is_empty());
    }
}
