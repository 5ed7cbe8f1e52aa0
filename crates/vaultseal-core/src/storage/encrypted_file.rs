//! Encrypted file vault store
//!
//! Stores entries in a JSON file in the user's data directory.
//! Each entry's content is individually sealed in an envelope under the
//! store key; entry names stay readable so the store can be listed.

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use super::VaultStore;
use crate::crypto::{decrypt_string, encrypt_string, SymmetricKey};
use crate::error::{Result, SealError};

/// Known plaintext sealed into every store file to check the store key
const VERIFICATION_PLAINTEXT: &str = "vaultseal-verification";

const STORE_FILE_VERSION: u32 = 1;

/// File format for persistent storage
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    /// Envelope of `VERIFICATION_PLAINTEXT`
    verification: String,
    /// Map of name -> envelope text
    entries: BTreeMap<String, String>,
}

/// Encrypted file vault store
pub struct EncryptedFileVaultStore {
    /// Directory for the store file
    storage_dir: PathBuf,
    /// In-memory copy of the store file
    cache: RwLock<StoreFile>,
    /// Key every entry is sealed under
    store_key: SymmetricKey,
}

impl EncryptedFileVaultStore {
    /// Open the store in the default data directory
    pub async fn open(store_key: SymmetricKey) -> Result<Self> {
        Self::open_in(Self::default_dir()?, store_key).await
    }

    /// Open the store in `storage_dir`, creating it on first use
    ///
    /// Fails with `AuthenticationFailure` when an existing store was sealed
    /// under a different key.
    pub async fn open_in(storage_dir: PathBuf, store_key: SymmetricKey) -> Result<Self> {
        tokio::fs::create_dir_all(&storage_dir).await?;

        let store = Self {
            storage_dir,
            cache: RwLock::new(StoreFile::default()),
            store_key,
        };

        if store.load().await? {
            store.verify_key().await?;
        } else {
            store.initialize().await?;
        }

        debug!("Encrypted vault store opened at: {:?}", store.storage_dir);
        Ok(store)
    }

    /// Get the default storage directory
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("dev", "vaultseal", "vaultseal")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| SealError::Storage("Could not determine data directory".to_string()))
    }

    /// Get the storage directory path
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Get the path to the store file
    pub fn store_file_path(&self) -> PathBuf {
        self.storage_dir.join("vault.json")
    }

    /// Load the store file into the cache, returns false if there is none
    async fn load(&self) -> Result<bool> {
        let path = self.store_file_path();

        if !tokio::fs::try_exists(&path).await? {
            debug!("No existing store file found");
            return Ok(false);
        }

        let contents = tokio::fs::read_to_string(&path).await?;
        let file: StoreFile = serde_json::from_str(&contents)?;
        if file.version != STORE_FILE_VERSION {
            return Err(SealError::Storage(format!(
                "Unsupported store file version: {}",
                file.version
            )));
        }

        let mut cache = self.cache.write().await;
        *cache = file;

        debug!("Loaded {} entries from store", cache.entries.len());
        Ok(true)
    }

    /// Seal the verification plaintext and write an empty store
    async fn initialize(&self) -> Result<()> {
        let mut cache = self.cache.write().await;
        cache.version = STORE_FILE_VERSION;
        cache.verification = encrypt_string(VERIFICATION_PLAINTEXT, &self.store_key)?;
        self.save(&cache).await?;

        debug!("Initialized new store file");
        Ok(())
    }

    /// Check the store key against the verification envelope
    async fn verify_key(&self) -> Result<()> {
        let cache = self.cache.read().await;

        if decrypt_string(&cache.verification, &self.store_key)? != VERIFICATION_PLAINTEXT {
            return Err(SealError::AuthenticationFailure);
        }

        debug!("Store key verified successfully");
        Ok(())
    }

    /// Save the store file to disk
    async fn save(&self, file: &StoreFile) -> Result<()> {
        let contents = serde_json::to_string_pretty(file)?;
        let path = self.store_file_path();

        // Write atomically using a temp file
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        debug!("Saved {} entries to store", file.entries.len());
        Ok(())
    }
}

#[async_trait]
impl VaultStore for EncryptedFileVaultStore {
    async fn list(&self) -> Result<Vec<String>> {
        let cache = self.cache.read().await;
        Ok(cache.entries.keys().cloned().collect())
    }

    async fn get(&self, name: &str) -> Result<String> {
        let cache = self.cache.read().await;

        let sealed = cache
            .entries
            .get(name)
            .ok_or_else(|| SealError::EntryNotFound(name.to_string()))?;
        let content = decrypt_string(sealed, &self.store_key)?;

        debug!("Retrieved entry: {}", name);
        Ok(content)
    }

    async fn put(&self, name: &str, content: &str) -> Result<()> {
        let sealed = encrypt_string(content, &self.store_key)?;

        let mut cache = self.cache.write().await;
        let mut updated = cache.clone();
        updated.entries.insert(name.to_string(), sealed);

        // The cache only changes once the file on disk does
        self.save(&updated).await?;
        *cache = updated;

        debug!("Stored entry: {}", name);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let mut cache = self.cache.write().await;

        if cache.entries.contains_key(name) {
            let mut updated = cache.clone();
            updated.entries.remove(name);

            self.save(&updated).await?;
            *cache = updated;
            debug!("Deleted entry: {}", name);
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Encrypted File Store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::import_raw_key;
    use tempfile::TempDir;

    fn store_key() -> SymmetricKey {
        import_raw_key(&"5a".repeat(32)).unwrap()
    }

    async fn test_store() -> (EncryptedFileVaultStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = EncryptedFileVaultStore::open_in(temp_dir.path().to_path_buf(), store_key())
            .await
            .unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (store, _dir) = test_store().await;

        store.put("test-key", "test-value").await.unwrap();

        assert_eq!(store.get("test-key").await.unwrap(), "test-value");
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (store, _dir) = test_store().await;

        assert!(matches!(
            store.get("nonexistent").await,
            Err(SealError::EntryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let (store, _dir) = test_store().await;

        store.put("b", "2").await.unwrap();
        store.put("a", "1").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["a", "b"]);

        store.delete("a").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_file_does_not_contain_plaintext() {
        let (store, _dir) = test_store().await;

        store.put("bank", "pin-8842").await.unwrap();

        let contents = std::fs::read_to_string(store.store_file_path()).unwrap();
        assert!(contents.contains("bank"));
        assert!(!contents.contains("pin-8842"));
        assert!(!contents.contains(VERIFICATION_PLAINTEXT));
    }

    #[tokio::test]
    async fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store =
                EncryptedFileVaultStore::open_in(temp_dir.path().to_path_buf(), store_key())
                    .await
                    .unwrap();
            store.put("persistent-key", "persistent-value").await.unwrap();
        }

        {
            let store =
                EncryptedFileVaultStore::open_in(temp_dir.path().to_path_buf(), store_key())
                    .await
                    .unwrap();
            assert_eq!(
                store.get("persistent-key").await.unwrap(),
                "persistent-value"
            );
        }
    }

    #[tokio::test]
    async fn test_failed_save_leaves_store_unchanged() {
        let (store, _dir) = test_store().await;
        store.put("kept", "1").await.unwrap();

        // A directory in the way of the temp file makes every save fail
        let blocker = store.store_file_path().with_extension("tmp");
        std::fs::create_dir(&blocker).unwrap();

        assert!(store.put("a-failed", "x").await.is_err());
        assert!(store.delete("kept").await.is_err());
        assert!(matches!(
            store.get("a-failed").await,
            Err(SealError::EntryNotFound(_))
        ));
        assert_eq!(store.get("kept").await.unwrap(), "1");

        std::fs::remove_dir(&blocker).unwrap();
        store.put("b-ok", "y").await.unwrap();

        let reopened =
            EncryptedFileVaultStore::open_in(store.storage_dir().to_path_buf(), store_key())
                .await
                .unwrap();
        assert_eq!(reopened.list().await.unwrap(), vec!["b-ok", "kept"]);
    }

    #[tokio::test]
    async fn test_wrong_key_rejected_on_open() {
        let (store, temp_dir) = test_store().await;
        store.put("k", "v").await.unwrap();
        drop(store);

        let wrong_key = import_raw_key(&"a5".repeat(32)).unwrap();
        let result = EncryptedFileVaultStore::open_in(temp_dir.path().to_path_buf(), wrong_key).await;

        assert!(matches!(result, Err(SealError::AuthenticationFailure)));
    }
}
