//! Storage context: resolves logical storage ids to live backend managers.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::config::{Storage, StorageConfigError, StorageProvider, StoragesConfig};
use crate::s3::S3StorageManager;
use crate::traits::{StorageError, StorageManager, StorageResult};

/// Immutable view over the storage configuration plus a per-id manager cache.
///
/// Managers are created on first use and cached for the context's lifetime,
/// so there is at most one live backend client per configured storage. The
/// cache is unbounded but its size is bounded by the number of configured
/// storages.
pub struct StorageContext {
    storages: HashMap<Uuid, Storage>,
    default_storage: Option<Uuid>,
    managers: RwLock<HashMap<Uuid, Arc<dyn StorageManager>>>,
}

impl StorageContext {
    /// Build the context from an already validated configuration.
    pub fn new(config: StoragesConfig) -> Self {
        let storages = config
            .storages
            .into_iter()
            .map(|storage| (storage.id, storage))
            .collect();
        Self {
            storages,
            default_storage: config.default_storage,
            managers: RwLock::new(HashMap::new()),
        }
    }

    /// Load the configuration from YAML and build the context.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, StorageConfigError> {
        Ok(Self::new(StoragesConfig::from_yaml_file(path)?))
    }

    /// Look up the storage record by id.
    pub fn storage(&self, storage_id: Uuid) -> StorageResult<&Storage> {
        self.storages
            .get(&storage_id)
            .ok_or(StorageError::StorageNotFound(storage_id))
    }

    /// Resolve a storage id to its manager, creating and caching it on first
    /// use (double-checked under the write lock).
    pub fn manager(&self, storage_id: Uuid) -> StorageResult<Arc<dyn StorageManager>> {
        if let Some(manager) = self
            .managers
            .read()
            .expect("manager cache lock poisoned")
            .get(&storage_id)
        {
            return Ok(Arc::clone(manager));
        }

        let storage = self.storage(storage_id)?;

        let mut cache = self.managers.write().expect("manager cache lock poisoned");
        if let Some(manager) = cache.get(&storage_id) {
            return Ok(Arc::clone(manager));
        }

        let manager: Arc<dyn StorageManager> = match storage.provider {
            StorageProvider::S3 => Arc::new(S3StorageManager::new(storage.clone())),
        };
        cache.insert(storage_id, Arc::clone(&manager));
        Ok(manager)
    }

    /// Manager for the configured default storage.
    pub fn default_manager(&self) -> StorageResult<Arc<dyn StorageManager>> {
        let id = self.default_storage.ok_or(StorageError::NoDefaultStorage)?;
        self.manager(id)
    }

    /// The configured default storage id, if any.
    pub fn default_storage_id(&self) -> Option<Uuid> {
        self.default_storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::S3Config;

    fn storage(id: Uuid) -> Storage {
        Storage {
            id,
            provider: StorageProvider::S3,
            random_filenames: true,
            s3: S3Config {
                endpoint_url: Some("http://localhost:9000".to_string()),
                region: None,
                access_key_id: "minio".to_string(),
                secret_access_key: "minio123".to_string(),
                bucket_name: "media".to_string(),
            },
        }
    }

    fn context(ids: &[Uuid], default_storage: Option<Uuid>) -> StorageContext {
        StorageContext::new(StoragesConfig {
            default_storage: default_storage.or_else(|| ids.first().copied()),
            storages: ids.iter().copied().map(storage).collect(),
        })
    }

    #[test]
    fn test_unknown_storage_id() {
        let ctx = context(&[Uuid::new_v4()], None);
        let missing = Uuid::new_v4();
        assert!(matches!(
            ctx.manager(missing),
            Err(StorageError::StorageNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_manager_is_cached_per_id() {
        let id = Uuid::new_v4();
        let ctx = context(&[id], None);
        let first = ctx.manager(id).unwrap();
        let second = ctx.manager(id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_default_manager_uses_configured_default() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ctx = context(&[a, b], Some(b));
        assert_eq!(ctx.default_manager().unwrap().storage_id(), b);
    }

    #[test]
    fn test_no_default_storage() {
        let ctx = StorageContext::new(StoragesConfig {
            default_storage: None,
            storages: vec![],
        });
        assert!(matches!(
            ctx.default_manager(),
            Err(StorageError::NoDefaultStorage)
        ));
    }
}
