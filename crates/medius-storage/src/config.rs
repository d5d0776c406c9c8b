//! Storage configuration, loaded once from a YAML file at startup.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// Backend provider. Closed set; s3 is the only member today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    S3,
}

/// Connection parameters for an S3-compatible backend.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    /// Custom endpoint for S3-compatible providers (MinIO, Spaces, ...).
    pub endpoint_url: Option<String>,
    /// Region identifier; defaults to `us-east-1` when unset.
    pub region: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
}

fn default_true() -> bool {
    true
}

/// One configured storage.
#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub id: Uuid,
    #[serde(default)]
    pub provider: StorageProvider,
    /// Replace uploaded filenames with random identifiers (extension kept).
    #[serde(default = "default_true")]
    pub random_filenames: bool,
    pub s3: S3Config,
}

/// The full storage configuration: an ordered list of storages plus an
/// optional default.
#[derive(Debug, Clone, Deserialize)]
pub struct StoragesConfig {
    pub default_storage: Option<Uuid>,
    pub storages: Vec<Storage>,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageConfigError {
    #[error("Failed to read storage config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse storage config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("Default storage {0} is not a configured storage")]
    UnknownDefaultStorage(Uuid),

    #[error("Duplicate storage id {0}")]
    DuplicateStorageId(Uuid),
}

impl StoragesConfig {
    /// Load and validate the configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, StorageConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| StorageConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Parse and validate the configuration from YAML text.
    pub fn from_yaml_str(raw: &str) -> Result<Self, StorageConfigError> {
        let mut config: StoragesConfig = serde_yaml_ng::from_str(raw)?;
        config.normalize()?;
        Ok(config)
    }

    /// Enforce the defaulting rules: storage ids must be unique, a declared
    /// default must reference a listed storage, and with storages present but
    /// no default declared the first listed storage becomes the default.
    fn normalize(&mut self) -> Result<(), StorageConfigError> {
        let mut seen = HashSet::with_capacity(self.storages.len());
        for storage in &self.storages {
            if !seen.insert(storage.id) {
                return Err(StorageConfigError::DuplicateStorageId(storage.id));
            }
        }

        match self.default_storage {
            Some(id) if !seen.contains(&id) => {
                return Err(StorageConfigError::UnknownDefaultStorage(id));
            }
            None => {
                self.default_storage = self.storages.first().map(|s| s.id);
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
default_storage: null
storages:
  - id: 5f1e75b8-74e8-4cc4-8cc6-f4ed87cd3c9b
    random_filenames: true
    s3:
      endpoint_url: http://localhost:9000
      access_key_id: minio
      secret_access_key: minio123
      bucket_name: media
  - id: 9a3d7ff4-2ab9-43de-a614-ae4e4d4d9d57
    provider: s3
    random_filenames: false
    s3:
      region: eu-west-1
      access_key_id: AKIA123
      secret_access_key: secret
      bucket_name: media-eu
"#;

    #[test]
    fn test_parse_sample() {
        let config = StoragesConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.storages.len(), 2);
        assert_eq!(config.storages[0].provider, StorageProvider::S3);
        assert!(config.storages[0].random_filenames);
        assert!(!config.storages[1].random_filenames);
        assert_eq!(config.storages[1].s3.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_first_storage_becomes_default() {
        let config = StoragesConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.default_storage, Some(config.storages[0].id));
    }

    #[test]
    fn test_declared_default_is_kept() {
        let raw = SAMPLE.replace(
            "default_storage: null",
            "default_storage: 9a3d7ff4-2ab9-43de-a614-ae4e4d4d9d57",
        );
        let config = StoragesConfig::from_yaml_str(&raw).unwrap();
        assert_eq!(config.default_storage, Some(config.storages[1].id));
    }

    #[test]
    fn test_unknown_default_fails_load() {
        let raw = SAMPLE.replace(
            "default_storage: null",
            "default_storage: 00000000-0000-0000-0000-000000000000",
        );
        assert!(matches!(
            StoragesConfig::from_yaml_str(&raw),
            Err(StorageConfigError::UnknownDefaultStorage(_))
        ));
    }

    #[test]
    fn test_duplicate_id_fails_load() {
        let raw = SAMPLE.replace(
            "9a3d7ff4-2ab9-43de-a614-ae4e4d4d9d57",
            "5f1e75b8-74e8-4cc4-8cc6-f4ed87cd3c9b",
        );
        assert!(matches!(
            StoragesConfig::from_yaml_str(&raw),
            Err(StorageConfigError::DuplicateStorageId(_))
        ));
    }

    #[test]
    fn test_empty_storages_have_no_default() {
        let config = StoragesConfig::from_yaml_str("default_storage: null\nstorages: []\n").unwrap();
        assert_eq!(config.default_storage, None);
    }
}
