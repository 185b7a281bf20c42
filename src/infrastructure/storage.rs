//! Key-value persistence for the palette.
//!
//! Values are JSON strings. The binary uses [`FileStore`] (one file per key
//! under the config directory); tests use [`MemoryStore`].

use crate::error::StorageError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const FAVORITES_KEY: &str = "dl-spotlight-favs";

#[must_use]
pub fn metadata_key(origin: &str) -> String {
    format!("dl-entity-metadata-{origin}")
}

#[must_use]
pub fn impersonation_key(origin: &str) -> String {
    format!("dl-impersonation-{origin}")
}

/// Impersonation state of one environment, written by the background process
/// and read by the Web API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpersonationRecord {
    pub is_active: bool,
    pub user_id: String,
    pub user_name: String,
    pub user_full_name: String,
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })
}

pub fn write_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// One `<sanitized key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        std::fs::write(self.path_for(key), value).map_err(io_err)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Keys embed origins (`https://org.crm.dynamics.com`), which are not valid
/// file names everywhere.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FavCommand;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(
            sanitize_key(&metadata_key("https://org.crm.dynamics.com")),
            "dl-entity-metadata-https___org.crm.dynamics.com"
        );
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("storage"));

        assert_eq!(store.get(FAVORITES_KEY).unwrap(), None);
        let favs = vec![FavCommand::new("openAdmin")];
        write_json(&store, FAVORITES_KEY, &favs).unwrap();
        let loaded: Option<Vec<FavCommand>> = read_json(&store, FAVORITES_KEY).unwrap();
        assert_eq!(loaded, Some(favs));

        store.remove(FAVORITES_KEY).unwrap();
        assert_eq!(store.get(FAVORITES_KEY).unwrap(), None);
        // Removing a missing key is not an error.
        store.remove(FAVORITES_KEY).unwrap();
    }

    #[test]
    fn test_corrupt_value_is_reported() {
        let store = MemoryStore::new();
        store.set("k", "{not json").unwrap();
        let result: Result<Option<Vec<String>>, _> = read_json(&store, "k");
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_impersonation_record_shape() {
        let record = ImpersonationRecord {
            is_active: true,
            user_id: "u1".to_string(),
            user_name: "jane@contoso.com".to_string(),
            user_full_name: "Jane Doe".to_string(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["isActive"], true);
        assert_eq!(value["userFullName"], "Jane Doe");
    }
}
