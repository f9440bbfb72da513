//! JSON-file credential store.

use crate::{CredentialStore, SessionTokens, StorageKeys, StorageResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Credential store backed by a JSON object on disk.
///
/// The session lives under the `"session"` key; other keys in the file are
/// preserved. Writes go to a sibling temp file first and are renamed into
/// place.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> StorageResult<Map<String, Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(Map::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents).await?;
        restrict_permissions(&tmp).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> StorageResult<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> StorageResult<()> {
    Ok(())
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn set(&self, tokens: &SessionTokens) -> StorageResult<()> {
        debug!(path = %self.path.display(), "Storing session");
        let mut entries = self.read_entries().await?;
        entries.insert(StorageKeys::SESSION.to_string(), serde_json::to_value(tokens)?);
        self.write_entries(&entries).await
    }

    async fn get(&self) -> StorageResult<Option<SessionTokens>> {
        let mut entries = self.read_entries().await?;
        match entries.remove(StorageKeys::SESSION) {
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    async fn remove(&self) -> StorageResult<bool> {
        let mut entries = self.read_entries().await?;
        if entries.remove(StorageKeys::SESSION).is_none() {
            return Ok(false);
        }
        debug!(path = %self.path.display(), "Removing session");
        self.write_entries(&entries).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileCredentialStore {
        FileCredentialStore::new(dir.path().join("credentials.json"))
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.get().await.unwrap().is_none());
        assert!(!store.remove().await.unwrap());
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let tokens = SessionTokens::new("A", "B");

        store.set(&tokens).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(tokens));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["session"]["access_token"], "A");
        assert_eq!(json["session"]["refresh_token"], "B");

        assert!(store.remove().await.unwrap());
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unrelated_keys_survive() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"theme":"dark"}"#).unwrap();

        store.set(&SessionTokens::new("A", "B")).await.unwrap();
        store.remove().await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json, serde_json::json!({"theme": "dark"}));
    }

    #[tokio::test]
    async fn test_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("credentials.json"));

        store.set(&SessionTokens::new("A", "B")).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.get().await, Err(StorageError::Json(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(&SessionTokens::new("A", "B")).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
