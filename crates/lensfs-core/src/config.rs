//! Persisted profile: filter prefixes and named root sources.
//!
//! The engine treats the in-memory filter set as the source of truth during a
//! session and mirrors it to a [`ProfileStore`] after every add/remove. A
//! reload rehydrates from the store wholesale. No schema versioning.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::LensResult;

/// One session's persisted state.
///
/// `filters` is an unordered array of raw prefix strings; `roots` maps root
/// names to source URIs (plain paths are `file` sources).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub roots: BTreeMap<String, String>,
}

/// Storage collaborator for the profile.
///
/// Durability is this trait's contract; the engine does not retry or
/// special-case persistence failures.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load the profile. A missing store yields the default (empty) profile.
    async fn load(&self) -> LensResult<Profile>;

    /// Persist the profile.
    async fn save(&self, profile: &Profile) -> LensResult<()>;
}

/// Profile stored as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    async fn load(&self) -> LensResult<Profile> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                let profile = serde_json::from_slice(&bytes)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                Ok(profile)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Profile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, profile: &Profile) -> LensResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(profile)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profile: Mutex<Profile>,
}

impl MemoryStore {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile: Mutex::new(profile),
        }
    }

    /// Snapshot of the currently stored profile.
    pub fn snapshot(&self) -> Profile {
        self.profile.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn load(&self) -> LensResult<Profile> {
        Ok(self.snapshot())
    }

    async fn save(&self, profile: &Profile) -> LensResult<()> {
        *self.profile.lock().expect("lock poisoned") = profile.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_profile_path() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        env::temp_dir().join(format!(
            "lensfs-profile-{}-{}.json",
            std::process::id(),
            id
        ))
    }

    fn sample() -> Profile {
        Profile {
            filters: vec!["libs/common/".to_string(), "docs/readme.md".to_string()],
            roots: BTreeMap::from([("proj".to_string(), "/w/proj".to_string())]),
        }
    }

    #[tokio::test]
    async fn test_json_file_round_trip() {
        let path = temp_profile_path();
        let store = JsonFileStore::new(&path);

        store.save(&sample()).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, sample());

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_missing_file_yields_default() {
        let store = JsonFileStore::new(temp_profile_path());
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, Profile::default());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let path = temp_profile_path();
        fs::write(&path, b"not json").await.unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().await.is_err());

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::default();
        assert_eq!(store.load().await.unwrap(), Profile::default());

        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), sample());
    }

    #[test]
    fn test_profile_missing_fields_default() {
        let profile: Profile = serde_json::from_str("{}").unwrap();
        assert!(profile.filters.is_empty());
        assert!(profile.roots.is_empty());
    }
}
