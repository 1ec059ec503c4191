//! Dedup store: the durable set of channel ids that were already notified.
//!
//! The set only grows. `load` never fails: a missing or unreadable snapshot
//! is a cold start and every matching channel looks new again. Each
//! `add_and_persist` writes the full set back before returning, so a crash
//! mid-cycle loses at most the in-flight notification.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::io::AsyncWriteExt;

use sentinel_common::error::StoreError;
use sentinel_common::types::ChannelId;

/// In-memory view of the notified channel ids.
///
/// Ordered so that the same set always serializes to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifiedSet {
    ids: BTreeSet<ChannelId>,
}

impl NotifiedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns `true` if the id was not present before.
    pub fn insert(&mut self, id: ChannelId) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelId> {
        self.ids.iter()
    }
}

impl FromIterator<ChannelId> for NotifiedSet {
    fn from_iter<T: IntoIterator<Item = ChannelId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Storage backend for the notified set.
#[async_trait::async_trait]
pub trait DedupStore: Send + Sync {
    /// Reconstruct the set from durable storage, or an empty set on cold start.
    async fn load(&self) -> NotifiedSet;

    /// Insert `id` and durably record the updated set before returning.
    async fn add_and_persist(&self, set: &mut NotifiedSet, id: &ChannelId)
    -> Result<(), StoreError>;

    /// Human-readable backend name (e.g., "file", "redis").
    fn backend_name(&self) -> &str;
}

/// Snapshot file holding the set as a JSON array of ids.
///
/// Writes go to a sibling temp file that is renamed over the snapshot, so
/// a reader never observes a partial write.
#[derive(Debug, Clone)]
pub struct FileDedupStore {
    path: PathBuf,
}

impl FileDedupStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "notified_channels.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write_snapshot(&self, set: &NotifiedSet) -> Result<(), StoreError> {
        let ids: Vec<&str> = set.iter().map(ChannelId::as_str).collect();
        let bytes = serde_json::to_vec(&ids)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path();
        {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
        }
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl DedupStore for FileDedupStore {
    async fn load(&self) -> NotifiedSet {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No dedup snapshot yet, cold start");
                return NotifiedSet::new();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Dedup snapshot unreadable, treating every channel as new"
                );
                return NotifiedSet::new();
            }
        };

        match serde_json::from_slice::<Vec<serde_json::Value>>(&bytes) {
            Ok(elements) => {
                let total = elements.len();
                let set: NotifiedSet = elements.into_iter().filter_map(ChannelId::from_json).collect();
                if set.len() < total {
                    tracing::warn!(
                        path = %self.path.display(),
                        dropped = total - set.len(),
                        "Ignoring unusable entries in dedup snapshot"
                    );
                }
                tracing::debug!(path = %self.path.display(), count = set.len(), "Dedup snapshot loaded");
                set
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Dedup snapshot corrupt, treating every channel as new"
                );
                NotifiedSet::new()
            }
        }
    }

    async fn add_and_persist(
        &self,
        set: &mut NotifiedSet,
        id: &ChannelId,
    ) -> Result<(), StoreError> {
        set.insert(id.clone());
        self.write_snapshot(set).await
    }

    fn backend_name(&self) -> &str {
        "file"
    }
}

/// Redis set backend. `SADD` is atomic, so several watcher processes can
/// share one set.
#[derive(Clone)]
pub struct RedisDedupStore {
    redis: ConnectionManager,
    key: String,
}

impl RedisDedupStore {
    pub fn new(redis: ConnectionManager, key: impl Into<String>) -> Self {
        Self {
            redis,
            key: key.into(),
        }
    }
}

#[async_trait::async_trait]
impl DedupStore for RedisDedupStore {
    async fn load(&self) -> NotifiedSet {
        let mut redis = self.redis.clone();
        match redis.smembers::<_, Vec<String>>(&self.key).await {
            Ok(ids) => ids.into_iter().filter_map(ChannelId::new).collect(),
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    "Dedup set unavailable, treating every channel as new"
                );
                NotifiedSet::new()
            }
        }
    }

    async fn add_and_persist(
        &self,
        set: &mut NotifiedSet,
        id: &ChannelId,
    ) -> Result<(), StoreError> {
        let mut redis = self.redis.clone();
        redis.sadd::<_, _, ()>(&self.key, id.as_str()).await?;
        set.insert(id.clone());
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ChannelId {
        ChannelId::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDedupStore::new(dir.path().join("notified.json"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notified.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = FileDedupStore::new(&path);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_and_persist_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDedupStore::new(dir.path().join("notified.json"));

        let mut set = store.load().await;
        store.add_and_persist(&mut set, &id("b")).await.unwrap();
        store.add_and_persist(&mut set, &id("a")).await.unwrap();
        assert!(set.has("a"));

        let reloaded = store.load().await;
        assert_eq!(reloaded, set);
        assert!(reloaded.has("a") && reloaded.has("b"));
        assert!(!reloaded.has("c"));
    }

    #[tokio::test]
    async fn test_snapshot_is_sorted_json_array_without_leftover_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notified.json");
        let store = FileDedupStore::new(&path);

        let mut set = NotifiedSet::new();
        store.add_and_persist(&mut set, &id("zeta")).await.unwrap();
        store.add_and_persist(&mut set, &id("alpha")).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"["alpha","zeta"]"#);
        assert!(!dir.path().join("notified.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("nested").join("notified.json");
        let store = FileDedupStore::new(&path);

        let mut set = NotifiedSet::new();
        store.add_and_persist(&mut set, &id("x")).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_blank_ids_in_snapshot_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notified.json");
        std::fs::write(&path, r#"["a", "", "  "]"#).unwrap();

        let set = FileDedupStore::new(&path).load().await;
        assert_eq!(set.len(), 1);
        assert!(set.has("a"));
    }

    #[tokio::test]
    async fn test_numeric_ids_in_snapshot_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notified.json");
        std::fs::write(&path, r#"[42,"drops",{"id":1},null]"#).unwrap();

        let set = FileDedupStore::new(&path).load().await;
        assert_eq!(set.len(), 2);
        assert!(set.has("42"));
        assert!(set.has("drops"));
    }

    #[test]
    fn test_insert_reports_novelty() {
        let mut set = NotifiedSet::new();
        assert!(set.insert(id("a")));
        assert!(!set.insert(id("a")));
        assert_eq!(set.len(), 1);
    }
}
