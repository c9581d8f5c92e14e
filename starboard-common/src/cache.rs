//! Standings cache
//!
//! One file-backed slot per (board, year): the ranked snapshot plus the
//! raw document it was computed from. A slot whose mtime is inside the
//! freshness window is served without contacting the upstream feed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::engine::{self, MemberStanding, RankingPolicy, Standings};
use crate::feed::{FeedSource, RawLeaderboard};
use crate::{Error, Result};

/// Maximum age of a cached entry before recomputation
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Flat-file store for cache entries under one directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the snapshot entry for a (board, year) key
    pub fn snapshot_path(&self, board_id: u64, year: i32) -> PathBuf {
        self.dir.join(format!("{board_id}-{year}.json"))
    }

    /// Path of the raw-document entry for a (board, year) key
    pub fn raw_path(&self, board_id: u64, year: i32) -> PathBuf {
        self.dir.join(format!("{board_id}-{year}-raw.json"))
    }

    /// Age of an entry; None when it does not exist
    pub fn age(&self, path: &Path) -> Option<Duration> {
        let modified = std::fs::metadata(path).ok()?.modified().ok()?;
        SystemTime::now().duration_since(modified).ok()
    }

    /// True when the entry exists and is younger than the freshness window
    pub fn is_fresh(&self, path: &Path) -> bool {
        self.age(path)
            .map(|age| age < FRESHNESS_WINDOW)
            .unwrap_or(false)
    }

    pub fn read(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|source| Error::CacheIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Atomic write: temp file in the same directory, then rename, so a
    /// concurrent reader never observes a partial entry.
    pub fn write(&self, path: &Path, contents: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| Error::CacheIo {
            path: self.dir.clone(),
            source,
        })?;

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, contents).map_err(|source| Error::CacheIo {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, path).map_err(|source| Error::CacheIo {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// File-backed standings cache with per-year single-flight refresh.
///
/// The snapshot file memoizes the full compute under the configured
/// policy; the raw file deduplicates upstream fetches, so a replay under
/// a different policy inside the freshness window needs no network.
pub struct StandingsCache {
    board_id: u64,
    policy: RankingPolicy,
    store: FileStore,
    feed: Box<dyn FeedSource>,
    refresh_locks: Mutex<HashMap<i32, Arc<Mutex<()>>>>,
}

impl StandingsCache {
    pub fn new(config: &Config, feed: Box<dyn FeedSource>) -> Self {
        Self {
            board_id: config.board_id,
            policy: config.policy,
            store: FileStore::new(config.cache_dir.clone()),
            feed,
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Ranked standings for a year under the configured policy.
    pub async fn get_standings(&self, year: i32) -> Result<Standings> {
        self.get_standings_with_policy(year, self.policy).await
    }

    /// Ranked standings for a year under an explicit policy.
    ///
    /// The whole check → fetch → recompute → persist sequence runs under
    /// the per-year lock, so concurrent requests during a stale window
    /// coalesce into a single upstream fetch.
    pub async fn get_standings_with_policy(
        &self,
        year: i32,
        policy: RankingPolicy,
    ) -> Result<Standings> {
        let lock = self.refresh_lock(year).await;
        let _guard = lock.lock().await;

        let snapshot_path = self.store.snapshot_path(self.board_id, year);
        if policy == self.policy && self.store.is_fresh(&snapshot_path) {
            debug!(year, "Serving fresh cached snapshot");
            let body = self.store.read(&snapshot_path)?;
            return serde_json::from_str(&body).map_err(|e| Error::MalformedData {
                context: format!("cached snapshot {}: {e}", snapshot_path.display()),
            });
        }

        let raw = self.raw_document(year).await?;
        let standings = engine::compute_standings(&raw, year, policy);

        // Snapshots under a policy override are not memoized; the slot
        // stays reserved for the configured policy.
        if policy == self.policy {
            let body = serde_json::to_string(&standings)
                .map_err(|e| Error::Internal(format!("serialize snapshot: {e}")))?;
            self.store.write(&snapshot_path, &body)?;
        }

        Ok(standings)
    }

    /// Fully scored, sorted member list for a year. The draw tool works
    /// on this directly instead of the serialized snapshot.
    pub async fn members(&self, year: i32) -> Result<Vec<MemberStanding>> {
        Ok(self.get_standings(year).await?.standings)
    }

    /// Raw document for a year: fresh cached copy when available,
    /// otherwise fetched from upstream and persisted.
    async fn raw_document(&self, year: i32) -> Result<RawLeaderboard> {
        let raw_path = self.store.raw_path(self.board_id, year);
        if self.store.is_fresh(&raw_path) {
            debug!(year, "Recomputing from fresh cached raw document");
            let body = self.store.read(&raw_path)?;
            return serde_json::from_str(&body).map_err(|e| Error::MalformedData {
                context: format!("cached raw document {}: {e}", raw_path.display()),
            });
        }

        info!(year, "Refreshing standings from upstream feed");
        let raw = self.feed.fetch(year).await?;
        let body = serde_json::to_string(&raw)
            .map_err(|e| Error::Internal(format!("serialize raw document: {e}")))?;
        self.store.write(&raw_path, &body)?;
        Ok(raw)
    }

    async fn refresh_lock(&self, year: i32) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        locks
            .entry(year)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Canned feed that counts how often it is asked.
    struct StubFeed {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl StubFeed {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FeedSource for StubFeed {
        async fn fetch(&self, _year: i32) -> Result<RawLeaderboard> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(serde_json::from_value(json!({
                "members": {
                    "1": {
                        "id": 1,
                        "name": "Ada",
                        "stars": 2,
                        "last_star_ts": 200,
                        "completion_day_level": {
                            "1": {
                                "1": { "get_star_ts": 100 },
                                "2": { "get_star_ts": 200 }
                            }
                        }
                    },
                    "2": {
                        "id": 2,
                        "name": "Grace",
                        "stars": 1,
                        "last_star_ts": 300,
                        "completion_day_level": {
                            "2": { "1": { "get_star_ts": 300 } }
                        }
                    }
                }
            }))
            .expect("stub document should deserialize"))
        }
    }

    fn test_config(dir: &TempDir) -> Config {
        Config {
            board_id: 642101,
            session_cookie: "test-cookie".to_string(),
            cache_dir: dir.path().to_path_buf(),
            policy: RankingPolicy::DrawWeighted,
        }
    }

    fn cache_with(dir: &TempDir, feed: Arc<StubFeed>) -> StandingsCache {
        struct SharedFeed(Arc<StubFeed>);

        #[async_trait]
        impl FeedSource for SharedFeed {
            async fn fetch(&self, year: i32) -> Result<RawLeaderboard> {
                self.0.fetch(year).await
            }
        }

        StandingsCache::new(&test_config(dir), Box::new(SharedFeed(feed)))
    }

    #[tokio::test]
    async fn test_miss_fetches_computes_and_persists() {
        let dir = TempDir::new().unwrap();
        let feed = Arc::new(StubFeed::new());
        let cache = cache_with(&dir, feed.clone());

        let standings = cache.get_standings(2022).await.unwrap();
        assert_eq!(feed.call_count(), 1);
        assert_eq!(standings.standings.len(), 2);
        assert_eq!(standings.standings[0].name, "Ada");
        assert_eq!(standings.standings[0].position, 1);

        assert!(dir.path().join("642101-2022.json").exists());
        assert!(dir.path().join("642101-2022-raw.json").exists());
    }

    #[tokio::test]
    async fn test_second_call_within_window_skips_upstream() {
        let dir = TempDir::new().unwrap();
        let feed = Arc::new(StubFeed::new());
        let cache = cache_with(&dir, feed.clone());

        let first = cache.get_standings(2022).await.unwrap();
        let second = cache.get_standings(2022).await.unwrap();

        assert_eq!(feed.call_count(), 1, "fresh hit must not refetch");
        assert_eq!(first.timestamp, second.timestamp, "same persisted snapshot");
    }

    #[tokio::test]
    async fn test_years_have_independent_slots() {
        let dir = TempDir::new().unwrap();
        let feed = Arc::new(StubFeed::new());
        let cache = cache_with(&dir, feed.clone());

        cache.get_standings(2021).await.unwrap();
        cache.get_standings(2022).await.unwrap();
        assert_eq!(feed.call_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_coalesce_into_one_fetch() {
        let dir = TempDir::new().unwrap();
        let feed = Arc::new(StubFeed::slow(Duration::from_millis(50)));
        let cache = Arc::new(cache_with(&dir, feed.clone()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.get_standings(2022).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(feed.call_count(), 1, "refresh must be single-flight");
    }

    #[tokio::test]
    async fn test_policy_override_reuses_cached_raw_document() {
        let dir = TempDir::new().unwrap();
        let feed = Arc::new(StubFeed::new());
        let cache = cache_with(&dir, feed.clone());

        cache.get_standings(2022).await.unwrap();
        let replay = cache
            .get_standings_with_policy(2022, RankingPolicy::ScoreOnly)
            .await
            .unwrap();

        assert_eq!(feed.call_count(), 1, "replay must come from the raw cache");
        // Provider-reported count, not the weighted sum.
        assert_eq!(replay.standings[0].draw_entries, 2);
        assert_eq!(replay.standings[0].name, "Ada");
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_without_stale_fallback() {
        struct FailingFeed;

        #[async_trait]
        impl FeedSource for FailingFeed {
            async fn fetch(&self, year: i32) -> Result<RawLeaderboard> {
                Err(Error::FetchStatus { year, status: 500 })
            }
        }

        let dir = TempDir::new().unwrap();
        let cache = StandingsCache::new(&test_config(&dir), Box::new(FailingFeed));

        let err = cache.get_standings(2022).await.unwrap_err();
        assert!(err.is_fetch(), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_members_returns_scored_list() {
        let dir = TempDir::new().unwrap();
        let feed = Arc::new(StubFeed::new());
        let cache = cache_with(&dir, feed.clone());

        let members = cache.members(2022).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].draw_entries, 2);
        assert_eq!(members[1].draw_entries, 1);
    }

    #[test]
    fn test_file_store_write_is_atomic_and_readable() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let path = store.snapshot_path(1, 2022);

        store.write(&path, "{\"ok\":true}").unwrap();
        assert_eq!(store.read(&path).unwrap(), "{\"ok\":true}");
        assert!(store.is_fresh(&path));

        // No temp file left behind after the rename.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_file_store_missing_entry_is_not_fresh() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let path = store.snapshot_path(1, 2022);

        assert!(!path.exists());
        assert!(!store.is_fresh(&path));
        assert!(store.age(&path).is_none());
        assert!(matches!(
            store.read(&path).unwrap_err(),
            Error::CacheIo { .. }
        ));
    }
}
