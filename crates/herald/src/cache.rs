// ABOUTME: Content-addressed article cache with one JSON file per URL and lazy TTL expiry.
// ABOUTME: Entries are written to a temp file and renamed into place; I/O failures degrade to misses.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::article::Article;
use crate::error::ScrapeError;
use crate::options::DEFAULT_CACHE_TTL;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A cached article plus the epoch-seconds time it was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(flatten)]
    pub article: Article,
    pub timestamp: i64,
}

impl CacheEntry {
    /// Stamp `article` with the current time.
    pub fn now(article: Article) -> Self {
        Self {
            article,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// True once `ttl` has elapsed since the entry was stored.
    pub fn is_stale(&self, now: i64, ttl: Duration) -> bool {
        now.saturating_sub(self.timestamp) >= ttl.as_secs() as i64
    }
}

/// Persistent store of extracted articles keyed by URL.
#[derive(Debug, Clone)]
pub struct ArticleCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ArticleCache {
    /// Open a cache rooted at `dir`, creating the directory when needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, ScrapeError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            ScrapeError::cache(
                dir.display().to_string(),
                "OpenCache",
                Some(anyhow::anyhow!(e)),
            )
        })?;
        Ok(Self {
            dir,
            ttl: DEFAULT_CACHE_TTL,
        })
    }

    /// Set how long entries stay fresh.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Path of the file that holds the entry for `url`.
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(url)))
    }

    /// Look up a fresh entry for `url`. Missing, stale, and unreadable entries are misses.
    pub async fn get(&self, url: &str) -> Option<CacheEntry> {
        let path = self.path_for(url);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(url, path = %path.display(), error = %e, "cache read failed");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(url, path = %path.display(), error = %e, "cache entry is corrupt");
                return None;
            }
        };

        if entry.is_stale(chrono::Utc::now().timestamp(), self.ttl) {
            debug!(url, timestamp = entry.timestamp, "cache entry expired");
            return None;
        }
        Some(entry)
    }

    /// Store `article` for `url`, stamped with the current time.
    pub async fn put(&self, url: &str, article: &Article) {
        self.put_entry(url, &CacheEntry::now(article.clone())).await;
    }

    /// Store an explicit entry for `url`, replacing any previous one.
    pub async fn put_entry(&self, url: &str, entry: &CacheEntry) {
        if let Err(e) = self.write_entry(url, entry).await {
            warn!(url, error = %e, "cache write dropped");
        }
    }

    async fn write_entry(&self, url: &str, entry: &CacheEntry) -> Result<(), ScrapeError> {
        let path = self.path_for(url);
        let json = serde_json::to_vec_pretty(entry)
            .map_err(|e| ScrapeError::cache(url, "CacheWrite", Some(anyhow::anyhow!(e))))?;

        let tmp = self.dir.join(format!(
            "{}.{}.{}.tmp",
            cache_key(url),
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(e) = tokio::fs::write(&tmp, &json).await {
            return Err(ScrapeError::cache(url, "CacheWrite", Some(anyhow::anyhow!(e))));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(ScrapeError::cache(url, "CacheWrite", Some(anyhow::anyhow!(e))));
        }
        Ok(())
    }
}

/// Lowercase hex SHA-256 of the URL string.
pub fn cache_key(url: &str) -> String {
    format!("{:x}", Sha256::digest(url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn article(url: &str, content: &str) -> Article {
        let mut a = Article::new(url);
        a.title = Some("T".to_string());
        a.content = Some(content.to_string());
        a
    }

    #[test]
    fn key_is_sha256_hex() {
        assert_eq!(
            cache_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn put_then_get_returns_article() {
        let dir = TempDir::new().unwrap();
        let cache = ArticleCache::open(dir.path()).await.unwrap();
        let url = "https://example.com/a";
        let a = article(url, "body");

        cache.put(url, &a).await;
        let entry = cache.get(url).await.expect("fresh entry");
        assert_eq!(entry.article, a);
        assert!(cache.path_for(url).exists());
    }

    #[tokio::test]
    async fn entry_file_is_article_json_with_timestamp() {
        let dir = TempDir::new().unwrap();
        let cache = ArticleCache::open(dir.path()).await.unwrap();
        let url = "https://example.com/a";
        cache.put(url, &article(url, "body")).await;

        let raw = std::fs::read_to_string(cache.path_for(url)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["content"], "body");
        assert_eq!(value["url"], url);
        assert!(value["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn repeated_get_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let cache = ArticleCache::open(dir.path()).await.unwrap();
        let url = "https://example.com/a";
        cache.put(url, &article(url, "body")).await;

        let first = cache.get(url).await.unwrap();
        let second = cache.get(url).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn stale_entry_is_a_miss_but_not_deleted() {
        let dir = TempDir::new().unwrap();
        let cache = ArticleCache::open(dir.path()).await.unwrap();
        let url = "https://example.com/old";
        let entry = CacheEntry {
            article: article(url, "old body"),
            timestamp: chrono::Utc::now().timestamp() - 86_401,
        };
        cache.put_entry(url, &entry).await;

        assert!(cache.get(url).await.is_none());
        assert!(cache.path_for(url).exists());
    }

    #[test]
    fn staleness_boundary() {
        let entry = CacheEntry {
            article: Article::new("https://example.com"),
            timestamp: 1_000,
        };
        let ttl = Duration::from_secs(86_400);
        assert!(!entry.is_stale(1_000 + 86_399, ttl));
        assert!(entry.is_stale(1_000 + 86_400, ttl));
    }

    #[tokio::test]
    async fn put_overwrites_previous_entry() {
        let dir = TempDir::new().unwrap();
        let cache = ArticleCache::open(dir.path()).await.unwrap();
        let url = "https://example.com/a";
        cache.put(url, &article(url, "first")).await;
        cache.put(url, &article(url, "second")).await;

        let entry = cache.get(url).await.unwrap();
        assert_eq!(entry.article.content.as_deref(), Some("second"));

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = ArticleCache::open(dir.path()).await.unwrap();
        let url = "https://example.com/a";
        std::fs::write(cache.path_for(url), b"{ not json").unwrap();

        assert!(cache.get(url).await.is_none());
    }

    #[tokio::test]
    async fn missing_directory_drops_writes() {
        let dir = TempDir::new().unwrap();
        let cache = ArticleCache::open(dir.path().join("gone")).await.unwrap();
        std::fs::remove_dir_all(cache.dir()).unwrap();

        let url = "https://example.com/a";
        cache.put(url, &article(url, "body")).await;
        assert!(cache.get(url).await.is_none());
    }

    #[tokio::test]
    async fn open_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let cache = ArticleCache::open(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(cache.ttl(), DEFAULT_CACHE_TTL);
    }
}
