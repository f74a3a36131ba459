//! Seen-ad history: which ad URLs have already been notified

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::models::AdLink;
use crate::traits::HistoryStore;

/// Newline-delimited, append-only file of seen URLs
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(&self) -> Result<HashSet<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No history file at {}, starting fresh",
                    self.path.display()
                );
                Ok(HashSet::new())
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read history file {}", self.path.display())),
        }
    }

    async fn append(&self, urls: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open history file {}", self.path.display()))?;

        let mut lines = String::new();
        for url in urls {
            lines.push_str(url);
            lines.push('\n');
        }

        file.write_all(lines.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Classifies ads as seen or unseen against the persisted history
pub struct NoveltyTracker {
    store: Box<dyn HistoryStore>,
    seen: HashSet<String>,
}

impl NoveltyTracker {
    /// Load the history from `store`. An unreadable store is treated as an
    /// empty history.
    pub async fn load(store: Box<dyn HistoryStore>) -> Self {
        let seen = match store.load().await {
            Ok(seen) => seen,
            Err(e) => {
                warn!("Could not load seen history, starting empty: {:#}", e);
                HashSet::new()
            }
        };

        info!("Loaded {} seen ads from history", seen.len());
        Self { store, seen }
    }

    /// Partition `ads` into `(seen, unseen)`, preserving input order
    pub fn classify(&self, ads: Vec<AdLink>) -> (Vec<AdLink>, Vec<AdLink>) {
        ads.into_iter().partition(|ad| self.seen.contains(&ad.url))
    }

    /// Record `urls` as seen. URLs already known, or repeated within the
    /// input, are not appended again.
    ///
    /// The URLs count as seen for the rest of the process even when the
    /// durable append fails; the append error is still returned.
    pub async fn mark_seen(&mut self, urls: &[String]) -> Result<()> {
        let mut batch = HashSet::new();
        let fresh: Vec<String> = urls
            .iter()
            .filter(|url| !self.seen.contains(*url) && batch.insert(url.as_str()))
            .cloned()
            .collect();

        if fresh.is_empty() {
            return Ok(());
        }

        let appended = self.store.append(&fresh).await;
        self.seen.extend(fresh);
        appended
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct BrokenStore;

    #[async_trait]
    impl HistoryStore for BrokenStore {
        async fn load(&self) -> Result<HashSet<String>> {
            anyhow::bail!("disk on fire")
        }

        async fn append(&self, _urls: &[String]) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|url| url.to_string()).collect()
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        let store = FileHistoryStore::new(dir.path().join("seen.txt"));

        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_classify_then_mark_seen() {
        let dir = TempDir::new().unwrap();
        let store = FileHistoryStore::new(dir.path().join("seen.txt"));
        let mut tracker = NoveltyTracker::load(Box::new(store)).await;
        let ad = AdLink::new("https://www.zonaprop.com.ar/propiedades/a-111.html");

        let (seen, unseen) = tracker.classify(vec![ad.clone()]);
        assert!(seen.is_empty());
        assert_eq!(unseen, vec![ad.clone()]);

        tracker.mark_seen(&[ad.url.clone()]).await.unwrap();

        let (seen, unseen) = tracker.classify(vec![ad.clone()]);
        assert_eq!(seen, vec![ad]);
        assert!(unseen.is_empty());
    }

    #[tokio::test]
    async fn test_classify_is_stable_partition() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seen.txt");
        tokio::fs::write(&path, "b\n\n  d  \n").await.unwrap();
        let tracker = NoveltyTracker::load(Box::new(FileHistoryStore::new(&path))).await;

        let ads: Vec<AdLink> = ["a", "b", "c", "d", "e"].into_iter().map(AdLink::new).collect();
        let (seen, unseen) = tracker.classify(ads);

        assert_eq!(seen, vec![AdLink::new("b"), AdLink::new("d")]);
        assert_eq!(
            unseen,
            vec![AdLink::new("a"), AdLink::new("c"), AdLink::new("e")]
        );
    }

    #[tokio::test]
    async fn test_mark_seen_is_idempotent_and_durable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("seen.txt");
        let mut tracker = NoveltyTracker::load(Box::new(FileHistoryStore::new(&path))).await;

        tracker.mark_seen(&urls(&["u1", "u2", "u1"])).await.unwrap();
        tracker.mark_seen(&urls(&["u2", "u3"])).await.unwrap();
        tracker.mark_seen(&[]).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "u1\nu2\nu3\n");

        let reloaded = NoveltyTracker::load(Box::new(FileHistoryStore::new(&path))).await;
        assert_eq!(reloaded.len(), 3);
        assert!(reloaded.contains("u3"));
    }

    #[tokio::test]
    async fn test_unreadable_store_starts_empty() {
        let mut tracker = NoveltyTracker::load(Box::new(BrokenStore)).await;
        assert!(tracker.is_empty());

        // A failed append is reported, but the ad is not offered again
        assert!(tracker.mark_seen(&urls(&["u1"])).await.is_err());
        assert!(tracker.contains("u1"));

        let (seen, unseen) = tracker.classify(vec![AdLink::new("u1")]);
        assert_eq!(seen, vec![AdLink::new("u1")]);
        assert!(unseen.is_empty());
    }
}
