use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::error::{IoContext, LauncherError, LauncherResult};
use crate::core::http::Fetcher;

use super::integrity::HashAlgorithm;
use super::rate_limiter::RateLimiter;

/// A single file to download, verified against `hash` before it is written.
#[derive(Debug, Clone)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: PathBuf,
    pub algorithm: HashAlgorithm,
    pub hash: String,
}

impl DownloadEntry {
    pub fn sha1(url: impl Into<String>, dest: impl Into<PathBuf>, hash: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            algorithm: HashAlgorithm::Sha1,
            hash: hash.into(),
        }
    }
}

/// Hash-verified downloader with a bounded, order-preserving worker pool.
pub struct Downloader {
    fetcher: Arc<dyn Fetcher>,
    /// Maximum number of parallel downloads.
    concurrency: usize,
    limiter: RateLimiter,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            concurrency: 8,
            limiter: RateLimiter::default(),
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.limiter = RateLimiter::new(delay);
        self
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    // ── Single file download ────────────────────────────

    /// Fetch `url` and return its bytes only if they hash to `expected`.
    pub async fn fetch_verified(
        &self,
        url: &str,
        algorithm: HashAlgorithm,
        expected: &str,
    ) -> LauncherResult<Vec<u8>> {
        self.limiter.lock().await;
        let bytes = self.fetcher.fetch(url).await?;
        algorithm.verify(expected, &bytes)?;
        Ok(bytes)
    }

    /// Download `url` to `dest`, validating the digest first.
    ///
    /// Nothing is written on mismatch. A destination that already carries the
    /// expected digest is left alone and no request is made.
    pub async fn download_file(
        &self,
        url: &str,
        algorithm: HashAlgorithm,
        expected: &str,
        dest: &Path,
    ) -> LauncherResult<()> {
        if algorithm.file_matches(dest, expected).await? {
            debug!("Already verified: {:?}", dest);
            return Ok(());
        }

        let bytes = self.fetch_verified(url, algorithm, expected).await?;
        write_bytes(dest, &bytes).await?;

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }

    /// Like [`Downloader::download_file`] for JSON documents: the file is
    /// persisted pretty-printed and the raw verified bytes are returned.
    pub async fn download_json(
        &self,
        url: &str,
        algorithm: HashAlgorithm,
        expected: &str,
        dest: &Path,
    ) -> LauncherResult<Vec<u8>> {
        let bytes = self.fetch_verified(url, algorithm, expected).await?;
        write_bytes(dest, &pretty_json(&bytes)?).await?;
        debug!("Saved document: {} -> {:?}", url, dest);
        Ok(bytes)
    }

    // ── Batch downloads ─────────────────────────────────

    /// Download many files through the worker pool.
    ///
    /// Entries sharing a destination are fetched once. The first failure stops
    /// the batch; in-flight and queued downloads are dropped.
    pub async fn download_batch(&self, entries: Vec<DownloadEntry>) -> LauncherResult<()> {
        let mut seen = HashSet::new();
        let unique: Vec<DownloadEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.dest.clone()))
            .collect();

        info!(
            "Starting batch download: {} files, concurrency={}",
            unique.len(),
            self.concurrency
        );

        stream::iter(unique)
            .map(|entry| async move {
                self.download_file(&entry.url, entry.algorithm, &entry.hash, &entry.dest)
                    .await
            })
            .buffered(self.concurrency)
            .try_collect::<Vec<()>>()
            .await?;

        Ok(())
    }
}

/// Truncate-and-write `bytes` to `dest`, creating parent directories.
pub async fn write_bytes(dest: &Path, bytes: &[u8]) -> LauncherResult<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.at_path(parent)?;
    }

    // Scope the handle so it is closed before the caller touches the file again.
    {
        let mut file = tokio::fs::File::create(dest).await.at_path(dest)?;
        file.write_all(bytes).await.at_path(dest)?;
        file.flush().await.at_path(dest)?;
    }

    Ok(())
}

/// Join a `/`-separated relative path from a remote document onto `base`,
/// converting separators to the platform convention.
pub fn join_relative(base: &Path, raw: &str) -> LauncherResult<PathBuf> {
    let mut path = base.to_path_buf();
    for part in raw.split(['/', '\\']).filter(|p| !p.is_empty() && *p != ".") {
        if part == ".." || part.contains(':') {
            return Err(LauncherError::UnsafePath(raw.to_string()));
        }
        path.push(part);
    }
    Ok(path)
}

/// Re-indent a JSON document with four spaces, keeping key order.
pub fn pretty_json(bytes: &[u8]) -> LauncherResult<Vec<u8>> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let mut out = Vec::with_capacity(bytes.len());
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}
