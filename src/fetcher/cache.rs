//! On-disk response cache.
//!
//! One entry per requested URL, keyed by the md5 hex digest of the URL:
//! `<key>.body` holds the raw bytes and `<key>.json` the metadata needed to
//! rebuild a [`RawResponse`]. Entries never expire; a run that wants fresh
//! data clears the whole directory before fetching anything.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::debug;
use url::Url;

use crate::fetcher::types::RawResponse;

const BODY_EXT: &str = "body";
const META_EXT: &str = "json";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt cache metadata: {0}")]
    Meta(#[from] serde_json::Error),

    #[error("corrupt cache entry: invalid status {0}")]
    Status(u16),
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    url: Url,
    url_final: Url,
    status: u16,
    content_type: String,
    fetched_at: DateTime<Utc>,
}

/// A cached response plus the time it was originally fetched.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub raw: RawResponse,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn key(url: &Url) -> String {
        format!("{:x}", md5::compute(url.as_str().as_bytes()))
    }

    fn paths(&self, url: &Url) -> (PathBuf, PathBuf) {
        let key = Self::key(url);
        (
            self.dir.join(format!("{}.{}", key, BODY_EXT)),
            self.dir.join(format!("{}.{}", key, META_EXT)),
        )
    }

    /// Look up `url`. `Ok(None)` is a plain miss.
    pub async fn get(&self, url: &Url) -> Result<Option<CachedResponse>, CacheError> {
        let (body_path, meta_path) = self.paths(url);

        let meta_bytes = match fs::read(&meta_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let meta: EntryMeta = serde_json::from_slice(&meta_bytes)?;

        // Key collision or a hand-edited entry: treat as a miss.
        if &meta.url != url {
            debug!(url = %url, cached = %meta.url, "cache key collision");
            return Ok(None);
        }

        let body = match fs::read(&body_path).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let status = StatusCode::from_u16(meta.status).map_err(|_| CacheError::Status(meta.status))?;

        Ok(Some(CachedResponse {
            raw: RawResponse {
                url_final: meta.url_final,
                status,
                content_type: meta.content_type,
                body,
            },
            fetched_at: meta.fetched_at,
        }))
    }

    /// Store a successful response. The body is written before the metadata
    /// so a crash between the two leaves a miss, not a truncated hit.
    pub async fn put(
        &self,
        url: &Url,
        raw: &RawResponse,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).await?;
        let (body_path, meta_path) = self.paths(url);

        let meta = EntryMeta {
            url: url.clone(),
            url_final: raw.url_final.clone(),
            status: raw.status.as_u16(),
            content_type: raw.content_type.clone(),
            fetched_at,
        };

        fs::write(&body_path, &raw.body).await?;
        fs::write(&meta_path, serde_json::to_vec_pretty(&meta)?).await?;
        Ok(())
    }

    /// Remove every cache entry. Returns the number of entries removed.
    pub async fn clear(&self) -> Result<usize, CacheError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
                continue;
            };
            if ext != BODY_EXT && ext != META_EXT {
                continue;
            }
            fs::remove_file(&path).await?;
            if ext == META_EXT {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
