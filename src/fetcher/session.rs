use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::fetcher::{
    backoff::calculate_backoff_delay,
    cache::{CacheError, CachedResponse, DiskCache},
    client::{MAX_ARCHIVE_SIZE, MAX_PAGE_SIZE, fetch_raw},
    errors::FetchError,
    pipeline::process_response,
    source::PageSource,
    types::PageResponse,
};

const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// HTTP session backed by a [`DiskCache`]. Successful responses are stored and
/// served from disk on every later request for the same URL.
#[derive(Debug, Clone)]
pub struct CachedSession {
    cache: DiskCache,
    max_retries: u32,
    backoff_base: Duration,
}

impl CachedSession {
    pub fn new(cache: DiskCache) -> Self {
        Self {
            cache,
            max_retries: 0,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }

    /// Extra attempts for errors where [`FetchError::should_retry`] holds.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn cache(&self) -> &DiskCache {
        &self.cache
    }

    pub async fn clear_cache(&self) -> Result<usize, CacheError> {
        self.cache.clear().await
    }

    #[instrument(skip_all, fields(url = %url))]
    async fn get(&self, url: &Url, max_body: u64) -> Result<CachedResponse, FetchError> {
        match self.cache.get(url).await {
            Ok(Some(hit)) => {
                debug!("cache hit");
                return Ok(hit);
            }
            Ok(None) => debug!("cache miss"),
            Err(e) => warn!(error = %e, "unreadable cache entry, refetching"),
        }

        let mut attempt = 0;
        let raw = loop {
            match fetch_raw(url, max_body).await {
                Ok(raw) => break raw,
                Err(e) if e.should_retry() && attempt < self.max_retries => {
                    let delay = calculate_backoff_delay(attempt, self.backoff_base);
                    warn!(error = %e, attempt = attempt + 1, ?delay, "retrying fetch");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let fetched_at = Utc::now();
        if let Err(e) = self.cache.put(url, &raw, fetched_at).await {
            warn!(error = %e, "failed to store response in cache");
        }
        Ok(CachedResponse { raw, fetched_at })
    }
}

#[async_trait]
impl PageSource for CachedSession {
    async fn fetch_page(&self, url: &Url) -> Result<PageResponse, FetchError> {
        let response = self.get(url, MAX_PAGE_SIZE).await?;
        process_response(response.raw, response.fetched_at)
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Bytes, FetchError> {
        let response = self.get(url, MAX_ARCHIVE_SIZE).await?;
        Ok(response.raw.body)
    }
}
