use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::fetcher::{errors::FetchError, types::PageResponse};

/// Where pipelines get their pages from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch an HTML page, decoded to UTF-8.
    async fn fetch_page(&self, url: &Url) -> Result<PageResponse, FetchError>;

    /// Fetch any resource as raw bytes.
    async fn fetch_bytes(&self, url: &Url) -> Result<Bytes, FetchError>;
}
