//! Extraction pipelines, one per CLI mode.
//!
//! Every pipeline fetches one index page (a failure there aborts the run),
//! walks its entries in document order and, where entries link to detail
//! pages, fetches those one at a time. A failed detail fetch only skips that
//! entry. A page that lacks an expected node aborts the run with
//! [`PipelineError::Schema`].
//!
//! HTML is parsed inside synchronous helpers that return owned values, so
//! no DOM is alive across an `.await`.

pub mod archive;
pub mod download;
pub mod pep;
pub mod registry;
pub mod status;
pub mod versions;
pub mod whats_new;

#[cfg(test)]
pub(crate) mod test_support;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, warn};
use url::Url;

use crate::extractor::SchemaMismatch;
use crate::fetcher::{FetchError, PageResponse, PageSource};
use crate::table::{ResultTable, TableError};

pub use download::{ArchiveLink, DownloadPipeline};
pub use pep::{PepPipeline, SpecStatusCount};
pub use registry::PipelineRegistry;
pub use versions::{LatestVersionsPipeline, VersionRecord};
pub use whats_new::{ArticleRecord, WhatsNewPipeline};

/// Mode names, in the order they are offered on the command line.
pub const KINDS: [&str; 4] = [whats_new::KIND, versions::KIND, download::KIND, pep::KIND];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutput {
    Table(ResultTable),
    Archive(ArchiveLink),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("index page {url} unavailable: {source}")]
    IndexUnavailable { url: Url, source: FetchError },

    #[error("page {url} does not have the expected layout: {source}")]
    Schema { url: Url, source: SchemaMismatch },

    #[error("cannot resolve link {href:?} against {base}: {source}")]
    BadLink {
        base: Url,
        href: String,
        source: url::ParseError,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("archive download from {url} failed: {source}")]
    ArchiveFetch { url: Url, source: FetchError },

    #[error("failed to save archive to {path}: {source}")]
    ArchiveWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unknown mode: {0}")]
    UnknownKind(String),
}

impl PipelineError {
    pub fn schema(url: &Url) -> impl FnOnce(SchemaMismatch) -> Self + '_ {
        move |source| Self::Schema {
            url: url.clone(),
            source,
        }
    }
}

/// One extraction mode.
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Mode name used on the command line
    fn kind(&self) -> &'static str;

    async fn run(&self, source: &dyn PageSource) -> Result<PipelineOutput, PipelineError>;
}

/// Fetch a pipeline's root page. Failure is fatal for the run.
pub(crate) async fn fetch_index(
    source: &dyn PageSource,
    url: &Url,
) -> Result<PageResponse, PipelineError> {
    source.fetch_page(url).await.map_err(|e| {
        error!(url = %url, error = %e, "index page unavailable");
        PipelineError::IndexUnavailable {
            url: url.clone(),
            source: e,
        }
    })
}

/// Fetch one entry's detail page; `None` means the entry is skipped.
pub(crate) async fn fetch_entry(source: &dyn PageSource, url: &Url) -> Option<PageResponse> {
    match source.fetch_page(url).await {
        Ok(response) => Some(response),
        Err(e) => {
            warn!(url = %url, error = %e, "skipping entry, detail page unavailable");
            None
        }
    }
}

pub(crate) fn resolve(base: &Url, href: &str) -> Result<Url, PipelineError> {
    base.join(href).map_err(|source| PipelineError::BadLink {
        base: base.clone(),
        href: href.to_string(),
        source,
    })
}

/// Resolve a fixed relative path under a configured root.
pub(crate) fn root_join(root: &Url, path: &str) -> Url {
    // roots are validated to end with '/', and the paths are constants
    root.join(path).unwrap_or_else(|_| root.clone())
}
