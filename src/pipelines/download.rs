use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, instrument};
use url::Url;

use crate::extractor::{NodeSelector, ParsedPage, SchemaMismatch, find, required_attr};
use crate::fetcher::{PageResponse, PageSource};
use crate::pipelines::{Pipeline, PipelineError, PipelineOutput, fetch_index, resolve, root_join};

pub const KIND: &str = "download";
const DOWNLOADS_PATH: &str = "download.html";

// Matched by suffix: the version embedded in the filename changes every release.
static ARCHIVE_HREF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".+pdf-a4\.zip$").unwrap());

/// Absolute location of the A4 PDF documentation archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLink {
    pub url: Url,
    /// Last `/`-separated segment of `url`.
    pub filename: String,
}

impl ArchiveLink {
    pub fn from_url(url: Url) -> Self {
        let filename = url
            .as_str()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self { url, filename }
    }
}

/// Finds the A4 PDF archive link on the downloads page.
#[derive(Debug, Clone)]
pub struct DownloadPipeline {
    docs_url: Url,
}

impl DownloadPipeline {
    pub fn new(docs_url: Url) -> Self {
        Self { docs_url }
    }

    pub fn downloads_url(&self) -> Url {
        root_join(&self.docs_url, DOWNLOADS_PATH)
    }
}

#[async_trait]
impl Pipeline for DownloadPipeline {
    fn kind(&self) -> &'static str {
        KIND
    }

    #[instrument(skip_all, fields(kind = KIND))]
    async fn run(&self, source: &dyn PageSource) -> Result<PipelineOutput, PipelineError> {
        let downloads_url = self.downloads_url();
        let page = fetch_index(source, &downloads_url).await?;
        let link = locate_archive(&page)?;
        info!(url = %link.url, filename = %link.filename, "found archive link");

        Ok(PipelineOutput::Archive(link))
    }
}

fn locate_archive(downloads: &PageResponse) -> Result<ArchiveLink, PipelineError> {
    let page = ParsedPage::parse(downloads);
    let schema = |e: SchemaMismatch| PipelineError::schema(page.url())(e);

    let main = find(page.root(), &NodeSelector::tag("div").attr("role", "main")).map_err(schema)?;
    let table = find(main, &NodeSelector::tag("table").attr("class", "docutils")).map_err(schema)?;
    let anchor = find(
        table,
        &NodeSelector::tag("a").attr_pattern("href", ARCHIVE_HREF.clone()),
    )
    .map_err(schema)?;
    let href = required_attr(anchor, "href").map_err(schema)?;

    Ok(ArchiveLink::from_url(resolve(page.url(), href)?))
}
