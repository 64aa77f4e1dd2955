use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, instrument};
use url::Url;

use crate::extractor::{
    NodeSelector, ParsedPage, SchemaMismatch, element_text, find, find_all, locator::describe,
    required_attr,
};
use crate::fetcher::{PageResponse, PageSource};
use crate::pipelines::{Pipeline, PipelineError, PipelineOutput, fetch_index};
use crate::table::{ResultTable, TableRow};

pub const KIND: &str = "latest-versions";
const VERSIONS_MARKER: &str = "All versions";

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Python (?P<version>\d\.\d+) \((?P<status>.*)\)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// `href` exactly as written in the sidebar.
    pub link: String,
    pub version: String,
    pub status: String,
}

impl TableRow for VersionRecord {
    const HEADER: &'static [&'static str] = &["link", "version", "status"];

    fn into_cells(self) -> Vec<String> {
        vec![self.link, self.version, self.status]
    }
}

/// Split a sidebar label like `Python 3.13 (stable)` into version and
/// status. Labels that don't follow that shape become the version verbatim
/// with an empty status.
pub fn parse_version_label(text: &str) -> (String, String) {
    match VERSION_PATTERN.captures(text) {
        Some(caps) => (caps["version"].to_string(), caps["status"].to_string()),
        None => (text.to_string(), String::new()),
    }
}

/// Lists documentation versions from the sidebar of the docs root page.
#[derive(Debug, Clone)]
pub struct LatestVersionsPipeline {
    docs_url: Url,
}

impl LatestVersionsPipeline {
    pub fn new(docs_url: Url) -> Self {
        Self { docs_url }
    }
}

#[async_trait]
impl Pipeline for LatestVersionsPipeline {
    fn kind(&self) -> &'static str {
        KIND
    }

    #[instrument(skip_all, fields(kind = KIND))]
    async fn run(&self, source: &dyn PageSource) -> Result<PipelineOutput, PipelineError> {
        let index = fetch_index(source, &self.docs_url).await?;
        let records = extract_versions(&index)?;
        info!(versions = records.len(), "found versions");

        Ok(PipelineOutput::Table(ResultTable::from_records(records)?))
    }
}

/// Version links of the docs sidebar, in page order.
pub fn extract_versions(index: &PageResponse) -> Result<Vec<VersionRecord>, PipelineError> {
    let page = ParsedPage::parse(index);
    let schema = |e: SchemaMismatch| PipelineError::schema(page.url())(e);

    let sidebar = find(
        page.root(),
        &NodeSelector::tag("div").attr("class", "sphinxsidebarwrapper"),
    )
    .map_err(schema)?;

    let versions_list = find_all(sidebar, &NodeSelector::tag("ul"))
        .into_iter()
        .find(|list| element_text(*list).contains(VERSIONS_MARKER))
        .ok_or_else(|| SchemaMismatch {
            selector: format!("<ul> containing {:?}", VERSIONS_MARKER),
            scope: describe(sidebar),
        })
        .map_err(schema)?;

    find_all(versions_list, &NodeSelector::tag("a"))
        .into_iter()
        .map(|anchor| {
            let link = required_attr(anchor, "href").map_err(schema)?.to_string();
            let (version, status) = parse_version_label(&element_text(anchor));
            Ok::<_, PipelineError>(VersionRecord {
                link,
                version,
                status,
            })
        })
        .collect()
}
