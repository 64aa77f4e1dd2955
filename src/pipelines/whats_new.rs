use async_trait::async_trait;
use tracing::{debug, info, instrument};
use url::Url;

use crate::extractor::{
    NodeSelector, ParsedPage, SchemaMismatch, element_text, find, find_all, newlines_to_spaces,
    required_attr,
};
use crate::fetcher::{PageResponse, PageSource};
use crate::pipelines::{
    Pipeline, PipelineError, PipelineOutput, fetch_entry, fetch_index, resolve, root_join,
};
use crate::table::{ResultTable, TableRow};

pub const KIND: &str = "whats-new";
const INDEX_PATH: &str = "whatsnew/";

/// One "What's New" article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub url: Url,
    pub title: String,
    /// Editors/authors block with line breaks flattened to spaces.
    pub summary: String,
}

impl TableRow for ArticleRecord {
    const HEADER: &'static [&'static str] = &["link", "title", "editors/authors summary"];

    fn into_cells(self) -> Vec<String> {
        vec![self.url.to_string(), self.title, self.summary]
    }
}

/// Collects every article linked from the "What's New" index.
#[derive(Debug, Clone)]
pub struct WhatsNewPipeline {
    docs_url: Url,
}

impl WhatsNewPipeline {
    pub fn new(docs_url: Url) -> Self {
        Self { docs_url }
    }

    pub fn index_url(&self) -> Url {
        root_join(&self.docs_url, INDEX_PATH)
    }
}

#[async_trait]
impl Pipeline for WhatsNewPipeline {
    fn kind(&self) -> &'static str {
        KIND
    }

    #[instrument(skip_all, fields(kind = KIND))]
    async fn run(&self, source: &dyn PageSource) -> Result<PipelineOutput, PipelineError> {
        let index_url = self.index_url();
        let index = fetch_index(source, &index_url).await?;
        let links = article_links(&index)?;
        info!(articles = links.len(), "found articles");

        let mut table = ResultTable::for_rows::<ArticleRecord>();
        for link in links {
            let Some(detail) = fetch_entry(source, &link).await else {
                continue;
            };
            let record = parse_article(link, &detail)?;
            debug!(title = %record.title, "parsed article");
            table.push_record(record)?;
        }

        Ok(PipelineOutput::Table(table))
    }
}

fn article_links(index: &PageResponse) -> Result<Vec<Url>, PipelineError> {
    let page = ParsedPage::parse(index);
    let schema = |e: SchemaMismatch| PipelineError::schema(page.url())(e);

    let section = find(
        page.root(),
        &NodeSelector::tag("section").attr("id", "what-s-new-in-python"),
    )
    .map_err(schema)?;
    let wrapper = find(
        section,
        &NodeSelector::tag("div").attr("class", "toctree-wrapper"),
    )
    .map_err(schema)?;

    find_all(wrapper, &NodeSelector::tag("li").attr("class", "toctree-l1"))
        .into_iter()
        .map(|item| {
            let anchor = find(item, &NodeSelector::tag("a")).map_err(schema)?;
            let href = required_attr(anchor, "href").map_err(schema)?;
            resolve(page.url(), href)
        })
        .collect()
}

fn parse_article(url: Url, detail: &PageResponse) -> Result<ArticleRecord, PipelineError> {
    let page = ParsedPage::parse(detail);
    let schema = |e: SchemaMismatch| PipelineError::schema(page.url())(e);

    let heading = find(page.root(), &NodeSelector::tag("h1")).map_err(schema)?;
    let credits = find(page.root(), &NodeSelector::tag("dl")).map_err(schema)?;

    Ok(ArticleRecord {
        url,
        title: element_text(heading),
        summary: newlines_to_spaces(&element_text(credits)),
    })
}
