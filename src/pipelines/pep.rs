use async_trait::async_trait;
use scraper::ElementRef;
use tracing::{info, instrument, warn};
use url::Url;

use crate::extractor::{
    NodeSelector, ParsedPage, SchemaMismatch, element_text, find, find_all, locator::describe,
    required_attr,
};
use crate::fetcher::{PageResponse, PageSource};
use crate::pipelines::status::{Reconciliation, preview_code, reconcile};
use crate::pipelines::{Pipeline, PipelineError, PipelineOutput, fetch_entry, fetch_index, resolve};
use crate::table::{ResultTable, TableRow};

pub const KIND: &str = "pep";
const TOTAL_LABEL: &str = "Total";
const STATUS_LABEL: &str = "Status:";

/// One line of the status summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecStatusCount {
    pub status: String,
    pub count: usize,
}

impl TableRow for SpecStatusCount {
    const HEADER: &'static [&'static str] = &["status", "count"];

    fn into_cells(self) -> Vec<String> {
        vec![self.status, self.count.to_string()]
    }
}

/// Per-status counts in first-seen order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusTally {
    counts: Vec<SpecStatusCount>,
}

impl StatusTally {
    pub fn record(&mut self, status: &str) {
        match self.counts.iter_mut().find(|entry| entry.status == status) {
            Some(entry) => entry.count += 1,
            None => self.counts.push(SpecStatusCount {
                status: status.to_string(),
                count: 1,
            }),
        }
    }

    pub fn get(&self, status: &str) -> usize {
        self.counts
            .iter()
            .find(|entry| entry.status == status)
            .map_or(0, |entry| entry.count)
    }

    /// Number of recorded entries, across all statuses.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|entry| entry.count).sum()
    }

    pub fn into_counts(self) -> Vec<SpecStatusCount> {
        self.counts
    }
}

/// A data row of the numerical index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Status letter of the abbreviation cell, `""` when the cell has none.
    pub code: String,
    pub url: Url,
}

/// Counts PEPs per status as stated on each PEP's own page, and reports
/// entries whose index abbreviation disagrees with it.
#[derive(Debug, Clone)]
pub struct PepPipeline {
    peps_url: Url,
}

impl PepPipeline {
    pub fn new(peps_url: Url) -> Self {
        Self { peps_url }
    }
}

#[async_trait]
impl Pipeline for PepPipeline {
    fn kind(&self) -> &'static str {
        KIND
    }

    #[instrument(skip_all, fields(kind = KIND))]
    async fn run(&self, source: &dyn PageSource) -> Result<PipelineOutput, PipelineError> {
        let index = fetch_index(source, &self.peps_url).await?;
        let entries = index_entries(&index)?;
        let data_rows = entries.len();
        info!(entries = data_rows, "found index entries");

        let mut tally = StatusTally::default();
        let mut mismatches = 0;
        for entry in entries {
            let Some(detail) = fetch_entry(source, &entry.url).await else {
                continue;
            };
            let status = detail_status(&detail)?;
            tally.record(&status);

            if let Some(Reconciliation::Mismatch { .. }) = check_status(&entry, &status) {
                mismatches += 1;
            }
        }
        info!(
            processed = tally.total(),
            skipped = data_rows - tally.total(),
            mismatches,
            "status reconciliation finished"
        );

        let mut table = ResultTable::from_records(tally.into_counts())?;
        // Total is the index row count, not the number of pages fetched.
        table.push_record(SpecStatusCount {
            status: TOTAL_LABEL.to_string(),
            count: data_rows,
        })?;

        Ok(PipelineOutput::Table(table))
    }
}

/// Compare an entry's preview code with its page status, logging any
/// disagreement. Entries without a status letter are not checked.
fn check_status(entry: &IndexEntry, status: &str) -> Option<Reconciliation> {
    if entry.code.is_empty() {
        return None;
    }

    let outcome = reconcile(&entry.code, status);
    match &outcome {
        Reconciliation::Consistent => {}
        Reconciliation::Mismatch { expected } => {
            warn!(
                url = %entry.url,
                status = %status,
                ?expected,
                "status mismatch"
            );
        }
        Reconciliation::UnknownCode => {
            warn!(url = %entry.url, code = %entry.code, status = %status, "unknown preview status code");
        }
    }
    Some(outcome)
}

/// Data rows of the numerical index, in page order.
pub fn index_entries(index: &PageResponse) -> Result<Vec<IndexEntry>, PipelineError> {
    let page = ParsedPage::parse(index);
    let schema = |e: SchemaMismatch| PipelineError::schema(page.url())(e);

    let section = find(
        page.root(),
        &NodeSelector::tag("section").attr("id", "numerical-index"),
    )
    .map_err(schema)?;
    let table = find(section, &NodeSelector::tag("table")).map_err(schema)?;

    // first row is the column header
    find_all(table, &NodeSelector::tag("tr"))
        .into_iter()
        .skip(1)
        .map(|row| {
            let abbr = find(row, &NodeSelector::tag("abbr")).map_err(schema)?;
            let anchor = find(row, &NodeSelector::tag("a")).map_err(schema)?;
            let href = required_attr(anchor, "href").map_err(schema)?;
            Ok::<_, PipelineError>(IndexEntry {
                code: preview_code(&element_text(abbr)).to_string(),
                url: resolve(page.url(), href)?,
            })
        })
        .collect()
}

/// The status phrase of a PEP page.
pub fn detail_status(detail: &PageResponse) -> Result<String, PipelineError> {
    let page = ParsedPage::parse(detail);
    let schema = |e: SchemaMismatch| PipelineError::schema(page.url())(e);

    let content = find(
        page.root(),
        &NodeSelector::tag("section").attr("id", "pep-content"),
    )
    .map_err(schema)?;
    let fields = find(
        content,
        &NodeSelector::tag("dl").attr("class", "rfc2822 field-list simple"),
    )
    .map_err(schema)?;

    status_value(fields)
        .map(|value| element_text(value).trim().to_string())
        .ok_or_else(|| SchemaMismatch {
            selector: format!("<dt>{}</dt> with a value", STATUS_LABEL),
            scope: describe(fields),
        })
        .map_err(schema)
}

/// The element following the `Status:` term; the whitespace node between
/// the term and its definition is skipped.
fn status_value(fields: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let label = fields
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| {
            child.value().name() == "dt" && element_text(*child).trim() == STATUS_LABEL
        })?;
    label.next_siblings().find_map(ElementRef::wrap)
}
