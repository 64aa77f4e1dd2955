#![no_main]

use bytes::Bytes;
use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use reqwest::StatusCode;
use url::Url;

use docscrape::fetcher::types::{Charset, PageResponse};
use docscrape::pipelines::{pep, versions};

fn response(url: &str, html: &str) -> PageResponse {
    PageResponse {
        url_final: Url::parse(url).unwrap(),
        status: StatusCode::OK,
        content_type: "text/html".to_string(),
        body_raw: Bytes::from(html.to_string()),
        body_utf8: html.to_string(),
        charset: Charset::Utf8,
        fetched_at: Utc::now(),
    }
}

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);

    // Parsing may fail with a schema mismatch but must never panic
    let _ = pep::index_entries(&response("https://peps.python.org/", &html));
    let _ = pep::detail_status(&response("https://peps.python.org/pep-0008/", &html));
    let _ = versions::extract_versions(&response("https://docs.python.org/3/", &html));

    // Anchor texts reach the label parser verbatim
    let (version, status) = versions::parse_version_label(&html);
    assert!(html.contains(version.as_str()));
    assert!(html.contains(status.as_str()));
});
