use crate::fetcher::{errors::FetchError, types::RawResponse};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::instrument;
use url::Url;

/// Size cap for HTML pages.
pub const MAX_PAGE_SIZE: u64 = 5 * 1024 * 1024; // 5MB
/// Size cap for downloadable archives (the PDF documentation bundle is ~20MB).
pub const MAX_ARCHIVE_SIZE: u64 = 64 * 1024 * 1024;

const USER_AGENT: &str = concat!("docscrape/", env!("CARGO_PKG_VERSION"));

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("Failed to build HTTP client")
});

/// GET `url` and return the undecoded body. Non-2xx statuses and bodies
/// larger than `max_body` are errors.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_raw(url: &Url, max_body: u64) -> Result<RawResponse, FetchError> {
    let response = HTTP_CLIENT
        .get(url.clone())
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    // Check content length before downloading
    if let Some(content_length) = response.content_length()
        && content_length > max_body
    {
        return Err(FetchError::BodyTooLarge(content_length));
    }

    let url_final = response.url().clone();
    let status = response.status();

    if !status.is_success() {
        return Err(FetchError::from_status(status));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    let body = response
        .bytes()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    // Content-Length may be missing
    if body.len() as u64 > max_body {
        return Err(FetchError::BodyTooLarge(body.len() as u64));
    }

    Ok(RawResponse {
        url_final,
        status,
        content_type,
        body,
    })
}
