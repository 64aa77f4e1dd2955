use scraper::{ElementRef, Html};
use url::Url;

use crate::fetcher::PageResponse;

/// A fetched page parsed into a DOM, remembering the URL it came from so
/// relative links can be resolved against it.
///
/// `scraper::Html` is not `Send`; parse, extract owned values and drop the
/// page before the next `.await`.
pub struct ParsedPage {
    url: Url,
    document: Html,
}

impl ParsedPage {
    pub fn parse(response: &PageResponse) -> Self {
        Self::from_html(response.url_final.clone(), &response.body_utf8)
    }

    pub fn from_html(url: Url, html: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(html),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.document.root_element()
    }
}

/// Concatenated text of an element and all of its descendants.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Replace every line break with a single space.
pub fn newlines_to_spaces(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
