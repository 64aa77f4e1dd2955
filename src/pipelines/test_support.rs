use bytes::Bytes;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use url::Url;

use crate::fetcher::source::MockPageSource;
use crate::fetcher::{Charset, FetchError, PageResponse};

pub fn page(url: &Url, html: &str) -> PageResponse {
    PageResponse {
        url_final: url.clone(),
        status: StatusCode::OK,
        content_type: "text/html; charset=utf-8".to_string(),
        body_raw: Bytes::from(html.to_string()),
        body_utf8: html.to_string(),
        charset: Charset::Utf8,
        fetched_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// A mocked site serving `pages` by absolute URL; anything else is a 404.
pub fn site(pages: &[(&str, &str)]) -> MockPageSource {
    let pages: HashMap<String, String> = pages
        .iter()
        .map(|(url, html)| (url.to_string(), html.to_string()))
        .collect();

    let mut source = MockPageSource::new();
    source.expect_fetch_page().returning(move |url| {
        pages
            .get(url.as_str())
            .map(|html| page(url, html))
            .ok_or(FetchError::Status(StatusCode::NOT_FOUND))
    });
    source
}

/// One recorded tracing event, fields rendered to strings.
#[derive(Debug, Clone, Default)]
pub struct CapturedEvent {
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn message(&self) -> Option<&str> {
        self.fields.get("message").map(String::as_str)
    }
}

struct EventFieldVisitor<'a> {
    fields: &'a mut HashMap<String, String>,
}

impl Visit for EventFieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{value:?}"));
    }
}

struct EventCaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for EventCaptureLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut captured = CapturedEvent::default();
        event.record(&mut EventFieldVisitor {
            fields: &mut captured.fields,
        });
        self.events.lock().unwrap().push(captured);
    }
}

/// Collects every event logged while its subscriber is the default.
#[derive(Clone, Default)]
pub struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCapture {
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + 'static {
        tracing_subscriber::registry()
            .with(LevelFilter::DEBUG)
            .with(EventCaptureLayer {
                events: Arc::clone(&self.events),
            })
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// First event logged with `message`.
    pub fn find(&self, message: &str) -> Option<CapturedEvent> {
        self.events()
            .into_iter()
            .find(|event| event.message() == Some(message))
    }
}
