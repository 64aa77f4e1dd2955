use crate::fetcher::{
    errors::FetchError,
    types::{Charset, PageResponse, RawResponse},
};
use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

pub fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml")
}

/// Turn a raw response into a decoded HTML page. Non-HTML bodies are rejected.
pub fn process_response(
    raw: RawResponse,
    fetched_at: DateTime<Utc>,
) -> Result<PageResponse, FetchError> {
    if !is_html(&raw.content_type) {
        return Err(FetchError::UnsupportedContentType(raw.content_type));
    }

    let charset = detect_charset(&raw.content_type, &raw.body)?;
    let body_utf8 = decode_to_utf8(&raw.body, &charset)?;

    Ok(PageResponse {
        url_final: raw.url_final,
        status: raw.status,
        content_type: raw.content_type,
        body_raw: raw.body,
        body_utf8,
        charset,
        fetched_at,
    })
}

fn label_from(captures: Option<regex::Captures<'_>>) -> Option<&'static Encoding> {
    let name = captures?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(name.as_bytes())
}

fn detect_charset(content_type: &str, body_bytes: &[u8]) -> Result<Charset, FetchError> {
    // 1. Content-Type header
    if let Some(encoding) = label_from(CHARSET_REGEX.captures(content_type)) {
        return Ok(Charset::from_encoding(encoding));
    }

    // 2. <meta> declarations in the first 4KB
    let search_bytes = &body_bytes[..body_bytes.len().min(4096)];
    let search_str = String::from_utf8_lossy(search_bytes);

    if let Some(encoding) = label_from(META_CHARSET_REGEX.captures(&search_str)) {
        return Ok(Charset::from_encoding(encoding));
    }
    if let Some(encoding) = label_from(META_HTTP_EQUIV_REGEX.captures(&search_str)) {
        return Ok(Charset::from_encoding(encoding));
    }

    // 3. Heuristic detection
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, false);
    let detected = detector.guess(None, true);

    Ok(Charset::from_encoding(detected))
}

fn decode_to_utf8(body_bytes: &[u8], charset: &Charset) -> Result<String, FetchError> {
    let encoding = match charset {
        Charset::Utf8 => encoding_rs::UTF_8,
        Charset::Latin1 | Charset::Iso88591 => encoding_rs::WINDOWS_1252,
        Charset::Windows1252 => encoding_rs::WINDOWS_1252,
        Charset::ShiftJis => encoding_rs::SHIFT_JIS,
        Charset::Gb2312 => encoding_rs::GBK,
        Charset::Big5 => encoding_rs::BIG5,
        Charset::Other(name) => Encoding::for_label(name.as_bytes()).unwrap_or(encoding_rs::UTF_8),
    };

    let (decoded, _encoding, had_errors) = encoding.decode(body_bytes);

    if had_errors {
        return Err(FetchError::Charset(format!(
            "Failed to decode content with encoding: {}",
            encoding.name()
        )));
    }

    Ok(decoded.into_owned())
}
