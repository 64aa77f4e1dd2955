use reqwest::StatusCode;
use thiserror::Error;

/// Why a page or archive could not be obtained.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    TooManyRedirects,

    /// 5xx, or 429: the server may answer on a later attempt.
    #[error("server unavailable: {0}")]
    ServerUnavailable(StatusCode),

    /// Any other non-2xx answer, e.g. a PEP page that does not exist.
    #[error("http status {0}")]
    Status(StatusCode),

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("charset error: {0}")]
    Charset(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    /// Classify a non-2xx status.
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Self::ServerUnavailable(status)
        } else {
            Self::Status(status)
        }
    }

    /// The HTTP status behind the error, when there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::ServerUnavailable(status) | Self::Status(status) => Some(*status),
            _ => None,
        }
    }

    pub fn should_retry(&self) -> bool {
        match self {
            Self::Connect(_)
            | Self::ConnectTimeout
            | Self::RequestTimeout
            | Self::ServerUnavailable(_)
            | Self::Body(_) => true,

            // the same request gets the same answer
            Self::TooManyRedirects
            | Self::Status(_)
            | Self::BodyTooLarge(_)
            | Self::UnsupportedContentType(_)
            | Self::Charset(_)
            | Self::Unknown(_) => false,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::TooManyRedirects
        } else if let Some(status) = err.status() {
            Self::from_status(status)
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Body(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}
