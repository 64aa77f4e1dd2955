pub mod backoff;
pub mod cache;
pub mod client;
pub mod errors;
pub mod pipeline;
pub mod session;
pub mod source;
pub mod types;

pub use cache::{CacheError, DiskCache};
pub use client::fetch_raw;
pub use errors::FetchError;
pub use session::CachedSession;
pub use source::PageSource;
pub use types::{Charset, PageResponse, RawResponse};
