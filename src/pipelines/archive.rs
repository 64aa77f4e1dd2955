//! Persists the documentation archive found by the download pipeline.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::fetcher::PageSource;
use crate::pipelines::{ArchiveLink, PipelineError};

/// Fetch `link` and write it to `dir/<filename>`, creating `dir` if needed.
pub async fn save_archive(
    source: &dyn PageSource,
    link: &ArchiveLink,
    dir: &Path,
) -> Result<PathBuf, PipelineError> {
    let path = dir.join(&link.filename);
    let write_err = |source: std::io::Error| PipelineError::ArchiveWrite {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(dir).await.map_err(write_err)?;

    let bytes = source
        .fetch_bytes(&link.url)
        .await
        .map_err(|source| PipelineError::ArchiveFetch {
            url: link.url.clone(),
            source,
        })?;

    fs::write(&path, &bytes).await.map_err(write_err)?;
    info!(path = %path.display(), bytes = bytes.len(), "archive saved");
    Ok(path)
}
