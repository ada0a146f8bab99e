//! Filesystem-backed artifact directory

use crate::CrawlError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Extension of downloaded images
pub const IMAGE_EXTENSION: &str = "png";

/// Extension of companion caption files
pub const CAPTION_EXTENSION: &str = "caption";

/// Suffix of an image that is still being downloaded
pub const PARTIAL_EXTENSION: &str = "part";

/// Maps a photo identity onto a filename-safe stem
///
/// ASCII letters, digits and `_` are kept; everything else (the `-` that
/// photo ids commonly contain, path separators, dots) becomes `_`. An empty
/// id maps to `_`.
///
/// The mapping is lossy: `a-b`, `a.b` and `a_b` share one stem, so whichever
/// photo is stored first wins and the others are skipped as already present.
/// API ids only use `[A-Za-z0-9_-]`, where this matches a plain `-` to `_`
/// replacement.
///
/// # Example
///
/// ```
/// use photo_harvest::storage::normalize_identity;
///
/// assert_eq!(normalize_identity("Dwu8-5P9SOIk"), "Dwu8_5P9SOIk");
/// assert_eq!(normalize_identity("../etc"), "___etc");
/// ```
pub fn normalize_identity(id: &str) -> String {
    if id.is_empty() {
        return "_".to_string();
    }

    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Directory holding downloaded images and captions
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory; succeeds if it already exists
    pub async fn ensure_dir(&self) -> Result<(), CrawlError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CrawlError::storage(&self.root, e))
    }

    pub fn image_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{}.{}", stem, IMAGE_EXTENSION))
    }

    pub fn caption_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{}.{}", stem, CAPTION_EXTENSION))
    }

    /// Returns true if an image for this stem was already stored
    pub async fn has_image(&self, stem: &str) -> bool {
        fs::metadata(self.image_path(stem)).await.is_ok()
    }

    /// Staging file an image is streamed into before it is committed
    pub fn partial_path(&self, stem: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}.{}", stem, IMAGE_EXTENSION, PARTIAL_EXTENSION))
    }

    /// Opens the staging file for an image, truncating any stale leftover
    ///
    /// A download that is cancelled mid-body only ever leaves this file
    /// behind, never `<stem>.png`, so the existence check stays truthful.
    pub async fn create_partial(&self, stem: &str) -> Result<File, CrawlError> {
        let path = self.partial_path(stem);
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|e| CrawlError::storage(path, e))
    }

    /// Moves a fully written staging file into place
    ///
    /// Returns `Ok(false)` and drops the staging file when the image appeared
    /// in the meantime; an existing image is never overwritten.
    pub async fn commit_image(&self, stem: &str) -> Result<bool, CrawlError> {
        if self.has_image(stem).await {
            self.discard_partial(stem).await;
            return Ok(false);
        }

        let path = self.image_path(stem);
        fs::rename(self.partial_path(stem), &path)
            .await
            .map_err(|e| CrawlError::storage(path, e))?;
        Ok(true)
    }

    /// Removes the staging file of an abandoned download
    pub async fn discard_partial(&self, stem: &str) {
        let path = self.partial_path(stem);
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!("Failed to remove partial file {}: {}", path.display(), e);
            }
        }
    }

    /// Writes (or rewrites) the caption file for this stem
    pub async fn write_caption(&self, stem: &str, text: &str) -> Result<PathBuf, CrawlError> {
        let path = self.caption_path(stem);
        let mut file = File::create(&path)
            .await
            .map_err(|e| CrawlError::storage(&path, e))?;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| CrawlError::storage(&path, e))?;
        file.flush()
            .await
            .map_err(|e| CrawlError::storage(&path, e))?;
        Ok(path)
    }
}
