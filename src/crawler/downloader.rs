//! Image downloader
//!
//! Downloads the raw image of a photo into the artifact directory unless a
//! file for the same identity is already there.

use crate::config::OutputConfig;
use crate::photo::Photo;
use crate::storage::{normalize_identity, ArtifactStore};
use crate::CrawlError;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Forces the image host to encode the response as PNG
pub const FORCED_FORMAT: &str = "&fm=png";

/// Result of a successful download call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The image was fetched and written
    Downloaded {
        path: PathBuf,
        bytes: u64,
        /// Caption file written alongside, if captions are enabled
        caption: Option<PathBuf>,
    },

    /// An image with the same normalized identity already existed
    AlreadyPresent { path: PathBuf },
}

/// Per-download settings taken from the output configuration
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Query-string fragment appended to the raw URL
    pub image_query: String,
    pub caption_prefix: String,
    pub captions: bool,
}

impl From<&OutputConfig> for DownloadOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            image_query: config.image_query.clone(),
            caption_prefix: config.caption_prefix.clone(),
            captions: config.captions,
        }
    }
}

/// Stores the image of a single photo
#[async_trait]
pub trait ImageDownloader: Send + Sync {
    async fn download(&self, photo: &Photo) -> Result<DownloadOutcome, CrawlError>;
}

/// Builds the image request URL from a raw source URL
///
/// The raw URL already carries a query string, so the fragment is appended
/// verbatim.
pub fn image_url(raw: &str, image_query: &str) -> String {
    format!("{}{}{}", raw, image_query, FORCED_FORMAT)
}

/// Caption file content: prefix and description, comma-terminated
pub fn caption_line(prefix: &str, description: &str) -> String {
    format!("{}{},", prefix, description)
}

/// Downloads images over HTTP into an [`ArtifactStore`]
#[derive(Debug, Clone)]
pub struct HttpImageDownloader {
    client: Client,
    store: ArtifactStore,
    options: DownloadOptions,
}

impl HttpImageDownloader {
    pub fn new(client: Client, store: ArtifactStore, options: DownloadOptions) -> Self {
        Self {
            client,
            store,
            options,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }
}

#[async_trait]
impl ImageDownloader for HttpImageDownloader {
    /// Downloads a photo unless it is already stored
    ///
    /// # Request Flow
    ///
    /// 1. Normalize the identity into a file stem
    /// 2. If `<stem>.png` exists → `AlreadyPresent`, no request is made
    /// 3. GET `raw + image_query + "&fm=png"`
    /// 4. Stream the body into `<stem>.png.part`
    /// 5. Rename it to `<stem>.png` once the body is complete
    /// 6. If captions are enabled, write `<stem>.caption`
    async fn download(&self, photo: &Photo) -> Result<DownloadOutcome, CrawlError> {
        let stem = normalize_identity(&photo.id);
        let path = self.store.image_path(&stem);

        if self.store.has_image(&stem).await {
            tracing::debug!("Photo {} already downloaded", path.display());
            return Ok(DownloadOutcome::AlreadyPresent { path });
        }

        let raw = photo
            .urls
            .raw
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| CrawlError::MissingSource {
                id: photo.id.clone(),
            })?;
        let url = image_url(raw, &self.options.image_query);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CrawlError::Transport {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Download {
                id: photo.id.clone(),
                status_code: status.as_u16(),
            });
        }

        let partial = self.store.partial_path(&stem);
        let mut file = self.store.create_partial(&stem).await?;
        let streamed = stream_to_file(&mut file, response, &url, &partial).await;
        drop(file);

        let bytes = match streamed {
            Ok(bytes) => bytes,
            Err(e) => {
                self.store.discard_partial(&stem).await;
                return Err(e);
            }
        };

        if !self.store.commit_image(&stem).await? {
            tracing::debug!("Photo {} appeared during download", path.display());
            return Ok(DownloadOutcome::AlreadyPresent { path });
        }
        tracing::info!("Downloaded {} ({} bytes)", photo.id, bytes);

        let caption = if self.options.captions {
            let text = caption_line(&self.options.caption_prefix, photo.caption_text());
            Some(self.store.write_caption(&stem, &text).await?)
        } else {
            None
        };

        Ok(DownloadOutcome::Downloaded {
            path,
            bytes,
            caption,
        })
    }
}

/// Streams response body to file, returning bytes written
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, CrawlError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| CrawlError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| CrawlError::storage(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| CrawlError::storage(file_path, e))?;

    Ok(bytes_written)
}
