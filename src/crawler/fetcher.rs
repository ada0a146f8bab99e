//! Search API fetcher
//!
//! This module handles the page requests against the photo-search API:
//! - Building the shared HTTP client (timeouts, TLS policy)
//! - One authenticated GET per page with fixed paging parameters
//! - Mapping HTTP and decode failures onto [`CrawlError`]

use crate::config::ApiConfig;
use crate::photo::{decode_page, Photo};
use crate::CrawlError;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::time::Duration;

/// Photos requested per page
pub const PER_PAGE: u32 = 30;

/// Oldest-first ordering keeps earlier pages stable while new photos are
/// appended at the tail.
pub const ORDER_BY: &str = "oldest";

/// Source of result pages for a query
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Fetches one page of results; an empty vector means the query is exhausted
    async fn fetch_page(&self, query: &str, page: u64) -> Result<Vec<Photo>, CrawlError>;
}

/// Builds an HTTP client with proper configuration
///
/// The same client is shared by the fetcher and the downloader, so the TLS
/// policy applies to the API and to the image host alike.
///
/// # Arguments
///
/// * `config` - The API configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    if config.accept_invalid_certs {
        tracing::warn!("TLS certificate verification is disabled");
    }

    Client::builder()
        .user_agent(format!("photo-harvest/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches result pages from the HTTP search API
#[derive(Debug, Clone)]
pub struct HttpPhotoSource {
    client: Client,
    base_url: String,
    access_key: String,
}

impl HttpPhotoSource {
    pub fn new(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            access_key: config.access_key.clone(),
        }
    }

    /// Endpoint for a query: the base URL with the query appended as a path
    pub fn endpoint(&self, query: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            query.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl PhotoSource for HttpPhotoSource {
    async fn fetch_page(&self, query: &str, page: u64) -> Result<Vec<Photo>, CrawlError> {
        let url = self.endpoint(query);
        tracing::info!("Fetching {} page {}", url, page);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Client-ID {}", self.access_key))
            .query(&[
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
                ("order_by", ORDER_BY.to_string()),
            ])
            .send()
            .await
            .map_err(|e| CrawlError::Transport {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Search request for page {} returned {}", page, status);
            return Err(CrawlError::Request {
                url,
                status: status.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CrawlError::Transport {
                url: url.clone(),
                source: e,
            })?;

        let page_body = decode_page(&body)?;
        match page_body.total_pages() {
            Some(total) => tracing::info!("Page {}/{}: {} photos", page, total, page_body.len()),
            None => tracing::info!("Page {}: {} photos", page, page_body.len()),
        }

        Ok(page_body.into_photos())
    }
}
