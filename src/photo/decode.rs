//! Decoding of search responses
//!
//! Decoding tries the listing shape first and falls back to the search
//! envelope only when the body is not a photo array.

use crate::photo::types::{Photo, SearchResults};
use crate::CrawlError;

/// A decoded response body in whichever shape the endpoint used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBody {
    /// Bare array returned by listing endpoints
    Listing(Vec<Photo>),

    /// Envelope returned by search endpoints
    Search(SearchResults),
}

impl PageBody {
    /// Number of photos on this page
    pub fn len(&self) -> usize {
        match self {
            Self::Listing(photos) => photos.len(),
            Self::Search(envelope) => envelope.results.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of result pages, when the shape reports it
    pub fn total_pages(&self) -> Option<u64> {
        match self {
            Self::Listing(_) => None,
            Self::Search(envelope) => Some(envelope.total_pages),
        }
    }

    /// Flattens the body into photos, preserving response order
    pub fn into_photos(self) -> Vec<Photo> {
        match self {
            Self::Listing(photos) => photos,
            Self::Search(envelope) => envelope.results.into_iter().map(Photo::from).collect(),
        }
    }
}

/// Decodes a search response body
///
/// # Returns
///
/// * `Ok(PageBody)` - The body matched one of the two known shapes
/// * `Err(CrawlError::Parse)` - The body matched neither shape
///
/// # Example
///
/// ```
/// use photo_harvest::photo::decode_page;
///
/// let body = br#"{"total": 1, "total_pages": 1, "results": [
///     {"id": "abc", "alt_description": "a cat", "urls": {"raw": "https://img/abc?x=1"}}
/// ]}"#;
/// let photos = decode_page(body).unwrap().into_photos();
/// assert_eq!(photos[0].id, "abc");
/// ```
pub fn decode_page(body: &[u8]) -> Result<PageBody, CrawlError> {
    let listing_err = match serde_json::from_slice::<Vec<Photo>>(body) {
        Ok(photos) => return Ok(PageBody::Listing(photos)),
        Err(e) => e,
    };

    match serde_json::from_slice::<SearchResults>(body) {
        Ok(envelope) => Ok(PageBody::Search(envelope)),
        Err(envelope_err) => Err(CrawlError::Parse(format!(
            "not a photo list ({}) nor a search envelope ({})",
            listing_err, envelope_err
        ))),
    }
}
