//! Photo records returned by the search API
//!
//! The API answers in one of two shapes: listing endpoints return a bare JSON
//! array of photos, search endpoints wrap a reduced record in an envelope with
//! paging totals. Both decode into the same [`Photo`] type.

mod decode;
mod types;

pub use decode::{decode_page, PageBody};
pub use types::{Exif, Photo, PhotoLinks, PhotoUrls, SearchResult, SearchResults, Tag};
