use serde::{Deserialize, Deserializer};

/// A photo discovered on a result page
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Photo {
    /// Opaque identity assigned by the API; empty when the item has none
    #[serde(default)]
    pub id: String,

    /// Human-written description, used as caption text
    #[serde(rename = "alt_description", default)]
    pub description: Option<String>,

    /// Source URLs keyed by resolution tier
    #[serde(default, deserialize_with = "null_as_default")]
    pub urls: PhotoUrls,

    #[serde(default, deserialize_with = "null_as_default")]
    pub links: PhotoLinks,

    #[serde(default, deserialize_with = "null_as_default")]
    pub exif: Exif,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
}

impl Photo {
    /// Returns the caption text, empty when the photo has no description
    pub fn caption_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Returns the tag titles in response order
    pub fn tag_titles(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.title.as_str())
    }
}

/// Candidate source URLs, one per resolution tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PhotoUrls {
    /// Original upload; accepts imgix resize parameters
    pub raw: Option<String>,
    pub full: Option<String>,
    pub regular: Option<String>,
    pub small: Option<String>,
    pub thumb: Option<String>,
    pub small_s3: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PhotoLinks {
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    pub html: Option<String>,
    pub download: Option<String>,
    pub download_location: Option<String>,
}

/// Camera metadata, only present on some endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Exif {
    pub make: Option<String>,
    pub model: Option<String>,
    pub name: Option<String>,
    pub exposure_time: Option<String>,
    pub aperture: Option<String>,
    pub focal_length: Option<String>,
    pub iso: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub title: String,
}

/// Search envelope returned by `search/*` endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResults {
    pub total: u64,
    pub total_pages: u64,
    pub results: Vec<SearchResult>,
}

/// Reduced photo record carried inside a [`SearchResults`] envelope
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub alt_description: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub urls: PhotoUrls,
}

impl From<SearchResult> for Photo {
    fn from(result: SearchResult) -> Self {
        Photo {
            id: result.id,
            description: result.alt_description,
            urls: result.urls,
            ..Photo::default()
        }
    }
}

/// Treats an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
