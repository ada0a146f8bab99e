use crate::crawler::PacingMode;
use serde::Deserialize;

/// Default photo-search API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.unsplash.com/";

/// Default listing queried when none is given
pub const DEFAULT_QUERY: &str = "photos";

/// Default resize/crop fragment appended to every raw image URL
pub const DEFAULT_IMAGE_QUERY: &str = "&w=256&h=256&fit=crop&crop=faces";

/// Main configuration structure for Photo-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub output: OutputConfig,
    pub pacing: PacingConfig,
}

/// Photo-search API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Client access key sent as `Authorization: Client-ID <key>`
    #[serde(rename = "access-key")]
    pub access_key: String,

    /// Base endpoint; the query is appended as a path
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Listing or search path to crawl (e.g. "photos", "topics/nature/photos")
    pub query: String,

    /// First page requested when the process starts
    #[serde(rename = "start-page")]
    pub start_page: u64,

    /// Skip TLS certificate verification for API and image hosts
    #[serde(rename = "accept-invalid-certs")]
    pub accept_invalid_certs: bool,

    /// Overall request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            query: DEFAULT_QUERY.to_string(),
            start_page: 1,
            accept_invalid_certs: false,
            timeout_secs: 60,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives `<id>.png` and `<id>.caption` files
    #[serde(rename = "image-dir")]
    pub image_dir: String,

    /// Write a caption file next to each freshly downloaded image
    pub captions: bool,

    /// Text prepended to every caption
    #[serde(rename = "caption-prefix")]
    pub caption_prefix: String,

    /// Query-string fragment appended to the raw image URL
    #[serde(rename = "image-query")]
    pub image_query: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image_dir: "img".to_string(),
            captions: false,
            caption_prefix: String::new(),
            image_query: DEFAULT_IMAGE_QUERY.to_string(),
        }
    }
}

/// Cycle pacing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// How the end-of-cycle sleep is derived from the elapsed time
    pub mode: PacingMode,

    /// Target duration of one fetch-and-download cycle (seconds)
    #[serde(rename = "cycle-budget-secs")]
    pub cycle_budget_secs: u64,

    /// Sleep after a failed page fetch (seconds)
    #[serde(rename = "fetch-error-delay-secs")]
    pub fetch_error_delay_secs: u64,

    /// Sleep after the query ran out of results (seconds)
    #[serde(rename = "exhaustion-delay-secs")]
    pub exhaustion_delay_secs: u64,

    /// Exclusive upper bound of the random jitter (seconds)
    #[serde(rename = "max-jitter-secs")]
    pub max_jitter_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            mode: PacingMode::default(),
            cycle_budget_secs: 72,
            fetch_error_delay_secs: 30,
            exhaustion_delay_secs: 72,
            max_jitter_secs: 10,
        }
    }
}
