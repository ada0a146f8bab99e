//! Photo-Harvest main entry point
//!
//! This is the command-line interface for the Photo-Harvest crawler.

use clap::Parser;
use photo_harvest::config::{load_config, validate, Config};
use photo_harvest::crawler::{crawl, PacingMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Photo-Harvest: a paced photo-search crawler
///
/// Photo-Harvest walks the pages of a photo-search query, oldest first, and
/// stores every photo as a PNG exactly once. It runs until interrupted.
#[derive(Parser, Debug)]
#[command(name = "photo-harvest")]
#[command(version)]
#[command(about = "A paced photo-search crawler", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Client access key
    #[arg(short = 'c', long, env = "UNSPLASH_ACCESS_KEY", hide_env_values = true)]
    access_key: Option<String>,

    /// Listing or search path to crawl
    #[arg(short = 'q', long)]
    query: Option<String>,

    /// Caption prefix
    #[arg(long, visible_alias = "pr")]
    prefix: Option<String>,

    /// Write a caption file next to each downloaded image
    #[arg(long)]
    captions: bool,

    /// Query-string fragment appended to every raw image URL
    #[arg(long, visible_alias = "iq")]
    image_query: Option<String>,

    /// Directory receiving images and captions
    #[arg(long, value_name = "DIR")]
    out_dir: Option<String>,

    /// First page to request
    #[arg(long)]
    page: Option<u64>,

    /// Base URL of the search API
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// How the end-of-cycle sleep is computed
    #[arg(long, value_enum)]
    pacing: Option<PacingMode>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of a file or default config
    fn apply(self, config: &mut Config) {
        if let Some(key) = self.access_key {
            config.api.access_key = key;
        }
        if let Some(query) = self.query {
            config.api.query = query;
        }
        if let Some(page) = self.page {
            config.api.start_page = page;
        }
        if let Some(base) = self.api_base {
            config.api.base_url = base;
        }
        if self.insecure {
            config.api.accept_invalid_certs = true;
        }
        if let Some(prefix) = self.prefix {
            config.output.caption_prefix = prefix;
        }
        if self.captions {
            config.output.captions = true;
        }
        if let Some(image_query) = self.image_query {
            config.output.image_query = image_query;
        }
        if let Some(dir) = self.out_dir {
            config.output.image_dir = dir;
        }
        if let Some(mode) = self.pacing {
            config.pacing.mode = mode;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };
    cli.apply(&mut config);

    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    tracing::info!(
        "Query: {}, start page: {}, output: {}, captions: {}",
        config.api.query,
        config.api.start_page,
        config.output.image_dir,
        config.output.captions
    );

    match crawl(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("photo_harvest=info,warn"),
            1 => EnvFilter::new("photo_harvest=debug,info"),
            2 => EnvFilter::new("photo_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
