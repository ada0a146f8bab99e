use crate::config::types::{ApiConfig, Config, OutputConfig, PacingConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_output_config(&config.output)?;
    validate_pacing_config(&config.pacing)?;
    Ok(())
}

/// Validates API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    if config.access_key.trim().is_empty() {
        return Err(ConfigError::Validation("Missing access key".to_string()));
    }

    if config.query.trim_matches('/').is_empty() {
        return Err(ConfigError::Validation("query cannot be empty".to_string()));
    }

    if config.query.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "query must not contain whitespace, got '{}'",
            config.query
        )));
    }

    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "https" && base.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.start_page < 1 {
        return Err(ConfigError::Validation(
            "start-page must be >= 1".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.image_dir.is_empty() {
        return Err(ConfigError::Validation(
            "image-dir cannot be empty".to_string(),
        ));
    }

    // The fragment is appended to a raw URL that already carries a query string
    if !config.image_query.is_empty() && !config.image_query.starts_with('&') {
        return Err(ConfigError::Validation(format!(
            "image-query must start with '&', got '{}'",
            config.image_query
        )));
    }

    if config.caption_prefix.contains('\n') {
        return Err(ConfigError::Validation(
            "caption-prefix must be a single line".to_string(),
        ));
    }

    Ok(())
}

/// Validates pacing configuration
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.cycle_budget_secs == 0 {
        return Err(ConfigError::Validation(
            "cycle-budget-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}
