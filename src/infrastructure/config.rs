//! Configuration file management.
//!
//! Handles loading TOML configuration files.

use std::fs;
use std::path::Path;

use crate::domain::{AppError, ExportConfig, Result};

/// Default configuration file content.
#[cfg(test)]
const DEFAULT_CONFIG: &str = r#"# Slack Export Configuration

[api]
base_url = "https://slack.com/api"

# Messages per conversations.history page
page_size = 100

# Items per files.list page
catalog_page_size = 100

conversation_list_limit = 1000

# Pause between page requests, to stay under Slack's rate limits
page_delay_ms = 1000

request_timeout_secs = 60

[files]
types = "images,snippets,gdocs,zips,pdfs"
show_hidden_by_limit = true
"#;

/// Load configuration from an explicit path, the default location, or defaults.
///
/// # Errors
/// Returns error if an explicit path is missing, or if a file exists but
/// cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<ExportConfig> {
    if let Some(path) = explicit {
        return load_config_from_file(path);
    }

    let config_path = ExportConfig::default_config_path();
    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        tracing::debug!("No config file at {}, using defaults", config_path.display());
        Ok(ExportConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<ExportConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    let config = toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file {}: {e}", path.display()),
    })?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}
