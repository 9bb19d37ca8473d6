//! Export configuration.
//!
//! Every field has a default so a missing or partial config file still
//! yields a usable configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Slack Web API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Web API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Messages requested per `conversations.history` page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Items requested per `files.list` page.
    #[serde(default = "default_page_size")]
    pub catalog_page_size: u32,

    /// Limit passed to the single `conversations.list` call.
    #[serde(default = "default_conversation_list_limit")]
    pub conversation_list_limit: u32,

    /// Pause between consecutive page requests in milliseconds.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            catalog_page_size: default_page_size(),
            conversation_list_limit: default_conversation_list_limit(),
            page_delay_ms: default_page_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://slack.com/api".to_string()
}

const fn default_page_size() -> u32 {
    100
}

const fn default_conversation_list_limit() -> u32 {
    1000
}

const fn default_page_delay_ms() -> u64 {
    1000
}

const fn default_request_timeout_secs() -> u64 {
    60
}

/// File export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Comma-separated `files.list` types for non-canvas attachments.
    #[serde(default = "default_file_types")]
    pub types: String,

    /// Ask for files hidden by the workspace's plan limits.
    #[serde(default = "default_show_hidden")]
    pub show_hidden_by_limit: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            types: default_file_types(),
            show_hidden_by_limit: default_show_hidden(),
        }
    }
}

fn default_file_types() -> String {
    "images,snippets,gdocs,zips,pdfs".to_string()
}

const fn default_show_hidden() -> bool {
    true
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub files: FilesConfig,
}

impl ExportConfig {
    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".slack-export")
    }

    /// Get the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// Pause between page requests.
    #[must_use]
    pub const fn page_delay(&self) -> Duration {
        Duration::from_millis(self.api.page_delay_ms)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }
}
