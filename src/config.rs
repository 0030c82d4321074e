//! Centralized configuration management for shikkhaloy-admin

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the school-management REST backend
    pub base_url: String,
    /// Bearer token sent with every request (optional)
    pub api_token: Option<String>,
    /// Base URL prefixing stored filenames for display
    pub media_base_url: String,
    /// Directory for the rolling log file
    pub log_dir: PathBuf,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "shikkhaloy-admin/0.1.0".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SHIKKHALOY_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api/v1".to_string());

        let api_token = std::env::var("SHIKKHALOY_API_TOKEN").ok();

        let media_base_url = std::env::var("SHIKKHALOY_MEDIA_URL")
            .unwrap_or_else(|_| "http://localhost:5000/uploads".to_string());

        let log_dir = std::env::var("SHIKKHALOY_LOG_DIR")
            .unwrap_or_else(|_| ".".to_string())
            .into();

        let http = HttpConfig {
            timeout_seconds: parse_env_var("SHIKKHALOY_HTTP_TIMEOUT_SECONDS")?.unwrap_or(30),
            user_agent: std::env::var("SHIKKHALOY_USER_AGENT")
                .unwrap_or_else(|_| "shikkhaloy-admin/0.1.0".to_string()),
        };

        Ok(Config {
            base_url,
            api_token,
            media_base_url,
            log_dir,
            http,
        })
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Full URL of a stored media file
    pub fn media_url(&self, filename: &str) -> String {
        format!(
            "{}/{}",
            self.media_base_url.trim_end_matches('/'),
            filename.trim_start_matches('/')
        )
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "Backend URL must start with http:// or https://: {}",
                self.base_url
            ));
        }

        // Check the log directory can be created
        std::fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("Cannot create log directory: {}", self.log_dir.display()))?;

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
