use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::orchestrator::RacePolicy;

/// Client configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the recommendation gateway, including the API version prefix
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Transport-level timeout applied by the HTTP client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Image shown for perfumes without a picture
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,

    /// File holding persisted preferences
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,

    /// Value sent in the `Origin` header, if any
    #[serde(default)]
    pub origin: Option<String>,

    /// Bearer token for gateways that require one
    #[serde(default)]
    pub api_token: Option<String>,

    /// How concurrent calls within one flow are reconciled
    #[serde(default)]
    pub race_policy: RacePolicy,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/v1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_placeholder_image() -> String {
    "/placeholder.svg".to_string()
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from(".scently/preferences.json")
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
