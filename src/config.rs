use serde::Deserialize;
use std::time::Duration;

/// Prefix shared by every environment variable the client reads
pub const ENV_PREFIX: &str = "LOOMI_";

/// Client configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Backend base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout applied to every backend request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Delay between featured carousel rotations
    #[serde(default = "default_carousel_interval_ms")]
    pub carousel_interval_ms: u64,

    /// Number of leading items the carousel rotates over
    #[serde(default = "default_carousel_window")]
    pub carousel_window: usize,

    /// Session lifetime, aligned with the backend access token lifetime
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: i64,

    /// Where a successful login lands when no protected page was requested
    #[serde(default = "default_landing_path")]
    pub landing_path: String,

    /// Demo credentials
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_carousel_interval_ms() -> u64 {
    5000
}

fn default_carousel_window() -> usize {
    2
}

fn default_session_ttl_secs() -> i64 {
    24 * 60 * 60
}

fn default_landing_path() -> String {
    "/".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            carousel_interval_ms: default_carousel_interval_ms(),
            carousel_window: default_carousel_window(),
            session_ttl_secs: default_session_ttl_secs(),
            landing_path: default_landing_path(),
            email: None,
            password: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit variable set
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX)
            .from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.carousel_window == 0 {
            anyhow::bail!("LOOMI_CAROUSEL_WINDOW must be at least 1");
        }

        Ok(config)
    }

    pub fn carousel_interval(&self) -> Duration {
        Duration::from_millis(self.carousel_interval_ms)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs)
    }
}
