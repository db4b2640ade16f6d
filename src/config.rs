//! Environment configuration, loaded from the process environment and an
//! optional `.env` file.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MOCK_LATENCY_MS: u64 = 500;
pub const DEFAULT_LOCAL_STORE_DIR: &str = ".admin-data";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Remote backend base URL (`API_BASE_URL`)
    pub api_base_url: String,
    /// Serve everything from the mock backend (`USE_MOCK_API`)
    pub use_mock_api: bool,
    /// Per-call remote timeout (`API_TIMEOUT_MS`)
    pub request_timeout: Duration,
    /// Artificial mock latency (`MOCK_LATENCY_MS`)
    pub mock_latency: Duration,
    /// Directory of the local persistent store (`LOCAL_STORE_DIR`)
    pub local_store_dir: PathBuf,
    /// Listen address of the reference backend (`BIND_ADDR`)
    pub bind_addr: String,
    /// Reference backend demands a bearer token (`REQUIRE_AUTH`)
    pub require_auth: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            use_mock_api: false,
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            mock_latency: Duration::from_millis(DEFAULT_MOCK_LATENCY_MS),
            local_store_dir: PathBuf::from(DEFAULT_LOCAL_STORE_DIR),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            require_auth: false,
        }
    }
}

fn parse_millis(name: &'static str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(Duration::from_millis(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
    }
}

fn parse_flag(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(ConfigError::InvalidFlag {
            name,
            value: v.to_string(),
        }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            api_base_url: lookup("API_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_base_url),
            use_mock_api: parse_flag("USE_MOCK_API", lookup("USE_MOCK_API"))?,
            request_timeout: parse_millis("API_TIMEOUT_MS", lookup("API_TIMEOUT_MS"), DEFAULT_TIMEOUT_MS)?,
            mock_latency: parse_millis(
                "MOCK_LATENCY_MS",
                lookup("MOCK_LATENCY_MS"),
                DEFAULT_MOCK_LATENCY_MS,
            )?,
            local_store_dir: lookup("LOCAL_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.local_store_dir),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            require_auth: parse_flag("REQUIRE_AUTH", lookup("REQUIRE_AUTH"))?,
        })
    }
}
