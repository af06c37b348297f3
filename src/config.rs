//! Configuration Module
//!
//! Handles loading service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lifetime in seconds of a cached recommendation, also the sweep interval
    pub cache_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Endpoint of the upstream recommendation API
    pub recommender_api_url: String,
    /// Request timeout in seconds for the upstream API
    pub recommender_api_timeout: u64,
}

const DEFAULT_CACHE_TTL: u64 = 60;
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_RECOMMENDER_API_URL: &str = "http://127.0.0.1:8080/recommendation";
const DEFAULT_RECOMMENDER_API_TIMEOUT: u64 = 10;

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL` - Recommendation TTL in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `RECOMMENDER_API_URL` - Upstream endpoint (default: http://127.0.0.1:8080/recommendation)
    /// - `RECOMMENDER_API_TIMEOUT` - Upstream timeout in seconds (default: 10)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self {
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(DEFAULT_CACHE_TTL),
            server_port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            recommender_api_url: env::var("RECOMMENDER_API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RECOMMENDER_API_URL.to_string()),
            recommender_api_timeout: parse_var("RECOMMENDER_API_TIMEOUT")
                .unwrap_or(DEFAULT_RECOMMENDER_API_TIMEOUT),
        }
    }

    /// The cache TTL as a `Duration`.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// The upstream request timeout as a `Duration`.
    pub fn recommender_api_timeout(&self) -> Duration {
        Duration::from_secs(self.recommender_api_timeout)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            server_port: DEFAULT_SERVER_PORT,
            recommender_api_url: DEFAULT_RECOMMENDER_API_URL.to_string(),
            recommender_api_timeout: DEFAULT_RECOMMENDER_API_TIMEOUT,
        }
    }
}
