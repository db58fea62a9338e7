//! Client configuration.
//!
//! Unique responsibility: describe where the libpod REST service lives and how
//! requests are sent to it. All fields can be loaded from environment variables
//! (with `.env` support), or the struct can be built directly.

use std::env;

use crate::libpod_error::LibpodError;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_USER_AGENT: &str = "libpod-pods/0.1";

/// Configuration for the libpod HTTP transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibpodClientConfig {
    /// Base URL of the libpod REST service.
    /// Env: `LIBPOD_URL` (default: "<http://localhost:8080>")
    pub base_url: String,

    /// API version segment prepended to every path, e.g. `v4.0.0`.
    /// Env: `LIBPOD_API_VERSION` (optional)
    pub api_version: Option<String>,

    /// Timeout for buffered requests in milliseconds. `0` disables it.
    /// Streaming requests are never subject to it.
    /// Env: `LIBPOD_HTTP_TIMEOUT_MS` (default: 30000)
    pub timeout_ms: u64,

    /// User agent for HTTP requests.
    /// Env: `LIBPOD_USER_AGENT` (default: "libpod-pods/0.1")
    pub user_agent: String,
}

impl Default for LibpodClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl LibpodClientConfig {
    /// Load configuration from environment variables.
    ///
    /// In local dev, this will also attempt to load `.env` from the current directory.
    /// If `.env` is missing, it does not fail.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, LibpodError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            base_url: env::var("LIBPOD_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_version: non_empty(env::var("LIBPOD_API_VERSION").ok()),
            timeout_ms: parse_u64(
                "LIBPOD_HTTP_TIMEOUT_MS",
                env::var("LIBPOD_HTTP_TIMEOUT_MS").ok(),
                DEFAULT_TIMEOUT_MS,
            )?,
            user_agent: env::var("LIBPOD_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        })
    }

    /// Full URL (without query) for a request path such as `/libpod/pods/web/json`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.api_version.as_deref() {
            Some(version) => format!("{base}/{}{path}", version.trim_matches('/')),
            None => format!("{base}{path}"),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_u64(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, LibpodError> {
    non_empty(raw).map_or(Ok(default), |v| {
        v.trim().parse::<u64>().map_err(|_| LibpodError::InvalidEnv {
            key,
            value: v,
            reason: "expected an unsigned integer",
        })
    })
}
