//! Service Configuration
//!
//! Read once at startup from environment variables. Every setting has a default so the
//! service starts with no configuration against a local books API.
//!
//! | Variable           | Default                          |
//! |--------------------|----------------------------------|
//! | `BOOKS_API_URL`    | `http://localhost:4000/graphql`  |
//! | `BOOKS_FILE`       | unset (use the API)              |
//! | `BIND_ADDR`        | `127.0.0.1:8080`                 |
//! | `FETCH_TIMEOUT_MS` | `5000`                           |
//! | `FETCH_ATTEMPTS`   | `3`                              |
//! | `RESET_POLICY`     | `clear_on_submit`                |
//! | `SESSION_CAPACITY` | `10000`                          |
//! | `SESSION_IDLE_SECS`| `900`                            |

use crate::search::engine::ResetPolicy;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub books_api_url: String,
    /// When set, books are loaded from this JSON file instead of the API.
    pub books_file: Option<PathBuf>,
    pub bind_addr: SocketAddr,
    pub fetch_timeout: Duration,
    pub fetch_attempts: usize,
    pub reset_policy: ResetPolicy,
    /// Most live search sessions; opening one more evicts the least recently used.
    pub session_capacity: usize,
    /// Sessions untouched for this long are dropped.
    pub session_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let books_api_url = lookup("BOOKS_API_URL")
            .unwrap_or_else(|| "http://localhost:4000/graphql".to_string());
        let books_file = lookup("BOOKS_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            books_api_url: normalize_url(&books_api_url),
            books_file,
            bind_addr: parse_or(&lookup, "BIND_ADDR", "127.0.0.1:8080")?,
            fetch_timeout: Duration::from_millis(parse_or(&lookup, "FETCH_TIMEOUT_MS", "5000")?),
            fetch_attempts: parse_or(&lookup, "FETCH_ATTEMPTS", "3")?,
            reset_policy: parse_or(&lookup, "RESET_POLICY", "clear_on_submit")?,
            session_capacity: parse_or(&lookup, "SESSION_CAPACITY", "10000")?,
            session_idle_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SESSION_IDLE_SECS",
                "900",
            )?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("invalid {}: {:?}", key, raw))
}

/// Adds a scheme when missing and strips trailing slashes.
fn normalize_url(candidate: &str) -> String {
    let trimmed = candidate.trim();
    let normalized = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    normalized.trim_end_matches('/').to_string()
}
