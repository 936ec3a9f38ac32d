//! Runtime configuration read from the environment.

use anyhow::{Context, Result};
use std::net::SocketAddr;

const DEFAULT_DATABASE_URL: &str = "sqlite:college.db";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Settings needed to start the server
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub cors_origin: String,
    /// Lifetime of an issued bearer token
    pub session_ttl_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = match lookup("COLLEGE_BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("COLLEGE_BIND_ADDR is not a socket address: {}", raw))?,
            None => defaults.bind_addr,
        };

        let session_ttl_hours = match lookup("SESSION_TTL_HOURS") {
            Some(raw) => {
                let hours: i64 = raw
                    .parse()
                    .with_context(|| format!("SESSION_TTL_HOURS is not an integer: {}", raw))?;
                if hours <= 0 {
                    anyhow::bail!("SESSION_TTL_HOURS must be positive, got {}", hours);
                }
                hours
            }
            None => defaults.session_ttl_hours,
        };

        Ok(Self {
            bind_addr,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            session_ttl_hours,
        })
    }
}
