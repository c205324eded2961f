use std::{net::SocketAddr, time::Duration};

use crate::{error::StartupError, session::MIN_SECRET_LEN};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todo.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub session_secret: Option<String>,
    pub session_ttl: Duration,
}

impl Config {
    // Reads the process environment; call `dotenv::dotenv()` first to pick up a `.env` file
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StartupError> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let raw_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| StartupError::Config(format!("BIND_ADDR `{}`: {}", raw_addr, e)))?;

        let session_secret = lookup("SESSION_SECRET").filter(|secret| !secret.is_empty());
        if let Some(secret) = &session_secret {
            if secret.len() < MIN_SECRET_LEN {
                return Err(StartupError::Config(format!(
                    "SESSION_SECRET must be at least {} bytes",
                    MIN_SECRET_LEN
                )));
            }
        }

        let session_ttl = match lookup("SESSION_TTL_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                StartupError::Config(format!("SESSION_TTL_SECS `{}`: {}", raw, e))
            })?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        Ok(Self {
            database_url,
            bind_addr,
            session_secret,
            session_ttl: Duration::from_secs(session_ttl),
        })
    }
}
