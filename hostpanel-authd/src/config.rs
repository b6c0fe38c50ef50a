//! Daemon configuration from environment variables.
//!
//! Required:
//! - `HOSTPANEL_SESSION_KEYS`: comma-separated signing secrets, newest
//!   first. Every replica must carry the same value or tokens issued by one
//!   instance will not verify on another.
//!
//! Optional:
//! - `HOSTPANEL_GRPC_ADDR`: listen address (default `127.0.0.1:50061`)
//! - `HOSTPANEL_DB_PATH`: SQLite database path (default under the local
//!   data directory)
//! - `HOSTPANEL_SESSION_TTL_SECS`: session lifetime (default 3600)

use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_GRPC_ADDR: &str = "127.0.0.1:50061";
const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

/// Runtime configuration for the authentication daemon.
#[derive(Debug, Clone)]
pub struct Config {
    pub grpc_addr: SocketAddr,
    pub db_path: PathBuf,
    /// Signing secrets, newest first. Signing uses only the first entry;
    /// verification accepts any, which is what makes rotation possible.
    pub session_keys: Vec<String>,
    pub session_ttl_secs: i64,
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("HOSTPANEL_SESSION_KEYS must be set (comma-separated secrets, newest first)")]
    MissingSessionKeys,

    #[error("invalid HOSTPANEL_GRPC_ADDR: {0}")]
    InvalidAddr(#[from] std::net::AddrParseError),

    #[error("invalid HOSTPANEL_SESSION_TTL_SECS: {0}")]
    InvalidTtl(#[from] std::num::ParseIntError),

    #[error("HOSTPANEL_SESSION_TTL_SECS must be positive")]
    NonPositiveTtl,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let grpc_addr = std::env::var("HOSTPANEL_GRPC_ADDR")
            .unwrap_or_else(|_| DEFAULT_GRPC_ADDR.to_string())
            .parse()?;

        let db_path = std::env::var("HOSTPANEL_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("hostpanel")
                    .join("auth.db")
            });

        let session_keys = parse_session_keys(
            &std::env::var("HOSTPANEL_SESSION_KEYS")
                .map_err(|_| ConfigError::MissingSessionKeys)?,
        )?;

        let session_ttl_secs = match std::env::var("HOSTPANEL_SESSION_TTL_SECS") {
            Ok(raw) => raw.parse::<i64>()?,
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };
        if session_ttl_secs <= 0 {
            return Err(ConfigError::NonPositiveTtl);
        }

        Ok(Self {
            grpc_addr,
            db_path,
            session_keys,
            session_ttl_secs,
        })
    }
}

fn parse_session_keys(raw: &str) -> Result<Vec<String>, ConfigError> {
    let keys: Vec<String> = raw
        .split(',')
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .collect();

    if keys.is_empty() {
        return Err(ConfigError::MissingSessionKeys);
    }
    Ok(keys)
}
