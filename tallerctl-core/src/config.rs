//! Environment-driven configuration, read once at startup.
//!
//! Fails hard with an actionable error when required settings are
//! missing or violate an invariant. No hot-reload.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Connection pool configuration. Immutable after pool creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,

    /// Whether connections must be encrypted
    pub ssl: bool,

    /// Caps concurrent live connections
    pub max_connections: u32,

    /// Caps callers waiting for a free connection (0 = wait bounded
    /// only by the connect timeout)
    pub queue_limit: u32,

    /// Max time to establish a new connection or acquire a pooled one
    pub connect_timeout: Duration,

    /// Max time a connection may sit unused before being closed
    pub idle_timeout: Duration,

    /// Whether idle connections are liveness-checked before reuse
    pub keep_alive: bool,
}

/// Deployment environment, from `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => AppEnv::Production,
            _ => AppEnv::Development,
        }
    }
}

impl DbConfig {
    /// Load config from the environment.
    ///
    /// Required: `DB_HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`.
    /// Everything else has defaults.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            host: required("DB_HOST")?,
            port: parsed("DB_PORT", DEFAULT_PORT)?,
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            database: required("DB_NAME")?,
            ssl: flag("DB_SSL"),
            max_connections: parsed("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            queue_limit: parsed("DB_QUEUE_LIMIT", 0)?,
            connect_timeout: Duration::from_secs(parsed(
                "DB_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?),
            idle_timeout: Duration::from_secs(parsed(
                "DB_IDLE_TIMEOUT_SECS",
                DEFAULT_IDLE_TIMEOUT_SECS,
            )?),
            keep_alive: flag("DB_KEEP_ALIVE"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Enforce invariants: max connections >= 1, timeouts > 0.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections < 1 {
            return Err(CoreError::config("DB_MAX_CONNECTIONS must be at least 1"));
        }
        if self.connect_timeout.is_zero() {
            return Err(CoreError::config("DB_CONNECT_TIMEOUT_SECS must be positive"));
        }
        if self.idle_timeout.is_zero() {
            return Err(CoreError::config("DB_IDLE_TIMEOUT_SECS must be positive"));
        }
        Ok(())
    }

    /// Effective time a caller may wait for a free connection.
    ///
    /// sqlx bounds waiters by an acquire timeout rather than a waiter
    /// count; a non-zero queue limit shortens the wait so that excess
    /// callers fail fast instead of hanging.
    pub fn acquire_timeout(&self) -> Duration {
        if self.queue_limit == 0 {
            self.connect_timeout
        } else {
            (self.connect_timeout / self.queue_limit).max(Duration::from_secs(1))
        }
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| CoreError::config(format!("{} is required", key)))
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| CoreError::config(format!("{} is not a valid value: {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}

fn flag(key: &str) -> bool {
    matches!(
        env::var(key).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DbConfig {
        DbConfig {
            host: "localhost".into(),
            port: 5432,
            user: "taller".into(),
            password: "secret".into(),
            database: "compresores".into(),
            ssl: false,
            max_connections: 10,
            queue_limit: 0,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            keep_alive: true,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn zero_max_connections_rejected() {
        let mut config = sample();
        config.max_connections = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }

    #[test]
    fn zero_timeouts_rejected() {
        let mut config = sample();
        config.connect_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.idle_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn queue_limit_shortens_acquire_wait() {
        let mut config = sample();
        assert_eq!(config.acquire_timeout(), Duration::from_secs(10));

        config.queue_limit = 5;
        assert_eq!(config.acquire_timeout(), Duration::from_secs(2));

        // Never drops below one second
        config.queue_limit = 100;
        assert_eq!(config.acquire_timeout(), Duration::from_secs(1));
    }
}
