//! Database connection pool lifecycle.
//!
//! Wraps sqlx `PgPool` in an explicit init/shutdown object: created once
//! at process start, drained and closed by `Db::close` rather than
//! relying on process-exit cleanup. Connections are created and
//! discarded by the pool internally; callers never hold one across more
//! than a single query.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use tracing::info;

use crate::config::DbConfig;
use crate::error::{CoreError, Result};

/// Handle to the process-wide connection pool
#[derive(Clone, Debug)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Create the pool and verify a first connection.
    ///
    /// # Errors
    ///
    /// Returns `ConnectFailed` when the database is unreachable or
    /// rejects the credentials, `Timeout` when the attempt exceeds the
    /// configured connect timeout.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        config.validate()?;

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .ssl_mode(if config.ssl {
                PgSslMode::Require
            } else {
                PgSslMode::Prefer
            });

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(Some(config.idle_timeout))
            .test_before_acquire(config.keep_alive)
            .connect_with(options)
            .await
            .map_err(connect_error)?;

        info!(
            host = %config.host,
            database = %config.database,
            max_connections = config.max_connections,
            "database pool ready"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Total connections currently open (idle + checked out)
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    /// Connections sitting idle in the pool
    pub fn num_idle(&self) -> usize {
        self.pool.num_idle()
    }

    /// Drain and close every connection. Idempotent.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}

/// During connect, any driver failure means the session never came up.
fn connect_error(e: sqlx::Error) -> CoreError {
    match CoreError::from(e) {
        CoreError::Query { reason } => CoreError::ConnectFailed { reason },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn local_config() -> DbConfig {
        DbConfig {
            host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into()),
            port: 5432,
            user: std::env::var("DB_USER").unwrap_or_else(|_| "postgres".into()),
            password: std::env::var("DB_PASSWORD").unwrap_or_default(),
            database: std::env::var("DB_NAME").unwrap_or_else(|_| "postgres".into()),
            ssl: false,
            max_connections: 2,
            queue_limit: 0,
            connect_timeout: Duration::from_secs(2),
            idle_timeout: Duration::from_secs(60),
            keep_alive: false,
        }
    }

    // Integration tests require a real database
    // Run with: DB_HOST=... cargo test -p tallerctl-core -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let db = Db::connect(&local_config()).await.expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(db.pool())
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn exhausted_pool_fails_instead_of_hanging() {
        let db = Db::connect(&local_config()).await.expect("pool creation failed");

        // Hold both connections, then a third acquire must time out
        let held_a = db.pool().acquire().await.expect("first acquire");
        let held_b = db.pool().acquire().await.expect("second acquire");

        let err = db.pool().acquire().await.expect_err("expected exhaustion");
        assert!(matches!(CoreError::from(err), CoreError::PoolExhausted));

        drop(held_a);
        drop(held_b);
        db.close().await;
    }

    #[test]
    fn invalid_config_rejected_before_any_socket() {
        let mut config = local_config();
        config.max_connections = 0;
        let err = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(Db::connect(&config))
            .unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }
}
