/// Structured error types for tallerctl-core.
///
/// Uses `thiserror` for better API surface and error composition.
/// The server binary can still use `anyhow` for convenience, but
/// library consumers get structured, composable errors.

use thiserror::Error;

/// Main error type for tallerctl-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration invalid or incomplete at startup
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Caller supplied malformed or missing input
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// No pooled connection became available within the acquire window.
    /// Retryable by the caller; this layer never retries.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Establishing a new database connection failed (network, TLS, auth)
    #[error("Failed to connect to database: {reason}")]
    ConnectFailed { reason: String },

    /// Connect attempt exceeded the configured connect timeout
    #[error("Database operation timed out")]
    Timeout,

    /// Driver-level query failure (syntax, constraint, dropped connection).
    /// Carries enough detail to log; never shown to end users verbatim.
    #[error("Query failed: {reason}")]
    Query { reason: String },
}

/// Result type alias for tallerctl-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create an invalid-input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a connect-failed error
    pub fn connect_failed(reason: impl Into<String>) -> Self {
        Self::ConnectFailed {
            reason: reason.into(),
        }
    }

    /// Create a query error
    pub fn query(reason: impl Into<String>) -> Self {
        Self::Query {
            reason: reason.into(),
        }
    }

    /// Whether this failure is worth retrying by the caller
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PoolExhausted | Self::Timeout)
    }

    /// Whether this failure is the caller's fault (as opposed to infrastructure)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

/// Map a driver error into the core taxonomy.
///
/// `PoolTimedOut` is the pool saying "no free connection in time" and is
/// surfaced as the retryable `PoolExhausted`; everything raised while
/// establishing a session becomes `ConnectFailed`; the rest is `Query`.
impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => Self::PoolExhausted,
            sqlx::Error::PoolClosed => Self::ConnectFailed {
                reason: "connection pool is closed".to_string(),
            },
            sqlx::Error::Tls(e) => Self::ConnectFailed {
                reason: format!("TLS negotiation failed: {}", e),
            },
            sqlx::Error::Configuration(e) => Self::Config {
                reason: e.to_string(),
            },
            sqlx::Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => Self::Timeout,
            other => Self::Query {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::config("DB_PASSWORD is required");
        assert_eq!(
            err.to_string(),
            "Configuration error: DB_PASSWORD is required"
        );

        let err = CoreError::invalid_input("email must not be empty");
        assert!(err.to_string().contains("Invalid input"));
    }

    #[test]
    fn test_pool_timeout_maps_to_exhausted() {
        let err: CoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, CoreError::PoolExhausted));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_client_error_classification() {
        assert!(CoreError::invalid_input("x").is_client_error());
        assert!(!CoreError::PoolExhausted.is_client_error());
        assert!(!CoreError::query("syntax error").is_retryable());
    }
}
