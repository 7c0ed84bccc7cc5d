//! tallerctl-core: pooled query gateway with authorization lookups
//!
//! Owns the database connection pool, the parameterized query
//! executor on top of it, and the email-based authorization lookup
//! the dashboard front-end relies on. No HTTP in this crate.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;

pub use auth::{AuthDecision, AuthService};
pub use config::{AppEnv, DbConfig};
pub use db::{Db, PgQueryExecutor, QueryExecutor, QueryRequest, QueryResult, Row, SqlParam, SqlValue};
pub use error::{CoreError, Result};
