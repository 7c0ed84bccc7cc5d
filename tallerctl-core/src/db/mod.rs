//! Database layer - pool lifecycle and parameterized query execution
//!
//! # Design Principles
//!
//! - One bounded pool per process, explicit init and shutdown
//! - One connection per query lifetime - never held across queries
//! - Values reach the driver as bound parameters, never as query text

pub mod pool;
pub mod query;

pub use pool::Db;
pub use query::{PgQueryExecutor, QueryExecutor, QueryRequest, QueryResult, Row, SqlParam, SqlValue};
