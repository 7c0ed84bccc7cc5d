//! Parameterized query execution.
//!
//! The executor takes a query template with positional `$n`
//! placeholders and a matching list of values, binds them through the
//! driver, and returns fully-collected rows. Values are never
//! interpolated into the template text; that is the safety invariant
//! this module exists for.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use tracing::error;

use crate::db::pool::Db;
use crate::error::{CoreError, Result};

/// A value bound positionally into a query template
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Bool(bool),
    Null,
}

impl From<&str> for SqlParam {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for SqlParam {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// A decoded column value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One result row: column name → value, in select order
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    /// Append a column; used when assembling rows outside the driver
    /// (test doubles, canned results).
    pub fn with_column(mut self, name: impl Into<String>, value: SqlValue) -> Self {
        self.columns.push((name.into(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &(String, SqlValue)> {
        self.columns.iter()
    }
}

/// A query template plus its ordered parameters.
///
/// Invariant: the highest `$n` placeholder equals the parameter count.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub template: String,
    pub params: Vec<SqlParam>,
}

impl QueryRequest {
    pub fn new(template: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            template: template.into(),
            params,
        }
    }

    /// Check the placeholder/parameter count invariant.
    pub fn validate(&self) -> Result<()> {
        let expected = max_placeholder(&self.template);
        if expected != self.params.len() {
            return Err(CoreError::query(format!(
                "template uses {} placeholder(s) but {} parameter(s) were bound",
                expected,
                self.params.len()
            )));
        }
        Ok(())
    }
}

/// Ordered rows; an empty result is valid, not an error
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub rows: Vec<Row>,
}

/// Highest `$n` placeholder index in a template, ignoring text inside
/// single-quoted literals.
fn max_placeholder(template: &str) -> usize {
    let mut max = 0usize;
    let mut in_literal = false;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => in_literal = !in_literal,
            '$' if !in_literal => {
                let mut n = 0usize;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    n = n * 10 + d as usize;
                    chars.next();
                }
                max = max.max(n);
            }
            _ => {}
        }
    }
    max
}

/// Seam between consumers (the authorization service) and the database.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, req: QueryRequest) -> Result<QueryResult>;
}

/// Executor backed by the shared Postgres pool.
///
/// Each call acquires one pooled connection for exactly one query and
/// releases it on every exit path; errored connections are discarded
/// and replaced by the pool itself.
#[derive(Clone)]
pub struct PgQueryExecutor {
    db: Db,
}

impl PgQueryExecutor {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QueryExecutor for PgQueryExecutor {
    async fn execute(&self, req: QueryRequest) -> Result<QueryResult> {
        req.validate()?;

        let mut query = sqlx::query(&req.template);
        for param in &req.params {
            query = match param {
                SqlParam::Text(s) => query.bind(s.clone()),
                SqlParam::Int(n) => query.bind(*n),
                SqlParam::Bool(b) => query.bind(*b),
                SqlParam::Null => query.bind(Option::<String>::None),
            };
        }

        let rows = query.fetch_all(self.db.pool()).await.map_err(|e| {
            // Log the template and driver detail, never parameter values
            let err = CoreError::from(e);
            error!(template = %req.template, error = %err, "query failed");
            err
        })?;

        Ok(QueryResult {
            rows: rows.iter().map(decode_row).collect(),
        })
    }
}

/// Decode a driver row into the loosely-typed `Row`.
///
/// Columns of types outside the supported set decode as `Null` rather
/// than failing the whole result; consumers that need a typed field
/// treat an unexpected `Null` as schema drift.
fn decode_row(row: &PgRow) -> Row {
    let columns = row
        .columns()
        .iter()
        .map(|col| {
            let idx = col.ordinal();
            let value = if row
                .try_get_raw(idx)
                .map(|raw| raw.is_null())
                .unwrap_or(true)
            {
                SqlValue::Null
            } else {
                decode_value(row, idx, col.type_info().name())
            };
            (col.name().to_owned(), value)
        })
        .collect();
    Row { columns }
}

fn decode_value(row: &PgRow, idx: usize, type_name: &str) -> SqlValue {
    match type_name {
        "BOOL" => row.try_get::<bool, _>(idx).map(SqlValue::Bool),
        "INT2" => row.try_get::<i16, _>(idx).map(|n| SqlValue::Int(n as i64)),
        "INT4" => row.try_get::<i32, _>(idx).map(|n| SqlValue::Int(n as i64)),
        "INT8" => row.try_get::<i64, _>(idx).map(SqlValue::Int),
        "FLOAT4" => row.try_get::<f32, _>(idx).map(|f| SqlValue::Float(f as f64)),
        "FLOAT8" => row.try_get::<f64, _>(idx).map(SqlValue::Float),
        _ => row.try_get::<String, _>(idx).map(SqlValue::Text),
    }
    .unwrap_or(SqlValue::Null)
}
