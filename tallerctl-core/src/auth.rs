//! Authorization lookup against the authorized-users table.
//!
//! Stateless per call: every lookup re-queries the database. Denial is
//! a normal outcome, not an error.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::db::{QueryExecutor, QueryRequest, SqlParam, SqlValue};
use crate::error::{CoreError, Result};

const LOOKUP_QUERY: &str = "SELECT id_cliente FROM clientes_autorizados WHERE email = $1";

/// Outcome of an authorization lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Authorized { id_cliente: i64 },
    Denied,
}

/// Email → client-id authorization lookups
#[derive(Clone)]
pub struct AuthService {
    executor: Arc<dyn QueryExecutor>,
}

impl AuthService {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Look up whether `email` maps to an authorized client.
    ///
    /// Empty input fails with `InvalidInput` before any query is
    /// issued. Zero rows is `Denied`; otherwise the first row's
    /// `id_cliente` is authoritative. More than one row is tolerated
    /// (first row wins) but logged, since duplicate authorization
    /// records usually mean an upstream data problem.
    pub async fn lookup_by_email(&self, email: &str) -> Result<AuthDecision> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CoreError::invalid_input("email must not be empty"));
        }

        let result = self
            .executor
            .execute(QueryRequest::new(LOOKUP_QUERY, vec![SqlParam::from(email)]))
            .await?;

        if result.rows.len() > 1 {
            warn!(
                matches = result.rows.len(),
                "multiple authorization records for one email, using the first"
            );
        }

        match result.rows.first() {
            None => {
                debug!("no authorization record found");
                Ok(AuthDecision::Denied)
            }
            Some(row) => {
                let id_cliente = row
                    .get("id_cliente")
                    .and_then(SqlValue::as_i64)
                    .ok_or_else(|| {
                        CoreError::query("id_cliente column missing or not an integer")
                    })?;
                Ok(AuthDecision::Authorized { id_cliente })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::db::{QueryResult, Row, SqlValue};

    /// Call-counting double that returns canned rows
    struct FakeExecutor {
        rows: Vec<Vec<(String, SqlValue)>>,
        calls: Mutex<Vec<QueryRequest>>,
    }

    impl FakeExecutor {
        fn returning(rows: Vec<Vec<(&str, SqlValue)>>) -> Self {
            Self {
                rows: rows
                    .into_iter()
                    .map(|cols| {
                        cols.into_iter()
                            .map(|(name, value)| (name.to_owned(), value))
                            .collect()
                    })
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_request(&self) -> QueryRequest {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl QueryExecutor for FakeExecutor {
        async fn execute(&self, req: QueryRequest) -> Result<QueryResult> {
            self.calls.lock().unwrap().push(req);
            Ok(QueryResult {
                rows: self.rows.iter().map(|cols| row_from(cols)).collect(),
            })
        }
    }

    fn row_from(cols: &[(String, SqlValue)]) -> Row {
        let mut row = Row::default();
        for (name, value) in cols {
            row = row.with_column(name.clone(), value.clone());
        }
        row
    }

    fn service(executor: Arc<FakeExecutor>) -> AuthService {
        AuthService::new(executor)
    }

    #[tokio::test]
    async fn single_match_is_authorized() {
        let executor = Arc::new(FakeExecutor::returning(vec![vec![(
            "id_cliente",
            SqlValue::Int(42),
        )]]));
        let decision = service(executor.clone())
            .lookup_by_email("a@b.com")
            .await
            .unwrap();

        assert_eq!(decision, AuthDecision::Authorized { id_cliente: 42 });
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test]
    async fn zero_matches_is_denied() {
        let executor = Arc::new(FakeExecutor::returning(vec![]));
        let decision = service(executor)
            .lookup_by_email("nobody@nowhere.com")
            .await
            .unwrap();

        assert_eq!(decision, AuthDecision::Denied);
    }

    #[tokio::test]
    async fn empty_email_fails_without_querying() {
        let executor = Arc::new(FakeExecutor::returning(vec![]));
        let err = service(executor.clone())
            .lookup_by_email("   ")
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InvalidInput { .. }));
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn first_row_wins_on_duplicates() {
        let executor = Arc::new(FakeExecutor::returning(vec![
            vec![("id_cliente", SqlValue::Int(7))],
            vec![("id_cliente", SqlValue::Int(99))],
        ]));
        let decision = service(executor)
            .lookup_by_email("dup@taller.mx")
            .await
            .unwrap();

        assert_eq!(decision, AuthDecision::Authorized { id_cliente: 7 });
    }

    #[tokio::test]
    async fn adversarial_email_stays_a_bound_parameter() {
        let executor = Arc::new(FakeExecutor::returning(vec![]));
        let hostile = "' OR '1'='1";
        service(executor.clone())
            .lookup_by_email(hostile)
            .await
            .unwrap();

        let req = executor.last_request();
        assert_eq!(req.params, vec![SqlParam::from(hostile)]);
        // The template is the fixed query; the value never enters it
        assert_eq!(req.template, LOOKUP_QUERY);
        assert!(!req.template.contains(hostile));
    }

    #[tokio::test]
    async fn undecodable_id_is_a_query_error() {
        let executor = Arc::new(FakeExecutor::returning(vec![vec![(
            "id_cliente",
            SqlValue::Text("not-a-number".into()),
        )]]));
        let err = service(executor)
            .lookup_by_email("a@b.com")
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Query { .. }));
    }
}
