//! Application state shared across handlers

use std::sync::Arc;

use tallerctl_core::{AuthService, Db};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    auth: AuthService,
    db: Option<Db>,
}

impl AppState {
    pub fn new(auth: AuthService, db: Db) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                auth,
                db: Some(db),
            }),
        }
    }

    /// State without a live pool, for exercising the router with a
    /// stub executor.
    pub fn with_auth(auth: AuthService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { auth, db: None }),
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    pub fn db(&self) -> Option<&Db> {
        self.inner.db.as_ref()
    }
}
