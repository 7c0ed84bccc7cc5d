//! tallerctl-server: HTTP front-end for authorization checks
//!
//! Exposes the core authorization lookup over HTTP for the
//! maintenance dashboard. The pool lifecycle and query execution live
//! in tallerctl-core.

pub mod http;
pub mod state;

pub use http::{build_router, run_server, ApiError, ServerConfig};
pub use state::AppState;
