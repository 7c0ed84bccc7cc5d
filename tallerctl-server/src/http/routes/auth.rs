//! Authorization endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use tallerctl_core::AuthDecision;

use crate::http::error::ApiError;
use crate::state::AppState;

/// Verify request; `email` is optional so that `{}` parses and gets a
/// proper 400 instead of a deserialization rejection.
#[derive(Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct AuthorizedResponse {
    pub authorized: bool,
    pub id_cliente: i64,
    pub status: &'static str,
}

/// POST /api/auth/verify - is this email an authorized client?
///
/// Denial is an expected outcome and gets its own 403 body, distinct
/// from infrastructure failures.
async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let email = req.email.as_deref().unwrap_or("");
    if email.trim().is_empty() {
        return Err(ApiError::MissingEmail);
    }

    match state.auth().lookup_by_email(email).await? {
        AuthDecision::Authorized { id_cliente } => Ok((
            StatusCode::OK,
            Json(json!({
                "authorized": true,
                "id_cliente": id_cliente,
                "status": "Usuario autorizado"
            })),
        )),
        AuthDecision::Denied => Ok((
            StatusCode::FORBIDDEN,
            Json(json!({
                "authorized": false,
                "error": "Email no autorizado"
            })),
        )),
    }
}

/// Authorization routes
pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/verify", post(verify))
}
