// handlers/login.rs - POST /auth/api/login handler

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::bridge;
use crate::types::Credentials;
use crate::AppState;

/// POST /auth/api/login - Authenticate against the legacy server
///
/// Expected Input:
/// ```json
/// { "username": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "success": true, "user": { "userId": "...", "sessionId": "...", "csrfToken": "...", ... } }
/// ```
///
/// Always answers HTTP 200; the browser client reads the `success` flag,
/// not the status code. Failures carry a user-facing `message` and a
/// stable `code`, never upstream details.
pub async fn login_post(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Json<Value> {
    let username = credentials.username.clone();
    match bridge::login(&state.config.legacy, &credentials).await {
        Ok(descriptor) => {
            tracing::info!(user = %username, "login succeeded");
            Json(json!({
                "success": true,
                "user": descriptor,
            }))
        }
        Err(failure) => {
            tracing::warn!(user = %username, code = failure.code(), error = %failure, "login failed");
            Json(json!({
                "success": false,
                "message": failure.message(),
                "code": failure.code(),
            }))
        }
    }
}
