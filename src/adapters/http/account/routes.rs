//! Axum router configuration for the auth endpoints.

use axum::{routing::post, Router};

use super::super::state::AppState;
use super::handlers::{login, register};

/// Routes mounted at `/api/auth`.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
