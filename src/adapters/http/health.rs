//! Liveness and readiness probe.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::state::AppState;

const SERVICE_NAME: &str = "priceguard-server";

#[derive(Debug, Default, Deserialize)]
pub struct HealthQuery {
    #[serde(default)]
    pub deep: bool,
}

/// GET /health
///
/// Always 200 for load balancers; `?deep=true` also pings the account store
/// and answers 503 when it is unreachable.
pub async fn health(
    State(state): State<AppState>,
    query: Option<Query<HealthQuery>>,
) -> impl IntoResponse {
    let deep = query.map(|Query(q)| q.deep).unwrap_or(false);
    let timestamp = Utc::now().to_rfc3339();

    if !deep {
        return (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": SERVICE_NAME,
                "timestamp": timestamp,
            })),
        );
    }

    match state.accounts.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": SERVICE_NAME,
                "timestamp": timestamp,
                "database": "connected",
            })),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "Health check could not reach the account store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": SERVICE_NAME,
                    "timestamp": timestamp,
                    "database": "disconnected",
                })),
            )
        }
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
