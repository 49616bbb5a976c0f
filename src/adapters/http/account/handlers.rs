//! HTTP handlers for registration and login.
//!
//! Both answer with the account summary `{id, email, plan, pastDue, cardLast4}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::account::{LoginCommand, RegisterCommand};

use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::{LoginRequest, RegisterRequest};

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let summary = state
        .register_handler()
        .handle(RegisterCommand {
            email: request.email,
            password: request.password,
            plan: request.plan,
            card_last4: request.card_last4,
            credit_card_token: request.credit_card_token,
            billing_zip: request.billing_zip,
            expiry_month: request.expiry_month,
            expiry_year: request.expiry_year,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let summary = state
        .login_handler()
        .handle(LoginCommand {
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok(Json(summary))
}
