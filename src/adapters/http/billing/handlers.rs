//! HTTP handlers for the Stripe billing endpoints.
//!
//! These handlers connect Axum routes to the billing command/query handlers.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    CancelSubscriptionCommand, CreateSetupIntentCommand, CreateSubscriptionCommand,
    GetBillingHistoryQuery, GetSubscriptionQuery, SavePaymentMethodCommand,
};

use super::super::error::ApiError;
use super::super::state::AppState;
use super::super::{body_email, query_email};
use super::dto::{
    CancelSubscriptionRequest, CancelSubscriptionResponse, CreateSetupIntentRequest,
    CreateSubscriptionRequest, EmailQuery, SavePaymentMethodRequest, SavePaymentMethodResponse,
    SetupIntentResponse, SubscriptionCreatedResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/billing/create-setup-intent
pub async fn create_setup_intent(
    State(state): State<AppState>,
    payload: Result<Json<CreateSetupIntentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ACTION: &str = "create setup intent";
    let Json(request) = payload?;
    let cmd = CreateSetupIntentCommand {
        email: body_email(&request.email)?,
        plan: request.plan,
        price_id: request.price_id,
    };

    let result = state
        .create_setup_intent_handler()
        .map_err(ApiError::billing(ACTION))?
        .handle(cmd)
        .await
        .map_err(ApiError::billing(ACTION))?;

    Ok((StatusCode::CREATED, Json(SetupIntentResponse::from(result))))
}

/// POST /api/billing/save-payment-method
pub async fn save_payment_method(
    State(state): State<AppState>,
    payload: Result<Json<SavePaymentMethodRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ACTION: &str = "save payment method";
    let Json(request) = payload?;
    if request.payment_method_id.trim().is_empty() {
        return Err(ApiError::invalid_input("paymentMethodId is required"));
    }
    let cmd = SavePaymentMethodCommand {
        email: body_email(&request.email)?,
        payment_method_id: request.payment_method_id,
    };

    let result = state
        .save_payment_method_handler()
        .map_err(ApiError::billing(ACTION))?
        .handle(cmd)
        .await
        .map_err(ApiError::billing(ACTION))?;

    Ok(Json(SavePaymentMethodResponse::from(result)))
}

/// POST /api/billing/create-subscription
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ACTION: &str = "create subscription";
    let Json(request) = payload?;
    if request.price_id.trim().is_empty() {
        return Err(ApiError::invalid_input("priceId is required"));
    }
    let cmd = CreateSubscriptionCommand {
        email: body_email(&request.email)?,
        price_id: request.price_id,
    };

    let result = state
        .create_subscription_handler()
        .map_err(ApiError::billing(ACTION))?
        .handle(cmd)
        .await
        .map_err(ApiError::billing(ACTION))?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionCreatedResponse::from(result)),
    ))
}

/// POST /api/billing/cancel-subscription
pub async fn cancel_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CancelSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ACTION: &str = "cancel subscription";
    let Json(request) = payload?;
    let cmd = CancelSubscriptionCommand {
        email: body_email(&request.email)?,
        cancel_immediately: request.cancel_immediately,
    };

    let result = state
        .cancel_subscription_handler()
        .map_err(ApiError::billing(ACTION))?
        .handle(cmd)
        .await
        .map_err(ApiError::billing(ACTION))?;

    Ok(Json(CancelSubscriptionResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/billing/billing-history?email=
pub async fn billing_history(
    State(state): State<AppState>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ACTION: &str = "fetch billing history";
    let Query(query) = query?;
    let query = GetBillingHistoryQuery {
        email: query_email(&query.email)?,
    };

    let history = state
        .billing_history_handler()
        .map_err(ApiError::billing(ACTION))?
        .handle(query)
        .await
        .map_err(ApiError::billing(ACTION))?;

    Ok(Json(history))
}

/// GET /api/billing/subscription?email=
pub async fn subscription(
    State(state): State<AppState>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let query = GetSubscriptionQuery {
        email: query_email(&query.email)?,
    };

    let view = state
        .subscription_handler()
        .handle(query)
        .await
        .map_err(ApiError::billing("fetch subscription"))?;

    Ok(Json(view))
}
