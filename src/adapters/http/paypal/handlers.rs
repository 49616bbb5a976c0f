//! HTTP handlers for the PayPal endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::paypal::{
    CancelPayPalSubscriptionCommand, CaptureOrderCommand, CreateOrderCommand,
    CreatePayPalSubscriptionCommand, GetPayPalSubscriptionQuery,
};

use super::super::body_email;
use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::{
    CancelSubscriptionRequest, CaptureOrderRequest, CaptureResponse, CreateOrderRequest,
    CreateSubscriptionRequest, OrderResponse, SubscriptionCreatedResponse, SubscriptionResponse,
    SuccessResponse,
};

/// POST /api/paypal/create-order
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ACTION: &str = "create order";
    let handler = state.create_order_handler().map_err(ApiError::billing(ACTION))?;
    let Json(request) = payload?;
    let cmd = CreateOrderCommand {
        email: body_email(&request.email)?,
        amount: request.amount,
        currency: request.currency,
        description: request.description,
    };

    let result = handler.handle(cmd).await.map_err(ApiError::billing(ACTION))?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(result))))
}

/// POST /api/paypal/capture-order
pub async fn capture_order(
    State(state): State<AppState>,
    payload: Result<Json<CaptureOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ACTION: &str = "capture order";
    let handler = state.capture_order_handler().map_err(ApiError::billing(ACTION))?;
    let Json(request) = payload?;
    if request.order_id.trim().is_empty() {
        return Err(ApiError::invalid_input("orderId is required"));
    }
    let cmd = CaptureOrderCommand {
        email: body_email(&request.email)?,
        order_id: request.order_id,
    };

    let result = handler.handle(cmd).await.map_err(ApiError::billing(ACTION))?;

    Ok(Json(CaptureResponse::from(result)))
}

/// POST /api/paypal/create-subscription
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ACTION: &str = "create subscription";
    let handler = state
        .paypal_create_subscription_handler()
        .map_err(ApiError::billing(ACTION))?;
    let Json(request) = payload?;
    if request.plan_id.trim().is_empty() {
        return Err(ApiError::invalid_input("planId is required"));
    }
    let cmd = CreatePayPalSubscriptionCommand {
        email: body_email(&request.email)?,
        plan_id: request.plan_id,
    };

    let result = handler.handle(cmd).await.map_err(ApiError::billing(ACTION))?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionCreatedResponse::from(result)),
    ))
}

/// GET /api/paypal/subscription/:id
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    const ACTION: &str = "get subscription";
    let handler = state
        .paypal_subscription_handler()
        .map_err(ApiError::billing(ACTION))?;

    let subscription = handler
        .handle(GetPayPalSubscriptionQuery { subscription_id })
        .await
        .map_err(ApiError::billing(ACTION))?;

    Ok(Json(SubscriptionResponse::from(subscription)))
}

/// POST /api/paypal/cancel-subscription
pub async fn cancel_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CancelSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ACTION: &str = "cancel subscription";
    let handler = state
        .paypal_cancel_subscription_handler()
        .map_err(ApiError::billing(ACTION))?;
    let Json(request) = payload?;
    let cmd = CancelPayPalSubscriptionCommand {
        email: body_email(&request.email)?,
        reason: request.reason,
    };

    handler.handle(cmd).await.map_err(ApiError::billing(ACTION))?;

    Ok(Json(SuccessResponse { success: true }))
}
