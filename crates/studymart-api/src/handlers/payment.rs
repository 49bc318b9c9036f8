//! Payment and escrow order handlers
//!
//! Everything under `/api/v1/payment` delegates to the escrow orchestrator.
//! The webhook handler reads the raw body so the signature is verified over
//! exactly the bytes the gateway signed.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    ApiResponse, ConfirmDeliveryRequest, CreatePaymentRequest, MarkDeliveredRequest, OrderResponse,
    WebhookAck,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Header carrying the gateway's HMAC signature
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Start a purchase
#[utoipa::path(
    post,
    path = "/api/v1/payment/create",
    tag = "Payment",
    request_body = CreatePaymentRequest,
    responses(
        (status = 200, description = "Order created with a gateway hold"),
        (status = 422, description = "Validation failed"),
        (status = 502, description = "Gateway unavailable")
    )
)]
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePaymentRequest>,
) -> ApiResult<Json<ApiResponse<OrderResponse>>> {
    let order = state
        .escrow
        .initiate_purchase(
            request.material_id.into(),
            request.buyer_id.into(),
            request.seller_id.into(),
        )
        .await?;
    Ok(Json(ApiResponse::new(order.into())))
}

/// Gateway webhook callback
#[utoipa::path(
    post,
    path = "/api/v1/payment/webhook",
    tag = "Payment",
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookAck),
        (status = 400, description = "Missing/invalid signature or malformed event")
    )
)]
pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingSignature)?;

    let outcome = state.escrow.confirm_capture(&body, signature).await?;
    Ok(Json(WebhookAck::from(&outcome)))
}

/// Seller reports delivery; issues an OTP to the buyer
#[utoipa::path(
    post,
    path = "/api/v1/payment/mark-delivered",
    tag = "Payment",
    request_body = MarkDeliveredRequest,
    responses(
        (status = 200, description = "Delivery marked, OTP sent"),
        (status = 404, description = "Order not found"),
        (status = 400, description = "Order is not awaiting delivery")
    )
)]
pub async fn mark_delivered(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MarkDeliveredRequest>,
) -> ApiResult<Json<ApiResponse<OrderResponse>>> {
    let order = state.escrow.mark_delivered(request.order_id.into()).await?;
    Ok(Json(ApiResponse::new(order.into())))
}

/// Buyer confirms delivery with the OTP, releasing the escrow
#[utoipa::path(
    post,
    path = "/api/v1/payment/confirm-delivery",
    tag = "Payment",
    request_body = ConfirmDeliveryRequest,
    responses(
        (status = 200, description = "Escrow released to the seller"),
        (status = 401, description = "Wrong OTP"),
        (status = 400, description = "Order is not awaiting confirmation"),
        (status = 410, description = "OTP expired; payment refunded")
    )
)]
pub async fn confirm_delivery(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfirmDeliveryRequest>,
) -> ApiResult<Json<ApiResponse<OrderResponse>>> {
    request.validate()?;
    let order = state
        .escrow
        .confirm_delivery(request.order_id.into(), &request.otp)
        .await?;
    Ok(Json(ApiResponse::new(order.into())))
}

/// Fetch a single order
#[utoipa::path(
    get,
    path = "/api/v1/payment/orders/{id}",
    tag = "Payment",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<OrderResponse>>> {
    let order = state.escrow.order(id.into()).await?;
    Ok(Json(ApiResponse::new(order.into())))
}
