use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::db::{Payment, PaymentTotals};
use crate::services::CreatePayment;

/// GET /payments
pub async fn list_payments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, ApiError> {
    let payments = state.payment_service().list().await?;
    Ok(Json(ApiResponse::success(payments)))
}

/// POST /payments
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePayment>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>), ApiError> {
    let Json(payload) = payload?;
    let payment = state.payment_service().create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(payment))))
}

/// GET /payments/statistics
pub async fn statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<PaymentTotals>>>, ApiError> {
    let totals = state.payment_service().statistics().await?;
    Ok(Json(ApiResponse::success(totals)))
}
