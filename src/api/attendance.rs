use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::{AttendanceRow, StatusCount};
use crate::services::{
    AttendanceInput, AttendanceQuery, AttendanceUpdate, BulkOutcome, SummaryQuery,
};

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
}

/// GET /attendance
pub async fn list_attendance(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AttendanceQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<AttendanceRow>>>, ApiError> {
    let Query(query) = query?;
    let rows = state.attendance_service().list(query).await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// POST /attendance
///
/// Creates the record for (employee, date, site), or merges into the one
/// that already exists. Responds 201 on create and 200 on merge.
pub async fn record_attendance(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AttendanceInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AttendanceRow>>), ApiError> {
    let Json(payload) = payload?;
    let recorded = state.attendance_service().record(payload).await?;

    let status = if recorded.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::success(recorded.record))))
}

/// POST /attendance/bulk
pub async fn record_bulk(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BulkRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BulkOutcome>>, ApiError> {
    let Json(payload) = payload?;
    if payload.records.is_empty() {
        return Err(ApiError::validation("No records provided"));
    }

    let outcome = state.attendance_service().record_bulk(payload.records).await;
    Ok(Json(ApiResponse::success(outcome)))
}

/// GET /attendance/summary?startDate=&endDate=&siteId=
pub async fn summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<StatusCount>>>, ApiError> {
    let Query(query) = query?;
    let counts = state.attendance_service().summarize(query).await?;
    Ok(Json(ApiResponse::success(counts)))
}

/// GET /attendance/{id}
pub async fn get_attendance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<AttendanceRow>>, ApiError> {
    let id = validate_id(id, "attendance")?;
    let row = state.attendance_service().get(id).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// PUT /attendance/{id}
pub async fn update_attendance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<AttendanceUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<AttendanceRow>>, ApiError> {
    let id = validate_id(id, "attendance")?;
    let Json(payload) = payload?;
    let row = state.attendance_service().update(id, payload).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// DELETE /attendance/{id}
pub async fn delete_attendance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "attendance")?;
    state.attendance_service().delete(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Attendance record deleted successfully",
    ))))
}
