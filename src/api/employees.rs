use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::Employee;
use crate::services::{CreateEmployee, MarkAttendance};

/// GET /employees
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Employee>>>, ApiError> {
    let employees = state.employee_service().list().await?;
    Ok(Json(ApiResponse::success(employees)))
}

/// GET /employees/{id}
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    let id = validate_id(id, "employee")?;
    let employee = state.employee_service().get(id).await?;
    Ok(Json(ApiResponse::success(employee)))
}

/// POST /employees
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateEmployee>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Employee>>), ApiError> {
    let Json(payload) = payload?;
    let employee = state.employee_service().create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(employee))))
}

/// DELETE /employees/{id}
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "employee")?;
    state.employee_service().delete(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Employee deleted",
    ))))
}

/// PATCH /employees/{id}/attendance
///
/// Marks today's attendance through the ledger and returns the employee
/// with its refreshed `present`/`hours`.
pub async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<MarkAttendance>, JsonRejection>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    let id = validate_id(id, "employee")?;
    let Json(payload) = payload?;
    let employee = state.attendance_service().mark_today(id, payload).await?;
    Ok(Json(ApiResponse::success(employee)))
}
