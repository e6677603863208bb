use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{
    enum_or, optional_text, required_day, required_text, validate_budget, validate_id,
    validate_progress,
};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::{NewProject, Project, Store};
use crate::domain::{EmployeeCategory, ProjectStatus};
use crate::services::{ADMIN_ONLY, CurrentUser, authorize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub budget: Option<f64>,
    pub description: Option<String>,
    pub supervisor_id: Option<i32>,
    pub status: Option<String>,
    pub progress: Option<i32>,
}

impl ProjectRequest {
    async fn validate(self, store: &Store) -> Result<NewProject, ApiError> {
        let name = required_text(self.name, "name")?;
        let location = required_text(self.location, "location")?;
        let start_date = required_day(self.start_date, "startDate")?;
        let end_date = required_day(self.end_date, "endDate")?;
        if end_date < start_date {
            return Err(ApiError::validation("endDate must not be before startDate"));
        }
        let budget = validate_budget(self.budget)?;
        let status = enum_or(self.status, ProjectStatus::NotStarted)?;
        let progress = validate_progress(self.progress)?;

        if let Some(supervisor_id) = self.supervisor_id {
            let supervisor = store
                .get_employee(supervisor_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Employee", supervisor_id))?;
            if supervisor.category != EmployeeCategory::Supervisor {
                return Err(ApiError::validation(format!(
                    "Employee {supervisor_id} is not a supervisor"
                )));
            }
        }

        Ok(NewProject {
            name,
            location,
            start_date,
            end_date,
            budget,
            description: optional_text(self.description),
            supervisor_id: self.supervisor_id,
            status,
            progress,
        })
    }
}

/// GET /projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = state.store().list_projects().await?;
    Ok(Json(ApiResponse::success(projects)))
}

/// GET /projects/{id}
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let id = validate_id(id, "project")?;
    let project = state
        .store()
        .get_project(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project", id))?;
    Ok(Json(ApiResponse::success(project)))
}

/// POST /projects (admin)
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    payload: Result<Json<ProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Project>>), ApiError> {
    authorize(Some(&caller), ADMIN_ONLY)?;
    let Json(payload) = payload?;

    let store = state.store();
    let project = payload.validate(store).await?;
    let project = store.create_project(project).await?;

    tracing::info!(project_id = project.id, user_id = caller.id, "Project created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(project))))
}

/// PUT /projects/{id} (admin)
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<ProjectRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    authorize(Some(&caller), ADMIN_ONLY)?;
    let id = validate_id(id, "project")?;
    let Json(payload) = payload?;

    let store = state.store();
    let project = payload.validate(store).await?;
    let project = store
        .update_project(id, project)
        .await?
        .ok_or_else(|| ApiError::not_found("Project", id))?;
    Ok(Json(ApiResponse::success(project)))
}

/// DELETE /projects/{id} (admin)
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    authorize(Some(&caller), ADMIN_ONLY)?;
    let id = validate_id(id, "project")?;
    if !state.store().delete_project(id, state.today()).await? {
        return Err(ApiError::not_found("Project", id));
    }

    tracing::info!(project_id = id, user_id = caller.id, "Project deleted");
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Project deleted successfully",
    ))))
}
