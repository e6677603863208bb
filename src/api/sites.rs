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

use super::validation::{enum_or, optional_text, required_text, validate_id, validate_progress};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::{NewSite, Site, Store};
use crate::domain::SiteStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteListQuery {
    pub project_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<i32>,
    pub supervisor_id: Option<i32>,
    pub progress: Option<i32>,
}

impl SiteRequest {
    /// Checks fields and references. `project_id` from the path wins over
    /// the one in the body.
    async fn validate(self, store: &Store, project_id: Option<i32>) -> Result<NewSite, ApiError> {
        let name = required_text(self.name, "name")?;
        let location = required_text(self.location, "location")?;
        let project_id = project_id
            .or(self.project_id)
            .ok_or_else(|| ApiError::validation("projectId is required"))?;
        let project_id = validate_id(project_id, "project")?;
        let status = enum_or(self.status, SiteStatus::Active)?;
        let progress = validate_progress(self.progress)?;

        if store.get_project(project_id).await?.is_none() {
            return Err(ApiError::not_found("Project", project_id));
        }

        if let Some(supervisor_id) = self.supervisor_id
            && store.get_employee(supervisor_id).await?.is_none()
        {
            return Err(ApiError::not_found("Employee", supervisor_id));
        }

        Ok(NewSite {
            name,
            location,
            description: optional_text(self.description),
            status,
            project_id,
            supervisor_id: self.supervisor_id,
            progress,
        })
    }
}

/// GET /sites?projectId=
pub async fn list_sites(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SiteListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Site>>>, ApiError> {
    let Query(query) = query?;
    let sites = state.store().list_sites(query.project_id).await?;
    Ok(Json(ApiResponse::success(sites)))
}

/// GET /sites/{id}
pub async fn get_site(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Site>>, ApiError> {
    let id = validate_id(id, "site")?;
    let site = state
        .store()
        .get_site(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Site", id))?;
    Ok(Json(ApiResponse::success(site)))
}

/// POST /sites
pub async fn create_site(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SiteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Site>>), ApiError> {
    let Json(payload) = payload?;
    insert_site(&state, payload, None).await
}

/// PUT /sites/{id}
pub async fn update_site(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<SiteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Site>>, ApiError> {
    let id = validate_id(id, "site")?;
    let Json(payload) = payload?;

    let store = state.store();
    let site = payload.validate(store, None).await?;
    let site = store
        .update_site(id, site)
        .await?
        .ok_or_else(|| ApiError::not_found("Site", id))?;
    Ok(Json(ApiResponse::success(site)))
}

/// DELETE /sites/{id}
pub async fn delete_site(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "site")?;
    if !state.store().delete_site(id, state.today()).await? {
        return Err(ApiError::not_found("Site", id));
    }

    tracing::info!(site_id = id, "Site deleted");
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Site deleted successfully",
    ))))
}

/// GET /projects/{id}/sites
pub async fn list_project_sites(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Site>>>, ApiError> {
    let project_id = validate_id(project_id, "project")?;
    let store = state.store();
    if store.get_project(project_id).await?.is_none() {
        return Err(ApiError::not_found("Project", project_id));
    }

    let sites = store.list_sites(Some(project_id)).await?;
    Ok(Json(ApiResponse::success(sites)))
}

/// POST /projects/{id}/sites
pub async fn create_project_site(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    payload: Result<Json<SiteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Site>>), ApiError> {
    let Json(payload) = payload?;
    insert_site(&state, payload, Some(project_id)).await
}

async fn insert_site(
    state: &AppState,
    payload: SiteRequest,
    project_id: Option<i32>,
) -> Result<(StatusCode, Json<ApiResponse<Site>>), ApiError> {
    let store = state.store();
    let site = payload.validate(store, project_id).await?;
    let site = store.create_site(site).await?;

    tracing::info!(site_id = site.id, project_id = site.project_id, "Site created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(site))))
}
