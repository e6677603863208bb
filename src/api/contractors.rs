use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{
    enum_or, optional_text, required_email, required_enum, required_text, validate_id,
    validate_rate,
};
use super::{ApiError, ApiResponse, AppState};
use crate::db::{Contractor, NewContractor, Store, is_unique_violation};
use crate::domain::{Availability, ContractorStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub specialization: Option<String>,
    pub tin: Option<String>,
    pub license: Option<String>,
    pub address: Option<String>,
    pub rate: Option<f64>,
    pub status: Option<String>,
    pub availability: Option<String>,
    pub active_project_id: Option<i32>,
}

impl ContractorRequest {
    async fn validate(self, store: &Store) -> Result<NewContractor, ApiError> {
        let contractor = NewContractor {
            name: required_text(self.name, "name")?,
            phone: required_text(self.phone, "phone")?,
            email: required_email(self.email)?,
            specialization: required_enum(self.specialization, "specialization")?,
            tin: required_text(self.tin, "tin")?,
            license: required_text(self.license, "license")?,
            address: optional_text(self.address),
            rate: validate_rate(self.rate)?,
            status: enum_or(self.status, ContractorStatus::Active)?,
            availability: enum_or(self.availability, Availability::Available)?,
            active_project_id: self.active_project_id,
        };

        if let Some(project_id) = contractor.active_project_id
            && store.get_project(project_id).await?.is_none()
        {
            return Err(ApiError::not_found("Project", project_id));
        }

        Ok(contractor)
    }
}

/// GET /contractors
pub async fn list_contractors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Contractor>>>, ApiError> {
    let contractors = state.store().list_contractors().await?;
    Ok(Json(ApiResponse::success(contractors)))
}

/// GET /contractors/{id}
pub async fn get_contractor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Contractor>>, ApiError> {
    let id = validate_id(id, "contractor")?;
    let contractor = state
        .store()
        .get_contractor(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contractor", id))?;
    Ok(Json(ApiResponse::success(contractor)))
}

/// POST /contractors
pub async fn create_contractor(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContractorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Contractor>>), ApiError> {
    let Json(payload) = payload?;

    let store = state.store();
    let contractor = payload.validate(store).await?;
    if let Some(conflict) = store.find_contractor_conflict(&contractor).await? {
        return Err(ApiError::Conflict(conflict.message().to_string()));
    }

    let contractor = match store.create_contractor(contractor).await {
        Ok(contractor) => contractor,
        Err(err) if is_unique_violation(&err) => {
            return Err(ApiError::Conflict(
                "Contractor email, TIN or license already registered".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        contractor_id = contractor.id,
        specialization = %contractor.specialization,
        "Contractor created"
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::success(contractor))))
}
