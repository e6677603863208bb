use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{
    enum_or, optional_text, required_email, required_enum, required_text, validate_id,
};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::{NewSupplier, Supplier};
use crate::domain::SupplierStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub products: Option<String>,
    pub tin: Option<String>,
    pub website: Option<String>,
    pub status: Option<String>,
}

impl TryFrom<SupplierRequest> for NewSupplier {
    type Error = ApiError;

    fn try_from(req: SupplierRequest) -> Result<Self, ApiError> {
        Ok(Self {
            name: required_text(req.name, "name")?,
            phone: required_text(req.phone, "phone")?,
            email: required_email(req.email)?,
            address: required_text(req.address, "address")?,
            category: required_enum(req.category, "category")?,
            products: required_text(req.products, "products")?,
            tin: required_text(req.tin, "tin")?,
            website: optional_text(req.website),
            status: enum_or(req.status, SupplierStatus::Active)?,
        })
    }
}

/// GET /suppliers
pub async fn list_suppliers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Supplier>>>, ApiError> {
    let suppliers = state.store().list_suppliers().await?;
    Ok(Json(ApiResponse::success(suppliers)))
}

/// GET /suppliers/{id}
pub async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Supplier>>, ApiError> {
    let id = validate_id(id, "supplier")?;
    let supplier = state
        .store()
        .get_supplier(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Supplier", id))?;
    Ok(Json(ApiResponse::success(supplier)))
}

/// POST /suppliers
pub async fn create_supplier(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SupplierRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Supplier>>), ApiError> {
    let Json(payload) = payload?;
    let supplier = state.store().create_supplier(payload.try_into()?).await?;

    tracing::info!(supplier_id = supplier.id, category = %supplier.category, "Supplier created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(supplier))))
}

/// PUT /suppliers/{id}
pub async fn update_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<SupplierRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Supplier>>, ApiError> {
    let id = validate_id(id, "supplier")?;
    let Json(payload) = payload?;

    let supplier = state
        .store()
        .update_supplier(id, payload.try_into()?)
        .await?
        .ok_or_else(|| ApiError::not_found("Supplier", id))?;
    Ok(Json(ApiResponse::success(supplier)))
}

/// DELETE /suppliers/{id}
pub async fn delete_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "supplier")?;
    if !state.store().delete_supplier(id).await? {
        return Err(ApiError::not_found("Supplier", id));
    }

    tracing::info!(supplier_id = id, "Supplier deleted");
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Supplier deleted successfully",
    ))))
}
