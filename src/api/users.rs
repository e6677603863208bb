use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::SignupRequest;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::{ProfileUpdate, User};
use crate::services::{ADMIN_ONLY, CurrentUser, authorize, authorize_self_or_admin};

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// GET /users (admin)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    authorize(Some(&caller), ADMIN_ONLY)?;
    let users = state.auth_service().list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// GET /users/{id} (admin or self)
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let id = validate_id(id, "user")?;
    authorize_self_or_admin(Some(&caller), id)?;
    let user = state.auth_service().get_user(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /users (admin)
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    authorize(Some(&caller), ADMIN_ONLY)?;
    let Json(payload) = payload?;
    let user = state.auth_service().create_user(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// PATCH /users/{id}/role (admin)
///
/// Tokens already issued to the user keep their old role until they expire.
pub async fn change_role(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    authorize(Some(&caller), ADMIN_ONLY)?;
    let id = validate_id(id, "user")?;
    let Json(payload) = payload?;
    let user = state.auth_service().change_role(id, &payload.role).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /users/{id} (admin or self)
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let id = validate_id(id, "user")?;
    authorize_self_or_admin(Some(&caller), id)?;
    let Json(payload) = payload?;

    let update = ProfileUpdate {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
    };
    let user = state.auth_service().update_profile(id, update).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// DELETE /users/{id} (admin)
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    authorize(Some(&caller), ADMIN_ONLY)?;
    let id = validate_id(id, "user")?;
    state.auth_service().delete_user(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "User deleted successfully",
    ))))
}
