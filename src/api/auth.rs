use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::db::User;
use crate::services::{AuthResult, CurrentUser, SignupInput, TokenService};

/// Legacy header some clients still send the token in.
const LEGACY_TOKEN_HEADER: &str = "x-auth-token";

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
    pub role: Option<String>,
}

impl From<SignupRequest> for SignupInput {
    fn from(req: SignupRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            phone: req.phone,
            role: req.role,
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires a valid session token and exposes the caller to handlers as an
/// `Extension<CurrentUser>`. Checks:
/// 1. `Authorization: Bearer <token>` header
/// 2. `x-auth-token` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_token(&headers) else {
        return Err(ApiError::Unauthorized(
            "No token, authorization denied".to_string(),
        ));
    };

    let user = state.auth_service().verify(&token).map_err(|e| {
        tracing::debug!("Token verification failed: {e}");
        ApiError::Unauthorized("Token is not valid".to_string())
    })?;

    tracing::Span::current().record("user_id", user.id);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = TokenService::extract_from_header(auth_str)
    {
        return Some(token.to_string());
    }

    if let Some(legacy) = headers.get(LEGACY_TOKEN_HEADER)
        && let Ok(token) = legacy.to_str()
        && !token.trim().is_empty()
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResult>>), ApiError> {
    let Json(payload) = payload?;
    let result = state.auth_service().signup(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(result))))
}

/// POST /auth/login
/// Authenticate with phone and password, returns a token on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AuthResult>>, ApiError> {
    let Json(payload) = payload?;
    let result = state
        .auth_service()
        .login(&payload.phone, &payload.password)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.auth_service().me(user.id).await?;
    Ok(Json(ApiResponse::success(user)))
}
