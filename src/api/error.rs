use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AttendanceError, AuthError, Denial, EmployeeError, PaymentError};

const INTERNAL_ERROR_MESSAGE: &str = "Server error";

/// Message of an internal error, attached to the response as an extension.
/// It never reaches the client unless the router exposes it.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

/// Response mapper installed on development routers: rewrites internal
/// error bodies to carry their message in `details`.
pub async fn expose_internal_details(mut response: Response) -> Response {
    match response.extensions_mut().remove::<InternalErrorDetail>() {
        Some(InternalErrorDetail(detail)) => {
            let body = ApiResponse::<()>::error(INTERNAL_ERROR_MESSAGE, Some(detail));
            (response.status(), Json(body)).into_response()
        }
        None => response,
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    Conflict(String),

    Unauthorized(String),

    Forbidden(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                let body = ApiResponse::<()>::error(INTERNAL_ERROR_MESSAGE, None);
                let mut response =
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
                response.extensions_mut().insert(InternalErrorDetail(msg));
                return response;
            }
        };

        let body = ApiResponse::<()>::error(message, None);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(format!("{err:#}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::ValidationError(rejection.body_text())
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => Self::Unauthorized("Authentication required".to_string()),
            Denial::Forbidden { .. } => Self::Forbidden(
                "You don't have permission to perform this action".to_string(),
            ),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::InvalidToken => Self::Unauthorized("Token is not valid".to_string()),
            AuthError::UserNotFound => Self::NotFound("User not found".to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Conflict(msg) => Self::Conflict(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<EmployeeError> for ApiError {
    fn from(err: EmployeeError) -> Self {
        match err {
            EmployeeError::Validation(msg) => Self::validation(msg),
            EmployeeError::DuplicateNationalId => Self::Conflict(err.to_string()),
            EmployeeError::NotFound | EmployeeError::SiteNotFound | EmployeeError::ProjectNotFound => {
                Self::NotFound(err.to_string())
            }
            EmployeeError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<AttendanceError> for ApiError {
    fn from(err: AttendanceError) -> Self {
        match err {
            AttendanceError::Validation(msg) => Self::validation(msg),
            AttendanceError::EmployeeNotFound
            | AttendanceError::SiteNotFound
            | AttendanceError::NotFound => Self::NotFound(err.to_string()),
            AttendanceError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Validation(msg) => Self::validation(msg),
            PaymentError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, middleware, routing::get};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn failing() -> Result<(), ApiError> {
        Err(ApiError::internal("disk I/O error"))
    }

    async fn call(router: Router) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_details_are_scoped_to_each_router() {
        let development = Router::new()
            .route("/", get(failing))
            .layer(middleware::map_response(expose_internal_details));
        let production = Router::new().route("/", get(failing));

        let (status, body) = call(development).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Server error");
        assert_eq!(body["details"], "disk I/O error");

        let (status, body) = call(production).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Server error");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_client_errors_pass_through_unchanged() {
        async fn missing() -> Result<(), ApiError> {
            Err(ApiError::not_found("Site", 4))
        }

        let router = Router::new()
            .route("/", get(missing))
            .layer(middleware::map_response(expose_internal_details));

        let (status, body) = call(router).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Site 4 not found");
        assert!(body.get("details").is_none());
    }
}
