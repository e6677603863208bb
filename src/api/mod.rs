use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post, put},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clock::Clock;
use crate::config::Config;
use crate::state::SharedState;

mod attendance;
pub mod auth;
mod contractors;
mod employees;
mod error;
mod payments;
mod projects;
mod sites;
mod suppliers;
mod types;
mod users;
mod validation;

pub use error::{ApiError, expose_internal_details};
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{AttendanceService, AuthService, EmployeeService, PaymentService};

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn today(&self) -> chrono::NaiveDate {
        self.shared.clock.today()
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn employee_service(&self) -> &Arc<dyn EmployeeService> {
        &self.shared.employee_service
    }

    #[must_use]
    pub fn attendance_service(&self) -> &Arc<dyn AttendanceService> {
        &self.shared.attendance_service
    }

    #[must_use]
    pub fn payment_service(&self) -> &Arc<dyn PaymentService> {
        &self.shared.payment_service
    }
}

#[must_use]
pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared))
}

/// Same as [`create_app_state_from_config`], with an injected clock.
pub async fn create_app_state_with_clock(
    config: Config,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_clock(config, clock).await?);
    Ok(create_app_state(shared))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// GET /health
async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthStatus>>, ApiError> {
    state.store().ping().await?;
    Ok(Json(ApiResponse::success(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, development) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.general.is_development(),
        )
    };
    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/health", get(health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let mut app = Router::new().nest("/api", api_router);
    if development {
        app = app.layer(middleware::map_response(expose_internal_details));
    }

    app.layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::update_profile))
        .route("/users/{id}", delete(users::delete_user))
        .route("/users/{id}/role", patch(users::change_role))
        .route("/employees", get(employees::list_employees))
        .route("/employees", post(employees::create_employee))
        .route("/employees/{id}", get(employees::get_employee))
        .route("/employees/{id}", delete(employees::delete_employee))
        .route(
            "/employees/{id}/attendance",
            patch(employees::mark_attendance),
        )
        .route("/projects", get(projects::list_projects))
        .route("/projects", post(projects::create_project))
        .route("/projects/{id}", get(projects::get_project))
        .route("/projects/{id}", put(projects::update_project))
        .route("/projects/{id}", delete(projects::delete_project))
        .route("/projects/{id}/sites", get(sites::list_project_sites))
        .route("/projects/{id}/sites", post(sites::create_project_site))
        .route("/sites", get(sites::list_sites))
        .route("/sites", post(sites::create_site))
        .route("/sites/{id}", get(sites::get_site))
        .route("/sites/{id}", put(sites::update_site))
        .route("/sites/{id}", delete(sites::delete_site))
        .route("/contractors", get(contractors::list_contractors))
        .route("/contractors", post(contractors::create_contractor))
        .route("/contractors/{id}", get(contractors::get_contractor))
        .route("/suppliers", get(suppliers::list_suppliers))
        .route("/suppliers", post(suppliers::create_supplier))
        .route("/suppliers/{id}", get(suppliers::get_supplier))
        .route("/suppliers/{id}", put(suppliers::update_supplier))
        .route("/suppliers/{id}", delete(suppliers::delete_supplier))
        .route("/attendance", get(attendance::list_attendance))
        .route("/attendance", post(attendance::record_attendance))
        .route("/attendance/bulk", post(attendance::record_bulk))
        .route("/attendance/summary", get(attendance::summary))
        .route("/attendance/{id}", get(attendance::get_attendance))
        .route("/attendance/{id}", put(attendance::update_attendance))
        .route("/attendance/{id}", delete(attendance::delete_attendance))
        .route("/payments", get(payments::list_payments))
        .route("/payments", post(payments::create_payment))
        .route("/payments/statistics", get(payments::statistics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
