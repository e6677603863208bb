#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use gofartrack::clock::FixedClock;
use gofartrack::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub db_path: std::path::PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

/// Router over a fresh SQLite file whose "today" is fixed to `today`.
pub async fn spawn_app(today: &str) -> TestApp {
    let db_path =
        std::env::temp_dir().join(format!("gofartrack-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.jwt_secret = Some("integration-test-secret".to_string());
    // Cheap hashing keeps the suite fast.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state =
        gofartrack::api::create_app_state_with_clock(config, Arc::new(FixedClock(day(today))))
            .await
            .expect("Failed to create app state");

    TestApp {
        router: gofartrack::api::router(state).await,
        db_path,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Signs up a user and returns its token.
    pub async fn signup(&self, name: &str, phone: &str, role: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({
                    "name": name,
                    "email": format!("{phone}@example.com"),
                    "password": "secret123",
                    "phone": phone,
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.signup("Admin", "0700000001", "admin").await
    }

    pub async fn create_project(&self, admin_token: &str) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/api/projects",
                Some(admin_token),
                Some(json!({
                    "name": "Riverside Tower",
                    "location": "Nairobi",
                    "startDate": "2024-01-01",
                    "endDate": "2024-12-31",
                    "budget": 1_000_000.0,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "project failed: {body}");
        body["data"]["id"].as_i64().unwrap()
    }

    pub async fn create_site(&self, token: &str, project_id: i64) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/api/sites",
                Some(token),
                Some(json!({
                    "name": "Block A",
                    "location": "North plot",
                    "projectId": project_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "site failed: {body}");
        body["data"]["id"].as_i64().unwrap()
    }

    pub async fn create_employee(
        &self,
        token: &str,
        name: &str,
        national_id: &str,
        site_id: Option<i64>,
    ) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/api/employees",
                Some(token),
                Some(json!({
                    "name": name,
                    "phone": "0711000000",
                    "nationalId": national_id,
                    "category": "skilled",
                    "position": "Electrician",
                    "payRate": 5000.0,
                    "startDate": "2023-06-01",
                    "siteId": site_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "employee failed: {body}");
        body["data"]["id"].as_i64().unwrap()
    }

    pub async fn employee(&self, token: &str, id: i64) -> Value {
        let (status, body) = self
            .request("GET", &format!("/api/employees/{id}"), Some(token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"].clone()
    }
}

pub fn assert_hours(value: &Value, expected: f64) {
    let actual = value.as_f64().unwrap();
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected} hours, got {actual}"
    );
}
