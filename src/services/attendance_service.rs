//! Domain service for the attendance ledger.
//!
//! Every write is keyed on (employee, date, site) and keeps the employee's
//! `present`/`hours` fields in step for rows dated today.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{AttendanceRow, Employee, StatusCount};

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{0}")]
    Validation(String),

    #[error("Employee not found")]
    EmployeeNotFound,

    #[error("Site not found")]
    SiteNotFound,

    #[error("Attendance record not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AttendanceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Attendance fields as submitted. Everything is optional here so that
/// validation can name the missing field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceInput {
    /// Bulk only: update this existing row instead of upserting by key.
    pub id: Option<i32>,
    pub employee_id: Option<i32>,
    pub site_id: Option<i32>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

/// Merge patch for a single row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceUpdate {
    pub status: Option<String>,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub employee_id: Option<i32>,
    pub site_id: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub site_id: Option<i32>,
}

/// Result of a write: the row and whether it was newly created.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub created: bool,
    pub record: AttendanceRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure {
    pub record: serde_json::Value,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkOutcome {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub errors: Vec<BulkFailure>,
}

/// Body of the employee-level attendance shortcut.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendance {
    pub present: bool,
    pub hours: Option<f64>,
    pub site_id: Option<i32>,
}

#[async_trait::async_trait]
pub trait AttendanceService: Send + Sync {
    /// Creates the row for the input's key or merges into the existing one.
    ///
    /// # Errors
    ///
    /// [`AttendanceError::EmployeeNotFound`] / [`AttendanceError::SiteNotFound`]
    /// when a reference is dangling, [`AttendanceError::Validation`] for
    /// malformed input.
    async fn record(&self, input: AttendanceInput) -> Result<Recorded, AttendanceError>;

    /// Processes each record on its own; failures are collected, not raised.
    async fn record_bulk(&self, records: Vec<serde_json::Value>) -> BulkOutcome;

    async fn update(&self, id: i32, update: AttendanceUpdate)
    -> Result<AttendanceRow, AttendanceError>;

    async fn delete(&self, id: i32) -> Result<(), AttendanceError>;

    async fn get(&self, id: i32) -> Result<AttendanceRow, AttendanceError>;

    async fn list(&self, query: AttendanceQuery) -> Result<Vec<AttendanceRow>, AttendanceError>;

    async fn summarize(&self, query: SummaryQuery) -> Result<Vec<StatusCount>, AttendanceError>;

    /// Records today's attendance for one employee through the ledger and
    /// returns the refreshed employee.
    async fn mark_today(
        &self,
        employee_id: i32,
        mark: MarkAttendance,
    ) -> Result<Employee, AttendanceError>;
}
