use serde::Deserialize;
use thiserror::Error;

use crate::db::Employee;

#[derive(Debug, Error)]
pub enum EmployeeError {
    #[error("{0}")]
    Validation(String),

    #[error("National ID already exists")]
    DuplicateNationalId,

    #[error("Employee not found")]
    NotFound,

    #[error("Site not found")]
    SiteNotFound,

    #[error("Project not found")]
    ProjectNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for EmployeeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub category: Option<String>,
    pub position: Option<String>,
    pub pay_rate: Option<f64>,
    pub start_date: Option<String>,
    pub address: Option<String>,
    pub site_id: Option<i32>,
    pub project_id: Option<i32>,
    pub status: Option<String>,
}

#[async_trait::async_trait]
pub trait EmployeeService: Send + Sync {
    async fn list(&self) -> Result<Vec<Employee>, EmployeeError>;

    async fn get(&self, id: i32) -> Result<Employee, EmployeeError>;

    /// # Errors
    ///
    /// [`EmployeeError::Validation`] when the position does not belong to the
    /// category, [`EmployeeError::DuplicateNationalId`] on a reused national id.
    async fn create(&self, input: CreateEmployee) -> Result<Employee, EmployeeError>;

    async fn delete(&self, id: i32) -> Result<(), EmployeeError>;
}
