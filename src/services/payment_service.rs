use serde::Deserialize;
use thiserror::Error;

use crate::db::{Payment, PaymentTotals};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for PaymentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayment {
    #[serde(rename = "type")]
    pub payment_type: Option<String>,
    pub amount: Option<f64>,
    /// Employee id or name when `recipient_type` is `employee`.
    pub recipient: Option<String>,
    pub recipient_type: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub payment_method: Option<String>,
    pub reference: Option<String>,
    pub status: Option<String>,
    pub project_reference: Option<String>,
    pub site_reference: Option<String>,
}

#[async_trait::async_trait]
pub trait PaymentService: Send + Sync {
    /// Records a payment. Employee recipients get their position and
    /// category copied onto the payment when they can be found.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Validation`] for a non-positive amount or an
    /// unknown enumeration value.
    async fn create(&self, input: CreatePayment) -> Result<Payment, PaymentError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<Payment>, PaymentError>;

    async fn statistics(&self) -> Result<Vec<PaymentTotals>, PaymentError>;
}
