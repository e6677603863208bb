use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};
use serde::Serialize;

use crate::domain::{
    PaymentCategory, PaymentMethod, PaymentStatus, PaymentType, RecipientType,
};
use crate::entities::{payments, prelude::*};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i32,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub amount: f64,
    pub recipient: String,
    pub recipient_type: RecipientType,
    pub category: PaymentCategory,
    pub description: Option<String>,
    pub date: String,
    pub payment_method: PaymentMethod,
    pub reference: Option<String>,
    pub status: PaymentStatus,
    pub project_reference: Option<String>,
    pub site_reference: Option<String>,
    pub position: Option<String>,
    pub employee_type: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<payments::Model> for Payment {
    type Error = anyhow::Error;

    fn try_from(m: payments::Model) -> Result<Self> {
        Ok(Self {
            payment_type: m.payment_type.parse()?,
            recipient_type: m.recipient_type.parse()?,
            category: m.category.parse()?,
            payment_method: m.payment_method.parse()?,
            status: m.status.parse()?,
            id: m.id,
            amount: m.amount,
            recipient: m.recipient,
            description: m.description,
            date: m.date,
            reference: m.reference,
            project_reference: m.project_reference,
            site_reference: m.site_reference,
            position: m.position,
            employee_type: m.employee_type,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

/// A validated payment, snapshot fields already resolved.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub payment_type: PaymentType,
    pub amount: f64,
    pub recipient: String,
    pub recipient_type: RecipientType,
    pub category: PaymentCategory,
    pub description: Option<String>,
    pub date: String,
    pub payment_method: PaymentMethod,
    pub reference: Option<String>,
    pub status: PaymentStatus,
    pub project_reference: Option<String>,
    pub site_reference: Option<String>,
    pub position: Option<String>,
    pub employee_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentTotals {
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub total: f64,
    pub count: i64,
}

pub struct PaymentRepository {
    conn: DatabaseConnection,
}

impl PaymentRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, payment: NewPayment) -> Result<Payment> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = payments::ActiveModel {
            payment_type: Set(payment.payment_type.as_str().to_string()),
            amount: Set(payment.amount),
            recipient: Set(payment.recipient),
            recipient_type: Set(payment.recipient_type.as_str().to_string()),
            category: Set(payment.category.as_str().to_string()),
            description: Set(payment.description),
            date: Set(payment.date),
            payment_method: Set(payment.payment_method.as_str().to_string()),
            reference: Set(payment.reference),
            status: Set(payment.status.as_str().to_string()),
            project_reference: Set(payment.project_reference),
            site_reference: Set(payment.site_reference),
            position: Set(payment.position),
            employee_type: Set(payment.employee_type),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert payment")?;

        Payment::try_from(model)
    }

    pub async fn list(&self) -> Result<Vec<Payment>> {
        Payments::find()
            .order_by_desc(payments::Column::Date)
            .order_by_desc(payments::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list payments")?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    /// Sum and count of payments per type. Types with no payments are absent.
    pub async fn totals_by_type(&self) -> Result<Vec<PaymentTotals>> {
        let rows: Vec<(String, f64)> = Payments::find()
            .select_only()
            .column(payments::Column::PaymentType)
            .column(payments::Column::Amount)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load payment amounts")?;

        let mut totals: Vec<PaymentTotals> = Vec::new();
        for (payment_type, amount) in rows {
            let payment_type: PaymentType = payment_type.parse()?;
            match totals.iter_mut().find(|t| t.payment_type == payment_type) {
                Some(entry) => {
                    entry.total += amount;
                    entry.count += 1;
                }
                None => totals.push(PaymentTotals {
                    payment_type,
                    total: amount,
                    count: 1,
                }),
            }
        }

        Ok(totals)
    }
}
