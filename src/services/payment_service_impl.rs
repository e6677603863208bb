use std::str::FromStr;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::db::{Employee, NewPayment, Payment, PaymentTotals, Store};
use crate::domain::{
    ParseEnumError, PaymentMethod, PaymentStatus, RecipientType, format_day, parse_day,
};
use crate::services::payment_service::{CreatePayment, PaymentError, PaymentService};

pub struct SeaOrmPaymentService {
    store: Store,
}

impl SeaOrmPaymentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Finds the employee a payment names, by id first and then by exact
    /// name. Lookup failures only lose the snapshot.
    async fn find_recipient(&self, recipient: &str) -> Option<Employee> {
        let lookup = match recipient.parse::<i32>() {
            Ok(id) => match self.store.get_employee(id).await {
                Ok(None) => self.store.find_employee_by_name(recipient).await,
                other => other,
            },
            Err(_) => self.store.find_employee_by_name(recipient).await,
        };

        match lookup {
            Ok(employee) => employee,
            Err(err) => {
                warn!(recipient, error = %err, "Employee lookup for payment snapshot failed");
                None
            }
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, PaymentError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PaymentError::Validation(format!("{field} is required")))
}

fn parse_enum<T>(value: &str) -> Result<T, PaymentError>
where
    T: FromStr<Err = ParseEnumError>,
{
    value
        .trim()
        .parse()
        .map_err(|e: ParseEnumError| PaymentError::Validation(e.to_string()))
}

fn optional_enum<T>(value: Option<String>, default: T) -> Result<T, PaymentError>
where
    T: FromStr<Err = ParseEnumError>,
{
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => parse_enum(v),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate(input: CreatePayment) -> Result<NewPayment, PaymentError> {
    let payment_type = parse_enum(&required(input.payment_type, "type")?)?;

    let amount = input
        .amount
        .ok_or_else(|| PaymentError::Validation("amount is required".to_string()))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PaymentError::Validation(
            "amount must be greater than 0".to_string(),
        ));
    }

    let recipient = required(input.recipient, "recipient")?;
    let recipient_type = parse_enum(&required(input.recipient_type, "recipientType")?)?;
    let category = parse_enum(&required(input.category, "category")?)?;

    let date = required(input.date, "date")?;
    let date = parse_day(&date)
        .map(format_day)
        .ok_or_else(|| PaymentError::Validation("date must be a date (YYYY-MM-DD)".to_string()))?;

    Ok(NewPayment {
        payment_type,
        amount,
        recipient,
        recipient_type,
        category,
        description: non_empty(input.description),
        date,
        payment_method: optional_enum(input.payment_method, PaymentMethod::Cash)?,
        reference: non_empty(input.reference),
        status: optional_enum(input.status, PaymentStatus::Completed)?,
        project_reference: non_empty(input.project_reference),
        site_reference: non_empty(input.site_reference),
        position: None,
        employee_type: None,
    })
}

#[async_trait]
impl PaymentService for SeaOrmPaymentService {
    async fn create(&self, input: CreatePayment) -> Result<Payment, PaymentError> {
        let mut payment = validate(input)?;

        if payment.recipient_type == RecipientType::Employee {
            match self.find_recipient(&payment.recipient).await {
                Some(employee) => {
                    payment.position = Some(employee.position);
                    payment.employee_type = Some(employee.category.as_str().to_string());
                }
                None => debug!(
                    recipient = %payment.recipient,
                    "No employee matches payment recipient; recording without snapshot"
                ),
            }
        }

        let payment = self.store.create_payment(payment).await?;
        info!(
            payment_id = payment.id,
            payment_type = %payment.payment_type,
            amount = payment.amount,
            "Payment recorded"
        );

        Ok(payment)
    }

    async fn list(&self) -> Result<Vec<Payment>, PaymentError> {
        Ok(self.store.list_payments().await?)
    }

    async fn statistics(&self) -> Result<Vec<PaymentTotals>, PaymentError> {
        Ok(self.store.payment_totals().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PaymentType;

    fn wages() -> CreatePayment {
        CreatePayment {
            payment_type: Some("expense".to_string()),
            amount: Some(5000.0),
            recipient: Some("Jane".to_string()),
            recipient_type: Some("employee".to_string()),
            category: Some("wages".to_string()),
            date: Some("2024-01-10".to_string()),
            ..CreatePayment::default()
        }
    }

    #[test]
    fn defaults_method_and_status() {
        let payment = validate(wages()).unwrap();
        assert_eq!(payment.payment_type, PaymentType::Expense);
        assert_eq!(payment.payment_method, PaymentMethod::Cash);
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert!(payment.position.is_none());
    }

    #[test]
    fn amount_must_be_positive() {
        for amount in [Some(0.0), Some(-1.0), Some(f64::INFINITY), None] {
            let result = validate(CreatePayment { amount, ..wages() });
            assert!(matches!(result, Err(PaymentError::Validation(_))));
        }
    }

    #[test]
    fn unknown_method_is_rejected() {
        let result = validate(CreatePayment {
            payment_method: Some("cheque".to_string()),
            ..wages()
        });
        assert!(
            matches!(result, Err(PaymentError::Validation(msg)) if msg.contains("cheque"))
        );
    }
}
