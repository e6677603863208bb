use async_trait::async_trait;
use tracing::info;

use crate::db::{Employee, NewEmployee, Store, is_unique_violation};
use crate::domain::positions::{is_valid_position, positions_for};
use crate::domain::{EmployeeCategory, EmployeeStatus, format_day, parse_day};
use crate::services::employee_service::{CreateEmployee, EmployeeError, EmployeeService};

pub struct SeaOrmEmployeeService {
    store: Store,
}

impl SeaOrmEmployeeService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, EmployeeError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EmployeeError::Validation(format!("{field} is required")))
}

fn validate(input: CreateEmployee) -> Result<NewEmployee, EmployeeError> {
    let name = required(input.name, "name")?;
    let phone = required(input.phone, "phone")?;
    let national_id = required(input.national_id, "nationalId")?;

    let category: EmployeeCategory = required(input.category, "category")?
        .parse()
        .map_err(|e: crate::domain::ParseEnumError| EmployeeError::Validation(e.to_string()))?;

    let position = required(input.position, "position")?;
    if !is_valid_position(category, &position) {
        return Err(EmployeeError::Validation(format!(
            "Position '{position}' is not valid for category '{category}'. Expected one of: {}",
            positions_for(category).join(", ")
        )));
    }

    let pay_rate = input
        .pay_rate
        .ok_or_else(|| EmployeeError::Validation("payRate is required".to_string()))?;
    if !pay_rate.is_finite() || pay_rate <= 0.0 {
        return Err(EmployeeError::Validation(
            "payRate must be greater than 0".to_string(),
        ));
    }

    let start_date = required(input.start_date, "startDate")?;
    let start_date = parse_day(&start_date)
        .map(format_day)
        .ok_or_else(|| EmployeeError::Validation("startDate must be a date".to_string()))?;

    let status = match input.status.as_deref().map(str::trim) {
        None | Some("") => EmployeeStatus::Active,
        Some(value) => value
            .parse()
            .map_err(|e: crate::domain::ParseEnumError| EmployeeError::Validation(e.to_string()))?,
    };

    Ok(NewEmployee {
        name,
        phone,
        national_id,
        category,
        position,
        pay_rate,
        start_date,
        address: input.address.filter(|a| !a.trim().is_empty()),
        site_id: input.site_id,
        project_id: input.project_id,
        status,
    })
}

#[async_trait]
impl EmployeeService for SeaOrmEmployeeService {
    async fn list(&self) -> Result<Vec<Employee>, EmployeeError> {
        Ok(self.store.list_employees().await?)
    }

    async fn get(&self, id: i32) -> Result<Employee, EmployeeError> {
        self.store
            .get_employee(id)
            .await?
            .ok_or(EmployeeError::NotFound)
    }

    async fn create(&self, input: CreateEmployee) -> Result<Employee, EmployeeError> {
        let employee = validate(input)?;

        if let Some(site_id) = employee.site_id
            && self.store.get_site(site_id).await?.is_none()
        {
            return Err(EmployeeError::SiteNotFound);
        }

        if let Some(project_id) = employee.project_id
            && self.store.get_project(project_id).await?.is_none()
        {
            return Err(EmployeeError::ProjectNotFound);
        }

        match self.store.create_employee(employee).await {
            Ok(employee) => {
                info!(employee_id = employee.id, name = %employee.name, "Employee created");
                Ok(employee)
            }
            Err(err) if is_unique_violation(&err) => Err(EmployeeError::DuplicateNationalId),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, id: i32) -> Result<(), EmployeeError> {
        if self.store.delete_employee(id).await? {
            info!(employee_id = id, "Employee deleted");
            Ok(())
        } else {
            Err(EmployeeError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn electrician() -> CreateEmployee {
        CreateEmployee {
            name: Some("Jane Wanjiru".to_string()),
            phone: Some("0712345678".to_string()),
            national_id: Some("12345678".to_string()),
            category: Some("skilled".to_string()),
            position: Some("Electrician".to_string()),
            pay_rate: Some(5000.0),
            start_date: Some("2024-01-01".to_string()),
            ..CreateEmployee::default()
        }
    }

    #[test]
    fn valid_input_defaults_to_active() {
        let employee = validate(electrician()).unwrap();
        assert_eq!(employee.category, EmployeeCategory::Skilled);
        assert_eq!(employee.status, EmployeeStatus::Active);
        assert_eq!(employee.start_date, "2024-01-01");
    }

    #[test]
    fn position_must_match_category() {
        let err = validate(CreateEmployee {
            category: Some("unskilled".to_string()),
            ..electrician()
        })
        .unwrap_err();
        assert!(matches!(err, EmployeeError::Validation(msg) if msg.contains("Electrician")));
    }

    #[test]
    fn pay_rate_must_be_positive() {
        for rate in [0.0, -10.0, f64::NAN] {
            let result = validate(CreateEmployee {
                pay_rate: Some(rate),
                ..electrician()
            });
            assert!(matches!(result, Err(EmployeeError::Validation(_))));
        }
    }

    #[test]
    fn missing_national_id_is_named() {
        let err = validate(CreateEmployee {
            national_id: None,
            ..electrician()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "nationalId is required");
    }
}
