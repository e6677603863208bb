use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;

use crate::domain::attendance::AggregateChange;
use crate::domain::{EmployeeCategory, EmployeeStatus};
use crate::entities::{employees, prelude::*};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub national_id: String,
    pub category: EmployeeCategory,
    pub position: String,
    pub pay_rate: f64,
    pub start_date: String,
    pub address: Option<String>,
    pub site_id: Option<i32>,
    pub project_id: Option<i32>,
    pub status: EmployeeStatus,
    pub present: bool,
    pub hours: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<employees::Model> for Employee {
    type Error = anyhow::Error;

    fn try_from(m: employees::Model) -> Result<Self> {
        Ok(Self {
            category: m.category.parse()?,
            status: m.status.parse()?,
            id: m.id,
            name: m.name,
            phone: m.phone,
            national_id: m.national_id,
            position: m.position,
            pay_rate: m.pay_rate,
            start_date: m.start_date,
            address: m.address,
            site_id: m.site_id,
            project_id: m.project_id,
            present: m.present,
            hours: m.hours,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

/// Validated input for a new employee.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub phone: String,
    pub national_id: String,
    pub category: EmployeeCategory,
    pub position: String,
    pub pay_rate: f64,
    pub start_date: String,
    pub address: Option<String>,
    pub site_id: Option<i32>,
    pub project_id: Option<i32>,
    pub status: EmployeeStatus,
}

pub struct EmployeeRepository {
    conn: DatabaseConnection,
}

impl EmployeeRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<Employee>> {
        Employees::find()
            .order_by_desc(employees::Column::CreatedAt)
            .order_by_desc(employees::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list employees")?
            .into_iter()
            .map(Employee::try_from)
            .collect()
    }

    pub async fn get(&self, id: i32) -> Result<Option<Employee>> {
        Employees::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query employee")?
            .map(Employee::try_from)
            .transpose()
    }

    /// First employee with exactly this name, oldest first.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Employee>> {
        Employees::find()
            .filter(employees::Column::Name.eq(name))
            .order_by_asc(employees::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query employee by name")?
            .map(Employee::try_from)
            .transpose()
    }

    pub async fn create(&self, employee: NewEmployee) -> Result<Employee> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = employees::ActiveModel {
            name: Set(employee.name),
            phone: Set(employee.phone),
            national_id: Set(employee.national_id),
            category: Set(employee.category.as_str().to_string()),
            position: Set(employee.position),
            pay_rate: Set(employee.pay_rate),
            start_date: Set(employee.start_date),
            address: Set(employee.address),
            site_id: Set(employee.site_id),
            project_id: Set(employee.project_id),
            status: Set(employee.status.as_str().to_string()),
            present: Set(false),
            hours: Set(0.0),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        // Unique violations on national_id stay as DbErr for the caller.
        let model = active.insert(&self.conn).await?;
        Employee::try_from(model)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Employees::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete employee")?;

        Ok(result.rows_affected > 0)
    }
}

/// Applies an aggregate change with an in-database increment so concurrent
/// writers never lose each other's deltas.
pub async fn apply_aggregate<C: ConnectionTrait>(
    conn: &C,
    employee_id: i32,
    change: AggregateChange,
) -> Result<()> {
    if change.is_noop() {
        return Ok(());
    }

    let mut update = Employees::update_many()
        .col_expr(
            employees::Column::Hours,
            Expr::col(employees::Column::Hours).add(change.hours_delta),
        )
        .col_expr(
            employees::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().to_rfc3339()),
        );

    if let Some(present) = change.present {
        update = update.col_expr(employees::Column::Present, Expr::value(present));
    }

    update
        .filter(employees::Column::Id.eq(employee_id))
        .exec(conn)
        .await
        .context("Failed to update employee attendance aggregate")?;

    Ok(())
}
