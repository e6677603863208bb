use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::Role;

pub mod migrator;
pub mod repositories;

pub use repositories::attendance::{
    AttendanceFilter, AttendancePatch, AttendanceRow, AttendanceWrite, StatusCount, WriteOutcome,
};
pub use repositories::contractor::{Contractor, ContractorConflict, NewContractor};
pub use repositories::employee::{Employee, NewEmployee};
pub use repositories::payment::{NewPayment, Payment, PaymentTotals};
pub use repositories::project::{NewProject, Project};
pub use repositories::site::{NewSite, Site};
pub use repositories::supplier::{NewSupplier, Supplier};
pub use repositories::user::{NewUser, ProfileUpdate, User};

/// True when the error chain holds a unique-constraint violation raised by
/// the database.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<DbErr>())
        .any(|e| matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))))
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn employee_repo(&self) -> repositories::employee::EmployeeRepository {
        repositories::employee::EmployeeRepository::new(self.conn.clone())
    }

    fn site_repo(&self) -> repositories::site::SiteRepository {
        repositories::site::SiteRepository::new(self.conn.clone())
    }

    fn project_repo(&self) -> repositories::project::ProjectRepository {
        repositories::project::ProjectRepository::new(self.conn.clone())
    }

    fn attendance_repo(&self) -> repositories::attendance::AttendanceRepository {
        repositories::attendance::AttendanceRepository::new(self.conn.clone())
    }

    fn contractor_repo(&self) -> repositories::contractor::ContractorRepository {
        repositories::contractor::ContractorRepository::new(self.conn.clone())
    }

    fn supplier_repo(&self) -> repositories::supplier::SupplierRepository {
        repositories::supplier::SupplierRepository::new(self.conn.clone())
    }

    fn payment_repo(&self) -> repositories::payment::PaymentRepository {
        repositories::payment::PaymentRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn create_user(&self, user: NewUser, security: &SecurityConfig) -> Result<User> {
        self.user_repo().create(user, security).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        self.user_repo().get_by_phone(phone).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn verify_user_password(&self, phone: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(phone, password).await
    }

    pub async fn update_user_role(&self, id: i32, role: Role) -> Result<Option<User>> {
        self.user_repo().update_role(id, role).await
    }

    pub async fn update_user_profile(&self, id: i32, update: ProfileUpdate) -> Result<Option<User>> {
        self.user_repo().update_profile(id, update).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    // ------------------------------------------------------------------
    // Employees
    // ------------------------------------------------------------------

    pub async fn list_employees(&self) -> Result<Vec<Employee>> {
        self.employee_repo().list().await
    }

    pub async fn get_employee(&self, id: i32) -> Result<Option<Employee>> {
        self.employee_repo().get(id).await
    }

    pub async fn find_employee_by_name(&self, name: &str) -> Result<Option<Employee>> {
        self.employee_repo().find_by_name(name).await
    }

    pub async fn create_employee(&self, employee: NewEmployee) -> Result<Employee> {
        self.employee_repo().create(employee).await
    }

    pub async fn delete_employee(&self, id: i32) -> Result<bool> {
        self.employee_repo().delete(id).await
    }

    // ------------------------------------------------------------------
    // Projects & sites
    // ------------------------------------------------------------------

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.project_repo().list().await
    }

    pub async fn get_project(&self, id: i32) -> Result<Option<Project>> {
        self.project_repo().get(id).await
    }

    pub async fn create_project(&self, project: NewProject) -> Result<Project> {
        self.project_repo().create(project).await
    }

    pub async fn update_project(&self, id: i32, project: NewProject) -> Result<Option<Project>> {
        self.project_repo().update(id, project).await
    }

    /// Deletes a project with its sites and their ledger rows; see
    /// [`Store::delete_site`].
    pub async fn delete_project(&self, id: i32, today: NaiveDate) -> Result<bool> {
        self.project_repo().delete(id, today).await
    }

    pub async fn list_sites(&self, project_id: Option<i32>) -> Result<Vec<Site>> {
        self.site_repo().list(project_id).await
    }

    pub async fn get_site(&self, id: i32) -> Result<Option<Site>> {
        self.site_repo().get(id).await
    }

    pub async fn create_site(&self, site: NewSite) -> Result<Site> {
        self.site_repo().create(site).await
    }

    pub async fn update_site(&self, id: i32, site: NewSite) -> Result<Option<Site>> {
        self.site_repo().update(id, site).await
    }

    /// Deletes a site with its ledger rows. Rows dated `today` are reversed
    /// out of the employee aggregate before they go.
    pub async fn delete_site(&self, id: i32, today: NaiveDate) -> Result<bool> {
        self.site_repo().delete(id, today).await
    }

    // ------------------------------------------------------------------
    // Contractors & suppliers
    // ------------------------------------------------------------------

    pub async fn list_contractors(&self) -> Result<Vec<Contractor>> {
        self.contractor_repo().list().await
    }

    pub async fn get_contractor(&self, id: i32) -> Result<Option<Contractor>> {
        self.contractor_repo().get(id).await
    }

    pub async fn find_contractor_conflict(
        &self,
        contractor: &NewContractor,
    ) -> Result<Option<ContractorConflict>> {
        self.contractor_repo().find_conflict(contractor).await
    }

    pub async fn create_contractor(&self, contractor: NewContractor) -> Result<Contractor> {
        self.contractor_repo().create(contractor).await
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>> {
        self.supplier_repo().list().await
    }

    pub async fn get_supplier(&self, id: i32) -> Result<Option<Supplier>> {
        self.supplier_repo().get(id).await
    }

    pub async fn create_supplier(&self, supplier: NewSupplier) -> Result<Supplier> {
        self.supplier_repo().create(supplier).await
    }

    pub async fn update_supplier(&self, id: i32, supplier: NewSupplier) -> Result<Option<Supplier>> {
        self.supplier_repo().update(id, supplier).await
    }

    pub async fn delete_supplier(&self, id: i32) -> Result<bool> {
        self.supplier_repo().delete(id).await
    }

    // ------------------------------------------------------------------
    // Attendance ledger
    // ------------------------------------------------------------------

    pub async fn upsert_attendance(
        &self,
        write: AttendanceWrite,
        today: NaiveDate,
    ) -> Result<WriteOutcome> {
        self.attendance_repo().upsert(write, today).await
    }

    pub async fn update_attendance(
        &self,
        id: i32,
        patch: AttendancePatch,
        today: NaiveDate,
    ) -> Result<Option<AttendanceRow>> {
        self.attendance_repo().update(id, patch, today).await
    }

    pub async fn delete_attendance(&self, id: i32, today: NaiveDate) -> Result<Option<AttendanceRow>> {
        self.attendance_repo().delete(id, today).await
    }

    pub async fn get_attendance(&self, id: i32) -> Result<Option<AttendanceRow>> {
        self.attendance_repo().get(id).await
    }

    pub async fn list_attendance(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRow>> {
        self.attendance_repo().list(filter).await
    }

    pub async fn summarize_attendance(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        site_id: Option<i32>,
    ) -> Result<Vec<StatusCount>> {
        self.attendance_repo().summarize(start, end, site_id).await
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    pub async fn create_payment(&self, payment: NewPayment) -> Result<Payment> {
        self.payment_repo().create(payment).await
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        self.payment_repo().list().await
    }

    pub async fn payment_totals(&self) -> Result<Vec<PaymentTotals>> {
        self.payment_repo().totals_by_type().await
    }
}
