use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::debug;

use super::employee::apply_aggregate;
use crate::domain::attendance::{AggregateChange, affects_aggregate};
use crate::domain::{AttendanceStatus, format_day, parse_day};
use crate::entities::{attendance, employees, prelude::*, sites};

/// A ledger write keyed on (employee, date, site).
#[derive(Debug, Clone)]
pub struct AttendanceWrite {
    pub employee_id: i32,
    pub site_id: i32,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

/// Partial update of an existing row. The key fields cannot change.
#[derive(Debug, Clone, Default)]
pub struct AttendancePatch {
    pub status: Option<AttendanceStatus>,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub employee_id: Option<i32>,
    pub site_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub id: i32,
    pub name: String,
    pub national_id: String,
    pub position: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    pub id: i32,
    pub name: String,
    pub location: String,
}

/// A ledger row populated with employee and site display fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRow {
    pub id: i32,
    pub employee_id: i32,
    pub site_id: i32,
    pub employee: Option<EmployeeSummary>,
    pub site: Option<SiteSummary>,
    pub date: String,
    pub status: AttendanceStatus,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub hours: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub created: bool,
    pub row: AttendanceRow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

pub struct AttendanceRepository {
    conn: DatabaseConnection,
}

impl AttendanceRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts the row for the write's key, or merges into the existing one.
    /// The employee aggregate is adjusted in the same transaction when the
    /// row is dated `today`.
    ///
    /// The insert runs first with `ON CONFLICT DO NOTHING` on the unique key,
    /// so a writer that loses a race to create the key lands on the winner's
    /// row and updates it instead.
    pub async fn upsert(&self, write: AttendanceWrite, today: NaiveDate) -> Result<WriteOutcome> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin attendance transaction")?;

        let now = chrono::Utc::now().to_rfc3339();
        let candidate = attendance::ActiveModel {
            employee_id: Set(write.employee_id),
            site_id: Set(write.site_id),
            date: Set(format_day(write.date)),
            status: Set(write.status.as_str().to_string()),
            clock_in: Set(write.clock_in.clone()),
            clock_out: Set(write.clock_out.clone()),
            hours: Set(write.hours.unwrap_or(0.0)),
            notes: Set(write.notes.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = Attendance::insert(candidate)
            .on_conflict(
                OnConflict::columns([
                    attendance::Column::EmployeeId,
                    attendance::Column::Date,
                    attendance::Column::SiteId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .context("Failed to insert attendance record")?;

        let stored = find_by_key(&txn, write.employee_id, write.site_id, write.date)
            .await?
            .context("Attendance row missing after insert")?;

        let created = inserted > 0;
        let (model, previous_hours) = if created {
            (stored, None)
        } else {
            debug!(
                record_id = stored.id,
                employee_id = write.employee_id,
                site_id = write.site_id,
                date = %write.date,
                "Attendance key exists, merging"
            );
            let previous = stored.hours;
            let model = merge(&txn, stored, &write).await?;
            (model, Some(previous))
        };

        if affects_aggregate(write.date, today) {
            let change = AggregateChange::for_write(write.status, model.hours, previous_hours);
            apply_aggregate(&txn, model.employee_id, change).await?;
        }

        txn.commit()
            .await
            .context("Failed to commit attendance transaction")?;

        let row = self.hydrate_one(model).await?;
        Ok(WriteOutcome { created, row })
    }

    pub async fn update(
        &self,
        id: i32,
        patch: AttendancePatch,
        today: NaiveDate,
    ) -> Result<Option<AttendanceRow>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin attendance transaction")?;

        let Some(existing) = Attendance::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query attendance record")?
        else {
            return Ok(None);
        };

        let previous_hours = existing.hours;
        let status = match patch.status {
            Some(status) => status,
            None => existing.status.parse()?,
        };

        let mut active: attendance::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        if let Some(hours) = patch.hours {
            active.hours = Set(hours);
        }
        if let Some(clock_in) = patch.clock_in {
            active.clock_in = Set(Some(clock_in));
        }
        if let Some(clock_out) = patch.clock_out {
            active.clock_out = Set(Some(clock_out));
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&txn)
            .await
            .context("Failed to update attendance record")?;

        if record_is_today(&model.date, today) {
            let change = AggregateChange::for_write(status, model.hours, Some(previous_hours));
            apply_aggregate(&txn, model.employee_id, change).await?;
        }

        txn.commit()
            .await
            .context("Failed to commit attendance transaction")?;

        self.hydrate_one(model).await.map(Some)
    }

    /// Deletes a row and returns it as it was. Today's rows give their hours
    /// back to the employee aggregate.
    pub async fn delete(&self, id: i32, today: NaiveDate) -> Result<Option<AttendanceRow>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin attendance transaction")?;

        let Some(existing) = Attendance::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query attendance record")?
        else {
            return Ok(None);
        };

        Attendance::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete attendance record")?;

        if record_is_today(&existing.date, today) {
            apply_aggregate(
                &txn,
                existing.employee_id,
                AggregateChange::for_delete(existing.hours),
            )
            .await?;
        }

        txn.commit()
            .await
            .context("Failed to commit attendance transaction")?;

        self.hydrate_one(existing).await.map(Some)
    }

    pub async fn get(&self, id: i32) -> Result<Option<AttendanceRow>> {
        let Some(model) = Attendance::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query attendance record")?
        else {
            return Ok(None);
        };

        self.hydrate_one(model).await.map(Some)
    }

    pub async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRow>> {
        let mut query = Attendance::find();

        if let Some(employee_id) = filter.employee_id {
            query = query.filter(attendance::Column::EmployeeId.eq(employee_id));
        }
        if let Some(site_id) = filter.site_id {
            query = query.filter(attendance::Column::SiteId.eq(site_id));
        }
        if let Some(start) = filter.start_date {
            query = query.filter(attendance::Column::Date.gte(format_day(start)));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(attendance::Column::Date.lte(format_day(end)));
        }
        if let Some(status) = filter.status {
            query = query.filter(attendance::Column::Status.eq(status.as_str()));
        }

        let models = query
            .order_by_desc(attendance::Column::Date)
            .order_by_desc(attendance::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list attendance records")?;

        self.hydrate(models).await
    }

    /// Record counts per status for days in `start..=end`.
    pub async fn summarize(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        site_id: Option<i32>,
    ) -> Result<Vec<StatusCount>> {
        let mut query = Attendance::find()
            .select_only()
            .column(attendance::Column::Status)
            .column_as(Expr::col(attendance::Column::Id).count(), "count")
            .filter(attendance::Column::Date.gte(format_day(start)))
            .filter(attendance::Column::Date.lte(format_day(end)));

        if let Some(site_id) = site_id {
            query = query.filter(attendance::Column::SiteId.eq(site_id));
        }

        let rows: Vec<(String, i64)> = query
            .group_by(attendance::Column::Status)
            .order_by_asc(attendance::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to summarize attendance")?;

        Ok(rows
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn hydrate_one(&self, model: attendance::Model) -> Result<AttendanceRow> {
        self.hydrate(vec![model])
            .await?
            .pop()
            .context("Attendance hydration returned no row")
    }

    /// Attaches employee and site display fields with one lookup per table.
    async fn hydrate(&self, models: Vec<attendance::Model>) -> Result<Vec<AttendanceRow>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let mut employee_ids: Vec<i32> = models.iter().map(|m| m.employee_id).collect();
        employee_ids.sort_unstable();
        employee_ids.dedup();

        let mut site_ids: Vec<i32> = models.iter().map(|m| m.site_id).collect();
        site_ids.sort_unstable();
        site_ids.dedup();

        let employees: HashMap<i32, EmployeeSummary> = Employees::find()
            .filter(employees::Column::Id.is_in(employee_ids))
            .all(&self.conn)
            .await
            .context("Failed to load employees for attendance")?
            .into_iter()
            .map(|e| {
                (
                    e.id,
                    EmployeeSummary {
                        id: e.id,
                        name: e.name,
                        national_id: e.national_id,
                        position: e.position,
                    },
                )
            })
            .collect();

        let sites: HashMap<i32, SiteSummary> = Sites::find()
            .filter(sites::Column::Id.is_in(site_ids))
            .all(&self.conn)
            .await
            .context("Failed to load sites for attendance")?
            .into_iter()
            .map(|s| {
                (
                    s.id,
                    SiteSummary {
                        id: s.id,
                        name: s.name,
                        location: s.location,
                    },
                )
            })
            .collect();

        models
            .into_iter()
            .map(|m| {
                Ok(AttendanceRow {
                    status: m.status.parse()?,
                    employee: employees.get(&m.employee_id).cloned(),
                    site: sites.get(&m.site_id).cloned(),
                    id: m.id,
                    employee_id: m.employee_id,
                    site_id: m.site_id,
                    date: m.date,
                    clock_in: m.clock_in,
                    clock_out: m.clock_out,
                    hours: m.hours,
                    notes: m.notes,
                    created_at: m.created_at,
                    updated_at: m.updated_at,
                })
            })
            .collect()
    }
}

async fn find_by_key<C: ConnectionTrait>(
    conn: &C,
    employee_id: i32,
    site_id: i32,
    date: NaiveDate,
) -> Result<Option<attendance::Model>> {
    Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(employee_id))
        .filter(attendance::Column::SiteId.eq(site_id))
        .filter(attendance::Column::Date.eq(format_day(date)))
        .one(conn)
        .await
        .context("Failed to query attendance by key")
}

/// Removes every ledger row recorded at `site_ids`. Rows dated `today` give
/// their hours back to the employee aggregate first. Runs on the caller's
/// transaction so the rows and their parent go together.
pub async fn remove_for_sites<C: ConnectionTrait>(
    conn: &C,
    site_ids: &[i32],
    today: NaiveDate,
) -> Result<u64> {
    if site_ids.is_empty() {
        return Ok(0);
    }

    let todays_rows = Attendance::find()
        .filter(attendance::Column::SiteId.is_in(site_ids.iter().copied()))
        .filter(attendance::Column::Date.eq(format_day(today)))
        .all(conn)
        .await
        .context("Failed to load today's attendance for sites")?;

    for row in &todays_rows {
        apply_aggregate(conn, row.employee_id, AggregateChange::for_delete(row.hours)).await?;
    }

    let result = Attendance::delete_many()
        .filter(attendance::Column::SiteId.is_in(site_ids.iter().copied()))
        .exec(conn)
        .await
        .context("Failed to delete attendance for sites")?;

    Ok(result.rows_affected)
}

/// Applies `write` onto the row already stored for its key.
async fn merge<C: ConnectionTrait>(
    conn: &C,
    existing: attendance::Model,
    write: &AttendanceWrite,
) -> Result<attendance::Model> {
    let previous = existing.hours;
    let mut active: attendance::ActiveModel = existing.into();
    active.status = Set(write.status.as_str().to_string());
    // Omitted hours keep the stored value.
    active.hours = Set(write.hours.unwrap_or(previous));
    if let Some(clock_in) = &write.clock_in {
        active.clock_in = Set(Some(clock_in.clone()));
    }
    if let Some(clock_out) = &write.clock_out {
        active.clock_out = Set(Some(clock_out.clone()));
    }
    if let Some(notes) = &write.notes {
        active.notes = Set(Some(notes.clone()));
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    active
        .update(conn)
        .await
        .context("Failed to update attendance record")
}

fn record_is_today(stored_day: &str, today: NaiveDate) -> bool {
    parse_day(stored_day).is_some_and(|day| affects_aggregate(day, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewEmployee, NewProject, NewSite, Store};
    use crate::domain::{EmployeeCategory, EmployeeStatus, ProjectStatus, SiteStatus};

    struct Seeded {
        store: Store,
        path: std::path::PathBuf,
        employee_id: i32,
        site_id: i32,
    }

    impl Drop for Seeded {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    async fn seeded() -> Seeded {
        let path =
            std::env::temp_dir().join(format!("gofartrack-ledger-{}.db", uuid::Uuid::new_v4()));
        let store = Store::new(&format!("sqlite:{}", path.display()))
            .await
            .unwrap();

        let project = store
            .create_project(NewProject {
                name: "Harbour Wall".to_string(),
                location: "Mombasa".to_string(),
                start_date: "2024-01-01".to_string(),
                end_date: "2024-06-30".to_string(),
                budget: 250_000.0,
                description: None,
                supervisor_id: None,
                status: ProjectStatus::OnTrack,
                progress: 0,
            })
            .await
            .unwrap();
        let site = store
            .create_site(NewSite {
                name: "Pier 2".to_string(),
                location: "East quay".to_string(),
                description: None,
                status: SiteStatus::Active,
                project_id: project.id,
                supervisor_id: None,
                progress: 0,
            })
            .await
            .unwrap();
        let employee = store
            .create_employee(NewEmployee {
                name: "Baraka".to_string(),
                phone: "0722000000".to_string(),
                national_id: "ID-900".to_string(),
                category: EmployeeCategory::Skilled,
                position: "Mason".to_string(),
                pay_rate: 1500.0,
                start_date: "2023-03-01".to_string(),
                address: None,
                site_id: Some(site.id),
                project_id: Some(project.id),
                status: EmployeeStatus::Active,
            })
            .await
            .unwrap();

        Seeded {
            store,
            path,
            employee_id: employee.id,
            site_id: site.id,
        }
    }

    impl Seeded {
        fn repo(&self) -> AttendanceRepository {
            AttendanceRepository::new(self.store.conn.clone())
        }

        fn write(&self, status: AttendanceStatus, hours: f64) -> AttendanceWrite {
            AttendanceWrite {
                employee_id: self.employee_id,
                site_id: self.site_id,
                date: today(),
                status,
                clock_in: None,
                clock_out: None,
                hours: Some(hours),
                notes: None,
            }
        }

        async fn rows(&self) -> Vec<AttendanceRow> {
            self.repo()
                .list(&AttendanceFilter {
                    employee_id: Some(self.employee_id),
                    ..AttendanceFilter::default()
                })
                .await
                .unwrap()
        }

        async fn employee_hours(&self) -> f64 {
            self.store
                .get_employee(self.employee_id)
                .await
                .unwrap()
                .unwrap()
                .hours
        }
    }

    #[tokio::test]
    async fn second_writer_for_a_key_merges_into_the_first_row() {
        let db = seeded().await;
        let (first, second) = (db.repo(), db.repo());

        let a = first
            .upsert(db.write(AttendanceStatus::Present, 8.0), today())
            .await
            .unwrap();
        let b = second
            .upsert(db.write(AttendanceStatus::Late, 4.0), today())
            .await
            .unwrap();

        assert!(a.created);
        assert!(!b.created);
        assert_eq!(a.row.id, b.row.id);
        assert_eq!(b.row.status, AttendanceStatus::Late);
        assert_eq!(db.rows().await.len(), 1);
        assert!((db.employee_hours().await - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn concurrent_creates_of_one_key_leave_a_single_row() {
        let db = seeded().await;
        let (first, second) = (db.repo(), db.repo());

        let (a, b) = tokio::join!(
            first.upsert(db.write(AttendanceStatus::Present, 8.0), today()),
            second.upsert(db.write(AttendanceStatus::Present, 4.0), today()),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(u8::from(a.created) + u8::from(b.created), 1);
        assert_eq!(a.row.id, b.row.id);

        let rows = db.rows().await;
        assert_eq!(rows.len(), 1);
        assert!((db.employee_hours().await - rows[0].hours).abs() < 1e-9);
    }

    #[tokio::test]
    async fn removing_a_site_gives_back_only_todays_hours() {
        let db = seeded().await;
        let repo = db.repo();
        repo.upsert(db.write(AttendanceStatus::Present, 8.0), today())
            .await
            .unwrap();
        let mut yesterday = db.write(AttendanceStatus::Present, 6.0);
        yesterday.date = today().pred_opt().unwrap();
        repo.upsert(yesterday, today()).await.unwrap();

        let txn = db.store.conn.begin().await.unwrap();
        let removed = remove_for_sites(&txn, &[db.site_id], today()).await.unwrap();
        txn.commit().await.unwrap();

        assert_eq!(removed, 2);
        assert!(db.rows().await.is_empty());
        assert!(db.employee_hours().await.abs() < 1e-9);
    }
}
