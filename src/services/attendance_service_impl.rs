//! `SeaORM` implementation of the `AttendanceService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::db::{
    AttendanceFilter, AttendancePatch, AttendanceRow, AttendanceWrite, Employee, StatusCount,
    Store,
};
use crate::domain::{AttendanceStatus, parse_day, parse_timestamp};
use crate::services::attendance_service::{
    AttendanceError, AttendanceInput, AttendanceQuery, AttendanceService, AttendanceUpdate,
    BulkFailure, BulkOutcome, MarkAttendance, Recorded, SummaryQuery,
};

pub struct SeaOrmAttendanceService {
    store: Store,
    clock: Arc<dyn Clock>,
    /// Serializes ledger writes within this process. The unique index on
    /// (employee, date, site) still guards writers in other processes.
    write_lock: Mutex<()>,
}

impl SeaOrmAttendanceService {
    #[must_use]
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    async fn write(&self, write: AttendanceWrite) -> Result<Recorded, AttendanceError> {
        if self.store.get_employee(write.employee_id).await?.is_none() {
            return Err(AttendanceError::EmployeeNotFound);
        }
        if self.store.get_site(write.site_id).await?.is_none() {
            return Err(AttendanceError::SiteNotFound);
        }

        let today = self.clock.today();
        let outcome = {
            let _guard = self.write_lock.lock().await;
            self.store.upsert_attendance(write, today).await?
        };

        info!(
            record_id = outcome.row.id,
            employee_id = outcome.row.employee_id,
            site_id = outcome.row.site_id,
            date = %outcome.row.date,
            status = %outcome.row.status,
            created = outcome.created,
            "Attendance recorded"
        );

        Ok(Recorded {
            created: outcome.created,
            record: outcome.row,
        })
    }

    /// Applies a merge patch to one row, keeping the aggregate in step.
    async fn patch(&self, id: i32, patch: AttendancePatch) -> Result<AttendanceRow, AttendanceError> {
        let today = self.clock.today();
        let row = {
            let _guard = self.write_lock.lock().await;
            self.store.update_attendance(id, patch, today).await?
        };

        let row = row.ok_or(AttendanceError::NotFound)?;
        info!(record_id = row.id, status = %row.status, "Attendance updated");
        Ok(row)
    }

    /// One bulk record: an `id` updates that row, anything else upserts.
    async fn record_one(&self, value: &serde_json::Value) -> Result<bool, AttendanceError> {
        let input: AttendanceInput = serde_json::from_value(value.clone())
            .map_err(|e| AttendanceError::Validation(format!("Malformed record: {e}")))?;

        if let Some(id) = input.id {
            let patch = to_patch(AttendanceUpdate {
                status: input.status,
                clock_in: input.clock_in,
                clock_out: input.clock_out,
                hours: input.hours,
                notes: input.notes,
            })?;
            self.patch(id, patch).await?;
            return Ok(false);
        }

        let recorded = self.record(input).await?;
        Ok(recorded.created)
    }
}

#[async_trait]
impl AttendanceService for SeaOrmAttendanceService {
    async fn record(&self, input: AttendanceInput) -> Result<Recorded, AttendanceError> {
        let write = to_write(input)?;
        self.write(write).await
    }

    async fn record_bulk(&self, records: Vec<serde_json::Value>) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();

        for value in records {
            match self.record_one(&value).await {
                Ok(true) => outcome.created += 1,
                Ok(false) => outcome.updated += 1,
                Err(err) => {
                    warn!(error = %err, "Bulk attendance record failed");
                    outcome.failed += 1;
                    outcome.errors.push(BulkFailure {
                        record: value,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            created = outcome.created,
            updated = outcome.updated,
            failed = outcome.failed,
            "Bulk attendance processed"
        );
        outcome
    }

    async fn update(
        &self,
        id: i32,
        update: AttendanceUpdate,
    ) -> Result<AttendanceRow, AttendanceError> {
        let patch = to_patch(update)?;
        self.patch(id, patch).await
    }

    async fn delete(&self, id: i32) -> Result<(), AttendanceError> {
        let today = self.clock.today();
        let deleted = {
            let _guard = self.write_lock.lock().await;
            self.store.delete_attendance(id, today).await?
        };

        let row = deleted.ok_or(AttendanceError::NotFound)?;
        info!(
            record_id = row.id,
            employee_id = row.employee_id,
            hours = row.hours,
            "Attendance deleted"
        );
        Ok(())
    }

    async fn get(&self, id: i32) -> Result<AttendanceRow, AttendanceError> {
        self.store
            .get_attendance(id)
            .await?
            .ok_or(AttendanceError::NotFound)
    }

    async fn list(&self, query: AttendanceQuery) -> Result<Vec<AttendanceRow>, AttendanceError> {
        let filter = AttendanceFilter {
            employee_id: query.employee_id,
            site_id: query.site_id,
            start_date: optional_day(query.start_date.as_deref(), "startDate")?,
            end_date: optional_day(query.end_date.as_deref(), "endDate")?,
            status: query
                .status
                .as_deref()
                .map(parse_status)
                .transpose()?,
        };

        Ok(self.store.list_attendance(&filter).await?)
    }

    async fn summarize(&self, query: SummaryQuery) -> Result<Vec<StatusCount>, AttendanceError> {
        let (Some(start), Some(end)) = (query.start_date.as_deref(), query.end_date.as_deref())
        else {
            return Err(AttendanceError::Validation(
                "Start and end dates are required".to_string(),
            ));
        };

        let start = required_day(start, "startDate")?;
        let end = required_day(end, "endDate")?;
        if start > end {
            return Err(AttendanceError::Validation(
                "startDate must not be after endDate".to_string(),
            ));
        }

        Ok(self
            .store
            .summarize_attendance(start, end, query.site_id)
            .await?)
    }

    async fn mark_today(
        &self,
        employee_id: i32,
        mark: MarkAttendance,
    ) -> Result<Employee, AttendanceError> {
        let employee = self
            .store
            .get_employee(employee_id)
            .await?
            .ok_or(AttendanceError::EmployeeNotFound)?;

        let site_id = mark.site_id.or(employee.site_id).ok_or_else(|| {
            AttendanceError::Validation(
                "siteId is required when the employee has no assigned site".to_string(),
            )
        })?;

        let status = if mark.present {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Absent
        };

        let write = AttendanceWrite {
            employee_id,
            site_id,
            date: self.clock.today(),
            status,
            clock_in: None,
            clock_out: None,
            hours: validate_hours(mark.hours)?,
            notes: None,
        };
        self.write(write).await?;

        self.store
            .get_employee(employee_id)
            .await?
            .ok_or(AttendanceError::EmployeeNotFound)
    }
}

fn to_write(input: AttendanceInput) -> Result<AttendanceWrite, AttendanceError> {
    let employee_id = input
        .employee_id
        .ok_or_else(|| AttendanceError::Validation("employeeId is required".to_string()))?;
    let site_id = input
        .site_id
        .ok_or_else(|| AttendanceError::Validation("siteId is required".to_string()))?;
    let date = input
        .date
        .as_deref()
        .ok_or_else(|| AttendanceError::Validation("date is required".to_string()))
        .and_then(|d| required_day(d, "date"))?;
    let status = input
        .status
        .as_deref()
        .ok_or_else(|| AttendanceError::Validation("status is required".to_string()))
        .and_then(parse_status)?;

    Ok(AttendanceWrite {
        employee_id,
        site_id,
        date,
        status,
        clock_in: optional_timestamp(input.clock_in, "clockIn")?,
        clock_out: optional_timestamp(input.clock_out, "clockOut")?,
        hours: validate_hours(input.hours)?,
        notes: input.notes,
    })
}

fn to_patch(update: AttendanceUpdate) -> Result<AttendancePatch, AttendanceError> {
    Ok(AttendancePatch {
        status: update.status.as_deref().map(parse_status).transpose()?,
        clock_in: optional_timestamp(update.clock_in, "clockIn")?,
        clock_out: optional_timestamp(update.clock_out, "clockOut")?,
        hours: validate_hours(update.hours)?,
        notes: update.notes,
    })
}

fn parse_status(value: &str) -> Result<AttendanceStatus, AttendanceError> {
    value
        .parse()
        .map_err(|e: crate::domain::ParseEnumError| AttendanceError::Validation(e.to_string()))
}

fn required_day(value: &str, field: &str) -> Result<NaiveDate, AttendanceError> {
    parse_day(value).ok_or_else(|| {
        AttendanceError::Validation(format!("{field} must be a date (YYYY-MM-DD): '{value}'"))
    })
}

fn optional_day(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, AttendanceError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| required_day(v, field))
        .transpose()
}

fn optional_timestamp(
    value: Option<String>,
    field: &str,
) -> Result<Option<String>, AttendanceError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            parse_timestamp(&v).ok_or_else(|| {
                AttendanceError::Validation(format!("{field} must be an RFC 3339 timestamp"))
            })
        })
        .transpose()
}

fn validate_hours(hours: Option<f64>) -> Result<Option<f64>, AttendanceError> {
    match hours {
        Some(h) if !h.is_finite() || h < 0.0 => Err(AttendanceError::Validation(
            "hours must be a non-negative number".to_string(),
        )),
        other => Ok(other),
    }
}
