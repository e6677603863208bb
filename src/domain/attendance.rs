//! Rules that keep the employee's `present`/`hours` fields in step with the
//! attendance ledger.
//!
//! The employee fields only mirror today's ledger rows. Every ledger write
//! for today yields an [`AggregateChange`] that is applied to the employee
//! in the same transaction. Hours move by deltas only, so applying the
//! changes of any sequence of writes for today sums to the hours currently
//! stored in today's rows, whatever order the writes arrived in.

use chrono::NaiveDate;

use super::AttendanceStatus;

/// Adjustment to apply to an employee's cached attendance fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateChange {
    /// New value for `present`, or `None` to leave it untouched.
    pub present: Option<bool>,
    pub hours_delta: f64,
}

impl AggregateChange {
    /// Change for a created or updated ledger row. `previous_hours` is the
    /// hours value the same row held before the write (`None` on create).
    #[must_use]
    pub fn for_write(status: AttendanceStatus, hours: f64, previous_hours: Option<f64>) -> Self {
        Self {
            present: Some(status == AttendanceStatus::Present),
            hours_delta: hours - previous_hours.unwrap_or(0.0),
        }
    }

    /// Change for a deleted ledger row.
    #[must_use]
    pub const fn for_delete(hours: f64) -> Self {
        Self {
            present: None,
            hours_delta: -hours,
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.present.is_none() && self.hours_delta == 0.0
    }
}

/// Only rows dated today touch the employee aggregate.
#[must_use]
pub fn affects_aggregate(record_day: NaiveDate, today: NaiveDate) -> bool {
    record_day == today
}
