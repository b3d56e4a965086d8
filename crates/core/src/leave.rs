//! Employee-side leave arithmetic: working-day counts and balance checks
//! applied before a leave application leaves the client.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::request::LeaveType;

/// Allocated leave per type, as served by `/leave_balances/{employee_id}`.
/// Annual leave is stored under `paid_leaves` on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    #[serde(default)]
    pub sick_leaves: f64,
    #[serde(default)]
    pub casual_leaves: f64,
    #[serde(default)]
    pub paid_leaves: f64,
}

impl LeaveBalance {
    pub fn remaining(&self, leave_type: LeaveType) -> f64 {
        match leave_type {
            LeaveType::Sick => self.sick_leaves,
            LeaveType::Casual => self.casual_leaves,
            LeaveType::Annual => self.paid_leaves,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum LeaveValidationError {
    #[error("Please fill in all required fields.")]
    MissingFields,
    #[error("Invalid date range. Please select valid dates.")]
    InvalidRange,
    #[error("You don't have enough {} leaves. Remaining: {remaining}", leave_type.as_str())]
    InsufficientBalance { leave_type: LeaveType, remaining: f64 },
}

/// Working days between `start` and `end` inclusive, weekends excluded.
/// A half-day application subtracts 0.5 from a non-zero count.
pub fn working_days(start: NaiveDate, end: NaiveDate, half_day: bool) -> f64 {
    let mut current = start;
    let mut days = 0u32;
    while current <= end {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days += 1;
        }
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    if half_day && days > 0 {
        f64::from(days) - 0.5
    } else {
        f64::from(days)
    }
}

/// A leave application as the employee fills it in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaveDraft {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub half_day: bool,
    pub reason: String,
}

impl LeaveDraft {
    /// Validate the draft against the employee's balance; returns the
    /// working-day count the application will consume.
    pub fn validate(&self, balance: &LeaveBalance) -> Result<f64, LeaveValidationError> {
        if self.reason.trim().is_empty() {
            return Err(LeaveValidationError::MissingFields);
        }

        let days = working_days(self.start_date, self.end_date, self.half_day);
        if self.end_date < self.start_date || days <= 0.0 {
            return Err(LeaveValidationError::InvalidRange);
        }

        let remaining = balance.remaining(self.leave_type);
        if days > remaining {
            return Err(LeaveValidationError::InsufficientBalance {
                leave_type: self.leave_type,
                remaining,
            });
        }

        Ok(days)
    }
}
