//! Roster record structure matching the headcount roster format

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel start date for roles with no recorded start (0001-01-01)
pub fn open_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Sentinel end date for roles with no recorded end (9999-12-31)
pub fn open_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// One employee role assignment from the roster.
///
/// An employee holding several roles (concurrently or one after another)
/// appears once per role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterRecord {
    /// Role identifier
    pub role_id: i32,

    /// Employee identifier, shared by all roles of one person
    pub employee_id: String,

    pub employee_name: String,
    pub title: String,
    pub department: String,
    pub employment_type: String,
    pub location: String,

    /// Start date as recorded in the roster
    pub start_date: Option<NaiveDate>,

    /// End date as recorded in the roster
    pub end_date: Option<NaiveDate>,

    /// Start date with a missing value replaced by the open start sentinel
    pub start_date_complete: NaiveDate,

    /// End date with a missing value replaced by the open end sentinel
    pub end_date_complete: NaiveDate,

    /// Annual salary
    pub salary: f64,

    /// Bonus as a fraction of salary
    pub bonus: f64,

    /// Commission as a fraction of salary
    pub commission: f64,
}

impl RosterRecord {
    /// Create a role with blank descriptive attributes
    pub fn new(
        role_id: i32,
        employee_id: impl Into<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        salary: f64,
        bonus: f64,
        commission: f64,
    ) -> Self {
        Self {
            role_id,
            employee_id: employee_id.into(),
            employee_name: String::new(),
            title: String::new(),
            department: String::new(),
            employment_type: String::new(),
            location: String::new(),
            start_date,
            end_date,
            start_date_complete: start_date.unwrap_or_else(open_start_date),
            end_date_complete: end_date.unwrap_or_else(open_end_date),
            salary,
            bonus,
            commission,
        }
    }

    /// Whether the role has no recorded end date
    pub fn is_open_ended(&self) -> bool {
        self.end_date.is_none()
    }
}
