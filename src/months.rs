//! Calendar scaffold for a forecast: one entry per month with its inflation factor

use chrono::{Datelike, Duration, NaiveDate};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// A single calendar month of the forecast horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthRange {
    /// First day of the month
    pub start_of_month: NaiveDate,

    /// Last day of the month
    pub end_of_month: NaiveDate,

    /// Cumulative inflation multiplier applied to compensation in this month
    pub inflation_factor: f64,
}

impl MonthRange {
    /// Exact number of days in the month
    pub fn days_in_month(&self) -> i64 {
        (self.end_of_month - self.start_of_month).num_days() + 1
    }

    /// Calendar year of the month
    pub fn year(&self) -> i32 {
        self.start_of_month.year()
    }

    /// Whether `date` falls inside the month (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_of_month <= date && date <= self.end_of_month
    }
}

/// First day of the month containing `date`
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

/// Move `months` calendar months forward from `date`, always landing on the 1st.
///
/// Saturates at `NaiveDate::MAX` when the result is not representable.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() as i64 * 12 + date.month0() as i64 + months as i64;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, 1))
        .unwrap_or(NaiveDate::MAX)
}

/// Generate the month ranges between `start_date` and `end_date` with inflation applied.
///
/// Both bounds are normalized to their containing month. The inflation factor
/// starts at 1.0 and is multiplied by `1 + inflation_rate` in the first month
/// whose start is on or after the running effective date; the effective date
/// then moves `inflation_frequency` months forward (to the 1st of that month).
pub fn generate_month_ranges(
    start_date: NaiveDate,
    end_date: NaiveDate,
    inflation_rate: f64,
    inflation_date: NaiveDate,
    inflation_frequency: u32,
) -> Vec<MonthRange> {
    let mut month_ranges = Vec::new();
    let mut current = first_of_month(start_date);
    let mut next_inflation = inflation_date;
    let mut inflation_factor = 1.0;

    while current <= end_date {
        let next_month = add_months(current, 1);
        if next_month <= current {
            break;
        }
        let end_of_month = next_month.pred_opt().unwrap_or(current);

        if current >= next_inflation {
            inflation_factor *= 1.0 + inflation_rate;
            next_inflation = add_months(next_inflation, inflation_frequency);
        }

        debug!(
            "Month range {} - {} (inflation factor {:.6})",
            current, end_of_month, inflation_factor
        );

        month_ranges.push(MonthRange {
            start_of_month: current,
            end_of_month,
            inflation_factor,
        });

        current = next_month;
    }

    info!(
        "Generated {} month ranges from {} to {}",
        month_ranges.len(),
        start_date,
        end_date
    );

    month_ranges
}
