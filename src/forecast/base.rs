//! Forecast base generation: months x roster, active-month filter and derived columns

use super::table::{Forecast, ForecastRow};
use crate::months::{generate_month_ranges, MonthRange};
use crate::roster::RosterRecord;
use chrono::NaiveDate;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for a forecast base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Any date in the first forecast month
    pub start_date: NaiveDate,

    /// Any date in the last forecast month
    pub end_date: NaiveDate,

    /// Rate applied at each inflation step
    pub inflation_rate: f64,

    /// Date of the first inflation step
    pub inflation_start: NaiveDate,

    /// Months between inflation steps
    pub inflation_freq: u32,
}

/// Invalid forecast inputs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("inflation frequency must be a positive number of months")]
    NonPositiveFrequency,

    #[error("inflation rate must be a finite number, got {0}")]
    InvalidRate(f64),

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.inflation_freq == 0 {
            return Err(InputError::NonPositiveFrequency);
        }
        if !self.inflation_rate.is_finite() {
            return Err(InputError::InvalidRate(self.inflation_rate));
        }
        if self.end_date < self.start_date {
            return Err(InputError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    /// Month ranges covered by this configuration
    pub fn month_ranges(&self) -> Vec<MonthRange> {
        generate_month_ranges(
            self.start_date,
            self.end_date,
            self.inflation_rate,
            self.inflation_start,
            self.inflation_freq,
        )
    }
}

/// Generate month ranges from `config` and build the forecast base for `roster`
pub fn build_forecast(roster: &[RosterRecord], config: &ForecastConfig) -> Result<Forecast, InputError> {
    config.validate()?;
    let month_ranges = config.month_ranges();
    Ok(generate_forecast_base(roster, &month_ranges))
}

/// Build the forecast base: one row per role per month in which the role is active
pub fn generate_forecast_base(roster: &[RosterRecord], month_ranges: &[MonthRange]) -> Forecast {
    // Cross join, month-major, keeping only active months
    let active: Vec<(&MonthRange, &RosterRecord)> = month_ranges
        .iter()
        .flat_map(|month| {
            roster
                .iter()
                .filter(move |role| is_active_in_month(role, month))
                .map(move |role| (month, role))
        })
        .collect();

    let mut rows: Vec<ForecastRow> = active
        .into_par_iter()
        .map(|(month, role)| calculate_row(month, role))
        .collect();

    accumulate_ytd_compensation(&mut rows);

    info!(
        "Built forecast base: {} roles x {} months -> {} active rows",
        roster.len(),
        month_ranges.len(),
        rows.len()
    );

    Forecast::new(rows)
}

/// Whether the role overlaps the month at all
pub fn is_active_in_month(role: &RosterRecord, month: &MonthRange) -> bool {
    role.start_date_complete <= month.end_of_month && role.end_date_complete >= month.start_of_month
}

/// Fraction of the month covered by the role, from whole day counts
pub fn proration(role: &RosterRecord, month: &MonthRange) -> f64 {
    let active_start = month.start_of_month.max(role.start_date_complete);
    let active_end = month.end_of_month.min(role.end_date_complete);
    // +1 so the start day itself counts
    let active_days = ((active_end - active_start).num_days() + 1).max(0);

    active_days as f64 / month.days_in_month() as f64
}

/// 1 if the role is still active after the month closes.
///
/// The end comparison is strict, unlike the inclusive overlap filter: a role
/// ending on the last day of the month is prorated for the whole month but
/// does not count towards headcount going into the next one.
pub fn headcount(role: &RosterRecord, month: &MonthRange) -> i32 {
    if role.start_date_complete <= month.end_of_month && role.end_date_complete > month.end_of_month {
        1
    } else {
        0
    }
}

/// +1 for a start inside the month, -1 for an end inside the month, summed
pub fn headcount_change(role: &RosterRecord, month: &MonthRange) -> i32 {
    let starts = if month.contains(role.start_date_complete) { 1 } else { 0 };
    let ends = if month.contains(role.end_date_complete) { -1 } else { 0 };
    starts + ends
}

/// Calculate derived values for one role in one month
fn calculate_row(month: &MonthRange, role: &RosterRecord) -> ForecastRow {
    let mut row = ForecastRow::new(month, role.clone());

    row.proration = proration(role, month);
    row.headcount = headcount(role, month);
    row.headcount_change = headcount_change(role, month);

    calculate_compensation(&mut row);

    row
}

/// Monthly salary, bonus and commission, prorated and inflated
fn calculate_compensation(row: &mut ForecastRow) {
    let salary = row.role.salary;

    row.salary_amount = salary * row.proration * row.inflation_factor / 12.0;
    row.bonus_amount = salary * row.role.bonus * row.proration * row.inflation_factor / 12.0;
    row.commission_amount = salary * row.role.commission * row.proration * row.inflation_factor / 12.0;
    row.compensation = row.salary_amount + row.bonus_amount + row.commission_amount;
}

/// Sort by (employee, year, month) and accumulate compensation within each employee-year.
///
/// The sort is stable, so concurrent roles of one employee in one month keep
/// their roster order and accumulate in it.
fn accumulate_ytd_compensation(rows: &mut [ForecastRow]) {
    rows.sort_by(|a, b| {
        a.role
            .employee_id
            .cmp(&b.role.employee_id)
            .then(a.year.cmp(&b.year))
            .then(a.start_of_month.cmp(&b.start_of_month))
    });

    let mut running = 0.0;
    let mut group: Option<(&str, i32)> = None;
    let mut totals = Vec::with_capacity(rows.len());

    for row in rows.iter() {
        let key = (row.role.employee_id.as_str(), row.year);
        if group != Some(key) {
            group = Some(key);
            running = 0.0;
        }
        running += row.compensation;
        totals.push(running);
    }

    for (row, total) in rows.iter_mut().zip(totals) {
        row.ytd_compensation = total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Datelike;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn month(year: i32, month: u32, inflation_factor: f64) -> MonthRange {
        let ranges = generate_month_ranges(date(year, month, 1), date(year, month, 1), 0.0, date(9999, 1, 1), 12);
        MonthRange {
            inflation_factor,
            ..ranges[0]
        }
    }

    fn role(employee: &str, role_id: i32, start: Option<NaiveDate>, end: Option<NaiveDate>) -> RosterRecord {
        RosterRecord::new(role_id, employee, start, end, 60_000.0, 0.1, 0.05)
    }

    fn config(start: NaiveDate, end: NaiveDate) -> ForecastConfig {
        ForecastConfig {
            start_date: start,
            end_date: end,
            inflation_rate: 0.03,
            inflation_start: date(2025, 1, 1),
            inflation_freq: 12,
        }
    }

    #[test]
    fn test_proration_partial_months() {
        let r = role("E001", 1, Some(date(2024, 1, 15)), Some(date(2024, 3, 15)));

        assert_relative_eq!(proration(&r, &month(2024, 1, 1.0)), 17.0 / 31.0);
        assert_relative_eq!(proration(&r, &month(2024, 2, 1.0)), 1.0);
        assert_relative_eq!(proration(&r, &month(2024, 3, 1.0)), 15.0 / 31.0);
    }

    #[test]
    fn test_proration_single_day_and_inverted() {
        let one_day = role("E001", 1, Some(date(2024, 2, 29)), Some(date(2024, 2, 29)));
        assert_relative_eq!(proration(&one_day, &month(2024, 2, 1.0)), 1.0 / 29.0);

        let inverted = role("E001", 1, Some(date(2024, 2, 20)), Some(date(2024, 2, 10)));
        assert_eq!(proration(&inverted, &month(2024, 2, 1.0)), 0.0);
    }

    #[test]
    fn test_open_ended_role_is_fully_prorated() {
        let r = role("E001", 1, None, None);
        assert_eq!(proration(&r, &month(2024, 2, 1.0)), 1.0);
        assert_eq!(headcount(&r, &month(2024, 2, 1.0)), 1);
        assert_eq!(headcount_change(&r, &month(2024, 2, 1.0)), 0);
    }

    #[test]
    fn test_headcount_and_change() {
        let r = role("E001", 1, Some(date(2024, 1, 15)), Some(date(2024, 3, 15)));

        let headcounts: Vec<i32> = (1..=3).map(|m| headcount(&r, &month(2024, m, 1.0))).collect();
        let changes: Vec<i32> = (1..=3).map(|m| headcount_change(&r, &month(2024, m, 1.0))).collect();

        assert_eq!(headcounts, vec![1, 1, 0]);
        assert_eq!(changes, vec![1, 0, -1]);
    }

    #[test]
    fn test_month_end_termination_is_prorated_but_not_counted() {
        // Ends on the last day of January: active all month, gone at month close
        let r = role("E001", 1, Some(date(2023, 6, 1)), Some(date(2024, 1, 31)));
        let january = month(2024, 1, 1.0);

        assert!(is_active_in_month(&r, &january));
        assert_eq!(proration(&r, &january), 1.0);
        assert_eq!(headcount(&r, &january), 0);
        assert_eq!(headcount_change(&r, &january), -1);
    }

    #[test]
    fn test_start_and_end_in_same_month_nets_to_zero() {
        let r = role("E001", 1, Some(date(2024, 4, 3)), Some(date(2024, 4, 20)));
        let april = month(2024, 4, 1.0);

        assert_eq!(headcount_change(&r, &april), 0);
        assert_eq!(headcount(&r, &april), 0);
        assert_relative_eq!(proration(&r, &april), 18.0 / 30.0);
    }

    #[test]
    fn test_filter_active_months() {
        let months = vec![month(2024, 1, 1.0), month(2024, 2, 1.03), month(2024, 3, 1.06)];
        let r = role("E001", 1, Some(date(2024, 2, 1)), Some(date(2024, 2, 29)));

        let forecast = generate_forecast_base(&[r], &months);

        assert_eq!(forecast.len(), 1);
        assert_eq!(forecast.rows()[0].inflation_factor, 1.03);
    }

    #[test]
    fn test_compensation() {
        let months = vec![month(2024, 1, 1.0), month(2024, 2, 1.03), month(2024, 3, 1.06)];
        let r = role("E001", 1, Some(date(2024, 1, 15)), Some(date(2024, 3, 15)));

        let forecast = generate_forecast_base(&[r], &months);
        let rows = forecast.rows();

        assert_relative_eq!(rows[0].salary_amount, 60_000.0 * 17.0 / 31.0 / 12.0);
        assert_relative_eq!(rows[1].salary_amount, 60_000.0 * 1.03 / 12.0);
        assert_relative_eq!(rows[2].salary_amount, 60_000.0 * 15.0 / 31.0 * 1.06 / 12.0);
        assert_relative_eq!(rows[1].bonus_amount, 6_000.0 * 1.03 / 12.0);
        assert_relative_eq!(rows[2].commission_amount, 3_000.0 * 15.0 / 31.0 * 1.06 / 12.0);

        for row in rows {
            assert_eq!(row.salary_amount + row.bonus_amount + row.commission_amount, row.compensation);
        }
    }

    #[test]
    fn test_single_role_headcount_change_over_tenure() {
        let forecast = build_forecast(
            &[role("E001", 1, Some(date(2024, 3, 10)), Some(date(2024, 8, 20)))],
            &config(date(2024, 1, 1), date(2024, 12, 31)),
        )
        .unwrap();

        let changes: Vec<(u32, i32)> = forecast
            .rows()
            .iter()
            .map(|r| (r.start_of_month.month(), r.headcount_change))
            .collect();

        assert_eq!(changes, vec![(3, 1), (4, 0), (5, 0), (6, 0), (7, 0), (8, -1)]);
    }

    #[test]
    fn test_ytd_resets_each_year_and_sums_concurrent_roles() {
        let roster = vec![
            role("E002", 2, Some(date(2023, 2, 20)), None),
            role("E001", 1, Some(date(2023, 1, 15)), None),
            role("E002", 3, Some(date(2023, 1, 20)), None),
        ];
        let forecast = build_forecast(&roster, &config(date(2024, 11, 1), date(2025, 2, 28))).unwrap();
        let rows = forecast.rows();

        assert_eq!(rows.len(), 12);
        // Sorted by employee, then month
        assert!(rows[..4].iter().all(|r| r.role.employee_id == "E001"));
        assert!(rows[4..].iter().all(|r| r.role.employee_id == "E002"));

        let e001 = &rows[..4];
        assert_relative_eq!(e001[1].ytd_compensation, e001[0].compensation + e001[1].compensation);
        assert_eq!(e001[2].year, 2025);
        assert_eq!(e001[2].ytd_compensation, e001[2].compensation);

        // E002 holds two roles; they accumulate together in roster order
        let e002_jan = &rows[8..10];
        assert_eq!(e002_jan[0].role.role_id, 2);
        assert_eq!(e002_jan[0].ytd_compensation, e002_jan[0].compensation);
        assert_relative_eq!(e002_jan[1].ytd_compensation, e002_jan[0].compensation + e002_jan[1].compensation);

        for row in rows {
            assert!(row.ytd_compensation >= row.compensation);
            assert!((0.0..=1.0).contains(&row.proration));
        }
    }

    #[test]
    fn test_build_forecast_rejects_invalid_inputs() {
        let mut bad = config(date(2024, 1, 1), date(2024, 12, 31));
        bad.inflation_freq = 0;
        assert_eq!(build_forecast(&[], &bad), Err(InputError::NonPositiveFrequency));

        let backwards = config(date(2024, 5, 1), date(2024, 1, 1));
        assert!(matches!(build_forecast(&[], &backwards), Err(InputError::EndBeforeStart { .. })));
    }

    #[test]
    fn test_parallel_build_is_deterministic() {
        let roster: Vec<RosterRecord> = (0..50)
            .map(|i| role(&format!("E{:03}", i % 20), i, Some(date(2023, 1 + (i as u32 % 12), 1 + (i as u32 % 27))), None))
            .collect();
        let cfg = config(date(2024, 1, 1), date(2026, 12, 31));

        let first = build_forecast(&roster, &cfg).unwrap();
        let second = build_forecast(&roster, &cfg).unwrap();
        assert_eq!(first, second);
    }
}
