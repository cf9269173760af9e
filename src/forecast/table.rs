//! Forecast output structures: one row per role per active month plus added columns

use super::calculators::CalculationError;
use crate::months::MonthRange;
use crate::roster::RosterRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Type of a forecast column, as seen by calculators and exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Text,
    Numeric,
}

/// Columns every forecast carries, in export order
pub const BASE_COLUMNS: [(&str, ColumnKind); 26] = [
    ("start_of_month", ColumnKind::Date),
    ("end_of_month", ColumnKind::Date),
    ("inflation_factor", ColumnKind::Numeric),
    ("Role ID", ColumnKind::Numeric),
    ("Employee ID", ColumnKind::Text),
    ("Employee Name", ColumnKind::Text),
    ("Title", ColumnKind::Text),
    ("Department", ColumnKind::Text),
    ("Employment type", ColumnKind::Text),
    ("Location", ColumnKind::Text),
    ("Start Date", ColumnKind::Date),
    ("End Date", ColumnKind::Date),
    ("Salary", ColumnKind::Numeric),
    ("Bonus", ColumnKind::Numeric),
    ("Commission", ColumnKind::Numeric),
    ("start_date_complete", ColumnKind::Date),
    ("end_date_complete", ColumnKind::Date),
    ("year", ColumnKind::Numeric),
    ("proration", ColumnKind::Numeric),
    ("headcount", ColumnKind::Numeric),
    ("headcount_change", ColumnKind::Numeric),
    ("salary_amount", ColumnKind::Numeric),
    ("bonus_amount", ColumnKind::Numeric),
    ("commission_amount", ColumnKind::Numeric),
    ("compensation", ColumnKind::Numeric),
    ("ytd_compensation", ColumnKind::Numeric),
];

/// A single value read out of a forecast row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Date(Option<NaiveDate>),
    Text(&'a str),
    Integer(i64),
    Float(f64),
}

impl CellValue<'_> {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(value) => Some(*value as f64),
            CellValue::Float(value) => Some(*value),
            CellValue::Date(_) | CellValue::Text(_) => None,
        }
    }
}

impl fmt::Display for CellValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Date(Some(date)) => write!(f, "{}", date.format("%Y-%m-%d")),
            CellValue::Date(None) => Ok(()),
            CellValue::Text(text) => f.write_str(text),
            CellValue::Integer(value) => write!(f, "{}", value),
            CellValue::Float(value) => write!(f, "{}", value),
        }
    }
}

/// One role in one active month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    // Timing
    pub start_of_month: NaiveDate,
    pub end_of_month: NaiveDate,
    pub inflation_factor: f64,
    pub year: i32,

    // Role
    pub role: RosterRecord,

    // Activity
    pub proration: f64,
    pub headcount: i32,
    pub headcount_change: i32,

    // Compensation (monthly, inflated, prorated)
    pub salary_amount: f64,
    pub bonus_amount: f64,
    pub commission_amount: f64,
    pub compensation: f64,
    pub ytd_compensation: f64,
}

impl ForecastRow {
    /// Create a row for `role` in `month` with all derived values zeroed
    pub fn new(month: &MonthRange, role: RosterRecord) -> Self {
        Self {
            start_of_month: month.start_of_month,
            end_of_month: month.end_of_month,
            inflation_factor: month.inflation_factor,
            year: month.year(),
            role,
            proration: 0.0,
            headcount: 0,
            headcount_change: 0,
            salary_amount: 0.0,
            bonus_amount: 0.0,
            commission_amount: 0.0,
            compensation: 0.0,
            ytd_compensation: 0.0,
        }
    }

    /// Look up a base column value by its column name
    pub fn cell(&self, column: &str) -> Option<CellValue<'_>> {
        let role = &self.role;
        let value = match column {
            "start_of_month" => CellValue::Date(Some(self.start_of_month)),
            "end_of_month" => CellValue::Date(Some(self.end_of_month)),
            "inflation_factor" => CellValue::Float(self.inflation_factor),
            "Role ID" => CellValue::Integer(role.role_id as i64),
            "Employee ID" => CellValue::Text(&role.employee_id),
            "Employee Name" => CellValue::Text(&role.employee_name),
            "Title" => CellValue::Text(&role.title),
            "Department" => CellValue::Text(&role.department),
            "Employment type" => CellValue::Text(&role.employment_type),
            "Location" => CellValue::Text(&role.location),
            "Start Date" => CellValue::Date(role.start_date),
            "End Date" => CellValue::Date(role.end_date),
            "Salary" => CellValue::Float(role.salary),
            "Bonus" => CellValue::Float(role.bonus),
            "Commission" => CellValue::Float(role.commission),
            "start_date_complete" => CellValue::Date(Some(role.start_date_complete)),
            "end_date_complete" => CellValue::Date(Some(role.end_date_complete)),
            "year" => CellValue::Integer(self.year as i64),
            "proration" => CellValue::Float(self.proration),
            "headcount" => CellValue::Integer(self.headcount as i64),
            "headcount_change" => CellValue::Integer(self.headcount_change as i64),
            "salary_amount" => CellValue::Float(self.salary_amount),
            "bonus_amount" => CellValue::Float(self.bonus_amount),
            "commission_amount" => CellValue::Float(self.commission_amount),
            "compensation" => CellValue::Float(self.compensation),
            "ytd_compensation" => CellValue::Float(self.ytd_compensation),
            _ => return None,
        };
        Some(value)
    }
}

/// A numeric column appended by a forecast calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddedColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// Complete forecast table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Forecast {
    rows: Vec<ForecastRow>,
    added: Vec<AddedColumn>,
}

impl Forecast {
    pub fn new(rows: Vec<ForecastRow>) -> Self {
        Self { rows, added: Vec::new() }
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns added by calculations, in the order they were added
    pub fn added_columns(&self) -> &[AddedColumn] {
        &self.added
    }

    /// Values of an added column
    pub fn added_column(&self, name: &str) -> Option<&[f64]> {
        self.added
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.values.as_slice())
    }

    /// All column names: base columns first, then added columns
    pub fn column_names(&self) -> Vec<&str> {
        BASE_COLUMNS
            .iter()
            .map(|(name, _)| *name)
            .chain(self.added.iter().map(|column| column.name.as_str()))
            .collect()
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        BASE_COLUMNS
            .iter()
            .find(|(column, _)| *column == name)
            .map(|(_, kind)| *kind)
            .or_else(|| self.added_column(name).map(|_| ColumnKind::Numeric))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_kind(name).is_some()
    }

    /// Read a numeric column, one value per row
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, CalculationError> {
        if let Some(values) = self.added_column(name) {
            return Ok(values.to_vec());
        }

        match self.column_kind(name) {
            None => Err(CalculationError::ColumnNotFound(name.to_string())),
            Some(ColumnKind::Numeric) => self
                .rows
                .iter()
                .map(|row| {
                    row.cell(name)
                        .and_then(|cell| cell.as_f64())
                        .ok_or_else(|| CalculationError::NonNumericColumn(name.to_string()))
                })
                .collect(),
            Some(_) => Err(CalculationError::NonNumericColumn(name.to_string())),
        }
    }

    /// Return a copy of this forecast with one more numeric column
    pub(crate) fn with_added_column(&self, name: &str, values: Vec<f64>) -> Result<Forecast, CalculationError> {
        if name.trim().is_empty() {
            return Err(CalculationError::EmptyColumnName);
        }
        if self.has_column(name) {
            return Err(CalculationError::ColumnExists(name.to_string()));
        }
        debug_assert_eq!(values.len(), self.rows.len());

        let mut forecast = self.clone();
        forecast.added.push(AddedColumn {
            name: name.to_string(),
            values,
        });
        Ok(forecast)
    }

    /// Get summary statistics
    pub fn summary(&self) -> ForecastSummary {
        let employees: BTreeSet<&str> = self.rows.iter().map(|r| r.role.employee_id.as_str()).collect();
        let months: BTreeSet<NaiveDate> = self.rows.iter().map(|r| r.start_of_month).collect();
        let total_compensation: f64 = self.rows.iter().map(|r| r.compensation).sum();
        let net_headcount_change: i64 = self.rows.iter().map(|r| r.headcount_change as i64).sum();

        let ending_headcount = months
            .last()
            .map(|last| {
                self.rows
                    .iter()
                    .filter(|r| r.start_of_month == *last)
                    .map(|r| r.headcount as i64)
                    .sum::<i64>()
            })
            .unwrap_or(0);

        let added_totals = self
            .added
            .iter()
            .map(|column| (column.name.clone(), column.values.iter().sum::<f64>()))
            .collect();

        ForecastSummary {
            total_rows: self.rows.len(),
            employees: employees.len(),
            months: months.len(),
            total_compensation,
            net_headcount_change,
            ending_headcount,
            added_totals,
        }
    }
}

/// Summary statistics for a forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub total_rows: usize,
    pub employees: usize,
    pub months: usize,
    pub total_compensation: f64,
    pub net_headcount_change: i64,
    pub ending_headcount: i64,
    pub added_totals: Vec<(String, f64)>,
}
