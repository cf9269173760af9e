//! Column-adding forecast calculations: flat rate, capped rate and per head

use super::table::Forecast;
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Reasons a calculation could not be applied to a forecast
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("column '{0}' not found in forecast")]
    ColumnNotFound(String),

    #[error("column '{0}' is not a numeric type")]
    NonNumericColumn(String),

    #[error("column '{0}' already exists in forecast")]
    ColumnExists(String),

    #[error("new column name must not be empty")]
    EmptyColumnName,
}

/// A calculation that appends one numeric column to a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnCalculation {
    /// `base_column * applied_rate`
    FlatRate {
        base_column: String,
        new_column_name: String,
        applied_rate: f64,
    },
    /// Rate on `base_column`, applied only while `cap_base_column` is within `cap_amount`
    CappedRate {
        base_column: String,
        new_column_name: String,
        applied_rate: f64,
        cap_base_column: String,
        cap_amount: f64,
    },
    /// Inflated flat `amount` once per employee per month
    PerHead { new_column_name: String, amount: f64 },
}

impl ColumnCalculation {
    /// Name of the column this calculation adds
    pub fn new_column_name(&self) -> &str {
        match self {
            ColumnCalculation::FlatRate { new_column_name, .. }
            | ColumnCalculation::CappedRate { new_column_name, .. }
            | ColumnCalculation::PerHead { new_column_name, .. } => new_column_name,
        }
    }

    /// Apply to `forecast`, returning a new forecast with one more column.
    ///
    /// On error nothing is added and `forecast` is left as it was.
    pub fn apply(&self, forecast: &Forecast) -> Result<Forecast, CalculationError> {
        let result = match self {
            ColumnCalculation::FlatRate {
                base_column,
                new_column_name,
                applied_rate,
            } => flat_rate(forecast, base_column, new_column_name, *applied_rate),
            ColumnCalculation::CappedRate {
                base_column,
                new_column_name,
                applied_rate,
                cap_base_column,
                cap_amount,
            } => capped_rate(
                forecast,
                base_column,
                new_column_name,
                *applied_rate,
                cap_base_column,
                *cap_amount,
            ),
            ColumnCalculation::PerHead { new_column_name, amount } => per_head(forecast, new_column_name, *amount),
        }?;

        info!("Added forecast column '{}'", self.new_column_name());
        Ok(result)
    }
}

/// Add `new_column_name` as `base_column * applied_rate`
pub fn flat_rate(
    forecast: &Forecast,
    base_column: &str,
    new_column_name: &str,
    applied_rate: f64,
) -> Result<Forecast, CalculationError> {
    let values = forecast
        .numeric_column(base_column)?
        .into_iter()
        .map(|base| base * applied_rate)
        .collect();

    forecast.with_added_column(new_column_name, values)
}

/// Rate on the part of `base` that fits under `cap_amount`, given the running total `cap_base`
pub fn capped_amount(base: f64, cap_base: f64, applied_rate: f64, cap_amount: f64) -> f64 {
    if cap_base <= cap_amount {
        base * applied_rate
    } else if cap_base - base >= cap_amount {
        0.0
    } else {
        (cap_amount - cap_base + base).max(0.0) * applied_rate
    }
}

/// Add `new_column_name` as `base_column * applied_rate`, capped by a running total.
///
/// `cap_base_column` is a cumulative tracker (such as `ytd_compensation`) that
/// already includes the row's own `base_column` value.
pub fn capped_rate(
    forecast: &Forecast,
    base_column: &str,
    new_column_name: &str,
    applied_rate: f64,
    cap_base_column: &str,
    cap_amount: f64,
) -> Result<Forecast, CalculationError> {
    let base = forecast.numeric_column(base_column)?;
    let cap_base = forecast.numeric_column(cap_base_column)?;

    let values = base
        .iter()
        .zip(&cap_base)
        .map(|(base, cap_base)| capped_amount(*base, *cap_base, applied_rate, cap_amount))
        .collect();

    forecast.with_added_column(new_column_name, values)
}

/// Add `new_column_name` as `inflation_factor * amount` once per employee per month.
///
/// Within each employee-month only the role(s) with the highest non-zero
/// proration carry the amount. Roles tied at that maximum each carry it.
pub fn per_head(forecast: &Forecast, new_column_name: &str, amount: f64) -> Result<Forecast, CalculationError> {
    let prorations = forecast.numeric_column("proration")?;
    let inflation = forecast.numeric_column("inflation_factor")?;

    let mut max_prorations: HashMap<(&str, NaiveDate), f64> = HashMap::new();
    for (row, proration) in forecast.rows().iter().zip(&prorations) {
        max_prorations
            .entry((row.role.employee_id.as_str(), row.start_of_month))
            .and_modify(|max| *max = max.max(*proration))
            .or_insert(*proration);
    }

    let values = forecast
        .rows()
        .iter()
        .zip(prorations.iter().zip(&inflation))
        .map(|(row, (proration, inflation_factor))| {
            let max = max_prorations[&(row.role.employee_id.as_str(), row.start_of_month)];
            if *proration == max && *proration > 0.0 {
                inflation_factor * amount
            } else {
                0.0
            }
        })
        .collect();

    forecast.with_added_column(new_column_name, values)
}
