//! Headcount Forecast - monthly headcount and compensation forecasting
//!
//! This library provides:
//! - Month range generation with scheduled inflation steps
//! - Roster loading from CSV with open-ended employment handling
//! - Forecast base generation (proration, headcount, compensation, YTD totals)
//! - Column calculations layered on a forecast (flat rate, capped rate, per head)
//! - Replayable action registers and CSV/JSON export

pub mod months;
pub mod roster;
pub mod forecast;
pub mod register;

// Re-export commonly used types
pub use months::{generate_month_ranges, MonthRange};
pub use roster::{load_roster, RosterFileError, RosterRecord};
pub use forecast::{build_forecast, generate_forecast_base, ColumnCalculation, Forecast, ForecastConfig, ForecastRow};
pub use register::{ActionRegister, BaseInputs, RegisterError, Session};
