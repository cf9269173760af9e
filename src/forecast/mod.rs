//! Forecast base generation, column calculations and export

pub mod base;
pub mod calculators;
mod export;
mod table;

pub use base::{build_forecast, generate_forecast_base, ForecastConfig, InputError};
pub use calculators::{capped_rate, flat_rate, per_head, CalculationError, ColumnCalculation};
pub use export::{dated_file_name, export_forecast, write_forecast, ExportError};
pub use table::{AddedColumn, CellValue, ColumnKind, Forecast, ForecastRow, ForecastSummary, BASE_COLUMNS};
