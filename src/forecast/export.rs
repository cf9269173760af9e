//! Forecast CSV export

use super::table::{Forecast, BASE_COLUMNS};
use chrono::Local;
use csv::Writer;
use log::info;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write forecast csv")]
    Csv(#[from] csv::Error),
}

/// `<yy-mm-dd>_<suffix>` using today's local date
pub fn dated_file_name(suffix: &str) -> String {
    format!("{}_{}", Local::now().format("%y-%m-%d"), suffix)
}

/// Write the forecast as CSV: base columns, then added columns in order
pub fn write_forecast<W: Write>(forecast: &Forecast, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = Writer::from_writer(writer);

    csv_writer.write_record(forecast.column_names())?;

    for (index, row) in forecast.rows().iter().enumerate() {
        let mut record: Vec<String> = BASE_COLUMNS
            .iter()
            .map(|(column, _)| row.cell(column).map(|cell| cell.to_string()).unwrap_or_default())
            .collect();
        record.extend(
            forecast
                .added_columns()
                .iter()
                .map(|column| column.values[index].to_string()),
        );
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the forecast to `<dir>/<yy-mm-dd>_forecast.csv` and return the path.
///
/// `dir` is created if it does not exist yet.
pub fn export_forecast(forecast: &Forecast, dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(dated_file_name("forecast.csv"));
    let file = File::create(&path).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    write_forecast(forecast, file)?;
    info!("Forecast ({} rows) exported to {}", forecast.len(), path.display());
    Ok(path)
}
