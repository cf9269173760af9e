//! Load roster records from a headcount roster CSV

use super::RosterRecord;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use log::{info, warn};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Columns every roster file must carry
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "Role ID",
    "Employee ID",
    "Employee Name",
    "Title",
    "Department",
    "Employment type",
    "Location",
    "Start Date",
    "End Date",
    "Salary",
    "Bonus",
    "Commission",
];

/// Accepted roster date formats, tried in order
const ROSTER_DATE_FORMATS: [&str; 3] = ["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

/// Problems with the roster input itself
#[derive(Debug, Error)]
pub enum RosterFileError {
    #[error("could not open roster file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("roster is missing required column '{0}'")]
    MissingColumn(String),

    #[error("invalid roster record at line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    #[error("could not read roster")]
    Csv(#[from] csv::Error),
}

/// Raw CSV row matching the roster columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Role ID")]
    role_id: i32,
    #[serde(rename = "Employee ID")]
    employee_id: String,
    #[serde(rename = "Employee Name")]
    employee_name: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Department")]
    department: String,
    #[serde(rename = "Employment type")]
    employment_type: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Start Date")]
    start_date: Option<String>,
    #[serde(rename = "End Date")]
    end_date: Option<String>,
    #[serde(rename = "Salary")]
    salary: f64,
    #[serde(rename = "Bonus")]
    bonus: f64,
    #[serde(rename = "Commission")]
    commission: f64,
}

impl CsvRow {
    fn into_record(self) -> RosterRecord {
        let start_date = parse_roster_date(self.start_date.as_deref(), self.role_id);
        let end_date = parse_roster_date(self.end_date.as_deref(), self.role_id);

        let mut record = RosterRecord::new(
            self.role_id,
            self.employee_id,
            start_date,
            end_date,
            self.salary,
            self.bonus,
            self.commission,
        );
        record.employee_name = self.employee_name;
        record.title = self.title;
        record.department = self.department;
        record.employment_type = self.employment_type;
        record.location = self.location;
        record
    }
}

/// Parse a roster date leniently; blank or unrecognised values are treated as missing
fn parse_roster_date(raw: Option<&str>, role_id: i32) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = ROSTER_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok());

    if parsed.is_none() {
        warn!("Role {}: unrecognised date '{}' treated as missing", role_id, raw);
    }
    parsed
}

/// Load all roster records from a CSV file
pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<Vec<RosterRecord>, RosterFileError> {
    let path = path.as_ref();
    info!("Reading roster from {}", path.display());

    let file = File::open(path).map_err(|source| RosterFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_roster_from_reader(file)
}

/// Load roster records from any reader (e.g., string buffer)
pub fn load_roster_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<RosterRecord>, RosterFileError> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(RosterFileError::MissingColumn(missing.to_string()));
    }

    let mut roster = Vec::new();
    for result in csv_reader.deserialize() {
        let row: CsvRow = result.map_err(invalid_record)?;
        roster.push(row.into_record());
    }

    info!("Loaded {} roster records", roster.len());
    Ok(roster)
}

fn invalid_record(err: csv::Error) -> RosterFileError {
    match err.position() {
        Some(position) => RosterFileError::InvalidRecord {
            line: position.line(),
            message: err.to_string(),
        },
        None => RosterFileError::Csv(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{open_end_date, open_start_date};

    const HEADER: &str = "Role ID,Employee ID,Employee Name,Title,Department,Employment type,Location,Start Date,End Date,Salary,Bonus,Commission\n";

    fn load(body: &str) -> Result<Vec<RosterRecord>, RosterFileError> {
        load_roster_from_reader(format!("{HEADER}{body}").as_bytes())
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_load_basic_roster() {
        let roster = load(
            "1,123,John Doe,Engineer,Engineering,Full-time,New York,01/01/23,,60000,0.1,0.02\n\
             2,124,Jane Smith,Manager,Sales,Part-time,San Francisco,03/15/23,12/31/23,80000,0.07,0.03\n",
        )
        .expect("roster should load");

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].role_id, 1);
        assert_eq!(roster[0].employee_id, "123");
        assert_eq!(roster[0].title, "Engineer");
        assert_eq!(roster[0].start_date, Some(date(2023, 1, 1)));
        assert_eq!(roster[0].end_date, None);
        assert_eq!(roster[0].start_date_complete, date(2023, 1, 1));
        assert_eq!(roster[0].end_date_complete, open_end_date());
        assert_eq!(roster[1].end_date_complete, date(2023, 12, 31));
        assert_eq!(roster[1].salary, 80000.0);
    }

    #[test]
    fn test_invalid_date_is_treated_as_missing() {
        let roster = load("1,123,John Doe,Engineer,Engineering,Full-time,New York,01/01/23,invalid_date,60000,0.1,0.02\n")
            .expect("roster should load");

        assert_eq!(roster[0].end_date, None);
        assert_eq!(roster[0].end_date_complete, open_end_date());
    }

    #[test]
    fn test_empty_dates_use_sentinels() {
        let roster = load("1,123,John Doe,Engineer,Engineering,Full-time,New York,,,60000,0.1,0.02\n")
            .expect("roster should load");

        assert_eq!(roster[0].start_date, None);
        assert_eq!(roster[0].start_date_complete, open_start_date());
        assert_eq!(roster[0].end_date_complete, open_end_date());
    }

    #[test]
    fn test_mixed_date_formats() {
        let roster = load(
            "1,123,John Doe,Engineer,Engineering,Full-time,New York,01/01/23,3/15/24,60000,0.1,0.02\n\
             2,124,Jane Smith,Manager,Sales,Part-time,Boston,2023-03-15,12/31/2023,80000,0.07,0.03\n",
        )
        .expect("roster should load");

        assert_eq!(roster[0].end_date, Some(date(2024, 3, 15)));
        assert_eq!(roster[1].start_date, Some(date(2023, 3, 15)));
        assert_eq!(roster[1].end_date, Some(date(2023, 12, 31)));
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = "Role ID,Employee ID,Employee Name,Title,Department,Employment type,Location,Start Date,End Date,Salary,Bonus,Commission,Notes\n\
                   1,123,John Doe,Engineer,Engineering,Full-time,New York,01/01/23,,60000,0.1,0.02,remote\n";
        let roster = load_roster_from_reader(csv.as_bytes()).expect("roster should load");
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let csv = "Role ID,Employee ID,Employee Name,Title,Department,Employment type,Location,Start Date,End Date,Bonus,Commission\n\
                   1,123,John Doe,Engineer,Engineering,Full-time,New York,01/01/23,,0.1,0.02\n";
        let err = load_roster_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, RosterFileError::MissingColumn(ref column) if column == "Salary"));
    }

    #[test]
    fn test_non_numeric_salary_is_reported() {
        let err = load("1,123,John Doe,Engineer,Engineering,Full-time,New York,01/01/23,,lots,0.1,0.02\n").unwrap_err();
        assert!(matches!(err, RosterFileError::InvalidRecord { .. }));
        assert!(err.to_string().contains("invalid roster record"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_roster("does/not/exist/roster.csv").unwrap_err();
        assert!(matches!(err, RosterFileError::Io { .. }));
    }
}
