//! Employee roster records and CSV loading

mod data;
pub mod loader;

pub use data::{RosterRecord, open_end_date, open_start_date};
pub use loader::{RosterFileError, load_roster, load_roster_from_reader, REQUIRED_COLUMNS};
