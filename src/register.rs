//! Action register and forecast session
//!
//! A forecast is fully described by its base inputs plus the ordered list of
//! column calculations applied on top. The register records both so a
//! forecast can be exported as JSON and rebuilt later without re-entering
//! anything.
//!
//! # Example
//! ```ignore
//! let session = Session::create(inputs)?
//!     .with_column(ColumnCalculation::FlatRate { .. })?;
//!
//! session.register().save("steps.json")?;
//! let rebuilt = ActionRegister::load("steps.json")?.replay()?;
//! assert_eq!(&rebuilt, session.forecast());
//! ```

use crate::forecast::{
    build_forecast, dated_file_name, CalculationError, ColumnCalculation, Forecast, ForecastConfig, InputError,
};
use crate::roster::{load_roster, RosterFileError, RosterRecord};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures while building, replaying or persisting a forecast
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Roster(#[from] RosterFileError),

    #[error("step {index} ('{column}') could not be applied")]
    Step {
        index: usize,
        column: String,
        #[source]
        source: CalculationError,
    },

    #[error("could not access action register {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed action register")]
    Json(#[from] serde_json::Error),
}

/// Inputs of a forecast base: the roster plus the calendar and inflation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseInputs {
    pub roster_file: PathBuf,

    #[serde(flatten)]
    pub config: ForecastConfig,
}

/// Replayable log of the steps that produced a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRegister {
    pub base_inputs: BaseInputs,

    #[serde(default)]
    pub added_columns: Vec<ColumnCalculation>,
}

impl ActionRegister {
    pub fn new(base_inputs: BaseInputs) -> Self {
        Self {
            base_inputs,
            added_columns: Vec::new(),
        }
    }

    /// Rebuild the forecast, loading the roster named in the base inputs
    pub fn replay(&self) -> Result<Forecast, RegisterError> {
        self.base_inputs.config.validate()?;
        let roster = load_roster(&self.base_inputs.roster_file)?;
        self.replay_with_roster(&roster)
    }

    /// Rebuild the forecast from an already loaded roster
    pub fn replay_with_roster(&self, roster: &[RosterRecord]) -> Result<Forecast, RegisterError> {
        let base = build_forecast(roster, &self.base_inputs.config)?;

        let forecast = self
            .added_columns
            .iter()
            .enumerate()
            .try_fold(base, |forecast, (index, calculation)| {
                calculation.apply(&forecast).map_err(|source| RegisterError::Step {
                    index,
                    column: calculation.new_column_name().to_string(),
                    source,
                })
            })?;

        info!("Replayed {} forecast steps", self.added_columns.len());
        Ok(forecast)
    }

    /// Read a register from a JSON file.
    ///
    /// A relative `roster_file` is taken relative to the directory holding
    /// the register, not the current working directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RegisterError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RegisterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut register: ActionRegister = serde_json::from_reader(BufReader::new(file))?;

        let roster_file = &register.base_inputs.roster_file;
        if roster_file.is_relative() {
            let resolved = path.parent().unwrap_or_else(|| Path::new("")).join(roster_file);
            register.base_inputs.roster_file = fs::canonicalize(&resolved).unwrap_or(resolved);
        }
        Ok(register)
    }

    /// Write the register as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RegisterError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| RegisterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Save to `<dir>/<yy-mm-dd>_action_steps.json` and return the path
    pub fn export(&self, dir: &Path) -> Result<PathBuf, RegisterError> {
        fs::create_dir_all(dir).map_err(|source| RegisterError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(dated_file_name("action_steps.json"));
        self.save(&path)?;
        info!("Action register exported to {}", path.display());
        Ok(path)
    }
}

/// The current forecast together with the register that reproduces it
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    forecast: Forecast,
    register: ActionRegister,
}

impl Session {
    /// Load the roster and build a new forecast base.
    ///
    /// The register records the roster as an absolute path so it can be
    /// replayed from any working directory.
    pub fn create(mut inputs: BaseInputs) -> Result<Self, RegisterError> {
        inputs.config.validate()?;
        inputs.roster_file = fs::canonicalize(&inputs.roster_file).map_err(|source| RosterFileError::Io {
            path: inputs.roster_file.clone(),
            source,
        })?;
        let roster = load_roster(&inputs.roster_file)?;
        Self::from_roster(inputs, &roster)
    }

    /// Build a new forecast base from an already loaded roster
    pub fn from_roster(inputs: BaseInputs, roster: &[RosterRecord]) -> Result<Self, RegisterError> {
        let forecast = build_forecast(roster, &inputs.config)?;
        Ok(Self {
            forecast,
            register: ActionRegister::new(inputs),
        })
    }

    /// Rebuild a session from a saved register
    pub fn from_register(register: ActionRegister) -> Result<Self, RegisterError> {
        let forecast = register.replay()?;
        Ok(Self { forecast, register })
    }

    /// Apply a calculation, recording it only if it succeeds
    pub fn with_column(&self, calculation: ColumnCalculation) -> Result<Self, CalculationError> {
        let forecast = calculation.apply(&self.forecast).map_err(|err| {
            warn!("Forecast could not be applied: {}", err);
            err
        })?;

        let mut register = self.register.clone();
        register.added_columns.push(calculation);
        Ok(Self { forecast, register })
    }

    pub fn forecast(&self) -> &Forecast {
        &self.forecast
    }

    pub fn register(&self) -> &ActionRegister {
        &self.register
    }

    pub fn into_parts(self) -> (Forecast, ActionRegister) {
        (self.forecast, self.register)
    }
}
