//! Headcount Forecast CLI
//!
//! Build a forecast base from a roster, layer calculated columns on top and
//! replay saved action registers.
//!
//! ```bash
//! headcount_forecast create --roster roster.csv --start-date 2024-01-01 --end-date 2028-12-31 \
//!     --inflation-rate 0.03 --inflation-start 2025-01-01 --inflation-frequency 12
//! headcount_forecast add 24-06-01_action_steps.json capped-rate --base-column compensation \
//!     --new-column ss_tax --rate 0.062 --cap-amount 168600
//! headcount_forecast replay 24-06-01_action_steps.json --output-dir out
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use headcount_forecast::forecast::export_forecast;
use headcount_forecast::{ActionRegister, BaseInputs, ColumnCalculation, Forecast, ForecastConfig, Session};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "headcount_forecast")]
#[command(about = "Monthly headcount and compensation forecast")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a new forecast base from a roster file
    Create {
        /// Headcount roster CSV
        #[arg(long)]
        roster: PathBuf,

        /// Any date in the first forecast month (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start_date: NaiveDate,

        /// Any date in the last forecast month (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        end_date: NaiveDate,

        /// Inflation rate per step (e.g. 0.03 for 3%)
        #[arg(long)]
        inflation_rate: f64,

        /// Date of the first inflation step (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        inflation_start: NaiveDate,

        /// Months between inflation steps
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        inflation_frequency: u32,

        /// Directory for the forecast CSV and action register
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Add a calculated column to a saved forecast
    Add {
        /// Action register JSON to extend (updated in place)
        register: PathBuf,

        /// Directory for the updated forecast CSV
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(subcommand)]
        calculation: CalculationArgs,
    },

    /// Rebuild a forecast from an action register
    Replay {
        /// Action register JSON
        register: PathBuf,

        /// Directory for the forecast CSV
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum CalculationArgs {
    /// Percentage of an existing column
    FlatRate {
        #[arg(long)]
        base_column: String,
        #[arg(long)]
        new_column: String,
        #[arg(long, allow_negative_numbers = true)]
        rate: f64,
    },
    /// Percentage of an existing column up to a cumulative cap
    CappedRate {
        #[arg(long)]
        base_column: String,
        #[arg(long)]
        new_column: String,
        #[arg(long, allow_negative_numbers = true)]
        rate: f64,
        /// Running total the cap is measured against
        #[arg(long, default_value = "ytd_compensation")]
        cap_base_column: String,
        #[arg(long)]
        cap_amount: f64,
    },
    /// Inflation-adjusted flat amount per employee per month
    PerHead {
        #[arg(long)]
        new_column: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
    },
}

impl From<CalculationArgs> for ColumnCalculation {
    fn from(args: CalculationArgs) -> Self {
        match args {
            CalculationArgs::FlatRate { base_column, new_column, rate } => ColumnCalculation::FlatRate {
                base_column,
                new_column_name: new_column,
                applied_rate: rate,
            },
            CalculationArgs::CappedRate {
                base_column,
                new_column,
                rate,
                cap_base_column,
                cap_amount,
            } => ColumnCalculation::CappedRate {
                base_column,
                new_column_name: new_column,
                applied_rate: rate,
                cap_base_column,
                cap_amount,
            },
            CalculationArgs::PerHead { new_column, amount } => ColumnCalculation::PerHead {
                new_column_name: new_column,
                amount,
            },
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", value))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Create {
            roster,
            start_date,
            end_date,
            inflation_rate,
            inflation_start,
            inflation_frequency,
            output_dir,
        } => {
            let inputs = BaseInputs {
                roster_file: roster,
                config: ForecastConfig {
                    start_date,
                    end_date,
                    inflation_rate,
                    inflation_start,
                    inflation_freq: inflation_frequency,
                },
            };
            let session = Session::create(inputs).context("could not create forecast base")?;
            println!("New forecast created successfully!");

            write_outputs(session.forecast(), &output_dir)?;
            let register_path = session.register().export(&output_dir)?;
            println!("Action steps exported to {}", register_path.display());
        }

        Command::Add {
            register,
            output_dir,
            calculation,
        } => {
            let saved = ActionRegister::load(&register)?;
            let session = Session::from_register(saved).context("could not rebuild forecast from register")?;

            let calculation = ColumnCalculation::from(calculation);
            let session = session
                .with_column(calculation)
                .context("forecast could not be applied; register left unchanged")?;

            session.register().save(&register)?;
            info!("Action register {} updated", register.display());
            write_outputs(session.forecast(), &output_dir)?;
        }

        Command::Replay { register, output_dir } => {
            let saved = ActionRegister::load(&register)?;
            let forecast = saved.replay().context("could not replay action register")?;
            write_outputs(&forecast, &output_dir)?;
        }
    }

    Ok(())
}

fn write_outputs(forecast: &Forecast, output_dir: &Path) -> Result<()> {
    print_summary(forecast);

    let path = export_forecast(forecast, output_dir)
        .with_context(|| format!("could not export forecast to {}", output_dir.display()))?;
    println!("Forecast exported to {}", path.display());
    Ok(())
}

fn print_summary(forecast: &Forecast) {
    let summary = forecast.summary();

    println!("\nSummary:");
    println!("  Rows: {}", summary.total_rows);
    println!("  Employees: {}", summary.employees);
    println!("  Months: {}", summary.months);
    println!("  Total Compensation: ${:.2}", summary.total_compensation);
    println!("  Net Headcount Change: {}", summary.net_headcount_change);
    println!("  Ending Headcount: {}", summary.ending_headcount);
    for (name, total) in &summary.added_totals {
        println!("  Total {}: ${:.2}", name, total);
    }
    println!();
}
