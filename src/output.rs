//! The module responsible for writing output data to disk.
use crate::dispatch::{ConstraintKind, LinearProgram, VariableFamily};
use crate::model::{Horizon, HourlyInput};
use crate::optimisation::{HourlyDispatch, OptimisationResult, SolveStatus, Solution};
use crate::units::{Energy, Money, MoneyPerEnergy, Power};
use anyhow::{Context, Result, ensure};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "h2grid_results";

/// The output file name for the hourly schedule
const SCHEDULE_FILE_NAME: &str = "schedule.csv";

/// The output file name for the run summary
const SUMMARY_FILE_NAME: &str = "summary.toml";

/// The output file name for the problem's variables
const DEBUG_VARIABLES_FILE_NAME: &str = "debug_variables.csv";

/// The output file name for the problem's constraints
const DEBUG_CONSTRAINTS_FILE_NAME: &str = "debug_constraints.csv";

/// Get the model name from the specified directory path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, deleting the old one if `allow_overwrite` is set.
///
/// # Returns
///
/// True if an existing, non-empty output directory was removed.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut entries) = fs::read_dir(output_dir) {
        if entries.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// A row of the schedule CSV file: the inputs for an hour alongside its dispatch
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ScheduleRow {
    hour: usize,
    pv: Power,
    demand: Power,
    price: MoneyPerEnergy,
    grid_import: Power,
    grid_export: Power,
    electrolyzer: Power,
    fuel_cell: Power,
    hydrogen_level: Energy,
    esd_power: Power,
    esd_level: Energy,
}

impl ScheduleRow {
    fn new(input: HourlyInput, dispatch: &HourlyDispatch) -> Self {
        Self {
            hour: dispatch.hour,
            pv: input.pv,
            demand: input.demand,
            price: input.price,
            grid_import: dispatch.grid_import,
            grid_export: dispatch.grid_export,
            electrolyzer: dispatch.electrolyzer,
            fuel_cell: dispatch.fuel_cell,
            hydrogen_level: dispatch.hydrogen_level,
            esd_power: dispatch.esd_power,
            esd_level: dispatch.esd_level,
        }
    }
}

/// Contents of the summary file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Summary {
    status: SolveStatus,
    objective: Option<Money>,
    horizon_length: usize,
}

/// Write the schedule for an optimal solution to a CSV file
pub fn write_schedule(output_path: &Path, horizon: &Horizon, solution: &Solution) -> Result<()> {
    let file_path = output_path.join(SCHEDULE_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)?;
    for (input, dispatch) in horizon.iter().zip(solution.hours()) {
        writer.serialize(ScheduleRow::new(input, dispatch))?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the outcome of the optimisation to a TOML file
pub fn write_summary(
    output_path: &Path,
    result: &OptimisationResult,
    horizon_length: usize,
) -> Result<()> {
    let summary = Summary {
        status: result.status(),
        objective: result.solution().map(Solution::objective),
        horizon_length,
    };
    let file_path = output_path.join(SUMMARY_FILE_NAME);
    fs::write(&file_path, toml::to_string(&summary)?)?;

    Ok(())
}

/// Print the schedule to the log, one line per hour
pub fn log_schedule(horizon: &Horizon, solution: &Solution) {
    info!(
        "{:>4} {:>8} {:>8} {:>6} {:>8} {:>8} {:>8} {:>8} {:>9} {:>8} {:>8} {:>8}",
        "hour", "pv", "demand", "price", "import", "export", "elec", "fc", "h2_level", "esd_p",
        "esd_lvl", "cost"
    );
    for (input, hour) in horizon.iter().zip(solution.hours()) {
        info!(
            "{:>4} {:>8.2} {:>8.2} {:>6.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>9.2} {:>8.2} {:>8.2} \
            {:>8.2}",
            hour.hour,
            input.pv.value(),
            input.demand.value(),
            input.price.value(),
            hour.grid_import.value(),
            hour.grid_export.value(),
            hour.electrolyzer.value(),
            hour.fuel_cell.value(),
            hour.hydrogen_level.value(),
            hour.esd_power.value(),
            hour.esd_level.value(),
            hour.grid_cost(input.price).value()
        );
    }
}

/// Represents a row in the debug variables CSV file
#[derive(Serialize, Debug, PartialEq)]
struct VariableRow {
    family: VariableFamily,
    hour: usize,
    lower: f64,
    upper: f64,
    cost: f64,
}

/// Represents a row in the debug constraints CSV file
#[derive(Serialize, Debug, PartialEq)]
struct ConstraintRow {
    kind: ConstraintKind,
    hour: usize,
    lower: f64,
    upper: f64,
    num_terms: usize,
}

/// For writing extra debug information about the model
pub struct DebugDataWriter {
    variables_writer: csv::Writer<File>,
    constraints_writer: csv::Writer<File>,
}

impl DebugDataWriter {
    /// Open CSV files to write debug info to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            variables_writer: new_writer(DEBUG_VARIABLES_FILE_NAME)?,
            constraints_writer: new_writer(DEBUG_CONSTRAINTS_FILE_NAME)?,
        })
    }

    /// Write the variables and constraints of the linear program
    pub fn write_linear_program(&mut self, program: &LinearProgram) -> Result<()> {
        for (key, definition) in program.iter_variables() {
            let row = VariableRow {
                family: key.family,
                hour: key.hour,
                lower: *definition.bounds.start(),
                upper: *definition.bounds.end(),
                cost: definition.cost,
            };
            self.variables_writer.serialize(row)?;
        }

        for constraint in program.constraints() {
            let row = ConstraintRow {
                kind: constraint.kind,
                hour: constraint.hour,
                lower: *constraint.bounds.start(),
                upper: *constraint.bounds.end(),
                num_terms: constraint.terms.len(),
            };
            self.constraints_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.variables_writer.flush()?;
        self.constraints_writer.flush()?;

        Ok(())
    }
}
