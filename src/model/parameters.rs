//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use super::{StorageParameters, SystemParameters};
use crate::input::{input_err_msg, read_toml};
use crate::solver::SolverOptions;
use crate::units::{Dimensionless, Energy, MoneyPerEnergy};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// Storage parameters as they appear in `model.toml`
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StorageParametersRaw {
    /// The lowest permitted level
    pub min_level: Energy,
    /// The highest permitted level
    pub max_level: Energy,
    /// The level before the first hour. Defaults to `min_level`.
    pub initial_level: Option<Energy>,
}

impl From<&StorageParametersRaw> for StorageParameters {
    fn from(raw: &StorageParametersRaw) -> Self {
        StorageParameters::new(
            raw.min_level,
            raw.max_level,
            raw.initial_level.unwrap_or(raw.min_level),
        )
    }
}

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelParameters {
    /// Selling to the grid is only possible when the spot price is above this value
    pub threshold_price: MoneyPerEnergy,
    /// Efficiency of the electrolyzer, in the range (0, 1]
    pub electrolyzer_efficiency: Dimensionless,
    /// Efficiency of the fuel cell, in the range (0, 1]
    pub fuel_cell_efficiency: Dimensionless,
    /// Hydrogen storage
    pub hydrogen_storage: StorageParametersRaw,
    /// Secondary electrochemical storage device
    pub esd: StorageParametersRaw,
    /// Options passed through to the solver
    #[serde(default)]
    pub solver: SolverOptions,
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        // The physical parameters are checked when the model is created
        model_params
            .solver
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// The system parameters, with default initial levels filled in
    pub fn system_parameters(&self) -> SystemParameters {
        SystemParameters {
            hydrogen_storage: (&self.hydrogen_storage).into(),
            esd: (&self.esd).into(),
            electrolyzer_efficiency: self.electrolyzer_efficiency,
            fuel_cell_efficiency: self.fuel_cell_efficiency,
            threshold_price: self.threshold_price,
        }
    }
}
