//! The validated inputs for a dispatch run.
//!
//! A [`Model`] can only be created from inputs which pass validation, so the formulation code can
//! rely on the series lengths matching, efficiencies being usable as divisors and so on.
use crate::units::{Dimensionless, Energy, MoneyPerEnergy, Power};
use thiserror::Error;

pub mod parameters;
pub use parameters::ModelParameters;

/// Indicates that the inputs for a model are malformed or inconsistent.
///
/// These errors are always raised before any optimisation problem is built.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidInputError {
    /// The horizon has no time steps
    #[error("The horizon must contain at least one hour")]
    EmptyHorizon,
    /// A time series has the wrong number of values
    #[error("{series} has {actual} values, but the horizon is {expected} hours long")]
    LengthMismatch {
        /// Name of the series
        series: &'static str,
        /// The horizon length
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },
    /// A time series contains NaN or an infinite value
    #[error("{series} has a non-finite value at hour {hour}")]
    NonFiniteValue {
        /// Name of the series
        series: &'static str,
        /// The offending hour
        hour: usize,
    },
    /// Storage levels are not ordered as `min <= initial <= max`
    #[error(
        "{device} levels must satisfy min <= initial <= max \
        (min = {min}, initial = {initial}, max = {max})"
    )]
    StorageBounds {
        /// Which storage device
        device: &'static str,
        /// Minimum level
        min: f64,
        /// Initial level
        initial: f64,
        /// Maximum level
        max: f64,
    },
    /// An efficiency lies outside (0, 1]
    #[error("{name} efficiency must be in the range (0, 1], got {value}")]
    Efficiency {
        /// Which conversion the efficiency applies to
        name: &'static str,
        /// The value supplied
        value: f64,
    },
    /// The threshold price is NaN or infinite
    #[error("The threshold price must be finite, got {0}")]
    ThresholdPrice(f64),
}

/// The hourly time series over which dispatch is scheduled
#[derive(Debug, Clone, PartialEq)]
pub struct Horizon {
    pv: Vec<Power>,
    demand: Vec<Power>,
    price: Vec<MoneyPerEnergy>,
}

/// The inputs for a single hour of the [`Horizon`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyInput {
    /// Index of the hour, starting at zero
    pub hour: usize,
    /// PV generation
    pub pv: Power,
    /// Electrical demand
    pub demand: Power,
    /// Spot price for grid energy
    pub price: MoneyPerEnergy,
}

/// Check that `values` has `expected` elements, all of which are finite
fn check_series<T: Copy + Into<f64>>(
    series: &'static str,
    values: &[T],
    expected: usize,
) -> Result<(), InvalidInputError> {
    if values.len() != expected {
        return Err(InvalidInputError::LengthMismatch {
            series,
            expected,
            actual: values.len(),
        });
    }

    if let Some(hour) = values.iter().position(|&value| !value.into().is_finite()) {
        return Err(InvalidInputError::NonFiniteValue { series, hour });
    }

    Ok(())
}

impl Horizon {
    /// Create a new [`Horizon`] of `num_hours` steps.
    ///
    /// # Arguments
    ///
    /// * `num_hours` - Length of the horizon
    /// * `pv` - PV generation for each hour
    /// * `demand` - Demand for each hour
    /// * `price` - Spot price for each hour
    pub fn new(
        num_hours: usize,
        pv: Vec<Power>,
        demand: Vec<Power>,
        price: Vec<MoneyPerEnergy>,
    ) -> Result<Self, InvalidInputError> {
        if num_hours == 0 {
            return Err(InvalidInputError::EmptyHorizon);
        }

        check_series("PV generation", &pv, num_hours)?;
        check_series("Demand", &demand, num_hours)?;
        check_series("Price", &price, num_hours)?;

        Ok(Self { pv, demand, price })
    }

    /// The number of hours in the horizon
    pub fn num_hours(&self) -> usize {
        self.pv.len()
    }

    /// Get the inputs for the given hour
    pub fn get(&self, hour: usize) -> HourlyInput {
        HourlyInput {
            hour,
            pv: self.pv[hour],
            demand: self.demand[hour],
            price: self.price[hour],
        }
    }

    /// Iterate over the inputs for each hour in order
    pub fn iter(&self) -> impl Iterator<Item = HourlyInput> + '_ {
        (0..self.num_hours()).map(|hour| self.get(hour))
    }
}

/// Level bounds and starting level for a storage device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageParameters {
    /// The lowest permitted level
    pub min_level: Energy,
    /// The highest permitted level
    pub max_level: Energy,
    /// The level before the first hour
    pub initial_level: Energy,
}

impl StorageParameters {
    /// Create a new [`StorageParameters`]
    pub fn new(min_level: Energy, max_level: Energy, initial_level: Energy) -> Self {
        Self {
            min_level,
            max_level,
            initial_level,
        }
    }

    /// Check that `min <= initial <= max` and that all levels are finite
    fn validate(&self, device: &'static str) -> Result<(), InvalidInputError> {
        let all_finite = self.min_level.is_finite()
            && self.max_level.is_finite()
            && self.initial_level.is_finite();
        if all_finite
            && self.min_level <= self.initial_level
            && self.initial_level <= self.max_level
        {
            return Ok(());
        }

        Err(InvalidInputError::StorageBounds {
            device,
            min: self.min_level.value(),
            initial: self.initial_level.value(),
            max: self.max_level.value(),
        })
    }
}

/// Fixed system parameters for a run
#[derive(Debug, Clone, PartialEq)]
pub struct SystemParameters {
    /// Hydrogen storage
    pub hydrogen_storage: StorageParameters,
    /// Secondary electrochemical storage device
    pub esd: StorageParameters,
    /// Fraction of electrolyzer input power which ends up as stored hydrogen energy
    pub electrolyzer_efficiency: Dimensionless,
    /// Fraction of hydrogen energy drawn by the fuel cell which ends up as electrical power
    pub fuel_cell_efficiency: Dimensionless,
    /// Selling to the grid is only possible when the spot price is above this value
    pub threshold_price: MoneyPerEnergy,
}

/// Check an efficiency lies in (0, 1]
fn check_efficiency(name: &'static str, value: Dimensionless) -> Result<(), InvalidInputError> {
    if value > Dimensionless(0.0) && value <= Dimensionless(1.0) {
        Ok(())
    } else {
        Err(InvalidInputError::Efficiency {
            name,
            value: value.value(),
        })
    }
}

impl SystemParameters {
    /// Whether energy may be sold to the grid at the given price
    pub fn export_allowed(&self, price: MoneyPerEnergy) -> bool {
        price > self.threshold_price
    }

    fn validate(&self) -> Result<(), InvalidInputError> {
        self.hydrogen_storage.validate("Hydrogen storage")?;
        self.esd.validate("ESD")?;
        check_efficiency("Electrolyzer", self.electrolyzer_efficiency)?;
        check_efficiency("Fuel cell", self.fuel_cell_efficiency)?;
        if !self.threshold_price.is_finite() {
            return Err(InvalidInputError::ThresholdPrice(
                self.threshold_price.value(),
            ));
        }

        Ok(())
    }
}

/// A validated model, ready to be formulated as a linear program
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    horizon: Horizon,
    parameters: SystemParameters,
}

impl Model {
    /// Validate the parameters and create a new [`Model`].
    ///
    /// The horizon has already been validated by [`Horizon::new`].
    pub fn new(horizon: Horizon, parameters: SystemParameters) -> Result<Self, InvalidInputError> {
        parameters.validate()?;

        Ok(Self {
            horizon,
            parameters,
        })
    }

    /// The time series inputs
    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    /// The system parameters
    pub fn parameters(&self) -> &SystemParameters {
        &self.parameters
    }
}
