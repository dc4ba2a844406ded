//! Fixtures for tests

use crate::model::{Horizon, Model, StorageParameters, SystemParameters};
use crate::units::{Dimensionless, Energy, MoneyPerEnergy, Power};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// PV generation for the bundled day (kW)
pub const PV: [f64; 24] = [
    0.0, 0.0, 0.0, 20.0, 110.0, 240.0, 350.0, 460.0, 550.0, 640.0, 730.0, 720.0, 710.0, 690.0,
    90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 30.0, 20.0, 10.0, 0.0,
];

/// Demand for the bundled day (kW)
pub const DEMAND: [f64; 24] = [
    190.0, 185.0, 180.0, 195.0, 310.0, 420.0, 440.0, 550.0, 580.0, 640.0, 630.0, 530.0, 515.0,
    410.0, 400.0, 390.0, 380.0, 345.0, 370.0, 365.0, 320.0, 355.0, 250.0, 245.0,
];

/// Spot prices for the bundled day (per kWh)
pub const PRICE: [f64; 24] = [
    0.1, 0.12, 0.11, 0.13, 0.15, 0.18, 0.2, 0.22, 0.23, 0.24, 0.22, 0.2, 0.18, 0.17, 0.16, 0.14,
    0.13, 0.12, 0.11, 0.1, 0.1, 0.12, 0.13, 0.15,
];

#[fixture]
pub fn horizon() -> Horizon {
    Horizon::new(
        PV.len(),
        PV.into_iter().map(Power::new).collect(),
        DEMAND.into_iter().map(Power::new).collect(),
        PRICE.into_iter().map(MoneyPerEnergy::new).collect(),
    )
    .unwrap()
}

#[fixture]
pub fn system_parameters() -> SystemParameters {
    SystemParameters {
        hydrogen_storage: StorageParameters::new(Energy(100.0), Energy(1000.0), Energy(100.0)),
        esd: StorageParameters::new(Energy(50.0), Energy(500.0), Energy(50.0)),
        electrolyzer_efficiency: Dimensionless(0.8),
        fuel_cell_efficiency: Dimensionless(0.7),
        threshold_price: MoneyPerEnergy(0.18),
    }
}

#[fixture]
pub fn model(horizon: Horizon, system_parameters: SystemParameters) -> Model {
    Model::new(horizon, system_parameters).unwrap()
}
