//! Code for reading the hourly PV, demand and price data from a CSV file.
use super::{input_err_msg, read_csv};
use crate::model::Horizon;
use crate::units::{MoneyPerEnergy, Power};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const TIME_SERIES_FILE_NAME: &str = "time_series.csv";

/// A row of the time series CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct TimeSeriesRow {
    hour: usize,
    pv: Power,
    demand: Power,
    price: MoneyPerEnergy,
}

/// Build a [`Horizon`] from rows, which must be given for hours `0..n` in order
fn read_horizon_from_rows(rows: Vec<TimeSeriesRow>) -> Result<Horizon> {
    for (expected, row) in rows.iter().enumerate() {
        ensure!(
            row.hour == expected,
            "Hours must be consecutive and start at zero: expected hour {expected}, found {}",
            row.hour
        );
    }

    let num_hours = rows.len();
    let mut pv = Vec::with_capacity(num_hours);
    let mut demand = Vec::with_capacity(num_hours);
    let mut price = Vec::with_capacity(num_hours);
    for row in rows {
        pv.push(row.pv);
        demand.push(row.demand);
        price.push(row.price);
    }

    Ok(Horizon::new(num_hours, pv, demand, price)?)
}

/// Read the horizon from the time series CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A [`Horizon`] with one step per row of the file.
pub fn read_horizon(model_dir: &Path) -> Result<Horizon> {
    let file_path = model_dir.join(TIME_SERIES_FILE_NAME);
    let rows = read_csv(&file_path)?;
    read_horizon_from_rows(rows).with_context(|| input_err_msg(&file_path))
}
