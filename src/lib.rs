//! Optimal dispatch of a grid-connected microgrid with hydrogen and battery storage.
//!
//! A [`Model`](model::Model) describes the hourly PV output, demand and spot price along with the
//! storage devices. [`build_linear_program`](dispatch::build_linear_program) turns it into a linear
//! program, which is solved by an [`LpSolver`](solver::LpSolver) to give the schedule with the
//! lowest net cost of grid trading.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod dispatch;
pub mod input;
pub mod log;
pub mod model;
pub mod optimisation;
pub mod output;
pub mod settings;
pub mod solver;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the path to the folder where program configuration is stored
pub fn get_h2grid_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        // No config directory on this platform, so use the current directory
        return PathBuf::new();
    };
    config_dir.push("h2grid");

    config_dir
}
