//! Code for performing the dispatch optimisation and reading back its results.
use crate::dispatch::{LinearProgram, VariableFamily, build_linear_program};
use crate::model::Model;
use crate::solver::{LpSolver, SolveFailure};
use crate::units::{Energy, Money, MoneyPerEnergy, Power};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// Largest constraint violation in a returned solution before a warning is raised
const FEASIBILITY_TOLERANCE: f64 = 1e-5;

/// The scheduled flows and storage levels for a single hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyDispatch {
    /// Index of the hour, starting at zero
    pub hour: usize,
    /// Power bought from the grid
    pub grid_import: Power,
    /// Power sold to the grid
    pub grid_export: Power,
    /// Power consumed by the electrolyzer
    pub electrolyzer: Power,
    /// Power produced by the fuel cell
    pub fuel_cell: Power,
    /// Hydrogen storage level at the end of the hour
    pub hydrogen_level: Energy,
    /// Net ESD power
    pub esd_power: Power,
    /// ESD level at the end of the hour
    pub esd_level: Energy,
}

impl HourlyDispatch {
    /// The net cost of trading with the grid in this hour
    pub fn grid_cost(&self, price: MoneyPerEnergy) -> Money {
        (self.grid_import - self.grid_export).over_step() * price
    }
}

/// An optimal dispatch schedule
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    objective: Money,
    hours: Vec<HourlyDispatch>,
}

impl Solution {
    /// Read the schedule out of the solver's variable values
    fn from_values(program: &LinearProgram, values: &[f64]) -> Self {
        let value = |family, hour| values[program.variable_index(family, hour)];
        let hours = (0..program.num_hours())
            .map(|hour| HourlyDispatch {
                hour,
                grid_import: Power(value(VariableFamily::GridImport, hour)),
                grid_export: Power(value(VariableFamily::GridExport, hour)),
                electrolyzer: Power(value(VariableFamily::Electrolyzer, hour)),
                fuel_cell: Power(value(VariableFamily::FuelCell, hour)),
                hydrogen_level: Energy(value(VariableFamily::HydrogenLevel, hour)),
                esd_power: Power(value(VariableFamily::EsdPower, hour)),
                esd_level: Energy(value(VariableFamily::EsdLevel, hour)),
            })
            .collect();

        Self {
            objective: Money(program.objective_value(values)),
            hours,
        }
    }

    /// The net cost of energy bought from the grid
    pub fn objective(&self) -> Money {
        self.objective
    }

    /// The schedule for each hour, in order
    pub fn hours(&self) -> &[HourlyDispatch] {
        &self.hours
    }
}

/// The outcome of a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum SolveStatus {
    /// An optimal solution was found
    Optimal,
    /// The constraints cannot all be satisfied
    Infeasible,
    /// The objective has no lower bound
    Unbounded,
    /// The solver failed
    SolverError,
}

/// The result of the dispatch optimisation
#[derive(Debug, Clone, PartialEq)]
pub enum OptimisationResult {
    /// The optimal schedule
    Optimal(Solution),
    /// The solver proved that no schedule satisfies the constraints
    Infeasible,
    /// The solver found that the cost can be made arbitrarily small
    Unbounded,
    /// The solver failed, with a description of why
    SolverError(String),
}

/// Errors for dispatch runs which did not produce a schedule
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispatchError {
    /// No schedule satisfies the constraints. The inputs need to be relaxed.
    #[error("The dispatch problem is infeasible: no schedule satisfies all the constraints")]
    InfeasibleModel,
    /// The objective is unbounded
    #[error("The dispatch problem is unbounded")]
    UnboundedModel,
    /// The solver failed
    #[error("The solver failed: {0}")]
    SolverExecution(String),
}

impl OptimisationResult {
    /// The status of the solve
    pub fn status(&self) -> SolveStatus {
        match self {
            Self::Optimal(_) => SolveStatus::Optimal,
            Self::Infeasible => SolveStatus::Infeasible,
            Self::Unbounded => SolveStatus::Unbounded,
            Self::SolverError(_) => SolveStatus::SolverError,
        }
    }

    /// The solution, if one was found
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Self::Optimal(solution) => Some(solution),
            _ => None,
        }
    }

    /// Get the solution, treating any other outcome as an error
    pub fn into_solution(self) -> Result<Solution, DispatchError> {
        match self {
            Self::Optimal(solution) => Ok(solution),
            Self::Infeasible => Err(DispatchError::InfeasibleModel),
            Self::Unbounded => Err(DispatchError::UnboundedModel),
            Self::SolverError(message) => Err(DispatchError::SolverExecution(message)),
        }
    }
}

/// Perform the dispatch optimisation.
///
/// # Arguments
///
/// * `model` - The model
/// * `solver` - The solver to use
///
/// # Returns
///
/// The optimal schedule or the reason why there isn't one.
pub fn perform_dispatch_optimisation<S: LpSolver + ?Sized>(
    model: &Model,
    solver: &S,
) -> OptimisationResult {
    let program = build_linear_program(model);
    solve_linear_program(&program, solver)
}

/// Solve an already-built dispatch problem
pub fn solve_linear_program<S: LpSolver + ?Sized>(
    program: &LinearProgram,
    solver: &S,
) -> OptimisationResult {
    let values = match solver.minimise(program) {
        Ok(values) => values,
        Err(SolveFailure::Infeasible) => return OptimisationResult::Infeasible,
        Err(SolveFailure::Unbounded) => return OptimisationResult::Unbounded,
        Err(SolveFailure::Error(message)) => return OptimisationResult::SolverError(message),
    };

    if values.len() != program.num_variables() {
        return OptimisationResult::SolverError(format!(
            "Solver returned {} values for {} variables",
            values.len(),
            program.num_variables()
        ));
    }

    let violation = program.max_violation(&values);
    if violation > FEASIBILITY_TOLERANCE {
        warn!("Solution violates a constraint by {violation}");
    }

    let solution = Solution::from_values(program, &values);
    info!("Optimal net grid cost: {:.2}", solution.objective().value());

    OptimisationResult::Optimal(solution)
}
