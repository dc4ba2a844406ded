//! The interface to the external LP solver.
//!
//! The formulation only talks to solvers through [`LpSolver`], so other backends can be swapped in
//! without touching it. [`HighsSolver`] is the default backend, using the HiGHS solver.
use crate::dispatch::LinearProgram;
use anyhow::{Result, ensure};
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use log::debug;
use serde::Deserialize;
use thiserror::Error;

/// Why a solver did not return an optimal solution
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SolveFailure {
    /// No assignment satisfies all the constraints
    #[error("The problem is infeasible")]
    Infeasible,
    /// The objective can be made arbitrarily small
    #[error("The problem is unbounded")]
    Unbounded,
    /// The solver itself failed, or stopped before reaching optimality
    #[error("Solver failure: {0}")]
    Error(String),
}

/// Something which can minimise a [`LinearProgram`]
pub trait LpSolver {
    /// Minimise the objective of `problem` subject to its bounds and constraints.
    ///
    /// # Returns
    ///
    /// The value of each variable, in the order of [`LinearProgram::iter_variables`].
    fn minimise(&self, problem: &LinearProgram) -> Result<Vec<f64>, SolveFailure>;
}

/// Options passed through to the solver
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverOptions {
    /// Maximum wall-clock time for the solve, in seconds
    pub time_limit: Option<f64>,
    /// Maximum number of simplex iterations
    pub iteration_limit: Option<i32>,
}

impl SolverOptions {
    /// Check that any limits given are positive
    pub fn validate(&self) -> Result<()> {
        if let Some(time_limit) = self.time_limit {
            ensure!(
                time_limit.is_finite() && time_limit > 0.0,
                "time_limit must be a finite number greater than zero"
            );
        }

        if let Some(iteration_limit) = self.iteration_limit {
            ensure!(iteration_limit > 0, "iteration_limit must be greater than zero");
        }

        Ok(())
    }
}

/// Solves problems with HiGHS
#[derive(Debug, Default)]
pub struct HighsSolver {
    options: SolverOptions,
}

impl HighsSolver {
    /// Create a new [`HighsSolver`] with the given options
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    /// Apply user options and logging settings to a HiGHS model
    fn configure(&self, model: &mut highs::Model) {
        if let Some(time_limit) = self.options.time_limit {
            model.set_option("time_limit", time_limit);
        }

        if let Some(iteration_limit) = self.options.iteration_limit {
            model.set_option("simplex_iteration_limit", iteration_limit);
        }

        // HiGHS output bypasses the logger and goes straight to stdout
        if log::log_enabled!(log::Level::Debug) {
            model.set_option("output_flag", true);
            model.set_option("log_to_console", true);
        }
    }
}

impl LpSolver for HighsSolver {
    fn minimise(&self, problem: &LinearProgram) -> Result<Vec<f64>, SolveFailure> {
        let mut highs_problem = Problem::default();

        let columns: Vec<_> = problem
            .iter_variables()
            .map(|(_, definition)| {
                highs_problem.add_column(definition.cost, definition.bounds.clone())
            })
            .collect();

        for constraint in problem.constraints() {
            highs_problem.add_row(
                constraint.bounds.clone(),
                constraint
                    .terms
                    .iter()
                    .map(|&(index, coeff)| (columns[index], coeff)),
            );
        }

        debug!(
            "Solving problem with {} columns and {} rows",
            columns.len(),
            problem.constraints().len()
        );

        let mut model = highs_problem.optimise(Sense::Minimise);
        self.configure(&mut model);

        // The HiGHS instance is freed when `solved` (or `model`, on error) goes out of scope
        let solved = model
            .try_solve()
            .map_err(|status| SolveFailure::Error(format!("HiGHS could not run: {status:?}")))?;

        match solved.status() {
            HighsModelStatus::Optimal => Ok(solved.get_solution().columns().to_vec()),
            HighsModelStatus::Infeasible => Err(SolveFailure::Infeasible),
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                Err(SolveFailure::Unbounded)
            }
            status => Err(SolveFailure::Error(format!(
                "HiGHS finished with status {status:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Constraint, ConstraintKind, VariableFamily, build_linear_program};
    use crate::fixture::model;
    use crate::model::Model;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(SolverOptions::default(), true)]
    #[case(SolverOptions { time_limit: Some(10.0), iteration_limit: Some(1000) }, true)]
    #[case(SolverOptions { time_limit: Some(0.0), iteration_limit: None }, false)]
    #[case(SolverOptions { time_limit: Some(f64::NAN), iteration_limit: None }, false)]
    #[case(SolverOptions { time_limit: None, iteration_limit: Some(0) }, false)]
    fn test_solver_options_validate(#[case] options: SolverOptions, #[case] expected_valid: bool) {
        assert_eq!(options.validate().is_ok(), expected_valid);
    }

    #[test]
    fn test_solver_options_deserialise() {
        let options: SolverOptions = toml::from_str("time_limit = 5.0").unwrap();
        assert_eq!(
            options,
            SolverOptions {
                time_limit: Some(5.0),
                iteration_limit: None
            }
        );
        assert!(toml::from_str::<SolverOptions>("threads = 2").is_err());
    }

    #[rstest]
    fn test_highs_minimise(model: Model) {
        let program = build_linear_program(&model);
        let values = HighsSolver::default().minimise(&program).unwrap();
        assert_eq!(values.len(), program.num_variables());
        assert!(program.max_violation(&values) < 1e-5);

        // Export is forbidden in the first hour
        let export = values[program.variable_index(VariableFamily::GridExport, 0)];
        assert_approx_eq!(f64, export, 0.0, epsilon = 1e-9);
    }

    #[rstest]
    fn test_highs_minimise_infeasible(model: Model) {
        // Export is pinned to zero in the first hour, so requiring some makes the rows contradict
        let mut program = build_linear_program(&model);
        let export = program.variable_index(VariableFamily::GridExport, 0);
        program.push_constraint(Constraint {
            kind: ConstraintKind::ExportLimit,
            hour: 0,
            bounds: 1.0..=f64::INFINITY,
            terms: vec![(export, 1.0)],
        });
        assert_eq!(
            HighsSolver::default().minimise(&program),
            Err(SolveFailure::Infeasible)
        );
    }

    #[rstest]
    fn test_highs_minimise_with_options(model: Model) {
        let program = build_linear_program(&model);
        let options = SolverOptions {
            time_limit: Some(60.0),
            iteration_limit: Some(100_000),
        };
        let with_options = HighsSolver::new(options).minimise(&program).unwrap();
        let without = HighsSolver::default().minimise(&program).unwrap();
        assert_approx_eq!(
            f64,
            program.objective_value(&with_options),
            program.objective_value(&without),
            epsilon = 1e-6
        );
    }
}
