//! Formulation of the dispatch problem as a linear program.
//!
//! The formulation is a pure function of a [`Model`]: [`build_linear_program`] returns an immutable
//! [`LinearProgram`] which can be inspected without a solver and then handed to any
//! [`LpSolver`](crate::solver::LpSolver).
//!
//! There is one decision variable per hour for each [`VariableFamily`], and the objective is the
//! net cost of grid purchases, with the spot price used for both buying and selling:
//!
//! ```text
//! minimise  sum_t (grid_import[t] - grid_export[t]) * price[t]
//! ```
use crate::model::Model;
use indexmap::IndexMap;
use serde::Serialize;
use std::ops::RangeInclusive;
use strum::{Display, EnumIter, IntoEnumIterator};

pub mod constraints;
pub use constraints::{Constraint, ConstraintKind};

/// Position of a variable in a [`LinearProgram`] (and in a solver's solution vector)
pub type VariableIndex = usize;

/// The kinds of decision variable in the problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VariableFamily {
    /// Power bought from the grid
    GridImport,
    /// Power sold to the grid
    GridExport,
    /// Power consumed by the electrolyzer
    Electrolyzer,
    /// Power produced by the fuel cell
    FuelCell,
    /// Energy held in hydrogen storage at the end of the hour
    HydrogenLevel,
    /// Net power of the ESD (positive values raise its level)
    EsdPower,
    /// Energy held in the ESD at the end of the hour
    EsdLevel,
}

/// Identifies a single decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableKey {
    /// Which kind of variable
    pub family: VariableFamily,
    /// The hour the variable applies to
    pub hour: usize,
}

/// The bounds and objective coefficient of a decision variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    /// Permitted values. Infinite ends mean the variable is unbounded in that direction.
    pub bounds: RangeInclusive<f64>,
    /// The coefficient of the variable in the objective
    pub cost: f64,
}

/// A map for easy lookup of variables in the problem.
///
/// The entries are ordered (see [`IndexMap`]) and the position of an entry is its
/// [`VariableIndex`].
#[derive(Debug, Default)]
pub struct VariableMap(IndexMap<VariableKey, VariableDefinition>);

impl VariableMap {
    /// Get the index of the variable for the given family and hour
    pub fn get(&self, family: VariableFamily, hour: usize) -> VariableIndex {
        self.0
            .get_index_of(&VariableKey { family, hour })
            .expect("No variable found for given params")
    }

    fn insert(&mut self, key: VariableKey, definition: VariableDefinition) {
        let existing = self.0.insert(key, definition).is_some();
        assert!(!existing, "Duplicate entry for var");
    }
}

/// A linear program for dispatch, ready to be solved
#[derive(Debug)]
pub struct LinearProgram {
    variables: VariableMap,
    constraints: Vec<Constraint>,
    num_hours: usize,
}

impl LinearProgram {
    /// Iterate over the variables in index order
    pub fn iter_variables(&self) -> impl Iterator<Item = (&VariableKey, &VariableDefinition)> {
        self.variables.0.iter()
    }

    /// The number of decision variables
    pub fn num_variables(&self) -> usize {
        self.variables.0.len()
    }

    /// The number of hours covered by the problem
    pub fn num_hours(&self) -> usize {
        self.num_hours
    }

    /// Get the index of the variable for the given family and hour
    pub fn variable_index(&self, family: VariableFamily, hour: usize) -> VariableIndex {
        self.variables.get(family, hour)
    }

    /// The constraints, in the order they were added
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Evaluate the objective function for the given variable values
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        assert_eq!(values.len(), self.num_variables(), "Wrong number of values");
        self.variables
            .0
            .values()
            .zip(values)
            .map(|(definition, value)| definition.cost * value)
            .sum()
    }

    /// The largest amount by which any bound or constraint is violated by the given values.
    ///
    /// This is zero for a feasible assignment.
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        assert_eq!(values.len(), self.num_variables(), "Wrong number of values");
        let bound_violations = self
            .variables
            .0
            .values()
            .zip(values)
            .map(|(definition, &value)| range_violation(&definition.bounds, value));
        let row_violations = self
            .constraints
            .iter()
            .map(|constraint| range_violation(&constraint.bounds, constraint.activity(values)));

        bound_violations.chain(row_violations).fold(0.0, f64::max)
    }
}

/// How far `value` lies outside `range`
fn range_violation(range: &RangeInclusive<f64>, value: f64) -> f64 {
    (range.start() - value).max(value - range.end()).max(0.0)
}

/// Build the dispatch problem for a model.
///
/// Variables are added for every family and hour (family by family), then the constraints from
/// [`constraints::add_dispatch_constraints`].
pub fn build_linear_program(model: &Model) -> LinearProgram {
    let variables = add_variables(model);
    let mut constraints = Vec::new();
    constraints::add_dispatch_constraints(&mut constraints, &variables, model);

    LinearProgram {
        variables,
        constraints,
        num_hours: model.horizon().num_hours(),
    }
}

#[cfg(test)]
impl LinearProgram {
    /// Add an extra row after the ones built from the model
    pub(crate) fn push_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }
}

/// Add a variable for every family and hour
fn add_variables(model: &Model) -> VariableMap {
    let params = model.parameters();
    let h2 = &params.hydrogen_storage;
    let esd = &params.esd;

    let mut variables = VariableMap::default();
    for family in VariableFamily::iter() {
        for input in model.horizon().iter() {
            let price = input.price.value();
            let (bounds, cost) = match family {
                VariableFamily::GridImport => (0.0..=f64::INFINITY, price),
                VariableFamily::GridExport => (0.0..=f64::INFINITY, -price),
                VariableFamily::Electrolyzer | VariableFamily::FuelCell => {
                    (0.0..=f64::INFINITY, 0.0)
                }
                VariableFamily::HydrogenLevel => (h2.min_level.value()..=h2.max_level.value(), 0.0),
                // Limited by the ESD power constraints instead
                VariableFamily::EsdPower => (f64::NEG_INFINITY..=f64::INFINITY, 0.0),
                VariableFamily::EsdLevel => (esd.min_level.value()..=esd.max_level.value(), 0.0),
            };

            variables.insert(
                VariableKey {
                    family,
                    hour: input.hour,
                },
                VariableDefinition { bounds, cost },
            );
        }
    }

    variables
}
