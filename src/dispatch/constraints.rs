//! Code for adding constraints to the dispatch problem.
//!
//! Each constraint is a row of the form `lower <= a1*x1 + a2*x2 + ... <= upper`. Equalities have
//! `lower == upper` and one-sided constraints use an infinite bound.
use super::{VariableFamily, VariableIndex, VariableMap};
use crate::model::Model;
use serde::Serialize;
use std::ops::RangeInclusive;
use strum::{Display, EnumIter};

/// The kinds of constraint in the problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Supply equals demand
    PowerBalance,
    /// Hydrogen level follows from the previous level and the electrolyzer/fuel cell flows
    HydrogenTransition,
    /// ESD level follows from the previous level and the ESD power
    EsdTransition,
    /// ESD power is limited by the headroom above the minimum and below the maximum level
    EsdPowerLimit,
    /// Export is limited by PV and the stored energy above the minimum levels
    ExportLimit,
    /// Export is forbidden as the price is at or below the threshold
    NoExport,
}

/// A single constraint (row) in the problem
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// What the constraint represents
    pub kind: ConstraintKind,
    /// The hour the constraint applies to
    pub hour: usize,
    /// Permitted values for the weighted sum of the terms
    pub bounds: RangeInclusive<f64>,
    /// Variables and their coefficients
    pub terms: Vec<(VariableIndex, f64)>,
}

impl Constraint {
    /// The value of the weighted sum of the terms for the given variable values
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(index, coeff)| coeff * values[index])
            .sum()
    }

    /// Whether this is an equality constraint
    pub fn is_equality(&self) -> bool {
        self.bounds.start() == self.bounds.end()
    }
}

/// Add all the constraints for the dispatch problem.
///
/// Constraints are grouped by kind and, within each kind, ordered by hour.
///
/// # Arguments
///
/// * `constraints` - Where the new constraints are appended
/// * `variables` - The variables in the problem
/// * `model` - The model
pub fn add_dispatch_constraints(
    constraints: &mut Vec<Constraint>,
    variables: &VariableMap,
    model: &Model,
) {
    add_power_balance_constraints(constraints, variables, model);
    add_hydrogen_transition_constraints(constraints, variables, model);
    add_esd_constraints(constraints, variables, model);
    add_export_constraints(constraints, variables, model);
}

/// Add the power balance for every hour:
///
/// `import + fuel_cell - export - electrolyzer + esd_power = demand - pv`
fn add_power_balance_constraints(
    constraints: &mut Vec<Constraint>,
    variables: &VariableMap,
    model: &Model,
) {
    for input in model.horizon().iter() {
        let t = input.hour;
        let rhs = (input.demand - input.pv).value();
        constraints.push(Constraint {
            kind: ConstraintKind::PowerBalance,
            hour: t,
            bounds: rhs..=rhs,
            terms: vec![
                (variables.get(VariableFamily::GridImport, t), 1.0),
                (variables.get(VariableFamily::FuelCell, t), 1.0),
                (variables.get(VariableFamily::GridExport, t), -1.0),
                (variables.get(VariableFamily::Electrolyzer, t), -1.0),
                (variables.get(VariableFamily::EsdPower, t), 1.0),
            ],
        });
    }
}

/// Add the hydrogen storage transitions:
///
/// `level[t] - eta_e * electrolyzer[t] + fuel_cell[t] / eta_f - level[t-1] = 0`
///
/// In the first hour, the previous level is the (constant) initial level, so it moves to the
/// right-hand side.
fn add_hydrogen_transition_constraints(
    constraints: &mut Vec<Constraint>,
    variables: &VariableMap,
    model: &Model,
) {
    let params = model.parameters();
    let eta_e = params.electrolyzer_efficiency.value();
    let eta_f = params.fuel_cell_efficiency.value();
    let initial = params.hydrogen_storage.initial_level.value();

    for t in 0..model.horizon().num_hours() {
        let mut terms = vec![
            (variables.get(VariableFamily::HydrogenLevel, t), 1.0),
            (variables.get(VariableFamily::Electrolyzer, t), -eta_e),
            (variables.get(VariableFamily::FuelCell, t), 1.0 / eta_f),
        ];
        let rhs = if t == 0 {
            initial
        } else {
            terms.push((variables.get(VariableFamily::HydrogenLevel, t - 1), -1.0));
            0.0
        };

        constraints.push(Constraint {
            kind: ConstraintKind::HydrogenTransition,
            hour: t,
            bounds: rhs..=rhs,
            terms,
        });
    }
}

/// Add the ESD transitions and power limits.
///
/// The transition is `level[t] - esd_power[t] - level[t-1] = 0` and the power limit is
/// `-(level[t-1] - min) <= esd_power[t] <= max - level[t-1]`, which is added as the single row
/// `min <= esd_power[t] + level[t-1] <= max`. As with hydrogen, the initial level is a constant.
fn add_esd_constraints(
    constraints: &mut Vec<Constraint>,
    variables: &VariableMap,
    model: &Model,
) {
    let esd = &model.parameters().esd;
    let initial = esd.initial_level.value();
    let min = esd.min_level.value();
    let max = esd.max_level.value();
    let num_hours = model.horizon().num_hours();

    for t in 0..num_hours {
        let level = variables.get(VariableFamily::EsdLevel, t);
        let power = variables.get(VariableFamily::EsdPower, t);
        let (terms, rhs) = if t == 0 {
            (vec![(level, 1.0), (power, -1.0)], initial)
        } else {
            let previous = variables.get(VariableFamily::EsdLevel, t - 1);
            (vec![(level, 1.0), (power, -1.0), (previous, -1.0)], 0.0)
        };

        constraints.push(Constraint {
            kind: ConstraintKind::EsdTransition,
            hour: t,
            bounds: rhs..=rhs,
            terms,
        });
    }

    for t in 0..num_hours {
        let power = variables.get(VariableFamily::EsdPower, t);
        let (terms, bounds) = if t == 0 {
            (vec![(power, 1.0)], (min - initial)..=(max - initial))
        } else {
            let previous = variables.get(VariableFamily::EsdLevel, t - 1);
            (vec![(power, 1.0), (previous, 1.0)], min..=max)
        };

        constraints.push(Constraint {
            kind: ConstraintKind::EsdPowerLimit,
            hour: t,
            bounds,
            terms,
        });
    }
}

/// Add one export constraint for every hour.
///
/// Whether export is allowed depends only on the (known) price, so the choice between the two forms
/// is made here rather than by the solver:
///
/// * price above threshold: `export - h2_level - esd_level <= pv - h2_min - esd_min`
/// * otherwise: `export = 0`
fn add_export_constraints(
    constraints: &mut Vec<Constraint>,
    variables: &VariableMap,
    model: &Model,
) {
    let params = model.parameters();
    let h2_min = params.hydrogen_storage.min_level.value();
    let esd_min = params.esd.min_level.value();

    for input in model.horizon().iter() {
        let t = input.hour;
        let export = variables.get(VariableFamily::GridExport, t);
        let constraint = if params.export_allowed(input.price) {
            Constraint {
                kind: ConstraintKind::ExportLimit,
                hour: t,
                bounds: f64::NEG_INFINITY..=(input.pv.value() - h2_min - esd_min),
                terms: vec![
                    (export, 1.0),
                    (variables.get(VariableFamily::HydrogenLevel, t), -1.0),
                    (variables.get(VariableFamily::EsdLevel, t), -1.0),
                ],
            }
        } else {
            Constraint {
                kind: ConstraintKind::NoExport,
                hour: t,
                bounds: 0.0..=0.0,
                terms: vec![(export, 1.0)],
            }
        };

        constraints.push(constraint);
    }
}
