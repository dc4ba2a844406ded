//! Small hand-checked dispatch problems solved with HiGHS.
use float_cmp::assert_approx_eq;
use h2grid::model::{Horizon, Model, StorageParameters, SystemParameters};
use h2grid::optimisation::{OptimisationResult, SolveStatus, perform_dispatch_optimisation};
use h2grid::solver::HighsSolver;
use h2grid::units::{Dimensionless, Energy, MoneyPerEnergy, Power};

const TOLERANCE: f64 = 1e-6;

/// Storage which cannot move away from `level`
fn pinned_storage(level: f64) -> StorageParameters {
    StorageParameters::new(Energy(level), Energy(level), Energy(level))
}

fn parameters(
    hydrogen_storage: StorageParameters,
    esd: StorageParameters,
    threshold_price: f64,
) -> SystemParameters {
    SystemParameters {
        hydrogen_storage,
        esd,
        electrolyzer_efficiency: Dimensionless(0.8),
        fuel_cell_efficiency: Dimensionless(0.7),
        threshold_price: MoneyPerEnergy(threshold_price),
    }
}

fn horizon(pv: &[f64], demand: &[f64], price: &[f64]) -> Horizon {
    Horizon::new(
        pv.len(),
        pv.iter().copied().map(Power).collect(),
        demand.iter().copied().map(Power).collect(),
        price.iter().copied().map(MoneyPerEnergy).collect(),
    )
    .unwrap()
}

fn solve(horizon: Horizon, parameters: SystemParameters) -> OptimisationResult {
    let model = Model::new(horizon, parameters).unwrap();
    perform_dispatch_optimisation(&model, &HighsSolver::default())
}

/// With nothing to supply and nothing worth selling, nothing happens
#[test]
fn test_idle_system() {
    let result = solve(
        horizon(&[0.0; 3], &[0.0; 3], &[0.1; 3]),
        parameters(pinned_storage(100.0), pinned_storage(50.0), 0.18),
    );
    let solution = result.into_solution().unwrap();
    assert_approx_eq!(f64, solution.objective().value(), 0.0, epsilon = TOLERANCE);

    for hour in solution.hours() {
        assert_approx_eq!(f64, hour.grid_import.value(), 0.0, epsilon = TOLERANCE);
        assert_approx_eq!(f64, hour.grid_export.value(), 0.0, epsilon = TOLERANCE);
        assert_approx_eq!(f64, hour.electrolyzer.value(), 0.0, epsilon = TOLERANCE);
        assert_approx_eq!(f64, hour.fuel_cell.value(), 0.0, epsilon = TOLERANCE);
        assert_approx_eq!(f64, hour.esd_power.value(), 0.0, epsilon = TOLERANCE);
        assert_approx_eq!(f64, hour.hydrogen_level.value(), 100.0, epsilon = TOLERANCE);
        assert_approx_eq!(f64, hour.esd_level.value(), 50.0, epsilon = TOLERANCE);
    }
}

/// Demand with no PV or usable storage is met entirely from the grid
#[test]
fn test_demand_met_by_import() {
    let result = solve(
        horizon(&[0.0], &[100.0], &[0.1]),
        parameters(pinned_storage(100.0), pinned_storage(50.0), 0.05),
    );
    assert_eq!(result.status(), SolveStatus::Optimal);

    let solution = result.into_solution().unwrap();
    let hour = solution.hours()[0];
    assert_approx_eq!(f64, hour.grid_import.value(), 100.0, epsilon = TOLERANCE);
    assert_approx_eq!(f64, hour.grid_export.value(), 0.0, epsilon = TOLERANCE);
    assert_approx_eq!(f64, solution.objective().value(), 10.0, epsilon = TOLERANCE);
}

/// A surplus too large to store is burnt off by running the electrolyzer and fuel cell together
#[test]
fn test_large_surplus_is_absorbed() {
    let result = solve(
        horizon(&[10_000.0], &[0.0], &[0.1]),
        parameters(
            StorageParameters::new(Energy(100.0), Energy(1000.0), Energy(100.0)),
            StorageParameters::new(Energy(50.0), Energy(500.0), Energy(50.0)),
            0.18,
        ),
    );
    assert_eq!(result.status(), SolveStatus::Optimal);

    let solution = result.into_solution().unwrap();
    assert_approx_eq!(f64, solution.objective().value(), 0.0, epsilon = TOLERANCE);

    let hour = solution.hours()[0];
    assert_approx_eq!(f64, hour.grid_export.value(), 0.0, epsilon = TOLERANCE);
    assert!(hour.hydrogen_level.value() <= 1000.0 + TOLERANCE);
    assert!(hour.esd_level.value() <= 500.0 + TOLERANCE);
}

/// Buying at a negative price is always worthwhile, as the surplus can be burnt off
#[test]
fn test_negative_price_is_unbounded() {
    let result = solve(
        horizon(&[0.0, 0.0], &[100.0, 100.0], &[0.1, -0.1]),
        parameters(
            StorageParameters::new(Energy(100.0), Energy(1000.0), Energy(100.0)),
            StorageParameters::new(Energy(50.0), Energy(500.0), Energy(50.0)),
            0.18,
        ),
    );
    assert_eq!(result.status(), SolveStatus::Unbounded);
    assert_eq!(result, OptimisationResult::Unbounded);
    assert!(result.solution().is_none());
}

/// Surplus PV is stored as hydrogen when it cannot be sold
#[test]
fn test_surplus_stored_as_hydrogen() {
    let result = solve(
        horizon(&[200.0], &[100.0], &[0.1]),
        parameters(
            StorageParameters::new(Energy(0.0), Energy(1000.0), Energy(0.0)),
            pinned_storage(50.0),
            0.18,
        ),
    );
    let solution = result.into_solution().unwrap();
    assert_approx_eq!(f64, solution.objective().value(), 0.0, epsilon = TOLERANCE);

    let hour = solution.hours()[0];
    assert_approx_eq!(f64, hour.grid_export.value(), 0.0, epsilon = TOLERANCE);
    assert_approx_eq!(f64, hour.grid_import.value(), 0.0, epsilon = TOLERANCE);

    // The electrolyzer takes the surplus, net of anything run back through the fuel cell
    let electrolyzer = hour.electrolyzer.value();
    let fuel_cell = hour.fuel_cell.value();
    assert_approx_eq!(f64, electrolyzer - fuel_cell, 100.0, epsilon = TOLERANCE);
    assert_approx_eq!(
        f64,
        hour.hydrogen_level.value(),
        0.8 * electrolyzer - fuel_cell / 0.7,
        epsilon = TOLERANCE
    );
}

/// Surplus PV is sold when the price is above the threshold
#[test]
fn test_surplus_exported() {
    let result = solve(
        horizon(&[200.0], &[100.0], &[0.3]),
        parameters(pinned_storage(100.0), pinned_storage(50.0), 0.18),
    );
    let solution = result.into_solution().unwrap();
    assert_approx_eq!(f64, solution.objective().value(), -30.0, epsilon = TOLERANCE);

    // Buying and selling at the same price cancel out, so only the net flow is fixed
    let hour = solution.hours()[0];
    let net_export = hour.grid_export.value() - hour.grid_import.value();
    assert_approx_eq!(f64, net_export, 100.0, epsilon = TOLERANCE);
}
