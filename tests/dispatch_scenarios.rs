//! End-to-end build-solve-report scenarios for both formulations

use open_energy_planner::domain::{
    ControllablePlant, ExportMarket, PartialLoadCurve, RenewableSource, Scenario, TimeSeries,
    Timeline, UnitCommitment,
};
use open_energy_planner::optimizer::{DispatchOptimizer, Formulation, VERIFY_TOLERANCE};
use open_energy_planner::report::{transitions, DispatchReport};
use open_energy_planner::{ConfigurationError, ModelError};

const TOL: f64 = 1e-6;

struct Plant {
    efficiency_min: f64,
    efficiency_max: f64,
    partial_load_min: f64,
    investment_cost: f64,
    fuel_cost: f64,
    startup_cost: f64,
}

impl Default for Plant {
    fn default() -> Self {
        Self {
            efficiency_min: 0.5,
            efficiency_max: 0.5,
            partial_load_min: 0.0,
            investment_cost: 1.0,
            fuel_cost: 3.0,
            startup_cost: 0.0,
        }
    }
}

fn scenario(
    formulation: Formulation,
    demand: &[f64],
    capacity_factor: &[f64],
    plant: Plant,
    unit: Option<UnitCommitment>,
) -> Scenario {
    let timeline = Timeline::new(demand.len(), 1.0).unwrap();
    let curve =
        PartialLoadCurve::new(plant.efficiency_min, plant.efficiency_max, plant.partial_load_min)
            .unwrap();
    Scenario {
        formulation,
        demand: TimeSeries::try_new("demand", &timeline, demand.to_vec()).unwrap(),
        renewable: RenewableSource::new(
            1.0,
            TimeSeries::try_new("capacity_factor", &timeline, capacity_factor.to_vec()).unwrap(),
        ),
        plant: ControllablePlant::new(
            plant.investment_cost,
            plant.fuel_cost,
            plant.startup_cost,
            curve,
        ),
        commitment: unit,
        export: None,
        timeline,
    }
}

fn solve(scenario: &Scenario) -> DispatchReport {
    let report = DispatchOptimizer::default()
        .optimize(scenario)
        .expect("scenario should solve");
    let violations = report.violations(VERIFY_TOLERANCE);
    assert!(violations.is_empty(), "invariants violated: {violations:?}");
    report
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < TOL,
        "{what}: expected {expected}, got {actual}"
    );
}

fn events(report: &DispatchReport) -> (Vec<bool>, Vec<bool>) {
    (
        report.entries.iter().map(|e| e.startup_event.unwrap()).collect(),
        report.entries.iter().map(|e| e.shutdown_event.unwrap()).collect(),
    )
}

#[test]
fn flat_demand_burns_output_over_constant_efficiency() {
    let fuel_cost = 3.0;
    let s = scenario(
        Formulation::Binary,
        &[1.0, 1.0, 1.0],
        &[0.0, 0.0, 0.0],
        Plant { fuel_cost, ..Plant::default() },
        Some(UnitCommitment::new(2.0)),
    );

    let report = solve(&s);

    for entry in &report.entries {
        assert_close(entry.plant_output, 1.0, "output");
        assert_close(entry.fuel_input, entry.plant_output / 0.5, "fuel input");
        assert_close(entry.realized_efficiency.unwrap(), 0.5, "efficiency");
    }
    assert_close(report.costs.fuel, 2.0 * fuel_cost * 3.0, "fuel cost");
    assert_close(report.renewable_capacity, 0.0, "renewable capacity");
}

#[test]
fn continuous_and_binary_agree_on_fuel_cost() {
    let build = |formulation| {
        let mut s = scenario(
            formulation,
            &[1.0, 1.0, 1.0],
            &[0.0, 0.0, 0.0],
            Plant::default(),
            Some(UnitCommitment::new(2.0)),
        );
        s.plant.cold_start = false;
        s
    };

    let continuous = solve(&build(Formulation::Continuous));
    let binary = solve(&build(Formulation::Binary));

    assert_close(continuous.costs.fuel, binary.costs.fuel, "fuel cost");
    assert_close(continuous.plant_capacity, 1.0, "sized plant capacity");
    assert_eq!(continuous.formulation, Formulation::Continuous);
    assert_eq!(binary.formulation, Formulation::Binary);
}

#[test]
fn single_startup_is_counted_once() {
    let mut unit = UnitCommitment::new(2.0);
    unit.fixed_cost = 1.0;
    let s = scenario(
        Formulation::Binary,
        &[0.0, 1.0, 1.0],
        &[0.0, 0.0, 0.0],
        Plant { startup_cost: 1.0, ..Plant::default() },
        Some(unit),
    );

    let report = solve(&s);

    assert_eq!(report.commitment_states(), Some(vec![false, true, true]));
    assert_eq!(events(&report), (vec![false, true, false], vec![false, false, false]));
    assert_eq!(report.summary.startup_count, 1);
    // one start of a 2-unit plant at 1 per unit started
    assert_close(report.costs.startup, 2.0, "startup cost");
    assert_close(report.costs.fixed, 2.0, "fixed cost");
}

#[test]
fn unpenalized_shutdown_is_still_exact() {
    let mut unit = UnitCommitment::new(2.0);
    unit.fixed_cost = 10.0;
    let s = scenario(
        Formulation::Binary,
        &[1.0, 0.0, 1.0],
        &[0.0, 0.0, 0.0],
        Plant { startup_cost: 1.0, ..Plant::default() },
        Some(unit),
    );

    let report = solve(&s);

    let states = report.commitment_states().unwrap();
    assert_eq!(states, vec![true, false, true]);
    assert_eq!(events(&report), (vec![true, false, true], vec![false, true, false]));
    assert_eq!(report.summary.shutdown_count, 1);
    assert_close(report.costs.shutdown, 0.0, "shutdown cost");
}

#[test]
fn events_match_state_changes_without_any_event_cost() {
    let mut unit = UnitCommitment::new(3.0);
    unit.fixed_cost = 5.0;
    let s = scenario(
        Formulation::Binary,
        &[2.0, 0.0, 0.0, 1.0, 0.0],
        &[0.0; 5],
        Plant::default(),
        Some(unit),
    );

    let report = solve(&s);

    let states = report.commitment_states().unwrap();
    let expected = transitions(&states, false);
    for (entry, transition) in report.entries.iter().zip(expected) {
        assert_eq!(entry.startup_event, Some(transition.startup), "step {}", entry.step);
        assert_eq!(entry.shutdown_event, Some(transition.shutdown), "step {}", entry.step);
    }
}

#[test]
fn initially_online_unit_needs_no_startup() {
    let mut unit = UnitCommitment::new(2.0);
    unit.fixed_cost = 1.0;
    unit.initially_online = true;
    let s = scenario(
        Formulation::Binary,
        &[1.0, 1.0, 1.0],
        &[0.0, 0.0, 0.0],
        Plant { startup_cost: 1.0, ..Plant::default() },
        Some(unit),
    );

    let report = solve(&s);

    assert_eq!(report.commitment_states(), Some(vec![true, true, true]));
    assert_eq!(report.summary.startup_count, 0);
    assert_close(report.initial_online_capacity, 2.0, "initial online capacity");
}

/// Cold start at t1 (renewables only), ramp to 6, hold at minimum load, back to full load
fn partial_load_scenario() -> Scenario {
    scenario(
        Formulation::Continuous,
        &[2.0, 6.0, 6.0, 3.0, 6.0],
        &[1.0, 0.0, 0.0, 0.0, 0.0],
        Plant {
            efficiency_min: 0.4,
            efficiency_max: 0.5,
            partial_load_min: 0.5,
            investment_cost: 1.0,
            fuel_cost: 1.0,
            startup_cost: 1.0,
        },
        None,
    )
}

#[test]
fn startup_capacity_is_tight_on_increases() {
    let report = solve(&partial_load_scenario());

    let mut previous = 0.0;
    for entry in &report.entries {
        let increase = entry.online_capacity - previous;
        if increase > TOL {
            assert_close(entry.startup_capacity, increase, "startup capacity");
        }
        assert!(entry.startup_capacity + TOL >= increase.max(0.0));
        previous = entry.online_capacity;
    }
    assert_close(report.entries[0].online_capacity, 0.0, "cold start");
    assert_close(report.entries[1].startup_capacity, 6.0, "ramp-up");
    assert_eq!(report.summary.startup_count, 1);
    assert_close(report.renewable_capacity, 2.0, "renewable capacity");
}

#[test]
fn realized_efficiency_hits_both_anchors() {
    let report = solve(&partial_load_scenario());
    let (p, eff_min, eff_max) = (0.5, 0.4, 0.5);

    for entry in &report.entries {
        assert!(entry.plant_output >= p * entry.online_capacity - TOL);
        assert!(entry.plant_output <= entry.online_capacity + TOL);
    }

    // staying online through the dip is cheaper than restarting
    let dip = &report.entries[3];
    assert_close(dip.online_capacity, 6.0, "online capacity in dip");
    assert_close(dip.plant_output, p * dip.online_capacity, "minimum load output");
    assert_close(dip.realized_efficiency.unwrap(), eff_min, "minimum load efficiency");

    let full = &report.entries[4];
    assert_close(full.plant_output, full.online_capacity, "full load output");
    assert_close(full.realized_efficiency.unwrap(), eff_max, "full load efficiency");
}

#[test]
fn demand_is_always_met() {
    for formulation in [Formulation::Continuous, Formulation::Binary] {
        let mut s = partial_load_scenario().with_formulation(formulation);
        s.commitment = Some(UnitCommitment::new(8.0));

        let report = solve(&s);

        for entry in &report.entries {
            assert!(
                entry.renewable_output + entry.plant_output - entry.export >= entry.demand - TOL,
                "{formulation}: shortfall at step {}",
                entry.step
            );
        }
    }
}

#[test]
fn uncapped_export_gets_default_cap() {
    let mut s = scenario(
        Formulation::Continuous,
        &[1.0, 1.0, 1.0],
        &[1.0, 1.0, 1.0],
        Plant::default(),
        None,
    );
    s.export = Some(ExportMarket {
        price: 100.0,
        max_per_step: None,
    });

    let report = solve(&s);

    for entry in &report.entries {
        assert!(entry.export <= 1.0 + TOL, "export {} above peak demand", entry.export);
    }
    assert_close(report.summary.exported_energy, 3.0, "exported energy");
    assert_close(report.renewable_capacity, 2.0, "renewable capacity");
    assert_close(report.costs.export_revenue, 300.0, "export revenue");
    assert_close(report.objective, 2.0 - 300.0, "objective");
}

#[test]
fn infinite_export_cap_is_rejected_before_solving() {
    let mut s = scenario(
        Formulation::Continuous,
        &[1.0, 1.0],
        &[1.0, 1.0],
        Plant::default(),
        None,
    );
    s.export = Some(ExportMarket {
        price: 100.0,
        max_per_step: Some(f64::INFINITY),
    });

    assert_eq!(
        DispatchOptimizer::default().optimize(&s).unwrap_err(),
        ModelError::Configuration(ConfigurationError::UnboundedExport(f64::INFINITY))
    );
}

#[test]
fn cold_plant_without_renewables_is_infeasible() {
    let s = scenario(
        Formulation::Continuous,
        &[1.0, 1.0],
        &[0.0, 0.0],
        Plant::default(),
        None,
    );

    assert_eq!(
        DispatchOptimizer::default().optimize(&s).unwrap_err(),
        ModelError::Infeasible
    );
}

#[test]
fn negative_demand_is_a_configuration_error() {
    let s = scenario(
        Formulation::Continuous,
        &[1.0, -1.0],
        &[1.0, 1.0],
        Plant::default(),
        None,
    );

    assert!(matches!(
        DispatchOptimizer::default().optimize(&s),
        Err(ModelError::Configuration(ConfigurationError::Negative { name: "demand", .. }))
    ));
}

/// Renewables carry t1 and export a capped surplus at t2, the plant carries t3
fn weighted_scenario(formulation: Formulation, step_hours: f64) -> Scenario {
    let mut unit = UnitCommitment::new(2.0);
    unit.fixed_cost = 1.0;
    let mut s = scenario(
        formulation,
        &[2.0, 0.0, 2.0],
        &[1.0, 1.0, 0.0],
        Plant { startup_cost: 1.0, ..Plant::default() },
        Some(unit),
    );
    s.timeline = Timeline::new(3, step_hours).unwrap();
    s.export = Some(ExportMarket {
        price: 0.5,
        max_per_step: Some(1.0),
    });
    s
}

#[test]
fn energy_costs_scale_with_step_length() {
    for formulation in [Formulation::Continuous, Formulation::Binary] {
        let hourly = solve(&weighted_scenario(formulation, 1.0));
        let half = solve(&weighted_scenario(formulation, 0.5));

        // one step at 2 units of output and efficiency 0.5, fuel priced at 3
        assert_close(hourly.costs.fuel, 12.0, "hourly fuel");
        assert_close(hourly.costs.export_revenue, 0.5, "hourly export revenue");
        assert_close(half.costs.fuel, hourly.costs.fuel / 2.0, "fuel");
        assert_close(half.costs.fixed, hourly.costs.fixed / 2.0, "fixed");
        assert_close(
            half.costs.export_revenue,
            hourly.costs.export_revenue / 2.0,
            "export revenue",
        );

        assert_close(half.costs.startup, hourly.costs.startup, "startup");
        assert_close(half.costs.startup, 2.0, "startup");
        assert_close(
            half.costs.investment_renewable,
            hourly.costs.investment_renewable,
            "renewable investment",
        );
        assert_close(
            half.costs.investment_plant,
            hourly.costs.investment_plant,
            "plant investment",
        );
    }

    let binary = solve(&weighted_scenario(Formulation::Binary, 0.5));
    assert_close(binary.costs.fixed, 0.5, "binary fixed cost over one half-hour step");
}

fn renewable_first(cold_start: bool) -> Scenario {
    let mut s = scenario(
        Formulation::Continuous,
        &[2.0, 2.0],
        &[1.0, 1.0],
        Plant { investment_cost: 10.0, ..Plant::default() },
        None,
    );
    s.plant.cold_start = cold_start;
    s.renewable.max_capacity = Some(1.5);
    s
}

#[test]
fn renewable_capacity_limit_binds() {
    let report = solve(&renewable_first(false));

    assert_close(report.renewable_capacity, 1.5, "renewable capacity");
    assert_close(report.plant_capacity, 0.5, "plant capacity");
}

#[test]
fn renewable_limit_below_cold_start_need_is_infeasible() {
    assert_eq!(
        DispatchOptimizer::default().optimize(&renewable_first(true)).unwrap_err(),
        ModelError::Infeasible
    );
}

fn plant_first(capacity_factor: f64) -> Scenario {
    let mut s = scenario(
        Formulation::Continuous,
        &[2.0, 2.0],
        &[capacity_factor, capacity_factor],
        Plant { fuel_cost: 1.0, ..Plant::default() },
        None,
    );
    s.plant.cold_start = false;
    s.plant.max_capacity = Some(1.5);
    s.renewable.investment_cost = 10.0;
    s
}

#[test]
fn plant_capacity_limit_binds() {
    let report = solve(&plant_first(0.5));

    assert_close(report.plant_capacity, 1.5, "plant capacity");
    assert_close(report.renewable_capacity, 1.0, "renewable capacity");
}

#[test]
fn plant_limit_without_renewables_is_infeasible() {
    assert_eq!(
        DispatchOptimizer::default().optimize(&plant_first(0.0)).unwrap_err(),
        ModelError::Infeasible
    );
}

#[test]
fn unit_larger_than_plant_limit_is_rejected() {
    let mut s = scenario(
        Formulation::Binary,
        &[1.0, 1.0],
        &[0.0, 0.0],
        Plant::default(),
        Some(UnitCommitment::new(2.0)),
    );
    s.plant.max_capacity = Some(1.0);

    assert_eq!(
        DispatchOptimizer::default().optimize(&s).unwrap_err(),
        ModelError::Configuration(ConfigurationError::UnitAbovePlantLimit {
            unit: 2.0,
            limit: 1.0
        })
    );
}

#[test]
fn online_unit_runs_at_least_minimum_load() {
    let s = scenario(
        Formulation::Binary,
        &[1.0, 1.0],
        &[0.0, 0.0],
        Plant {
            partial_load_min: 0.5,
            ..Plant::default()
        },
        Some(UnitCommitment::new(4.0)),
    );

    let report = solve(&s);

    for entry in &report.entries {
        assert_eq!(entry.commitment, Some(true));
        assert_close(entry.plant_output, 2.0, "minimum load output");
        assert_close(entry.surplus, 1.0, "surplus");
    }
}
