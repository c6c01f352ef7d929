use pav_designer::base::constants::G0;
use pav_designer::config::{MissionConfig, MissionInputs, QualityLevel, SizingConfig};
use pav_designer::sizing::parametric::{DesignError, PavEvaluator, size_mission};
use pav_designer::sizing::{
    ConvergenceStatus, NullObserver, ScanHistory, SizingState, VehicleEvaluator,
};
use pav_designer::vehicle::mass::ComponentKind;
use pav_designer::vehicle::{DEFAULT_WING_POSITION, ParametricPav};

fn mission(inputs: MissionInputs) -> MissionConfig {
    MissionConfig {
        name: "test".to_string(),
        inputs,
        sizing: SizingConfig::default(),
    }
}

#[test]
fn initial_mass_follows_range_and_speed_factors() {
    let model = ParametricPav::new(MissionInputs::default()).expect("model");
    let velocity = 300.0 / 3.6;
    let range_factor = 1.5 + (200.0 - 100.0) * 0.0025;
    let velocity_factor = 1.5 + (velocity - 100.0) * 0.0025;
    let expected = 3.5 * range_factor * velocity_factor * 4.0 * 70.0 * G0;
    assert!((model.initial_mtow_n() - expected).abs() < 1e-6);
}

#[test]
fn default_state_yields_a_complete_vehicle() {
    let evaluator = PavEvaluator::new(MissionInputs::default()).expect("evaluator");
    let state = evaluator.initial_state();
    let config = evaluator.configure(&state).expect("configuration");

    assert!(config.resulting_mass_n > 0.0);
    assert!(config.resulting_cg.iter().all(|c| c.is_finite()));
    assert!(config.horizontal_tail_area_m2() > 0.0);
    assert!(config.vertical_tail_area_m2() > 0.0);
    assert!(config.wing_span_m() <= 18.0 + 1e-9);
    assert!(config.rotors.count >= 4);
    assert_eq!(config.rotors.count % 2, 0);
    assert!(config.propellers.count >= 1);
    assert!(config.battery_energy_kwh() > 0.0);
    assert!(config.wheels.is_some());
    assert!(config.mass.mass_of(ComponentKind::Wheel) > 0.0);

    let summed: f64 = config.mass.components.iter().map(|c| c.total_mass_kg()).sum();
    assert!((summed - config.mass.total_mass_kg).abs() < 1e-6);
    assert!((config.resulting_mass_n - summed * G0).abs() < 1e-6);
}

#[test]
fn evaluation_is_pure() {
    let evaluator = PavEvaluator::new(MissionInputs::default()).expect("evaluator");
    let state = SizingState {
        wing_position: 0.3,
        mass_n: 22_000.0,
        centre_of_gravity: [2.2, 0.0, 0.1],
    };
    let a = evaluator.evaluate(&state).expect("first");
    let b = evaluator.evaluate(&state).expect("second");
    assert_eq!(a, b);
    assert_eq!(a.position, 0.3);
}

#[test]
fn economy_without_wheels_has_no_wheel_mass() {
    let inputs = MissionInputs {
        quality_level: QualityLevel::Economy,
        wheels_included: false,
        ..MissionInputs::default()
    };
    let evaluator = PavEvaluator::new(inputs).expect("evaluator");
    let config = evaluator
        .configure(&evaluator.initial_state())
        .expect("configuration");

    assert!(config.wheels.is_none());
    assert_eq!(config.mass.mass_of(ComponentKind::Wheel), 0.0);
    assert_eq!(config.baggage_allowance_kg, 4.0 * 15.0);
}

#[test]
fn tight_span_limit_is_respected() {
    let inputs = MissionInputs {
        max_span_m: 6.0,
        ..MissionInputs::default()
    };
    let evaluator = PavEvaluator::new(inputs).expect("evaluator");
    let config = evaluator
        .configure(&evaluator.initial_state())
        .expect("configuration");
    assert!((config.wing_span_m() - 6.0).abs() < 1e-9);
}

#[test]
fn bypass_regenerates_the_initial_vehicle() {
    let sized = size_mission(&mission(MissionInputs::default()), &mut NullObserver)
        .expect("sized");

    assert_eq!(sized.result.status, ConvergenceStatus::Bypassed);
    assert_eq!(sized.result.evaluations, 1);
    assert_eq!(sized.configuration.wing_position, DEFAULT_WING_POSITION);
    assert_eq!(sized.configuration.resulting_mass_n, sized.result.mass_n);
}

#[test]
fn iterated_design_stays_on_the_scan_grid() {
    let inputs = MissionInputs {
        iterate: true,
        ..MissionInputs::default()
    };
    let mut history = ScanHistory::new();
    let sized = size_mission(&mission(inputs), &mut history).expect("sized");
    let result = &sized.result;

    assert!(result.outer_iterations <= 3);
    assert!(result.evaluations <= 1 + 3 * 13);
    assert_eq!(
        sized.configuration.wing_position,
        result.final_state.wing_position
    );
    if result.outer_iterations > 0 {
        assert!(result.wing_position >= 0.2 - 1e-9 && result.wing_position <= 0.5 + 1e-9);
        assert_eq!(history.selected().count(), 1 + result.outer_iterations);
    }
}

#[test]
fn empty_cabin_is_rejected() {
    let inputs = MissionInputs {
        number_of_passengers: 0,
        ..MissionInputs::default()
    };
    let err = size_mission(&mission(inputs), &mut NullObserver).expect_err("rejected");
    assert!(matches!(err, DesignError::Vehicle(_)));
}
