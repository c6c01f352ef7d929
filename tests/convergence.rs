use std::sync::atomic::{AtomicUsize, Ordering};

use pav_designer::config::{FailurePolicy, MissionInputs, ScanMode, SizingConfig};
use pav_designer::sizing::{
    ConvergenceDriver, ConvergenceStatus, EvaluationError, EvaluationSample, ScanHistory,
    SizingError, SizingState, VehicleEvaluator,
};

const CG: [f64; 3] = [2.0, 0.0, 0.1];
const FIXED_POINT_N: f64 = 20_000.0;

/// Deterministic evaluator with pluggable area, mass and failure laws.
struct StubEvaluator {
    initial_mass_n: f64,
    area: fn(f64) -> f64,
    mass: fn(f64) -> f64,
    fails: fn(&SizingState) -> bool,
    calls: AtomicUsize,
}

impl StubEvaluator {
    fn new(initial_mass_n: f64, area: fn(f64) -> f64, mass: fn(f64) -> f64) -> Self {
        Self {
            initial_mass_n,
            area,
            mass,
            fails: |_| false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing_when(mut self, fails: fn(&SizingState) -> bool) -> Self {
        self.fails = fails;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VehicleEvaluator for StubEvaluator {
    fn initial_state(&self) -> SizingState {
        SizingState {
            wing_position: 0.4,
            mass_n: self.initial_mass_n,
            centre_of_gravity: CG,
        }
    }

    fn evaluate(&self, state: &SizingState) -> Result<EvaluationSample, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if (self.fails)(state) {
            return Err(EvaluationError::Failed(format!(
                "stub refuses position {}",
                state.wing_position
            )));
        }
        Ok(EvaluationSample {
            position: state.wing_position,
            horizontal_tail_area_m2: (self.area)(state.wing_position),
            vertical_tail_area_m2: 0.5,
            resulting_mass_n: (self.mass)(state.mass_n),
            resulting_cg: CG,
        })
    }
}

fn parabola(position: f64) -> f64 {
    (position - 0.35).powi(2) + 1.0
}

fn flat(_position: f64) -> f64 {
    2.0
}

/// Halves the gap to the fixed point on every call.
fn halving(assumed: f64) -> f64 {
    FIXED_POINT_N + (assumed - FIXED_POINT_N) / 2.0
}

/// Always lands 10 kN above the assumption.
fn diverging(assumed: f64) -> f64 {
    assumed + 10_000.0
}

/// Swaps between two masses forever.
fn oscillating(assumed: f64) -> f64 {
    if assumed < 25_000.0 { 30_000.0 } else { 20_000.0 }
}

fn driver(
    evaluator: &StubEvaluator,
    config: SizingConfig,
    iterate: bool,
) -> ConvergenceDriver<&StubEvaluator> {
    ConvergenceDriver::new(evaluator, config, 500.0, iterate).expect("valid driver")
}

#[test]
fn repeated_runs_are_identical() {
    let stub = StubEvaluator::new(30_000.0, parabola, halving);
    let driver = driver(&stub, SizingConfig::default(), true);
    let first = driver.run().expect("first run");
    let second = driver.run().expect("second run");
    assert_eq!(format!("{first:?}"), format!("{second:?}"));
}

#[test]
fn evaluator_calls_never_exceed_three_scans_plus_seed() {
    let stub = StubEvaluator::new(30_000.0, parabola, diverging);
    let config = SizingConfig::default();
    let grid_len = config.scan.sample_count();
    let result = driver(&stub, config, true).run().expect("run");

    assert_eq!(grid_len, 13);
    assert!(stub.calls() <= 3 * grid_len + 1);
    assert_eq!(result.evaluations, stub.calls());
}

#[test]
fn bypass_returns_seed_after_one_call() {
    let stub = StubEvaluator::new(30_000.0, parabola, diverging);
    let result = driver(&stub, SizingConfig::default(), false)
        .run()
        .expect("run");

    assert_eq!(stub.calls(), 1);
    assert_eq!(result.status, ConvergenceStatus::Bypassed);
    assert_eq!(result.outer_iterations, 0);
    assert_eq!(result.wing_position, 0.4);
    assert_eq!(result.mass_n, 40_000.0);
    assert_eq!(result.final_state, stub.initial_state());
    assert!(!result.converged);
}

#[test]
fn scan_selects_sample_nearest_the_area_minimum() {
    let stub = StubEvaluator::new(30_000.0, parabola, halving);
    let result = driver(&stub, SizingConfig::default(), true)
        .run()
        .expect("run");
    assert!((result.wing_position - 0.35).abs() < 1e-9);
    assert!((result.final_state.wing_position - 0.35).abs() < 1e-9);
}

#[test]
fn off_grid_minimum_picks_the_closer_neighbour() {
    fn shifted(position: f64) -> f64 {
        (position - 0.34).powi(2)
    }
    let stub = StubEvaluator::new(30_000.0, shifted, halving);
    let result = driver(&stub, SizingConfig::default(), true)
        .run()
        .expect("run");
    assert!((result.wing_position - 0.35).abs() < 1e-9);
}

#[test]
fn outer_loop_stops_at_the_cap_without_convergence() {
    let stub = StubEvaluator::new(30_000.0, parabola, diverging);
    let result = driver(&stub, SizingConfig::default(), true)
        .run()
        .expect("run");

    assert_eq!(result.outer_iterations, 3);
    assert_eq!(result.status, ConvergenceStatus::IterationCapped);
    assert!(!result.converged);
    assert_eq!(result.mass_gap_n, 10_000.0);
}

#[test]
fn tie_on_constant_area_keeps_first_position() {
    let stub = StubEvaluator::new(30_000.0, flat, diverging);
    let result = driver(&stub, SizingConfig::default(), true)
        .run()
        .expect("run");
    assert_eq!(result.wing_position, 0.2);
}

#[test]
fn geometric_mass_law_converges_within_budget() {
    let mission = MissionInputs {
        number_of_passengers: 4,
        required_range_km: 200.0,
        max_span_m: 18.0,
        wheels_included: true,
        cruise_velocity_kmh: 300.0,
        iterate: true,
        ..MissionInputs::default()
    };
    let stub = StubEvaluator::new(23_000.0, parabola, halving);
    let result = ConvergenceDriver::for_mission(&stub, SizingConfig::default(), &mission)
        .expect("driver")
        .run()
        .expect("run");

    assert!(result.converged);
    assert_eq!(result.status, ConvergenceStatus::Converged);
    assert_eq!(result.outer_iterations, 2);
    assert!(result.mass_gap_n <= mission.allowable_mass_difference_n);
    assert_eq!(result.final_state.mass_n, result.mass_n);
}

#[test]
fn seed_within_tolerance_skips_the_loop() {
    fn settled(_assumed: f64) -> f64 {
        FIXED_POINT_N
    }
    let stub = StubEvaluator::new(FIXED_POINT_N + 100.0, parabola, settled);
    let result = driver(&stub, SizingConfig::default(), true)
        .run()
        .expect("run");

    assert_eq!(stub.calls(), 1);
    assert_eq!(result.outer_iterations, 0);
    assert_eq!(result.status, ConvergenceStatus::Converged);
    // The vehicle is rebuilt from the seed's resulting mass, not the guess.
    assert_eq!(
        result.final_state,
        SizingState {
            wing_position: 0.4,
            mass_n: FIXED_POINT_N,
            centre_of_gravity: CG,
        }
    );
    assert_eq!(result.final_state.mass_n, result.mass_n);
    assert_eq!(result.final_state.centre_of_gravity, result.cg);
}

#[test]
fn abort_policy_surfaces_the_failing_position() {
    let stub = StubEvaluator::new(30_000.0, parabola, halving)
        .failing_when(|state| state.wing_position > 0.44 && state.wing_position < 0.46);
    let err = driver(&stub, SizingConfig::default(), true)
        .run()
        .expect_err("abort");

    match err {
        SizingError::Evaluation {
            iteration,
            position,
            ..
        } => {
            assert_eq!(iteration, 1);
            assert!((position - 0.45).abs() < 1e-9);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn skip_policy_ranks_the_remaining_samples() {
    let stub = StubEvaluator::new(30_000.0, parabola, diverging)
        .failing_when(|state| state.wing_position > 0.31 && state.wing_position < 0.36);
    let config = SizingConfig {
        failure_policy: FailurePolicy::SkipSample,
        ..SizingConfig::default()
    };
    let mut history = ScanHistory::new();
    let result = driver(&stub, config, true)
        .run_with_observer(&mut history)
        .expect("run");

    // 0.325 and 0.35 fail on each of the three scans.
    assert_eq!(result.skipped_samples, 6);
    assert_eq!(history.failures(), 6);
    assert!((result.wing_position - 0.375).abs() < 1e-9);
}

#[test]
fn all_samples_failing_is_reported() {
    let stub = StubEvaluator::new(30_000.0, parabola, halving)
        .failing_when(|state| state.mass_n < 30_000.0);
    let config = SizingConfig {
        failure_policy: FailurePolicy::SkipSample,
        ..SizingConfig::default()
    };
    let err = driver(&stub, config, true).run().expect_err("no sample");
    assert!(matches!(err, SizingError::NoFeasibleSample { iteration: 1 }));
}

#[test]
fn seed_failure_is_fatal_under_any_policy() {
    let stub = StubEvaluator::new(30_000.0, parabola, halving).failing_when(|_| true);
    let config = SizingConfig {
        failure_policy: FailurePolicy::SkipSample,
        ..SizingConfig::default()
    };
    let err = driver(&stub, config, true).run().expect_err("seed");
    assert!(matches!(err, SizingError::Seed(_)));
}

#[test]
fn parallel_scan_matches_sequential() {
    let sequential_stub = StubEvaluator::new(30_000.0, parabola, diverging);
    let parallel_stub = StubEvaluator::new(30_000.0, parabola, diverging);
    let parallel = SizingConfig {
        scan_mode: ScanMode::Parallel,
        ..SizingConfig::default()
    };

    let mut sequential_history = ScanHistory::new();
    let mut parallel_history = ScanHistory::new();
    let a = driver(&sequential_stub, SizingConfig::default(), true)
        .run_with_observer(&mut sequential_history)
        .expect("sequential");
    let b = driver(&parallel_stub, parallel, true)
        .run_with_observer(&mut parallel_history)
        .expect("parallel");

    assert_eq!(format!("{a:?}"), format!("{b:?}"));
    assert_eq!(sequential_history.records(), parallel_history.records());
    assert_eq!(sequential_stub.calls(), parallel_stub.calls());
}

#[test]
fn memoization_reuses_repeated_requests() {
    let plain = StubEvaluator::new(20_000.0, parabola, oscillating);
    let cached = StubEvaluator::new(20_000.0, parabola, oscillating);
    let memoized = SizingConfig {
        memoize: true,
        ..SizingConfig::default()
    };

    let a = driver(&plain, SizingConfig::default(), true)
        .run()
        .expect("plain");
    let b = driver(&cached, memoized, true).run().expect("memoized");

    assert_eq!(a.wing_position, b.wing_position);
    assert_eq!(a.mass_n, b.mass_n);
    assert_eq!(plain.calls(), 40);
    // The third scan repeats the first one exactly.
    assert!(cached.calls() <= 1 + 2 * 13);
    assert_eq!(b.evaluations, cached.calls());
}

#[test]
fn history_marks_one_winner_per_iteration() {
    let stub = StubEvaluator::new(30_000.0, parabola, diverging);
    let mut history = ScanHistory::new();
    let result = driver(&stub, SizingConfig::default(), true)
        .run_with_observer(&mut history)
        .expect("run");

    assert_eq!(history.records().len(), 1 + 3 * 13);
    let selected: Vec<_> = history.selected().collect();
    assert_eq!(selected.len(), 1 + result.outer_iterations);
    assert_eq!(selected[0].iteration, 0);
    assert!(selected[1..]
        .iter()
        .all(|r| (r.position - 0.35).abs() < 1e-9));
}

#[test]
fn invalid_tolerance_is_rejected() {
    let stub = StubEvaluator::new(30_000.0, parabola, halving);
    let err = ConvergenceDriver::new(&stub, SizingConfig::default(), 0.0, true)
        .err()
        .expect("rejected");
    assert!(matches!(err, SizingError::InvalidTolerance(_)));
}
