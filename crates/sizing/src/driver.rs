//! Multi-level fixed-point iteration on wing position, mass and CG.
//!
//! The driver seeds the run with one evaluation at the evaluator's default
//! state. Each outer iteration then adopts the previous resulting mass and
//! CG as the new assumption and scans the wing-position grid, keeping the
//! sample with the smallest combined tail area. The loop stops once the mass
//! assumed for a scan matches the winner's resulting mass within tolerance,
//! or when the outer iteration cap is hit.

use std::collections::HashMap;

use pav_config::{ConfigError, FailurePolicy, MissionInputs, ScanMode, SizingConfig};
use pav_core::vector::Vector3;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::evaluator::{EvaluationError, EvaluationSample, SizingState, VehicleEvaluator};
use crate::grid::ScanGrid;
use crate::observer::{ConvergenceObserver, NullObserver};

/// How a sizing run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceStatus {
    /// The mass gap closed within tolerance.
    Converged,
    /// The outer iteration cap was reached with the gap still open.
    IterationCapped,
    /// Iteration was disabled; the seeding evaluation is the answer.
    Bypassed,
}

/// Selected design of a sizing run plus its convergence diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ConvergenceResult {
    pub wing_position: f64,
    /// Resulting take-off weight of the selected design (N).
    pub mass_n: f64,
    pub cg: Vector3,
    /// Mass that was assumed when the selected design was evaluated (N).
    pub assumed_mass_n: f64,
    /// `|assumed_mass_n - mass_n|`.
    pub mass_gap_n: f64,
    pub converged: bool,
    pub status: ConvergenceStatus,
    pub outer_iterations: usize,
    /// Evaluator calls issued, memoized lookups excluded.
    pub evaluations: usize,
    pub skipped_samples: usize,
    /// State to regenerate the final vehicle from.
    pub final_state: SizingState,
}

/// Failures that stop a sizing run. Non-convergence is not one of them.
#[derive(Debug, Error)]
pub enum SizingError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("allowable mass difference must be positive and finite, got {0}")]
    InvalidTolerance(f64),
    #[error("seeding evaluation failed: {0}")]
    Seed(#[source] EvaluationError),
    #[error("evaluation at wing position {position:.4} failed in outer iteration {iteration}: {source}")]
    Evaluation {
        iteration: usize,
        position: f64,
        #[source]
        source: EvaluationError,
    },
    #[error("no sample of outer iteration {iteration} could be evaluated")]
    NoFeasibleSample { iteration: usize },
}

/// Bit-exact request key used for memoization.
type MemoKey = (u64, u64, [u64; 3]);

fn memo_key(state: &SizingState) -> MemoKey {
    let cg = state.centre_of_gravity;
    (
        state.wing_position.to_bits(),
        state.mass_n.to_bits(),
        [cg[0].to_bits(), cg[1].to_bits(), cg[2].to_bits()],
    )
}

/// Per-run bookkeeping.
#[derive(Default)]
struct RunState {
    evaluations: usize,
    skipped: usize,
    memo: HashMap<MemoKey, EvaluationSample>,
}

/// Resolves the wing position, mass and CG loop for one evaluator.
pub struct ConvergenceDriver<E> {
    evaluator: E,
    config: SizingConfig,
    grid: ScanGrid,
    allowable_mass_difference_n: f64,
    iterate: bool,
}

impl<E: VehicleEvaluator> ConvergenceDriver<E> {
    /// Validates the sizing settings and the mass tolerance up front.
    pub fn new(
        evaluator: E,
        config: SizingConfig,
        allowable_mass_difference_n: f64,
        iterate: bool,
    ) -> Result<Self, SizingError> {
        config.validate()?;
        if !allowable_mass_difference_n.is_finite() || allowable_mass_difference_n <= 0.0 {
            return Err(SizingError::InvalidTolerance(allowable_mass_difference_n));
        }
        let grid = ScanGrid::new(&config.scan)?;
        Ok(Self {
            evaluator,
            config,
            grid,
            allowable_mass_difference_n,
            iterate,
        })
    }

    /// Driver using the tolerance and iterate flag of a mission.
    pub fn for_mission(
        evaluator: E,
        config: SizingConfig,
        mission: &MissionInputs,
    ) -> Result<Self, SizingError> {
        Self::new(
            evaluator,
            config,
            mission.allowable_mass_difference_n,
            mission.iterate,
        )
    }

    /// Wing positions scanned on every outer iteration.
    pub fn grid(&self) -> &ScanGrid {
        &self.grid
    }

    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    /// Runs the sizing loop without progress reporting.
    pub fn run(&self) -> Result<ConvergenceResult, SizingError> {
        self.run_with_observer(&mut NullObserver)
    }

    /// Runs the sizing loop, reporting every sample and iteration to `observer`.
    pub fn run_with_observer(
        &self,
        observer: &mut dyn ConvergenceObserver,
    ) -> Result<ConvergenceResult, SizingError> {
        let mut run = RunState::default();

        let initial_state = self.evaluator.initial_state();
        let seed = self.evaluate(&initial_state, &mut run).map_err(SizingError::Seed)?;
        observer.on_sample(0, &seed);

        let mut assumed_mass = initial_state.mass_n;
        let mut winner = seed;
        info!(
            position = seed.position,
            assumed_mass_n = assumed_mass,
            resulting_mass_n = seed.resulting_mass_n,
            "seeding evaluation complete"
        );

        if !self.iterate {
            let result = self.finish(
                ConvergenceStatus::Bypassed,
                initial_state,
                assumed_mass,
                &winner,
                0,
                &run,
            );
            observer.on_finish(&result);
            return Ok(result);
        }

        let mut outer = 0;
        let mut last_state = SizingState {
            wing_position: seed.position,
            mass_n: seed.resulting_mass_n,
            centre_of_gravity: seed.resulting_cg,
        };
        while (assumed_mass - winner.resulting_mass_n).abs() > self.allowable_mass_difference_n
            && outer < self.config.max_outer_iterations
        {
            outer += 1;
            assumed_mass = winner.resulting_mass_n;
            let assumed_cg = winner.resulting_cg;

            winner = self.scan(outer, assumed_mass, assumed_cg, &mut run, observer)?;
            last_state = SizingState {
                wing_position: winner.position,
                mass_n: winner.resulting_mass_n,
                centre_of_gravity: winner.resulting_cg,
            };

            let gap = (assumed_mass - winner.resulting_mass_n).abs();
            info!(
                iteration = outer,
                position = winner.position,
                combined_area_m2 = winner.combined_area(),
                assumed_mass_n = assumed_mass,
                resulting_mass_n = winner.resulting_mass_n,
                mass_gap_n = gap,
                "outer iteration complete"
            );
            observer.on_iteration(outer, &winner, gap);
        }

        let gap = (assumed_mass - winner.resulting_mass_n).abs();
        let status = if gap <= self.allowable_mass_difference_n {
            ConvergenceStatus::Converged
        } else {
            warn!(
                iterations = outer,
                mass_gap_n = gap,
                tolerance_n = self.allowable_mass_difference_n,
                "iteration cap reached before the mass converged"
            );
            ConvergenceStatus::IterationCapped
        };
        let result = self.finish(status, last_state, assumed_mass, &winner, outer, &run);
        observer.on_finish(&result);
        Ok(result)
    }

    fn finish(
        &self,
        status: ConvergenceStatus,
        final_state: SizingState,
        assumed_mass: f64,
        winner: &EvaluationSample,
        outer_iterations: usize,
        run: &RunState,
    ) -> ConvergenceResult {
        let mass_gap_n = (assumed_mass - winner.resulting_mass_n).abs();
        let result = ConvergenceResult {
            wing_position: winner.position,
            mass_n: winner.resulting_mass_n,
            cg: winner.resulting_cg,
            assumed_mass_n: assumed_mass,
            mass_gap_n,
            converged: mass_gap_n <= self.allowable_mass_difference_n,
            status,
            outer_iterations,
            evaluations: run.evaluations,
            skipped_samples: run.skipped,
            final_state,
        };
        info!(
            status = ?result.status,
            position = result.wing_position,
            mass_n = result.mass_n,
            evaluations = result.evaluations,
            "sizing finished"
        );
        result
    }

    /// One checked evaluator call, served from the memo when enabled.
    fn evaluate(
        &self,
        state: &SizingState,
        run: &mut RunState,
    ) -> Result<EvaluationSample, EvaluationError> {
        if self.config.memoize {
            if let Some(hit) = run.memo.get(&memo_key(state)) {
                return Ok(*hit);
            }
        }
        run.evaluations += 1;
        let sample = self.evaluator.evaluate(state)?.check()?;
        if self.config.memoize {
            run.memo.insert(memo_key(state), sample);
        }
        Ok(sample)
    }

    fn scan(
        &self,
        iteration: usize,
        mass_n: f64,
        cg: Vector3,
        run: &mut RunState,
        observer: &mut dyn ConvergenceObserver,
    ) -> Result<EvaluationSample, SizingError> {
        let requests: Vec<SizingState> = self
            .grid
            .positions()
            .map(|wing_position| SizingState {
                wing_position,
                mass_n,
                centre_of_gravity: cg,
            })
            .collect();

        let mut best: Option<EvaluationSample> = None;
        match self.config.scan_mode {
            ScanMode::Sequential => {
                for request in &requests {
                    let outcome = self.evaluate(request, run);
                    self.consider(iteration, request, outcome, &mut best, run, observer)?;
                }
            }
            ScanMode::Parallel => {
                let outcomes = self.evaluate_parallel(&requests, run);
                for (request, outcome) in requests.iter().zip(outcomes) {
                    self.consider(iteration, request, outcome, &mut best, run, observer)?;
                }
            }
        }

        best.ok_or(SizingError::NoFeasibleSample { iteration })
    }

    /// Memo hits are resolved up front; the misses run on the rayon pool and
    /// come back in grid order.
    fn evaluate_parallel(
        &self,
        requests: &[SizingState],
        run: &mut RunState,
    ) -> Vec<Result<EvaluationSample, EvaluationError>> {
        let cached: Vec<Option<EvaluationSample>> = requests
            .iter()
            .map(|request| {
                if self.config.memoize {
                    run.memo.get(&memo_key(request)).copied()
                } else {
                    None
                }
            })
            .collect();

        let evaluator = &self.evaluator;
        let outcomes: Vec<Result<EvaluationSample, EvaluationError>> = requests
            .par_iter()
            .zip(cached.par_iter())
            .map(|(request, hit)| match hit {
                Some(sample) => Ok(*sample),
                None => evaluator.evaluate(request).and_then(EvaluationSample::check),
            })
            .collect();

        for ((request, hit), outcome) in requests.iter().zip(&cached).zip(&outcomes) {
            if hit.is_some() {
                continue;
            }
            run.evaluations += 1;
            if let (true, Ok(sample)) = (self.config.memoize, outcome) {
                run.memo.insert(memo_key(request), *sample);
            }
        }
        outcomes
    }

    /// Rank one outcome. Strict `<` keeps the first sample in scan order on ties.
    fn consider(
        &self,
        iteration: usize,
        request: &SizingState,
        outcome: Result<EvaluationSample, EvaluationError>,
        best: &mut Option<EvaluationSample>,
        run: &mut RunState,
        observer: &mut dyn ConvergenceObserver,
    ) -> Result<(), SizingError> {
        match outcome {
            Ok(sample) => {
                debug!(
                    iteration,
                    position = sample.position,
                    horizontal_tail_area_m2 = sample.horizontal_tail_area_m2,
                    vertical_tail_area_m2 = sample.vertical_tail_area_m2,
                    resulting_mass_n = sample.resulting_mass_n,
                    "scan sample"
                );
                observer.on_sample(iteration, &sample);
                let better = best
                    .as_ref()
                    .is_none_or(|current| sample.combined_area() < current.combined_area());
                if better {
                    *best = Some(sample);
                }
                Ok(())
            }
            Err(error) => match self.config.failure_policy {
                FailurePolicy::Abort => Err(SizingError::Evaluation {
                    iteration,
                    position: request.wing_position,
                    source: error,
                }),
                FailurePolicy::SkipSample => {
                    warn!(
                        iteration,
                        position = request.wing_position,
                        %error,
                        "skipping failed scan sample"
                    );
                    observer.on_sample_failed(iteration, request.wing_position, &error);
                    run.skipped += 1;
                    Ok(())
                }
            },
        }
    }
}
