//! Progress hooks invoked by the convergence driver.

use pav_core::vector::Vector3;
use serde::Serialize;

use crate::driver::ConvergenceResult;
use crate::evaluator::{EvaluationError, EvaluationSample};

/// Receives driver progress in scan order, on the calling thread, even when
/// the scan itself runs in parallel.
///
/// Iteration `0` is the seeding evaluation.
pub trait ConvergenceObserver {
    fn on_sample(&mut self, _iteration: usize, _sample: &EvaluationSample) {}

    fn on_sample_failed(&mut self, _iteration: usize, _position: f64, _error: &EvaluationError) {}

    /// Called after each outer iteration with the selected sample and the gap
    /// between the mass assumed for the scan and the winner's resulting mass.
    fn on_iteration(&mut self, _iteration: usize, _winner: &EvaluationSample, _mass_gap_n: f64) {}

    fn on_finish(&mut self, _result: &ConvergenceResult) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ConvergenceObserver for NullObserver {}

/// One row of the scan history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRecord {
    pub iteration: usize,
    pub position: f64,
    pub horizontal_tail_area_m2: f64,
    pub vertical_tail_area_m2: f64,
    pub combined_area_m2: f64,
    pub resulting_mass_n: f64,
    pub resulting_cg_x_m: f64,
    pub resulting_cg_y_m: f64,
    pub resulting_cg_z_m: f64,
    /// True for the sample each iteration settled on.
    pub selected: bool,
}

impl ScanRecord {
    fn from_sample(iteration: usize, sample: &EvaluationSample) -> Self {
        let cg: Vector3 = sample.resulting_cg;
        Self {
            iteration,
            position: sample.position,
            horizontal_tail_area_m2: sample.horizontal_tail_area_m2,
            vertical_tail_area_m2: sample.vertical_tail_area_m2,
            combined_area_m2: sample.combined_area(),
            resulting_mass_n: sample.resulting_mass_n,
            resulting_cg_x_m: cg[0],
            resulting_cg_y_m: cg[1],
            resulting_cg_z_m: cg[2],
            selected: iteration == 0,
        }
    }
}

/// Records every successful sample so the run can be exported or plotted.
#[derive(Debug, Default, Clone)]
pub struct ScanHistory {
    records: Vec<ScanRecord>,
    failures: usize,
}

impl ScanHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Selected sample of every iteration, seeding evaluation first.
    pub fn selected(&self) -> impl Iterator<Item = &ScanRecord> {
        self.records.iter().filter(|r| r.selected)
    }
}

impl ConvergenceObserver for ScanHistory {
    fn on_sample(&mut self, iteration: usize, sample: &EvaluationSample) {
        self.records.push(ScanRecord::from_sample(iteration, sample));
    }

    fn on_sample_failed(&mut self, _iteration: usize, _position: f64, _error: &EvaluationError) {
        self.failures += 1;
    }

    fn on_iteration(&mut self, iteration: usize, winner: &EvaluationSample, _mass_gap_n: f64) {
        // Positions are unique within one iteration.
        if let Some(record) = self
            .records
            .iter_mut()
            .rev()
            .take_while(|r| r.iteration == iteration)
            .find(|r| r.position == winner.position)
        {
            record.selected = true;
        }
    }
}
