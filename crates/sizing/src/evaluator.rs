//! The collaborator the convergence driver calls once per candidate design.

use pav_core::vector::{self, Vector3};
use serde::Serialize;
use thiserror::Error;

/// Assumed design state handed to the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizingState {
    /// Wing root station as a fraction of fuselage length.
    pub wing_position: f64,
    /// Assumed take-off weight (N).
    pub mass_n: f64,
    pub centre_of_gravity: Vector3,
}

/// Outcome of evaluating one candidate wing position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationSample {
    pub position: f64,
    pub horizontal_tail_area_m2: f64,
    /// Area of one vertical fin.
    pub vertical_tail_area_m2: f64,
    pub resulting_mass_n: f64,
    pub resulting_cg: Vector3,
}

impl EvaluationSample {
    /// Ranking key of the scan: horizontal plus one vertical tail.
    pub fn combined_area(&self) -> f64 {
        self.horizontal_tail_area_m2 + self.vertical_tail_area_m2
    }

    /// Reject samples the driver cannot rank or iterate on.
    pub fn check(self) -> Result<Self, EvaluationError> {
        let areas = [self.horizontal_tail_area_m2, self.vertical_tail_area_m2];
        if areas.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return Err(EvaluationError::InvalidSample(format!(
                "tail areas must be finite and non-negative at position {}",
                self.position
            )));
        }
        if !self.resulting_mass_n.is_finite() || self.resulting_mass_n <= 0.0 {
            return Err(EvaluationError::InvalidSample(format!(
                "resulting mass {} N at position {} is not positive",
                self.resulting_mass_n, self.position
            )));
        }
        if !vector::is_finite(&self.resulting_cg) {
            return Err(EvaluationError::InvalidSample(format!(
                "resulting centre of gravity at position {} is not finite",
                self.position
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Vehicle(#[from] pav_vehicle::VehicleError),
    #[error("evaluator returned an unusable sample: {0}")]
    InvalidSample(String),
    #[error("evaluation failed: {0}")]
    Failed(String),
}

/// Maps an assumed design state to tail areas and the resulting mass and CG.
///
/// Implementations hold the mission they size for and must be pure: equal
/// states give equal samples. `Sync` lets the driver fan a scan out across
/// worker threads.
pub trait VehicleEvaluator: Sync {
    /// Default wing position and closed-form mass/CG guess used to seed the run.
    fn initial_state(&self) -> SizingState;

    fn evaluate(&self, state: &SizingState) -> Result<EvaluationSample, EvaluationError>;
}

impl<E: VehicleEvaluator + ?Sized> VehicleEvaluator for &E {
    fn initial_state(&self) -> SizingState {
        (**self).initial_state()
    }

    fn evaluate(&self, state: &SizingState) -> Result<EvaluationSample, EvaluationError> {
        (**self).evaluate(state)
    }
}
