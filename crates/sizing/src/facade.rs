//! Re-exported APIs and the parametric-vehicle adapter.

pub use crate::driver::{ConvergenceDriver, ConvergenceResult, ConvergenceStatus, SizingError};
pub use crate::evaluator::{EvaluationError, EvaluationSample, SizingState, VehicleEvaluator};
pub use crate::grid::ScanGrid;
pub use crate::observer::{ConvergenceObserver, NullObserver, ScanHistory, ScanRecord};
pub use pav_vehicle::{ParametricPav, PavConfiguration, SizingWarning, VehicleError};

pub mod parametric {
    use pav_config::{MissionConfig, MissionInputs};
    use pav_vehicle::{
        DEFAULT_CENTRE_OF_GRAVITY, DEFAULT_WING_POSITION, ParametricPav, PavConfiguration,
        VehicleError,
    };
    use tracing::info;

    use crate::driver::{ConvergenceDriver, ConvergenceResult, SizingError};
    use crate::evaluator::{EvaluationError, EvaluationSample, SizingState, VehicleEvaluator};
    use crate::observer::ConvergenceObserver;

    /// Evaluator backed by the closed-form [`ParametricPav`] model.
    #[derive(Debug, Clone)]
    pub struct PavEvaluator {
        model: ParametricPav,
    }

    impl PavEvaluator {
        pub fn new(mission: MissionInputs) -> Result<Self, VehicleError> {
            Ok(Self {
                model: ParametricPav::new(mission)?,
            })
        }

        pub fn model(&self) -> &ParametricPav {
            &self.model
        }

        /// Full vehicle at a sizing state.
        pub fn configure(&self, state: &SizingState) -> Result<PavConfiguration, VehicleError> {
            self.model
                .configure(state.wing_position, state.mass_n, state.centre_of_gravity)
        }
    }

    impl VehicleEvaluator for PavEvaluator {
        fn initial_state(&self) -> SizingState {
            SizingState {
                wing_position: DEFAULT_WING_POSITION,
                mass_n: self.model.initial_mtow_n(),
                centre_of_gravity: DEFAULT_CENTRE_OF_GRAVITY,
            }
        }

        fn evaluate(&self, state: &SizingState) -> Result<EvaluationSample, EvaluationError> {
            let config = self.configure(state)?;
            Ok(EvaluationSample {
                position: state.wing_position,
                horizontal_tail_area_m2: config.horizontal_tail_area_m2(),
                vertical_tail_area_m2: config.vertical_tail_area_m2(),
                resulting_mass_n: config.resulting_mass_n,
                resulting_cg: config.resulting_cg,
            })
        }
    }

    /// Convergence result together with the vehicle regenerated from it.
    #[derive(Debug, Clone)]
    pub struct SizedVehicle {
        pub result: ConvergenceResult,
        pub configuration: PavConfiguration,
    }

    #[derive(Debug, thiserror::Error)]
    pub enum DesignError {
        #[error("mission rejected: {0}")]
        Vehicle(#[from] VehicleError),
        #[error("sizing failed: {0}")]
        Sizing(#[from] SizingError),
    }

    /// Size the vehicle for one mission record and regenerate the final design.
    pub fn size_mission(
        mission: &MissionConfig,
        observer: &mut dyn ConvergenceObserver,
    ) -> Result<SizedVehicle, DesignError> {
        let evaluator = PavEvaluator::new(mission.inputs.clone())?;
        let driver = ConvergenceDriver::for_mission(&evaluator, mission.sizing, &mission.inputs)?;
        info!(
            mission = %mission.name,
            samples = driver.grid().len(),
            iterate = mission.inputs.iterate,
            "sizing mission"
        );
        let result = driver.run_with_observer(observer)?;
        let configuration = evaluator.configure(&result.final_state)?;
        Ok(SizedVehicle {
            result,
            configuration,
        })
    }
}
