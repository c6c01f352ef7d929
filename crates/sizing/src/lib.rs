//! Sizing façade crate: evaluator contract, wing-position grid, convergence
//! driver and the adapter onto the parametric vehicle model.

pub mod driver;
pub mod evaluator;
pub mod grid;
pub mod observer;

pub use facade::*;
pub use pav_vehicle as vehicle;

mod facade;
