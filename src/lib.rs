//! PAV designer: sizes a personal aerial vehicle for a client mission.
//!
//! The member crates do the work; this library re-exports them so the
//! binaries and integration tests share one entry point.

pub use pav_config as config;
pub use pav_core as base;
pub use pav_export as export;
pub use pav_sizing as sizing;
pub use pav_vehicle as vehicle;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
