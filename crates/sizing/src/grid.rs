//! Linear wing-position grid scanned on every outer iteration.

use pav_config::{ConfigError, ScanConfig};

/// Sample `i` sits at `start + i * step`; positions are computed from the
/// index so the grid never drifts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanGrid {
    start: f64,
    step: f64,
    count: usize,
}

impl ScanGrid {
    pub fn new(scan: &ScanConfig) -> Result<Self, ConfigError> {
        scan.validate()?;
        Ok(Self {
            start: scan.position_start,
            step: scan.position_step,
            count: scan.sample_count(),
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn position(&self, index: usize) -> f64 {
        self.start + index as f64 * self.step
    }

    /// Positions in ascending scan order.
    pub fn positions(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(|index| self.position(index))
    }
}
