//! Configuration models and loaders for the PAV designer.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use pav_core::constants::BAGGAGE_PER_PASSENGER_KG;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cabin quality level offered to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QualityLevel {
    Economy,
    Business,
}

impl QualityLevel {
    /// Numeric level as used in pricing and baggage rules (1 or 2).
    pub fn level(self) -> u8 {
        match self {
            QualityLevel::Economy => 1,
            QualityLevel::Business => 2,
        }
    }
}

impl TryFrom<u8> for QualityLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(QualityLevel::Economy),
            2 => Ok(QualityLevel::Business),
            other => Err(format!(
                "quality level must be 1 (economy) or 2 (business), got {other}"
            )),
        }
    }
}

impl From<QualityLevel> for u8 {
    fn from(value: QualityLevel) -> Self {
        value.level()
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityLevel::Economy => f.write_str("Economy"),
            QualityLevel::Business => f.write_str("Business"),
        }
    }
}

/// Client mission requirements. Supplied once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionInputs {
    pub number_of_passengers: u32,
    pub required_range_km: f64,
    pub max_span_m: f64,
    pub quality_level: QualityLevel,
    pub wheels_included: bool,
    pub cruise_velocity_kmh: f64,
    #[serde(default = "default_primary_colour")]
    pub primary_colour: String,
    #[serde(default = "default_secondary_colour")]
    pub secondary_colour: String,
    /// Cruise propeller blade radius (m).
    #[serde(default = "default_propeller_radius")]
    pub propeller_radius_m: f64,
    /// Accepted gap between assumed and computed mass (N).
    #[serde(default = "default_allowable_mass_difference")]
    pub allowable_mass_difference_n: f64,
    /// Run the mass/CG convergence loop instead of returning the first estimate.
    #[serde(default)]
    pub iterate: bool,
}

impl MissionInputs {
    /// Total baggage allowance: 15 kg per passenger per quality level.
    pub fn baggage_allowance_kg(&self) -> f64 {
        f64::from(self.number_of_passengers)
            * f64::from(self.quality_level.level())
            * BAGGAGE_PER_PASSENGER_KG
    }
}

impl Default for MissionInputs {
    fn default() -> Self {
        Self {
            number_of_passengers: 4,
            required_range_km: 200.0,
            max_span_m: 18.0,
            quality_level: QualityLevel::Business,
            wheels_included: true,
            cruise_velocity_kmh: 300.0,
            primary_colour: default_primary_colour(),
            secondary_colour: default_secondary_colour(),
            propeller_radius_m: default_propeller_radius(),
            allowable_mass_difference_n: default_allowable_mass_difference(),
            iterate: false,
        }
    }
}

fn default_primary_colour() -> String {
    "white".to_string()
}

fn default_secondary_colour() -> String {
    "blue".to_string()
}

fn default_propeller_radius() -> f64 {
    0.3
}

fn default_allowable_mass_difference() -> f64 {
    500.0
}

/// What the driver does when the evaluator fails on a single scan sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the whole convergence run and surface the error.
    #[default]
    Abort,
    /// Drop the failed sample and continue the scan.
    SkipSample,
}

/// How the samples of one wing-position scan are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[default]
    Sequential,
    /// Evaluate samples on a worker pool; results are still ranked in grid order.
    Parallel,
}

/// Wing longitudinal position grid, as fractions of fuselage length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub position_start: f64,
    pub position_end: f64,
    pub position_step: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            position_start: 0.2,
            position_end: 0.5,
            position_step: 0.025,
        }
    }
}

/// Absorbs representation error when the range is an exact multiple of the step.
const GRID_EPSILON: f64 = 1e-9;

/// Largest grid a single scan may request.
pub const MAX_SCAN_SAMPLES: usize = 10_000;

impl ScanConfig {
    /// Check that the grid is finite, ascending and inside the fuselage.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [self.position_start, self.position_end, self.position_step];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidScan(
                "scan bounds and step must be finite".to_string(),
            ));
        }
        if self.position_step <= 0.0 {
            return Err(ConfigError::InvalidScan(format!(
                "position_step must be positive, got {}",
                self.position_step
            )));
        }
        if self.position_end < self.position_start {
            return Err(ConfigError::InvalidScan(format!(
                "position_end ({}) is before position_start ({})",
                self.position_end, self.position_start
            )));
        }
        if self.position_start <= 0.0 || self.position_end >= 1.0 {
            return Err(ConfigError::InvalidScan(format!(
                "scan range [{}, {}] must lie strictly inside the fuselage (0, 1)",
                self.position_start, self.position_end
            )));
        }
        let intervals = self.intervals();
        if !intervals.is_finite() || intervals >= MAX_SCAN_SAMPLES as f64 {
            return Err(ConfigError::InvalidScan(format!(
                "position_step {} yields more than {MAX_SCAN_SAMPLES} samples",
                self.position_step
            )));
        }
        Ok(())
    }

    /// Number of grid samples, `floor((end - start) / step) + 1`, capped at
    /// [`MAX_SCAN_SAMPLES`].
    pub fn sample_count(&self) -> usize {
        let intervals = self.intervals();
        if intervals.is_nan() {
            return 1;
        }
        let capped = intervals.clamp(0.0, (MAX_SCAN_SAMPLES - 1) as f64);
        (capped as usize).saturating_add(1)
    }

    fn intervals(&self) -> f64 {
        ((self.position_end - self.position_start) / self.position_step + GRID_EPSILON).floor()
    }
}

/// Convergence driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    #[serde(flatten)]
    pub scan: ScanConfig,
    pub max_outer_iterations: usize,
    pub failure_policy: FailurePolicy,
    pub scan_mode: ScanMode,
    /// Reuse results of identical evaluator requests within one run.
    pub memoize: bool,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            max_outer_iterations: 3,
            failure_policy: FailurePolicy::default(),
            scan_mode: ScanMode::default(),
            memoize: false,
        }
    }
}

impl SizingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.validate()?;
        if self.max_outer_iterations == 0 {
            return Err(ConfigError::InvalidSizing(
                "max_outer_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One mission record as stored in a manifest: a name, the client inputs and
/// optional driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    #[serde(default = "default_mission_name")]
    pub name: String,
    #[serde(flatten)]
    pub inputs: MissionInputs,
    #[serde(default)]
    pub sizing: SizingConfig,
}

fn default_mission_name() -> String {
    "PAV".to_string()
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid scan grid: {0}")]
    InvalidScan(String),
    #[error("invalid sizing settings: {0}")]
    InvalidSizing(String),
    #[error("mission '{0}' not found in manifest")]
    NotFound(String),
    #[error("mission manifest is empty")]
    Empty,
}

/// Load mission records from a TOML file, a YAML list, or a directory of TOML files.
///
/// Every record's sizing settings are validated before it is returned.
pub fn load_missions<P: AsRef<Path>>(path: P) -> Result<Vec<MissionConfig>, ConfigError> {
    let missions: Vec<MissionConfig> = load_records(path)?;
    for mission in &missions {
        mission.sizing.validate()?;
    }
    Ok(missions)
}

/// Parse a single mission record from TOML text.
pub fn parse_mission_toml(contents: &str) -> Result<MissionConfig, ConfigError> {
    let mission: MissionConfig = toml::from_str(contents)?;
    mission.sizing.validate()?;
    Ok(mission)
}

/// Pick a mission by name (case-insensitive), or the first record when no name is given.
pub fn select_mission(
    missions: &[MissionConfig],
    requested: Option<&str>,
) -> Result<MissionConfig, ConfigError> {
    let first = missions.first().ok_or(ConfigError::Empty)?;
    match requested {
        Some(name) => {
            let upper = name.to_uppercase();
            missions
                .iter()
                .find(|m| m.name.to_uppercase() == upper)
                .cloned()
                .ok_or_else(|| ConfigError::NotFound(name.to_string()))
        }
        None => Ok(first.clone()),
    }
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_has_thirteen_samples() {
        assert_eq!(ScanConfig::default().sample_count(), 13);
    }

    #[test]
    fn wide_grid_sample_count_matches_floor_formula() {
        let scan = ScanConfig {
            position_start: 0.15,
            position_end: 0.6,
            position_step: 0.025,
        };
        assert_eq!(scan.sample_count(), 19);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let scan = ScanConfig {
            position_start: 0.5,
            position_end: 0.2,
            position_step: 0.025,
        };
        assert!(matches!(scan.validate(), Err(ConfigError::InvalidScan(_))));
    }

    #[test]
    fn zero_step_is_rejected() {
        let scan = ScanConfig {
            position_step: 0.0,
            ..ScanConfig::default()
        };
        assert!(scan.validate().is_err());
    }

    #[test]
    fn vanishing_step_is_rejected_without_overflow() {
        for step in [1e-300, 1e-12, 1e-5] {
            let scan = ScanConfig {
                position_step: step,
                ..ScanConfig::default()
            };
            assert!(matches!(scan.validate(), Err(ConfigError::InvalidScan(_))));
            assert_eq!(scan.sample_count(), MAX_SCAN_SAMPLES);
        }
    }

    #[test]
    fn grid_at_the_sample_limit_is_accepted() {
        let scan = ScanConfig {
            position_start: 0.01,
            position_end: 0.01 + 0.00005 * (MAX_SCAN_SAMPLES - 1) as f64,
            position_step: 0.00005,
        };
        assert!(scan.validate().is_ok());
        assert_eq!(scan.sample_count(), MAX_SCAN_SAMPLES);
    }

    #[test]
    fn quality_level_round_trips_through_numbers() {
        assert_eq!(QualityLevel::try_from(1).unwrap(), QualityLevel::Economy);
        assert_eq!(u8::from(QualityLevel::Business), 2);
        assert!(QualityLevel::try_from(3).is_err());
    }

    #[test]
    fn baggage_allowance_scales_with_quality() {
        let mission = MissionInputs::default();
        assert_eq!(mission.baggage_allowance_kg(), 4.0 * 2.0 * 15.0);
    }
}
