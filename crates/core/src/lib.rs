//! Core units, constants, and shared primitives for the PAV designer workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Ratio of specific heats for air.
    pub const GAMMA_AIR: f64 = 1.4;
    /// Specific gas constant of dry air (J/(kg·K)).
    pub const R_AIR: f64 = 287.0;
    /// ISA sea-level temperature (K).
    pub const SEA_LEVEL_TEMPERATURE_K: f64 = 288.15;
    /// ISA sea-level density (kg/m³).
    pub const SEA_LEVEL_DENSITY_KG_M3: f64 = 1.225;
    /// Tropospheric temperature lapse rate (K/m), negative with altitude.
    pub const LAPSE_RATE_K_M: f64 = -0.0065;
    /// Design mass of one passenger (kg).
    pub const PASSENGER_MASS_KG: f64 = 70.0;
    /// Baggage allowance per passenger and quality level (kg).
    pub const BAGGAGE_PER_PASSENGER_KG: f64 = 15.0;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Feet to metres.
    pub const FT_TO_M: f64 = 0.3048;
    /// Inches to metres.
    pub const INCH_TO_M: f64 = 0.0254;
    /// Joules per kilowatt-hour.
    pub const J_PER_KWH: f64 = 3.6e6;
    /// Joules per watt-hour.
    pub const J_PER_WH: f64 = 3_600.0;

    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert kilometres per hour to metres per second.
    #[inline]
    pub fn kmh_to_ms(v: f64) -> f64 {
        v / 3.6
    }

    /// Convert metres per second to kilometres per hour.
    #[inline]
    pub fn ms_to_kmh(v: f64) -> f64 {
        v * 3.6
    }

    /// Convert feet to metres.
    #[inline]
    pub fn ft_to_m(v: f64) -> f64 {
        v * FT_TO_M
    }

    /// Convert joules to kilowatt-hours.
    #[inline]
    pub fn joules_to_kwh(v: f64) -> f64 {
        v / J_PER_KWH
    }

    /// Convert a mass in kilograms to a weight in newtons.
    #[inline]
    pub fn kg_to_newtons(v: f64) -> f64 {
        v * super::constants::G0
    }

    /// Convert a weight in newtons to a mass in kilograms.
    #[inline]
    pub fn newtons_to_kg(v: f64) -> f64 {
        v / super::constants::G0
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in body axes (x aft, y right, z up), metres.
    pub type Vector3 = [f64; 3];

    /// The zero vector.
    pub const ZERO: Vector3 = [0.0, 0.0, 0.0];

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Arithmetic mean of a set of points; `None` when the set is empty.
    pub fn centroid(points: &[Vector3]) -> Option<Vector3> {
        if points.is_empty() {
            return None;
        }
        let sum = points.iter().fold(ZERO, |acc, p| add(&acc, p));
        Some(scale(&sum, 1.0 / points.len() as f64))
    }

    /// True when every component is finite.
    #[inline]
    pub fn is_finite(v: &Vector3) -> bool {
        v.iter().all(|c| c.is_finite())
    }
}
