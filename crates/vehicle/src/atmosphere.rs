//! ISA troposphere model used for the cruise condition.

use pav_core::constants::{
    G0, GAMMA_AIR, LAPSE_RATE_K_M, R_AIR, SEA_LEVEL_DENSITY_KG_M3, SEA_LEVEL_TEMPERATURE_K,
};
use serde::Serialize;

/// Air properties at a fixed altitude.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Atmosphere {
    pub altitude_m: f64,
    pub temperature_k: f64,
    pub density_kg_m3: f64,
    pub speed_of_sound_m_s: f64,
    pub kinematic_viscosity_m2_s: f64,
}

impl Atmosphere {
    /// Standard atmosphere below the tropopause.
    pub fn isa(altitude_m: f64) -> Self {
        let temperature = SEA_LEVEL_TEMPERATURE_K + LAPSE_RATE_K_M * altitude_m;
        let exponent = -1.0 - G0 / (R_AIR * LAPSE_RATE_K_M);
        let density = SEA_LEVEL_DENSITY_KG_M3 * (temperature / SEA_LEVEL_TEMPERATURE_K).powf(exponent);
        let speed_of_sound = (GAMMA_AIR * R_AIR * temperature).sqrt();

        // Sutherland's law in imperial units (slug/ft/s), then to Pa·s.
        let temperature_rankine = temperature * 9.0 / 5.0;
        let viscosity_imperial = 3.62e-7 * (temperature_rankine / 518.7).powf(1.5) * (518.7 + 198.72)
            / (temperature_rankine + 198.72);
        let dynamic_viscosity = viscosity_imperial * 47.88;

        Self {
            altitude_m,
            temperature_k: temperature,
            density_kg_m3: density,
            speed_of_sound_m_s: speed_of_sound,
            kinematic_viscosity_m2_s: dynamic_viscosity / density,
        }
    }

    /// Dynamic pressure at the given true airspeed (Pa).
    pub fn dynamic_pressure(&self, velocity_m_s: f64) -> f64 {
        0.5 * self.density_kg_m3 * velocity_m_s * velocity_m_s
    }
}
