//! Semi-empirical aerodynamic coefficients (DATCOM and Torenbeek style).

use std::f64::consts::PI;

/// Zero-lift drag coefficient of the complete vehicle.
pub const ZERO_LIFT_DRAG_COEFFICIENT: f64 = 0.02;
/// Oswald span efficiency used for induced drag.
pub const OSWALD_EFFICIENCY: f64 = 0.8;
/// Two-dimensional lift slope efficiency factor.
const AIRFOIL_EFFICIENCY: f64 = 0.95;
/// Section pitching moment coefficient at zero lift.
const SECTION_MOMENT_COEFFICIENT: f64 = -0.06;
/// Mean fuselage lift coefficient at zero angle of attack.
const FUSELAGE_ZERO_ALPHA_LIFT: f64 = 0.25;
/// Upper bound applied to the downwash gradient.
const MAX_DOWNWASH_GRADIENT: f64 = 0.9;

/// Convert a sweep angle between two chordwise stations (fractions of chord).
pub fn sweep_to_sweep(
    from_station: f64,
    sweep_rad: f64,
    to_station: f64,
    aspect_ratio: f64,
    taper_ratio: f64,
) -> f64 {
    let tan_sweep = sweep_rad.tan()
        - 4.0 / aspect_ratio * (to_station - from_station) * (1.0 - taper_ratio)
            / (1.0 + taper_ratio);
    tan_sweep.atan()
}

/// DATCOM lift-curve slope (per radian) for a straight-tapered surface.
pub fn lift_slope(aspect_ratio: f64, quarter_chord_sweep_rad: f64, taper_ratio: f64, mach: f64) -> f64 {
    let beta = (1.0 - mach * mach).max(1e-6).sqrt();
    let half_chord = sweep_to_sweep(0.25, quarter_chord_sweep_rad, 0.5, aspect_ratio, taper_ratio);
    let tan_half = half_chord.tan();
    let term = (aspect_ratio * beta / AIRFOIL_EFFICIENCY).powi(2)
        * (1.0 + tan_half * tan_half / (beta * beta));
    2.0 * PI * aspect_ratio / (2.0 + (4.0 + term).sqrt())
}

/// Planform quantities shared by the wing-fuselage relations.
#[derive(Debug, Clone, Copy)]
pub struct WingBody {
    pub wing_area_m2: f64,
    pub span_m: f64,
    pub aspect_ratio: f64,
    pub taper_ratio: f64,
    pub sweep_rad: f64,
    pub root_chord_m: f64,
    pub mac_m: f64,
    pub fuselage_width_m: f64,
    pub fuselage_height_m: f64,
    pub fuselage_length_m: f64,
}

impl WingBody {
    /// Lift slope of the wing-fuselage combination.
    pub fn lift_slope(&self, wing_lift_slope: f64) -> f64 {
        let bf = self.fuselage_width_m;
        let s = self.wing_area_m2;
        wing_lift_slope * (1.0 + 2.15 * bf / self.span_m) * (s - bf * self.root_chord_m) / s
            + PI / 2.0 * bf * bf / s
    }

    /// Aerodynamic centre of the wing-fuselage combination as a fraction of
    /// the MAC aft of its leading edge. `nose_to_wing_m` is the distance from
    /// the nose to the wing leading edge at the fuselage side.
    pub fn aerodynamic_centre(&self, wing_body_lift_slope: f64, nose_to_wing_m: f64) -> f64 {
        let bf = self.fuselage_width_m;
        let hf = self.fuselage_height_m;
        let s = self.wing_area_m2;
        let b = self.span_m;
        let c = self.mac_m;
        let fuselage_shift = 1.8 / wing_body_lift_slope * bf * hf * nose_to_wing_m / (s * c);
        let sweep_shift = 0.273 / (1.0 + self.taper_ratio) * bf * (s / b) * (b - bf)
            / (c * c * (b + 2.15 * bf))
            * self.sweep_rad.tan();
        0.25 - fuselage_shift + sweep_shift
    }

    /// Pitching moment coefficient about the aerodynamic centre.
    pub fn moment_coefficient(&self, design_lift_coefficient: f64) -> f64 {
        let a = self.aspect_ratio;
        let cos_sweep = self.sweep_rad.cos();
        let wing = SECTION_MOMENT_COEFFICIENT * a * cos_sweep * cos_sweep / (a + 2.0 * cos_sweep);
        let bf = self.fuselage_width_m;
        let lf = self.fuselage_length_m;
        let fuselage = -1.8 * (1.0 - 2.5 * bf / lf) * PI * bf * self.fuselage_height_m * lf
            / (4.0 * self.wing_area_m2 * self.mac_m)
            * FUSELAGE_ZERO_ALPHA_LIFT
            / design_lift_coefficient;
        wing + fuselage
    }
}

/// Downwash gradient at the horizontal tail.
///
/// `dx` and `dz` are the longitudinal and vertical distances between the wing
/// and tail aerodynamic centres; both are normalised by the wing semi-span.
/// The result is clamped to `[0, 0.9]`.
pub fn downwash_gradient(
    dx_m: f64,
    dz_m: f64,
    semi_span_m: f64,
    sweep_rad: f64,
    aspect_ratio: f64,
    wing_lift_slope: f64,
) -> f64 {
    let r = (dx_m / semi_span_m).max(1e-3);
    let m = dz_m / semi_span_m;
    let r2 = r * r;
    let m2 = m * m;
    let k_swept = (0.1124 + 0.1265 * sweep_rad + 0.1766 * sweep_rad * sweep_rad) / r2 + 0.1024 / r + 2.0;
    let k_straight = 0.1124 / r2 + 0.1024 / r + 2.0;
    let shape = r / (r2 + m2) * 0.4876 / (r2 + 0.6319 + m2).sqrt()
        + (1.0 + (r2 / (r2 + 0.7915 + 5.0734 * m2)).powf(0.3113)) * (1.0 - (m2 / (1.0 + m2)).sqrt());
    let gradient = k_swept / k_straight * shape * wing_lift_slope / (PI * aspect_ratio);
    if gradient.is_finite() {
        gradient.clamp(0.0, MAX_DOWNWASH_GRADIENT)
    } else {
        MAX_DOWNWASH_GRADIENT
    }
}

/// Induced drag coefficient from classical lifting-line theory.
pub fn induced_drag_coefficient(lift_coefficient: f64, aspect_ratio: f64) -> f64 {
    lift_coefficient * lift_coefficient / (PI * aspect_ratio * OSWALD_EFFICIENCY)
}

pub fn total_drag_coefficient(lift_coefficient: f64, aspect_ratio: f64) -> f64 {
    ZERO_LIFT_DRAG_COEFFICIENT + induced_drag_coefficient(lift_coefficient, aspect_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_conversion_is_identity_for_untapered_surfaces() {
        let sweep = 0.2_f64;
        let converted = sweep_to_sweep(0.25, sweep, 0.5, 8.0, 1.0);
        assert!((converted - sweep).abs() < 1e-12);
    }

    #[test]
    fn lift_slope_grows_with_aspect_ratio_and_stays_below_two_pi() {
        let low = lift_slope(5.0, 0.0, 0.4, 0.3);
        let high = lift_slope(10.0, 0.0, 0.4, 0.3);
        assert!(high > low);
        assert!(high < 2.0 * PI);
    }

    #[test]
    fn downwash_is_bounded() {
        let gradient = downwash_gradient(5.0, 0.3, 6.0, 0.0, 10.0, 5.0);
        assert!((0.0..=0.9).contains(&gradient));
        let close = downwash_gradient(0.0, 0.0, 6.0, 0.0, 10.0, 5.0);
        assert!((0.0..=0.9).contains(&close));
    }

    #[test]
    fn induced_drag_matches_closed_form() {
        let cdi = induced_drag_coefficient(0.5, 10.0);
        assert!((cdi - 0.25 / (PI * 8.0)).abs() < 1e-12);
    }
}
