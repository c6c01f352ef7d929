//! Horizontal and vertical tail sizing from the assumed mass and CG.
//!
//! The horizontal tail follows the scissor-plot pair (controllability and
//! stability limits); the twin vertical fins follow the larger of the
//! engine-out yaw control and the directional stability requirement.

use std::f64::consts::PI;

use pav_core::vector::Vector3;
use serde::Serialize;

use crate::aero::{self, WingBody};
use crate::atmosphere::Atmosphere;
use crate::fuselage::Fuselage;
use crate::geometry::LiftingSurface;

/// Dynamic pressure loss at the tail from the fuselage wake.
pub const TAIL_SPEED_RATIO: f64 = 0.85;
pub const HORIZONTAL_TAIL_ASPECT_RATIO: f64 = 5.0;
const HORIZONTAL_TAIL_TAPER: f64 = 0.4;
const HORIZONTAL_TAIL_DIHEDRAL_DEG: f64 = 3.0;
/// Stability margin on the neutral point, fraction of the MAC.
const STABILITY_MARGIN: f64 = 0.05;
/// Factor on the assumed CG station giving a conservative aft limit.
const CG_MARGIN: f64 = 1.05;
const MIN_HORIZONTAL_TAIL_ARM_M: f64 = 0.3;
/// Smallest horizontal tail, as a fraction of the wing area.
pub const MIN_HORIZONTAL_TAIL_FRACTION: f64 = 0.02;

pub const VERTICAL_TAIL_ASPECT_RATIO: f64 = 2.0;
pub const VERTICAL_TAIL_TAPER: f64 = 0.6;
pub const VERTICAL_TAIL_SWEEP_DEG: f64 = 35.0;
const RUDDER_CHORD_RATIO: f64 = 0.3;
const RUDDER_DEFLECTION_DEG: f64 = 30.0;
/// Drag share of the engine-out yawing moment.
const WINDMILL_DRAG_FACTOR: f64 = 0.25;
/// Required directional stability derivative (per radian).
const MIN_SIDESLIP_DERIVATIVE: f64 = 0.0571;
const MIN_VERTICAL_TAIL_ARM_M: f64 = 0.5;
/// Smallest fin, per fin, as a fraction of the wing area.
pub const MIN_VERTICAL_TAIL_FRACTION: f64 = 0.01;

/// Inputs shared by both tail sizing routines.
#[derive(Debug, Clone, Copy)]
pub struct TailContext<'a> {
    pub air: &'a Atmosphere,
    pub velocity_m_s: f64,
    pub design_lift_coefficient: f64,
    pub wing: &'a LiftingSurface,
    pub fuselage: &'a Fuselage,
    pub assumed_cg: Vector3,
}

impl TailContext<'_> {
    fn mach(&self) -> f64 {
        self.velocity_m_s / self.air.speed_of_sound_m_s
    }

    fn tail_mach(&self) -> f64 {
        TAIL_SPEED_RATIO * self.mach()
    }

    fn wing_body(&self) -> WingBody {
        WingBody {
            wing_area_m2: self.wing.area_m2(),
            span_m: self.wing.span_m,
            aspect_ratio: self.wing.aspect_ratio,
            taper_ratio: self.wing.taper_ratio,
            sweep_rad: self.wing.sweep_rad(),
            root_chord_m: self.wing.root_chord_m(),
            mac_m: self.wing.mean_aerodynamic_chord_m(),
            fuselage_width_m: self.fuselage.cabin_width_m,
            fuselage_height_m: self.fuselage.cabin_height_m,
            fuselage_length_m: self.fuselage.length_m,
        }
    }

    pub fn wing_lift_slope(&self) -> f64 {
        aero::lift_slope(
            self.wing.aspect_ratio,
            self.wing.sweep_rad(),
            self.wing.taper_ratio,
            self.mach(),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HorizontalTail {
    pub surface: LiftingSurface,
    pub area_m2: f64,
    pub controllability_area_m2: f64,
    pub stability_area_m2: f64,
    pub tail_arm_m: f64,
    pub downwash_gradient: f64,
    /// Wing-fuselage aerodynamic centre, fraction of MAC.
    pub aerodynamic_centre: f64,
    /// Assumed CG with margin, fraction of MAC.
    pub normalised_cg: f64,
    /// Set when the computed area fell below the minimum.
    pub floored: bool,
}

impl HorizontalTail {
    pub fn size(ctx: &TailContext<'_>) -> Self {
        let wing = ctx.wing;
        let fuselage = ctx.fuselage;
        let wing_body = ctx.wing_body();
        let mac = wing.mean_aerodynamic_chord_m();
        let wing_area = wing.area_m2();
        let cl = ctx.design_lift_coefficient;

        let wing_slope = ctx.wing_lift_slope();
        let wing_body_slope = wing_body.lift_slope(wing_slope);

        let half_cabin = fuselage.cabin_width_m / 2.0;
        let wing_le_at_cabin = wing.quarter_chord_x_at(half_cabin)
            - wing.chord_at(half_cabin / wing.semi_span_m()) / 4.0;
        let x_ac = wing_body.aerodynamic_centre(wing_body_slope, wing_le_at_cabin);
        let moment = wing_body.moment_coefficient(cl);

        let root = [
            0.8 * fuselage.length_m,
            0.0,
            0.3 * fuselage.cabin_height_m,
        ];
        let sweep_deg = wing.sweep_deg + 10.0;

        let wing_ac_x = wing.aerodynamic_centre_x();
        let tail_arm = (root[0] - wing_ac_x).max(MIN_HORIZONTAL_TAIL_ARM_M);
        let normalised_cg = (ctx.assumed_cg[0] * CG_MARGIN - wing.mac_leading_edge_x()) / mac;

        let downwash = aero::downwash_gradient(
            (root[0] - wing_ac_x).abs(),
            (wing.mac_height_m() - root[2]).abs(),
            wing.semi_span_m(),
            wing.sweep_rad(),
            wing.aspect_ratio,
            wing_slope,
        );

        let tail_slope = aero::lift_slope(
            HORIZONTAL_TAIL_ASPECT_RATIO,
            sweep_deg.to_radians(),
            HORIZONTAL_TAIL_TAPER,
            ctx.tail_mach(),
        );
        let tail_lift = -0.35 * HORIZONTAL_TAIL_ASPECT_RATIO.cbrt();
        let volume = tail_arm / mac * TAIL_SPEED_RATIO * TAIL_SPEED_RATIO;

        let controllability =
            (normalised_cg + moment / cl - x_ac) / (tail_lift / cl * volume) * wing_area;
        let stability = (normalised_cg - (x_ac - STABILITY_MARGIN))
            / (tail_slope / wing_body_slope * (1.0 - downwash) * volume)
            * wing_area;

        let minimum = MIN_HORIZONTAL_TAIL_FRACTION * wing_area;
        let required = controllability.max(stability);
        let (area, floored) = if required.is_finite() && required >= minimum {
            (required, false)
        } else {
            (minimum, true)
        };

        let surface = LiftingSurface {
            span_m: (HORIZONTAL_TAIL_ASPECT_RATIO * area).sqrt(),
            aspect_ratio: HORIZONTAL_TAIL_ASPECT_RATIO,
            taper_ratio: HORIZONTAL_TAIL_TAPER,
            sweep_deg,
            dihedral_deg: HORIZONTAL_TAIL_DIHEDRAL_DEG,
            root,
            mirrored: true,
        };

        Self {
            surface,
            area_m2: area,
            controllability_area_m2: controllability,
            stability_area_m2: stability,
            tail_arm_m: tail_arm,
            downwash_gradient: downwash,
            aerodynamic_centre: x_ac,
            normalised_cg,
            floored,
        }
    }
}

/// Twin fins standing on the skids; areas are per fin.
#[derive(Debug, Clone, Serialize)]
pub struct VerticalTails {
    pub fins: [LiftingSurface; 2],
    pub area_per_fin_m2: f64,
    pub controllability_area_m2: f64,
    pub stability_area_m2: f64,
    pub tail_arm_m: f64,
    pub floored: bool,
}

impl VerticalTails {
    /// `root_x` is the fin root quarter-chord station, `lateral_m` and
    /// `vertical_m` the skid station the fins stand on. `propeller_thrust_n`
    /// is the thrust lost at the wing tip in the engine-out case.
    pub fn size(
        ctx: &TailContext<'_>,
        root_x: f64,
        lateral_m: f64,
        vertical_m: f64,
        propeller_thrust_n: f64,
    ) -> Self {
        let wing = ctx.wing;
        let sweep = VERTICAL_TAIL_SWEEP_DEG.to_radians();
        let wing_area = wing.area_m2();
        let span = wing.span_m;

        let tail_arm = (root_x + sweep.tan() - ctx.assumed_cg[0])
            .abs()
            .max(MIN_VERTICAL_TAIL_ARM_M);

        let yaw_moment = propeller_thrust_n * span / 2.0 * (1.0 + WINDMILL_DRAG_FACTOR);
        let cos_sweep = sweep.cos();
        let sweep_factor = (1.0 - 0.08 * cos_sweep * cos_sweep) * cos_sweep.powf(0.75);
        let rudder_effectiveness = 0.75 + 0.1 * RUDDER_CHORD_RATIO;
        let rudder_lift = 2.0 + 0.7 * RUDDER_CHORD_RATIO;
        let q = ctx.air.dynamic_pressure(ctx.velocity_m_s);
        let controllability = yaw_moment
            / (q * RUDDER_DEFLECTION_DEG.to_radians()
                * rudder_effectiveness
                * rudder_lift
                * sweep_factor
                * tail_arm);

        let fin_slope = aero::lift_slope(
            VERTICAL_TAIL_ASPECT_RATIO,
            sweep,
            VERTICAL_TAIL_TAPER,
            ctx.tail_mach(),
        );
        let stability = (MIN_SIDESLIP_DERIVATIVE - fuselage_yaw_derivative(ctx)) / fin_slope * span
            / tail_arm
            * wing_area;

        let minimum = MIN_VERTICAL_TAIL_FRACTION * wing_area;
        let required = controllability.max(stability) / 2.0;
        let (area, floored) = if required.is_finite() && required >= minimum {
            (required, false)
        } else {
            (minimum, true)
        };

        let fin = |side: f64| LiftingSurface {
            span_m: (VERTICAL_TAIL_ASPECT_RATIO * area).sqrt(),
            aspect_ratio: VERTICAL_TAIL_ASPECT_RATIO,
            taper_ratio: VERTICAL_TAIL_TAPER,
            sweep_deg: VERTICAL_TAIL_SWEEP_DEG,
            dihedral_deg: 0.0,
            root: [root_x, side * lateral_m, vertical_m],
            mirrored: false,
        };

        Self {
            fins: [fin(-1.0), fin(1.0)],
            area_per_fin_m2: area,
            controllability_area_m2: controllability,
            stability_area_m2: stability,
            tail_arm_m: tail_arm,
            floored,
        }
    }
}

/// Destabilising yaw derivative of the fuselage (per radian).
fn fuselage_yaw_derivative(ctx: &TailContext<'_>) -> f64 {
    let lf = ctx.fuselage.length_m;
    let hf = ctx.fuselage.cabin_height_m;
    let k_n = 0.01 * (0.27 * ctx.assumed_cg[0] / lf - 0.168 * (lf / hf).ln() + 0.416) - 0.0005;
    let reynolds = ctx.velocity_m_s * lf / ctx.air.kinematic_viscosity_m2_s;
    let k_rl = 0.46 * (reynolds / 1e6).log10() + 1.0;
    -360.0 / (2.0 * PI) * k_n * k_rl * lf * lf * hf / (ctx.wing.area_m2() * ctx.wing.span_m)
}
