//! Cruise propellers, VTOL rotors and the battery that feeds them.

use std::f64::consts::PI;

use pav_core::units::J_PER_WH;
use pav_core::vector::Vector3;
use serde::Serialize;

use crate::atmosphere::Atmosphere;
use crate::fuselage::Fuselage;
use crate::geometry::LiftingSurface;

/// Rotor and propeller tip Mach number.
pub const TIP_MACH: f64 = 0.6;
/// Cruise propeller thrust coefficient.
const CRUISE_THRUST_COEFFICIENT: f64 = 0.10;
/// VTOL rotor thrust coefficient.
const ROTOR_THRUST_COEFFICIENT: f64 = 0.005;
const ROTOR_SOLIDITY: f64 = 0.07;
/// Maximum rotor disk loading (N/m²).
const MAX_DISK_LOADING: f64 = 1_500.0;
const ROTOR_RADIUS_TO_CHORD: f64 = 15.0;
const FIGURE_OF_MERIT: f64 = 0.8;
const ROTOR_DRAG_FACTOR: f64 = 1.15;
pub const ROTOR_BLADES: u32 = 4;
/// VTOL rotor radius (m).
pub const ROTOR_RADIUS_M: f64 = 0.4;
/// Vertical rate of climb used to size the rotors (m/s).
const VERTICAL_CLIMB_RATE: f64 = 10.0;
/// Drag coefficient of the lifting surfaces in vertical flight.
const FLAT_PLATE_DRAG_COEFFICIENT: f64 = 1.28;
const MIN_VTOL_ROTORS: u32 = 4;
const MAX_VTOL_ROTORS: u32 = 40;
pub const PROPULSIVE_EFFICIENCY: f64 = 0.9;
/// Battery specific energy (Wh/kg).
const BATTERY_ENERGY_DENSITY_WH_KG: f64 = 200.0;
/// Margin on discharge time for take-off, approach and diversion.
const DISCHARGE_TIME_FACTOR: f64 = 1.5;

/// Wing-mounted tractor propellers.
#[derive(Debug, Clone, Serialize)]
pub struct CruisePropellers {
    pub radius_m: f64,
    pub thrust_per_propeller_n: f64,
    pub required_count: u32,
    pub allowed_count: u32,
    pub count: u32,
    pub positions: Vec<Vector3>,
}

impl CruisePropellers {
    /// `drag_n` is the cruise drag the propellers must balance.
    pub fn size(
        air: &Atmosphere,
        drag_n: f64,
        wing: &LiftingSurface,
        fuselage: &Fuselage,
        radius_m: f64,
    ) -> Self {
        let rotational_speed = TIP_MACH * air.speed_of_sound_m_s / (2.0 * PI * radius_m);
        let thrust = CRUISE_THRUST_COEFFICIENT
            * air.density_kg_m3
            * rotational_speed
            * rotational_speed
            * (2.0 * radius_m).powi(4);

        let required = (drag_n / thrust).ceil().max(1.0) as u32;
        let free_span = wing.span_m - fuselage.cabin_width_m - 3.0 * radius_m;
        let allowed = (free_span / (2.0 * radius_m)).floor().max(0.0) as u32;
        let count = required.min(allowed).max(1);

        Self {
            radius_m,
            thrust_per_propeller_n: thrust,
            required_count: required,
            allowed_count: allowed,
            count,
            positions: propeller_positions(count, wing, fuselage, radius_m),
        }
    }

    pub fn is_span_limited(&self) -> bool {
        self.count < self.required_count
    }
}

/// An odd propeller sits on the nose; the rest are spread along both wings,
/// the innermost tip half a radius clear of the cabin.
fn propeller_positions(
    count: u32,
    wing: &LiftingSurface,
    fuselage: &Fuselage,
    radius_m: f64,
) -> Vec<Vector3> {
    let semi_span = wing.span_m / 2.0;
    let tan_sweep = wing.sweep_rad().tan();
    let tan_dihedral = wing.dihedral_deg.to_radians().tan();
    let per_side = count / 2;
    let inboard = fuselage.cabin_width_m / 2.0 + 1.5 * radius_m;

    let mut positions = Vec::with_capacity(count as usize);
    if count % 2 == 1 {
        positions.push([0.0, 0.0, fuselage.nose_height_m()]);
    }
    for side in [1.0, -1.0] {
        for index in 0..per_side {
            let y = inboard + (semi_span - inboard) * f64::from(index) / f64::from(per_side);
            let x = wing.root[0] + y * tan_sweep
                - 0.3 * wing.chord_at(y / semi_span)
                - radius_m * tan_sweep;
            positions.push([x, side * y, wing.root[2] + y * tan_dihedral]);
        }
    }
    positions
}

/// Lift rotor count from the vertical-climb power balance.
#[derive(Debug, Clone, Serialize)]
pub struct VtolRotors {
    pub radius_m: f64,
    pub hover_thrust_n: f64,
    pub hover_power_w: f64,
    pub profile_power_w: f64,
    pub climb_power_w: f64,
    pub surface_drag_power_w: f64,
    /// Unrounded rotor count from the power balance.
    pub computed_count: f64,
    pub count: u32,
}

impl VtolRotors {
    /// `lifting_area_m2` is the planform area pushing against the climb.
    pub fn size(air: &Atmosphere, mtow_n: f64, lifting_area_m2: f64) -> Self {
        let rho = air.density_kg_m3;
        let r = ROTOR_RADIUS_M;
        let blades = f64::from(ROTOR_BLADES);
        let tip_speed = TIP_MACH * air.speed_of_sound_m_s;
        let climb = VERTICAL_CLIMB_RATE;

        let hover_thrust = 1.0 / 6.0 * blades * 6.6 * ROTOR_THRUST_COEFFICIENT / ROTOR_SOLIDITY
            * rho
            * r
            / ROTOR_RADIUS_TO_CHORD
            * (0.97 * tip_speed).powi(2)
            * 0.97
            * r;
        let induced_velocity =
            climb / 2.0 + ((climb / 2.0).powi(2) * hover_thrust / (2.0 * rho * PI * r)).sqrt();
        let hover_power = hover_thrust * induced_velocity;

        let blade_area_ratio = blades * r * r / ROTOR_RADIUS_TO_CHORD / (PI * r * r);
        let blade_drag = 8.0 / blade_area_ratio
            * (ROTOR_THRUST_COEFFICIENT / 2.0).sqrt()
            * (ROTOR_THRUST_COEFFICIENT / FIGURE_OF_MERIT
                - ROTOR_DRAG_FACTOR * ROTOR_THRUST_COEFFICIENT);
        let profile_power =
            blade_drag / 8.0 * rho * r / ROTOR_RADIUS_TO_CHORD * blades * tip_speed.powi(3) * r;

        let climb_power = mtow_n * climb / 2.0;
        let surface_drag =
            0.5 * rho * climb * climb * FLAT_PLATE_DRAG_COEFFICIENT * lifting_area_m2;
        let surface_drag_power = surface_drag * climb;

        let computed = -(climb_power + surface_drag_power) / climb
            / ((hover_power + profile_power) / climb - MAX_DISK_LOADING * PI * r);
        let count = if computed.is_finite() && computed > 0.0 {
            let per_side = (computed / 2.0).ceil().min(f64::from(MAX_VTOL_ROTORS / 2)) as u32;
            (2 * per_side).max(MIN_VTOL_ROTORS)
        } else {
            MIN_VTOL_ROTORS
        };

        Self {
            radius_m: r,
            hover_thrust_n: hover_thrust,
            hover_power_w: hover_power,
            profile_power_w: profile_power,
            climb_power_w: climb_power,
            surface_drag_power_w: surface_drag_power,
            computed_count: computed,
            count,
        }
    }

    /// True when the power balance alone would not give an even count of at
    /// least four rotors.
    pub fn is_clamped(&self) -> bool {
        let natural = 2.0 * (self.computed_count / 2.0).ceil();
        !self.computed_count.is_finite() || natural != f64::from(self.count)
    }
}

/// Cruise battery sized from drag power and discharge time.
#[derive(Debug, Clone, Serialize)]
pub struct Battery {
    pub power_w: f64,
    pub discharge_time_s: f64,
    pub energy_j: f64,
    pub mass_kg: f64,
}

impl Battery {
    pub fn size(drag_n: f64, velocity_m_s: f64, range_m: f64) -> Self {
        let power = drag_n * velocity_m_s / PROPULSIVE_EFFICIENCY;
        let discharge_time = range_m / velocity_m_s * DISCHARGE_TIME_FACTOR;
        let energy = power * discharge_time;
        Self {
            power_w: power,
            discharge_time_s: discharge_time,
            energy_j: energy,
            mass_kg: energy / (BATTERY_ENERGY_DENSITY_WH_KG * J_PER_WH),
        }
    }

    pub fn energy_kwh(&self) -> f64 {
        pav_core::units::joules_to_kwh(self.energy_j)
    }
}
