//! Parametric sizing model of a hybrid fixed-wing/VTOL personal aerial vehicle.
//!
//! [`ParametricPav`] holds the validated mission and the fixed flight
//! condition; [`ParametricPav::configure`] derives one complete vehicle for a
//! given wing position and assumed mass/CG.

pub mod aero;
pub mod atmosphere;
pub mod empennage;
pub mod fuselage;
pub mod geometry;
pub mod landing_gear;
pub mod mass;
pub mod propulsion;

use std::fmt;

use pav_config::MissionInputs;
use pav_core::constants::{G0, PASSENGER_MASS_KG};
use pav_core::units::{ft_to_m, km_to_m, kmh_to_ms, ms_to_kmh, newtons_to_kg};
use pav_core::vector::{self, Vector3};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::atmosphere::Atmosphere;
use crate::empennage::{HorizontalTail, TailContext, VerticalTails};
use crate::fuselage::Fuselage;
use crate::geometry::LiftingSurface;
use crate::landing_gear::{SkidLayout, SkidStation, Wheels};
use crate::mass::{
    Component, ComponentKind, FUSELAGE_MASS_PER_LENGTH, MassBreakdown, PROPELLER_MASS_KG,
    SKID_MASS_KG, SURFACE_MASS_PER_AREA, WHEEL_MASS_KG,
};
use crate::propulsion::{Battery, CruisePropellers, VtolRotors};

/// Wing position used for the first estimate, fraction of fuselage length.
pub const DEFAULT_WING_POSITION: f64 = 0.4;
/// CG guess used for the first estimate (m).
pub const DEFAULT_CENTRE_OF_GRAVITY: Vector3 = [2.0, 0.0, 0.1];
pub const CRUISE_ALTITUDE_FT: f64 = 10_000.0;
pub const DESIGN_LIFT_COEFFICIENT: f64 = 0.5;
pub const MAX_PASSENGERS: u32 = 19;
/// Aspect ratio the wing gets when the span is not limited.
const INTENDED_ASPECT_RATIO: f64 = 10.0;
const WING_TAPER: f64 = 0.4;
/// Wing root height as a fraction of cabin height above the centreline.
const WING_HEIGHT_RATIO: f64 = 0.9 - 0.5;
/// Highest cruise Mach number the vehicle is designed for.
const MAX_CRUISE_MACH: f64 = 0.6;

#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("invalid mission: {0}")]
    InvalidMission(String),
    #[error("invalid sizing state: {0}")]
    InvalidState(String),
    #[error("component breakdown has no positive mass")]
    DegenerateMass,
}

/// A value the model replaced by the nearest feasible one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizingWarning {
    CruiseVelocityClamped { requested_kmh: f64, applied_kmh: f64 },
    PropellerCountClamped { required: u32, applied: u32 },
    VtolRotorCountClamped { computed: f64, applied: u32 },
    HorizontalTailFloored { computed_m2: f64, applied_m2: f64 },
    VerticalTailFloored { computed_m2: f64, applied_m2: f64 },
}

impl fmt::Display for SizingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizingWarning::CruiseVelocityClamped {
                requested_kmh,
                applied_kmh,
            } => write!(
                f,
                "cruise velocity limited to {applied_kmh:.0} km/h (requested {requested_kmh:.0} km/h)"
            ),
            SizingWarning::PropellerCountClamped { required, applied } => write!(
                f,
                "span fits {applied} cruise propellers, {required} would be needed"
            ),
            SizingWarning::VtolRotorCountClamped { computed, applied } => write!(
                f,
                "VTOL rotor count set to {applied} (power balance gave {computed:.2})"
            ),
            SizingWarning::HorizontalTailFloored {
                computed_m2,
                applied_m2,
            } => write!(
                f,
                "horizontal tail area raised to {applied_m2:.2} m² (computed {computed_m2:.2} m²)"
            ),
            SizingWarning::VerticalTailFloored {
                computed_m2,
                applied_m2,
            } => write!(
                f,
                "vertical tail area raised to {applied_m2:.2} m² per fin (computed {computed_m2:.2} m²)"
            ),
        }
    }
}

/// Mission plus the flight condition derived from it.
#[derive(Debug, Clone)]
pub struct ParametricPav {
    mission: MissionInputs,
    air: Atmosphere,
    velocity_m_s: f64,
    velocity_warning: Option<SizingWarning>,
    fuselage: Fuselage,
}

impl ParametricPav {
    pub fn new(mission: MissionInputs) -> Result<Self, VehicleError> {
        validate_mission(&mission)?;
        let air = Atmosphere::isa(ft_to_m(CRUISE_ALTITUDE_FT));

        let requested = kmh_to_ms(mission.cruise_velocity_kmh);
        let limit = MAX_CRUISE_MACH * air.speed_of_sound_m_s;
        let (velocity_m_s, velocity_warning) = if requested > limit {
            let warning = SizingWarning::CruiseVelocityClamped {
                requested_kmh: mission.cruise_velocity_kmh,
                applied_kmh: ms_to_kmh(limit),
            };
            warn!(
                requested_kmh = mission.cruise_velocity_kmh,
                applied_kmh = ms_to_kmh(limit),
                "cruise velocity above Mach 0.6, clamping"
            );
            (limit, Some(warning))
        } else {
            (requested, None)
        };

        let fuselage = Fuselage::for_cabin(mission.number_of_passengers, mission.quality_level);
        Ok(Self {
            mission,
            air,
            velocity_m_s,
            velocity_warning,
            fuselage,
        })
    }

    pub fn mission(&self) -> &MissionInputs {
        &self.mission
    }

    pub fn atmosphere(&self) -> &Atmosphere {
        &self.air
    }

    pub fn fuselage(&self) -> &Fuselage {
        &self.fuselage
    }

    /// Cruise velocity after the Mach limit (m/s).
    pub fn velocity_m_s(&self) -> f64 {
        self.velocity_m_s
    }

    pub fn cruise_mach(&self) -> f64 {
        self.velocity_m_s / self.air.speed_of_sound_m_s
    }

    /// Closed-form take-off weight estimate (N) scaled by range and speed.
    pub fn initial_mtow_n(&self) -> f64 {
        let range_factor = 1.5 + (self.mission.required_range_km - 100.0) * 0.0025;
        let velocity_factor = 1.5 + (self.velocity_m_s - 100.0) * 0.0025;
        3.5 * range_factor
            * velocity_factor
            * f64::from(self.mission.number_of_passengers)
            * PASSENGER_MASS_KG
            * G0
    }

    /// Quarter-chord sweep (degrees): none below Mach 0.4, then 50° per unit Mach.
    pub fn wing_sweep_deg(&self) -> f64 {
        let mach = self.cruise_mach();
        if mach < 0.4 { 0.0 } else { (mach - 0.4) * 50.0 }
    }

    /// Build the full vehicle for one wing position and assumed mass/CG.
    pub fn configure(
        &self,
        wing_position: f64,
        assumed_mtow_n: f64,
        assumed_cg: Vector3,
    ) -> Result<PavConfiguration, VehicleError> {
        if !wing_position.is_finite() || wing_position <= 0.0 || wing_position >= 1.0 {
            return Err(VehicleError::InvalidState(format!(
                "wing position {wing_position} is outside the fuselage"
            )));
        }
        if !assumed_mtow_n.is_finite() || assumed_mtow_n <= 0.0 {
            return Err(VehicleError::InvalidState(format!(
                "assumed mass {assumed_mtow_n} N must be positive"
            )));
        }
        if !vector::is_finite(&assumed_cg) {
            return Err(VehicleError::InvalidState(
                "assumed centre of gravity is not finite".to_string(),
            ));
        }

        let mut warnings: Vec<SizingWarning> = self.velocity_warning.iter().cloned().collect();
        let fuselage = &self.fuselage;
        let air = &self.air;
        let velocity = self.velocity_m_s;
        let q = air.dynamic_pressure(velocity);

        let wing = self.size_wing(wing_position, assumed_mtow_n, q);
        let drag_coefficient =
            aero::total_drag_coefficient(DESIGN_LIFT_COEFFICIENT, wing.aspect_ratio);
        let drag_n = drag_coefficient * q * wing.area_m2();

        let ctx = TailContext {
            air,
            velocity_m_s: velocity,
            design_lift_coefficient: DESIGN_LIFT_COEFFICIENT,
            wing: &wing,
            fuselage,
            assumed_cg,
        };

        let horizontal_tail = HorizontalTail::size(&ctx);
        if horizontal_tail.floored {
            let computed = horizontal_tail
                .controllability_area_m2
                .max(horizontal_tail.stability_area_m2);
            warn!(
                computed_m2 = computed,
                applied_m2 = horizontal_tail.area_m2,
                wing_position,
                "horizontal tail area below minimum, flooring"
            );
            warnings.push(SizingWarning::HorizontalTailFloored {
                computed_m2: computed,
                applied_m2: horizontal_tail.area_m2,
            });
        }

        let propellers = CruisePropellers::size(
            air,
            drag_n,
            &wing,
            fuselage,
            self.mission.propeller_radius_m,
        );
        if propellers.is_span_limited() || propellers.count > propellers.allowed_count {
            warn!(
                required = propellers.required_count,
                applied = propellers.count,
                "cruise propellers do not fit on the wing, clamping count"
            );
            warnings.push(SizingWarning::PropellerCountClamped {
                required: propellers.required_count,
                applied: propellers.count,
            });
        }

        let station = SkidStation::place(
            fuselage,
            propulsion::ROTOR_RADIUS_M,
            self.mission.propeller_radius_m,
            self.mission.wheels_included,
        );
        let fin_root_x = landing_gear::vertical_tail_root_x(
            &horizontal_tail.surface,
            &station,
            empennage::VERTICAL_TAIL_SWEEP_DEG,
        );
        let vertical_tails = VerticalTails::size(
            &ctx,
            fin_root_x,
            station.lateral_m,
            station.vertical_m,
            propellers.thrust_per_propeller_n,
        );
        if vertical_tails.floored {
            let computed = vertical_tails
                .controllability_area_m2
                .max(vertical_tails.stability_area_m2)
                / 2.0;
            warn!(
                computed_m2 = computed,
                applied_m2 = vertical_tails.area_per_fin_m2,
                wing_position,
                "vertical tail area below minimum, flooring"
            );
            warnings.push(SizingWarning::VerticalTailFloored {
                computed_m2: computed,
                applied_m2: vertical_tails.area_per_fin_m2,
            });
        }

        let rotors = VtolRotors::size(air, assumed_mtow_n, wing.area_m2() + horizontal_tail.area_m2);
        if rotors.is_clamped() {
            warn!(
                computed = rotors.computed_count,
                applied = rotors.count,
                "VTOL rotor count outside feasible range, clamping"
            );
            warnings.push(SizingWarning::VtolRotorCountClamped {
                computed: rotors.computed_count,
                applied: rotors.count,
            });
        }

        let skids = SkidLayout::arrange(fuselage, &vertical_tails.fins[1], rotors.count, rotors.radius_m);
        let wheels = self
            .mission
            .wheels_included
            .then(|| Wheels::arrange(assumed_mtow_n, &skids, &station));

        let battery = Battery::size(drag_n, velocity, km_to_m(self.mission.required_range_km));

        let mass = self.mass_breakdown(MassInputs {
            wing: &wing,
            horizontal_tail: &horizontal_tail,
            vertical_tails: &vertical_tails,
            propellers: &propellers,
            station: &station,
            skids: &skids,
            wheels: wheels.as_ref(),
            battery: &battery,
        });
        let centre_of_gravity = mass.centre_of_gravity.ok_or(VehicleError::DegenerateMass)?;
        if !mass.total_mass_kg.is_finite() || !vector::is_finite(&centre_of_gravity) {
            return Err(VehicleError::DegenerateMass);
        }

        Ok(PavConfiguration {
            wing_position,
            assumed_mtow_n,
            assumed_cg,
            cruise_velocity_m_s: velocity,
            cruise_mach: self.cruise_mach(),
            drag_coefficient,
            fuselage: fuselage.clone(),
            wing,
            horizontal_tail,
            vertical_tails,
            propellers,
            rotors,
            skid_station: station,
            skids,
            wheels,
            battery,
            resulting_mass_n: mass.total_weight_n(),
            resulting_cg: centre_of_gravity,
            mass,
            baggage_allowance_kg: self.mission.baggage_allowance_kg(),
            warnings,
        })
    }

    fn size_wing(&self, wing_position: f64, mtow_n: f64, q: f64) -> LiftingSurface {
        let area = mtow_n / (q * DESIGN_LIFT_COEFFICIENT);
        let span = (INTENDED_ASPECT_RATIO * area).sqrt().min(self.mission.max_span_m);
        let root_z = WING_HEIGHT_RATIO * self.fuselage.cabin_height_m;
        LiftingSurface {
            span_m: span,
            aspect_ratio: span * span / area,
            taper_ratio: WING_TAPER,
            sweep_deg: self.wing_sweep_deg(),
            // High wings get 3°, low wings 1°.
            dihedral_deg: if root_z > 0.0 { 3.0 } else { 1.0 },
            root: [wing_position * self.fuselage.length_m, 0.0, root_z],
            mirrored: true,
        }
    }

    fn mass_breakdown(&self, parts: MassInputs<'_>) -> MassBreakdown {
        let fuselage = &self.fuselage;
        let mut components = vec![
            Component::single(
                ComponentKind::Wing,
                SURFACE_MASS_PER_AREA * parts.wing.area_m2(),
                parts.wing.centre_of_gravity(),
            ),
            Component::single(
                ComponentKind::HorizontalTail,
                SURFACE_MASS_PER_AREA * parts.horizontal_tail.area_m2,
                parts.horizontal_tail.surface.centre_of_gravity(),
            ),
            Component::single(
                ComponentKind::Fuselage,
                FUSELAGE_MASS_PER_LENGTH * fuselage.length_m,
                [fuselage.length_m / 2.0, 0.0, 0.0],
            ),
            Component::single(
                ComponentKind::Battery,
                parts.battery.mass_kg,
                [0.25 * fuselage.length_m, 0.0, 0.0],
            ),
            Component::single(
                ComponentKind::Payload,
                f64::from(self.mission.number_of_passengers) * PASSENGER_MASS_KG
                    + self.mission.baggage_allowance_kg(),
                [fuselage.cabin_centre_x(), 0.0, 0.0],
            ),
        ];

        let fin_points: Vec<Vector3> = parts
            .vertical_tails
            .fins
            .iter()
            .map(LiftingSurface::centre_of_gravity)
            .collect();
        let lateral = parts.station.lateral_m;
        let vertical = parts.station.vertical_m;
        let skid_points: Vec<Vector3> = [-lateral, lateral]
            .iter()
            .map(|y| [parts.skids.centre_x_m(), *y, vertical])
            .collect();
        let rotor_points: Vec<Vector3> = [-lateral, lateral]
            .into_iter()
            .flat_map(|y| {
                parts
                    .skids
                    .rotor_stations_x
                    .iter()
                    .map(move |x| [*x, y, vertical])
            })
            .collect();
        let wheel_points: &[Vector3] = parts.wheels.map(|w| w.positions.as_slice()).unwrap_or(&[]);

        let groups = [
            Component::at_points(
                ComponentKind::VerticalTail,
                SURFACE_MASS_PER_AREA * parts.vertical_tails.area_per_fin_m2,
                &fin_points,
            ),
            Component::at_points(
                ComponentKind::CruisePropeller,
                PROPELLER_MASS_KG,
                &parts.propellers.positions,
            ),
            Component::at_points(ComponentKind::VtolRotor, PROPELLER_MASS_KG, &rotor_points),
            Component::at_points(ComponentKind::Skid, SKID_MASS_KG, &skid_points),
            Component::at_points(ComponentKind::Wheel, WHEEL_MASS_KG, wheel_points),
        ];
        components.extend(groups.into_iter().flatten());

        MassBreakdown::from_components(components)
    }
}

struct MassInputs<'a> {
    wing: &'a LiftingSurface,
    horizontal_tail: &'a HorizontalTail,
    vertical_tails: &'a VerticalTails,
    propellers: &'a CruisePropellers,
    station: &'a SkidStation,
    skids: &'a SkidLayout,
    wheels: Option<&'a Wheels>,
    battery: &'a Battery,
}

fn validate_mission(mission: &MissionInputs) -> Result<(), VehicleError> {
    let passengers = mission.number_of_passengers;
    if passengers == 0 || passengers > MAX_PASSENGERS {
        return Err(VehicleError::InvalidMission(format!(
            "number of passengers must be between 1 and {MAX_PASSENGERS}, got {passengers}"
        )));
    }
    let positive = [
        ("required range", mission.required_range_km),
        ("maximum span", mission.max_span_m),
        ("cruise velocity", mission.cruise_velocity_kmh),
        ("propeller radius", mission.propeller_radius_m),
        ("allowable mass difference", mission.allowable_mass_difference_n),
    ];
    for (label, value) in positive {
        if !value.is_finite() || value <= 0.0 {
            return Err(VehicleError::InvalidMission(format!(
                "{label} must be positive, got {value}"
            )));
        }
    }
    Ok(())
}

/// One complete vehicle derived from a wing position and an assumed mass/CG.
#[derive(Debug, Clone, Serialize)]
pub struct PavConfiguration {
    pub wing_position: f64,
    pub assumed_mtow_n: f64,
    pub assumed_cg: Vector3,
    pub cruise_velocity_m_s: f64,
    pub cruise_mach: f64,
    pub drag_coefficient: f64,
    pub fuselage: Fuselage,
    pub wing: LiftingSurface,
    pub horizontal_tail: HorizontalTail,
    pub vertical_tails: VerticalTails,
    pub propellers: CruisePropellers,
    pub rotors: VtolRotors,
    pub skid_station: SkidStation,
    pub skids: SkidLayout,
    pub wheels: Option<Wheels>,
    pub battery: Battery,
    pub mass: MassBreakdown,
    pub resulting_mass_n: f64,
    pub resulting_cg: Vector3,
    pub baggage_allowance_kg: f64,
    pub warnings: Vec<SizingWarning>,
}

impl PavConfiguration {
    pub fn horizontal_tail_area_m2(&self) -> f64 {
        self.horizontal_tail.area_m2
    }

    /// Area of one vertical fin.
    pub fn vertical_tail_area_m2(&self) -> f64 {
        self.vertical_tails.area_per_fin_m2
    }

    pub fn wing_span_m(&self) -> f64 {
        self.wing.span_m
    }

    pub fn fuselage_length_m(&self) -> f64 {
        self.fuselage.length_m
    }

    pub fn battery_energy_kwh(&self) -> f64 {
        self.battery.energy_kwh()
    }

    pub fn resulting_mass_kg(&self) -> f64 {
        newtons_to_kg(self.resulting_mass_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pav_config::QualityLevel;

    #[test]
    fn rejects_empty_cabin() {
        let mission = MissionInputs {
            number_of_passengers: 0,
            ..MissionInputs::default()
        };
        assert!(matches!(
            ParametricPav::new(mission),
            Err(VehicleError::InvalidMission(_))
        ));
    }

    #[test]
    fn rejects_twenty_passengers() {
        let mission = MissionInputs {
            number_of_passengers: 20,
            ..MissionInputs::default()
        };
        assert!(ParametricPav::new(mission).is_err());
    }

    #[test]
    fn rejects_negative_range() {
        let mission = MissionInputs {
            required_range_km: -5.0,
            ..MissionInputs::default()
        };
        assert!(ParametricPav::new(mission).is_err());
    }

    #[test]
    fn clamps_supersonic_request_to_mach_limit() {
        let mission = MissionInputs {
            cruise_velocity_kmh: 1_200.0,
            ..MissionInputs::default()
        };
        let pav = ParametricPav::new(mission).unwrap();
        assert!((pav.cruise_mach() - 0.6).abs() < 1e-9);
        let config = pav
            .configure(DEFAULT_WING_POSITION, pav.initial_mtow_n(), DEFAULT_CENTRE_OF_GRAVITY)
            .unwrap();
        assert!(matches!(
            config.warnings.first(),
            Some(SizingWarning::CruiseVelocityClamped { .. })
        ));
        assert!(config.wing.sweep_deg > 9.99);
    }

    #[test]
    fn initial_guess_scales_with_passengers() {
        let two = ParametricPav::new(MissionInputs {
            number_of_passengers: 2,
            quality_level: QualityLevel::Economy,
            ..MissionInputs::default()
        })
        .unwrap();
        let four = ParametricPav::new(MissionInputs {
            quality_level: QualityLevel::Economy,
            ..MissionInputs::default()
        })
        .unwrap();
        assert!((four.initial_mtow_n() / two.initial_mtow_n() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_wing_outside_fuselage() {
        let pav = ParametricPav::new(MissionInputs::default()).unwrap();
        assert!(matches!(
            pav.configure(1.2, pav.initial_mtow_n(), DEFAULT_CENTRE_OF_GRAVITY),
            Err(VehicleError::InvalidState(_))
        ));
        assert!(pav.configure(0.4, f64::NAN, DEFAULT_CENTRE_OF_GRAVITY).is_err());
    }
}
