//! Component mass bookkeeping and the resulting centre of gravity.

use std::fmt;

use pav_core::units::kg_to_newtons;
use pav_core::vector::{self, Vector3};
use serde::Serialize;

/// Mass per unit planform area of wing and tail surfaces (kg/m²).
pub const SURFACE_MASS_PER_AREA: f64 = 40.0;
/// Fuselage mass per metre of length (kg/m).
pub const FUSELAGE_MASS_PER_LENGTH: f64 = 50.0;
pub const PROPELLER_MASS_KG: f64 = 15.0;
pub const SKID_MASS_KG: f64 = 25.0;
pub const WHEEL_MASS_KG: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Wing,
    HorizontalTail,
    VerticalTail,
    Fuselage,
    CruisePropeller,
    VtolRotor,
    Skid,
    Wheel,
    Battery,
    Payload,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComponentKind::Wing => "wing",
            ComponentKind::HorizontalTail => "horizontal tail",
            ComponentKind::VerticalTail => "vertical tail",
            ComponentKind::Fuselage => "fuselage",
            ComponentKind::CruisePropeller => "cruise propeller",
            ComponentKind::VtolRotor => "VTOL rotor",
            ComponentKind::Skid => "skid",
            ComponentKind::Wheel => "wheel",
            ComponentKind::Battery => "battery",
            ComponentKind::Payload => "payload",
        };
        f.write_str(label)
    }
}

/// A group of identical parts. `cg` is the centroid of the group.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub kind: ComponentKind,
    pub unit_mass_kg: f64,
    pub cg: Vector3,
    pub multiplicity: u32,
}

impl Component {
    pub fn single(kind: ComponentKind, mass_kg: f64, cg: Vector3) -> Self {
        Self {
            kind,
            unit_mass_kg: mass_kg,
            cg,
            multiplicity: 1,
        }
    }

    /// Group of identical parts placed at `points`; `None` when there are none.
    pub fn at_points(kind: ComponentKind, unit_mass_kg: f64, points: &[Vector3]) -> Option<Self> {
        let cg = vector::centroid(points)?;
        Some(Self {
            kind,
            unit_mass_kg,
            cg,
            multiplicity: points.len() as u32,
        })
    }

    pub fn total_mass_kg(&self) -> f64 {
        self.unit_mass_kg * f64::from(self.multiplicity)
    }
}

/// Summed component masses with the mass-weighted centre of gravity.
#[derive(Debug, Clone, Serialize)]
pub struct MassBreakdown {
    pub components: Vec<Component>,
    pub total_mass_kg: f64,
    /// `None` when the total mass is not positive.
    pub centre_of_gravity: Option<Vector3>,
}

impl MassBreakdown {
    pub fn from_components(components: Vec<Component>) -> Self {
        let total: f64 = components.iter().map(Component::total_mass_kg).sum();
        let moment = components.iter().fold(vector::ZERO, |acc, c| {
            vector::add(&acc, &vector::scale(&c.cg, c.total_mass_kg()))
        });
        let centre_of_gravity = (total > 0.0).then(|| vector::scale(&moment, 1.0 / total));
        Self {
            components,
            total_mass_kg: total,
            centre_of_gravity,
        }
    }

    pub fn total_weight_n(&self) -> f64 {
        kg_to_newtons(self.total_mass_kg)
    }

    /// Mass of every component of the given kind.
    pub fn mass_of(&self, kind: ComponentKind) -> f64 {
        self.components
            .iter()
            .filter(|c| c.kind == kind)
            .map(Component::total_mass_kg)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_of_gravity_is_mass_weighted() {
        let breakdown = MassBreakdown::from_components(vec![
            Component::single(ComponentKind::Fuselage, 100.0, [0.0, 0.0, 0.0]),
            Component::single(ComponentKind::Battery, 300.0, [4.0, 0.0, 0.0]),
        ]);
        assert_eq!(breakdown.total_mass_kg, 400.0);
        let cg = breakdown.centre_of_gravity.unwrap();
        assert!((cg[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn grouped_parts_count_once_per_point() {
        let rotors = Component::at_points(
            ComponentKind::VtolRotor,
            15.0,
            &[[1.0, -1.0, 0.0], [1.0, 1.0, 0.0], [3.0, -1.0, 0.0], [3.0, 1.0, 0.0]],
        )
        .unwrap();
        assert_eq!(rotors.multiplicity, 4);
        assert_eq!(rotors.total_mass_kg(), 60.0);
        assert!((rotors.cg[0] - 2.0).abs() < 1e-12);
        assert!(rotors.cg[1].abs() < 1e-12);
    }

    #[test]
    fn empty_groups_are_skipped() {
        assert!(Component::at_points(ComponentKind::Wheel, 20.0, &[]).is_none());
        let empty = MassBreakdown::from_components(Vec::new());
        assert!(empty.centre_of_gravity.is_none());
    }
}
