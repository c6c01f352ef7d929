//! Skids carrying the VTOL rotors and the optional road wheels.

use pav_core::constants::G0;
use pav_core::units::INCH_TO_M;
use pav_core::vector::Vector3;
use serde::Serialize;

use crate::fuselage::Fuselage;
use crate::geometry::LiftingSurface;

/// Required gap between rotors relative to their diameter.
pub const ROTOR_SEPARATION_FACTOR: f64 = 1.2;
/// Thickness-to-chord ratio of the fin and connection profiles.
const PROFILE_THICKNESS: f64 = 0.12;
pub const WHEEL_RADIUS_M: f64 = 9.0 * INCH_TO_M;
pub const WHEEL_WIDTH_M: f64 = 5.7 * INCH_TO_M;
const LANDING_LOAD_FACTOR: f64 = 3.0;
/// Maximum static load carried by one tyre (kg).
const MAX_LOAD_PER_TYRE_KG: f64 = 4_086.0;
const MIN_WHEELS: u32 = 4;

/// Lateral and vertical placement of the two skids.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SkidStation {
    /// Distance of each skid from the symmetry plane (m).
    pub lateral_m: f64,
    pub vertical_m: f64,
}

impl SkidStation {
    /// Keeps rotor tips clear of the cabin sides and leaves ground clearance
    /// below the fuselage or the cruise propeller tips. Wheels lift the skids
    /// by the wheel radius plus the strut length.
    pub fn place(fuselage: &Fuselage, rotor_radius_m: f64, propeller_radius_m: f64, wheels: bool) -> Self {
        let h = fuselage.cabin_height_m;
        let mut vertical = ((crate::fuselage::NOSE_HEIGHT_RATIO - 0.2) * h - propeller_radius_m)
            .min(-(0.5 + 0.2) * h);
        if wheels {
            vertical += WHEEL_RADIUS_M + strut_length_m();
        }
        Self {
            lateral_m: 0.7 * fuselage.cabin_width_m + rotor_radius_m,
            vertical_m: vertical,
        }
    }
}

fn strut_length_m() -> f64 {
    1.2 * WHEEL_RADIUS_M
}

/// Root of the vertical fins: where the skid meets the swept horizontal tail
/// line, walked down the fin sweep to skid height.
pub fn vertical_tail_root_x(
    horizontal_tail: &LiftingSurface,
    station: &SkidStation,
    fin_sweep_deg: f64,
) -> f64 {
    let drop = horizontal_tail.root[2] - station.vertical_m;
    horizontal_tail.root[0] + station.lateral_m * horizontal_tail.sweep_rad().tan()
        - drop * fin_sweep_deg.to_radians().tan()
}

/// Strut joining the fuselage nose section to the front of each skid.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FrontConnection {
    pub x_m: f64,
    pub z_m: f64,
    pub chord_m: f64,
}

/// Skid dimensions and the longitudinal stations of the rotors on one skid.
#[derive(Debug, Clone, Serialize)]
pub struct SkidLayout {
    pub width_m: f64,
    pub height_m: f64,
    pub length_m: f64,
    pub start_x_m: f64,
    pub front_connection: FrontConnection,
    /// Free length between the front connection and the fin root.
    pub gap_m: f64,
    pub rotors_front: u32,
    pub rotors_middle: u32,
    pub rotors_rear: u32,
    pub rotor_stations_x: Vec<f64>,
}

impl SkidLayout {
    /// Distributes half of `rotor_count` along one skid: as many as fit
    /// between the connection and the fin, the remainder split ahead
    /// (rounded up) and behind.
    pub fn arrange(
        fuselage: &Fuselage,
        fin: &LiftingSurface,
        rotor_count: u32,
        rotor_radius_m: f64,
    ) -> Self {
        let fin_root_chord = fin.root_chord_m();
        let width = (1.05 * fin_root_chord * PROFILE_THICKNESS).max(0.15);
        let height = (0.9 * width).min(0.2);
        let front_connection = front_connection(fuselage, height);

        let connection_end = front_connection.x_m + 0.75 * front_connection.chord_m;
        let gap = fin.root[0] - fin_root_chord / 4.0 - connection_end;
        let diameter = 2.0 * rotor_radius_m;

        let per_side = rotor_count / 2;
        let mut fit = 1_u32;
        while fit <= per_side && gap / (f64::from(fit) * diameter) > ROTOR_SEPARATION_FACTOR {
            fit += 1;
        }
        let middle = (fit - 1).min(per_side);
        let remaining = per_side - middle;
        let front = remaining.div_ceil(2);
        let rear = remaining - front;

        let length = gap.max(0.0)
            + (front_connection.chord_m + fin_root_chord) * ROTOR_SEPARATION_FACTOR
            + f64::from(remaining) * diameter * ROTOR_SEPARATION_FACTOR
            + 0.1;
        let start_x = front_connection.x_m - (0.5 + f64::from(front)) * diameter;

        let mut stations = Vec::with_capacity(per_side as usize);
        for index in 0..front {
            stations.push(
                start_x
                    + f64::from(1 + 2 * index) * ROTOR_SEPARATION_FACTOR * rotor_radius_m,
            );
        }
        for index in 0..middle {
            stations.push(connection_end + (0.5 + f64::from(index)) * gap / f64::from(middle));
        }
        let aft_of_fin = fin.root[0] + 0.75 * fin_root_chord * ROTOR_SEPARATION_FACTOR;
        for index in 0..rear {
            stations.push(
                aft_of_fin + f64::from(1 + 2 * index) * ROTOR_SEPARATION_FACTOR * rotor_radius_m,
            );
        }

        Self {
            width_m: width,
            height_m: height,
            length_m: length,
            start_x_m: start_x,
            front_connection,
            gap_m: gap,
            rotors_front: front,
            rotors_middle: middle,
            rotors_rear: rear,
            rotor_stations_x: stations,
        }
    }

    pub fn centre_x_m(&self) -> f64 {
        self.start_x_m + self.length_m / 2.0
    }
}

/// Ahead of the cabin doors but at least 20% of the nose length aft of the tip.
fn front_connection(fuselage: &Fuselage, skid_height_m: f64) -> FrontConnection {
    let chord = (skid_height_m * 0.8 / PROFILE_THICKNESS).min(0.5);
    let nose = fuselage.nose_length_m;
    FrontConnection {
        x_m: (0.75 * nose - 0.75 * chord).max(0.2 * nose),
        z_m: (2.0 * crate::fuselage::NOSE_HEIGHT_RATIO - 1.0) * fuselage.cabin_height_m / 6.0,
        chord_m: chord,
    }
}

/// Road wheels mounted on struts below both skids.
#[derive(Debug, Clone, Serialize)]
pub struct Wheels {
    /// Count demanded by the landing load.
    pub required_count: u32,
    pub per_side: u32,
    pub radius_m: f64,
    pub width_m: f64,
    pub positions: Vec<Vector3>,
}

impl Wheels {
    pub fn arrange(mtow_n: f64, skids: &SkidLayout, station: &SkidStation) -> Self {
        let expected = LANDING_LOAD_FACTOR * mtow_n / (MAX_LOAD_PER_TYRE_KG * G0);
        let required = if expected >= f64::from(MIN_WHEELS) {
            2 * (expected / 2.0).ceil() as u32
        } else {
            MIN_WHEELS
        };

        let usable_length = 0.8 * skids.length_m;
        let per_side = if f64::from(required) * WHEEL_RADIUS_M < usable_length {
            required / 2
        } else {
            (usable_length / (2.0 * WHEEL_RADIUS_M)).ceil().max(1.0) as u32
        };

        let rod_radius = (skids.width_m * 0.4).min(0.03);
        let outboard = station.lateral_m + skids.width_m * 0.7 + rod_radius + WHEEL_WIDTH_M
            - rod_radius / 2.0;
        let z = station.vertical_m - strut_length_m();

        let mut positions = Vec::with_capacity(2 * per_side as usize);
        for side in [-1.0, 1.0] {
            for index in 0..per_side {
                let x = skids.start_x_m
                    + (f64::from(index) + 0.5) / f64::from(per_side) * skids.length_m;
                positions.push([x, side * outboard, z]);
            }
        }

        Self {
            required_count: required,
            per_side,
            radius_m: WHEEL_RADIUS_M,
            width_m: WHEEL_WIDTH_M,
            positions,
        }
    }

    pub fn count(&self) -> u32 {
        2 * self.per_side
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pav_config::QualityLevel;

    fn fin_at(x: f64) -> LiftingSurface {
        LiftingSurface {
            span_m: 2.0,
            aspect_ratio: 2.0,
            taper_ratio: 0.6,
            sweep_deg: 35.0,
            dihedral_deg: 0.0,
            root: [x, 1.5, -0.6],
            mirrored: false,
        }
    }

    #[test]
    fn wheels_raise_the_skids() {
        let fuselage = Fuselage::for_cabin(4, QualityLevel::Business);
        let bare = SkidStation::place(&fuselage, 0.4, 0.3, false);
        let wheeled = SkidStation::place(&fuselage, 0.4, 0.3, true);
        assert!(wheeled.vertical_m > bare.vertical_m);
        assert!((bare.lateral_m - (0.7 * 1.6 + 0.4)).abs() < 1e-12);
    }

    #[test]
    fn every_rotor_gets_a_station() {
        let fuselage = Fuselage::for_cabin(4, QualityLevel::Business);
        for count in [4_u32, 10, 16] {
            let layout = SkidLayout::arrange(&fuselage, &fin_at(3.5), count, 0.4);
            assert_eq!(layout.rotor_stations_x.len() as u32, count / 2);
            assert_eq!(
                layout.rotors_front + layout.rotors_middle + layout.rotors_rear,
                count / 2
            );
            assert!(layout.length_m > 0.0);
        }
    }

    #[test]
    fn short_gap_pushes_rotors_outside() {
        let fuselage = Fuselage::for_cabin(4, QualityLevel::Business);
        let layout = SkidLayout::arrange(&fuselage, &fin_at(1.0), 6, 0.4);
        assert_eq!(layout.rotors_middle, 0);
        assert_eq!(layout.rotors_front, 2);
        assert_eq!(layout.rotors_rear, 1);
    }

    #[test]
    fn light_vehicles_get_four_wheels() {
        let fuselage = Fuselage::for_cabin(4, QualityLevel::Business);
        let station = SkidStation::place(&fuselage, 0.4, 0.3, true);
        let layout = SkidLayout::arrange(&fuselage, &fin_at(3.5), 8, 0.4);
        let wheels = Wheels::arrange(25_000.0, &layout, &station);
        assert_eq!(wheels.required_count, 4);
        assert_eq!(wheels.count(), 4);
        assert_eq!(wheels.positions.len(), 4);
    }
}
