//! Trapezoidal lifting-surface geometry.

use pav_core::vector::Vector3;
use serde::Serialize;

/// Straight-tapered lifting surface positioned by its root quarter-chord point.
///
/// `mirrored` surfaces (wing, horizontal tail) carry `span` tip to tip; a
/// single vertical fin carries `span` root to tip.
#[derive(Debug, Clone, Serialize)]
pub struct LiftingSurface {
    pub span_m: f64,
    pub aspect_ratio: f64,
    pub taper_ratio: f64,
    /// Quarter-chord sweep (degrees).
    pub sweep_deg: f64,
    pub dihedral_deg: f64,
    pub root: Vector3,
    pub mirrored: bool,
}

impl LiftingSurface {
    pub fn area_m2(&self) -> f64 {
        self.span_m * self.span_m / self.aspect_ratio
    }

    pub fn root_chord_m(&self) -> f64 {
        2.0 * self.area_m2() / (self.span_m * (1.0 + self.taper_ratio))
    }

    pub fn tip_chord_m(&self) -> f64 {
        self.root_chord_m() * self.taper_ratio
    }

    /// Length of the span measured from the root to one tip.
    pub fn semi_span_m(&self) -> f64 {
        if self.mirrored {
            self.span_m / 2.0
        } else {
            self.span_m
        }
    }

    pub fn mean_aerodynamic_chord_m(&self) -> f64 {
        let lambda = self.taper_ratio;
        2.0 / 3.0 * self.root_chord_m() * (1.0 + lambda + lambda * lambda) / (1.0 + lambda)
    }

    /// Spanwise station of the mean aerodynamic chord, measured from the root.
    pub fn mac_station_m(&self) -> f64 {
        let root = self.root_chord_m();
        let tip = self.tip_chord_m();
        self.semi_span_m() / 3.0 * (root + 2.0 * tip) / (root + tip)
    }

    /// Local chord at a fraction `eta` of the semi-span.
    pub fn chord_at(&self, eta: f64) -> f64 {
        let root = self.root_chord_m();
        root - (root - self.tip_chord_m()) * eta
    }

    pub fn sweep_rad(&self) -> f64 {
        self.sweep_deg.to_radians()
    }

    /// Longitudinal position of the quarter-chord line at spanwise station `y`.
    pub fn quarter_chord_x_at(&self, y: f64) -> f64 {
        self.root[0] + self.sweep_rad().tan() * y
    }

    /// Aerodynamic centre, taken at the quarter chord of the MAC.
    pub fn aerodynamic_centre_x(&self) -> f64 {
        self.quarter_chord_x_at(self.mac_station_m())
    }

    pub fn mac_leading_edge_x(&self) -> f64 {
        self.aerodynamic_centre_x() - self.mean_aerodynamic_chord_m() / 4.0
    }

    /// Height of the MAC station above the root, from dihedral.
    pub fn mac_height_m(&self) -> f64 {
        self.root[2] + self.dihedral_deg.to_radians().tan() * self.mac_station_m()
    }

    /// Point used as the structural centre of gravity of one surface,
    /// at 40% of the MAC on the symmetry plane for mirrored surfaces.
    pub fn centre_of_gravity(&self) -> Vector3 {
        let x = self.mac_leading_edge_x() + 0.4 * self.mean_aerodynamic_chord_m();
        if self.mirrored {
            [x, 0.0, self.mac_height_m()]
        } else {
            // Fins stand upright: the MAC station is measured along z.
            [x, self.root[1], self.root[2] + self.mac_station_m()]
        }
    }
}
