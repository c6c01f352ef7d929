//! Cabin layout and outer fuselage dimensions.

use pav_config::QualityLevel;
use serde::Serialize;

/// Minimum cabin height so passengers can sit upright (m).
const MIN_CABIN_HEIGHT_M: f64 = 1.6;
/// Extra cabin width for walls and trim (m).
const CABIN_WIDTH_ALLOWANCE_M: f64 = 0.2;
/// Vertical offset of the nose tip as a fraction of cabin height.
pub const NOSE_HEIGHT_RATIO: f64 = -0.2;

/// Fuselage dimensions derived from passenger count and cabin class.
#[derive(Debug, Clone, Serialize)]
pub struct Fuselage {
    pub seat_pitch_m: f64,
    pub seat_width_m: f64,
    pub seats_abreast: u32,
    pub rows: u32,
    pub cabin_width_m: f64,
    pub cabin_height_m: f64,
    pub nose_length_m: f64,
    pub cabin_length_m: f64,
    pub tail_length_m: f64,
    pub length_m: f64,
}

impl Fuselage {
    pub fn for_cabin(passengers: u32, quality: QualityLevel) -> Self {
        let (seat_pitch, seat_width) = match quality {
            QualityLevel::Business => (1.4, 0.7),
            QualityLevel::Economy => (0.95, 0.5),
        };
        let seats_abreast: u32 = if passengers < 4 { 1 } else { 2 };
        let rows = passengers.div_ceil(seats_abreast);

        let cabin_width = seat_width * f64::from(seats_abreast) + CABIN_WIDTH_ALLOWANCE_M;
        let cabin_height = cabin_width.max(MIN_CABIN_HEIGHT_M);

        let nose_length = if passengers <= 4 {
            1.0
        } else {
            0.6 * f64::from(seats_abreast)
        };
        // The cabin reaches into the aft quarter of the nose cone.
        let cabin_length = f64::from(rows) * seat_pitch - nose_length / 4.0;
        let tail_length = if passengers <= 4 {
            1.5
        } else {
            1.0 + f64::from(seats_abreast) / 2.0
        };

        Self {
            seat_pitch_m: seat_pitch,
            seat_width_m: seat_width,
            seats_abreast,
            rows,
            cabin_width_m: cabin_width,
            cabin_height_m: cabin_height,
            nose_length_m: nose_length,
            cabin_length_m: cabin_length,
            tail_length_m: tail_length,
            length_m: nose_length + cabin_length + tail_length,
        }
    }

    /// Longitudinal station of the cabin centre (m from the nose).
    pub fn cabin_centre_x(&self) -> f64 {
        0.75 * self.nose_length_m + self.cabin_length_m / 2.0
    }

    /// Height of the nose tip relative to the fuselage reference line (m).
    pub fn nose_height_m(&self) -> f64 {
        NOSE_HEIGHT_RATIO * self.cabin_height_m
    }
}
