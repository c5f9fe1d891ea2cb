//! Geographic coordinates and heading math.
//!
//! Provides the [`Coordinate`] value type used throughout the crate and the
//! great-circle bearing calculation used to derive the viewer heading.

use std::fmt;

/// Fallback position used before a track is loaded and after a reset.
pub const DEFAULT_POSITION: Coordinate = Coordinate {
    lat: 48.85376,
    lng: 2.347237,
};

/// A geographic position in decimal degrees.
///
/// Ranges are not validated here; tracks are expected to come from a parser
/// that already produced sensible values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns true if both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        DEFAULT_POSITION
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Initial great-circle bearing from `from` to `to`.
///
/// Returns degrees in `[0, 360)`, where 0 = North and 90 = East. Identical
/// points yield `0.0`.
pub fn compute_heading(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlng = (to.lng - from.lng).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();

    normalize_heading(y.atan2(x).to_degrees())
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_heading(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to the modulus for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
