//! Track input boundary.
//!
//! Track files are parsed by an external parser (GPX, FIT, ...) that yields
//! ordered `lat`/`lon` pairs. This module turns those pairs into a route,
//! rejecting input the navigation core cannot use.

use crate::coord::Coordinate;
use crate::route::{RouteError, RouteResult};

/// A point as produced by a track-file parser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<TrackPoint> for Coordinate {
    fn from(point: TrackPoint) -> Self {
        Coordinate::new(point.lat, point.lon)
    }
}

/// Convert parser output into route coordinates.
///
/// Fails with [`RouteError::InvalidRoute`] if the track is empty or any
/// point is not a finite number.
pub fn route_from_track<I>(points: I) -> RouteResult<Vec<Coordinate>>
where
    I: IntoIterator<Item = TrackPoint>,
{
    let route = points
        .into_iter()
        .enumerate()
        .map(|(i, point)| {
            let coordinate = Coordinate::from(point);
            if coordinate.is_finite() {
                Ok(coordinate)
            } else {
                Err(RouteError::InvalidRoute(format!(
                    "point {} has a non-numeric coordinate ({}, {})",
                    i, point.lat, point.lon
                )))
            }
        })
        .collect::<RouteResult<Vec<_>>>()?;

    if route.is_empty() {
        return Err(RouteError::InvalidRoute(
            "track contains no points".to_string(),
        ));
    }

    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon_becomes_lng() {
        let c: Coordinate = TrackPoint::new(48.1, 2.3).into();
        assert_eq!(c, Coordinate::new(48.1, 2.3));
    }

    #[test]
    fn test_route_from_track_keeps_order() {
        let points = vec![
            TrackPoint::new(1.0, 10.0),
            TrackPoint::new(2.0, 20.0),
            TrackPoint::new(3.0, 30.0),
        ];

        let route = route_from_track(points).unwrap();
        assert_eq!(
            route,
            vec![
                Coordinate::new(1.0, 10.0),
                Coordinate::new(2.0, 20.0),
                Coordinate::new(3.0, 30.0),
            ]
        );
    }

    #[test]
    fn test_empty_track_is_invalid() {
        let result = route_from_track(Vec::new());
        assert!(matches!(result, Err(RouteError::InvalidRoute(_))));
    }

    #[test]
    fn test_nan_point_is_invalid() {
        let points = vec![TrackPoint::new(1.0, 1.0), TrackPoint::new(f64::NAN, 1.0)];

        match route_from_track(points) {
            Err(RouteError::InvalidRoute(msg)) => assert!(msg.contains("point 1")),
            other => panic!("Expected InvalidRoute, got {:?}", other),
        }
    }

    #[test]
    fn test_infinite_point_is_invalid() {
        let points = vec![TrackPoint::new(1.0, f64::INFINITY)];
        assert!(route_from_track(points).is_err());
    }
}
