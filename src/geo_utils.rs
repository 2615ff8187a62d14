//! # Geographic Utilities
//!
//! Small geographic helpers shared by the GeoJSON and POI modules.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`geodesic_distance`] | Distance between two GPS points on the WGS84 ellipsoid |
//! | [`line_string`] | GeoJSON-ordered positions as a `geo::LineString` |
//! | [`line_bounds`] | Bounding box of a line, in [`Bounds`] form |
//!
//! All coordinates are WGS84 degrees.

use geo::{BoundingRect, Coord, Distance, Geodesic, LineString, Point};

use crate::{Bounds, GpsPoint};

/// Geodesic distance between two GPS points in meters, measured on the
/// WGS84 ellipsoid (Karney's algorithm).
///
/// ```rust
/// use running_stats::{GpsPoint, geo_utils};
///
/// let dalian = GpsPoint::new(38.914, 121.614);
/// let shenyang = GpsPoint::new(41.805, 123.431);
/// let km = geo_utils::geodesic_distance(&dalian, &shenyang) / 1000.0;
/// assert!((km - 355.0).abs() < 10.0);
/// ```
#[inline]
pub fn geodesic_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Geodesic::distance(point1, point2)
}

/// Build a `geo::LineString` from `[longitude, latitude]` positions.
pub fn line_string(positions: &[[f64; 2]]) -> LineString<f64> {
    LineString::new(
        positions
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect(),
    )
}

/// Bounding box of a line. `None` when the line has no points.
pub fn line_bounds(line: &LineString<f64>) -> Option<Bounds> {
    line.bounding_rect().map(|rect| Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geodesic_distance_same_point() {
        let p = GpsPoint::new(38.862, 121.514);
        assert_eq!(geodesic_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_geodesic_short_hop() {
        // 0.001 degrees of latitude is 111.01 m on the ellipsoid here;
        // a spherical earth would give 111.19 m
        let a = GpsPoint::new(38.862, 121.514);
        let b = GpsPoint::new(38.863, 121.514);
        let d = geodesic_distance(&a, &b);
        assert!((d - 111.01).abs() < 0.05, "got {d}");
    }

    #[test]
    fn test_line_bounds() {
        let line = line_string(&[[121.51, 38.86], [121.53, 38.85], [121.52, 38.87]]);
        let bounds = line_bounds(&line).unwrap();
        assert_eq!(bounds.min_lng, 121.51);
        assert_eq!(bounds.max_lng, 121.53);
        assert_eq!(bounds.min_lat, 38.85);
        assert_eq!(bounds.max_lat, 38.87);
    }

    #[test]
    fn test_line_bounds_empty() {
        assert!(line_bounds(&line_string(&[])).is_none());
    }
}
