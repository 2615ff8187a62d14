//! # Points of Interest
//!
//! Tags activities with the named places their track passes.
//!
//! A point of interest is "on" a track when some track point lies inside a
//! small degree window around it and is also within a walking distance
//! measured on the WGS84 ellipsoid. The degree window is a cheap rejection
//! test; the geodesic check decides.
//!
//! Track points are indexed in an R-tree, so each lookup only visits the
//! points inside the window instead of scanning the whole track.

use geo::{Distance, Geodesic, Point};
use log::{debug, info};
use rstar::{AABB, RTree, RTreeObject};
use serde::{Deserialize, Serialize};

use crate::geo_utils::geodesic_distance;
use crate::track::decode_track;
use crate::{Activity, Bounds, GpsPoint};

/// Matching thresholds for [`find_pois_on_track`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiConfig {
    /// Maximum geodesic distance between the POI and a track point (meters)
    pub max_distance_meters: f64,
    /// Half-width of the lat/lng window searched around each POI (degrees)
    pub window_degrees: f64,
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            max_distance_meters: 100.0,
            window_degrees: 0.01,
        }
    }
}

/// A named place, e.g. a park gate or a landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub name: String,
    pub point: GpsPoint,
}

impl PointOfInterest {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            point: GpsPoint::new(latitude, longitude),
        }
    }
}

/// POIs found along one activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityPois {
    pub activity_id: String,
    /// POI names in the order they were given
    pub pois: Vec<String>,
}

// =============================================================================
// R-tree Track Index
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct TrackPoint {
    lat: f64,
    lng: f64,
}

impl RTreeObject for TrackPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lng])
    }
}

fn build_rtree(track: &[GpsPoint]) -> RTree<TrackPoint> {
    let points: Vec<TrackPoint> = track
        .iter()
        .map(|p| TrackPoint {
            lat: p.latitude,
            lng: p.longitude,
        })
        .collect();
    RTree::bulk_load(points)
}

fn is_on_track(tree: &RTree<TrackPoint>, poi: &GpsPoint, config: &PoiConfig) -> bool {
    let w = config.window_degrees;
    let window = AABB::from_corners(
        [poi.latitude - w, poi.longitude - w],
        [poi.latitude + w, poi.longitude + w],
    );
    let target = Point::new(poi.longitude, poi.latitude);

    tree.locate_in_envelope_intersecting(&window).any(|tp| {
        // the envelope is closed; the window is open
        (tp.lat - poi.latitude).abs() < w
            && (tp.lng - poi.longitude).abs() < w
            && Geodesic::distance(Point::new(tp.lng, tp.lat), target) < config.max_distance_meters
    })
}

// =============================================================================
// Public API
// =============================================================================

/// Names of the POIs a decoded track passes, in the order of `pois`.
///
/// ```
/// use running_stats::{GpsPoint, PoiConfig, PointOfInterest, find_pois_on_track};
///
/// let track = vec![
///     GpsPoint::new(38.8620, 121.5140),
///     GpsPoint::new(38.8630, 121.5150),
///     GpsPoint::new(38.8640, 121.5160),
/// ];
/// let pois = vec![
///     PointOfInterest::new("星海广场", 38.8631, 121.5151),
///     PointOfInterest::new("老虎滩", 38.8700, 121.6700),
/// ];
///
/// let found = find_pois_on_track(&track, &pois, &PoiConfig::default());
/// assert_eq!(found, vec!["星海广场".to_string()]);
/// ```
pub fn find_pois_on_track(track: &[GpsPoint], pois: &[PointOfInterest], config: &PoiConfig) -> Vec<String> {
    let Some(bounds) = Bounds::from_points(track) else {
        return Vec::new();
    };

    let candidates: Vec<&PointOfInterest> = pois
        .iter()
        .filter(|poi| bounds.contains(&poi.point, config.window_degrees))
        .collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    let tree = build_rtree(track);
    candidates
        .into_iter()
        .filter(|poi| is_on_track(&tree, &poi.point, config))
        .map(|poi| poi.name.clone())
        .collect()
}

/// Distance from a POI to the nearest point of a track, in meters.
///
/// `None` for an empty track.
pub fn distance_to_track(track: &[GpsPoint], poi: &GpsPoint) -> Option<f64> {
    track
        .iter()
        .map(|p| geodesic_distance(p, poi))
        .min_by(|a, b| a.total_cmp(b))
}

fn pois_for_activity(activity: &Activity, pois: &[PointOfInterest], config: &PoiConfig) -> Option<ActivityPois> {
    let encoded = activity.encoded_track.as_deref()?;
    let track = match decode_track(encoded) {
        Ok(track) => track,
        Err(e) => {
            debug!("Activity {}: skipping POI search ({})", activity.id, e);
            return None;
        }
    };

    let found = find_pois_on_track(&track, pois, config);
    (!found.is_empty()).then(|| ActivityPois {
        activity_id: activity.id.clone(),
        pois: found,
    })
}

/// Find POIs for every activity with a track.
///
/// Activities without a track, with an unreadable track, or passing no POI
/// are left out. Results keep input order.
pub fn pois_for_activities(
    activities: &[Activity],
    pois: &[PointOfInterest],
    config: &PoiConfig,
) -> Vec<ActivityPois> {
    let tagged: Vec<ActivityPois> = activities
        .iter()
        .filter_map(|a| pois_for_activity(a, pois, config))
        .collect();

    info!(
        "POIs: {} of {} activities pass at least one of {} points",
        tagged.len(),
        activities.len(),
        pois.len()
    );
    tagged
}

/// Parallel version of [`pois_for_activities`].
#[cfg(feature = "parallel")]
pub fn pois_for_activities_parallel(
    activities: &[Activity],
    pois: &[PointOfInterest],
    config: &PoiConfig,
) -> Vec<ActivityPois> {
    use rayon::prelude::*;

    let start = std::time::Instant::now();
    let tagged: Vec<ActivityPois> = activities
        .par_iter()
        .filter_map(|a| pois_for_activity(a, pois, config))
        .collect();

    info!(
        "POIs: {} of {} activities tagged in {:?}",
        tagged.len(),
        activities.len(),
        start.elapsed()
    );
    tagged
}
