//! GeoJSON track export and map viewport fitting.
//!
//! Turns activities' encoded summary tracks into a `FeatureCollection` of
//! `LineString` features the map widget can draw directly, and works out
//! where to point the map.
//!
//! Coordinates follow GeoJSON order, `[longitude, latitude]`.
//!
//! A track that is missing or fails to decode still produces a feature, with
//! an empty coordinate list. The collection therefore always has exactly one
//! feature per input activity, in input order, which lets callers zip
//! features back to activities by position.

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geo_utils::{line_bounds, line_string};
use crate::track::decode_track;
use crate::{Activity, Result};

/// Web-Mercator world size in pixels at zoom 0 (512px tiles).
const TILE_SIZE: f64 = 512.0;

// ============================================================================
// GeoJSON Types
// ============================================================================

/// The `type` member of a feature collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureCollectionType {
    #[default]
    FeatureCollection,
}

/// The `type` member of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureType {
    #[default]
    Feature,
}

/// Feature geometry. Activity tracks are always line strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<[f64; 2]> },
}

/// Properties attached to each track feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    /// ID of the activity the track belongs to
    pub id: String,
}

/// One activity's track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

impl Feature {
    /// Create a line-string feature for an activity.
    pub fn line_string(activity_id: impl Into<String>, coordinates: Vec<[f64; 2]>) -> Self {
        Self {
            kind: FeatureType::Feature,
            geometry: Geometry::LineString { coordinates },
            properties: FeatureProperties { id: activity_id.into() },
        }
    }

    /// The `[longitude, latitude]` positions of the track.
    pub fn coordinates(&self) -> &[[f64; 2]] {
        match &self.geometry {
            Geometry::LineString { coordinates } => coordinates,
        }
    }

    /// Whether the track has no points (missing or undecodable polyline).
    pub fn is_empty(&self) -> bool {
        self.coordinates().is_empty()
    }
}

/// A GeoJSON `FeatureCollection` of activity tracks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionType,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: FeatureCollectionType::FeatureCollection,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Serialize to a GeoJSON string for the map source.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Track Decoding
// ============================================================================

/// Decode an activity's track as `[longitude, latitude]` positions.
///
/// Returns an empty list when the activity has no track or the polyline is
/// malformed; the failure is logged, never returned.
pub fn path_for_activity(activity: &Activity) -> Vec<[f64; 2]> {
    let Some(encoded) = activity.encoded_track.as_deref() else {
        return Vec::new();
    };

    match decode_track(encoded) {
        Ok(points) => points.iter().map(|p| p.to_lon_lat()).collect(),
        Err(e) => {
            debug!("Activity {}: unreadable track ({})", activity.id, e);
            Vec::new()
        }
    }
}

/// Build a `FeatureCollection` with one line feature per activity.
///
/// # Example
/// ```
/// use running_stats::{Activity, track_to_geojson};
///
/// let runs = vec![
///     Activity::new("ok", "2020-01-01 07:00:00").with_track("_p~iF~ps|U_ulLnnqC"),
///     Activity::new("bad", "2020-01-02 07:00:00").with_track("???"),
///     Activity::new("none", "2020-01-03 07:00:00"),
/// ];
///
/// let tracks = track_to_geojson(&runs);
/// assert_eq!(tracks.len(), 3);
/// assert_eq!(tracks.features[0].coordinates()[0], [-120.2, 38.5]);
/// assert!(tracks.features[1].is_empty());
/// assert!(tracks.features[2].is_empty());
/// ```
pub fn track_to_geojson<'a, I>(activities: I) -> FeatureCollection
where
    I: IntoIterator<Item = &'a Activity>,
{
    let features = activities
        .into_iter()
        .map(|activity| Feature::line_string(activity.id.as_str(), path_for_activity(activity)))
        .collect();
    FeatureCollection::new(features)
}

/// Parallel version of [`track_to_geojson`] for long histories.
///
/// Produces exactly the same collection, in the same order.
#[cfg(feature = "parallel")]
pub fn track_to_geojson_parallel(activities: &[Activity]) -> FeatureCollection {
    use log::info;
    use rayon::prelude::*;

    let start = std::time::Instant::now();
    let features: Vec<Feature> = activities
        .par_iter()
        .map(|activity| Feature::line_string(activity.id.as_str(), path_for_activity(activity)))
        .collect();

    let empty = features.iter().filter(|f| f.is_empty()).count();
    info!(
        "Decoded {} tracks ({} empty) in {:?}",
        features.len(),
        empty,
        start.elapsed()
    );

    FeatureCollection::new(features)
}

// ============================================================================
// Viewport Fitting
// ============================================================================

/// Map viewport sizing used to fit tracks on screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Viewport width in pixels (default: 800)
    pub width: f64,
    /// Viewport height in pixels (default: 600)
    pub height: f64,
    /// Padding on every side in pixels (default: 200)
    pub padding: f64,
    /// Upper bound for the fitted zoom (default: 20)
    pub max_zoom: f64,
    /// Zoom used whenever more than one track is shown (default: 11.5)
    pub multi_track_zoom: f64,
    /// Zoom used when every activity is shown (default: 5)
    pub all_tracks_zoom: f64,
    /// Zoom used when centring on a single selected run (default: 14.5)
    pub selected_track_zoom: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            padding: 200.0,
            max_zoom: 20.0,
            multi_track_zoom: 11.5,
            all_tracks_zoom: 5.0,
            selected_track_zoom: 14.5,
        }
    }
}

/// Where to point the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

/// Fit the map to the first track in `collection`.
///
/// The first feature's bounding box is fitted into the configured viewport
/// in Web-Mercator space. When several tracks are shown the zoom falls back
/// to `multi_track_zoom`, and when all `total_activities` are shown to
/// `all_tracks_zoom`.
///
/// Returns `None` if there is no first feature or it has no points.
pub fn viewport_for_tracks(
    collection: &FeatureCollection,
    total_activities: usize,
    config: &ViewportConfig,
) -> Option<MapViewport> {
    let first = collection.features.first()?;
    let bounds = line_bounds(&line_string(first.coordinates()))?;

    let (west, north) = project(bounds.min_lng, bounds.max_lat);
    let (east, south) = project(bounds.max_lng, bounds.min_lat);

    let span_x = (east - west).abs();
    let span_y = (south - north).abs();
    let target_x = config.width - 2.0 * config.padding;
    let target_y = config.height - 2.0 * config.padding;

    // A single point gives zero span: infinite scale, clamped by max_zoom
    let scale = (target_x / span_x).min(target_y / span_y);
    let mut zoom = scale.log2().min(config.max_zoom);

    let (longitude, latitude) = unproject((west + east) / 2.0, (north + south) / 2.0);

    let shown = collection.len();
    if shown > 1 {
        zoom = config.multi_track_zoom;
    }
    if shown == total_activities {
        zoom = config.all_tracks_zoom;
    }

    Some(MapViewport { longitude, latitude, zoom })
}

/// The middle position of a track, used to centre the map on a single run.
pub fn track_midpoint(feature: &Feature) -> Option<[f64; 2]> {
    let coordinates = feature.coordinates();
    coordinates.get(coordinates.len() / 2).copied()
}

/// Project longitude/latitude to Web-Mercator pixels at zoom 0.
fn project(longitude: f64, latitude: f64) -> (f64, f64) {
    let x = TILE_SIZE * (longitude + 180.0) / 360.0;
    let lat_rad = latitude.to_radians();
    let y = TILE_SIZE * (PI - (PI / 4.0 + lat_rad / 2.0).tan().ln()) / (2.0 * PI);
    (x, y)
}

fn unproject(x: f64, y: f64) -> (f64, f64) {
    let longitude = x / TILE_SIZE * 360.0 - 180.0;
    let latitude = (2.0 * (PI - y / TILE_SIZE * 2.0 * PI).exp().atan() - PI / 2.0).to_degrees();
    (longitude, latitude)
}

// ============================================================================
// Tests
// ============================================================================
