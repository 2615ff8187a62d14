//! # Running Stats
//!
//! Aggregation of a runner's activity history for a personal running page.
//!
//! This library provides:
//! - Per-year and per-location statistics
//! - Filtered and sorted activity tables
//! - GeoJSON line tracks decoded from polyline-encoded GPS data
//! - Run streaks, display titles and pace strings
//!
//! Every operation is a pure function over an immutable slice of [`Activity`]
//! records. Nothing here does I/O beyond parsing the activity JSON.
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel track decoding and POI detection with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use running_stats::{Activity, GroupKey, summarize_by_group, format_pace};
//!
//! let runs = vec![
//!     Activity::new("1", "2019-03-02 07:10:00").with_distance(10_000.0).with_speed(3.0),
//!     Activity::new("2", "2019-03-03 18:40:00").with_distance(5_000.0).with_speed(3.5),
//!     Activity::new("3", "2020-01-01 09:00:00").with_distance(21_097.0),
//! ];
//!
//! let year: GroupKey = "2019".parse().unwrap();
//! let summary = summarize_by_group(&runs, &year);
//! assert_eq!(summary.runs, 2);
//! assert_eq!(summary.total_km, 15.0);
//! assert_eq!(format_pace(3.0), "5:33");
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

pub mod error;
pub use error::{Result, StatsError};

pub mod track;
pub use track::{PolylineError, decode_track, encode_track};

pub mod geo_utils;

pub mod geojson;
pub use geojson::{
    Feature, FeatureCollection, Geometry, MapViewport, ViewportConfig,
    path_for_activity, track_midpoint, track_to_geojson, viewport_for_tracks,
};
#[cfg(feature = "parallel")]
pub use geojson::track_to_geojson_parallel;

pub mod stats;
pub use stats::{
    GroupKey, SortKey, SortOrder, YearSummary,
    comparator, filter_and_sort, summarize_by_group, year_selector_order, years_present,
};

pub mod location;
pub use location::{
    ChineseLocationParser, Location, LocationParser, LocationSummary,
    filter_city_runs, summarize_locations, summarize_locations_with,
};

pub mod streak;
pub use streak::compute_streak;

pub mod format;
pub use format::{RunTitle, filter_title_runs, format_pace, int_comma, title_for_activity, title_for_show};

pub mod poi;
pub use poi::{ActivityPois, PoiConfig, PointOfInterest, distance_to_track, find_pois_on_track, pois_for_activities};
#[cfg(feature = "parallel")]
pub use poi::pois_for_activities_parallel;

pub mod view;
pub use view::{RunView, TableSort};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use running_stats::GpsPoint;
/// let point = GpsPoint::new(38.862, 121.514); // Dalian
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// The point as a GeoJSON position, `[longitude, latitude]`.
    pub fn to_lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Bounding box of a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points. `None` for an empty slice.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut bounds = Self {
            min_lat: f64::MAX,
            max_lat: f64::MIN,
            min_lng: f64::MAX,
            max_lng: f64::MIN,
        };
        for p in points {
            bounds.min_lat = bounds.min_lat.min(p.latitude);
            bounds.max_lat = bounds.max_lat.max(p.latitude);
            bounds.min_lng = bounds.min_lng.min(p.longitude);
            bounds.max_lng = bounds.max_lng.max(p.longitude);
        }
        Some(bounds)
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Whether `point` lies inside the bounds grown by `margin_degrees` on every side.
    pub fn contains(&self, point: &GpsPoint, margin_degrees: f64) -> bool {
        point.latitude >= self.min_lat - margin_degrees
            && point.latitude <= self.max_lat + margin_degrees
            && point.longitude >= self.min_lng - margin_degrees
            && point.longitude <= self.max_lng + margin_degrees
    }
}

/// One recorded run, as exported by the activity sync scripts.
///
/// Field names on the wire follow the exported JSON (`start_date_local`,
/// `summary_polyline`, ...). Everything except the id and start time is
/// optional; consumers treat a missing value as "leave out of the aggregate".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique activity identifier (numeric ids are kept as strings)
    #[serde(rename = "run_id", alias = "strava_id", alias = "id", deserialize_with = "deserialize_id")]
    pub id: String,
    /// Local start time, e.g. `2020-05-01 07:30:00`
    #[serde(rename = "start_date_local")]
    pub start_time: String,
    /// Distance in meters
    #[serde(rename = "distance", default)]
    pub distance_meters: Option<f64>,
    /// Average speed in m/s
    #[serde(default)]
    pub average_speed: Option<f64>,
    /// Average heart rate in bpm
    #[serde(rename = "average_heartrate", default)]
    pub average_heart_rate: Option<f64>,
    /// Streak length computed upstream
    #[serde(rename = "streak", default)]
    pub streak_days: Option<u32>,
    /// Polyline-encoded summary track
    #[serde(rename = "summary_polyline", default)]
    pub encoded_track: Option<String>,
    /// Reverse-geocoded location, e.g. "中山区, 大连市, 辽宁省, 中国"
    #[serde(rename = "location_country", default)]
    pub location_label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Sport type ("Run", "Ride", ...)
    #[serde(rename = "type", default)]
    pub activity_type: Option<String>,
}

impl Activity {
    /// Create an activity with only the required fields set.
    pub fn new(id: impl Into<String>, start_time: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start_time: start_time.into(),
            distance_meters: None,
            average_speed: None,
            average_heart_rate: None,
            streak_days: None,
            encoded_track: None,
            location_label: None,
            name: None,
            activity_type: None,
        }
    }

    pub fn with_distance(mut self, meters: f64) -> Self {
        self.distance_meters = Some(meters);
        self
    }

    pub fn with_speed(mut self, meters_per_second: f64) -> Self {
        self.average_speed = Some(meters_per_second);
        self
    }

    pub fn with_heart_rate(mut self, bpm: f64) -> Self {
        self.average_heart_rate = Some(bpm);
        self
    }

    pub fn with_streak(mut self, days: u32) -> Self {
        self.streak_days = Some(days);
        self
    }

    pub fn with_track(mut self, encoded: impl Into<String>) -> Self {
        self.encoded_track = Some(encoded.into());
        self
    }

    pub fn with_location(mut self, label: impl Into<String>) -> Self {
        self.location_label = Some(label.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Distance in meters, zero when not recorded.
    pub fn distance(&self) -> f64 {
        self.distance_meters.filter(|d| d.is_finite() && *d > 0.0).unwrap_or(0.0)
    }

    /// Average speed, `None` unless the device recorded a positive value.
    pub fn speed(&self) -> Option<f64> {
        self.average_speed.filter(|s| s.is_finite() && *s > 0.0)
    }

    /// Average heart rate, `None` unless a sensor recorded a positive value.
    pub fn heart_rate(&self) -> Option<f64> {
        self.average_heart_rate.filter(|hr| hr.is_finite() && *hr > 0.0)
    }

    /// The `YYYY` prefix of the start time.
    pub fn year(&self) -> Option<&str> {
        self.start_time.get(..4)
    }

    /// The `YYYY-MM-DD` prefix of the start time.
    pub fn start_date(&self) -> &str {
        self.start_time.get(..10).unwrap_or(&self.start_time)
    }

    /// Parse the local start time.
    ///
    /// Accepts `YYYY-MM-DD HH:MM:SS` with either a space or `T` separator,
    /// optional fractional seconds and an optional UTC offset (which is
    /// dropped: the wall-clock time is what matters). A bare date parses as
    /// midnight.
    pub fn start_datetime(&self) -> Result<NaiveDateTime> {
        parse_local_time(&self.start_time).ok_or_else(|| StatsError::InvalidTimestamp {
            activity_id: self.id.clone(),
            value: self.start_time.clone(),
        })
    }

    /// Local hour of the start time, if it can be parsed.
    pub fn start_hour(&self) -> Option<u32> {
        self.start_datetime().ok().map(|t| t.hour())
    }
}

/// Parse the activity JSON array produced by the sync scripts.
///
/// # Example
/// ```
/// let json = r#"[{"run_id": 42, "start_date_local": "2020-05-01 07:30:00", "distance": 5000.0}]"#;
/// let runs = running_stats::activities_from_json(json).unwrap();
/// assert_eq!(runs[0].id, "42");
/// assert_eq!(runs[0].average_speed, None);
/// ```
pub fn activities_from_json(json: &str) -> Result<Vec<Activity>> {
    let activities: Vec<Activity> = serde_json::from_str(json)?;
    log::debug!("Loaded {} activities", activities.len());
    Ok(activities)
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_local_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(value, format) {
            return Some(t);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"] {
        if let Ok(t) = DateTime::parse_from_str(value, format) {
            return Some(t.naive_local());
        }
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.naive_local());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_point_validation() {
        assert!(GpsPoint::new(38.862, 121.514).is_valid());
        assert!(!GpsPoint::new(91.0, 0.0).is_valid());
        assert!(!GpsPoint::new(0.0, 181.0).is_valid());
        assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_bounds_contains_with_margin() {
        let bounds = Bounds::from_points(&[
            GpsPoint::new(38.86, 121.51),
            GpsPoint::new(38.87, 121.52),
        ])
        .unwrap();
        assert!(bounds.contains(&GpsPoint::new(38.865, 121.515), 0.0));
        assert!(!bounds.contains(&GpsPoint::new(38.875, 121.515), 0.0));
        assert!(bounds.contains(&GpsPoint::new(38.875, 121.515), 0.01));
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        for value in [
            "2020-05-01 07:30:00",
            "2020-05-01T07:30:00",
            "2020-05-01 07:30:00.250",
            "2020-05-01 07:30:00+08:00",
            "2020-05-01T07:30:00Z",
        ] {
            let t = Activity::new("a", value).start_datetime().unwrap();
            assert_eq!(t.hour(), 7, "{value}");
        }
        let midnight = Activity::new("a", "2020-05-01").start_datetime().unwrap();
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn test_invalid_timestamp_is_an_error() {
        let err = Activity::new("7", "yesterday").start_datetime().unwrap_err();
        assert!(matches!(err, StatsError::InvalidTimestamp { ref activity_id, .. } if activity_id == "7"));
    }

    #[test]
    fn test_missing_values_are_absent() {
        let run = Activity::new("a", "2020-05-01 07:30:00")
            .with_speed(0.0)
            .with_heart_rate(f64::NAN);
        assert_eq!(run.distance(), 0.0);
        assert_eq!(run.speed(), None);
        assert_eq!(run.heart_rate(), None);
        assert_eq!(run.year(), Some("2020"));
        assert_eq!(run.start_date(), "2020-05-01");
    }

    #[test]
    fn test_activities_from_json() {
        let json = r#"[
            {"strava_id": 3562917288, "name": "Morning Run", "distance": 10012.3,
             "start_date_local": "2020-06-12 06:01:09", "average_speed": 3.1,
             "average_heartrate": null, "summary_polyline": "_p~iF~ps|U",
             "location_country": "中山区, 大连市, 辽宁省, 中国", "streak": 4, "type": "Run"},
            {"run_id": "nrc-1", "start_date_local": "2020-06-13 19:00:00"}
        ]"#;
        let runs = activities_from_json(json).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, "3562917288");
        assert_eq!(runs[0].streak_days, Some(4));
        assert_eq!(runs[0].average_heart_rate, None);
        assert_eq!(runs[0].activity_type.as_deref(), Some("Run"));
        assert_eq!(runs[1].id, "nrc-1");
        assert_eq!(runs[1].distance_meters, None);
    }

    #[test]
    fn test_activities_from_bad_json() {
        assert!(matches!(activities_from_json("{"), Err(StatsError::Json(_))));
    }
}
