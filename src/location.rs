//! Location statistics from reverse-geocoded activity labels.
//!
//! The sync scripts store a free-text label per activity, e.g.
//! `"中山区, 大连市, 辽宁省, 中国"`. City, province and country are pulled out
//! of it heuristically by a [`LocationParser`]. The default
//! [`ChineseLocationParser`] understands Chinese administrative suffixes;
//! callers with other locales plug in their own parser through
//! [`summarize_locations_with`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Activity;

/// Patterns are hardcoded and always compile; `None` only guards the API.
static CITY_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[\x{4e00}-\x{9fa5}]*市").ok());

static PROVINCE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[\x{4e00}-\x{9fa5}]*省").ok());

static CJK_RUN_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[\x{4e00}-\x{9fa5}]+").ok());

/// Where an activity took place. Any part may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    pub city: String,
    pub province: String,
    pub country: String,
}

/// Strategy for extracting a [`Location`] from a free-text label.
pub trait LocationParser {
    fn parse(&self, label: &str) -> Location;
}

/// Location parser for labels produced by a Chinese-language geocoder.
///
/// - city: leftmost run of Chinese characters ending in `市`
/// - province: leftmost run ending in `省`
/// - country: longest run of Chinese characters in the last comma-separated part
///
/// Cities on the municipality list have no separate province, so the city
/// is reused as the province.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChineseLocationParser {
    /// City names that are also province-level divisions
    pub municipalities: Vec<String>,
}

impl Default for ChineseLocationParser {
    fn default() -> Self {
        Self {
            municipalities: ["北京市", "上海市", "天津市", "重庆市", "香港特别行政区", "澳门特别行政区"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl LocationParser for ChineseLocationParser {
    fn parse(&self, label: &str) -> Location {
        let city = first_match(&CITY_PATTERN, label);
        let mut province = first_match(&PROVINCE_PATTERN, label);
        let country = label
            .rsplit(',')
            .next()
            .map(longest_cjk_run)
            .unwrap_or_default();

        if self.municipalities.iter().any(|m| *m == city) {
            province.clone_from(&city);
        }

        Location { city, province, country }
    }
}

/// Distinct places and per-city mileage across an activity history.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LocationSummary {
    /// Years with at least one activity
    pub years: BTreeSet<String>,
    pub countries: BTreeSet<String>,
    pub provinces: BTreeSet<String>,
    /// Total distance in meters per city
    pub city_distances: BTreeMap<String, f64>,
}

impl LocationSummary {
    pub fn year_count(&self) -> usize {
        self.years.len()
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn province_count(&self) -> usize {
        self.provinces.len()
    }

    pub fn city_count(&self) -> usize {
        self.city_distances.len()
    }

    /// Cities ordered by distance run there, longest first.
    pub fn cities_by_distance(&self) -> Vec<(&str, f64)> {
        let mut cities: Vec<(&str, f64)> = self
            .city_distances
            .iter()
            .map(|(city, meters)| (city.as_str(), *meters))
            .collect();
        cities.sort_by(|a, b| b.1.total_cmp(&a.1));
        cities
    }
}

/// Summarize locations with the default [`ChineseLocationParser`].
///
/// ```
/// use running_stats::{Activity, summarize_locations};
///
/// let runs = vec![
///     Activity::new("1", "2019-05-01 07:00:00").with_distance(5_000.0).with_location("中山区, 大连市, 辽宁省, 中国"),
///     Activity::new("2", "2020-05-01 07:00:00").with_distance(8_000.0).with_location("朝阳区, 北京市, 中国"),
/// ];
///
/// let summary = summarize_locations(&runs);
/// assert_eq!(summary.city_count(), 2);
/// assert_eq!(summary.province_count(), 2); // 辽宁省 and 北京市
/// assert_eq!(summary.country_count(), 1);
/// assert_eq!(summary.year_count(), 2);
/// ```
pub fn summarize_locations(activities: &[Activity]) -> LocationSummary {
    summarize_locations_with(activities, &ChineseLocationParser::default())
}

/// Summarize locations with a custom parser.
///
/// City names of one character or less are extraction noise (a bare `市`)
/// and are left out of the city table.
pub fn summarize_locations_with(activities: &[Activity], parser: &dyn LocationParser) -> LocationSummary {
    let mut summary = LocationSummary::default();

    for activity in activities {
        if let Some(year) = activity.year() {
            summary.years.insert(year.to_string());
        }

        let Some(label) = activity.location_label.as_deref() else {
            continue;
        };
        let Location { city, province, country } = parser.parse(label);

        if city.chars().count() > 1 {
            *summary.city_distances.entry(city).or_insert(0.0) += activity.distance();
        }
        if !province.is_empty() {
            summary.provinces.insert(province);
        }
        if !country.is_empty() {
            summary.countries.insert(country);
        }
    }

    log::debug!(
        "Locations: {} cities, {} provinces, {} countries over {} years",
        summary.city_count(),
        summary.province_count(),
        summary.country_count(),
        summary.year_count()
    );

    summary
}

/// Activities whose location label mentions `city`.
pub fn filter_city_runs<'a>(activities: &'a [Activity], city: &str) -> Vec<&'a Activity> {
    activities
        .iter()
        .filter(|a| a.location_label.as_deref().is_some_and(|l| l.contains(city)))
        .collect()
}

fn first_match(pattern: &LazyLock<Option<Regex>>, text: &str) -> String {
    pattern
        .as_ref()
        .and_then(|re| re.find(text))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn longest_cjk_run(segment: &str) -> String {
    let Some(re) = CJK_RUN_PATTERN.as_ref() else {
        return String::new();
    };
    re.find_iter(segment)
        .map(|m| m.as_str())
        .fold("", |best, run| {
            if run.chars().count() > best.chars().count() { run } else { best }
        })
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
