//! Year-by-year statistics and activity table ordering.
//!
//! Activities are grouped by the `YYYY` prefix of their local start time.
//! The comparison is purely lexical on that prefix: no calendar or timezone
//! arithmetic is involved, so a run at `2019-12-31 23:59` local time always
//! belongs to 2019.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::format::format_pace;
use crate::{Activity, StatsError};

/// Label used for the all-years group.
pub const TOTAL_LABEL: &str = "Total";

/// Which activities a summary or table covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GroupKey {
    /// Every activity
    #[default]
    Total,
    /// Activities whose start time begins with this 4-digit year
    Year(String),
}

impl GroupKey {
    /// Whether an activity belongs to this group.
    pub fn matches(&self, activity: &Activity) -> bool {
        match self {
            Self::Total => true,
            Self::Year(year) => activity.year() == Some(year.as_str()),
        }
    }

    /// The year, unless this is the total group.
    pub fn year(&self) -> Option<&str> {
        match self {
            Self::Total => None,
            Self::Year(year) => Some(year),
        }
    }
}

impl FromStr for GroupKey {
    type Err = StatsError;

    /// Parse `"Total"` / `"All"` or a 4-digit year.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Total" | "All" => Ok(Self::Total),
            _ if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) => Ok(Self::Year(s.to_string())),
            _ => Err(StatsError::InvalidGroupKey(s.to_string())),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Total => f.write_str(TOTAL_LABEL),
            Self::Year(year) => f.write_str(year),
        }
    }
}

/// Summary statistics for one year (or all years).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    /// The year, or "Total"
    pub label: String,
    /// Number of activities
    pub runs: usize,
    /// Total distance in kilometers, rounded to one decimal
    pub total_km: f64,
    /// Mean of the reported average speeds (m/s)
    pub average_speed: Option<f64>,
    /// `average_speed` formatted as `m:ss` per km
    pub average_pace: Option<String>,
    /// Longest upstream streak among the group's activities
    pub max_streak: u32,
    /// Mean of the reported average heart rates (bpm)
    pub average_heart_rate: Option<f64>,
}

impl YearSummary {
    pub fn has_heart_rate(&self) -> bool {
        self.average_heart_rate.is_some()
    }
}

/// Running mean that ignores values that were never reported.
#[derive(Debug, Default)]
struct ReportedMean {
    sum: f64,
    count: usize,
}

impl ReportedMean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Summarize the activities of one group.
///
/// Speed and heart rate are averaged only over activities that report them.
/// An empty group yields zero runs, `0.0` km and absent averages.
///
/// # Example
/// ```
/// use running_stats::{Activity, GroupKey, summarize_by_group};
///
/// let runs = vec![
///     Activity::new("1", "2019-05-01 07:00:00").with_distance(5_000.0).with_speed(3.0).with_streak(2),
///     Activity::new("2", "2019-05-02 07:00:00").with_distance(7_560.0).with_heart_rate(150.0).with_streak(3),
/// ];
///
/// let summary = summarize_by_group(&runs, &GroupKey::Total);
/// assert_eq!(summary.total_km, 12.6);
/// assert_eq!(summary.average_pace.as_deref(), Some("5:33"));
/// assert_eq!(summary.average_heart_rate, Some(150.0));
/// assert_eq!(summary.max_streak, 3);
/// ```
pub fn summarize_by_group(activities: &[Activity], key: &GroupKey) -> YearSummary {
    let mut runs = 0;
    let mut meters = 0.0;
    let mut speed = ReportedMean::default();
    let mut heart_rate = ReportedMean::default();
    let mut max_streak = 0;

    for activity in activities.iter().filter(|a| key.matches(a)) {
        runs += 1;
        meters += activity.distance();
        speed.add(activity.speed());
        heart_rate.add(activity.heart_rate());
        max_streak = max_streak.max(activity.streak_days.unwrap_or(0));
    }

    let average_speed = speed.mean();
    YearSummary {
        label: key.to_string(),
        runs,
        total_km: round_tenths(meters / 1000.0),
        average_speed,
        average_pace: average_speed.map(format_pace),
        max_streak,
        average_heart_rate: heart_rate.mean(),
    }
}

/// Filter to a group and sort with `compare`, leaving the input untouched.
///
/// The sort is stable, so applying the same comparator to the output again
/// returns it unchanged.
///
/// # Example
/// ```
/// use running_stats::{Activity, GroupKey, SortKey, SortOrder, comparator, filter_and_sort};
///
/// let runs = vec![
///     Activity::new("a", "2019-01-01 07:00:00").with_distance(5_000.0),
///     Activity::new("b", "2020-01-01 07:00:00").with_distance(9_000.0),
///     Activity::new("c", "2019-02-01 07:00:00").with_distance(8_000.0),
/// ];
///
/// let year: GroupKey = "2019".parse().unwrap();
/// let table = filter_and_sort(&runs, &year, comparator(SortKey::Distance, SortOrder::Descending));
/// let ids: Vec<&str> = table.iter().map(|a| a.id.as_str()).collect();
/// assert_eq!(ids, ["c", "a"]);
/// ```
pub fn filter_and_sort<'a, I, F>(activities: I, key: &GroupKey, mut compare: F) -> Vec<&'a Activity>
where
    I: IntoIterator<Item = &'a Activity>,
    F: FnMut(&Activity, &Activity) -> Ordering,
{
    let mut selected: Vec<&Activity> = activities.into_iter().filter(|a| key.matches(a)).collect();
    selected.sort_by(|a, b| compare(a, b));
    selected
}

/// Column an activity table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Distance,
    Speed,
    HeartRate,
    StartTime,
}

/// Sort direction. Tables start out descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            Self::Descending => Self::Ascending,
            Self::Ascending => Self::Descending,
        }
    }
}

/// Standard comparator for a table column.
///
/// Missing speed or heart rate sorts below any reported value. Start times
/// are compared as parsed timestamps, falling back to string order when
/// either one does not parse.
pub fn comparator(key: SortKey, order: SortOrder) -> impl Fn(&Activity, &Activity) -> Ordering {
    move |a: &Activity, b: &Activity| {
        let ascending = match key {
            SortKey::Distance => a.distance().total_cmp(&b.distance()),
            SortKey::Speed => compare_reported(a.speed(), b.speed()),
            SortKey::HeartRate => compare_reported(a.heart_rate(), b.heart_rate()),
            SortKey::StartTime => compare_start_times(a, b),
        };
        match order {
            SortOrder::Ascending => ascending,
            SortOrder::Descending => ascending.reverse(),
        }
    }
}

/// Distinct years with at least one activity, newest first.
pub fn years_present(activities: &[Activity]) -> Vec<String> {
    let years: BTreeSet<&str> = activities.iter().filter_map(Activity::year).collect();
    years.into_iter().rev().map(str::to_string).collect()
}

/// Year buttons with the selected year moved to the front.
///
/// ```
/// use running_stats::year_selector_order;
///
/// let years = vec!["2020".to_string(), "2019".to_string(), "2018".to_string()];
/// assert_eq!(year_selector_order(&years, "2018"), ["2018", "2020", "2019"]);
/// ```
pub fn year_selector_order(years: &[String], selected: &str) -> Vec<String> {
    let mut ordered = Vec::with_capacity(years.len());
    if years.iter().any(|y| y == selected) {
        ordered.push(selected.to_string());
    }
    ordered.extend(years.iter().filter(|y| *y != selected).cloned());
    ordered
}

fn compare_reported(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn compare_start_times(a: &Activity, b: &Activity) -> Ordering {
    match (a.start_datetime(), b.start_datetime()) {
        (Ok(ta), Ok(tb)) => ta.cmp(&tb),
        _ => {
            log::debug!("Comparing unparsed start times {:?} and {:?}", a.start_time, b.start_time);
            a.start_time.cmp(&b.start_time)
        }
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<Activity> {
        vec![
            Activity::new("1", "2019-01-05 07:00:00").with_distance(5_000.0).with_speed(2.5).with_heart_rate(140.0).with_streak(1),
            Activity::new("2", "2019-06-10 19:30:00").with_distance(10_000.0).with_speed(3.5).with_streak(4),
            Activity::new("3", "2019-12-31 23:59:00").with_distance(21_100.0),
            Activity::new("4", "2020-01-01 00:05:00").with_distance(3_000.0).with_speed(3.0).with_heart_rate(150.0).with_streak(2),
            Activity::new("5", "2020-03-15 06:45:00"),
        ]
    }

    fn ids<'a>(activities: &[&'a Activity]) -> Vec<&'a str> {
        activities.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_group_key_parse() {
        assert_eq!("Total".parse::<GroupKey>().unwrap(), GroupKey::Total);
        assert_eq!("All".parse::<GroupKey>().unwrap(), GroupKey::Total);
        assert_eq!("2019".parse::<GroupKey>().unwrap(), GroupKey::Year("2019".into()));
        assert!(matches!("19".parse::<GroupKey>(), Err(StatsError::InvalidGroupKey(_))));
        assert!(matches!("２０１９".parse::<GroupKey>(), Err(StatsError::InvalidGroupKey(_))));
        assert_eq!(GroupKey::Total.to_string(), "Total");
    }

    #[test]
    fn test_year_match_is_lexical() {
        let year: GroupKey = "2019".parse().unwrap();
        let summary = summarize_by_group(&history(), &year);
        assert_eq!(summary.label, "2019");
        assert_eq!(summary.runs, 3);
        assert_eq!(summary.total_km, 36.1);
    }

    #[test]
    fn test_averages_skip_unreported_values() {
        let year: GroupKey = "2019".parse().unwrap();
        let summary = summarize_by_group(&history(), &year);
        // (2.5 + 3.5) / 2, not / 3
        assert_eq!(summary.average_speed, Some(3.0));
        assert_eq!(summary.average_pace.as_deref(), Some("5:33"));
        assert_eq!(summary.average_heart_rate, Some(140.0));
        assert!(summary.has_heart_rate());
        assert_eq!(summary.max_streak, 4);
    }

    #[test]
    fn test_total_group() {
        let summary = summarize_by_group(&history(), &GroupKey::Total);
        assert_eq!(summary.label, "Total");
        assert_eq!(summary.runs, 5);
        assert_eq!(summary.total_km, 39.1);
        assert_eq!(summary.average_heart_rate, Some(145.0));
    }

    #[test]
    fn test_empty_group_has_no_averages() {
        let year: GroupKey = "2012".parse().unwrap();
        let summary = summarize_by_group(&history(), &year);
        assert_eq!(summary.runs, 0);
        assert_eq!(summary.total_km, 0.0);
        assert_eq!(summary.average_speed, None);
        assert_eq!(summary.average_pace, None);
        assert_eq!(summary.average_heart_rate, None);
        assert!(!summary.has_heart_rate());
        assert_eq!(summary.max_streak, 0);
    }

    #[test]
    fn test_no_heart_rate_reported() {
        let runs = vec![Activity::new("1", "2020-01-01 07:00:00").with_speed(3.0)];
        assert!(!summarize_by_group(&runs, &GroupKey::Total).has_heart_rate());
    }

    #[test]
    fn test_filter_and_sort_by_distance() {
        let runs = history();
        let year: GroupKey = "2019".parse().unwrap();
        let by_distance = comparator(SortKey::Distance, SortOrder::Descending);

        let sorted = filter_and_sort(&runs, &year, &by_distance);
        assert_eq!(ids(&sorted), ["3", "2", "1"]);
        assert!(sorted.iter().all(|a| a.year() == Some("2019")));
        assert!(sorted.windows(2).all(|w| w[0].distance() >= w[1].distance()));

        let again = filter_and_sort(sorted.iter().copied(), &year, &by_distance);
        assert_eq!(again, sorted);
        // the input keeps its original order
        assert_eq!(runs[0].id, "1");
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let runs = vec![
            Activity::new("a", "2020-01-01 07:00:00").with_distance(5_000.0),
            Activity::new("b", "2020-01-02 07:00:00").with_distance(5_000.0),
            Activity::new("c", "2020-01-03 07:00:00").with_distance(6_000.0),
        ];
        let sorted = filter_and_sort(&runs, &GroupKey::Total, comparator(SortKey::Distance, SortOrder::Descending));
        assert_eq!(ids(&sorted), ["c", "a", "b"]);
    }

    #[test]
    fn test_sort_ascending_and_missing_values() {
        let runs = history();
        let by_speed = comparator(SortKey::Speed, SortOrder::Ascending);
        let sorted = filter_and_sort(&runs, &GroupKey::Total, by_speed);
        assert_eq!(ids(&sorted), ["3", "5", "1", "4", "2"]);

        let by_hr = comparator(SortKey::HeartRate, SortOrder::Descending);
        let sorted = filter_and_sort(&runs, &GroupKey::Total, by_hr);
        assert_eq!(ids(&sorted)[..2], ["4", "1"]);
    }

    #[test]
    fn test_sort_by_start_time() {
        let runs = vec![
            Activity::new("late", "2020-01-01T21:00:00"),
            Activity::new("early", "2020-01-01 06:00:00"),
            Activity::new("mid", "2020-01-01 12:00:00"),
        ];
        let newest_first = comparator(SortKey::StartTime, SortOrder::default());
        assert_eq!(ids(&filter_and_sort(&runs, &GroupKey::Total, newest_first)), ["late", "mid", "early"]);

        let oldest_first = comparator(SortKey::StartTime, SortOrder::Descending.toggle());
        assert_eq!(ids(&filter_and_sort(&runs, &GroupKey::Total, oldest_first)), ["early", "mid", "late"]);
    }

    #[test]
    fn test_years_present() {
        assert_eq!(years_present(&history()), ["2020", "2019"]);
        assert!(years_present(&[]).is_empty());
    }

    #[test]
    fn test_year_selector_order_unknown_year() {
        let years = vec!["2020".to_string(), "2019".to_string()];
        assert_eq!(year_selector_order(&years, "2012"), ["2020", "2019"]);
    }
}
