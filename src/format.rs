//! Display strings for the activity table and stat blocks.

use std::fmt;

use serde::Serialize;

use crate::Activity;

/// Category label shown for a run in the activity table.
///
/// Distance categories take precedence over the time-of-day buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RunTitle {
    /// More than 20 km and less than 40 km
    HalfMarathon,
    /// 40 km or more
    Marathon,
    /// Started 00:00-08:59
    EarlyMorning,
    /// Started 09:00-12:59
    Morning,
    /// Started 13:00-18:59
    Afternoon,
    /// Started 19:00-21:59
    Evening,
    /// Started 22:00 or later, or start hour unknown
    Night,
}

impl RunTitle {
    pub fn label(self) -> &'static str {
        match self {
            Self::HalfMarathon => "跑了个半马",
            Self::Marathon => "跑了个全马",
            Self::EarlyMorning => "清晨跑步",
            Self::Morning => "上午跑步",
            Self::Afternoon => "午后跑步",
            Self::Evening => "傍晚跑步",
            Self::Night => "夜晚跑步",
        }
    }
}

impl fmt::Display for RunTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Categorize a run by distance, then by local start hour.
///
/// ```
/// use running_stats::{Activity, RunTitle, title_for_activity};
///
/// let long = Activity::new("1", "2020-04-12 07:00:00").with_distance(21_097.5);
/// assert_eq!(title_for_activity(&long), RunTitle::HalfMarathon);
///
/// let evening = Activity::new("2", "2020-04-13 20:15:00").with_distance(5_000.0);
/// assert_eq!(title_for_activity(&evening).label(), "傍晚跑步");
/// ```
pub fn title_for_activity(activity: &Activity) -> RunTitle {
    let km = activity.distance() / 1000.0;
    if km > 20.0 && km < 40.0 {
        return RunTitle::HalfMarathon;
    }
    if km >= 40.0 {
        return RunTitle::Marathon;
    }

    match activity.start_hour() {
        Some(0..=8) => RunTitle::EarlyMorning,
        Some(9..=12) => RunTitle::Morning,
        Some(13..=18) => RunTitle::Afternoon,
        Some(19..=21) => RunTitle::Evening,
        _ => RunTitle::Night,
    }
}

/// Activities that fall into a title category.
pub fn filter_title_runs(activities: &[Activity], title: RunTitle) -> Vec<&Activity> {
    activities
        .iter()
        .filter(|a| title_for_activity(a) == title)
        .collect()
}

/// Map caption for a selected run: `"{name} {date} {km} KM"`.
///
/// ```
/// use running_stats::{Activity, title_for_show};
///
/// let run = Activity::new("1", "2020-04-12 07:00:00").with_distance(10_049.0).with_name("Morning Run");
/// assert_eq!(title_for_show(&run), "Morning Run 2020-04-12 10.0 KM");
/// ```
pub fn title_for_show(activity: &Activity) -> String {
    let name = activity
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("Run");
    format!(
        "{} {} {:.1} KM",
        name,
        activity.start_date(),
        activity.distance() / 1000.0
    )
}

/// Format an average speed (m/s) as pace per kilometer, `m:ss`.
///
/// Minutes and seconds are both floored, never rounded. The caller must not
/// pass a zero speed; summaries carry `None` instead.
///
/// ```
/// use running_stats::format_pace;
///
/// assert_eq!(format_pace(1000.0 / 300.0), "5:00");
/// assert_eq!(format_pace(1000.0 / 309.4), "5:09");
/// ```
pub fn format_pace(meters_per_second: f64) -> String {
    // seconds per km, snapped to micro-seconds so 299.99999999997 reads as 300
    let seconds_per_km = (1000.0 / meters_per_second * 1e6).round() / 1e6;
    let minutes = (seconds_per_km / 60.0).floor();
    let seconds = (seconds_per_km - minutes * 60.0).floor();
    format!("{}:{:02}", minutes as u64, seconds as u64)
}

/// Insert thousands separators into the integer part of a number.
///
/// ```
/// use running_stats::int_comma;
///
/// assert_eq!(int_comma(1234567), "1,234,567");
/// assert_eq!(int_comma(12345.6), "12,345.6");
/// assert_eq!(int_comma("365 day"), "365 day");
/// ```
pub fn int_comma(value: impl fmt::Display) -> String {
    let text = value.to_string();
    let digits_end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map_or(text.len(), |(i, _)| i);
    let (number, rest) = text.split_at(digits_end);
    let (sign, digits) = match number.strip_prefix('-') {
        Some(d) => ("-", d),
        None => ("", number),
    };

    let mut grouped = String::with_capacity(text.len() + digits.len() / 3);
    grouped.push_str(sign);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.push_str(rest);
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_at(time: &str, meters: f64) -> Activity {
        Activity::new("r", time).with_distance(meters)
    }

    #[test]
    fn test_distance_beats_time_of_day() {
        assert_eq!(title_for_activity(&run_at("2020-01-01 23:00:00", 42_195.0)), RunTitle::Marathon);
        assert_eq!(title_for_activity(&run_at("2020-01-01 23:00:00", 40_000.0)), RunTitle::Marathon);
        assert_eq!(title_for_activity(&run_at("2020-01-01 06:00:00", 20_500.0)), RunTitle::HalfMarathon);
        // exactly 20 km is not a half marathon
        assert_eq!(title_for_activity(&run_at("2020-01-01 06:00:00", 20_000.0)), RunTitle::EarlyMorning);
    }

    #[test]
    fn test_time_of_day_buckets() {
        let cases = [
            ("00:10:00", RunTitle::EarlyMorning),
            ("08:59:00", RunTitle::EarlyMorning),
            ("09:00:00", RunTitle::Morning),
            ("12:30:00", RunTitle::Morning),
            ("13:00:00", RunTitle::Afternoon),
            ("18:59:00", RunTitle::Afternoon),
            ("19:00:00", RunTitle::Evening),
            ("21:59:00", RunTitle::Evening),
            ("22:00:00", RunTitle::Night),
        ];
        for (time, expected) in cases {
            let run = run_at(&format!("2020-01-01 {time}"), 5_000.0);
            assert_eq!(title_for_activity(&run), expected, "{time}");
        }
    }

    #[test]
    fn test_unknown_hour_is_night() {
        assert_eq!(title_for_activity(&run_at("sometime", 5_000.0)), RunTitle::Night);
    }

    #[test]
    fn test_filter_title_runs() {
        let runs = vec![
            run_at("2020-01-01 07:00:00", 5_000.0),
            run_at("2020-01-02 20:00:00", 5_000.0),
            run_at("2020-01-03 06:00:00", 6_000.0),
        ];
        assert_eq!(filter_title_runs(&runs, RunTitle::EarlyMorning).len(), 2);
        assert!(filter_title_runs(&runs, RunTitle::Marathon).is_empty());
    }

    #[test]
    fn test_title_for_show_defaults_name() {
        let run = run_at("2020-04-12 07:00:00", 5_050.0);
        assert_eq!(title_for_show(&run), "Run 2020-04-12 5.0 KM");
        let blank = run.clone().with_name("  ");
        assert_eq!(title_for_show(&blank), "Run 2020-04-12 5.0 KM");
    }

    #[test]
    fn test_format_pace_floors_seconds() {
        assert_eq!(format_pace(1000.0 / 300.0), "5:00");
        // 5:09.4 and 5:09.9 both show 09
        assert_eq!(format_pace(1000.0 / 309.4), "5:09");
        assert_eq!(format_pace(1000.0 / 309.9), "5:09");
        assert_eq!(format_pace(1000.0 / 245.0), "4:05");
        assert_eq!(format_pace(2.0), "8:20");
    }

    #[test]
    fn test_int_comma() {
        assert_eq!(int_comma(0), "0");
        assert_eq!(int_comma(999), "999");
        assert_eq!(int_comma(1000), "1,000");
        assert_eq!(int_comma(-1234567), "-1,234,567");
        assert_eq!(int_comma("2345.6"), "2,345.6");
        assert_eq!(int_comma("Total"), "Total");
    }
}
