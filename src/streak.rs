//! Consecutive-day run streaks.

use chrono::NaiveDate;

use crate::{Activity, Result};

/// Count the current streak of consecutive run days.
///
/// `activities` must be sorted newest first, with runs too short to count
/// already removed. Start times are reduced to their local calendar day and
/// the scan walks backwards from the newest day:
///
/// - same day or the previous day: the streak continues
/// - a gap of two days: forgiven once as a rest day, then the streak continues
/// - anything else (a second two-day gap, a longer gap, out-of-order input): stop
///
/// The count starts at 1, so an empty slice also yields 1.
///
/// ```
/// use running_stats::{Activity, compute_streak};
///
/// let runs = vec![
///     Activity::new("3", "2020-05-10 07:00:00"),
///     Activity::new("2", "2020-05-09 19:00:00"),
///     Activity::new("1", "2020-05-07 06:30:00"), // 05-08 was a rest day
/// ];
/// assert_eq!(compute_streak(&runs).unwrap(), 3);
/// ```
///
/// # Errors
///
/// [`StatsError::InvalidTimestamp`](crate::StatsError::InvalidTimestamp) when
/// a start time the scan reaches cannot be parsed.
pub fn compute_streak(activities: &[Activity]) -> Result<u32> {
    let mut streak = 1;
    let mut rest_day_used = false;

    let mut days = activities.iter().map(|a| a.start_datetime().map(|t| t.date()));
    let Some(first) = days.next() else {
        return Ok(streak);
    };
    let mut previous: NaiveDate = first?;

    for day in days {
        let day = day?;
        match (previous - day).num_days() {
            0 | 1 => streak += 1,
            2 if !rest_day_used => {
                rest_day_used = true;
                streak += 1;
            }
            _ => break,
        }
        previous = day;
    }

    Ok(streak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatsError;

    fn runs(times: &[&str]) -> Vec<Activity> {
        times
            .iter()
            .enumerate()
            .map(|(i, t)| Activity::new(i.to_string(), *t))
            .collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(compute_streak(&[]).unwrap(), 1);
        assert_eq!(compute_streak(&runs(&["2020-05-10 07:00:00"])).unwrap(), 1);
    }

    #[test]
    fn test_one_rest_day_is_forgiven() {
        // D, D-1, D-3
        let history = runs(&["2020-05-10 07:00:00", "2020-05-09 07:00:00", "2020-05-07 07:00:00"]);
        assert_eq!(compute_streak(&history).unwrap(), 3);
    }

    #[test]
    fn test_three_day_gap_ends_streak() {
        // D, D-1, D-4
        let history = runs(&["2020-05-10 07:00:00", "2020-05-09 07:00:00", "2020-05-06 07:00:00"]);
        assert_eq!(compute_streak(&history).unwrap(), 2);
    }

    #[test]
    fn test_second_rest_day_ends_streak() {
        let history = runs(&[
            "2020-05-10 07:00:00",
            "2020-05-08 07:00:00",
            "2020-05-07 07:00:00",
            "2020-05-05 07:00:00",
            "2020-05-04 07:00:00",
        ]);
        assert_eq!(compute_streak(&history).unwrap(), 3);
    }

    #[test]
    fn test_same_day_runs_count() {
        let history = runs(&["2020-05-10 19:00:00", "2020-05-10 06:00:00", "2020-05-09 23:59:59"]);
        assert_eq!(compute_streak(&history).unwrap(), 3);
    }

    #[test]
    fn test_day_boundary_uses_calendar_day() {
        // 00:10 and the previous evening are one calendar day apart
        let history = runs(&["2020-05-10 00:10:00", "2020-05-09 23:50:00"]);
        assert_eq!(compute_streak(&history).unwrap(), 2);
    }

    #[test]
    fn test_unsorted_input_stops() {
        let history = runs(&["2020-05-09 07:00:00", "2020-05-10 07:00:00"]);
        assert_eq!(compute_streak(&history).unwrap(), 1);
    }

    #[test]
    fn test_bad_timestamp_is_reported() {
        let history = runs(&["2020-05-10 07:00:00", "not a date"]);
        let err = compute_streak(&history).unwrap_err();
        assert!(matches!(err, StatsError::InvalidTimestamp { ref value, .. } if value == "not a date"));
    }
}
