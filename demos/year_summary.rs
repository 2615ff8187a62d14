//! Print the year-by-year stat blocks of a running page.
//!
//! Run with: cargo run --example year_summary [activities.json]
//!
//! Without an argument a small built-in history is used.

use running_stats::{
    Activity, GroupKey, activities_from_json, compute_streak, int_comma, summarize_by_group,
    summarize_locations, years_present, SortKey, SortOrder, comparator, filter_and_sort,
};

const SAMPLE: &str = r#"[
  {"run_id": 1, "name": "Morning Run", "distance": 5012.4, "start_date_local": "2019-11-02 06:40:12",
   "average_speed": 2.91, "streak": 1, "location_country": "星海广场, 沙河口区, 大连市, 辽宁省, 116021, 中国"},
  {"run_id": 2, "name": "Evening Run", "distance": 10230.0, "start_date_local": "2019-11-03 19:12:40",
   "average_speed": 3.05, "average_heartrate": 152.3, "streak": 2, "location_country": "中山区, 大连市, 辽宁省, 中国"},
  {"run_id": 3, "name": "Half", "distance": 21180.0, "start_date_local": "2020-04-12 07:00:00",
   "average_speed": 3.2, "average_heartrate": 161.0, "streak": 1, "location_country": "和平区, 沈阳市, 辽宁省, 中国"},
  {"run_id": 4, "distance": 6100.0, "start_date_local": "2020-04-13 06:30:00",
   "streak": 2, "location_country": "朝阳区, 北京市, 100020, 中国"},
  {"run_id": 5, "distance": 4000.0, "start_date_local": "2020-04-15 21:05:00", "streak": 1}
]"#;

fn main() -> running_stats::Result<()> {
    env_logger::init();

    let json = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("Could not read {}: {}", path, e);
            std::process::exit(1);
        }),
        None => SAMPLE.to_string(),
    };
    let activities: Vec<Activity> = activities_from_json(&json)?;

    println!("Running Stats\n");

    let mut groups: Vec<GroupKey> = years_present(&activities).into_iter().map(GroupKey::Year).collect();
    groups.push(GroupKey::Total);

    for group in &groups {
        let s = summarize_by_group(&activities, group);
        println!("{} 跑步旅程", s.label);
        println!("  {} Runs", int_comma(s.runs));
        println!("  {} KM", int_comma(format!("{:.1}", s.total_km)));
        println!("  {} Avg Pace", s.average_pace.as_deref().unwrap_or("-"));
        println!("  {} day Streak", s.max_streak);
        if let Some(hr) = s.average_heart_rate {
            println!("  {:.0} Avg Heart Rate", hr);
        }
    }

    let locations = summarize_locations(&activities);
    println!("\n{} years, {} countries, {} provinces, {} cities",
        locations.year_count(),
        locations.country_count(),
        locations.province_count(),
        locations.city_count()
    );
    for (city, meters) in locations.cities_by_distance() {
        println!("  {:<8} {:>8.1} KM", city, meters / 1000.0);
    }

    let newest_first = filter_and_sort(
        &activities,
        &GroupKey::Total,
        comparator(SortKey::StartTime, SortOrder::Descending),
    );
    let owned: Vec<Activity> = newest_first.into_iter().cloned().collect();
    println!("\nCurrent streak: {} days", compute_streak(&owned)?);

    Ok(())
}
