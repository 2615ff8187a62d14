//! Drive the running page state the way a visitor would: pick a year,
//! click a run, read back the map and table.
//!
//! Run with: cargo run --example running_page --features parallel

use std::time::Instant;

use running_stats::{
    Activity, GpsPoint, GroupKey, PoiConfig, PointOfInterest, RunView, ViewportConfig, format_pace,
    encode_track, pois_for_activities_parallel, title_for_activity, track_to_geojson_parallel,
};

fn main() -> running_stats::Result<()> {
    env_logger::init();

    let activities = sample_history();
    println!("Running Page Example ({} activities)\n", activities.len());

    let start = Instant::now();
    let all_tracks = track_to_geojson_parallel(&activities);
    println!(
        "Decoded {} tracks in {:?}, {} empty",
        all_tracks.len(),
        start.elapsed(),
        all_tracks.features.iter().filter(|f| f.is_empty()).count()
    );

    let pois = vec![
        PointOfInterest::new("星海广场", 38.8790, 121.5800),
        PointOfInterest::new("老虎滩", 38.8700, 121.6700),
    ];
    for tagged in pois_for_activities_parallel(&activities, &pois, &PoiConfig::default()) {
        println!("  {} passes {:?}", tagged.activity_id, tagged.pois);
    }

    let config = ViewportConfig::default();
    let mut view = RunView::for_activities(&activities);
    print_page(&view, &activities, &config);

    view.select_group(GroupKey::Year("2019".into()));
    print_page(&view, &activities, &config);

    if let Some(first) = view.table_rows(&activities).first() {
        view.select_activity(first.id.clone());
    }
    print_page(&view, &activities, &config);

    println!("GeoJSON: {}", view.geojson(&activities).to_json()?);
    Ok(())
}

fn print_page(view: &RunView, activities: &[Activity], config: &ViewportConfig) {
    println!("\n== {} ==", view.title(activities));
    match view.viewport(activities, config) {
        Some(v) => println!("map: {:.4}, {:.4} @ zoom {}", v.latitude, v.longitude, v.zoom),
        None => println!("map: unchanged"),
    }
    for run in view.table_rows(activities) {
        let marker = if view.is_selected(run) { ">" } else { " " };
        println!(
            "{} {:<6} {:>5.1} {:>5} {}",
            marker,
            title_for_activity(run).label(),
            run.distance() / 1000.0,
            run.speed().map(format_pace).unwrap_or_default(),
            run.start_time
        );
    }
}

/// Out-and-back loops along the Dalian seafront, one per day.
fn sample_history() -> Vec<Activity> {
    let mut activities = Vec::new();
    for day in 0..40 {
        let year = if day < 20 { 2019 } else { 2020 };
        let start = GpsPoint::new(38.8790 + day as f64 * 0.0001, 121.5700);
        let track: Vec<GpsPoint> = (0..30)
            .map(|i| GpsPoint::new(start.latitude, start.longitude + i as f64 * 0.0005))
            .collect();

        let mut run = Activity::new(
            format!("run-{day}"),
            format!("{}-05-{:02} {:02}:15:00", year, day % 20 + 1, 6 + day % 15),
        )
        .with_distance(3_000.0 + day as f64 * 450.0)
        .with_speed(2.6 + (day % 7) as f64 * 0.1)
        .with_name("Seafront Run");
        if day % 9 != 0 {
            run = run.with_track(encode_track(&track).unwrap_or_default());
        }
        activities.push(run);
    }
    activities
}
