//! Running page view state.
//!
//! [`RunView`] holds the two things a visitor can change on the running
//! page: which year (or the total) is shown, and which run in the table is
//! selected. Everything the page draws (table rows, map title, tracks,
//! viewport) is derived from that state plus the immutable activity list.
//! Row highlighting is a lookup against [`RunView::is_selected`].

use crate::format::title_for_show;
use crate::geojson::{track_midpoint, track_to_geojson, viewport_for_tracks};
use crate::stats::{comparator, filter_and_sort, years_present};
use crate::{Activity, FeatureCollection, GroupKey, MapViewport, SortKey, SortOrder, ViewportConfig};

/// Selected group, selected run and table ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunView {
    group: GroupKey,
    selected: Option<String>,
    sort: TableSort,
}

/// Activity table ordering. Newest runs first by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for TableSort {
    fn default() -> Self {
        Self {
            key: SortKey::StartTime,
            order: SortOrder::Descending,
        }
    }
}

impl RunView {
    /// A view opened on the newest year in `activities`, or the total if
    /// there are none.
    pub fn for_activities(activities: &[Activity]) -> Self {
        let group = years_present(activities)
            .into_iter()
            .next()
            .map_or(GroupKey::Total, GroupKey::Year);
        Self {
            group,
            ..Self::default()
        }
    }

    pub fn group(&self) -> &GroupKey {
        &self.group
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn sort(&self) -> TableSort {
        self.sort
    }

    /// Switch to another year or the total. Drops the run selection.
    pub fn select_group(&mut self, group: GroupKey) {
        self.group = group;
        self.selected = None;
    }

    /// Select a run by id, as when its table row is clicked.
    pub fn select_activity(&mut self, activity_id: impl Into<String>) {
        self.selected = Some(activity_id.into());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Whether a table row should be highlighted.
    pub fn is_selected(&self, activity: &Activity) -> bool {
        self.selected.as_deref() == Some(activity.id.as_str())
    }

    /// Sort the table by `key`. Picking the current column again flips the
    /// direction; a new column starts out descending.
    pub fn sort_by(&mut self, key: SortKey) {
        self.sort = if self.sort.key == key {
            TableSort {
                key,
                order: self.sort.order.toggle(),
            }
        } else {
            TableSort {
                key,
                order: SortOrder::Descending,
            }
        };
    }

    /// The selected run, if the id is still present in `activities`.
    pub fn selected_activity<'a>(&self, activities: &'a [Activity]) -> Option<&'a Activity> {
        let id = self.selected.as_deref()?;
        activities.iter().find(|a| a.id == id)
    }

    /// Activities drawn on the map: the selected run alone, otherwise the
    /// whole current group.
    pub fn visible_activities<'a>(&self, activities: &'a [Activity]) -> Vec<&'a Activity> {
        if let Some(run) = self.selected_activity(activities) {
            return vec![run];
        }
        activities.iter().filter(|a| self.group.matches(a)).collect()
    }

    /// The group listed in the activity table. The table always lists a
    /// single year; with the total selected it shows the newest one.
    pub fn table_group(&self, activities: &[Activity]) -> GroupKey {
        match &self.group {
            GroupKey::Year(_) => self.group.clone(),
            GroupKey::Total => years_present(activities)
                .into_iter()
                .next()
                .map_or(GroupKey::Total, GroupKey::Year),
        }
    }

    /// Rows of the activity table in the current sort order.
    pub fn table_rows<'a>(&self, activities: &'a [Activity]) -> Vec<&'a Activity> {
        let group = self.table_group(activities);
        filter_and_sort(activities, &group, comparator(self.sort.key, self.sort.order))
    }

    /// Caption over the map.
    pub fn title(&self, activities: &[Activity]) -> String {
        match self.selected_activity(activities) {
            Some(run) => title_for_show(run),
            None => format!("{} Running Heatmap", self.group),
        }
    }

    /// Tracks for the map source.
    pub fn geojson(&self, activities: &[Activity]) -> FeatureCollection {
        track_to_geojson(self.visible_activities(activities))
    }

    /// Where to point the map.
    ///
    /// A selected run is centred on its middle point at
    /// `selected_track_zoom`. `None` when there is nothing with points to
    /// show; the page keeps its current position then.
    pub fn viewport(&self, activities: &[Activity], config: &ViewportConfig) -> Option<MapViewport> {
        let tracks = self.geojson(activities);

        if self.selected_activity(activities).is_some() {
            let [longitude, latitude] = tracks.features.first().and_then(track_midpoint)?;
            return Some(MapViewport {
                longitude,
                latitude,
                zoom: config.selected_track_zoom,
            });
        }

        viewport_for_tracks(&tracks, activities.len(), config)
    }
}
