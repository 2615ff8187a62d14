//! Error types for running-stats

use thiserror::Error;

/// Errors surfaced by the aggregation functions.
///
/// Missing optional data (speed, heart rate, tracks) is never an error; it is
/// simply left out of the aggregate. Only input that cannot be interpreted at
/// all ends up here.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Invalid group key: {0} (expected a 4-digit year or \"Total\")")]
    InvalidGroupKey(String),

    #[error("Invalid start time {value:?} for activity {activity_id}")]
    InvalidTimestamp { activity_id: String, value: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, StatsError>;
