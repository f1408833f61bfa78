//! Application settings and path constants.

use std::path::{Path, PathBuf};


/// Database location used when `--db` is not given.
pub const DEFAULT_DB_PATH: &str = "toothbrush_data.db";

/// Format of the textual date columns in the database.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Spacing of x-axis ticks on daily charts.
pub const DAILY_TICK_INTERVAL_DAYS: i64 = 20;

/// Y-axis tick spacing for weekly "number" charts.
pub const WEEKLY_NUMBER_Y_STEP: f64 = 0.5;

/// Chart dimensions in pixels.
pub const CHART_WIDTH: i32 = 1000;
pub const CHART_HEIGHT: i32 = 600;


/// Get the database path, honoring an explicit override.
pub fn get_db_path(override_path: Option<&Path>) -> PathBuf {
    override_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}
