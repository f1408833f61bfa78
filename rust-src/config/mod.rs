//! Configuration constants for brushplot.

mod settings;

pub use settings::{
    get_db_path,
    CHART_HEIGHT,
    CHART_WIDTH,
    DAILY_TICK_INTERVAL_DAYS,
    DATE_FORMAT,
    DEFAULT_DB_PATH,
    WEEKLY_NUMBER_Y_STEP,
};
