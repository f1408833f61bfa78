//! Report selectors: granularity, scope and metric.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;


/// Sentinel accepted at the device prompt to select every device.
pub const ALL_DEVICES_SENTINEL: &str = "all";


/// Errors raised while validating user-supplied selectors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid plot type. Please enter 'number' or 'time'.")]
    InvalidMetric(String),
}


/// Aggregation level of the stored records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Weekly,
}


impl Granularity {
    /// Name of the date column for this granularity.
    pub fn date_column(&self) -> &'static str {
        match self {
            Granularity::Daily => "date",
            Granularity::Weekly => "week_start_date",
        }
    }
}


impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::Weekly => write!(f, "weekly"),
        }
    }
}


/// Which devices a report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Device(String),
    AllDevices,
}


impl Scope {
    /// Interpret the raw device prompt answer.
    ///
    /// Surrounding whitespace is ignored and `all` matches case-insensitively.
    /// Anything else, even an empty answer, names a single device.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case(ALL_DEVICES_SENTINEL) {
            Scope::AllDevices
        } else {
            Scope::Device(trimmed.to_string())
        }
    }

    /// Message shown when a query comes back empty.
    pub fn no_data_message(&self) -> String {
        match self {
            Scope::Device(id) => format!("No data found for toothbrush ID '{}'.", id),
            Scope::AllDevices => "No data found for any toothbrush.".to_string(),
        }
    }
}


/// Quantity plotted on the y-axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Brushing events (a count per day, or an average per day for weeks).
    Number,
    /// Seconds brushed (a daily total, or a per-day average for weeks).
    Time,
}


impl Metric {
    /// Y-axis label. Daily time is a total, weekly time an average.
    pub fn axis_label(&self, granularity: Granularity) -> &'static str {
        match (self, granularity) {
            (Metric::Number, Granularity::Daily) => "Number of Brushes",
            (Metric::Time, Granularity::Daily) => "Time Spent Brushing (seconds)",
            (Metric::Number, Granularity::Weekly) => "Average Brushes per Day",
            (Metric::Time, Granularity::Weekly) => "Average Time Brushing per Day (seconds)",
        }
    }

    /// Chart title.
    pub fn title(&self, granularity: Granularity) -> &'static str {
        match (self, granularity) {
            (Metric::Number, Granularity::Daily) => "Number of Brushes per Day",
            (Metric::Time, Granularity::Daily) => "Time Spent Brushing per Day",
            (Metric::Number, Granularity::Weekly) => "Average Number of Brushes per Day by Week",
            (Metric::Time, Granularity::Weekly) => "Average Time Spent Brushing per Day by Week",
        }
    }
}


impl FromStr for Metric {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "number" => Ok(Metric::Number),
            "time" => Ok(Metric::Time),
            _ => Err(ModelError::InvalidMetric(s.to_string())),
        }
    }
}


impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Number => write!(f, "number"),
            Metric::Time => write!(f, "time"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_accepts_known_tokens() {
        assert_eq!("number".parse::<Metric>(), Ok(Metric::Number));
        assert_eq!("time".parse::<Metric>(), Ok(Metric::Time));
        assert_eq!("  TIME \n".parse::<Metric>(), Ok(Metric::Time));
    }

    #[test]
    fn test_metric_rejects_everything_else() {
        for token in ["", "count", "numbers", "t", "seconds"] {
            let err = token.parse::<Metric>().unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid plot type. Please enter 'number' or 'time'."
            );
        }
    }

    #[test]
    fn test_scope_sentinel_is_case_insensitive() {
        assert_eq!(Scope::from_input("all"), Scope::AllDevices);
        assert_eq!(Scope::from_input(" ALL "), Scope::AllDevices);
        assert_eq!(Scope::from_input("All"), Scope::AllDevices);
        assert_eq!(Scope::from_input(" 7 "), Scope::Device("7".to_string()));
        assert_eq!(Scope::from_input("allx"), Scope::Device("allx".to_string()));
    }

    #[test]
    fn test_no_data_message() {
        let scope = Scope::Device("42".to_string());
        assert_eq!(scope.no_data_message(), "No data found for toothbrush ID '42'.");
    }

    #[test]
    fn test_time_labels_distinguish_total_and_average() {
        let daily = Metric::Time.axis_label(Granularity::Daily);
        let weekly = Metric::Time.axis_label(Granularity::Weekly);
        assert_ne!(daily, weekly);
        assert!(weekly.contains("Average"));
        assert!(!daily.contains("Average"));
    }
}
