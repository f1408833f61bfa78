//! Named-column table built from raw query rows.

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::DATE_FORMAT;
use crate::models::{Granularity, Metric, Scope};
use crate::storage::RawRow;


const DAILY_COLUMNS: [&str; 4] = [
    "toothbrush_day_id",
    "date",
    "num_times_brushed",
    "total_time_brushed",
];

const WEEKLY_COLUMNS: [&str; 4] = [
    "toothbrush_week_id",
    "week_start_date",
    "avg_times_brushed_per_day",
    "avg_time_brushed_per_day",
];

const DEVICE_COLUMN: &str = "toothbrush_id";


#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Invalid date '{value}' in column '{column}' (expected YYYY-MM-DD)")]
    InvalidDate { column: &'static str, value: String },
}


/// Parse a textual date column value.
///
/// Accepts the output of formatting a parsed date, so parsing is idempotent.
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
}


/// One shaped row.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct BrushingRecord {
    pub device_id: String,
    pub period_id: i64,
    pub date: NaiveDate,
    pub events: Option<f64>,
    pub seconds: Option<f64>,
}


impl BrushingRecord {
    /// Value of the selected metric, if the row has stats.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Number => self.events,
            Metric::Time => self.seconds,
        }
    }
}


/// Points for a single device, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSeries {
    pub device_id: String,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}


/// Query result with named columns and parsed dates.
#[derive(Debug, Clone)]
pub struct BrushingTable {
    granularity: Granularity,
    columns: Vec<&'static str>,
    rows: Vec<BrushingRecord>,
}


impl BrushingTable {
    /// Shape raw rows, keeping their count and order.
    pub fn from_rows(
        granularity: Granularity,
        scope: &Scope,
        rows: Vec<RawRow>,
    ) -> Result<Self, TableError> {
        let mut columns = Vec::with_capacity(5);
        if *scope == Scope::AllDevices {
            columns.push(DEVICE_COLUMN);
        }
        columns.extend(match granularity {
            Granularity::Daily => DAILY_COLUMNS,
            Granularity::Weekly => WEEKLY_COLUMNS,
        });

        let date_column = granularity.date_column();
        let rows = rows
            .into_iter()
            .map(|raw| {
                let date = parse_date(&raw.date).map_err(|_| TableError::InvalidDate {
                    column: date_column,
                    value: raw.date.clone(),
                })?;
                Ok(BrushingRecord {
                    device_id: raw.device_id,
                    period_id: raw.period_id,
                    date,
                    events: raw.events,
                    seconds: raw.seconds,
                })
            })
            .collect::<Result<Vec<_>, TableError>>()?;

        Ok(Self {
            granularity,
            columns,
            rows,
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    #[allow(dead_code)]
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn rows(&self) -> &[BrushingRecord] {
        &self.rows
    }

    /// Whether the rows span every device rather than one.
    pub fn covers_all_devices(&self) -> bool {
        self.columns.first() == Some(&DEVICE_COLUMN)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct device ids in order of first appearance.
    pub fn device_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !ids.contains(&row.device_id.as_str()) {
                ids.push(&row.device_id);
            }
        }
        ids
    }

    /// Split the selected metric into one series per device.
    pub fn series(&self, metric: Metric) -> Vec<DeviceSeries> {
        self.device_ids()
            .into_iter()
            .map(|id| DeviceSeries {
                device_id: id.to_string(),
                points: self
                    .rows
                    .iter()
                    .filter(|row| row.device_id == id)
                    .map(|row| (row.date, row.metric(metric)))
                    .collect(),
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn raw(device: &str, id: i64, date: &str, events: Option<f64>, seconds: Option<f64>) -> RawRow {
        RawRow {
            device_id: device.to_string(),
            period_id: id,
            date: date.to_string(),
            events,
            seconds,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_rows_give_empty_table() {
        let table = BrushingTable::from_rows(
            Granularity::Daily,
            &Scope::Device("7".to_string()),
            Vec::new(),
        )
        .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.columns(), DAILY_COLUMNS);
    }

    #[test]
    fn test_preserves_count_and_order() {
        let rows = vec![
            raw("7", 1, "2024-01-01", Some(2.0), Some(120.0)),
            raw("7", 3, "2024-01-03", Some(1.0), Some(45.0)),
        ];
        let table = BrushingTable::from_rows(
            Granularity::Daily,
            &Scope::Device("7".to_string()),
            rows,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].date, ymd(2024, 1, 1));
        assert_eq!(table.rows()[1].date, ymd(2024, 1, 3));
        assert_eq!(table.rows()[0].metric(Metric::Number), Some(2.0));
        assert_eq!(table.rows()[1].metric(Metric::Time), Some(45.0));
    }

    #[test]
    fn test_all_devices_adds_device_column() {
        let table =
            BrushingTable::from_rows(Granularity::Weekly, &Scope::AllDevices, Vec::new()).unwrap();
        assert_eq!(table.columns()[0], "toothbrush_id");
        assert_eq!(table.columns()[2], "week_start_date");
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let err = BrushingTable::from_rows(
            Granularity::Weekly,
            &Scope::AllDevices,
            vec![raw("1", 1, "01/08/2024", None, None)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TableError::InvalidDate {
                column: "week_start_date",
                value: "01/08/2024".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_date_is_idempotent() {
        for value in ["2024-01-01", "2023-12-31", "2024-02-29"] {
            let once = parse_date(value).unwrap();
            let twice = parse_date(&once.format(DATE_FORMAT).to_string()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_series_per_device_in_first_appearance_order() {
        let rows = vec![
            raw("2", 10, "2024-01-01", Some(1.5), Some(90.0)),
            raw("2", 11, "2024-01-08", None, None),
            raw("1", 12, "2024-01-01", Some(2.5), Some(130.0)),
        ];
        let table = BrushingTable::from_rows(Granularity::Weekly, &Scope::AllDevices, rows).unwrap();

        assert_eq!(table.device_ids(), ["2", "1"]);

        let series = table.series(Metric::Time);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].device_id, "2");
        assert_eq!(
            series[0].points,
            vec![(ymd(2024, 1, 1), Some(90.0)), (ymd(2024, 1, 8), None)]
        );
        assert_eq!(series[1].points, vec![(ymd(2024, 1, 1), Some(130.0))]);
    }
}
