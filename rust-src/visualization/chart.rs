//! Line chart model built from a shaped table.
//!
//! Everything here is pure data; drawing happens in `svg` and `export`.

use chrono::{Datelike, Duration, NaiveDate};

use crate::config::{DAILY_TICK_INTERVAL_DAYS, DATE_FORMAT, WEEKLY_NUMBER_Y_STEP};
use crate::models::{Granularity, Metric};
use crate::table::BrushingTable;


// Matplotlib's default cycle, so multi-device charts look familiar.
const LINE_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

const WEEKLY_TICK_FORMAT: &str = "%b %Y";
const TARGET_Y_TICKS: f64 = 8.0;
const MAX_Y_TICKS: f64 = 40.0;


/// Visual parameters that differ between daily and weekly charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub line_width: f64,
    pub marker_radius: f64,
    pub title_font: u32,
    pub label_font: u32,
    pub tick_font: u32,
    pub legend_font: u32,
}


impl ChartStyle {
    pub fn for_granularity(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Daily => Self {
                line_width: 1.5,
                marker_radius: 3.5,
                title_font: 18,
                label_font: 14,
                tick_font: 11,
                legend_font: 12,
            },
            Granularity::Weekly => Self {
                line_width: 3.0,
                marker_radius: 4.5,
                title_font: 22,
                label_font: 18,
                tick_font: 14,
                legend_font: 14,
            },
        }
    }
}


/// An axis tick at a data-space position.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}


/// One plotted line. Missing values split it into separate segments.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub label: Option<String>,
    pub color: &'static str,
    pub segments: Vec<Vec<(NaiveDate, f64)>>,
}


impl ChartLine {
    /// Every drawn point, in order.
    pub fn points(&self) -> Vec<(NaiveDate, f64)> {
        self.segments.iter().flatten().copied().collect()
    }
}


/// Complete description of a chart, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub rotate_x_labels: bool,
    pub lines: Vec<ChartLine>,
    pub show_legend: bool,
    pub style: ChartStyle,
}


impl LineChart {
    /// Build the chart for `metric` over a non-empty table.
    pub fn build(table: &BrushingTable, metric: Metric) -> Self {
        let granularity = table.granularity();
        let all_devices = table.covers_all_devices();

        let lines: Vec<ChartLine> = table
            .series(metric)
            .into_iter()
            .enumerate()
            .map(|(idx, series)| ChartLine {
                label: all_devices.then(|| format!("Toothbrush {}", series.device_id)),
                color: LINE_COLORS[idx % LINE_COLORS.len()],
                segments: split_segments(&series.points),
            })
            .collect();

        let dates: Vec<NaiveDate> = table.rows().iter().map(|r| r.date).collect();
        let first = dates.iter().min().copied();
        let last = dates.iter().max().copied();

        let x_ticks = match (first, last) {
            (Some(first), Some(last)) => match granularity {
                Granularity::Daily => daily_ticks(first, last),
                Granularity::Weekly => weekly_ticks(first, last),
            },
            _ => Vec::new(),
        };
        let x_bounds = x_range(first, last);

        let values: Vec<f64> = lines.iter().flat_map(|l| l.points()).map(|(_, v)| v).collect();
        let fixed_step = (granularity == Granularity::Weekly && metric == Metric::Number)
            .then_some(WEEKLY_NUMBER_Y_STEP);
        let (y_range, y_ticks) = y_axis(&values, fixed_step);

        Self {
            title: metric.title(granularity).to_string(),
            x_label: "Date".to_string(),
            y_label: metric.axis_label(granularity).to_string(),
            x_range: x_bounds,
            y_range,
            x_ticks,
            y_ticks,
            rotate_x_labels: true,
            lines,
            show_legend: all_devices,
            style: ChartStyle::for_granularity(granularity),
        }
    }

    /// Legend labels, one per device on all-device charts.
    pub fn legend_entries(&self) -> Vec<&str> {
        if !self.show_legend {
            return Vec::new();
        }
        self.lines.iter().filter_map(|l| l.label.as_deref()).collect()
    }
}


/// Position of a date on the x-axis.
pub fn date_position(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}


fn split_segments(points: &[(NaiveDate, Option<f64>)]) -> Vec<Vec<(NaiveDate, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();

    for &(date, value) in points {
        match value {
            Some(v) if v.is_finite() => current.push((date, v)),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}


fn x_range(first: Option<NaiveDate>, last: Option<NaiveDate>) -> (f64, f64) {
    let (Some(first), Some(last)) = (first, last) else {
        return (0.0, 1.0);
    };

    let lo = date_position(first);
    let hi = date_position(last);
    let pad = ((hi - lo) * 0.03).max(1.0);
    (lo - pad, hi + pad)
}


/// Ticks every fixed number of days, anchored on the first date.
fn daily_ticks(first: NaiveDate, last: NaiveDate) -> Vec<Tick> {
    let mut ticks = Vec::new();
    let mut current = first;

    while current <= last {
        ticks.push(Tick {
            value: date_position(current),
            label: current.format(DATE_FORMAT).to_string(),
        });
        current += Duration::days(DAILY_TICK_INTERVAL_DAYS);
    }

    ticks
}


/// Ticks on the first of each month inside the range.
///
/// Ranges shorter than a month fall back to a single tick on the first date.
fn weekly_ticks(first: NaiveDate, last: NaiveDate) -> Vec<Tick> {
    let mut ticks = Vec::new();
    let mut current = month_start(first);
    if current < first {
        current = next_month(current);
    }

    while current <= last {
        ticks.push(Tick {
            value: date_position(current),
            label: current.format(WEEKLY_TICK_FORMAT).to_string(),
        });
        current = next_month(current);
    }

    if ticks.is_empty() {
        ticks.push(Tick {
            value: date_position(first),
            label: first.format(DATE_FORMAT).to_string(),
        });
    }

    ticks
}


fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}


fn next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date + Duration::days(31))
}


/// Y range and ticks. The range always includes zero.
fn y_axis(values: &[f64], fixed_step: Option<f64>) -> ((f64, f64), Vec<Tick>) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    let lo = if min.is_finite() { min.min(0.0) } else { 0.0 };
    let mut hi = if max.is_finite() { max.max(0.0) } else { 1.0 };
    if hi <= lo {
        hi = lo + 1.0;
    }

    let step = match fixed_step {
        Some(step) if (hi - lo) / step <= MAX_Y_TICKS => step,
        _ => nice_step((hi - lo) / TARGET_Y_TICKS),
    };

    let lo = (lo / step).floor() * step;
    let mut hi = (hi / step).ceil() * step;
    if hi <= lo {
        hi = lo + step;
    }

    let count = ((hi - lo) / step).round() as usize;
    let ticks = (0..=count)
        .map(|i| {
            let value = lo + i as f64 * step;
            Tick {
                value,
                label: format_tick(value, step),
            }
        })
        .collect();

    ((lo, hi), ticks)
}


/// Round a raw step up to 1, 2 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }

    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice * magnitude
}


fn format_tick(value: f64, step: f64) -> String {
    if step.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        let decimals = (-step.log10().floor()).max(1.0) as usize;
        format!("{:.*}", decimals, value)
    }
}
