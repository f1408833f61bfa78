//! Plot command: prompt, query, shape and render one report.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::get_db_path;
use crate::models::{Granularity, Metric, Scope};
use crate::storage::BrushingStore;
use crate::table::BrushingTable;
use crate::visualization::{export_chart, show_chart, LineChart};


const DEVICE_PROMPT: &str = "Enter the toothbrush ID (or 'all'): ";
const METRIC_PROMPT: &str = "Enter the type of graph ('number' or 'time'): ";


/// Result of the query/shape stages.
#[derive(Debug)]
pub enum ReportOutcome {
    /// Nothing recorded for the requested scope.
    NoData,
    /// Data exists but the metric answer was not recognized.
    InvalidMetric,
    /// A chart ready to be shown.
    Chart(LineChart),
}


/// Run the plot command for one granularity.
pub fn run(granularity: Granularity, db: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let db_path = get_db_path(db.as_deref());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let outcome = {
        let store = BrushingStore::open(&db_path)?;
        let outcome = build_report(&store, granularity, &mut input, &mut out)?;
        store.close()?;
        outcome
    };

    if let ReportOutcome::Chart(chart) = outcome {
        present(&chart, output.as_deref(), &mut input, &mut out)?;
    }

    Ok(())
}


/// Prompt for scope and metric, then query and shape the records.
///
/// Messages for the "no data" and "invalid metric" cases are written to
/// `out`; neither is an error. No data takes precedence over a bad metric.
pub fn build_report<R: BufRead, W: Write>(
    store: &BrushingStore,
    granularity: Granularity,
    input: &mut R,
    out: &mut W,
) -> Result<ReportOutcome> {
    let scope = Scope::from_input(&prompt(input, out, DEVICE_PROMPT)?);
    let metric = prompt(input, out, METRIC_PROMPT)?.parse::<Metric>();

    let rows = store.fetch(granularity, &scope)?;
    let table = BrushingTable::from_rows(granularity, &scope, rows)?;

    if table.is_empty() {
        writeln!(out, "{}", scope.no_data_message())?;
        return Ok(ReportOutcome::NoData);
    }

    let metric = match metric {
        Ok(metric) => metric,
        Err(e) => {
            writeln!(out, "{}", e)?;
            return Ok(ReportOutcome::InvalidMetric);
        }
    };

    info!(%granularity, %metric, rows = table.len(), "building chart");

    Ok(ReportOutcome::Chart(LineChart::build(&table, metric)))
}


fn present<R: BufRead, W: Write>(
    chart: &LineChart,
    output: Option<&Path>,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    match output {
        Some(path) => {
            export_chart(chart, path)?;
            writeln!(out, "\x1b[32m+ Chart saved to: {}\x1b[0m", path.display())?;
        }
        None => show_chart(chart, input, out)?,
    }

    Ok(())
}


fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<String> {
    write!(out, "{}", message)?;
    out.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read input")?;
    if read == 0 {
        anyhow::bail!("Unexpected end of input");
    }

    Ok(line.trim().to_string())
}
