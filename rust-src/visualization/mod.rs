//! Visualization layer for brushing charts.

mod chart;
mod export;
mod svg;

#[allow(unused_imports)]
pub use chart::{ChartLine, ChartStyle, LineChart, Tick};
#[allow(unused_imports)]
pub use export::{export_chart, export_chart_png, export_chart_svg, open_file, show_chart};
#[allow(unused_imports)]
pub use svg::generate_svg;
