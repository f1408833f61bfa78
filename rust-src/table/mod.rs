//! Tabular shaping of query results.

mod brushing_table;

#[allow(unused_imports)]
pub use brushing_table::{parse_date, BrushingRecord, BrushingTable, DeviceSeries, TableError};
