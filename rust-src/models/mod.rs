//! Domain models for brushing reports.

mod brushing;

#[allow(unused_imports)]
pub use brushing::{Granularity, Metric, ModelError, Scope};
