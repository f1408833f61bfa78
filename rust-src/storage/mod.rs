//! Storage layer for recorded brushing sessions.

mod database;

#[allow(unused_imports)]
pub use database::{init_database, BrushingStore, RawRow};
