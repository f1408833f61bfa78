//! brushplot CLI
//!
//! Charts daily and weekly toothbrushing activity stored in SQLite.

mod cli;
mod commands;
mod config;
mod models;
mod storage;
mod table;
mod visualization;

use tracing_subscriber::EnvFilter;


fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
