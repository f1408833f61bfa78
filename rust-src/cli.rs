//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands;
use crate::models::Granularity;


/// brushplot - chart toothbrushing activity from the local database
#[derive(Parser)]
#[command(name = "brushplot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}


#[derive(Subcommand)]
enum Commands {
    /// Plot per-day brushing counts or total time
    Daily(PlotArgs),

    /// Plot per-week averages of brushing counts or time
    Weekly(PlotArgs),
}


#[derive(Args)]
struct PlotArgs {
    /// Database path (default: ./toothbrush_data.db)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Save the chart to this file (.svg or .png) instead of displaying it
    #[arg(short, long)]
    output: Option<PathBuf>,
}


/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Daily(args)) => {
            commands::plot::run(Granularity::Daily, args.db, args.output)?;
        }
        Some(Commands::Weekly(args)) => {
            commands::plot::run(Granularity::Weekly, args.db, args.output)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
