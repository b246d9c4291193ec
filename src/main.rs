use clap::{Parser, Subcommand};
use std::process;
use tracing::error;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Genetic on-call rotation scheduler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve a schedule for the window and save the best one.
    Search(cmd::search::SearchArgs),
    /// Score an existing schedule and print the per-rule statistics.
    Stats(cmd::stats::StatsArgs),
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Search(args) => cmd::search::run(args),
        Commands::Stats(args) => cmd::stats::run(args),
    };

    if let Err(e) = outcome {
        error!("{}", e);
        process::exit(1);
    }
}
