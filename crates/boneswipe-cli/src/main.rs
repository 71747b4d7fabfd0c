//! boneswipe CLI
//!
//! Command-line interface for walking scene files with rule sets

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "boneswipe")]
#[command(about = "boneswipe - rule-driven hierarchy walker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk a scene file, running rules on every node
    Walk(commands::walk::WalkArgs),
    /// Compile a rule expression without running it
    Check(commands::check::CheckArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Walk(args) => commands::walk::execute(args),
        Commands::Check(args) => commands::check::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
