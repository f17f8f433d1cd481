mod config;
mod context;
mod engine;
mod fallback;
mod startup;

use clap::{Parser, Subcommand};
use colored::Colorize;
use context::StartupContext;

#[derive(Parser)]
#[clap(name = "kidou")]
#[clap(about = "A bootstrap launcher for static site engines", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Start,
    Dev,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let ctx = match StartupContext::from_env() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{} {}", "Error reading startup context:".red(), e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Start => startup::start(&ctx).await,
        Commands::Dev => startup::dev(&ctx).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}
