mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use feedrace::config::Config;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    feedrace::observability::init_tracing();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    let code = match cli.command {
        Commands::Fetch(args) => commands::fetch(config, args).await?,
        Commands::Paths(args) => commands::paths(config, args)?,
    };

    Ok(code)
}
