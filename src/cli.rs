use clap::{Parser, Subcommand};
use feedrace::humanize::HumanDuration;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "feedrace")]
#[command(about = "Fetch a feed by racing several delivery paths", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $FEEDRACE_CONFIG or config/feedrace.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Race every delivery path and print the first body to arrive
    Fetch(FetchArgs),
    /// Show the concrete address each delivery path would request
    Paths(PathsArgs),
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// Feed URL
    pub url: String,

    /// Override the race deadline (e.g. "45s", "500ms")
    #[arg(long)]
    pub deadline: Option<HumanDuration>,
}

#[derive(clap::Args, Debug)]
pub struct PathsArgs {
    /// Feed URL
    pub url: String,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}
