use clap::{Args, Parser, Subcommand};
use defects::config::OnCorrupt;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "defects")]
#[command(about = "Defect capture server backed by a flat JSON store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the record file, images and config.json
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Explicit config file (defaults to <data-dir>/config.json if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// What to do when the record file cannot be read: fail | start-empty
    #[arg(long, global = true)]
    pub on_corrupt: Option<OnCorrupt>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve(ServeArgs),

    /// Load the store and report how many defects it holds
    Check,
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port to listen on (overrides config and $PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    pub bind: Option<String>,
}
