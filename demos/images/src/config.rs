//! Command line configuration

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_API_URL: &str = "http://localhost:3300";

/// Terminal client for the MRW.lol image list
#[derive(Parser, Debug, Clone)]
#[command(name = "mrw-images")]
#[command(about = "Browse the images stored on an MRW.lol server")]
pub struct Args {
    /// Base URL of the server; images are read from <URL>/api/images
    #[arg(long, env = "MRW_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Write logs to this file. Without it nothing is logged, since the
    /// terminal belongs to the UI.
    #[arg(long, env = "MRW_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Keep a log of dispatched actions and show the latest in a footer
    #[arg(long)]
    pub debug_actions: bool,
}
