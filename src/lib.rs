#![allow(clippy::const_is_empty)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]

// Core modules
pub mod app;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod models;
pub mod ui;
pub mod utils;

// Re-export commonly used types outside of crate (for the analyze binary)
pub use app::App;
pub use config::PERSISTENCE;
pub use models::{Condition, ScanResult, parse_scan_response};

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Replay a saved scan response (JSON) instead of running a scanner
    #[arg(long)]
    pub results: Option<String>,

    /// External scan command: reads the request JSON on stdin, writes the response JSON to stdout
    #[arg(long)]
    pub scanner: Option<String>,

    /// Template library file
    #[arg(long)]
    pub templates: Option<String>,

    /// Start with the neutral category enabled
    #[arg(long, default_value_t = false)]
    pub include_neutral: bool,
}

/// Main application entry point - creates the GUI app
/// This is the public API for the binary to call
pub fn run_app(cc: &eframe::CreationContext<'_>, args: Cli) -> App {
    App::new(cc, args)
}
