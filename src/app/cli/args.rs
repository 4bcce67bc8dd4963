//! Command-line arguments
//!
//! Global options override the config file; the subcommand selects what runs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "ecoscan")]
#[command(about = "Scan product barcodes and track their sustainability")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Product service base URL
    #[arg(short = 'u', long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Directory holding scan history and recent products
    #[arg(short = 'd', long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Seconds to wait for a barcode before giving up
    #[arg(
        short = 't',
        long = "scan-timeout",
        value_name = "SECONDS",
        allow_negative_numbers = true,
        global = true
    )]
    pub scan_timeout: Option<i64>,

    /// Seconds to wait for the product service
    #[arg(
        long = "request-timeout",
        value_name = "SECONDS",
        allow_negative_numbers = true,
        global = true
    )]
    pub request_timeout: Option<i64>,

    /// Force coloured output
    #[arg(short = 'g', long = "color", conflicts_with = "no_color", global = true)]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"], global = true)]
    pub log_level: Option<String>,

    #[arg(
        short = 'f',
        long = "log-file",
        value_name = "FILE",
        help = "Log file path (use 'none' to disable file logging)",
        global = true
    )]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "simple", "ext", "json"], global = true)]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Scan a barcode; each line on stdin is one decoder reading
    Scan,

    /// Look a barcode up and record it in the history
    Lookup {
        #[arg(value_name = "BARCODE")]
        barcode: String,
    },

    /// Suggest eco-friendly alternatives for a product
    Suggest {
        #[arg(value_name = "PRODUCT_NAME", required = true, num_args = 1..)]
        product_name: Vec<String>,
    },

    /// Show the scan history, newest first
    History {
        /// Only show the latest N scans
        #[arg(short = 'n', long = "limit", value_name = "COUNT")]
        limit: Option<usize>,
    },

    /// Show recently viewed products
    Recent {
        /// Hand this product over to the next `show`
        #[arg(long = "select", value_name = "BARCODE")]
        select: Option<String>,
    },

    /// Show the selected product and clear the selection
    Show,

    /// Usage analytics over the scan history
    Analytics {
        /// Number of ranked products to list
        #[arg(long = "top", value_name = "COUNT", default_value_t = 10)]
        top: usize,
    },
}

impl Args {
    /// Colour choice from the flags; `None` means detect from the terminal
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Scan => "scan",
            Command::Lookup { .. } => "lookup",
            Command::Suggest { .. } => "suggest",
            Command::History { .. } => "history",
            Command::Recent { .. } => "recent",
            Command::Show => "show",
            Command::Analytics { .. } => "analytics",
        }
    }
}

/// Colour setting visible before the full parse, for styling help output
pub fn initial_color_choice(argv: &[String]) -> Option<bool> {
    let mut choice = None;
    for arg in argv.iter().skip(1) {
        match arg.as_str() {
            "--" => break,
            "--color" | "-g" => choice = Some(true),
            "--no-color" => choice = Some(false),
            _ => {}
        }
    }
    choice
}
