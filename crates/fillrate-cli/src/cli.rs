//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fillrate: measure how completely rows fill in combinations of fields
#[derive(Parser)]
#[command(name = "fillrate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count the rows satisfying each combination of fields
    Check {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE", required_unless_present = "config")]
        file: Option<PathBuf>,

        /// Load fields, invalid values and combinations from a session file
        #[arg(short, long, value_name = "SESSION")]
        config: Option<PathBuf>,

        /// Fields to check, e.g. "1,3,5" (default: all)
        #[arg(short, long)]
        fields: Option<String>,

        /// Values treated as missing, e.g. "3:NA:-:5:unknown"
        #[arg(short, long)]
        invalid_values: Option<String>,

        /// Combinations to check, e.g. "1:2,1:3/4" (default: all selected fields)
        #[arg(short = 'b', long)]
        combinations: Option<String>,

        /// Field delimiter: a single character or "tab" (default: detected)
        #[arg(short, long)]
        delimiter: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Save the configuration as a session file (default name is timestamped)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        save_config: Option<Option<PathBuf>>,

        /// Don't show progress
        #[arg(short, long)]
        quiet: bool,
    },

    /// List the fields of a data file with their numbers
    Fields {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Field delimiter: a single character or "tab" (default: detected)
        #[arg(short, long)]
        delimiter: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
    KeyValue,
}

impl OutputFormat {
    /// Formats meant for other programs; progress output would get in the way.
    pub fn is_machine_readable(&self) -> bool {
        !matches!(self, OutputFormat::Text)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "keyvalue" | "kv" => Ok(OutputFormat::KeyValue),
            _ => Err(format!(
                "Unknown format: {}. Use text, json, csv, or keyvalue.",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::KeyValue => write!(f, "keyvalue"),
        }
    }
}
