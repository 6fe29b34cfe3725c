//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dtomap: safe field mapping from untyped JSON
#[derive(Parser)]
#[command(name = "dtomap")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map a JSON document through a rule file
    Map {
        /// Path to the rule file (JSON)
        #[arg(value_name = "RULES")]
        rules: PathBuf,

        /// Path to the raw JSON input (default: stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,

        /// Write the mapped JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report which fields fell back, and why, on stderr
        #[arg(long)]
        audit: bool,

        /// Emit compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Validate a rule file and list its rules
    Check {
        /// Path to the rule file (JSON)
        #[arg(value_name = "RULES")]
        rules: PathBuf,

        /// Print the normalized rule file as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the demo API server
    Serve {
        /// Port for web server
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}
