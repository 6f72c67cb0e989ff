//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate Markdown API docs from Python sources
#[derive(Parser, Debug)]
#[command(name = "pydoc-md")]
#[command(about = "Generate Markdown API docs from Python sources")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Document a source tree into an existing output directory
    Generate {
        /// Root of the Python sources
        #[arg(short = 'd', long = "dir")]
        dir: PathBuf,

        /// Output directory (must already exist)
        #[arg(short = 'o', long = "out-dir", alias = "out_dir")]
        out_dir: PathBuf,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory with template overrides
        #[arg(long)]
        templates: Option<PathBuf>,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Mirror every directory, then prune the empty ones
        #[arg(long)]
        prune: bool,

        /// Skip files that fail to parse instead of stopping
        #[arg(long)]
        skip_invalid: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Render the page of a single file to stdout
    Inspect {
        /// Python file to inspect
        path: PathBuf,

        /// Print the extracted elements as JSON instead
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory with template overrides
        #[arg(long)]
        templates: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

impl Command {
    pub fn verbose(&self) -> bool {
        matches!(self, Command::Generate { verbose: true, .. })
    }
}
