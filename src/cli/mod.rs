//! CLI module for pydoc-md

mod args;

pub use args::{Args, Command};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{DocGenerator, PageRenderer, Placeholders, Templates};
use crate::parser::{partition, PythonParser};
use crate::tree::{count_source_files, OsFs, SourceFilter};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const LOG_FILTER: &str = "RUST_LOG";

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();
    init_tracing(args.command.verbose());

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default_directives = if verbose { "pydoc_md=debug,warn" } else { "warn" };
    let filter = match std::env::var_os(LOG_FILTER) {
        Some(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives)),
        None => EnvFilter::new(default_directives),
    };

    // a second init (e.g. in tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Generate {
            dir,
            out_dir,
            config,
            templates,
            exclude,
            prune,
            skip_invalid,
            verbose,
        } => {
            let mut cfg = Config::discover(config.as_deref())?;
            cfg.merge_cli(templates, exclude, prune, skip_invalid);
            cfg.validate()?;

            if verbose {
                println!("Source: {}", dir.display());
                println!("Output: {}", out_dir.display());
                println!("Extension: .{}", cfg.source.extension);
                println!("Exclude: {:?}", cfg.source.exclude);
                println!("Empty directories: {:?}", cfg.output.empty_dirs);
                println!("On parse error: {:?}", cfg.output.on_parse_error);
            }

            // checked before anything is read
            if !out_dir.is_dir() {
                return Err(Error::OutputDirNotFound(out_dir));
            }
            if !dir.is_dir() {
                return Err(Error::PathNotFound(dir));
            }

            let progress = if verbose {
                ProgressBar::hidden()
            } else {
                let filter = SourceFilter::from_config(&cfg)?;
                progress_bar(count_source_files(&dir, &filter)?)
            };

            let generator = DocGenerator::new(&OsFs, &cfg)?.with_progress(progress);
            let report = generator.generate(&dir, &out_dir)?;

            println!("{}", report.summary());
            if !report.skipped.is_empty() {
                println!("\nSkipped files ({}):", report.skipped.len());
                for skipped in report.skipped.iter().take(5) {
                    println!("  {}", skipped.message);
                }
                if report.skipped.len() > 5 {
                    println!("  ... and {} more", report.skipped.len() - 5);
                }
            }
            println!("Documentation written to: {}", out_dir.display());

            Ok(())
        }

        Command::Inspect {
            path,
            json,
            config,
            templates,
        } => {
            if !path.is_file() {
                return Err(Error::PathNotFound(path));
            }

            let mut parser = PythonParser::new()?;
            let elements = parser.parse_file(&path)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&elements)?);
                return Ok(());
            }

            let mut cfg = Config::discover(config.as_deref())?;
            cfg.merge_cli(templates, Vec::new(), false, false);
            let renderer = PageRenderer::new(
                Templates::load(cfg.templates.directory.as_deref())?,
                Placeholders::from(&cfg.output),
            );

            let (classes, functions) = partition(elements);
            print!("{}", renderer.render(&file_name(&path), &classes, &functions)?);
            Ok(())
        }

        Command::Version => {
            println!("pydoc-md {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
