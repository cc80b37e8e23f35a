// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::loader::PROJECT_FILE;

/// Command-line arguments for `myst`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "myst",
    version,
    about = "Render templates, styles and static assets into an output tree, incrementally.",
    long_about = None
)]
pub struct CliArgs {
    /// Project file name, searched for from `--cwd` upwards.
    #[arg(short, long, value_name = "FILE", default_value = PROJECT_FILE)]
    pub project: String,

    /// Directory to start the project search from.
    ///
    /// Default: the current working directory.
    #[arg(long, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// Output directory (overrides `outDir` in the project file).
    #[arg(short, long, value_name = "PATH")]
    pub out_dir: Option<PathBuf>,

    /// Extension of rendered template output (overrides `outExt`).
    #[arg(long, value_name = "EXT")]
    pub out_ext: Option<String>,

    /// Re-render every file regardless of timestamps.
    #[arg(long)]
    pub force: bool,

    /// Keep running and re-render when sources, data or dependencies change.
    #[arg(short, long)]
    pub watch: bool,

    /// Skip the initial build (only meaningful with `--watch`).
    #[arg(long)]
    pub no_build: bool,

    /// Logging level (error, warn, info, verbose, debug, trace).
    ///
    /// If omitted, `MYST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Verbose,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
