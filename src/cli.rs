//! Command-line interface definitions for dupresolve.
//!
//! # Example
//!
//! ```bash
//! # Suggest actions for a duplicate-finder report and write an action file
//! dupresolve --report fslint.txt --suggest --out actions.tsv
//!
//! # After editing actions.tsv by hand, preview and then apply it
//! dupresolve --actions actions.tsv --apply --dry-run
//! dupresolve --actions actions.tsv --apply
//!
//! # Only show groups that still need attention
//! dupresolve --actions actions.tsv --suggest --no-keeps --out -
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Resolve duplicate-file reports into keep/delete/rename actions.
///
/// Reads either a duplicate-finder report or a previously written action
/// file, optionally suggests actions with the rule chain, and can apply the
/// actions or write them back out for editing.
#[derive(Debug, Parser)]
#[command(name = "dupresolve")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Duplicate-finder report to read ("-" for stdin)
    #[arg(short = 'f', long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Action file to read ("-" for stdin)
    #[arg(short = 't', long = "actions", value_name = "FILE")]
    pub actions: Option<PathBuf>,

    /// Suggest actions for undecided files using the rule chain
    #[arg(short, long)]
    pub suggest: bool,

    /// Apply the actions to the filesystem
    #[arg(short, long)]
    pub apply: bool,

    /// With --apply, only log what would be done
    #[arg(short = 'n', long, requires = "apply")]
    pub dry_run: bool,

    /// Write the action file here ("-" for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Drop groups in which every file is kept
    #[arg(short = 'K', long)]
    pub no_keeps: bool,

    /// Delete permanently instead of moving files to the trash
    #[arg(long)]
    pub permanent: bool,

    /// Extra pattern whose matches are kept (repeatable)
    #[arg(long = "keep-pattern", value_name = "REGEX")]
    pub keep_patterns: Vec<String>,

    /// Extra pattern whose matches are deleted (repeatable)
    #[arg(long = "delete-pattern", value_name = "REGEX")]
    pub delete_patterns: Vec<String>,

    /// Match rule patterns case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE", env = "DUPRESOLVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Where the duplicate list comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// A duplicate-finder report.
    Report(&'a Path),
    /// A previously written action file.
    ActionFile(&'a Path),
}

impl Cli {
    /// The single input source.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoInput`] or [`ConfigError::ConflictingInputs`] unless
    /// exactly one of `--report` / `--actions` is given.
    pub fn input(&self) -> Result<Input<'_>, ConfigError> {
        match (&self.report, &self.actions) {
            (Some(report), None) => Ok(Input::Report(report)),
            (None, Some(actions)) => Ok(Input::ActionFile(actions)),
            (None, None) => Err(ConfigError::NoInput),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingInputs),
        }
    }
}

/// Whether `path` means stdin/stdout.
#[must_use]
pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}
