//! dupresolve - turn duplicate-file reports into keep/delete/rename actions.
//!
//! The pipeline reads either a duplicate-finder report or a previously
//! written action file into a [`DupList`](duplicates::DupList), optionally
//! resolves undecided files with a [`RuleChain`](duplicates::RuleChain),
//! filters out settled groups, applies the actions, and writes the list back
//! out as an editable action file.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::actions::{select_strategy, Executor};
use crate::cli::{is_stdio, Cli, Input};
use crate::config::{Config, ConfigError};
use crate::duplicates::{DupList, RuleChain};
use crate::error::ExitCode;

/// Run the whole pipeline for one invocation.
///
/// # Errors
///
/// Only fatal conditions are returned: missing or conflicting inputs, bad
/// configuration, unreadable input or unwritable output. Rejected input lines
/// and failed actions are logged and do not fail the run.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let input = cli.input()?;
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    let mut list = read_list(input, &config)?;
    log::info!(
        "Loaded {} duplicate group(s) with {} file(s)",
        list.len(),
        list.action_count()
    );

    if cli.suggest {
        let chain =
            RuleChain::from_config(&config.rules).context("Failed to build suggestion rules")?;
        list.annotate(&chain);
    }

    if cli.no_keeps {
        list.filter_all_keep();
    }

    if cli.apply {
        let executor = Executor::new(select_strategy(config.delete.permanent), cli.dry_run);
        log::debug!("Applying actions with {:?}", executor);
        list.apply(&executor);
    }

    if let Some(out) = &cli.out {
        write_list(&list, out)
            .with_context(|| format!("Failed to write {} group(s)", list.len()))?;
    }

    Ok(ExitCode::Success)
}

fn read_list(input: Input<'_>, config: &Config) -> Result<DupList, ConfigError> {
    match input {
        Input::Report(path) => {
            let text = read_input(path)?;
            Ok(DupList::from_report(&text, &config.report.section))
        }
        Input::ActionFile(path) => {
            let text = read_input(path)?;
            let (list, errors) = DupList::from_action_file(&text);
            if !errors.is_empty() {
                log::warn!(
                    "Skipped {} malformed line(s) in {}",
                    errors.len(),
                    path.display()
                );
            }
            Ok(list)
        }
    }
}

fn read_input(path: &Path) -> Result<String, ConfigError> {
    let result = if is_stdio(path) {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        fs::read_to_string(path)
    };
    result.map_err(|source| ConfigError::InputRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the action file; a closed downstream pipe is not an error.
fn write_list(list: &DupList, path: &Path) -> Result<(), ConfigError> {
    let result = if is_stdio(path) {
        list.write_to(&mut io::stdout().lock())
    } else {
        fs::File::create(path).and_then(|file| {
            let mut writer = io::BufWriter::new(file);
            list.write_to(&mut writer)
        })
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            log::debug!("Output pipe closed early");
            Ok(())
        }
        Err(source) => Err(ConfigError::OutputWrite {
            path: path.to_path_buf(),
            source,
        }),
    }
}
