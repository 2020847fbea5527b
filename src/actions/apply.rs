//! Execution of resolved actions against the filesystem.
//!
//! `Keep` and `Unknown` actions are no-ops. `Delete` and `Rename` first check
//! that the path is still a regular file, then either perform the operation or,
//! in dry-run mode, only log what would happen.
//!
//! Failures are reported per action; callers record them in an
//! [`ApplyReport`] and carry on with the remaining actions.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::delete::DeleteStrategy;
use super::{Action, ActionKind};

/// Failure of the underlying OS operation.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Moving the file to the trash failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent removal failed.
    #[error("delete failed for {path}: {source}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Rename failed.
    #[error("rename of {from} to {to} failed: {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error applying a single action.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The path no longer exists as a regular file.
    #[error("unable to {kind} '{path}' (file not found)")]
    TargetMissing { kind: &'static str, path: PathBuf },

    /// The OS operation failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl ApplyError {
    /// Path the failed action referred to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::TargetMissing { path, .. } => path,
            Self::Execution(ExecutionError::TrashFailed { path, .. })
            | Self::Execution(ExecutionError::RemoveFailed { path, .. }) => path,
            Self::Execution(ExecutionError::RenameFailed { from, .. }) => from,
        }
    }
}

/// What happened when an action was applied successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Nothing to do (`Keep` or `Unknown`).
    Skipped,
    /// The filesystem was changed.
    Applied,
    /// Dry run: the operation was only logged.
    Simulated,
}

/// Applies actions using a fixed delete strategy and dry-run setting.
pub struct Executor {
    strategy: Box<dyn DeleteStrategy>,
    dry_run: bool,
}

impl Executor {
    /// Create an executor.
    #[must_use]
    pub fn new(strategy: Box<dyn DeleteStrategy>, dry_run: bool) -> Self {
        Self { strategy, dry_run }
    }

    /// Whether this executor only logs intended operations.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// The selected delete strategy.
    #[must_use]
    pub fn strategy(&self) -> &dyn DeleteStrategy {
        self.strategy.as_ref()
    }

    /// Apply one action.
    ///
    /// # Errors
    ///
    /// - [`ApplyError::TargetMissing`] if a `Delete`/`Rename` target is not a
    ///   regular file (checked in dry-run mode too)
    /// - [`ApplyError::Execution`] if the delete or rename itself fails
    pub fn apply(&self, action: &Action) -> Result<ApplyOutcome, ApplyError> {
        let kind = action.kind();
        if !kind.is_mutating() {
            return Ok(ApplyOutcome::Skipped);
        }

        let path = action.path();
        if !path.is_file() {
            return Err(ApplyError::TargetMissing {
                kind: kind.name(),
                path: path.to_path_buf(),
            });
        }

        match (kind, action.destination()) {
            (ActionKind::Delete, _) => {
                if self.dry_run {
                    log::info!("[dry-run] Deleting {}", path.display());
                    return Ok(ApplyOutcome::Simulated);
                }
                self.strategy.delete(path)?;
            }
            (ActionKind::Rename, Some(dest)) => {
                if self.dry_run {
                    log::info!(
                        "[dry-run] Renaming {} to {}",
                        path.display(),
                        dest.display()
                    );
                    return Ok(ApplyOutcome::Simulated);
                }
                rename(path, dest)?;
            }
            // Validated at construction: renames always carry a destination,
            // and only Delete/Rename are mutating.
            (ActionKind::Rename, None) | (ActionKind::Keep | ActionKind::Unknown, _) => {
                return Ok(ApplyOutcome::Skipped);
            }
        }

        Ok(ApplyOutcome::Applied)
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("strategy", &self.strategy.name())
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn rename(from: &Path, to: &Path) -> Result<(), ExecutionError> {
    log::info!("Renaming {} to {}", from.display(), to.display());
    fs::rename(from, to).map_err(|source| ExecutionError::RenameFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

impl Action {
    /// Apply this action with the given executor.
    ///
    /// # Errors
    ///
    /// See [`Executor::apply`].
    pub fn apply(&self, executor: &Executor) -> Result<ApplyOutcome, ApplyError> {
        executor.apply(self)
    }
}

/// Tally of an apply run.
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    /// Actions that changed the filesystem.
    pub applied: usize,
    /// Actions only logged because of dry-run.
    pub simulated: usize,
    /// `Keep`/`Unknown` actions.
    pub skipped: usize,
    /// Failed actions with their error messages.
    pub failures: Vec<(PathBuf, String)>,
}

impl ApplyReport {
    /// Record the result of one action, logging failures.
    pub fn record(&mut self, result: Result<ApplyOutcome, ApplyError>) {
        match result {
            Ok(ApplyOutcome::Applied) => self.applied += 1,
            Ok(ApplyOutcome::Simulated) => self.simulated += 1,
            Ok(ApplyOutcome::Skipped) => self.skipped += 1,
            Err(e) => {
                log::error!("{}", e);
                self.failures.push((e.path().to_path_buf(), e.to_string()));
            }
        }
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: ApplyReport) {
        self.applied += other.applied;
        self.simulated += other.simulated;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }

    /// Number of failed actions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of actions seen.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.applied + self.simulated + self.skipped + self.failures.len()
    }

    /// Check if no action failed.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut text = if self.simulated > 0 {
            format!(
                "Dry run: {} action(s) would be applied, {} left untouched",
                self.simulated, self.skipped
            )
        } else {
            format!(
                "Applied {} action(s), {} left untouched",
                self.applied, self.skipped
            )
        };
        if !self.all_succeeded() {
            text.push_str(&format!(", {} failed", self.failure_count()));
        }
        text
    }
}
