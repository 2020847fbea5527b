//! Delete strategies: system trash or permanent removal.
//!
//! # Overview
//!
//! The strategy is chosen once at startup with [`select_strategy`] and then
//! handed to the [`Executor`](super::Executor). Trash is preferred because
//! trashed files can be recovered; permanent removal is used when requested
//! or when no trash location can be resolved for the current user.
//!
//! # Example
//!
//! ```no_run
//! use dupresolve::actions::delete::select_strategy;
//! use std::path::Path;
//!
//! let strategy = select_strategy(false);
//! strategy.delete(Path::new("/path/to/duplicate.jpg")).unwrap();
//! ```

use std::fs;
use std::path::Path;

use super::apply::ExecutionError;

/// How a `Delete` action removes a file.
pub trait DeleteStrategy {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Remove a single file.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] if the underlying OS call fails.
    fn delete(&self, path: &Path) -> Result<(), ExecutionError>;

    /// Whether removed files can be recovered.
    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Moves files to the system trash via the `trash` crate.
///
/// A failed trash operation is returned as [`ExecutionError::TrashFailed`];
/// the file is left in place and never removed permanently instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrashDelete;

impl DeleteStrategy for TrashDelete {
    fn name(&self) -> &'static str {
        "trash"
    }

    fn delete(&self, path: &Path) -> Result<(), ExecutionError> {
        log::info!("Trashing {}", path.display());
        trash::delete(path).map_err(|e| {
            log::error!("Trash operation failed for {}: {}", path.display(), e);
            ExecutionError::TrashFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })
    }

    fn is_recoverable(&self) -> bool {
        true
    }
}

/// Removes files permanently with [`fs::remove_file`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PermanentDelete;

impl DeleteStrategy for PermanentDelete {
    fn name(&self) -> &'static str {
        "permanent"
    }

    fn delete(&self, path: &Path) -> Result<(), ExecutionError> {
        log::info!("Deleting {}", path.display());
        fs::remove_file(path).map_err(|source| ExecutionError::RemoveFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Pick the delete strategy for this run.
///
/// Permanent removal is used when `permanent` is set or when the user's home
/// and data directories (where the home trash lives) cannot be found. The
/// choice holds for the whole run.
#[must_use]
pub fn select_strategy(permanent: bool) -> Box<dyn DeleteStrategy> {
    if permanent {
        log::debug!("Permanent deletion requested");
        return Box::new(PermanentDelete);
    }

    if trash_available() {
        log::debug!("Deleted files will be moved to the system trash");
        Box::new(TrashDelete)
    } else {
        log::warn!("No trash location available; deleted files will be removed permanently");
        Box::new(PermanentDelete)
    }
}

fn trash_available() -> bool {
    directories::BaseDirs::new()
        .is_some_and(|dirs| has_trash_home(dirs.home_dir(), dirs.data_dir()))
}

fn has_trash_home(home: &Path, data: &Path) -> bool {
    home.is_dir() && data.is_dir()
}
