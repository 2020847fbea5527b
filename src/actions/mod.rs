//! File actions module.
//!
//! This module provides:
//! - The [`ActionKind`] / [`Action`] model bound to a single path
//! - Tab-delimited parsing and serialization of actions
//! - Delete strategies (system trash or permanent removal)
//! - Execution of resolved actions with dry-run support
//!
//! # Action lines
//!
//! An action serializes to a single tab-delimited line:
//! `kind \t path \t args...`, where `kind` is one of `K`, `D`, `R`, `?`.
//!
//! ```
//! use dupresolve::actions::{Action, ActionKind};
//!
//! let action = Action::parse("R\t/photos/img.jpg\t/photos/2019/img.jpg").unwrap();
//! assert_eq!(action.kind(), ActionKind::Rename);
//! assert_eq!(action.to_string(), "R\t/photos/img.jpg\t/photos/2019/img.jpg");
//! ```

pub mod apply;
pub mod delete;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

pub use apply::{ApplyError, ApplyOutcome, ApplyReport, ExecutionError, Executor};
pub use delete::{select_strategy, DeleteStrategy, PermanentDelete, TrashDelete};

/// Disposition of a single file within a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Keep the file.
    Keep,
    /// Delete the file.
    Delete,
    /// Rename the file to a destination path.
    Rename,
    /// Undecided; the file is left as is.
    Unknown,
}

impl ActionKind {
    /// All kinds, in header order.
    pub const ALL: [ActionKind; 4] = [Self::Keep, Self::Delete, Self::Rename, Self::Unknown];

    /// Single-character code used in action files.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Keep => "K",
            Self::Delete => "D",
            Self::Rename => "R",
            Self::Unknown => "?",
        }
    }

    /// Look up a kind from its action-file code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "K" => Some(Self::Keep),
            "D" => Some(Self::Delete),
            "R" => Some(Self::Rename),
            "?" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Number of extra arguments this kind takes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Rename => 1,
            Self::Keep | Self::Delete | Self::Unknown => 0,
        }
    }

    /// Whether applying this kind touches the filesystem.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Delete | Self::Rename)
    }

    /// Upper-case name, used in log and error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Keep => "KEEP",
            Self::Delete => "DELETE",
            Self::Rename => "RENAME",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error raised when an action cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidAction {
    /// The kind code is not one of `K`, `D`, `R`, `?`.
    #[error("unknown action code '{0}'")]
    UnknownKind(String),

    /// The path field is missing or empty.
    #[error("no path")]
    MissingPath,

    /// A rename without exactly one destination.
    #[error("no destination for RENAME action")]
    MissingDestination,

    /// Too many arguments for the action kind.
    #[error("too many arguments for {kind} action (got {count})")]
    UnexpectedArgs {
        /// Upper-case kind name
        kind: &'static str,
        /// Number of extra arguments supplied
        count: usize,
    },

    /// A field contains a tab or line break and cannot be written as one line.
    #[error("tab or line break in '{0}'")]
    ControlChar(String),
}

/// A malformed line in an action file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid action line '{line}': {reason}")]
pub struct ParseError {
    /// The offending line, without its terminator.
    pub line: String,
    /// Why the line was rejected.
    #[source]
    pub reason: InvalidAction,
}

/// A typed operation bound to a file path.
///
/// `path` and `args` are fixed at construction; only the kind may change, and
/// only from [`ActionKind::Unknown`] via [`Action::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    kind: ActionKind,
    path: PathBuf,
    args: Vec<String>,
}

impl Action {
    /// Create and validate an action.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAction`] if the path is empty, a field contains a tab
    /// or line break, or the argument count does not match the kind (exactly
    /// one for `Rename`, none otherwise).
    pub fn new(
        kind: ActionKind,
        path: impl Into<PathBuf>,
        args: Vec<String>,
    ) -> Result<Self, InvalidAction> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(InvalidAction::MissingPath);
        }
        if let Some(field) = first_field_break(&path, &args) {
            return Err(InvalidAction::ControlChar(field));
        }

        match (kind, args.len()) {
            (ActionKind::Rename, 1) => {}
            (ActionKind::Rename, _) => return Err(InvalidAction::MissingDestination),
            (_, 0) => {}
            (kind, count) => {
                return Err(InvalidAction::UnexpectedArgs {
                    kind: kind.name(),
                    count,
                })
            }
        }

        Ok(Self { kind, path, args })
    }

    /// Create an undecided action for a bare path.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAction::MissingPath`] for an empty path.
    pub fn unknown(path: impl Into<PathBuf>) -> Result<Self, InvalidAction> {
        Self::new(ActionKind::Unknown, path, Vec::new())
    }

    /// Parse a tab-delimited `kind \t path \t args...` line.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] carrying the line and the validation failure.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        Self::from_fields(line).map_err(|reason| ParseError {
            line: line.to_string(),
            reason,
        })
    }

    fn from_fields(line: &str) -> Result<Self, InvalidAction> {
        let mut fields = line.split('\t');
        let code = fields.next().unwrap_or_default();
        let kind =
            ActionKind::from_code(code).ok_or_else(|| InvalidAction::UnknownKind(code.into()))?;
        let path = fields.next().ok_or(InvalidAction::MissingPath)?;
        let args = fields.map(str::to_string).collect();
        Self::new(kind, path, args)
    }

    /// Current kind.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Path this action applies to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extra arguments (the rename destination for `Rename`).
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Rename destination, if this is a rename.
    #[must_use]
    pub fn destination(&self) -> Option<&Path> {
        match self.kind {
            ActionKind::Rename => self.args.first().map(Path::new),
            _ => None,
        }
    }

    /// Whether no decision has been made for this file yet.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.kind == ActionKind::Unknown
    }

    /// Record a decision for an undecided action.
    ///
    /// Decided actions are frozen: returns `false` and leaves the action
    /// untouched unless it is currently `Unknown`. `Rename` cannot be chosen
    /// here since it needs a destination.
    pub fn decide(&mut self, kind: ActionKind) -> bool {
        if !self.is_unknown() || kind == ActionKind::Rename {
            return false;
        }
        log::debug!("{} -> {}", self.path.display(), kind.name());
        self.kind = kind;
        true
    }
}

/// First field holding a tab or line break, escaped for display.
fn first_field_break(path: &Path, args: &[String]) -> Option<String> {
    let is_break = |field: &str| field.contains(['\t', '\n', '\r']);
    let path_text = path.to_string_lossy();
    if is_break(&path_text) {
        return Some(path_text.escape_debug().to_string());
    }
    args.iter()
        .find(|arg| is_break(arg))
        .map(|arg| arg.escape_debug().to_string())
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.kind.code(), self.path.display())?;
        for arg in &self.args {
            write!(f, "\t{arg}")?;
        }
        Ok(())
    }
}

impl FromStr for Action {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
