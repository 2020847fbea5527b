//! Ordered collections of duplicate groups and the action-file format.
//!
//! # Action file
//!
//! The action file is the human-editable form of a [`DupList`]: a fixed
//! comment header followed by one tab-delimited action per line, with groups
//! separated by a blank line.
//!
//! ```text
//! # Actions:
//! # K	src		Keep the file
//! # D	src		Delete the file
//! # R	src	dst	Rename the file to `dst`
//! # ?	src		Unknown - keep file as is
//!
//! K	/path/to/keep.jpg
//! D	/path/to/delete.jpg
//!
//! ?	/next/group/a.jpg
//! ?	/next/group/b.jpg
//! ```
//!
//! Reading an action file is line-tolerant: a malformed line is logged and
//! skipped, and the rest of the file is still read.

use std::fmt;
use std::io::{self, Write};

use thiserror::Error;

use crate::actions::{Action, ApplyReport, Executor, ParseError};

use super::groups::DupGroup;
use super::report;
use super::rules::RuleChain;

/// Comment header written at the top of every action file.
pub const ACTION_FILE_HEADER: &str = "# Actions:
# K\tsrc\t\tKeep the file
# D\tsrc\t\tDelete the file
# R\tsrc\tdst\tRename the file to `dst`
# ?\tsrc\t\tUnknown - keep file as is
";

/// A rejected line of an action file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error line {line_number}: {error}")]
pub struct LineError {
    /// 1-based line number.
    pub line_number: usize,
    /// What was wrong with the line.
    #[source]
    pub error: ParseError,
}

/// Ordered list of duplicate groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DupList {
    groups: Vec<DupGroup>,
}

impl DupList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list from existing groups.
    #[must_use]
    pub fn from_groups(groups: Vec<DupGroup>) -> Self {
        Self { groups }
    }

    /// Build a list from a duplicate-finder report.
    #[must_use]
    pub fn from_report(text: &str, section: &str) -> Self {
        let mut list = Self::new();
        list.read_report(text, section);
        list
    }

    /// Build a list from an action file, returning rejected lines alongside.
    #[must_use]
    pub fn from_action_file(text: &str) -> (Self, Vec<LineError>) {
        let mut list = Self::new();
        let errors = list.read_action_file(text);
        (list, errors)
    }

    /// Append the groups of a duplicate-finder report.
    ///
    /// The section labelled `section` is used; without one, the lines before
    /// the first section header are used instead. Each path becomes an
    /// `Unknown` action. Returns the number of groups added.
    pub fn read_report(&mut self, text: &str, section: &str) -> usize {
        let sections = report::parse_sections(text);
        let Some(found) = report::find_section(&sections, section) else {
            log::warn!("Report has no '{}' section and no unsectioned input", section);
            return 0;
        };

        let before = self.groups.len();
        for paths in report::path_groups(&found.lines) {
            match DupGroup::from_paths(paths) {
                Ok(Some(group)) => self.groups.push(group),
                Ok(None) => {}
                Err(e) => log::error!("Skipping report group: {}", e),
            }
        }

        let added = self.groups.len() - before;
        log::debug!("Read {} duplicate group(s) from report", added);
        added
    }

    /// Append the groups of an action file.
    ///
    /// Blank lines separate groups and `#` lines are ignored. Malformed lines
    /// are logged, skipped and returned.
    pub fn read_action_file(&mut self, text: &str) -> Vec<LineError> {
        let mut errors = Vec::new();
        let mut actions = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                if let Some(group) = DupGroup::from_actions(std::mem::take(&mut actions)) {
                    self.groups.push(group);
                }
                continue;
            }
            if line.starts_with('#') {
                continue;
            }

            match Action::parse(line) {
                Ok(action) => actions.push(action),
                Err(error) => {
                    let err = LineError {
                        line_number: index + 1,
                        error,
                    };
                    log::error!("{}", err);
                    errors.push(err);
                }
            }
        }
        if let Some(group) = DupGroup::from_actions(actions) {
            self.groups.push(group);
        }

        errors
    }

    /// Run a rule chain over every group.
    pub fn annotate(&mut self, rules: &RuleChain) {
        for group in &mut self.groups {
            group.annotate(rules);
        }
    }

    /// Drop groups whose actions are all `Keep`. Returns how many were removed.
    pub fn filter_all_keep(&mut self) -> usize {
        let before = self.groups.len();
        self.groups.retain(|group| !group.is_all_keep());
        let removed = before - self.groups.len();
        log::debug!("Filtered {} all-keep group(s)", removed);
        removed
    }

    /// Apply every action of every group, in order.
    ///
    /// A failing action is logged and recorded; it never stops the run.
    pub fn apply(&self, executor: &Executor) -> ApplyReport {
        let mut report = ApplyReport::default();
        for group in &self.groups {
            report.merge(group.apply(executor));
        }
        log::info!("{}", report.summary());
        report
    }

    /// Write the list in action-file format.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{self}")?;
        writer.flush()
    }

    /// The groups, in order.
    #[must_use]
    pub fn groups(&self) -> &[DupGroup] {
        &self.groups
    }

    /// Iterate over the groups.
    pub fn iter(&self) -> std::slice::Iter<'_, DupGroup> {
        self.groups.iter()
    }

    /// Total number of actions across all groups.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.groups.iter().map(DupGroup::len).sum()
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if the list has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Action-file rendering: header, then groups separated by blank lines.
impl fmt::Display for DupList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ACTION_FILE_HEADER)?;
        for group in &self.groups {
            write!(f, "\n{group}\n")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DupList {
    type Item = &'a DupGroup;
    type IntoIter = std::slice::Iter<'a, DupGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl From<Vec<DupGroup>> for DupList {
    fn from(groups: Vec<DupGroup>) -> Self {
        Self::from_groups(groups)
    }
}
