//! Duplicate groups: ordered actions over mutually duplicate files.
//!
//! # Overview
//!
//! A [`DupGroup`] holds one [`Action`] per file that an external duplicate
//! finder reported as having identical content. Input order is preserved and
//! matters: rules reason about the relative position and nesting of paths.
//!
//! # Example
//!
//! ```
//! use dupresolve::actions::ActionKind;
//! use dupresolve::duplicates::{DupGroup, RuleChain};
//!
//! let mut group = DupGroup::from_paths(["/photos/a.jpg", "/photos/2019/a.jpg"])
//!     .unwrap()
//!     .unwrap();
//! group.annotate(&RuleChain::standard());
//!
//! assert_eq!(group.annotation(), vec![ActionKind::Delete, ActionKind::Keep]);
//! ```

use std::fmt;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::actions::{Action, ActionKind, ApplyReport, Executor, InvalidAction};

use super::rules::RuleChain;

/// A non-empty, ordered set of actions for one cluster of duplicate files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DupGroup {
    actions: Vec<Action>,
}

impl DupGroup {
    /// Create a group from already-typed actions.
    ///
    /// Returns `None` if `actions` is empty.
    #[must_use]
    pub fn from_actions(actions: Vec<Action>) -> Option<Self> {
        if actions.is_empty() {
            None
        } else {
            Some(Self { actions })
        }
    }

    /// Create a group of undecided actions from bare paths.
    ///
    /// Returns `Ok(None)` if no paths are given.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAction::MissingPath`] if any path is empty.
    pub fn from_paths<I, P>(paths: I) -> Result<Option<Self>, InvalidAction>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let actions = paths
            .into_iter()
            .map(Action::unknown)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_actions(actions))
    }

    /// Run a rule chain over this group.
    ///
    /// Rules run in order; the chain stops as soon as a rule signals
    /// [`ControlFlow::Break`]. Actions still undecided when the rules run out
    /// stay `Unknown`.
    pub fn annotate(&mut self, rules: &RuleChain) -> &mut Self {
        for rule in rules.iter() {
            if let ControlFlow::Break(()) = rule.evaluate(&mut self.actions) {
                log::trace!("Rule '{}' completed the group", rule.name());
                break;
            }
        }
        self
    }

    /// Apply every action in order, isolating failures per action.
    pub fn apply(&self, executor: &Executor) -> ApplyReport {
        let mut report = ApplyReport::default();
        for action in &self.actions {
            report.record(action.apply(executor));
        }
        report
    }

    /// Kind of each action, in order.
    #[must_use]
    pub fn annotation(&self) -> Vec<ActionKind> {
        self.actions.iter().map(Action::kind).collect()
    }

    /// Path of each action, in order.
    #[must_use]
    pub fn paths(&self) -> Vec<&Path> {
        self.actions.iter().map(Action::path).collect()
    }

    /// The actions of this group.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Check whether every action is `Keep`.
    #[must_use]
    pub fn is_all_keep(&self) -> bool {
        self.actions.iter().all(|a| a.kind() == ActionKind::Keep)
    }

    /// Number of actions still `Unknown`.
    #[must_use]
    pub fn unknown_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_unknown()).count()
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Always `false`; groups are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// One action per line, in action-file format.
impl fmt::Display for DupGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{action}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DupGroup {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
