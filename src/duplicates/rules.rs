//! Rule chains that resolve undecided actions within a duplicate group.
//!
//! # Overview
//!
//! A [`Rule`] looks at the full action list of one group and may decide any
//! action that is still `Unknown`. Decisions are made through
//! [`Action::decide`], so a decided action can never be overwritten by a later
//! rule: earlier, more specific rules take precedence.
//!
//! Each rule returns [`ControlFlow::Continue`] to hand over to the next rule or
//! [`ControlFlow::Break`] when the group is fully decided.
//!
//! ## Standard rules
//!
//! 1. [`pattern`] - decide paths matching a regular expression
//! 2. [`specificity`] - delete copies that sit in an ancestor directory of
//!    another copy
//! 3. [`single_unknown`] - keep the last remaining undecided copy
//!
//! # Example
//!
//! ```
//! use dupresolve::actions::ActionKind;
//! use dupresolve::duplicates::rules::{self, RuleChain};
//!
//! let chain = RuleChain::new()
//!     .with(rules::pattern_str("print", ActionKind::Keep, false).unwrap())
//!     .with(rules::specificity())
//!     .with(rules::single_unknown());
//! assert_eq!(chain.len(), 3);
//! ```

use std::fmt;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};

use crate::actions::{Action, ActionKind};
use crate::config::{ConfigError, RulesConfig};

/// Keep-pattern of the standard chain.
pub const DEFAULT_KEEP_PATTERN: &str = "print|phone|sdcard|rsync|iphoto";

/// Delete-pattern of the standard chain.
pub const DEFAULT_DELETE_PATTERN: &str = "^Unsorted";

type RuleFn = dyn Fn(&mut [Action]) -> ControlFlow<()>;

/// A named decision function over a group's actions.
pub struct Rule {
    name: String,
    func: Box<RuleFn>,
}

impl Rule {
    /// Wrap a closure as a rule.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut [Action]) -> ControlFlow<()> + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// Name used in log messages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the rule against a group's actions.
    pub fn evaluate(&self, actions: &mut [Action]) -> ControlFlow<()> {
        (self.func)(actions)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rule").field(&self.name).finish()
    }
}

/// An ordered, explicitly constructed pipeline of rules.
#[derive(Debug, Default)]
pub struct RuleChain {
    rules: Vec<Rule>,
}

impl RuleChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule, builder style.
    #[must_use]
    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Iterate over the rules in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the chain has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The standard chain: keep on [`DEFAULT_KEEP_PATTERN`], delete on
    /// [`DEFAULT_DELETE_PATTERN`], then specificity and single-unknown.
    #[must_use]
    pub fn standard() -> Self {
        let mut chain = Self::new();
        for (pat, kind) in [
            (DEFAULT_KEEP_PATTERN, ActionKind::Keep),
            (DEFAULT_DELETE_PATTERN, ActionKind::Delete),
        ] {
            // Both patterns are constants known to compile.
            if let Ok(rule) = pattern_str(pat, kind, false) {
                chain.push(rule);
            }
        }
        chain.with(specificity()).with(single_unknown())
    }

    /// Build a chain from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if a pattern does not compile.
    pub fn from_config(config: &RulesConfig) -> Result<Self, ConfigError> {
        let mut chain = Self::new();
        let patterns = config
            .keep_patterns
            .iter()
            .map(|p| (p, ActionKind::Keep))
            .chain(config.delete_patterns.iter().map(|p| (p, ActionKind::Delete)));

        for (pat, kind) in patterns {
            let rule = pattern_str(pat, kind, config.case_sensitive).map_err(|source| {
                ConfigError::InvalidPattern {
                    pattern: pat.clone(),
                    source,
                }
            })?;
            chain.push(rule);
        }
        if config.specificity {
            chain.push(specificity());
        }
        if config.single {
            chain.push(single_unknown());
        }
        log::debug!("Rule chain: {:?}", chain.rules);
        Ok(chain)
    }
}

impl<'a> IntoIterator for &'a RuleChain {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Decide every undecided action whose full path matches `regex`.
///
/// The regex is searched anywhere in the path; use anchors to pin it. Never
/// stops the chain.
#[must_use]
pub fn pattern(regex: Regex, kind: ActionKind) -> Rule {
    let name = format!("pattern '{}' -> {}", regex.as_str(), kind.name());
    Rule::new(name, move |actions| {
        for action in actions.iter_mut().filter(|a| a.is_unknown()) {
            if regex.is_match(&action.path().to_string_lossy()) {
                action.decide(kind);
            }
        }
        ControlFlow::Continue(())
    })
}

/// Compile `pattern` and build a [`pattern`] rule.
///
/// # Errors
///
/// Returns the regex compilation error.
pub fn pattern_str(
    pattern_text: &str,
    kind: ActionKind,
    case_sensitive: bool,
) -> Result<Rule, regex::Error> {
    let regex = RegexBuilder::new(pattern_text)
        .case_insensitive(!case_sensitive)
        .build()?;
    Ok(pattern(regex, kind))
}

/// Delete copies that sit at or above another copy in the directory tree.
///
/// For every pair with different parent directories, if one parent is the
/// common prefix of both, that action is marked `Delete` (when still
/// `Unknown`). Pairs are visited once in input order; marks are not revisited.
/// Never stops the chain.
#[must_use]
pub fn specificity() -> Rule {
    Rule::new("specificity", |actions| {
        let dirs: Vec<PathBuf> = actions
            .iter()
            .map(|a| parent_dir(a.path()).to_path_buf())
            .collect();

        for i in 0..dirs.len() {
            for j in (i + 1)..dirs.len() {
                let (a, b) = (&dirs[i], &dirs[j]);
                if a == b || a.has_root() != b.has_root() {
                    continue;
                }
                let common = common_prefix(a, b);
                if common == *a {
                    actions[i].decide(ActionKind::Delete);
                } else if common == *b {
                    actions[j].decide(ActionKind::Delete);
                }
            }
        }
        ControlFlow::Continue(())
    })
}

/// Keep the only remaining undecided action and stop the chain.
///
/// With zero or several undecided actions the group is left untouched and the
/// chain continues.
#[must_use]
pub fn single_unknown() -> Rule {
    Rule::new("single-unknown", |actions| {
        let mut unknown = actions.iter_mut().filter(|a| a.is_unknown());
        match (unknown.next(), unknown.next()) {
            (Some(last), None) => {
                last.decide(ActionKind::Keep);
                ControlFlow::Break(())
            }
            _ => ControlFlow::Continue(()),
        }
    })
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// Longest common leading run of path components.
fn common_prefix(a: &Path, b: &Path) -> PathBuf {
    a.components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}
