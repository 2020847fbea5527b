//! Duplicate resolution module.
//!
//! This module provides functionality for:
//! - Duplicate groups and their per-file actions
//! - Rule chains that resolve undecided actions
//! - Reading duplicate-finder reports
//! - Reading and writing action files

pub mod groups;
pub mod list;
pub mod report;
pub mod rules;

// Re-export commonly used types
pub use groups::DupGroup;
pub use list::{DupList, LineError, ACTION_FILE_HEADER};
pub use report::DUPLICATE_SECTION;
pub use rules::{Rule, RuleChain};
