//! Reader for sectioned duplicate-finder reports.
//!
//! A report is split into sections by header lines made of five or more
//! dashes followed by a section label:
//!
//! ```text
//! -----------------------------------DUPlicate files
//! /photos/a.jpg
//! /backup/a.jpg
//!
//! /photos/b.jpg
//! /phone/b.jpg
//! ```
//!
//! Lines before the first header form an unnamed section. Within the
//! duplicate section, groups of paths are separated by blank lines.

/// Label of the section listing duplicates.
pub const DUPLICATE_SECTION: &str = "DUPlicate files";

const MIN_HEADER_DASHES: usize = 5;

/// One section of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section label; `None` for lines before the first header.
    pub name: Option<String>,
    /// Body lines, without terminators.
    pub lines: Vec<String>,
}

/// Split a report into its sections, in order.
#[must_use]
pub fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section {
        name: None,
        lines: Vec::new(),
    };

    for line in text.lines() {
        if let Some(name) = section_header(line) {
            if current.name.is_some() || !current.lines.is_empty() {
                sections.push(current);
            }
            current = Section {
                name: Some(name.to_string()),
                lines: Vec::new(),
            };
        } else {
            current.lines.push(line.to_string());
        }
    }
    if current.name.is_some() || !current.lines.is_empty() {
        sections.push(current);
    }

    sections
}

/// Label of a header line, or `None` if `line` is not a header.
fn section_header(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches('-');
    if line.len() - rest.len() >= MIN_HEADER_DASHES {
        Some(rest.trim())
    } else {
        None
    }
}

/// Locate the duplicate section, falling back to the unnamed leading section.
#[must_use]
pub fn find_section<'a>(sections: &'a [Section], name: &str) -> Option<&'a Section> {
    sections
        .iter()
        .find(|s| s.name.as_deref() == Some(name))
        .or_else(|| {
            log::debug!("No '{}' section; using the unsectioned input", name);
            sections.iter().find(|s| s.name.is_none())
        })
}

/// Split section lines into blank-line separated groups of paths.
///
/// Consecutive blank lines count as one separator.
#[must_use]
pub fn path_groups(lines: &[String]) -> Vec<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();

    for line in lines {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups
}
