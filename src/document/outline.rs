//! Heading outline of a laid-out document.

use crate::SourceLine;

use super::{BlockKind, ParseTree, RenderTree};

/// One heading of the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Heading level, 1 to 6
    pub level: u8,
    /// Flattened heading text
    pub title: String,
    /// Line the heading starts at in the source
    pub line: SourceLine,
    /// First preview row of the heading
    pub row: usize,
}

/// Collect the headings of `tree` in the order they appear in `render`.
///
/// Headings that were never laid out or never annotated are left out.
pub fn outline(tree: &ParseTree, render: &RenderTree) -> Vec<OutlineEntry> {
    let mut entries: Vec<OutlineEntry> = render
        .nodes()
        .iter()
        .filter_map(|node| {
            let parsed = tree.get(node.origin?)?;
            let BlockKind::Heading(level) = parsed.kind else {
                return None;
            };
            Some(OutlineEntry {
                level,
                title: parsed.text.clone(),
                line: parsed.origin_line?,
                row: node.top,
            })
        })
        .collect();
    entries.sort_by_key(|entry| entry.row);
    entries
}

/// Index of the heading whose section contains preview row `row`: the last
/// heading starting at or above it, or the first heading when `row` is above
/// them all.
pub fn heading_at_row(entries: &[OutlineEntry], row: usize) -> Option<usize> {
    if entries.is_empty() {
        return None;
    }
    let next = entries.partition_point(|entry| entry.row <= row);
    Some(next.saturating_sub(1))
}
