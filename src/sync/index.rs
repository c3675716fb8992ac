//! Line index over a rendered surface.

use crate::SourceLine;

use super::surface::{AnnotatedNode, RenderedSurface, SurfaceError};

/// One indexed node: the line it came from and where it sits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineIndexEntry {
    pub line: SourceLine,
    pub offset: f64,
}

/// Rendered nodes sorted by source line.
///
/// Built fresh for every sync decision and never kept across renders.
///
/// ```
/// use marksync::sync::{AnnotatedNode, LineIndex};
/// use marksync::SourceLine;
///
/// let index = LineIndex::from_nodes([
///     AnnotatedNode { line: 1, top: 0.0 },
///     AnnotatedNode { line: 5, top: 40.0 },
///     AnnotatedNode { line: 10, top: 90.0 },
/// ]);
/// let hit = index.floor_by_line(SourceLine::new(7).unwrap()).unwrap();
/// assert_eq!(hit.line.get(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineIndex {
    entries: Vec<LineIndexEntry>,
}

impl LineIndex {
    /// Index every tagged node `surface` currently has.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface can not report its nodes.
    pub fn build<S: RenderedSurface + ?Sized>(surface: &S) -> Result<Self, SurfaceError> {
        Ok(Self::from_nodes(surface.annotated_nodes()?))
    }

    /// Index raw nodes. Nodes tagged with line 0 are dropped, the rest are
    /// sorted by line with ties kept in the order given.
    pub fn from_nodes(nodes: impl IntoIterator<Item = AnnotatedNode>) -> Self {
        let mut entries: Vec<LineIndexEntry> = nodes
            .into_iter()
            .filter_map(|node| {
                SourceLine::new(node.line).map(|line| LineIndexEntry {
                    line,
                    offset: node.top,
                })
            })
            .collect();
        entries.sort_by_key(|entry| entry.line);
        Self { entries }
    }

    pub fn entries(&self) -> &[LineIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the greatest line not above `line`, or the first entry when
    /// every entry is below it. `None` only when the index is empty.
    pub fn floor_by_line(&self, line: SourceLine) -> Option<&LineIndexEntry> {
        let after = self.entries.partition_point(|entry| entry.line <= line);
        self.entries.get(after.saturating_sub(1))
    }

    /// Entry with the greatest offset not past `offset`. Equal offsets go to
    /// the earliest entry in line order. Falls back to the first entry like
    /// [`floor_by_line`](Self::floor_by_line).
    ///
    /// Offsets need not rise with lines (footnote definitions are laid out
    /// at the end but keep their early line), so every entry is considered.
    pub fn floor_by_offset(&self, offset: f64) -> Option<&LineIndexEntry> {
        let first = self.entries.first()?;
        Some(
            self.entries
                .iter()
                .filter(|entry| entry.offset <= offset)
                .reduce(|best, entry| if entry.offset > best.offset { entry } else { best })
                .unwrap_or(first),
        )
    }
}
