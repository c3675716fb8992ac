//! Stamp parse nodes with the source line they began at.

use crate::SourceLine;

use super::tree::ParseTree;

/// Set `origin_line` on every node that carries a start position.
///
/// Nodes without a position, or with a position on line 0, are left as they
/// are. Running it twice yields the same tree.
///
/// Returns the number of annotated nodes.
pub fn annotate_lines(tree: &mut ParseTree) -> usize {
    let mut annotated = 0;
    for node in tree.iter_mut() {
        let Some(line) = node.position.and_then(|pos| SourceLine::new(pos.line)) else {
            continue;
        };
        node.origin_line = Some(line);
        annotated += 1;
    }
    annotated
}
