//! Carry origin lines from the parse tree onto rendered blocks.

use super::tree::{ParseTree, RenderTree};

/// Tag every render node with the origin line of its parse counterpart.
///
/// Render nodes are matched to parse nodes by [`NodeId`](super::NodeId),
/// never by traversal position. A render node without a counterpart, or whose
/// counterpart has no origin line, ends up untagged, and any stale tag from a
/// previous pass is cleared.
///
/// Returns the number of tagged render nodes.
pub fn propagate_lines(parse: &ParseTree, render: &mut RenderTree) -> usize {
    let mut tagged = 0;
    for node in render.nodes_mut() {
        let line = node.origin.and_then(|origin| {
            let counterpart = parse.get(origin);
            if counterpart.is_none() {
                tracing::debug!(
                    origin = origin.index(),
                    "render node points outside the parse tree"
                );
            }
            counterpart.and_then(|p| p.origin_line)
        });
        node.set_source_line(line);
        if line.is_some() {
            tagged += 1;
        }
    }
    tagged
}
