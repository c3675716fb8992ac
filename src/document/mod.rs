//! Markdown document parsing and layout.
//!
//! This module handles:
//! - Parsing markdown with comrak into a tree of block nodes
//! - Stamping each node with the source line it began at
//! - Laying blocks out into terminal rows
//! - Carrying the source lines over onto the rendered blocks
//! - Listing the headings as an outline

mod annotate;
mod layout;
mod outline;
mod parser;
mod propagate;
mod tree;

pub use annotate::annotate_lines;
pub use layout::layout;
pub use outline::{OutlineEntry, heading_at_row, outline};
pub use parser::parse_tree;
pub use propagate::propagate_lines;
pub use tree::{
    BlockKind, NodeId, ParseNode, ParseTree, Position, RenderId, RenderNode, RenderTree,
    RenderedRow, RowStyle,
};

/// A parsed, annotated and laid-out markdown document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Original source text
    source: String,
    /// Annotated block tree
    tree: ParseTree,
    /// Rendered blocks carrying source line tags
    render: RenderTree,
    /// Headings in preview order
    outline: Vec<OutlineEntry>,
    /// Width the render tree was laid out at
    width: u16,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// Create an empty document.
    pub fn empty() -> Self {
        Self {
            source: String::new(),
            tree: ParseTree::new(),
            render: RenderTree::new(),
            outline: Vec::new(),
            width: 1,
        }
    }

    /// Parse, annotate and lay out `source` at `width` columns.
    ///
    /// # Example
    ///
    /// ```
    /// use marksync::document::Document;
    ///
    /// let doc = Document::parse("# Hello\n\nWorld", 80);
    /// assert_eq!(doc.render_tree().row_count(), 3);
    /// ```
    pub fn parse(source: &str, width: u16) -> Self {
        let _scope = crate::perf::scope("document.parse");
        let mut tree = parse_tree(source);
        let annotated = annotate_lines(&mut tree);
        let mut render = layout(&tree, width);
        let tagged = propagate_lines(&tree, &mut render);
        let headings = outline(&tree, &render);
        tracing::debug!(
            nodes = tree.len(),
            annotated,
            tagged,
            rows = render.row_count(),
            headings = headings.len(),
            "document parsed"
        );
        Self {
            source: source.to_string(),
            tree,
            render,
            outline: headings,
            width,
        }
    }

    /// Lay the document out again at a new width.
    ///
    /// The parse tree is kept; only the render tree and its tags are rebuilt.
    pub fn relayout(&mut self, width: u16) {
        if width == self.width {
            return;
        }
        let _scope = crate::perf::scope("document.relayout");
        self.render = layout(&self.tree, width);
        propagate_lines(&self.tree, &mut self.render);
        self.outline = outline(&self.tree, &self.render);
        self.width = width;
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub const fn tree(&self) -> &ParseTree {
        &self.tree
    }

    pub const fn render_tree(&self) -> &RenderTree {
        &self.render
    }

    /// Headings in the order the preview shows them.
    pub fn outline(&self) -> &[OutlineEntry] {
        &self.outline
    }

    pub const fn width(&self) -> u16 {
        self.width
    }
}
