//! Parse and render trees.
//!
//! Both trees are flat arenas indexed by ids. A [`RenderNode`] names the
//! [`NodeId`] of the parse node it was laid out from, which is the identity
//! the tag propagator walks by.

use crate::SourceLine;

/// Stable identity of a node in a [`ParseTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Index of the node in its arena.
    pub const fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) const fn dangling() -> Self {
        Self(usize::MAX)
    }
}

/// Identity of a node in a [`RenderTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderId(usize);

impl RenderId {
    /// Index of the node in its arena.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Start position reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
}

/// Structural kind of a block node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Document,
    Heading(u8),
    Paragraph,
    CodeBlock { info: String, literal: String },
    BlockQuote,
    List { ordered: bool, start: usize },
    Item { checked: Option<bool> },
    ThematicBreak,
    Table,
    TableRow { header: bool },
    HtmlBlock(String),
    FootnoteDefinition(String),
    Other,
}

/// A block-level node of the parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    /// Block kind
    pub kind: BlockKind,
    /// Start position, when the parser reported one
    pub position: Option<Position>,
    /// Line the node began at, stamped by the annotator
    pub origin_line: Option<SourceLine>,
    /// Flattened inline text (paragraphs, headings, table cells joined by tabs)
    pub text: String,
    children: Vec<NodeId>,
}

impl ParseNode {
    pub fn new(kind: BlockKind, position: Option<Position>) -> Self {
        Self {
            kind,
            position,
            origin_line: None,
            text: String::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena of parse nodes rooted at a [`BlockKind::Document`] node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<ParseNode>,
}

impl Default for ParseTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseTree {
    /// Create a tree holding only the document root.
    pub fn new() -> Self {
        Self {
            nodes: vec![ParseNode::new(BlockKind::Document, None)],
        }
    }

    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append `node` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn push(&mut self, parent: NodeId, node: ParseNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&ParseNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ParseNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Nodes in insertion order, which is document pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ParseNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ParseNode> {
        self.nodes.iter_mut()
    }
}

/// Visual treatment of a rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Heading(u8),
    Paragraph,
    Code,
    Quote,
    ListItem,
    Rule,
    Table,
    Html,
    Empty,
}

/// One terminal row of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    text: String,
    style: RowStyle,
}

impl RenderedRow {
    pub fn new(text: impl Into<String>, style: RowStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn empty() -> Self {
        Self::new(String::new(), RowStyle::Empty)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> RowStyle {
        self.style
    }
}

/// A laid-out block of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderNode {
    /// Parse node this block was laid out from
    pub origin: Option<NodeId>,
    /// First row of the block
    pub top: usize,
    /// Number of rows the block spans, including nested blocks
    pub height: usize,
    source_line: Option<SourceLine>,
    children: Vec<RenderId>,
}

impl RenderNode {
    pub const fn new(origin: Option<NodeId>, top: usize) -> Self {
        Self {
            origin,
            top,
            height: 0,
            source_line: None,
            children: Vec::new(),
        }
    }

    /// The source line tag, if one was propagated.
    pub const fn source_line(&self) -> Option<SourceLine> {
        self.source_line
    }

    pub const fn set_source_line(&mut self, line: Option<SourceLine>) {
        self.source_line = line;
    }

    pub fn children(&self) -> &[RenderId] {
        &self.children
    }
}

/// Rendered output: block nodes plus the rows they occupy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderTree {
    nodes: Vec<RenderNode>,
    rows: Vec<RenderedRow>,
}

impl RenderTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, optionally under `parent`.
    pub fn push(&mut self, parent: Option<RenderId>, node: RenderNode) -> RenderId {
        let id = RenderId(self.nodes.len());
        self.nodes.push(node);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p.0)) {
            parent.children.push(id);
        }
        id
    }

    pub fn push_row(&mut self, row: RenderedRow) {
        self.rows.push(row);
    }

    pub fn get(&self, id: RenderId) -> Option<&RenderNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: RenderId) -> Option<&mut RenderNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [RenderNode] {
        &mut self.nodes
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows in `[start, start + count)`, clamped to the tree.
    pub fn visible_rows(&self, start: usize, count: usize) -> &[RenderedRow] {
        let start = start.min(self.rows.len());
        let end = start.saturating_add(count).min(self.rows.len());
        &self.rows[start..end]
    }
}
