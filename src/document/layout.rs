//! Terminal block layout.
//!
//! Lays a [`ParseTree`] out into terminal rows at a given width. Every block
//! becomes a [`RenderNode`] that remembers the parse node it came from, the
//! row it starts on and how many rows it spans.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::tree::{
    BlockKind, NodeId, ParseTree, RenderId, RenderNode, RenderTree, RenderedRow, RowStyle,
};

/// Lay out `tree` at `width` columns.
///
/// Top-level blocks are separated by one empty row.
pub fn layout(tree: &ParseTree, width: u16) -> RenderTree {
    let mut engine = Layout {
        tree,
        width: usize::from(width.max(1)),
        out: RenderTree::new(),
    };
    let mut gutter = Gutter::default();
    if let Some(root) = tree.get(tree.root()) {
        for (i, &child) in root.children().iter().enumerate() {
            if i > 0 {
                engine.out.push_row(RenderedRow::empty());
            }
            engine.block(child, None, &mut gutter);
        }
    }
    engine.out
}

/// Row prefixes for nested blocks.
///
/// `first` is used for the first row emitted under this gutter (list markers),
/// `rest` for every row after it.
#[derive(Debug, Clone, Default)]
struct Gutter {
    first: String,
    rest: String,
    used: bool,
    style: Option<RowStyle>,
}

impl Gutter {
    fn take(&mut self) -> String {
        if self.used {
            self.rest.clone()
        } else {
            self.used = true;
            self.first.clone()
        }
    }

    fn nested(&self, first: &str, rest: &str) -> Self {
        let base = if self.used { &self.rest } else { &self.first };
        Self {
            first: format!("{base}{first}"),
            rest: format!("{}{rest}", self.rest),
            used: false,
            style: self.style,
        }
    }

    fn styled(mut self, style: RowStyle) -> Self {
        self.style = Some(style);
        self
    }

    fn blank(&self) -> String {
        self.rest.trim_end().to_string()
    }

    fn width(&self) -> usize {
        self.first.width().max(self.rest.width())
    }
}

struct Layout<'t> {
    tree: &'t ParseTree,
    width: usize,
    out: RenderTree,
}

impl Layout<'_> {
    fn block(&mut self, id: NodeId, parent: Option<RenderId>, gutter: &mut Gutter) {
        let tree = self.tree;
        let Some(node) = tree.get(id) else {
            return;
        };
        let top = self.out.row_count();
        let render_id = self.out.push(parent, RenderNode::new(Some(id), top));

        match &node.kind {
            BlockKind::Heading(level) => {
                let text = format!("{} {}", "#".repeat(usize::from(*level)), node.text);
                self.wrapped(&text, gutter, RowStyle::Heading(*level));
            }
            BlockKind::Paragraph => {
                let style = gutter.style.unwrap_or(RowStyle::Paragraph);
                self.wrapped(&node.text, gutter, style);
            }
            BlockKind::CodeBlock { info, literal } => {
                self.code_block(info, literal, gutter);
            }
            BlockKind::BlockQuote => {
                let mut inner = gutter.nested("│ ", "│ ").styled(RowStyle::Quote);
                self.children(id, render_id, &mut inner, true);
                if inner.used {
                    gutter.used = true;
                } else {
                    self.emit(gutter, "│", RowStyle::Quote);
                }
            }
            BlockKind::List { ordered, start } => {
                self.list(node.children(), *ordered, *start, render_id, gutter);
            }
            BlockKind::Item { .. } => {
                self.children(id, render_id, gutter, false);
                if self.out.row_count() == top {
                    self.emit(gutter, "", RowStyle::ListItem);
                }
            }
            BlockKind::ThematicBreak => {
                let rule = "─".repeat(self.available(gutter));
                self.emit(gutter, &rule, RowStyle::Rule);
            }
            BlockKind::Table => {
                self.table(node.children(), render_id, gutter);
            }
            BlockKind::TableRow { .. } => {
                let text = node.text.replace('\t', " │ ");
                self.wrapped(&text, gutter, RowStyle::Table);
            }
            BlockKind::HtmlBlock(literal) => {
                let avail = self.available(gutter);
                let mut emitted = false;
                for line in literal.lines() {
                    self.emit(gutter, &truncate_to_width(line, avail), RowStyle::Html);
                    emitted = true;
                }
                if !emitted {
                    self.emit(gutter, "", RowStyle::Html);
                }
            }
            BlockKind::FootnoteDefinition(name) => {
                let label = format!("[^{name}]: ");
                let pad = " ".repeat(label.width());
                let mut inner = gutter.nested(&label, &pad);
                self.children(id, render_id, &mut inner, true);
                if inner.used {
                    gutter.used = true;
                } else {
                    self.emit(gutter, label.trim_end(), RowStyle::Paragraph);
                }
            }
            BlockKind::Document | BlockKind::Other => {
                if node.children().is_empty() {
                    let style = gutter.style.unwrap_or(RowStyle::Paragraph);
                    self.wrapped(&node.text, gutter, style);
                } else {
                    self.children(id, render_id, gutter, true);
                }
            }
        }

        let height = self.out.row_count() - top;
        if let Some(render) = self.out.get_mut(render_id) {
            render.height = height;
        }
    }

    fn children(&mut self, id: NodeId, parent: RenderId, gutter: &mut Gutter, separate: bool) {
        let tree = self.tree;
        let Some(node) = tree.get(id) else {
            return;
        };
        for (i, &child) in node.children().iter().enumerate() {
            if separate && i > 0 {
                self.out
                    .push_row(RenderedRow::new(gutter.blank(), RowStyle::Empty));
            }
            self.block(child, Some(parent), gutter);
        }
    }

    fn list(
        &mut self,
        items: &[NodeId],
        ordered: bool,
        start: usize,
        parent: RenderId,
        gutter: &mut Gutter,
    ) {
        let tree = self.tree;
        let last_number = start + items.len().saturating_sub(1);
        let number_width = last_number.to_string().len();
        for (index, &item) in items.iter().enumerate() {
            let checked = match tree.get(item).map(|n| &n.kind) {
                Some(BlockKind::Item { checked }) => *checked,
                _ => None,
            };
            let marker = match (checked, ordered) {
                (Some(true), _) => "✓ ".to_string(),
                (Some(false), _) => "□ ".to_string(),
                (None, true) => format!("{:>width$}. ", start + index, width = number_width),
                (None, false) => "• ".to_string(),
            };
            let pad = " ".repeat(marker.width());
            let mut item_gutter = gutter.nested(&marker, &pad).styled(RowStyle::ListItem);
            self.block(item, Some(parent), &mut item_gutter);
            if item_gutter.used {
                gutter.used = true;
            }
        }
    }

    fn table(&mut self, rows: &[NodeId], parent: RenderId, gutter: &mut Gutter) {
        let tree = self.tree;
        let rows: Vec<(NodeId, Vec<&str>, bool)> = rows
            .iter()
            .filter_map(|&row_id| {
                let row = tree.get(row_id)?;
                let header = matches!(row.kind, BlockKind::TableRow { header: true });
                Some((row_id, row.text.split('\t').collect(), header))
            })
            .collect();
        let columns = rows.iter().map(|(_, cells, _)| cells.len()).max().unwrap_or(0);
        if columns == 0 {
            return;
        }

        let mut widths = vec![1usize; columns];
        for (_, cells, _) in &rows {
            for (i, cell) in cells.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }
        let chrome = 3 * columns + 1;
        let budget = self.available(gutter).saturating_sub(chrome).max(columns);
        if widths.iter().sum::<usize>() > budget {
            let cap = (budget / columns).max(1);
            for width in &mut widths {
                *width = (*width).min(cap);
            }
        }

        self.emit(gutter, &table_border(&widths, '┌', '┬', '┐'), RowStyle::Table);
        for (row_id, cells, header) in &rows {
            let row_top = self.out.row_count();
            let row_render = self.out.push(Some(parent), RenderNode::new(Some(*row_id), row_top));
            self.emit(gutter, &table_row(cells, &widths), RowStyle::Table);
            if let Some(render) = self.out.get_mut(row_render) {
                render.height = 1;
            }
            if *header {
                self.emit(gutter, &table_border(&widths, '├', '┼', '┤'), RowStyle::Table);
            }
        }
        self.emit(gutter, &table_border(&widths, '└', '┴', '┘'), RowStyle::Table);
    }

    fn code_block(&mut self, info: &str, literal: &str, gutter: &mut Gutter) {
        const PADDING: usize = 2;
        let language = info.split_whitespace().next().unwrap_or("code");
        let max_inner = self.available(gutter).saturating_sub(2 + PADDING).max(1);
        let content_width = literal.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
        let inner = content_width.max(language.width() + 1).min(max_inner);
        let frame = inner + PADDING;

        let label = truncate_to_width(&format!(" {language} "), frame);
        let top = format!("┌{label}{}┐", "─".repeat(frame.saturating_sub(label.width())));
        self.emit(gutter, &top, RowStyle::Code);
        for line in literal.lines() {
            let text = truncate_to_width(line, inner);
            let pad = " ".repeat(inner.saturating_sub(text.width()));
            self.emit(gutter, &format!("│ {text}{pad} │"), RowStyle::Code);
        }
        self.emit(gutter, &format!("└{}┘", "─".repeat(frame)), RowStyle::Code);
    }

    fn wrapped(&mut self, text: &str, gutter: &mut Gutter, style: RowStyle) {
        for line in wrap_words(text, self.available(gutter)) {
            self.emit(gutter, &line, style);
        }
    }

    fn emit(&mut self, gutter: &mut Gutter, text: &str, style: RowStyle) {
        let prefix = gutter.take();
        self.out
            .push_row(RenderedRow::new(format!("{prefix}{text}"), style));
    }

    fn available(&self, gutter: &Gutter) -> usize {
        self.width.saturating_sub(gutter.width()).max(1)
    }
}

fn table_border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            line.push(middle);
        }
        line.push_str(&"─".repeat(width + 2));
    }
    line.push(right);
    line
}

fn table_row(cells: &[&str], widths: &[usize]) -> String {
    let mut line = String::from("│");
    for (i, width) in widths.iter().enumerate() {
        let cell = truncate_to_width(cells.get(i).copied().unwrap_or_default(), *width);
        let pad = " ".repeat(width.saturating_sub(cell.width()));
        line.push_str(&format!(" {cell}{pad} │"));
    }
    line
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > max_width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out
}

/// Greedy word wrap. Hard breaks (`\n`) always start a new row, and words
/// wider than `width` are split by character.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for segment in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;
        for word in segment.split_whitespace() {
            let word_width = word.width();
            if current_width > 0 && current_width + 1 + word_width > width {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if word_width > width {
                for ch in word.chars() {
                    let ch_width = ch.width().unwrap_or(0);
                    if current_width > 0 && current_width + ch_width > width {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0;
                    }
                    current.push(ch);
                    current_width += ch_width;
                }
                continue;
            }
            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        }
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_tree;

    fn rows(md: &str, width: u16) -> Vec<String> {
        layout(&parse_tree(md), width)
            .rows()
            .iter()
            .map(|r| r.text().to_string())
            .collect()
    }

    #[test]
    fn test_heading_then_paragraph_separated_by_blank_row() {
        let tree = parse_tree("# Title\n\nBody");
        let render = layout(&tree, 80);
        let texts: Vec<_> = render.rows().iter().map(RenderedRow::text).collect();
        assert_eq!(texts, vec!["# Title", "", "Body"]);
        let tops: Vec<_> = render.nodes().iter().map(|n| n.top).collect();
        assert_eq!(tops, vec![0, 2]);
        assert_eq!(render.rows()[0].style(), RowStyle::Heading(1));
    }

    #[test]
    fn test_paragraph_wraps_to_width() {
        assert_eq!(rows("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_long_word_is_split() {
        assert_eq!(rows("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_bullet_and_ordered_markers() {
        assert_eq!(rows("- one\n- two\n", 80), vec!["• one", "• two"]);
        assert_eq!(rows("1. a\n2. b\n", 80), vec!["1. a", "2. b"]);
    }

    #[test]
    fn test_task_markers() {
        assert_eq!(rows("- [x] done\n- [ ] todo\n", 80), vec!["✓ done", "□ todo"]);
    }

    #[test]
    fn test_nested_list_indents() {
        assert_eq!(
            rows("- outer\n  - inner\n", 80),
            vec!["• outer", "  • inner"]
        );
    }

    #[test]
    fn test_wrapped_list_item_hangs_under_text() {
        assert_eq!(rows("- aaa bbb\n", 7), vec!["• aaa", "  bbb"]);
    }

    #[test]
    fn test_blockquote_prefix() {
        let render = layout(&parse_tree("> hi\n>\n> there\n"), 80);
        let texts: Vec<_> = render.rows().iter().map(RenderedRow::text).collect();
        assert_eq!(texts, vec!["│ hi", "│", "│ there"]);
        assert!(render.rows().iter().any(|r| r.style() == RowStyle::Quote));
    }

    #[test]
    fn test_code_block_box() {
        let lines = rows("```rust\nfn main() {}\n```\n", 80);
        assert!(lines[0].starts_with("┌ rust "), "{lines:?}");
        assert!(lines[1].starts_with("│ fn main() {}"), "{lines:?}");
        assert!(lines[2].starts_with('└'), "{lines:?}");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_table_rows_get_their_own_nodes() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        let tree = parse_tree(md);
        let render = layout(&tree, 80);
        let texts: Vec<_> = render.rows().iter().map(RenderedRow::text).collect();
        assert_eq!(
            texts,
            vec!["┌───┬───┐", "│ a │ b │", "├───┼───┤", "│ 1 │ 2 │", "└───┴───┘"]
        );
        let row_nodes: Vec<_> = render
            .nodes()
            .iter()
            .filter(|n| {
                n.origin
                    .and_then(|id| tree.get(id))
                    .is_some_and(|p| matches!(p.kind, BlockKind::TableRow { .. }))
            })
            .map(|n| (n.top, n.height))
            .collect();
        assert_eq!(row_nodes, vec![(1, 1), (3, 1)]);
    }

    #[test]
    fn test_block_tops_follow_document_order() {
        let md = "# A\n\npara one\n\n- x\n- y\n\n> q\n\n```\nc\n```\n\n---\n\nend\n";
        let render = layout(&parse_tree(md), 40);
        let tops: Vec<_> = render.nodes().iter().map(|n| n.top).collect();
        assert!(tops.windows(2).all(|w| w[0] <= w[1]), "{tops:?}");
        assert!(render.nodes().iter().all(|n| n.top + n.height <= render.row_count()));
    }

    #[test]
    fn test_container_height_covers_children() {
        let render = layout(&parse_tree("- a\n- b\n- c\n"), 80);
        let list = &render.nodes()[0];
        assert_eq!(list.top, 0);
        assert_eq!(list.height, 3);
    }

    #[test]
    fn test_thematic_break_fills_width() {
        assert_eq!(rows("---\n", 5), vec!["─────"]);
    }
}
