//! Markdown parsing with comrak.
//!
//! Converts comrak's AST into a [`ParseTree`] of block nodes. Inline content
//! is flattened into the `text` of the block that owns it; only blocks get
//! their own node, since blocks are what the preview lays out and what scroll
//! sync can point at.

use comrak::nodes::{AstNode, ListType, NodeValue, Sourcepos};
use comrak::{Arena, Options, parse_document};

use super::tree::{BlockKind, NodeId, ParseNode, ParseTree, Position};

/// Parse markdown source into a tree of block nodes with start positions.
///
/// # Example
///
/// ```
/// use marksync::document::parse_tree;
///
/// let tree = parse_tree("# Hello\n\nWorld");
/// assert_eq!(tree.len(), 3); // document + heading + paragraph
/// ```
pub fn parse_tree(source: &str) -> ParseTree {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);

    let mut tree = ParseTree::new();
    let tree_root = tree.root();
    for child in root.children() {
        convert_node(child, &mut tree, tree_root);
    }
    tree
}

fn create_options() -> Options {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.superscript = true;

    options
}

const fn position_of(sourcepos: Sourcepos) -> Option<Position> {
    if sourcepos.start.line == 0 {
        return None;
    }
    Some(Position {
        line: sourcepos.start.line,
        column: sourcepos.start.column,
    })
}

fn convert_node<'a>(node: &'a AstNode<'a>, tree: &mut ParseTree, parent: NodeId) {
    let (kind, position) = {
        let ast = node.data.borrow();
        let kind = match &ast.value {
            NodeValue::Heading(heading) => BlockKind::Heading(heading.level),
            NodeValue::Paragraph => BlockKind::Paragraph,
            NodeValue::CodeBlock(code_block) => BlockKind::CodeBlock {
                info: code_block.info.clone(),
                literal: code_block.literal.clone(),
            },
            NodeValue::BlockQuote => BlockKind::BlockQuote,
            NodeValue::List(list) => BlockKind::List {
                ordered: matches!(list.list_type, ListType::Ordered),
                start: list.start,
            },
            NodeValue::Item(_) => BlockKind::Item { checked: None },
            NodeValue::TaskItem(symbol) => BlockKind::Item {
                checked: Some(symbol.is_some()),
            },
            NodeValue::ThematicBreak => BlockKind::ThematicBreak,
            NodeValue::Table(_) => BlockKind::Table,
            NodeValue::TableRow(header) => BlockKind::TableRow { header: *header },
            NodeValue::HtmlBlock(html) => BlockKind::HtmlBlock(html.literal.clone()),
            NodeValue::FootnoteDefinition(def) => BlockKind::FootnoteDefinition(def.name.clone()),
            value if value.block() => BlockKind::Other,
            // Inline content belongs to the enclosing block's text.
            _ => return,
        };
        (kind, position_of(ast.sourcepos))
    };

    let (text, descend) = match &kind {
        BlockKind::Heading(_) | BlockKind::Paragraph => (extract_text(node), false),
        BlockKind::TableRow { .. } => (row_text(node), false),
        BlockKind::Other if !has_block_children(node) => (extract_text(node), false),
        BlockKind::CodeBlock { .. } | BlockKind::HtmlBlock(_) | BlockKind::ThematicBreak => {
            (String::new(), false)
        }
        _ => (String::new(), true),
    };

    let id = tree.push(parent, ParseNode::new(kind, position).with_text(text));
    if descend {
        for child in node.children() {
            convert_node(child, tree, id);
        }
    }
}

fn has_block_children<'a>(node: &'a AstNode<'a>) -> bool {
    node.children().any(|child| child.data.borrow().value.block())
}

fn row_text<'a>(row: &'a AstNode<'a>) -> String {
    row.children()
        .map(|cell| extract_text(cell).trim().to_string())
        .collect::<Vec<_>>()
        .join("\t")
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => {
            text.push_str(t);
        }
        NodeValue::Code(c) => {
            text.push('`');
            text.push_str(&c.literal);
            text.push('`');
        }
        NodeValue::HtmlInline(html) => {
            text.push_str(html);
        }
        NodeValue::FootnoteReference(reference) => {
            text.push_str(&format!("[^{}]", reference.name));
        }
        NodeValue::SoftBreak => {
            text.push(' ');
        }
        NodeValue::LineBreak => {
            text.push('\n');
        }
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tree: &ParseTree) -> Vec<BlockKind> {
        tree.iter().map(|(_, node)| node.kind.clone()).collect()
    }

    fn line_of(tree: &ParseTree, kind: &BlockKind) -> Option<usize> {
        tree.iter()
            .find(|(_, node)| &node.kind == kind)
            .and_then(|(_, node)| node.position)
            .map(|pos| pos.line)
    }

    #[test]
    fn test_parse_empty_document() {
        let tree = parse_tree("");
        assert!(tree.is_empty());
    }

    #[test]
    fn test_heading_and_paragraph_positions_are_one_based() {
        let tree = parse_tree("# Title\n\nBody text\n");
        assert_eq!(line_of(&tree, &BlockKind::Heading(1)), Some(1));
        assert_eq!(line_of(&tree, &BlockKind::Paragraph), Some(3));
    }

    #[test]
    fn test_root_has_no_position_requirement() {
        let tree = parse_tree("text");
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.kind, BlockKind::Document);
        assert!(root.origin_line.is_none());
    }

    #[test]
    fn test_inline_content_is_flattened_into_block_text() {
        let tree = parse_tree("Some *emphasis* and `code`\nacross lines");
        let (_, para) = tree
            .iter()
            .find(|(_, n)| n.kind == BlockKind::Paragraph)
            .unwrap();
        assert_eq!(para.text, "Some emphasis and `code` across lines");
        assert!(para.children().is_empty());
    }

    #[test]
    fn test_list_items_nest_paragraphs() {
        let tree = parse_tree("- one\n- two\n");
        let labels: Vec<&str> = kinds(&tree)
            .iter()
            .map(|kind| match kind {
                BlockKind::Document => "doc",
                BlockKind::List { ordered: false, .. } => "bullets",
                BlockKind::Item { checked: None } => "item",
                BlockKind::Paragraph => "para",
                _ => "other",
            })
            .collect();
        assert_eq!(labels, vec!["doc", "bullets", "item", "para", "item", "para"]);
    }

    #[test]
    fn test_task_items_record_checked_state() {
        let tree = parse_tree("- [x] done\n- [ ] todo\n");
        let checked: Vec<_> = tree
            .iter()
            .filter_map(|(_, n)| match n.kind {
                BlockKind::Item { checked } => checked,
                _ => None,
            })
            .collect();
        assert_eq!(checked, vec![true, false]);
    }

    #[test]
    fn test_code_block_keeps_literal() {
        let tree = parse_tree("```rust\nfn main() {}\n```\n");
        let code = tree
            .iter()
            .find_map(|(_, n)| match &n.kind {
                BlockKind::CodeBlock { info, literal } => Some((info.clone(), literal.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(code.0, "rust");
        assert_eq!(code.1, "fn main() {}\n");
    }

    #[test]
    fn test_table_rows_carry_their_own_lines() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |\n";
        let tree = parse_tree(md);
        let rows: Vec<_> = tree
            .iter()
            .filter(|(_, n)| matches!(n.kind, BlockKind::TableRow { .. }))
            .map(|(_, n)| (n.position.map(|p| p.line), n.text.clone()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (Some(1), "a\tb".to_string()),
                (Some(3), "1\t2".to_string()),
                (Some(4), "3\t4".to_string()),
            ]
        );
    }

    #[test]
    fn test_positions_are_non_decreasing_in_document_order() {
        let md = "# A\n\npara\n\n> quote\n> more\n\n- x\n- y\n\n```\ncode\n```\n\n---\n";
        let tree = parse_tree(md);
        let lines: Vec<usize> = tree
            .iter()
            .filter_map(|(_, n)| n.position.map(|p| p.line))
            .collect();
        assert!(lines.windows(2).all(|w| w[0] <= w[1]), "{lines:?}");
    }
}
