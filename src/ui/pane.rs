//! Scrollable panes for the split view.
//!
//! [`SourcePane`] shows the raw markdown one line per row and [`PreviewPane`]
//! shows the laid-out render tree. Both keep their scroll position in a
//! [`PaneScroll`], which clamps every move and notifies scroll listeners
//! whenever the offset actually changes. Geometry is measured in terminal
//! rows, so the source pane's line height is exactly one row.

use std::ops::Range;
use std::sync::mpsc::Sender;

use ropey::Rope;

use crate::document::RenderTree;
use crate::sync::{
    AnnotatedNode, RenderedSurface, ScrollGeometry, ScrollListeners, ScrollSurface, Side,
    Subscription, SurfaceError, TextSurface,
};

/// Scroll position of one pane.
///
/// # Example
///
/// ```
/// use marksync::ui::pane::PaneScroll;
///
/// let mut scroll = PaneScroll::new(24, 100);
/// scroll.scroll_down(10);
/// assert_eq!(scroll.visible_range(), 10..34);
/// ```
#[derive(Debug, Default)]
pub struct PaneScroll {
    offset: usize,
    height: u16,
    total_rows: usize,
    listeners: ScrollListeners,
}

impl PaneScroll {
    pub fn new(height: u16, total_rows: usize) -> Self {
        Self {
            offset: 0,
            height,
            total_rows,
            listeners: ScrollListeners::new(),
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.height as usize).min(self.total_rows);
        self.offset.min(end)..end
    }

    /// Scroll position as 0-100. Documents that fit are at 100.
    pub fn scroll_percent(&self) -> u8 {
        let max = self.max_offset();
        if max == 0 {
            return 100;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max as f64) * 100.0).round() as u8
        }
    }

    pub const fn max_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.height as usize)
    }

    /// Move to `offset`, clamped. Listeners hear about it only if the
    /// offset changed.
    pub fn set_offset(&mut self, offset: usize) {
        let clamped = offset.min(self.max_offset());
        if clamped != self.offset {
            self.offset = clamped;
            self.listeners.notify();
        }
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.set_offset(self.offset.saturating_sub(n));
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.set_offset(self.offset.saturating_add(n));
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.height as usize);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height as usize);
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up(self.height as usize / 2);
    }

    pub fn half_page_down(&mut self) {
        self.scroll_down(self.height as usize / 2);
    }

    pub fn go_to_top(&mut self) {
        self.set_offset(0);
    }

    pub fn go_to_bottom(&mut self) {
        self.set_offset(self.max_offset());
    }

    pub fn resize(&mut self, height: u16) {
        self.height = height;
        self.set_offset(self.offset);
    }

    pub fn set_total_rows(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
        self.set_offset(self.offset);
    }

    pub const fn listeners(&self) -> &ScrollListeners {
        &self.listeners
    }

    #[allow(clippy::cast_precision_loss)]
    fn geometry(&self) -> ScrollGeometry {
        ScrollGeometry {
            scroll_top: self.offset as f64,
            scroll_height: self.total_rows as f64,
            client_height: f64::from(self.height),
        }
    }

    /// Scroll to a fractional row, rounded to the nearest whole row.
    fn set_scroll_top(&mut self, top: f64) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let row = if top.is_finite() && top > 0.0 {
            top.round() as usize
        } else {
            0
        };
        self.set_offset(row);
    }
}

/// The raw markdown pane.
#[derive(Debug, Default)]
pub struct SourcePane {
    text: Rope,
    scroll: PaneScroll,
}

impl SourcePane {
    pub fn new(text: &str, height: u16) -> Self {
        let text = Rope::from_str(text);
        let lines = line_count(&text);
        Self {
            text,
            scroll: PaneScroll::new(height, lines),
        }
    }

    /// Replace the text, keeping the scroll position where it still fits.
    pub fn set_text(&mut self, text: &str) {
        self.text = Rope::from_str(text);
        self.scroll.set_total_rows(line_count(&self.text));
    }

    /// Number of markdown lines. A trailing newline does not start a line.
    pub fn line_count(&self) -> usize {
        line_count(&self.text)
    }

    /// Line `idx` (0-based) without its line ending.
    pub fn line_at(&self, idx: usize) -> Option<String> {
        if idx >= self.line_count() {
            return None;
        }
        let line = self.text.line(idx).to_string();
        Some(line.trim_end_matches(['\n', '\r']).to_string())
    }

    pub const fn scroll(&self) -> &PaneScroll {
        &self.scroll
    }

    pub const fn scroll_mut(&mut self) -> &mut PaneScroll {
        &mut self.scroll
    }
}

fn line_count(text: &Rope) -> usize {
    let lines = text.len_lines();
    if text.len_chars() == 0 {
        0
    } else if text.char(text.len_chars() - 1) == '\n' {
        lines - 1
    } else {
        lines
    }
}

impl ScrollSurface for SourcePane {
    fn geometry(&self) -> Result<ScrollGeometry, SurfaceError> {
        Ok(self.scroll.geometry())
    }

    fn set_scroll_top(&mut self, top: f64) -> Result<(), SurfaceError> {
        self.scroll.set_scroll_top(top);
        Ok(())
    }

    fn subscribe(&self, side: Side, sink: Sender<Side>) -> Subscription {
        self.scroll.listeners.subscribe(side, sink)
    }
}

impl TextSurface for SourcePane {
    fn line_height(&self) -> Option<f64> {
        Some(1.0)
    }

    fn total_lines(&self) -> usize {
        self.line_count()
    }
}

/// The rendered preview pane.
#[derive(Debug, Default)]
pub struct PreviewPane {
    tree: RenderTree,
    scroll: PaneScroll,
}

impl PreviewPane {
    pub fn new(tree: RenderTree, height: u16) -> Self {
        let rows = tree.row_count();
        Self {
            tree,
            scroll: PaneScroll::new(height, rows),
        }
    }

    /// Show a freshly laid-out tree, keeping the scroll position where it
    /// still fits.
    pub fn set_tree(&mut self, tree: RenderTree) {
        let rows = tree.row_count();
        self.tree = tree;
        self.scroll.set_total_rows(rows);
    }

    pub const fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub const fn scroll(&self) -> &PaneScroll {
        &self.scroll
    }

    pub const fn scroll_mut(&mut self) -> &mut PaneScroll {
        &mut self.scroll
    }
}

impl ScrollSurface for PreviewPane {
    fn geometry(&self) -> Result<ScrollGeometry, SurfaceError> {
        Ok(self.scroll.geometry())
    }

    fn set_scroll_top(&mut self, top: f64) -> Result<(), SurfaceError> {
        self.scroll.set_scroll_top(top);
        Ok(())
    }

    fn subscribe(&self, side: Side, sink: Sender<Side>) -> Subscription {
        self.scroll.listeners.subscribe(side, sink)
    }
}

impl RenderedSurface for PreviewPane {
    fn annotated_nodes(&self) -> Result<Vec<AnnotatedNode>, SurfaceError> {
        #[allow(clippy::cast_precision_loss)]
        let nodes = self
            .tree
            .nodes()
            .iter()
            .filter_map(|node| {
                node.source_line().map(|line| AnnotatedNode {
                    line: line.get(),
                    top: node.top as f64,
                })
            })
            .collect();
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use std::sync::mpsc;

    fn numbered(lines: usize) -> String {
        (1..=lines).map(|i| format!("line {i}\n")).collect()
    }

    fn paragraphs(count: usize) -> String {
        (1..=count).map(|i| format!("para {i}\n\n")).collect()
    }

    #[test]
    fn test_scroll_clamps_to_bounds() {
        let mut scroll = PaneScroll::new(24, 100);
        scroll.scroll_down(1000);
        assert_eq!(scroll.offset(), 76);
        scroll.scroll_up(1000);
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_page_and_half_page() {
        let mut scroll = PaneScroll::new(24, 100);
        scroll.page_down();
        assert_eq!(scroll.offset(), 24);
        scroll.half_page_down();
        assert_eq!(scroll.offset(), 36);
        scroll.half_page_up();
        scroll.page_up();
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_short_content_is_fully_scrolled() {
        let scroll = PaneScroll::new(24, 10);
        assert_eq!(scroll.visible_range(), 0..10);
        assert_eq!(scroll.scroll_percent(), 100);
    }

    #[test]
    fn test_resize_and_shrink_clamp_offset() {
        let mut scroll = PaneScroll::new(24, 100);
        scroll.go_to_bottom();
        scroll.resize(60);
        assert_eq!(scroll.offset(), 40);
        scroll.set_total_rows(50);
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_only_real_moves_notify() {
        let mut pane = SourcePane::new(&numbered(100), 20);
        let (tx, rx) = mpsc::channel();
        let _sub = pane.subscribe(Side::Source, tx);

        pane.scroll_mut().scroll_up(5);
        assert!(rx.try_recv().is_err(), "already at the top");

        pane.scroll_mut().scroll_down(5);
        assert_eq!(rx.try_recv(), Ok(Side::Source));

        pane.set_scroll_top(5.0).unwrap();
        assert!(rx.try_recv().is_err(), "same offset");
    }

    #[test]
    fn test_programmatic_write_notifies() {
        let mut pane = PreviewPane::new(Document::parse(&paragraphs(60), 40).render_tree().clone(), 10);
        let (tx, rx) = mpsc::channel();
        let _sub = pane.subscribe(Side::Preview, tx);

        pane.set_scroll_top(12.4).unwrap();
        assert_eq!(pane.scroll().offset(), 12);
        assert_eq!(rx.try_recv(), Ok(Side::Preview));
    }

    #[test]
    fn test_negative_and_nan_tops_go_to_origin() {
        let mut pane = SourcePane::new(&numbered(100), 20);
        pane.scroll_mut().scroll_down(30);
        pane.set_scroll_top(-4.0).unwrap();
        assert_eq!(pane.scroll().offset(), 0);
        pane.scroll_mut().scroll_down(30);
        pane.set_scroll_top(f64::NAN).unwrap();
        assert_eq!(pane.scroll().offset(), 0);
    }

    #[test]
    fn test_source_line_count_ignores_trailing_newline() {
        assert_eq!(SourcePane::new("", 10).line_count(), 0);
        assert_eq!(SourcePane::new("a", 10).line_count(), 1);
        assert_eq!(SourcePane::new("a\nb\n", 10).line_count(), 2);
        assert_eq!(SourcePane::new("a\n\n", 10).line_count(), 2);
    }

    #[test]
    fn test_source_line_at_strips_endings() {
        let pane = SourcePane::new("# Title\r\nbody\n", 10);
        assert_eq!(pane.line_at(0).as_deref(), Some("# Title"));
        assert_eq!(pane.line_at(1).as_deref(), Some("body"));
        assert_eq!(pane.line_at(2), None);
    }

    #[test]
    fn test_source_geometry_is_in_rows() {
        let mut pane = SourcePane::new(&numbered(100), 20);
        pane.scroll_mut().scroll_down(7);
        let geometry = pane.geometry().unwrap();
        assert!((geometry.scroll_top - 7.0).abs() < f64::EPSILON);
        assert!((geometry.scroll_height - 100.0).abs() < f64::EPSILON);
        assert!((geometry.client_height - 20.0).abs() < f64::EPSILON);
        assert_eq!(pane.line_height(), Some(1.0));
        assert_eq!(pane.total_lines(), 100);
    }

    #[test]
    fn test_preview_reports_tagged_blocks() {
        let doc = Document::parse("# One\n\ntext\n\n## Two\n", 80);
        let pane = PreviewPane::new(doc.render_tree().clone(), 10);
        let nodes = pane.annotated_nodes().unwrap();
        let lines: Vec<_> = nodes.iter().map(|n| n.line).collect();
        assert_eq!(lines, vec![1, 3, 5]);
        assert!(nodes.windows(2).all(|w| w[0].top < w[1].top));
    }

    #[test]
    fn test_set_tree_clamps_offset() {
        let long = Document::parse(&paragraphs(40), 80);
        let mut pane = PreviewPane::new(long.render_tree().clone(), 5);
        pane.scroll_mut().go_to_bottom();
        let short = Document::parse("# Short\n", 80);
        pane.set_tree(short.render_tree().clone());
        assert_eq!(pane.scroll().offset(), 0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn offset_never_exceeds_bounds(
                total in 0..5000usize,
                height in 1..100u16,
                moves in proptest::collection::vec(-500i64..500, 0..20),
            ) {
                let mut scroll = PaneScroll::new(height, total);
                for delta in moves {
                    let n = usize::try_from(delta.unsigned_abs()).unwrap();
                    if delta < 0 {
                        scroll.scroll_up(n);
                    } else {
                        scroll.scroll_down(n);
                    }
                    prop_assert!(scroll.offset() <= total.saturating_sub(height as usize));
                }
                let range = scroll.visible_range();
                prop_assert!(range.start <= range.end && range.end <= total);
            }

            #[test]
            fn set_scroll_top_lands_in_range(top in -1e6..1e6f64, total in 0..2000usize) {
                let mut pane = SourcePane::new(&"x\n".repeat(total), 20);
                pane.set_scroll_top(top).unwrap();
                prop_assert!(pane.scroll().offset() <= pane.scroll().max_offset());
            }
        }
    }
}
