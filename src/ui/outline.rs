use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::Model;
use crate::document::{OutlineEntry, RowStyle};

use super::style;

/// Widest the outline overlay gets.
pub const OUTLINE_WIDTH: u16 = 32;

/// Overlay rectangle for `entries` in the top-right corner of `preview`.
pub fn outline_area(preview: Rect, entries: usize) -> Rect {
    let width = preview.width.min(OUTLINE_WIDTH);
    let wanted = u16::try_from(entries.max(1).saturating_add(2)).unwrap_or(u16::MAX);
    Rect {
        x: preview.x + preview.width - width,
        y: preview.y,
        width,
        height: wanted.min(preview.height),
    }
}

/// First entry shown when `visible_rows` rows are available, keeping
/// `selected` in view.
pub fn outline_window_start(entries: usize, selected: usize, visible_rows: usize) -> usize {
    let max_start = entries.saturating_sub(visible_rows);
    selected.saturating_sub(visible_rows / 2).min(max_start)
}

/// Outline entry under the cell at `(column, row)`, if the overlay shows one
/// there.
pub fn outline_entry_at(
    entries: &[OutlineEntry],
    selected: usize,
    preview: Rect,
    column: u16,
    row: u16,
) -> Option<usize> {
    let area = outline_area(preview, entries.len());
    let inner = area.inner(Margin::new(1, 1));
    if column < inner.x
        || column >= inner.x + inner.width
        || row < inner.y
        || row >= inner.y + inner.height
    {
        return None;
    }
    let start = outline_window_start(entries.len(), selected, inner.height as usize);
    let idx = start + (row - inner.y) as usize;
    (idx < entries.len()).then_some(idx)
}

pub fn render_outline(model: &Model, frame: &mut Frame, preview: Rect) {
    let entries = model.document.outline();
    let area = outline_area(preview, entries.len());
    if area.width < 3 || area.height < 3 {
        return;
    }
    let active = model.active_heading();
    let selected = model.outline_selected;

    let items: Vec<Line> = if entries.is_empty() {
        vec![Line::styled(" (no headings)", style::line_number_style())]
    } else {
        let visible_rows = area.height.saturating_sub(2) as usize;
        let start = outline_window_start(entries.len(), selected, visible_rows);
        entries
            .iter()
            .enumerate()
            .skip(start)
            .take(visible_rows)
            .map(|(i, entry)| {
                let marker = if i == selected {
                    ">"
                } else if Some(i) == active {
                    "*"
                } else {
                    " "
                };
                let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
                let base = style::style_for_row(RowStyle::Heading(entry.level));
                let style = if i == selected { base.reversed() } else { base };
                Line::styled(format!("{marker}{indent} {}", entry.title), style)
            })
            .collect()
    };

    let block = Block::default()
        .title(" Outline ")
        .borders(Borders::ALL)
        .border_style(style::pane_border_style(true));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(items).block(block), area);
}
