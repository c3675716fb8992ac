use std::rc::Rc;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;
use crate::sync::Side;

use super::{PREVIEW_LEFT_PADDING, outline, status, style};

/// Column split between the source and preview panes.
pub fn split_panes(area: Rect, split_percent: u16) -> Rc<[Rect]> {
    let split = super::clamp_split(split_percent);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(split),
            Constraint::Percentage(100 - split),
        ])
        .split(area)
}

/// Screen areas for the two panes and the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneAreas {
    pub source: Rect,
    pub preview: Rect,
    pub status: Rect,
}

impl PaneAreas {
    pub fn new(area: Rect, split_percent: u16) -> Self {
        let main = Rect {
            height: area.height.saturating_sub(1),
            ..area
        };
        let status = Rect {
            y: area.y + area.height.saturating_sub(1),
            height: area.height.min(1),
            ..area
        };
        let columns = split_panes(main, split_percent);
        Self {
            source: columns[0],
            preview: columns[1],
            status,
        }
    }

    /// Which pane, if any, contains the cell at `(column, row)`.
    pub const fn side_at(&self, column: u16, row: u16) -> Option<Side> {
        if contains(self.source, column, row) {
            Some(Side::Source)
        } else if contains(self.preview, column, row) {
            Some(Side::Preview)
        } else {
            None
        }
    }
}

const fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

/// Inner sizes of the panes for a terminal of `width` x `height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneDimensions {
    /// Columns available to preview text
    pub preview_width: u16,
    /// Rows visible in either pane
    pub height: u16,
}

pub fn pane_dimensions(width: u16, height: u16, split_percent: u16) -> PaneDimensions {
    let areas = PaneAreas::new(Rect::new(0, 0, width, height), split_percent);
    PaneDimensions {
        preview_width: areas
            .preview
            .width
            .saturating_sub(2 + PREVIEW_LEFT_PADDING)
            .max(1),
        height: areas.source.height.saturating_sub(2),
    }
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let areas = PaneAreas::new(frame.area(), model.split_percent);
    render_source(model, frame, areas.source);
    render_preview(model, frame, areas.preview);
    if model.outline_visible {
        outline::render_outline(model, frame, areas.preview);
    }

    let status_area = areas.status;
    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, status_area);
    } else {
        status::render_status_bar(model, frame, status_area);
    }
}

fn render_source(model: &Model, frame: &mut Frame, area: Rect) {
    let pane = &model.source;
    let gutter = line_number_width(pane.line_count()) as usize;
    let content: Vec<Line> = pane
        .scroll()
        .visible_range()
        .map(|idx| {
            let number = format!("{:>gutter$} ", idx + 1);
            let text = pane.line_at(idx).unwrap_or_default();
            Line::from(vec![
                Span::styled(number, style::line_number_style()),
                Span::raw(text),
            ])
        })
        .collect();

    let block = Block::default()
        .title(" Source ")
        .borders(Borders::ALL)
        .border_style(style::pane_border_style(model.focus == Side::Source));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let scroll = model.preview.scroll();
    let content: Vec<Line> = model
        .preview
        .tree()
        .visible_rows(scroll.offset(), scroll.height() as usize)
        .iter()
        .map(|row| Line::styled(row.text().to_string(), style::style_for_row(row.style())))
        .collect();

    let title = if model.sync_enabled {
        " Preview "
    } else {
        " Preview (unsynced) "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style::pane_border_style(model.focus == Side::Preview))
        .padding(Padding::left(PREVIEW_LEFT_PADDING));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
