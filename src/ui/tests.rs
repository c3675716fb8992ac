use super::*;
use crate::app::{Message, Model, update};
use crate::document::RowStyle;
use crate::sync::Side;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::style::Color;
use std::path::PathBuf;

fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).unwrap()
}

fn draw(model: &Model, width: u16, height: u16) -> Terminal<TestBackend> {
    let mut terminal = create_test_terminal(width, height);
    terminal.draw(|frame| render(model, frame)).unwrap();
    terminal
}

fn row_text(terminal: &Terminal<TestBackend>, row: u16) -> String {
    let buffer = terminal.backend().buffer();
    (0..buffer.area.width)
        .map(|col| buffer[(col, row)].symbol())
        .collect()
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    buffer.content().iter().map(|c| c.symbol()).collect()
}

fn model(text: &str) -> Model {
    Model::new(PathBuf::from("notes.md"), text, (80, 24))
}

#[test]
fn test_render_shows_source_and_preview() {
    let model = model("# Title\n\nSome *body* text\n");
    let terminal = draw(&model, 80, 24);
    let screen = screen_text(&terminal);

    assert!(screen.contains("Source"));
    assert!(screen.contains("Preview"));
    // Raw markdown on the left, rendered text on the right.
    assert!(screen.contains("Some *body* text"));
    assert!(screen.contains("Some body text"));
}

#[test]
fn test_source_rows_have_line_numbers() {
    let model = model("alpha\nbeta\ngamma\n");
    let terminal = draw(&model, 80, 24);
    assert!(row_text(&terminal, 1).contains("1 alpha"));
    assert!(row_text(&terminal, 3).contains("3 gamma"));
}

#[test]
fn test_source_pane_follows_scroll_offset() {
    let text: String = (1..=100).map(|i| format!("line {i}\n")).collect();
    let model = update(model(&text), Message::ScrollDown(40));
    let terminal = draw(&model, 80, 24);
    assert!(row_text(&terminal, 1).contains("41 line 41"));
}

#[test]
fn test_status_bar_is_last_row() {
    let model = model("# Title\n");
    let terminal = draw(&model, 80, 24);
    let status = row_text(&terminal, 23);
    assert!(status.contains("notes.md"));
    assert!(status.contains("[sync]"));
}

#[test]
fn test_status_text_reports_focus_and_position() {
    let text: String = (1..=50).map(|i| format!("line {i}\n")).collect();
    let model = model(&text);
    let status = status_text(&model);
    assert!(status.contains("source"));
    assert!(status.contains("Ln 1/50"));
    assert!(status.contains("split 50%"));

    let model = update(model, Message::Focus(Side::Preview));
    assert!(status_text(&model).contains("preview"));
}

#[test]
fn test_status_text_shows_flags() {
    let mut model = model("text\n");
    model.sync_enabled = false;
    model.watch_enabled = true;
    let status = status_text(&model);
    assert!(status.contains("[nosync]"));
    assert!(status.contains("[watching]"));
}

#[test]
fn test_unsynced_title_when_sync_off() {
    let model = update(model("text\n"), Message::ToggleSync);
    let terminal = draw(&model, 80, 24);
    assert!(screen_text(&terminal).contains("Preview (unsynced)"));
}

#[test]
fn test_help_replaces_status_bar() {
    let model = update(model("text\n"), Message::ToggleHelp);
    let terminal = draw(&model, 100, 24);
    let status = row_text(&terminal, 23);
    assert!(status.contains("s sync"));
    assert!(!status.contains("notes.md"));
}

#[test]
fn test_focused_pane_border_is_highlighted() {
    let model = model("text\n");
    let terminal = draw(&model, 80, 24);
    let buffer = terminal.backend().buffer();
    assert_eq!(buffer[(0, 0)].fg, Color::Yellow);
    assert_ne!(buffer[(79, 0)].fg, Color::Yellow);
}

#[test]
fn test_split_panes_respects_percent() {
    let chunks = split_panes(Rect::new(0, 0, 100, 20), 60);
    assert_eq!(chunks[0].width, 60);
    assert_eq!(chunks[1].width, 40);
    assert_eq!(chunks[1].x, 60);
}

#[test]
fn test_pane_areas_hit_testing() {
    let areas = PaneAreas::new(Rect::new(0, 0, 80, 24), 50);
    assert_eq!(areas.status.y, 23);
    assert_eq!(areas.side_at(0, 0), Some(Side::Source));
    assert_eq!(areas.side_at(39, 22), Some(Side::Source));
    assert_eq!(areas.side_at(40, 0), Some(Side::Preview));
    assert_eq!(areas.side_at(10, 23), None);
    assert_eq!(areas.side_at(80, 0), None);
}

#[test]
fn test_pane_dimensions_subtract_borders_and_padding() {
    let dims = pane_dimensions(80, 24, 50);
    assert_eq!(dims.height, 21);
    assert_eq!(dims.preview_width, 40 - 2 - PREVIEW_LEFT_PADDING);

    let tiny = pane_dimensions(3, 2, 50);
    assert_eq!(tiny.preview_width, 1);
    assert_eq!(tiny.height, 0);
}

#[test]
fn test_clamp_split_limits() {
    assert_eq!(clamp_split(0), MIN_SPLIT_PERCENT);
    assert_eq!(clamp_split(55), 55);
    assert_eq!(clamp_split(100), MAX_SPLIT_PERCENT);
}

#[test]
fn test_line_number_width() {
    assert_eq!(line_number_width(0), 1);
    assert_eq!(line_number_width(9), 1);
    assert_eq!(line_number_width(10), 2);
    assert_eq!(line_number_width(999), 3);
    assert_eq!(line_number_width(1_000), 4);
}

#[test]
fn test_heading_rows_are_styled() {
    let model = model("# Title\n\nbody\n");
    assert_eq!(
        model.preview.tree().rows()[0].style(),
        RowStyle::Heading(1)
    );
    let terminal = draw(&model, 80, 24);
    let buffer = terminal.backend().buffer();
    // Preview starts after the split, the border and the padding column.
    let cell = &buffer[(40 + 1 + PREVIEW_LEFT_PADDING, 1)];
    assert_eq!(cell.symbol(), "#");
    assert_eq!(cell.fg, style::style_for_row(RowStyle::Heading(1)).fg.unwrap_or(Color::Reset));
}

#[test]
fn test_render_tiny_terminal_does_not_panic() {
    let model = Model::new(PathBuf::from("a.md"), "# A\n\nb\n", (4, 2));
    let _ = draw(&model, 4, 2);
}

fn sectioned(count: usize) -> Model {
    let text: String = (1..=count)
        .map(|i| format!("## Section {i}\n\nbody {i}\n\n"))
        .collect();
    model(&text)
}

#[test]
fn test_outline_overlay_lists_headings_with_selection() {
    let model = update(sectioned(5), Message::ToggleOutline);
    let terminal = draw(&model, 80, 24);
    assert!(row_text(&terminal, 0).contains("Outline"));
    assert!(row_text(&terminal, 1).contains(">   Section 1"));
    assert!(row_text(&terminal, 5).contains("    Section 5"));

    let buffer = terminal.backend().buffer();
    // First character of the selected entry inside the overlay border.
    let cell = &buffer[(80 - OUTLINE_WIDTH + 1, 1)];
    assert_eq!(cell.symbol(), ">");
    assert!(cell.modifier.contains(ratatui::style::Modifier::REVERSED));
}

#[test]
fn test_outline_marks_active_heading_apart_from_selection() {
    let model = update(sectioned(5), Message::ToggleOutline);
    let model = update(model, Message::OutlineDown);
    let terminal = draw(&model, 80, 24);
    assert!(row_text(&terminal, 1).contains("*   Section 1"));
    assert!(row_text(&terminal, 2).contains(">   Section 2"));
}

#[test]
fn test_outline_hidden_by_default() {
    let terminal = draw(&sectioned(3), 80, 24);
    assert!(!screen_text(&terminal).contains("Outline"));
}

#[test]
fn test_outline_without_headings_says_so() {
    let model = update(model("plain text\n"), Message::ToggleOutline);
    let terminal = draw(&model, 80, 24);
    assert!(screen_text(&terminal).contains("(no headings)"));
}

#[test]
fn test_outline_area_fits_preview() {
    let preview = Rect::new(40, 0, 40, 23);
    assert_eq!(outline_area(preview, 3), Rect::new(48, 0, 32, 5));
    assert_eq!(outline_area(preview, 0).height, 3);
    assert_eq!(outline_area(preview, 100).height, 23);
    assert_eq!(outline_area(Rect::new(0, 0, 10, 8), 3).width, 10);
}

#[test]
fn test_outline_window_keeps_selection_visible() {
    assert_eq!(outline_window_start(5, 4, 10), 0);
    assert_eq!(outline_window_start(50, 0, 10), 0);
    assert_eq!(outline_window_start(50, 20, 10), 15);
    assert_eq!(outline_window_start(50, 49, 10), 40);
}

#[test]
fn test_outline_scrolls_to_selected_entry() {
    let mut model = update(sectioned(40), Message::ToggleOutline);
    model = update(model, Message::OutlineLast);
    let terminal = draw(&model, 80, 24);
    // 21 entry rows: the window ends on the selection.
    assert!(row_text(&terminal, 1).contains("    Section 20"));
    assert!(row_text(&terminal, 21).contains(">   Section 40"));
}

#[test]
fn test_outline_entry_at_maps_rows_through_window() {
    let model = sectioned(40);
    let entries = model.document.outline();
    let preview = Rect::new(40, 0, 40, 23);
    assert_eq!(outline_entry_at(entries, 0, preview, 50, 1), Some(0));
    assert_eq!(outline_entry_at(entries, 39, preview, 50, 1), Some(19));
    // Border and the area left of the overlay hold no entry.
    assert_eq!(outline_entry_at(entries, 0, preview, 48, 1), None);
    assert_eq!(outline_entry_at(entries, 0, preview, 50, 0), None);
    assert_eq!(outline_entry_at(entries, 0, preview, 45, 3), None);
}
