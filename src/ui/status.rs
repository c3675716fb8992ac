use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::sync::Side;

pub fn status_text(model: &Model) -> String {
    let filename = model.file_path.file_name().map_or_else(
        || "untitled".to_string(),
        |s| s.to_string_lossy().to_string(),
    );

    let source = model.source.scroll();
    let preview = model.preview.scroll();
    let focus = match model.focus {
        Side::Source => "source",
        Side::Preview => "preview",
    };
    let line_info = format!(
        "Ln {}/{}",
        (source.offset() + 1).min(source.total_rows().max(1)),
        source.total_rows()
    );
    let sync_indicator = if model.sync_enabled {
        " [sync]"
    } else {
        " [nosync]"
    };
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };

    format!(
        " {filename}  {focus}  {line_info} [{}%|{}%]{sync_indicator}{watch_indicator}  split {}%  ?:keys q:quit",
        source.scroll_percent(),
        preview.scroll_percent(),
        model.split_percent,
    )
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let text = if model.help_visible {
        KEY_HELP.to_string()
    } else {
        status_text(model)
    };
    let status_bar =
        Paragraph::new(text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}

const KEY_HELP: &str =
    " j/k scroll  PgUp/PgDn page  g/G ends  Tab focus  s sync  w watch  o outline  </> split  r reload  q quit";
