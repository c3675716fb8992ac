//! Theming and color definitions.
//!
//! Uses ANSI colors that adapt to the terminal's palette, with indexed
//! fallbacks when the terminal reports a light background.

use ratatui::style::{Color, Modifier, Style};

use crate::document::RowStyle;

/// Get the style for a rendered preview row.
pub fn style_for_row(style: RowStyle) -> Style {
    style_for_row_on(style, is_light_background())
}

fn style_for_row_on(style: RowStyle, light_bg: bool) -> Style {
    let pick = |light: u8, dark: Color| {
        if light_bg {
            Color::Indexed(light)
        } else {
            dark
        }
    };
    match style {
        RowStyle::Heading(1) => Style::default()
            .fg(pick(24, Color::Cyan))
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        RowStyle::Heading(2) => Style::default()
            .fg(pick(22, Color::Green))
            .add_modifier(Modifier::BOLD),
        RowStyle::Heading(3) => Style::default()
            .fg(pick(58, Color::Yellow))
            .add_modifier(Modifier::BOLD),
        RowStyle::Heading(4) => Style::default()
            .fg(pick(24, Color::Blue))
            .add_modifier(Modifier::BOLD),
        RowStyle::Heading(5) => Style::default()
            .fg(pick(54, Color::Magenta))
            .add_modifier(Modifier::BOLD),
        RowStyle::Heading(_) => Style::default()
            .fg(pick(24, Color::Cyan))
            .add_modifier(Modifier::BOLD),

        RowStyle::Code => Style::default().fg(pick(238, Color::Indexed(245))),

        RowStyle::Quote => Style::default()
            .fg(pick(24, Color::Blue))
            .add_modifier(Modifier::ITALIC),

        RowStyle::Rule => Style::default()
            .fg(pick(241, Color::Indexed(240)))
            .add_modifier(Modifier::DIM),

        RowStyle::Html => Style::default()
            .fg(pick(90, Color::Magenta))
            .add_modifier(Modifier::DIM),

        RowStyle::Table => Style::default().fg(pick(238, Color::Indexed(250))),

        RowStyle::ListItem | RowStyle::Paragraph | RowStyle::Empty => Style::default(),
    }
}

/// Style for source pane line numbers.
pub fn line_number_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Border style for a pane, highlighted when it has focus.
pub fn pane_border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn is_light_background() -> bool {
    light_background_from_env(std::env::var("COLORFGBG").ok().as_deref())
}

/// Interpret `COLORFGBG` (`"fg;bg"` or `"fg;default;bg"`). Background
/// colors 7 and 9-15 are the light ANSI slots.
fn light_background_from_env(colorfgbg: Option<&str>) -> bool {
    colorfgbg
        .and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg == 7 || (9..=15).contains(&bg))
}
