use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::app::{App, Message, Model};
use crate::ui::PaneAreas;

use super::event_loop::ResizeDebouncer;

/// Rows moved per mouse wheel notch.
const WHEEL_STEP: isize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if model.help_visible {
            return match key.code {
                KeyCode::Char('q') if !ctrl => Some(Message::Quit),
                KeyCode::Char('c') if ctrl => Some(Message::Quit),
                _ => Some(Message::ToggleHelp),
            };
        }
        if model.outline_visible {
            let outline_msg = match key.code {
                KeyCode::Char('o') | KeyCode::Esc => Some(Message::ToggleOutline),
                KeyCode::Char('j') | KeyCode::Down => Some(Message::OutlineDown),
                KeyCode::Char('k') | KeyCode::Up => Some(Message::OutlineUp),
                KeyCode::Char('g') | KeyCode::Home => Some(Message::OutlineFirst),
                KeyCode::Char('G') | KeyCode::End => Some(Message::OutlineLast),
                KeyCode::Enter => Some(Message::OutlineJump),
                _ => None,
            };
            if outline_msg.is_some() && !ctrl {
                return outline_msg;
            }
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Message::Quit),
            KeyCode::Char('c') if ctrl => Some(Message::Quit),
            KeyCode::Char('d') if ctrl => Some(Message::HalfPageDown),
            KeyCode::Char('u') if ctrl => Some(Message::HalfPageUp),
            KeyCode::Char('f') if ctrl => Some(Message::PageDown),
            KeyCode::Char('b') if ctrl => Some(Message::PageUp),
            KeyCode::Char('l') if ctrl => Some(Message::Redraw),

            KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollDown(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::ScrollUp(1)),
            KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Char('b') | KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::Char('d') => Some(Message::HalfPageDown),
            KeyCode::Char('u') => Some(Message::HalfPageUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
            KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),

            KeyCode::Tab | KeyCode::BackTab => Some(Message::FocusNext),
            KeyCode::Char('h') | KeyCode::Left => Some(Message::Focus(crate::sync::Side::Source)),
            KeyCode::Char('l') | KeyCode::Right => {
                Some(Message::Focus(crate::sync::Side::Preview))
            }
            KeyCode::Char('>') => Some(Message::GrowSource),
            KeyCode::Char('<') => Some(Message::ShrinkSource),

            KeyCode::Char('o') => Some(Message::ToggleOutline),
            KeyCode::Char('s') => Some(Message::ToggleSync),
            KeyCode::Char('w') => Some(Message::ToggleWatch),
            KeyCode::Char('r') => Some(Message::ForceReload),
            KeyCode::Char('?') => Some(Message::ToggleHelp),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        let (width, height) = model.terminal_size;
        let areas = PaneAreas::new(Rect::new(0, 0, width, height), model.split_percent);
        if model.outline_visible
            && mouse.kind == MouseEventKind::Down(MouseButton::Left)
            && let Some(idx) = crate::ui::outline_entry_at(
                model.document.outline(),
                model.outline_selected,
                areas.preview,
                mouse.column,
                mouse.row,
            )
        {
            return Some(Message::OutlineJumpTo(idx));
        }
        let side = areas.side_at(mouse.column, mouse.row)?;
        match mouse.kind {
            MouseEventKind::ScrollDown => Some(Message::Wheel(side, WHEEL_STEP)),
            MouseEventKind::ScrollUp => Some(Message::Wheel(side, -WHEEL_STEP)),
            MouseEventKind::Down(MouseButton::Left) if side != model.focus => {
                Some(Message::Focus(side))
            }
            _ => None,
        }
    }
}
