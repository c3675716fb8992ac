use crate::sync::Side;

use super::Model;

/// All events and actions the application reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Navigation (focused pane)
    /// Scroll up by n rows
    ScrollUp(usize),
    /// Scroll down by n rows
    ScrollDown(usize),
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    GoToTop,
    GoToBottom,
    /// Mouse wheel over a pane, negative is up
    Wheel(Side, isize),

    // Panes
    /// Move focus to the other pane
    FocusNext,
    /// Focus a specific pane
    Focus(Side),
    /// Widen the source pane
    GrowSource,
    /// Narrow the source pane
    ShrinkSource,

    // Sync and file
    /// Turn scroll sync on or off
    ToggleSync,
    /// Turn file watching on or off
    ToggleWatch,
    /// Watched file changed on disk
    FileChanged,
    /// Re-read the file now
    ForceReload,

    // Outline
    /// Show or hide the heading outline
    ToggleOutline,
    OutlineUp,
    OutlineDown,
    OutlineFirst,
    OutlineLast,
    /// Jump the preview to the selected heading
    OutlineJump,
    /// Jump the preview to a specific heading
    OutlineJumpTo(usize),

    // Window
    ToggleHelp,
    Resize(u16, u16),
    Redraw,

    // Application
    Quit,
}

/// Pure state transition.
///
/// Side effects (reloading files, attaching the sync controller) happen in
/// the event loop after `update` returns.
pub fn update(mut model: Model, msg: Message) -> Model {
    let follow_outline = model.outline_visible && !msg.is_outline();
    match msg {
        Message::ScrollUp(n) => model.focused_scroll().scroll_up(n),
        Message::ScrollDown(n) => model.focused_scroll().scroll_down(n),
        Message::PageUp => model.focused_scroll().page_up(),
        Message::PageDown => model.focused_scroll().page_down(),
        Message::HalfPageUp => model.focused_scroll().half_page_up(),
        Message::HalfPageDown => model.focused_scroll().half_page_down(),
        Message::GoToTop => model.focused_scroll().go_to_top(),
        Message::GoToBottom => model.focused_scroll().go_to_bottom(),
        Message::Wheel(side, delta) => {
            let scroll = model.scroll_for(side);
            if delta < 0 {
                scroll.scroll_up(delta.unsigned_abs());
            } else {
                scroll.scroll_down(delta.unsigned_abs());
            }
        }

        Message::FocusNext => model.focus = model.focus.other(),
        Message::Focus(side) => model.focus = side,
        Message::GrowSource => resize_split(&mut model, true),
        Message::ShrinkSource => resize_split(&mut model, false),

        Message::ToggleSync => model.sync_enabled = !model.sync_enabled,
        Message::ToggleWatch => model.watch_enabled = !model.watch_enabled,
        Message::ToggleOutline => {
            model.outline_visible = !model.outline_visible;
            if model.outline_visible {
                model.follow_active_heading();
            }
        }
        Message::OutlineUp => model.select_heading(model.outline_selected.saturating_sub(1)),
        Message::OutlineDown => model.select_heading(model.outline_selected.saturating_add(1)),
        Message::OutlineFirst => model.select_heading(0),
        Message::OutlineLast => model.select_heading(usize::MAX),
        Message::OutlineJump => model.jump_to_heading(model.outline_selected),
        Message::OutlineJumpTo(idx) => model.jump_to_heading(idx),

        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.reflow_layout();
        }
        // FileChanged/ForceReload: handled in event loop (side effect)
        // Redraw: no state change needed
        Message::FileChanged | Message::ForceReload | Message::Redraw => {}

        Message::Quit => model.should_quit = true,
    }
    if follow_outline {
        model.follow_active_heading();
    }
    model
}

impl Message {
    const fn is_outline(&self) -> bool {
        matches!(
            self,
            Self::ToggleOutline
                | Self::OutlineUp
                | Self::OutlineDown
                | Self::OutlineFirst
                | Self::OutlineLast
                | Self::OutlineJump
                | Self::OutlineJumpTo(_)
        )
    }
}

fn resize_split(model: &mut Model, grow: bool) {
    let step = crate::ui::SPLIT_STEP_PERCENT;
    let next = crate::ui::clamp_split(if grow {
        model.split_percent.saturating_add(step)
    } else {
        model.split_percent.saturating_sub(step)
    });
    if next != model.split_percent {
        model.split_percent = next;
        model.reflow_layout();
    }
}
