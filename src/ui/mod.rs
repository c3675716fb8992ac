//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`pane`]: The source and preview panes and their scroll surfaces
//! - [`style`]: Theming and colors
//! - Split view rendering, the heading outline overlay and the status bar

pub mod pane;
pub mod style;

mod outline;
mod render;
mod status;

pub use outline::{OUTLINE_WIDTH, outline_area, outline_entry_at, outline_window_start};
pub use render::{
    PaneAreas, PaneDimensions, line_number_width, pane_dimensions, render, split_panes,
};
pub use status::status_text;

pub const PREVIEW_LEFT_PADDING: u16 = 1;
pub const DEFAULT_SPLIT_PERCENT: u16 = 50;
pub const MIN_SPLIT_PERCENT: u16 = 30;
pub const MAX_SPLIT_PERCENT: u16 = 70;
pub const SPLIT_STEP_PERCENT: u16 = 5;

/// Keep the source pane's share of the width within its limits.
pub const fn clamp_split(percent: u16) -> u16 {
    if percent < MIN_SPLIT_PERCENT {
        MIN_SPLIT_PERCENT
    } else if percent > MAX_SPLIT_PERCENT {
        MAX_SPLIT_PERCENT
    } else {
        percent
    }
}

#[cfg(test)]
mod tests;
