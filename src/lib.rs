// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. sync::SyncConfig)
    clippy::module_name_repetitions
)]

//! # Marksync
//!
//! A split-pane terminal markdown view with line-synchronized scrolling.
//!
//! The raw markdown sits on the left and the rendered preview on the right.
//! Scrolling either pane brings the same source line to the middle of the
//! other one:
//! - The parser tags every block with the source line it starts on
//! - Layout carries those tags onto the rendered rows
//! - A line index maps lines to preview offsets and back
//! - A rate-limited controller moves the opposite pane without echo loops
//!
//! ## Architecture
//!
//! Marksync uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! The scroll sync controller sits beside the model in the event loop and is
//! driven with an explicit millisecond clock.
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`document`]: Markdown parsing, line tagging, layout and the heading outline
//! - [`sync`]: Line index and scroll sync controller
//! - [`ui`]: Terminal UI components and scrollable panes
//! - [`config`]: Saved default flags
//! - [`watcher`]: File watching
//! - [`perf`]: Timing scopes and the debug event log

pub mod app;
pub mod config;
pub mod document;
mod line;
pub mod perf;
pub mod sync;
pub mod ui;
pub mod watcher;

pub use line::SourceLine;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::SourceLine;
    pub use crate::app::{App, Message, Model};
    pub use crate::document::Document;
    pub use crate::sync::{LineIndex, ScrollSyncController, Side, SyncConfig};
    pub use crate::ui::pane::{PreviewPane, SourcePane};
}
