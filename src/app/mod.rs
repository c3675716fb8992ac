//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop that also drives the scroll sync controller

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::sync::SyncConfig;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: PathBuf,
    watch_enabled: bool,
    sync_enabled: bool,
    split_percent: u16,
    sync_config: SyncConfig,
}

impl App {
    /// Create a new application for the given file.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            watch_enabled: false,
            sync_enabled: true,
            split_percent: crate::ui::DEFAULT_SPLIT_PERCENT,
            sync_config: SyncConfig::default(),
        }
    }

    /// Enable or disable file watching.
    pub fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Start with scroll sync on or off.
    pub fn with_sync(mut self, enabled: bool) -> Self {
        self.sync_enabled = enabled;
        self
    }

    /// Source pane width as a percentage of the terminal.
    pub fn with_split(mut self, percent: u16) -> Self {
        self.split_percent = crate::ui::clamp_split(percent);
        self
    }

    /// Timings for the scroll sync controller.
    pub const fn with_sync_config(mut self, config: SyncConfig) -> Self {
        self.sync_config = config;
        self
    }
}
