use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::document::Document;
use crate::sync::Side;
use crate::ui::pane::{PreviewPane, SourcePane};

/// Rows below the preview top a heading may start and still count as the
/// section being read.
const OUTLINE_ACTIVE_MARGIN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state. The scroll sync
/// controller is the one exception: it lives in the event loop and holds
/// subscriptions to the two panes.
#[derive(Debug)]
pub struct Model {
    /// File shown in the source pane
    pub file_path: PathBuf,
    /// Parsed document backing the preview
    pub document: Document,
    /// Raw markdown pane
    pub source: SourcePane,
    /// Rendered preview pane
    pub preview: PreviewPane,
    /// Pane that receives keyboard scrolling
    pub focus: Side,
    /// Source pane's share of the width
    pub split_percent: u16,
    pub sync_enabled: bool,
    pub watch_enabled: bool,
    pub help_visible: bool,
    /// Heading outline overlay on the preview
    pub outline_visible: bool,
    /// Highlighted outline entry
    pub outline_selected: usize,
    pub should_quit: bool,
    /// Terminal size (width, height)
    pub terminal_size: (u16, u16),
    toast: Option<Toast>,
}

impl Model {
    /// Build a model for `text` read from `file_path`.
    pub fn new(file_path: PathBuf, text: &str, terminal_size: (u16, u16)) -> Self {
        Self::with_split(
            file_path,
            text,
            terminal_size,
            crate::ui::DEFAULT_SPLIT_PERCENT,
        )
    }

    /// Like [`new`](Self::new) with an explicit split.
    pub fn with_split(
        file_path: PathBuf,
        text: &str,
        terminal_size: (u16, u16),
        split_percent: u16,
    ) -> Self {
        let split_percent = crate::ui::clamp_split(split_percent);
        let dims = crate::ui::pane_dimensions(terminal_size.0, terminal_size.1, split_percent);
        let document = Document::parse(text, dims.preview_width);
        let preview = PreviewPane::new(document.render_tree().clone(), dims.height);
        Self {
            file_path,
            source: SourcePane::new(text, dims.height),
            preview,
            document,
            focus: Side::Source,
            split_percent,
            sync_enabled: true,
            watch_enabled: false,
            help_visible: false,
            outline_visible: false,
            outline_selected: 0,
            should_quit: false,
            terminal_size,
            toast: None,
        }
    }

    /// The pane that has keyboard focus.
    pub const fn focused_scroll(&mut self) -> &mut crate::ui::pane::PaneScroll {
        match self.focus {
            Side::Source => self.source.scroll_mut(),
            Side::Preview => self.preview.scroll_mut(),
        }
    }

    pub const fn scroll_for(&mut self, side: Side) -> &mut crate::ui::pane::PaneScroll {
        match side {
            Side::Source => self.source.scroll_mut(),
            Side::Preview => self.preview.scroll_mut(),
        }
    }

    /// Recompute pane sizes and lay the preview out again at its width.
    pub(super) fn reflow_layout(&mut self) {
        let _scope = crate::perf::scope("model.reflow_layout");
        let (width, height) = self.terminal_size;
        let dims = crate::ui::pane_dimensions(width, height, self.split_percent);
        if dims.preview_width != self.document.width() {
            self.document.relayout(dims.preview_width);
            self.preview.set_tree(self.document.render_tree().clone());
        }
        self.source.scroll_mut().resize(dims.height);
        self.preview.scroll_mut().resize(dims.height);
        crate::perf::log_event(
            "layout.reflow",
            format!(
                "terminal={width}x{height} split={} preview_w={} rows={}",
                self.split_percent, dims.preview_width, dims.height
            ),
        );
    }

    /// Re-read the file and replace both panes' content. Scroll positions are
    /// kept where they still fit.
    pub(super) fn reload_from_disk(&mut self) -> Result<()> {
        let raw = std::fs::read(&self.file_path)
            .with_context(|| format!("reading {}", self.file_path.display()))?;
        let text = String::from_utf8_lossy(&raw);
        self.document = Document::parse(&text, self.document.width());
        self.source.set_text(&text);
        self.preview.set_tree(self.document.render_tree().clone());
        if self.outline_visible {
            self.follow_active_heading();
        } else {
            self.select_heading(self.outline_selected);
        }
        tracing::debug!(
            path = %self.file_path.display(),
            lines = self.source.line_count(),
            "document reloaded"
        );
        Ok(())
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Outline entry for the section at the top of the preview.
    pub fn active_heading(&self) -> Option<usize> {
        let row = self.preview.scroll().offset() + OUTLINE_ACTIVE_MARGIN;
        crate::document::heading_at_row(self.document.outline(), row)
    }

    /// Move the outline selection to the heading the preview is showing.
    pub(super) fn follow_active_heading(&mut self) {
        self.outline_selected = self.active_heading().unwrap_or(0);
    }

    pub(super) fn select_heading(&mut self, idx: usize) {
        let last = self.document.outline().len().saturating_sub(1);
        self.outline_selected = idx.min(last);
    }

    /// Scroll the preview to outline entry `idx` and focus it. The source
    /// pane follows through the sync controller.
    pub(super) fn jump_to_heading(&mut self, idx: usize) {
        let Some(row) = self.document.outline().get(idx).map(|entry| entry.row) else {
            return;
        };
        self.outline_selected = idx;
        self.focus = Side::Preview;
        self.preview.scroll_mut().set_offset(row);
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self {
            file_path: PathBuf::new(),
            document: Document::empty(),
            source: SourcePane::default(),
            preview: PreviewPane::default(),
            focus: Side::Source,
            split_percent: crate::ui::DEFAULT_SPLIT_PERCENT,
            sync_enabled: true,
            watch_enabled: false,
            help_visible: false,
            outline_visible: false,
            outline_selected: 0,
            should_quit: false,
            terminal_size: (80, 24),
            toast: None,
        }
    }
}
