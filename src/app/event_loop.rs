use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, ToastLevel, update};
use crate::sync::ScrollSyncController;
use crate::watcher::FileWatcher;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Per-iteration state owned by the loop, outside the model.
struct LoopState {
    start: Instant,
    resize_debouncer: ResizeDebouncer,
    file_watcher: Option<FileWatcher>,
    controller: ScrollSyncController,
    frame_idx: u64,
    needs_render: bool,
}

impl LoopState {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Apply `msg` and its side effects.
    fn dispatch(&mut self, model: &mut Model, msg: Message) {
        crate::perf::log_event(
            "event.message",
            format!("frame={} msg={msg:?}", self.frame_idx),
        );
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        App::handle_message_side_effects(
            model,
            &mut self.file_watcher,
            &mut self.controller,
            &side_msg,
        );
        self.needs_render = true;
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can not be read, the terminal can not be
    /// initialized, or terminal I/O fails during the loop.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let raw = std::fs::read(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;
        let text = String::from_utf8_lossy(&raw);

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal: marksync requires an interactive terminal")?;
        let size = terminal.size()?;
        drop(init_scope);

        let parse_scope = crate::perf::scope("app.initial_parse");
        let mut model = Model::with_split(
            self.file_path.clone(),
            &text,
            (size.width, size.height),
            self.split_percent,
        );
        drop(parse_scope);
        model.watch_enabled = self.watch_enabled;
        model.sync_enabled = self.sync_enabled;
        crate::perf::log_event(
            "init.layout",
            format!(
                "terminal={}x{} split={} lines={} rows={}",
                size.width,
                size.height,
                model.split_percent,
                model.source.line_count(),
                model.preview.scroll().total_rows()
            ),
        );

        let controller = ScrollSyncController::new(self.sync_config);
        let result = Self::event_loop(&mut terminal, &mut model, controller);

        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        controller: ScrollSyncController,
    ) -> Result<()> {
        let mut state = LoopState {
            start: Instant::now(),
            resize_debouncer: ResizeDebouncer::new(100),
            file_watcher: None,
            controller,
            frame_idx: 0,
            needs_render: true,
        };
        if model.watch_enabled {
            match Self::make_file_watcher(&model.file_path) {
                Ok(watcher) => state.file_watcher = Some(watcher),
                Err(err) => {
                    model.watch_enabled = false;
                    model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                    crate::perf::log_event(
                        "watcher.error",
                        format!("failed path={} err={err}", model.file_path.display()),
                    );
                }
            }
        }
        if model.sync_enabled {
            state.controller.attach(&model.source, &model.preview);
        }
        execute!(stdout(), EnableMouseCapture)?;

        loop {
            if model.expire_toast(Instant::now()) {
                state.needs_render = true;
            }

            let now_ms = state.now_ms();

            if let Some((width, height)) = state.resize_debouncer.take_ready(now_ms) {
                crate::perf::log_event(
                    "event.resize.apply",
                    format!("frame={} width={width} height={height}", state.frame_idx),
                );
                state.dispatch(model, Message::Resize(width, height));
            }

            if model.watch_enabled
                && state
                    .file_watcher
                    .as_mut()
                    .is_some_and(|w| w.take_change_ready(now_ms))
            {
                state.dispatch(model, Message::FileChanged);
            }

            // Scroll events from the previous iteration's messages are queued
            // on the controller's channel; the frame writes the other pane.
            let preview_top = model.preview.scroll().offset();
            if state
                .controller
                .pump(now_ms, &mut model.source, &mut model.preview)
                .is_some()
            {
                state.needs_render = true;
                if model.outline_visible && model.preview.scroll().offset() != preview_top {
                    model.follow_active_heading();
                }
            }

            let poll_ms = if state.needs_render || state.controller.frame_pending() {
                0
            } else if state.resize_debouncer.is_pending()
                || state.controller.settle_pending()
                || state.file_watcher.as_ref().is_some_and(FileWatcher::is_pending)
            {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so debouncers use accurate times.
                let event_ms = state.now_ms();
                let msg = Self::handle_event(
                    &event::read()?,
                    model,
                    event_ms,
                    &mut state.resize_debouncer,
                );
                if let Some(msg) = msg {
                    state.dispatch(model, msg);
                }

                // Coalesce key repeat bursts into a single render.
                let mut drained = 0_u32;
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = state.now_ms();
                    let msg = Self::handle_event(
                        &event::read()?,
                        model,
                        drain_ms,
                        &mut state.resize_debouncer,
                    );
                    if let Some(msg) = msg {
                        drained += 1;
                        state.dispatch(model, msg);
                    }
                }
                if drained > 0 {
                    crate::perf::log_event(
                        "event.drain",
                        format!("frame={} drained={drained}", state.frame_idx),
                    );
                }
            }

            if state.needs_render {
                state.frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3} source_top={} preview_top={}",
                        state.frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0,
                        model.source.scroll().offset(),
                        model.preview.scroll().offset()
                    ),
                );
                state.needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        state.controller.detach();
        let _ = execute!(stdout(), DisableMouseCapture);
        Ok(())
    }
}
