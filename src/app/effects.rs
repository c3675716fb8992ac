use std::path::Path;

use crate::app::{App, Message, Model, ToastLevel};
use crate::sync::ScrollSyncController;
use crate::watcher::FileWatcher;

/// Quiet period before a burst of file events counts as one change.
const WATCH_DEBOUNCE_MS: u64 = 200;

impl App {
    pub(super) fn make_file_watcher(path: &Path) -> notify::Result<FileWatcher> {
        FileWatcher::new(path, WATCH_DEBOUNCE_MS)
    }

    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        file_watcher: &mut Option<FileWatcher>,
        controller: &mut ScrollSyncController,
        msg: &Message,
    ) {
        match msg {
            Message::ToggleSync => {
                if model.sync_enabled {
                    controller.attach(&model.source, &model.preview);
                    model.show_toast(ToastLevel::Info, "Scroll sync on");
                } else {
                    controller.detach();
                    model.show_toast(ToastLevel::Info, "Scroll sync off");
                }
                crate::perf::log_event("sync.toggle", format!("enabled={}", model.sync_enabled));
            }
            Message::ToggleWatch => {
                if model.watch_enabled {
                    match Self::make_file_watcher(&model.file_path) {
                        Ok(watcher) => {
                            *file_watcher = Some(watcher);
                            model.show_toast(ToastLevel::Info, "Watching file changes");
                        }
                        Err(err) => {
                            model.watch_enabled = false;
                            *file_watcher = None;
                            model.show_toast(
                                ToastLevel::Warning,
                                format!("Watch unavailable: {err}"),
                            );
                            crate::perf::log_event(
                                "watcher.error",
                                format!("failed path={} err={err}", model.file_path.display()),
                            );
                        }
                    }
                } else {
                    *file_watcher = None;
                    model.show_toast(ToastLevel::Info, "Watch disabled");
                }
            }
            Message::ForceReload | Message::FileChanged => {
                let _scope = crate::perf::scope("app.reload");
                if let Err(err) = model.reload_from_disk() {
                    tracing::warn!(path = %model.file_path.display(), "reload failed: {err:#}");
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err:#}"));
                    crate::perf::log_event(
                        "reload.error",
                        format!("failed path={} err={err:#}", model.file_path.display()),
                    );
                } else {
                    crate::perf::log_event(
                        "reload.ok",
                        format!(
                            "path={} lines={} rows={}",
                            model.file_path.display(),
                            model.source.line_count(),
                            model.preview.scroll().total_rows()
                        ),
                    );
                    if matches!(msg, Message::ForceReload) {
                        model.show_toast(ToastLevel::Info, "Reloaded");
                    }
                }
            }
            _ => {}
        }
    }
}
