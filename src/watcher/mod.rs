//! File watching for live reload.
//!
//! Uses notify crate for cross-platform file system events. The watcher is
//! polled from the event loop with the loop's own millisecond clock, so the
//! debounce runs on the same time base as the scroll sync timers.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Decides whether a notify event concerns the watched file.
///
/// Many backends report changes against the parent directory, or against a
/// canonical path that differs from the one the user typed, so a directory
/// event or a bare file name match both count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
}

impl PathMatcher {
    pub fn new(path: &Path) -> Self {
        let target_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);
        Self {
            watch_root,
            target_path,
            target_name,
        }
    }

    pub fn watch_root(&self) -> &Path {
        &self.watch_root
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn matches(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

/// Watches a single file and reports debounced changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    matcher: PathMatcher,
    debounce: ChangeDebounce,
}

impl FileWatcher {
    /// Watch `path`, reporting a change once `debounce_ms` pass without
    /// further events.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the path cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce_ms: u64) -> notify::Result<Self> {
        let matcher = PathMatcher::new(path.as_ref());
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(matcher.watch_root(), RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %matcher.target_path().display(), "watching file");

        Ok(Self {
            _watcher: watcher,
            rx,
            matcher,
            debounce: ChangeDebounce::new(debounce_ms),
        })
    }

    /// The canonical path of the file being watched.
    pub fn target_path(&self) -> &Path {
        self.matcher.target_path()
    }

    /// Drain pending events; true once a debounced change is ready.
    pub fn take_change_ready(&mut self, now_ms: u64) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.matcher.matches(&ev) => relevant += 1,
                Ok(_) => ignored += 1,
                Err(err) => tracing::warn!(%err, "file watch error"),
            }
        }
        if relevant + ignored > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!(
                    "relevant={relevant} ignored={ignored} target={}",
                    self.matcher.target_path().display()
                ),
            );
        }
        if relevant > 0 {
            self.debounce.touch(now_ms);
        }
        self.debounce.take_ready(now_ms)
    }

    pub const fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }
}

/// Trailing-edge debounce: ready once `delay_ms` pass after the last touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChangeDebounce {
    delay_ms: u64,
    last_touch: Option<u64>,
}

impl ChangeDebounce {
    const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            last_touch: None,
        }
    }

    const fn touch(&mut self, now_ms: u64) {
        self.last_touch = Some(now_ms);
    }

    fn take_ready(&mut self, now_ms: u64) -> bool {
        match self.last_touch {
            Some(at) if now_ms.saturating_sub(at) >= self.delay_ms => {
                self.last_touch = None;
                true
            }
            _ => false,
        }
    }

    const fn is_pending(&self) -> bool {
        self.last_touch.is_some()
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
