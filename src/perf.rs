//! Lightweight performance instrumentation.
//!
//! Timed scopes accumulate per-name totals while `--perf` is on, and a
//! debug event log (`--sync-debug-log`) records sync frames, reloads and
//! resizes with timestamps relative to when the log was opened.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::{Duration, Instant};

static ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOGGER: LazyLock<Mutex<DebugLogger>> =
    LazyLock::new(|| Mutex::new(DebugLogger::new()));
static TOTALS: LazyLock<Mutex<BTreeMap<&'static str, ScopeTotal>>> =
    LazyLock::new(|| Mutex::new(BTreeMap::new()));

/// Accumulated time spent in one named scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeTotal {
    pub calls: u64,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed = self.start.elapsed();
        tracing::trace!(
            scope = self.name,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "perf scope"
        );
        let mut totals = lock(&TOTALS);
        let total = totals.entry(self.name).or_default();
        total.calls += 1;
        total.elapsed += elapsed;
    }
}

#[derive(Debug)]
struct DebugLogger {
    start: Instant,
    writer: Option<BufWriter<File>>,
}

impl DebugLogger {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            writer: None,
        }
    }
}

// Instrumentation survives a poisoned lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Per-scope totals recorded so far, sorted by name.
pub fn totals() -> Vec<(&'static str, ScopeTotal)> {
    lock(&TOTALS).iter().map(|(k, v)| (*k, *v)).collect()
}

/// One line per scope, slowest first.
pub fn summary() -> String {
    let mut rows = totals();
    rows.sort_by(|a, b| b.1.elapsed.cmp(&a.1.elapsed));
    rows.iter()
        .map(|(name, total)| {
            format!(
                "[perf] {name}: {:.2} ms over {} calls",
                total.elapsed.as_secs_f64() * 1000.0,
                total.calls
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Open (or with `None`, close) the debug event log.
///
/// # Errors
///
/// Returns an error if the log file can not be created or written.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let mut logger = lock(&DEBUG_LOGGER);
    if let Some(path) = path {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "marksync sync debug log start")?;
        writer.flush()?;
        logger.start = Instant::now();
        logger.writer = Some(writer);
    } else {
        logger.writer = None;
    }
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    lock(&DEBUG_LOGGER).writer.is_some()
}

pub fn log_event(name: &str, detail: impl AsRef<str>) {
    let mut logger = lock(&DEBUG_LOGGER);
    let elapsed_ms = logger.start.elapsed().as_secs_f64() * 1000.0;
    if let Some(writer) = logger.writer.as_mut() {
        let _ = writeln!(
            writer,
            "[{elapsed_ms:>10.3} ms] {name}: {}",
            detail.as_ref()
        );
        let _ = writer.flush();
    }
}
