//! Bidirectional scroll sync between a text surface and a rendered surface.
//!
//! The controller is driven entirely by the host loop. Scroll events arrive
//! over a channel, accepted events schedule one frame, the frame performs a
//! single read-then-write, and a settle deadline ends the in-flight phase.
//! Every entry point takes the current time in milliseconds.

use std::sync::mpsc::{self, Receiver};

use crate::SourceLine;

use super::index::LineIndex;
use super::surface::{
    RenderedSurface, ScrollGeometry, ScrollSurface, Side, Subscription, SurfaceError, TextSurface,
};
use super::timer::Deadline;

/// Timing and measurement knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncConfig {
    /// Minimum gap between two accepted syncs in any direction
    pub min_sync_interval_ms: u64,
    /// Window after a sync during which events from the other side are ignored
    pub cross_direction_suppression_ms: u64,
    /// Delay after a sync write before the controller goes idle
    pub settle_delay_ms: u64,
    /// Line height used when the text surface can not measure one
    pub fallback_line_height: f64,
}

impl SyncConfig {
    pub const DEFAULT_MIN_SYNC_INTERVAL_MS: u64 = 50;
    pub const DEFAULT_SUPPRESSION_MS: u64 = 150;
    pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;
    pub const DEFAULT_FALLBACK_LINE_HEIGHT: f64 = 24.0;
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_sync_interval_ms: Self::DEFAULT_MIN_SYNC_INTERVAL_MS,
            cross_direction_suppression_ms: Self::DEFAULT_SUPPRESSION_MS,
            settle_delay_ms: Self::DEFAULT_SETTLE_DELAY_MS,
            fallback_line_height: Self::DEFAULT_FALLBACK_LINE_HEIGHT,
        }
    }
}

/// Whether a sync is between accept and settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Syncing(Side),
}

/// The most recent accepted sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastSync {
    pub source: Side,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncState {
    pub phase: Phase,
    pub last: Option<LastSync>,
}

impl SyncState {
    pub const fn in_flight(&self) -> bool {
        matches!(self.phase, Phase::Syncing(_))
    }
}

/// Why a scroll event did not start a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotAttached,
    InFlight,
    RateLimited,
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Ignored(IgnoreReason),
}

impl Decision {
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// What a frame wrote to the target surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// Matched through the line index at `line`
    Matched { line: SourceLine, target: f64 },
    /// No tagged nodes; scrolled by fraction instead
    Proportional { target: f64 },
}

impl SyncOutcome {
    pub const fn target(&self) -> f64 {
        match self {
            Self::Matched { target, .. } | Self::Proportional { target } => *target,
        }
    }
}

/// Couples a text surface and a rendered surface so each follows the other.
#[derive(Debug)]
pub struct ScrollSyncController {
    config: SyncConfig,
    state: SyncState,
    frame: Option<Side>,
    settle: Deadline,
    events: Option<Receiver<Side>>,
    subscriptions: Vec<Subscription>,
}

impl Default for ScrollSyncController {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl ScrollSyncController {
    pub const fn new(config: SyncConfig) -> Self {
        Self {
            config,
            state: SyncState {
                phase: Phase::Idle,
                last: None,
            },
            frame: None,
            settle: Deadline::new("sync.settle"),
            events: None,
            subscriptions: Vec::new(),
        }
    }

    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub const fn state(&self) -> &SyncState {
        &self.state
    }

    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    pub const fn is_attached(&self) -> bool {
        self.events.is_some()
    }

    /// True while a frame is scheduled and not yet run.
    pub const fn frame_pending(&self) -> bool {
        self.frame.is_some()
    }

    /// True while the settle deadline is armed.
    pub const fn settle_pending(&self) -> bool {
        self.settle.is_pending()
    }

    /// Subscribe to both surfaces' scroll events. Re-attaching detaches first.
    pub fn attach<T, R>(&mut self, source: &T, preview: &R)
    where
        T: TextSurface + ?Sized,
        R: RenderedSurface + ?Sized,
    {
        self.detach();
        let (tx, rx) = mpsc::channel();
        self.subscriptions.push(source.subscribe(Side::Source, tx.clone()));
        self.subscriptions.push(preview.subscribe(Side::Preview, tx));
        self.events = Some(rx);
        tracing::debug!("scroll sync attached");
    }

    /// Unsubscribe from both surfaces and cancel any pending frame or deadline.
    /// Safe to call when not attached.
    pub fn detach(&mut self) {
        let was_attached = self.is_attached();
        self.subscriptions.clear();
        self.events = None;
        self.frame = None;
        self.settle.cancel();
        self.state = SyncState::default();
        if was_attached {
            tracing::debug!("scroll sync detached");
        }
    }

    /// Decide whether a scroll on `side` starts a sync.
    ///
    /// Accepting moves the controller to [`Phase::Syncing`], records the sync
    /// and schedules one frame. Ignored events change nothing.
    pub fn handle_scroll(&mut self, side: Side, now_ms: u64) -> Decision {
        let decision = self.decide(side, now_ms);
        match decision {
            Decision::Accepted => {
                self.state.phase = Phase::Syncing(side);
                self.state.last = Some(LastSync {
                    source: side,
                    at_ms: now_ms,
                });
                self.frame = Some(side);
                tracing::trace!(?side, now_ms, "scroll sync accepted");
            }
            Decision::Ignored(reason) => {
                tracing::trace!(?side, now_ms, ?reason, "scroll event ignored");
            }
        }
        decision
    }

    fn decide(&self, side: Side, now_ms: u64) -> Decision {
        if !self.is_attached() {
            return Decision::Ignored(IgnoreReason::NotAttached);
        }
        if self.state.in_flight() {
            return Decision::Ignored(IgnoreReason::InFlight);
        }
        if let Some(last) = self.state.last {
            let elapsed = now_ms.saturating_sub(last.at_ms);
            if elapsed < self.config.min_sync_interval_ms {
                return Decision::Ignored(IgnoreReason::RateLimited);
            }
            if last.source == side.other() && elapsed < self.config.cross_direction_suppression_ms
            {
                return Decision::Ignored(IgnoreReason::Suppressed);
            }
        }
        Decision::Accepted
    }

    /// Feed every queued scroll event through [`handle_scroll`](Self::handle_scroll).
    /// Returns the number accepted.
    pub fn dispatch_events(&mut self, now_ms: u64) -> usize {
        let Some(events) = self.events.as_ref() else {
            return 0;
        };
        let queued: Vec<Side> = events.try_iter().collect();
        queued
            .into_iter()
            .filter(|&side| self.handle_scroll(side, now_ms).is_accepted())
            .count()
    }

    /// Run the scheduled frame, if any: read the triggering surface, write the
    /// other, then arm the settle deadline.
    ///
    /// Surface failures are logged and swallowed. The settle deadline is armed
    /// either way so the controller always returns to idle.
    pub fn run_frame<T, R>(
        &mut self,
        now_ms: u64,
        source: &mut T,
        preview: &mut R,
    ) -> Option<SyncOutcome>
    where
        T: TextSurface + ?Sized,
        R: RenderedSurface + ?Sized,
    {
        let side = self.frame.take()?;
        let _scope = crate::perf::scope("sync.frame");
        let result = match side {
            Side::Source => self.sync_source_to_preview(source, preview),
            Side::Preview => self.sync_preview_to_source(preview, source),
        };
        self.settle.arm(now_ms, self.config.settle_delay_ms);
        match result {
            Ok(outcome) => {
                tracing::debug!(?side, ?outcome, "scroll synced");
                crate::perf::log_event("sync.frame", format!("from={side:?} outcome={outcome:?}"));
                Some(outcome)
            }
            Err(err) => {
                tracing::warn!(?side, %err, "scroll sync failed");
                None
            }
        }
    }

    /// Fire the settle deadline if it is due.
    pub fn fire_timers(&mut self, now_ms: u64) {
        if self.settle.take_ready(now_ms) {
            self.state.phase = Phase::Idle;
            tracing::trace!(now_ms, deadline = self.settle.name(), "scroll sync settled");
        }
    }

    /// One host loop tick: timers, then queued events, then the frame.
    pub fn pump<T, R>(&mut self, now_ms: u64, source: &mut T, preview: &mut R) -> Option<SyncOutcome>
    where
        T: TextSurface + ?Sized,
        R: RenderedSurface + ?Sized,
    {
        self.fire_timers(now_ms);
        self.dispatch_events(now_ms);
        self.run_frame(now_ms, source, preview)
    }

    fn sync_source_to_preview<T, R>(
        &self,
        source: &T,
        preview: &mut R,
    ) -> Result<SyncOutcome, SurfaceError>
    where
        T: TextSurface + ?Sized,
        R: RenderedSurface + ?Sized,
    {
        let from = source.geometry()?;
        let index = LineIndex::build(preview)?;
        let to = preview.geometry()?;

        let line_height = self.line_height(source.line_height());
        let line = center_line(&from, line_height, source.total_lines());
        let Some(entry) = index.floor_by_line(line) else {
            let target = proportional_target(&from, &to);
            preview.set_scroll_top(target)?;
            return Ok(SyncOutcome::Proportional { target });
        };

        let target = (entry.offset - to.client_height / 2.0).max(0.0);
        preview.set_scroll_top(target)?;
        Ok(SyncOutcome::Matched {
            line: entry.line,
            target,
        })
    }

    fn sync_preview_to_source<R, T>(
        &self,
        preview: &R,
        source: &mut T,
    ) -> Result<SyncOutcome, SurfaceError>
    where
        R: RenderedSurface + ?Sized,
        T: TextSurface + ?Sized,
    {
        let from = preview.geometry()?;
        let index = LineIndex::build(preview)?;
        let to = source.geometry()?;

        let Some(entry) = index.floor_by_offset(from.center()) else {
            let target = proportional_target(&from, &to);
            source.set_scroll_top(target)?;
            return Ok(SyncOutcome::Proportional { target });
        };

        let line_height = self.line_height(source.line_height());
        #[allow(clippy::cast_precision_loss)]
        let line_top = (entry.line.get() - 1) as f64 * line_height;
        let target = (line_top - to.client_height / 2.0 + line_height / 2.0).max(0.0);
        source.set_scroll_top(target)?;
        Ok(SyncOutcome::Matched {
            line: entry.line,
            target,
        })
    }

    /// Measured line height, or the configured fallback when the measurement
    /// is missing or unusable.
    fn line_height(&self, measured: Option<f64>) -> f64 {
        measured
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or_else(|| {
                let fallback = self.config.fallback_line_height;
                if fallback.is_finite() && fallback > 0.0 {
                    fallback
                } else {
                    SyncConfig::DEFAULT_FALLBACK_LINE_HEIGHT
                }
            })
    }
}

/// The 1-based text line at the vertical center of `geometry`, clamped to
/// `[1, max(1, total_lines)]`.
pub fn center_line(geometry: &ScrollGeometry, line_height: f64, total_lines: usize) -> SourceLine {
    let line = (geometry.center() / line_height).floor() + 1.0;
    let max = total_lines.max(1);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let line = if line.is_finite() && line >= 1.0 {
        (line as usize).min(max)
    } else {
        1
    };
    SourceLine::new(line).unwrap_or(SourceLine::FIRST)
}

/// Target offset placing `to` at the same scrolled fraction as `from`.
pub fn proportional_target(from: &ScrollGeometry, to: &ScrollGeometry) -> f64 {
    let range = (from.scroll_height - from.client_height).max(1.0);
    let fraction = (from.scroll_top / range).clamp(0.0, 1.0);
    fraction * to.max_scroll()
}
