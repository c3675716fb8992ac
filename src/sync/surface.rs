//! Scrollable surfaces and scroll-event subscriptions.
//!
//! The controller never talks to a UI toolkit directly. A surface reports its
//! geometry, accepts scroll offset writes, and lets listeners subscribe to
//! its scroll events. Events travel over `mpsc` channels; a surface sends one
//! [`Side`] per offset change, programmatic or not.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::mpsc::Sender;

use thiserror::Error;

/// Which surface of the coupled pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Raw markdown text
    Source,
    /// Rendered preview
    Preview,
}

impl Side {
    pub const fn other(self) -> Self {
        match self {
            Self::Source => Self::Preview,
            Self::Preview => Self::Source,
        }
    }
}

/// Failure reading or writing a surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("surface is detached")]
    Detached,
    #[error("surface geometry unavailable: {0}")]
    Geometry(String),
}

/// Scroll geometry in surface units (pixels, terminal rows).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollGeometry {
    /// Distance scrolled from the content origin
    pub scroll_top: f64,
    /// Full content height
    pub scroll_height: f64,
    /// Visible height
    pub client_height: f64,
}

impl ScrollGeometry {
    /// Largest scroll offset the surface can take.
    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    /// Content offset at the middle of the visible area.
    pub fn center(&self) -> f64 {
        self.scroll_top + self.client_height / 2.0
    }
}

/// A rendered node as reported by a surface: its raw source line tag and its
/// top offset from the content origin, measured now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotatedNode {
    pub line: usize,
    pub top: f64,
}

/// A scrollable surface.
pub trait ScrollSurface {
    /// Current geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface can no longer be measured.
    fn geometry(&self) -> Result<ScrollGeometry, SurfaceError>;

    /// Scroll to `top`. Surfaces clamp to their own range.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface can no longer be scrolled.
    fn set_scroll_top(&mut self, top: f64) -> Result<(), SurfaceError>;

    /// Deliver `side` on `sink` whenever this surface scrolls.
    fn subscribe(&self, side: Side, sink: Sender<Side>) -> Subscription;
}

/// The raw text surface.
pub trait TextSurface: ScrollSurface {
    /// Measured height of one text line, if known.
    fn line_height(&self) -> Option<f64>;

    /// Number of lines in the text.
    fn total_lines(&self) -> usize;
}

/// The rendered preview surface.
pub trait RenderedSurface: ScrollSurface {
    /// Every live node carrying a source line tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the rendered nodes can not be measured.
    fn annotated_nodes(&self) -> Result<Vec<AnnotatedNode>, SurfaceError>;
}

#[derive(Debug)]
struct Listener {
    id: u64,
    side: Side,
    sink: Sender<Side>,
}

#[derive(Debug, Default)]
struct ListenerSet {
    next_id: u64,
    listeners: Vec<Listener>,
}

/// Listener registry a surface embeds to implement [`ScrollSurface::subscribe`].
#[derive(Debug, Default)]
pub struct ScrollListeners {
    inner: Rc<RefCell<ListenerSet>>,
}

impl ScrollListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, side: Side, sink: Sender<Side>) -> Subscription {
        let mut set = self.inner.borrow_mut();
        let id = set.next_id;
        set.next_id += 1;
        set.listeners.push(Listener { id, side, sink });
        Subscription {
            id,
            set: Rc::downgrade(&self.inner),
        }
    }

    /// Tell every listener the surface scrolled. Listeners whose receiver is
    /// gone are dropped.
    pub fn notify(&self) {
        self.inner
            .borrow_mut()
            .listeners
            .retain(|listener| listener.sink.send(listener.side).is_ok());
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle for one subscription. Dropping it unsubscribes.
#[derive(Debug)]
#[must_use = "dropping a subscription unsubscribes it"]
pub struct Subscription {
    id: u64,
    set: Weak<RefCell<ListenerSet>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// True while the surface that issued it is alive and still lists it.
    pub fn is_active(&self) -> bool {
        self.set.upgrade().is_some_and(|set| {
            set.borrow()
                .listeners
                .iter()
                .any(|listener| listener.id == self.id)
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(set) = self.set.upgrade() {
            set.borrow_mut()
                .listeners
                .retain(|listener| listener.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_notify_reaches_subscribers_with_their_side() {
        let listeners = ScrollListeners::new();
        let (tx, rx) = mpsc::channel();
        let _sub = listeners.subscribe(Side::Preview, tx);

        listeners.notify();
        assert_eq!(rx.try_recv(), Ok(Side::Preview));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let listeners = ScrollListeners::new();
        let (tx, rx) = mpsc::channel();
        let sub = listeners.subscribe(Side::Source, tx);
        assert_eq!(listeners.len(), 1);
        assert!(sub.is_active());

        sub.unsubscribe();
        assert!(listeners.is_empty());
        listeners.notify();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_receivers_are_pruned() {
        let listeners = ScrollListeners::new();
        let (tx, rx) = mpsc::channel();
        let _sub = listeners.subscribe(Side::Source, tx);
        drop(rx);

        listeners.notify();
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_subscription_outliving_surface_is_inert() {
        let listeners = ScrollListeners::new();
        let (tx, _rx) = mpsc::channel();
        let sub = listeners.subscribe(Side::Source, tx);
        drop(listeners);
        assert!(!sub.is_active());
        drop(sub);
    }

    #[test]
    fn test_geometry_helpers() {
        let geometry = ScrollGeometry {
            scroll_top: 100.0,
            scroll_height: 1000.0,
            client_height: 200.0,
        };
        assert!((geometry.max_scroll() - 800.0).abs() < f64::EPSILON);
        assert!((geometry.center() - 200.0).abs() < f64::EPSILON);

        let short = ScrollGeometry {
            scroll_top: 0.0,
            scroll_height: 50.0,
            client_height: 200.0,
        };
        assert!(short.max_scroll().abs() < f64::EPSILON);
    }

    #[test]
    fn test_side_other() {
        assert_eq!(Side::Source.other(), Side::Preview);
        assert_eq!(Side::Preview.other(), Side::Source);
    }
}
