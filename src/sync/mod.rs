//! Line-synchronized scrolling between a markdown source and its preview.
//!
//! - [`surface`]: the surface traits the controller drives and their event
//!   subscriptions
//! - [`LineIndex`]: rendered nodes ordered by source line, with floor lookups
//! - [`ScrollSyncController`]: accepts or ignores scroll events and maps the
//!   center of one surface onto the other

mod controller;
mod index;
pub mod surface;
mod timer;

pub use controller::{
    Decision, IgnoreReason, LastSync, Phase, ScrollSyncController, SyncConfig, SyncOutcome,
    SyncState, center_line, proportional_target,
};
pub use index::{LineIndex, LineIndexEntry};
pub use surface::{
    AnnotatedNode, RenderedSurface, ScrollGeometry, ScrollListeners, ScrollSurface, Side,
    Subscription, SurfaceError, TextSurface,
};
pub use timer::Deadline;
