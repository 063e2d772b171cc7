#![forbid(unsafe_code)]

//! Next-tick work items.

use hovertip_core::host::ViewId;

use crate::trigger::BindingId;

/// Work deferred to the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Show the tooltip for a tapped trigger.
    ///
    /// `revision` is the overlay revision right after the tap's synchronous
    /// hide; the show is dropped if the overlay changed since.
    TouchShow { binding: BindingId, revision: u64 },
    /// Measure a freshly mounted view and apply its open state.
    SurfaceMounted { view: ViewId },
}

/// Queue type used throughout the widgets crate.
pub type TaskQueue = hovertip_runtime::DeferredQueue<DeferredTask>;
