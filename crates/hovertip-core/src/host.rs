#![forbid(unsafe_code)]

//! Host collaborator traits.
//!
//! The tooltip state machine never touches a DOM directly. Everything it
//! needs from the embedding environment goes through these traits:
//!
//! - [`Geometry`]: bounding rectangles and viewport size, read on demand.
//! - [`Listeners`]: attach/detach event listeners by [`ListenerSpec`].
//! - [`NodeTree`]: subtree containment for outside-click detection.
//! - [`Renderer`]: mount, measure, flag and dispose tooltip views.
//! - [`DeviceInfo`]: touch capability probing.
//!
//! [`Host`] is implemented for anything providing all five. The headless
//! [`MemoryDocument`](crate::memory::MemoryDocument) is the reference
//! implementation; browser hosts wrap `web-sys`.

use std::fmt;

use crate::content::{ContentMetrics, ContentPayload};
use crate::device::TouchCapabilities;
use crate::element::ElementId;
use crate::event::ListenerSpec;
use crate::geometry::Rect;
use crate::position::OverlayPosition;

/// Synchronous geometry queries.
pub trait Geometry {
    /// Bounding rectangle of `element`, `None` if it no longer exists.
    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    /// Current viewport height, `None` if unavailable.
    fn viewport_height(&self) -> Option<f64>;
}

/// Event listener registry.
///
/// Both operations follow DOM semantics: adding an identical spec twice
/// registers it once, and removing a spec that is not registered does
/// nothing.
pub trait Listeners {
    fn add_listener(&mut self, spec: ListenerSpec);
    fn remove_listener(&mut self, spec: &ListenerSpec);
}

/// Node containment.
pub trait NodeTree {
    /// The host's event target node type.
    type Node;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: ElementId, node: &Self::Node) -> bool;
}

/// Identity of a mounted tooltip view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Everything the renderer needs to mount a tooltip panel.
#[derive(Debug, Clone, PartialEq)]
pub struct MountRequest {
    /// Trigger the panel is connected to.
    pub trigger: ElementId,
    /// Panel content.
    pub content: ContentPayload,
    /// Provisional scrollability; the renderer should allow internal
    /// scrolling when set.
    pub scrollable: bool,
    /// Extra class applied to the overlay pane.
    pub panel_class: Option<String>,
    /// Where to pin the panel.
    pub position: OverlayPosition,
}

/// Tooltip view rendering.
pub trait Renderer {
    /// Mount a panel. `None` if the host could not create it.
    fn mount(&mut self, request: MountRequest) -> Option<ViewId>;

    /// Measure a mounted view. `None` once the view is gone.
    fn measure(&self, view: ViewId) -> Option<ContentMetrics>;

    /// Toggle the "open" visual state (drives entry animation).
    fn set_open(&mut self, view: ViewId, open: bool);

    /// Remove a view. Disposing an unknown view does nothing.
    fn dispose(&mut self, view: ViewId);
}

/// Device capability probing.
pub trait DeviceInfo {
    fn touch_capabilities(&self) -> TouchCapabilities;
}

/// Everything a tooltip controller needs from its environment.
pub trait Host: Geometry + Listeners + NodeTree + Renderer + DeviceInfo {}

impl<T> Host for T where T: Geometry + Listeners + NodeTree + Renderer + DeviceInfo + ?Sized {}
