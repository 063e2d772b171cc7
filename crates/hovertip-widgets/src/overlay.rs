#![forbid(unsafe_code)]

//! Single-overlay manager.
//!
//! [`OverlayManager`] owns at most one live tooltip. Every overlay mutation
//! goes through [`show_tooltip`](OverlayManager::show_tooltip) and
//! [`hide_tooltip`](OverlayManager::hide_tooltip).
//!
//! # Show
//!
//! 1. Remember whether the request's trigger owns the current overlay.
//! 2. Tear down whatever is open.
//! 3. If the trigger was the owner, stop: a second show from the same
//!    trigger is a toggle-off.
//! 4. Otherwise read the trigger geometry, pick a placement, decide the
//!    provisional scrollability and mount a [`TooltipSurface`].
//!
//! # Revision
//!
//! Every change to the live overlay bumps [`revision`](OverlayManager::revision).
//! Deferred work captures the revision when it is queued and checks it when
//! it runs, so a show queued before an unrelated open/close is dropped.

use hovertip_core::content::ContentPayload;
use hovertip_core::element::ElementId;
use hovertip_core::event::HandlerId;
use hovertip_core::host::{Geometry, Listeners, MountRequest, Renderer, ViewId};
use hovertip_core::position::Placement;
use hovertip_core::logging::debug;

use crate::placement::PlacementResolver;
use crate::scroll::ScrollHeuristics;
use crate::surface::{AfterMount, TooltipSurface};
use crate::task::TaskQueue;

/// A request to show a tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowRequest {
    pub trigger: ElementId,
    pub content: ContentPayload,
    pub panel_class: Option<String>,
}

impl ShowRequest {
    #[must_use]
    pub fn new(trigger: ElementId, content: impl Into<ContentPayload>) -> Self {
        Self {
            trigger,
            content: content.into(),
            panel_class: None,
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.panel_class = Some(class.into());
        self
    }
}

/// A freshly opened overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opened {
    pub view: ViewId,
    pub placement: Placement,
    /// Provisional scrollability the view was mounted with.
    pub scrollable: bool,
    /// Trigger of the overlay that was torn down to make room, if any.
    pub replaced: Option<ElementId>,
}

/// What a show request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// A new overlay is live.
    Opened(Opened),
    /// The trigger already owned the overlay; it is now closed.
    ToggledOff,
    /// The trigger has no usable geometry; nothing is open.
    GeometryUnavailable,
    /// The renderer refused to mount; nothing is open.
    MountFailed,
}

impl ShowOutcome {
    /// Whether an overlay is live afterwards.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Opened(_))
    }
}

/// The single open tooltip.
#[derive(Debug)]
pub struct OverlayHandle {
    trigger: ElementId,
    placement: Placement,
    panel_class: Option<String>,
    surface: TooltipSurface,
}

impl OverlayHandle {
    #[must_use]
    pub const fn trigger(&self) -> ElementId {
        self.trigger
    }

    #[must_use]
    pub const fn placement(&self) -> Placement {
        self.placement
    }

    #[must_use]
    pub fn panel_class(&self) -> Option<&str> {
        self.panel_class.as_deref()
    }

    #[must_use]
    pub const fn surface(&self) -> &TooltipSurface {
        &self.surface
    }
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayStats {
    pub opened: u64,
    pub disposed: u64,
    pub toggled_off: u64,
}

/// Owner of the single live overlay.
#[derive(Debug)]
pub struct OverlayManager {
    current: Option<OverlayHandle>,
    revision: u64,
    leave_handler: HandlerId,
    placement: PlacementResolver,
    scroll: ScrollHeuristics,
    stats: OverlayStats,
}

impl OverlayManager {
    /// Create a manager whose surfaces register their trigger `mouseleave`
    /// listener under `leave_handler`.
    #[must_use]
    pub fn new(leave_handler: HandlerId, placement: PlacementResolver, scroll: ScrollHeuristics) -> Self {
        Self {
            current: None,
            revision: 0,
            leave_handler,
            placement,
            scroll,
            stats: OverlayStats::default(),
        }
    }

    /// Show a tooltip for `request.trigger`, replacing or toggling off the
    /// current one.
    pub fn show_tooltip<H>(&mut self, host: &mut H, tasks: &mut TaskQueue, request: ShowRequest) -> ShowOutcome
    where
        H: Geometry + Listeners + Renderer + ?Sized,
    {
        let previous = self.trigger_element();
        let same_trigger = previous == Some(request.trigger);
        self.teardown(host);

        if same_trigger {
            self.stats.toggled_off += 1;
            debug!(trigger = %request.trigger, "tooltip toggled off");
            return ShowOutcome::ToggledOff;
        }

        let geometry = host
            .bounding_rect(request.trigger)
            .filter(|rect| rect.is_finite())
            .zip(host.viewport_height().filter(|h| h.is_finite()));
        let Some((rect, viewport_height)) = geometry else {
            debug!(trigger = %request.trigger, "trigger geometry unavailable");
            return ShowOutcome::GeometryUnavailable;
        };

        let decision = self.placement.resolve(rect, viewport_height);
        let scrollable = self.scroll.provisional(&request.content);
        let mount = MountRequest {
            trigger: request.trigger,
            content: request.content,
            scrollable,
            panel_class: request.panel_class.clone(),
            position: decision.position,
        };
        let Some(surface) = TooltipSurface::mount(host, mount, self.leave_handler, tasks) else {
            debug!(trigger = %request.trigger, "renderer refused mount");
            return ShowOutcome::MountFailed;
        };

        let view = surface.view();
        self.current = Some(OverlayHandle {
            trigger: request.trigger,
            placement: decision.placement,
            panel_class: request.panel_class,
            surface,
        });
        self.revision += 1;
        self.stats.opened += 1;
        debug!(
            trigger = %request.trigger,
            %view,
            placement = decision.placement.as_str(),
            space_below = decision.space.below,
            space_above = decision.space.above,
            scrollable,
            "tooltip opened"
        );
        ShowOutcome::Opened(Opened {
            view,
            placement: decision.placement,
            scrollable,
            replaced: previous,
        })
    }

    /// Close the current tooltip. Returns `false` if nothing was open.
    pub fn hide_tooltip<H: Listeners + Renderer + ?Sized>(&mut self, host: &mut H) -> bool {
        self.teardown(host).is_some()
    }

    /// Trigger that owns the current overlay.
    #[must_use]
    pub fn trigger_element(&self) -> Option<ElementId> {
        self.current.as_ref().map(|h| h.trigger)
    }

    /// The current overlay.
    #[must_use]
    pub const fn current(&self) -> Option<&OverlayHandle> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Bumped on every open and close.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub const fn stats(&self) -> OverlayStats {
        self.stats
    }

    /// Handler id surfaces register their leave listener under.
    #[must_use]
    pub const fn leave_handler(&self) -> HandlerId {
        self.leave_handler
    }

    #[must_use]
    pub const fn scroll_heuristics(&self) -> &ScrollHeuristics {
        &self.scroll
    }

    /// Measured scrollability of the overlay owned by `trigger`, if it has
    /// been measured.
    #[must_use]
    pub fn measured_scrollable_for(&self, trigger: ElementId) -> Option<bool> {
        self.current
            .as_ref()
            .filter(|h| h.trigger == trigger)
            .and_then(|h| h.surface.measured_scrollable())
    }

    /// Run the post-mount step for `view`. `None` if `view` is no longer the
    /// live overlay.
    pub fn complete_mount<H: Listeners + Renderer + ?Sized>(
        &mut self,
        host: &mut H,
        view: ViewId,
    ) -> Option<AfterMount> {
        let handle = self.current.as_mut().filter(|h| h.surface.view() == view)?;
        let report = handle.surface.after_mount(host, &self.scroll);
        if matches!(report, AfterMount::Measured { .. }) {
            debug!(%view, ?report, "tooltip measured");
        }
        Some(report)
    }

    /// Whether the surface's leave listener is live. Leave events arriving
    /// under [`leave_handler`](Self::leave_handler) are stale otherwise.
    #[must_use]
    pub fn leave_listener_live(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|h| h.surface.leave_attached())
    }

    fn teardown<H: Listeners + Renderer + ?Sized>(&mut self, host: &mut H) -> Option<ElementId> {
        let handle = self.current.take()?;
        let trigger = handle.trigger;
        debug!(trigger = %trigger, view = %handle.surface.view(), "tooltip disposed");
        handle.surface.destroy(host);
        self.revision += 1;
        self.stats.disposed += 1;
        Some(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hovertip_core::content::{ContentMetrics, TemplateRef};
    use hovertip_core::event::{EventKind, ListenerTarget};
    use hovertip_core::geometry::Rect;
    use hovertip_core::memory::MemoryDocument;

    struct Fixture {
        doc: MemoryDocument,
        tasks: TaskQueue,
        manager: OverlayManager,
        a: ElementId,
        b: ElementId,
    }

    fn fixture() -> Fixture {
        let mut doc = MemoryDocument::new(1024.0, 800.0);
        let a = doc.create_element(None, Rect::new(100.0, 100.0, 80.0, 20.0));
        let b = doc.create_element(None, Rect::new(300.0, 100.0, 80.0, 20.0));
        Fixture {
            doc,
            tasks: TaskQueue::new(),
            manager: OverlayManager::new(
                HandlerId::new(1000),
                PlacementResolver::default(),
                ScrollHeuristics::default(),
            ),
            a,
            b,
        }
    }

    impl Fixture {
        fn show(&mut self, trigger: ElementId, content: impl Into<ContentPayload>) -> ShowOutcome {
            self.manager
                .show_tooltip(&mut self.doc, &mut self.tasks, ShowRequest::new(trigger, content))
        }

        fn tick(&mut self) {
            let batch = self.tasks.take_tick();
            for task in batch {
                if let crate::task::DeferredTask::SurfaceMounted { view } = task {
                    self.manager.complete_mount(&mut self.doc, view);
                }
            }
        }
    }

    #[test]
    fn second_same_trigger_show_closes() {
        let mut f = fixture();
        assert!(f.show(f.a, "hi").is_open());
        assert_eq!(f.show(f.a, "hi"), ShowOutcome::ToggledOff);
        assert!(!f.manager.is_open());
        assert_eq!(f.doc.live_view_count(), 0);
        assert_eq!(f.manager.trigger_element(), None);
    }

    #[test]
    fn different_trigger_disposes_old_once_before_new() {
        let mut f = fixture();
        f.show(f.a, "one");
        let outcome = f.show(f.b, "two");
        let ShowOutcome::Opened(opened) = outcome else {
            panic!("expected open, got {outcome:?}");
        };
        assert_eq!(opened.replaced, Some(f.a));
        assert_eq!(f.doc.dispose_count(), 1);
        assert_eq!(f.doc.live_view_count(), 1);
        assert_eq!(f.manager.trigger_element(), Some(f.b));
    }

    #[test]
    fn hide_with_nothing_open_is_noop() {
        let mut f = fixture();
        let revision = f.manager.revision();
        assert!(!f.manager.hide_tooltip(&mut f.doc));
        assert_eq!(f.manager.revision(), revision);
        assert_eq!(f.doc.dispose_count(), 0);
    }

    #[test]
    fn hide_is_idempotent() {
        let mut f = fixture();
        f.show(f.a, "hi");
        assert!(f.manager.hide_tooltip(&mut f.doc));
        assert!(!f.manager.hide_tooltip(&mut f.doc));
        assert_eq!(f.doc.dispose_count(), 1);
    }

    #[test]
    fn long_text_and_rich_content_mount_scrollable() {
        let mut f = fixture();
        let ShowOutcome::Opened(o) = f.show(f.a, "x".repeat(101)) else {
            panic!("expected open");
        };
        assert!(o.scrollable);
        let ShowOutcome::Opened(o) = f.show(f.b, TemplateRef::new(1)) else {
            panic!("expected open");
        };
        assert!(o.scrollable);
        let ShowOutcome::Opened(o) = f.show(f.a, "x".repeat(100)) else {
            panic!("expected open");
        };
        assert!(!o.scrollable);
    }

    #[test]
    fn panel_class_reaches_renderer() {
        let mut f = fixture();
        let request = ShowRequest::new(f.a, "hi").with_class("warning");
        let ShowOutcome::Opened(o) = f.manager.show_tooltip(&mut f.doc, &mut f.tasks, request) else {
            panic!("expected open");
        };
        let view = f.doc.view(o.view).expect("mounted");
        assert_eq!(view.request.panel_class.as_deref(), Some("warning"));
        assert_eq!(
            f.manager.current().and_then(OverlayHandle::panel_class),
            Some("warning")
        );
    }

    #[test]
    fn missing_geometry_leaves_nothing_open() {
        let mut f = fixture();
        f.show(f.a, "hi");
        f.doc.remove_element(f.b);
        assert_eq!(f.show(f.b, "gone"), ShowOutcome::GeometryUnavailable);
        assert!(!f.manager.is_open());
        assert_eq!(f.doc.live_view_count(), 0);
    }

    #[test]
    fn non_finite_geometry_is_unavailable() {
        let mut f = fixture();
        f.doc.set_rect(f.a, Rect::new(f64::NAN, 0.0, 10.0, 10.0));
        assert_eq!(f.show(f.a, "hi"), ShowOutcome::GeometryUnavailable);
    }

    #[test]
    fn placement_flips_above_near_bottom() {
        let mut f = fixture();
        f.doc.set_rect(f.a, Rect::new(100.0, 760.0, 80.0, 20.0));
        let ShowOutcome::Opened(o) = f.show(f.a, "hi") else {
            panic!("expected open");
        };
        assert_eq!(o.placement, Placement::AboveCentered);
    }

    #[test]
    fn mount_step_attaches_leave_for_short_content() {
        let mut f = fixture();
        f.show(f.a, "short");
        f.tick();
        assert_eq!(f.manager.measured_scrollable_for(f.a), Some(false));
        assert!(f.manager.leave_listener_live());
        assert_eq!(
            f.doc.listener_count(ListenerTarget::Element(f.a), EventKind::MouseLeave),
            1
        );
    }

    #[test]
    fn mount_step_for_disposed_view_is_dropped() {
        let mut f = fixture();
        let ShowOutcome::Opened(first) = f.show(f.a, "one") else {
            panic!("expected open");
        };
        f.show(f.b, "two");
        assert_eq!(f.manager.complete_mount(&mut f.doc, first.view), None);
        f.tick();
        assert_eq!(f.manager.measured_scrollable_for(f.b), Some(false));
        assert_eq!(f.doc.listener_stats().add_calls, 1);
    }

    #[test]
    fn tall_render_stays_scrollable() {
        let mut f = fixture();
        let ShowOutcome::Opened(o) = f.show(f.a, "short") else {
            panic!("expected open");
        };
        f.doc.set_view_metrics(o.view, ContentMetrics::new(201.0, 5));
        f.tick();
        assert_eq!(f.manager.measured_scrollable_for(f.a), Some(true));
        assert!(!f.manager.leave_listener_live());
    }

    #[test]
    fn revision_moves_on_open_and_close() {
        let mut f = fixture();
        let r0 = f.manager.revision();
        f.show(f.a, "hi");
        let r1 = f.manager.revision();
        f.manager.hide_tooltip(&mut f.doc);
        let r2 = f.manager.revision();
        assert!(r0 < r1 && r1 < r2);
    }
}
