#![forbid(unsafe_code)]

//! The mounted tooltip panel.
//!
//! A [`TooltipSurface`] wraps one renderer view. It is created by the
//! [`OverlayManager`](crate::overlay::OverlayManager) and runs in two steps:
//!
//! 1. **mount** (synchronous): the view is created with the provisional
//!    scrollability and a [`DeferredTask::SurfaceMounted`] is queued.
//! 2. **after mount** (next tick): the rendered content is measured. Content
//!    that does not need scrolling gets a `mouseleave` listener on the trigger
//!    that closes the tooltip; scrollable content stays open until dismissed
//!    some other way. The view's open state is switched on either way.
//!
//! Destroying the surface detaches its listener if one was attached, cancels
//! the pending after-mount task and disposes the view.

use hovertip_core::content::ContentMetrics;
use hovertip_core::element::ElementId;
use hovertip_core::event::{EventKind, HandlerId, ListenerSpec};
use hovertip_core::host::{Listeners, MountRequest, Renderer, ViewId};
use hovertip_runtime::CancellationSource;

use crate::listener::ListenerSlot;
use crate::scroll::ScrollHeuristics;
use crate::task::{DeferredTask, TaskQueue};

/// Result of the post-mount step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AfterMount {
    /// The view was measured and opened.
    Measured {
        metrics: ContentMetrics,
        scrollable: bool,
        leave_attached: bool,
    },
    /// The step already ran for this surface.
    AlreadyMeasured,
    /// The renderer no longer knows the view.
    ViewGone,
}

/// A mounted tooltip panel.
#[derive(Debug)]
pub struct TooltipSurface {
    view: ViewId,
    trigger: ElementId,
    provisional_scrollable: bool,
    measured_scrollable: Option<bool>,
    open: bool,
    leave: ListenerSlot,
    mount_task: CancellationSource,
}

impl TooltipSurface {
    /// Mount a view for `request` and queue its post-mount step.
    ///
    /// `leave_handler` is the handler id the surface's trigger `mouseleave`
    /// listener is registered under. Returns `None` if the renderer refused.
    pub fn mount<H: Renderer + ?Sized>(
        host: &mut H,
        request: MountRequest,
        leave_handler: HandlerId,
        tasks: &mut TaskQueue,
    ) -> Option<Self> {
        let trigger = request.trigger;
        let provisional_scrollable = request.scrollable;
        let view = host.mount(request)?;
        let mount_task = CancellationSource::new();
        tasks.defer(DeferredTask::SurfaceMounted { view }, mount_task.token());
        Some(Self {
            view,
            trigger,
            provisional_scrollable,
            measured_scrollable: None,
            open: false,
            leave: ListenerSlot::new(ListenerSpec::on_element(
                trigger,
                EventKind::MouseLeave,
                leave_handler,
            )),
            mount_task,
        })
    }

    /// Measure the rendered content, wire up leave-to-close when it does not
    /// scroll, and apply the open state.
    pub fn after_mount<H: Renderer + Listeners + ?Sized>(
        &mut self,
        host: &mut H,
        heuristics: &ScrollHeuristics,
    ) -> AfterMount {
        if self.measured_scrollable.is_some() {
            return AfterMount::AlreadyMeasured;
        }
        let Some(metrics) = host.measure(self.view) else {
            return AfterMount::ViewGone;
        };
        let scrollable = heuristics.measured(metrics);
        self.measured_scrollable = Some(scrollable);
        let leave_attached = !scrollable && self.leave.attach(host);
        host.set_open(self.view, true);
        self.open = true;
        AfterMount::Measured {
            metrics,
            scrollable,
            leave_attached,
        }
    }

    /// Tear down. Safe whatever state the surface reached.
    pub fn destroy<H: Renderer + Listeners + ?Sized>(mut self, host: &mut H) {
        self.leave.detach(host);
        self.mount_task.cancel();
        host.dispose(self.view);
    }

    #[must_use]
    pub const fn view(&self) -> ViewId {
        self.view
    }

    /// The trigger this surface is connected to.
    #[must_use]
    pub const fn trigger(&self) -> ElementId {
        self.trigger
    }

    #[must_use]
    pub const fn provisional_scrollable(&self) -> bool {
        self.provisional_scrollable
    }

    /// Post-render decision, once measured.
    #[must_use]
    pub const fn measured_scrollable(&self) -> Option<bool> {
        self.measured_scrollable
    }

    /// Measured scrollability, falling back to the provisional one.
    #[must_use]
    pub fn is_scrollable(&self) -> bool {
        self.measured_scrollable
            .unwrap_or(self.provisional_scrollable)
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the leave-to-close listener is registered.
    #[must_use]
    pub const fn leave_attached(&self) -> bool {
        self.leave.is_attached()
    }

    #[must_use]
    pub const fn leave_handler(&self) -> HandlerId {
        self.leave.spec().handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hovertip_core::content::ContentPayload;
    use hovertip_core::event::ListenerTarget;
    use hovertip_core::geometry::Rect;
    use hovertip_core::memory::MemoryDocument;
    use hovertip_core::position::{OverlayPosition, Placement};

    const LEAVE: HandlerId = HandlerId::new(99);

    fn setup(text: &str) -> (MemoryDocument, TaskQueue, TooltipSurface) {
        let mut doc = MemoryDocument::new(1024.0, 768.0);
        let trigger = doc.create_element(None, Rect::new(10.0, 10.0, 50.0, 20.0));
        let mut tasks = TaskQueue::new();
        let request = MountRequest {
            trigger,
            content: ContentPayload::text(text),
            scrollable: false,
            panel_class: None,
            position: OverlayPosition::resolve(Placement::BelowCentered, Rect::default()),
        };
        let surface = TooltipSurface::mount(&mut doc, request, LEAVE, &mut tasks).expect("mount");
        (doc, tasks, surface)
    }

    #[test]
    fn mount_queues_after_mount_step() {
        let (doc, tasks, surface) = setup("hi");
        assert_eq!(tasks.len(), 1);
        assert!(!surface.is_open());
        assert_eq!(doc.view(surface.view()).map(|v| v.open), Some(false));
    }

    #[test]
    fn short_content_attaches_leave_listener() {
        let (mut doc, _tasks, mut surface) = setup("hi");
        let report = surface.after_mount(&mut doc, &ScrollHeuristics::default());
        assert!(matches!(
            report,
            AfterMount::Measured {
                scrollable: false,
                leave_attached: true,
                ..
            }
        ));
        assert!(surface.is_open());
        assert_eq!(
            doc.listener_count(ListenerTarget::Element(surface.trigger()), EventKind::MouseLeave),
            1
        );
    }

    #[test]
    fn tall_content_stays_without_leave_listener() {
        let (mut doc, _tasks, mut surface) = setup("hi");
        doc.set_view_metrics(surface.view(), ContentMetrics::new(201.0, 2));
        let report = surface.after_mount(&mut doc, &ScrollHeuristics::default());
        assert!(matches!(report, AfterMount::Measured { scrollable: true, .. }));
        assert!(!surface.leave_attached());
        assert!(surface.is_scrollable());
        assert!(doc.live_listeners().is_empty());
    }

    #[test]
    fn after_mount_runs_once() {
        let (mut doc, _tasks, mut surface) = setup("hi");
        surface.after_mount(&mut doc, &ScrollHeuristics::default());
        assert_eq!(
            surface.after_mount(&mut doc, &ScrollHeuristics::default()),
            AfterMount::AlreadyMeasured
        );
        assert_eq!(doc.listener_stats().add_calls, 1);
    }

    #[test]
    fn destroy_before_measure_cancels_task_and_removes_nothing() {
        let (mut doc, mut tasks, surface) = setup("hi");
        let view = surface.view();
        surface.destroy(&mut doc);
        assert_eq!(doc.listener_stats().remove_calls, 0);
        assert_eq!(doc.measure(view), None);
        assert_eq!(tasks.take_tick().count(), 0);
    }

    #[test]
    fn destroy_after_measure_detaches_once() {
        let (mut doc, _tasks, mut surface) = setup("hi");
        surface.after_mount(&mut doc, &ScrollHeuristics::default());
        surface.destroy(&mut doc);
        let stats = doc.listener_stats();
        assert_eq!(stats.remove_calls, 1);
        assert_eq!(stats.missed_removes, 0);
        assert!(doc.live_listeners().is_empty());
    }

    #[test]
    fn vanished_view_is_reported() {
        let (mut doc, _tasks, mut surface) = setup("hi");
        doc.dispose(surface.view());
        assert_eq!(
            surface.after_mount(&mut doc, &ScrollHeuristics::default()),
            AfterMount::ViewGone
        );
        assert!(!surface.is_open());
    }
}
