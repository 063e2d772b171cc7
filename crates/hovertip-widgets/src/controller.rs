#![forbid(unsafe_code)]

//! Tooltip controller: the object an application holds.
//!
//! [`TooltipController`] owns the [`OverlayManager`], every
//! [`TriggerBinding`], the next-tick [`TaskQueue`] and the
//! [`TooltipPolicy`]. Hosts deliver events to it by [`HandlerId`]; the
//! controller routes each one to the binding or surface that registered the
//! listener and reports what happened as a [`Dispatch`].
//!
//! # Deferred work
//!
//! Taps and mounts queue [`DeferredTask`]s. The host calls
//! [`run_deferred`](TooltipController::run_deferred) once per tick. A queued
//! tap show is dropped when:
//!
//! - a newer tap anywhere replaced it,
//! - its binding was unbound,
//! - the overlay opened or closed in between.
//!
//! # Example
//!
//! ```
//! use hovertip_core::event::{EventKind, HostEvent};
//! use hovertip_core::geometry::Rect;
//! use hovertip_core::memory::MemoryDocument;
//! use hovertip_runtime::TooltipPolicy;
//! use hovertip_widgets::controller::TooltipController;
//! use hovertip_widgets::trigger::BindingConfig;
//!
//! let mut doc = MemoryDocument::new(1024.0, 768.0);
//! let button = doc.create_element(None, Rect::new(100.0, 100.0, 80.0, 24.0));
//!
//! let mut tooltips = TooltipController::new(TooltipPolicy::default());
//! let id = tooltips.bind(&mut doc, button, BindingConfig::new("Save changes"));
//!
//! let enter = tooltips.binding(id).map(|b| b.handlers().enter).unwrap();
//! tooltips.dispatch(&mut doc, enter, &HostEvent::new(EventKind::MouseEnter));
//! assert_eq!(tooltips.trigger_element(), Some(button));
//! ```

use std::fmt;

use ahash::AHashMap;
use hovertip_core::content::ContentPayload;
use hovertip_core::element::ElementId;
use hovertip_core::event::{EventKind, HandlerId, HostEvent, ListenerPhase};
use hovertip_core::host::Host;
use hovertip_core::logging::debug;
use hovertip_runtime::{CancellationSource, TaskId, TooltipPolicy};

use crate::overlay::{OverlayManager, ShowOutcome, ShowRequest};
use crate::placement::PlacementResolver;
use crate::scroll::ScrollHeuristics;
use crate::surface::AfterMount;
use crate::task::{DeferredTask, TaskQueue};
use crate::trigger::{
    BindingConfig, BindingCx, BindingHandlers, BindingId, BindingRole, SkipReason, TriggerBinding,
    TriggerOutcome,
};

/// Why an event or task did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No listener was registered under this handler id.
    UnknownHandler,
    /// The event kind does not match the listener it was delivered to.
    KindMismatch,
    /// The listener was already detached.
    StaleListener,
    /// The binding no longer exists.
    UnknownBinding,
    /// The overlay changed since the task was queued.
    StaleRevision,
    /// The view is no longer the live overlay.
    ViewReplaced,
    /// The binding handler declined.
    Skipped(SkipReason),
}

impl IgnoreReason {
    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownHandler => "unknown_handler",
            Self::KindMismatch => "kind_mismatch",
            Self::StaleListener => "stale_listener",
            Self::UnknownBinding => "unknown_binding",
            Self::StaleRevision => "stale_revision",
            Self::ViewReplaced => "view_replaced",
            Self::Skipped(SkipReason::NoContent) => "no_content",
            Self::Skipped(SkipReason::TouchDevice) => "touch_device",
            Self::Skipped(SkipReason::InsideTrigger) => "inside_trigger",
            Self::Skipped(SkipReason::NotListening) => "not_listening",
        }
    }
}

/// What one dispatch or task did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Shown(ShowOutcome),
    Hidden { closed: bool },
    KeptOpen,
    Scheduled(TaskId),
    Measured(AfterMount),
    Ignored(IgnoreReason),
}

impl Outcome {
    /// Stable snake_case label, used in session records.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Shown(ShowOutcome::Opened(_)) => "opened",
            Self::Shown(ShowOutcome::ToggledOff) => "toggled_off",
            Self::Shown(ShowOutcome::GeometryUnavailable) => "geometry_unavailable",
            Self::Shown(ShowOutcome::MountFailed) => "mount_failed",
            Self::Hidden { closed: true } => "hidden",
            Self::Hidden { closed: false } => "nothing_to_hide",
            Self::KeptOpen => "kept_open",
            Self::Scheduled(_) => "scheduled",
            Self::Measured(AfterMount::Measured { scrollable: true, .. }) => "measured_scrollable",
            Self::Measured(AfterMount::Measured { .. }) => "measured",
            Self::Measured(AfterMount::AlreadyMeasured) => "already_measured",
            Self::Measured(AfterMount::ViewGone) => "view_gone",
            Self::Ignored(reason) => reason.as_str(),
        }
    }
}

impl From<TriggerOutcome> for Outcome {
    fn from(outcome: TriggerOutcome) -> Self {
        match outcome {
            TriggerOutcome::Shown(show) => Self::Shown(show),
            TriggerOutcome::Hidden { closed } => Self::Hidden { closed },
            TriggerOutcome::KeptOpen => Self::KeptOpen,
            TriggerOutcome::Skipped(reason) => Self::Ignored(IgnoreReason::Skipped(reason)),
        }
    }
}

/// Result of delivering one host event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dispatch {
    pub handler: HandlerId,
    pub outcome: Outcome,
    /// The host should call `preventDefault()` on the event.
    pub default_prevented: bool,
}

impl Dispatch {
    fn new(handler: HandlerId, outcome: Outcome) -> Self {
        Self {
            handler,
            outcome,
            default_prevented: false,
        }
    }

    fn ignored(handler: HandlerId, reason: IgnoreReason) -> Self {
        Self::new(handler, Outcome::Ignored(reason))
    }
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    /// Tasks that ran, with their outcomes, in order.
    pub outcomes: Vec<(DeferredTask, Outcome)>,
    /// Cancelled tasks that were skipped.
    pub skipped: usize,
}

impl TickReport {
    #[must_use]
    pub fn ran(&self) -> usize {
        self.outcomes.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Binding { binding: BindingId, role: BindingRole },
    SurfaceLeave,
}

impl Route {
    const fn expected_kind(self) -> EventKind {
        match self {
            Self::Binding { role, .. } => match role {
                BindingRole::Enter => EventKind::MouseEnter,
                BindingRole::Leave => EventKind::MouseLeave,
                BindingRole::Touch => EventKind::TouchStart,
                BindingRole::DocumentClick => EventKind::Click,
            },
            Self::SurfaceLeave => EventKind::MouseLeave,
        }
    }
}

#[derive(Debug)]
struct PendingTouch {
    binding: BindingId,
    source: CancellationSource,
}

/// Owner of every tooltip binding and the single overlay.
pub struct TooltipController {
    overlay: OverlayManager,
    bindings: AHashMap<BindingId, TriggerBinding>,
    routes: AHashMap<HandlerId, Route>,
    tasks: TaskQueue,
    policy: TooltipPolicy,
    pending_touch: Option<PendingTouch>,
    next_binding: u64,
    next_handler: u64,
}

impl fmt::Debug for TooltipController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TooltipController")
            .field("bindings", &self.bindings.len())
            .field("routes", &self.routes.len())
            .field("trigger", &self.overlay.trigger_element())
            .field("pending_tasks", &self.tasks.len())
            .finish()
    }
}

impl Default for TooltipController {
    fn default() -> Self {
        Self::new(TooltipPolicy::default())
    }
}

impl TooltipController {
    /// Create a controller.
    #[must_use]
    pub fn new(policy: TooltipPolicy) -> Self {
        let surface_leave = HandlerId::new(1);
        let overlay = OverlayManager::new(
            surface_leave,
            PlacementResolver::from_policy(&policy.placement),
            ScrollHeuristics::from_policy(&policy.scroll),
        );
        let mut routes = AHashMap::new();
        routes.insert(surface_leave, Route::SurfaceLeave);
        Self {
            overlay,
            bindings: AHashMap::new(),
            routes,
            tasks: TaskQueue::new(),
            policy,
            pending_touch: None,
            next_binding: 1,
            next_handler: 2,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &TooltipPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn overlay(&self) -> &OverlayManager {
        &self.overlay
    }

    fn mint_handler(&mut self) -> HandlerId {
        let id = HandlerId::new(self.next_handler);
        self.next_handler += 1;
        id
    }

    // --- Bindings ------------------------------------------------------

    /// Bind a tooltip to `element` and register its element listeners.
    pub fn bind<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        element: ElementId,
        config: BindingConfig,
    ) -> BindingId {
        let id = BindingId::new(self.next_binding);
        self.next_binding += 1;
        let handlers = BindingHandlers {
            enter: self.mint_handler(),
            leave: self.mint_handler(),
            touch: self.mint_handler(),
            document_click: self.mint_handler(),
        };
        let click_phase = if self.policy.dismiss.outside_click_capture {
            ListenerPhase::Capture
        } else {
            ListenerPhase::Bubble
        };
        let mut binding = TriggerBinding::new(id, element, config, handlers, click_phase);
        binding.attach(host);
        for (handler, role) in handlers.roles() {
            self.routes.insert(handler, Route::Binding { binding: id, role });
        }
        self.bindings.insert(id, binding);
        debug!(binding = %id, %element, "tooltip bound");
        id
    }

    /// Remove a binding: drop its queued tap, close the overlay if its
    /// element owns it, and detach every listener it registered.
    pub fn unbind<H: Host + ?Sized>(&mut self, host: &mut H, id: BindingId) -> bool {
        let Some(mut binding) = self.bindings.remove(&id) else {
            return false;
        };
        if let Some(pending) = self.pending_touch.take_if(|p| p.binding == id) {
            pending.source.cancel();
        }
        if self.overlay.trigger_element() == Some(binding.element()) {
            self.overlay.hide_tooltip(host);
        }
        binding.detach_all(host);
        for (handler, _) in binding.handlers().roles() {
            self.routes.remove(&handler);
        }
        debug!(binding = %id, element = %binding.element(), "tooltip unbound");
        true
    }

    /// Replace a binding's content. `None` disables it.
    pub fn set_content(&mut self, id: BindingId, content: Option<ContentPayload>) -> bool {
        match self.bindings.get_mut(&id) {
            Some(binding) => {
                binding.set_content(content);
                true
            }
            None => false,
        }
    }

    /// Replace a binding's panel class.
    pub fn set_class(&mut self, id: BindingId, class: Option<String>) -> bool {
        match self.bindings.get_mut(&id) {
            Some(binding) => {
                binding.set_class(class);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn binding(&self, id: BindingId) -> Option<&TriggerBinding> {
        self.bindings.get(&id)
    }

    /// Live binding ids, ascending.
    #[must_use]
    pub fn binding_ids(&self) -> Vec<BindingId> {
        let mut ids: Vec<_> = self.bindings.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    // --- Overlay surface -----------------------------------------------

    /// Show a tooltip directly, bypassing bindings.
    pub fn show_tooltip<H: Host + ?Sized>(&mut self, host: &mut H, request: ShowRequest) -> ShowOutcome {
        self.overlay.show_tooltip(host, &mut self.tasks, request)
    }

    /// Close the current tooltip. Returns `false` if nothing was open.
    pub fn hide_tooltip<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        self.overlay.hide_tooltip(host)
    }

    /// Trigger that owns the current overlay.
    #[must_use]
    pub fn trigger_element(&self) -> Option<ElementId> {
        self.overlay.trigger_element()
    }

    /// The panel's own close action.
    pub fn close_tooltip<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        self.overlay.hide_tooltip(host)
    }

    // --- Events --------------------------------------------------------

    /// Deliver a host event to the listener registered as `handler`.
    pub fn dispatch<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        handler: HandlerId,
        event: &HostEvent<H::Node>,
    ) -> Dispatch {
        let Some(route) = self.routes.get(&handler).copied() else {
            return Dispatch::ignored(handler, IgnoreReason::UnknownHandler);
        };
        if route.expected_kind() != event.kind {
            return Dispatch::ignored(handler, IgnoreReason::KindMismatch);
        }

        let dispatch = match route {
            Route::SurfaceLeave => {
                if !self.overlay.leave_listener_live() {
                    return Dispatch::ignored(handler, IgnoreReason::StaleListener);
                }
                let closed = self.overlay.hide_tooltip(host);
                Dispatch::new(handler, Outcome::Hidden { closed })
            }
            Route::Binding { binding: id, role } => {
                let Some(binding) = self.bindings.get_mut(&id) else {
                    return Dispatch::ignored(handler, IgnoreReason::UnknownBinding);
                };
                let cx = BindingCx {
                    host,
                    overlay: &mut self.overlay,
                    tasks: &mut self.tasks,
                };
                match role {
                    BindingRole::Enter => Dispatch::new(handler, binding.on_pointer_enter(cx).into()),
                    BindingRole::Leave => Dispatch::new(handler, binding.on_pointer_leave(cx).into()),
                    BindingRole::DocumentClick => Dispatch::new(
                        handler,
                        binding.on_document_click(cx, event.target.as_ref()).into(),
                    ),
                    BindingRole::Touch => match binding.on_touch_start(cx) {
                        Err(reason) => Dispatch::ignored(handler, IgnoreReason::Skipped(reason)),
                        Ok(revision) => {
                            let task = self.schedule_touch_show(id, revision);
                            Dispatch {
                                handler,
                                outcome: Outcome::Scheduled(task),
                                default_prevented: self.policy.touch.prevent_default,
                            }
                        }
                    },
                }
            }
        };

        debug!(
            %handler,
            kind = event.kind.dom_name(),
            outcome = ?dispatch.outcome,
            default_prevented = dispatch.default_prevented,
            "tooltip event dispatched"
        );
        dispatch
    }

    fn schedule_touch_show(&mut self, binding: BindingId, revision: u64) -> TaskId {
        if let Some(previous) = self.pending_touch.take() {
            previous.source.cancel();
        }
        let source = CancellationSource::new();
        let task = self
            .tasks
            .defer(DeferredTask::TouchShow { binding, revision }, source.token());
        self.pending_touch = Some(PendingTouch { binding, source });
        task
    }

    // --- Ticks ---------------------------------------------------------

    /// Run one tick. Returns the number of tasks that ran.
    pub fn run_deferred<H: Host + ?Sized>(&mut self, host: &mut H) -> usize {
        self.run_deferred_report(host).ran()
    }

    /// Run one tick and report every task outcome.
    pub fn run_deferred_report<H: Host + ?Sized>(&mut self, host: &mut H) -> TickReport {
        let mut batch = self.tasks.take_tick();
        let mut outcomes = Vec::new();
        for task in batch.by_ref() {
            let outcome = self.run_task(host, task);
            outcomes.push((task, outcome));
        }
        TickReport {
            outcomes,
            skipped: batch.skipped(),
        }
    }

    /// Queued tasks that have not been cancelled.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.live_len()
    }

    fn run_task<H: Host + ?Sized>(&mut self, host: &mut H, task: DeferredTask) -> Outcome {
        match task {
            DeferredTask::SurfaceMounted { view } => match self.overlay.complete_mount(host, view) {
                Some(report) => Outcome::Measured(report),
                None => Outcome::Ignored(IgnoreReason::ViewReplaced),
            },
            DeferredTask::TouchShow { binding: id, revision } => {
                self.pending_touch.take_if(|p| p.binding == id);
                if revision != self.overlay.revision() {
                    debug!(binding = %id, revision, "stale tap show dropped");
                    return Outcome::Ignored(IgnoreReason::StaleRevision);
                }
                let Some(binding) = self.bindings.get_mut(&id) else {
                    return Outcome::Ignored(IgnoreReason::UnknownBinding);
                };
                binding
                    .run_touch_show(BindingCx {
                        host,
                        overlay: &mut self.overlay,
                        tasks: &mut self.tasks,
                    })
                    .into()
            }
        }
    }

    // --- Lifecycle -----------------------------------------------------

    /// Close the overlay, unbind everything and drop queued work.
    ///
    /// Returns the number of bindings removed.
    pub fn shutdown<H: Host + ?Sized>(&mut self, host: &mut H) -> usize {
        if let Some(pending) = self.pending_touch.take() {
            pending.source.cancel();
        }
        self.overlay.hide_tooltip(host);
        let ids = self.binding_ids();
        for id in &ids {
            self.unbind(host, *id);
        }
        self.tasks.clear();
        debug!(bindings = ids.len(), "tooltip controller shut down");
        ids.len()
    }
}
