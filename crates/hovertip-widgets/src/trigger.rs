#![forbid(unsafe_code)]

//! Per-element trigger binding.
//!
//! A [`TriggerBinding`] is attached to one interactive element and turns its
//! pointer and touch events into overlay requests:
//!
//! | event          | pointer device                                   | touch device          |
//! |----------------|--------------------------------------------------|-----------------------|
//! | `mouseenter`   | show, then attach the outside-click listener      | ignored               |
//! | `mouseleave`   | hide and detach, unless the content scrolls      | ignored               |
//! | `touchstart`   | hide now, show on the next tick, suppress default | same                  |
//! | document click | hide and detach when the click is outside        | same                  |
//!
//! Without content every handler does nothing.
//!
//! The binding allocates its four [`HandlerId`]s once, at bind time, and every
//! attach/detach reuses them, so the document never holds more than one
//! outside-click listener per binding.

use std::fmt;

use hovertip_core::content::ContentPayload;
use hovertip_core::element::ElementId;
use hovertip_core::event::{EventKind, HandlerId, ListenerPhase, ListenerSpec};
use hovertip_core::host::{Host, Listeners};

use crate::listener::ListenerSlot;
use crate::overlay::{OverlayManager, ShowOutcome, ShowRequest};
use crate::task::TaskQueue;

/// Identity of a binding within its controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding#{}", self.0)
    }
}

/// Per-trigger configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BindingConfig {
    /// What to show. `None` disables the binding without unbinding it.
    pub content: Option<ContentPayload>,
    /// Extra class for the overlay pane.
    pub panel_class: Option<String>,
}

impl BindingConfig {
    #[must_use]
    pub fn new(content: impl Into<ContentPayload>) -> Self {
        Self {
            content: Some(content.into()),
            panel_class: None,
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.panel_class = Some(class.into());
        self
    }
}

/// Which of a binding's listeners a handler id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingRole {
    Enter,
    Leave,
    Touch,
    DocumentClick,
}

/// The four handler ids of one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingHandlers {
    pub enter: HandlerId,
    pub leave: HandlerId,
    pub touch: HandlerId,
    pub document_click: HandlerId,
}

impl BindingHandlers {
    /// Every handler with its role.
    #[must_use]
    pub const fn roles(&self) -> [(HandlerId, BindingRole); 4] {
        [
            (self.enter, BindingRole::Enter),
            (self.leave, BindingRole::Leave),
            (self.touch, BindingRole::Touch),
            (self.document_click, BindingRole::DocumentClick),
        ]
    }
}

/// Why a binding handler did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The binding has no content.
    NoContent,
    /// Hover events are ignored on touch-capable devices.
    TouchDevice,
    /// The click landed inside the trigger.
    InsideTrigger,
    /// The click listener was not attached.
    NotListening,
}

/// What a binding handler did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A show request went to the overlay manager.
    Shown(ShowOutcome),
    /// The overlay was hidden; `closed` is whether anything was open.
    Hidden { closed: bool },
    /// The content scrolls, so the tooltip stays open after leave.
    KeptOpen,
    /// Nothing happened.
    Skipped(SkipReason),
}

/// Borrowed controller state a binding handler works against.
pub struct BindingCx<'a, H: ?Sized> {
    pub host: &'a mut H,
    pub overlay: &'a mut OverlayManager,
    pub tasks: &'a mut TaskQueue,
}

/// Event handling for one trigger element.
#[derive(Debug)]
pub struct TriggerBinding {
    id: BindingId,
    element: ElementId,
    config: BindingConfig,
    handlers: BindingHandlers,
    enter: ListenerSlot,
    leave: ListenerSlot,
    touch: ListenerSlot,
    outside_click: ListenerSlot,
}

impl TriggerBinding {
    /// Create a detached binding. `click_phase` is the phase the outside-click
    /// listener registers in.
    #[must_use]
    pub fn new(
        id: BindingId,
        element: ElementId,
        config: BindingConfig,
        handlers: BindingHandlers,
        click_phase: ListenerPhase,
    ) -> Self {
        Self {
            id,
            element,
            config,
            handlers,
            enter: ListenerSlot::new(ListenerSpec::on_element(
                element,
                EventKind::MouseEnter,
                handlers.enter,
            )),
            leave: ListenerSlot::new(ListenerSpec::on_element(
                element,
                EventKind::MouseLeave,
                handlers.leave,
            )),
            touch: ListenerSlot::new(ListenerSpec::on_element(
                element,
                EventKind::TouchStart,
                handlers.touch,
            )),
            outside_click: ListenerSlot::new(ListenerSpec::on_document(
                EventKind::Click,
                click_phase,
                handlers.document_click,
            )),
        }
    }

    #[must_use]
    pub const fn id(&self) -> BindingId {
        self.id
    }

    #[must_use]
    pub const fn element(&self) -> ElementId {
        self.element
    }

    #[must_use]
    pub const fn config(&self) -> &BindingConfig {
        &self.config
    }

    #[must_use]
    pub const fn handlers(&self) -> &BindingHandlers {
        &self.handlers
    }

    /// Whether the outside-click listener is registered.
    #[must_use]
    pub const fn listening_for_outside_click(&self) -> bool {
        self.outside_click.is_attached()
    }

    /// Replace the content.
    pub fn set_content(&mut self, content: Option<ContentPayload>) {
        self.config.content = content;
    }

    /// Replace the panel class.
    pub fn set_class(&mut self, class: Option<String>) {
        self.config.panel_class = class;
    }

    /// Register the element listeners.
    pub fn attach<L: Listeners + ?Sized>(&mut self, host: &mut L) {
        self.enter.attach(host);
        self.leave.attach(host);
        self.touch.attach(host);
    }

    /// Unregister everything this binding registered.
    pub fn detach_all<L: Listeners + ?Sized>(&mut self, host: &mut L) {
        self.enter.detach(host);
        self.leave.detach(host);
        self.touch.detach(host);
        self.outside_click.detach(host);
    }

    fn show_request(&self, content: ContentPayload) -> ShowRequest {
        ShowRequest {
            trigger: self.element,
            content,
            panel_class: self.config.panel_class.clone(),
        }
    }

    /// `mouseenter` on the element.
    pub fn on_pointer_enter<H: Host + ?Sized>(&mut self, cx: BindingCx<'_, H>) -> TriggerOutcome {
        if cx.host.touch_capabilities().device_class().is_touch() {
            return TriggerOutcome::Skipped(SkipReason::TouchDevice);
        }
        let Some(content) = self.config.content.clone() else {
            return TriggerOutcome::Skipped(SkipReason::NoContent);
        };
        let outcome = cx
            .overlay
            .show_tooltip(cx.host, cx.tasks, self.show_request(content));
        self.outside_click.attach(cx.host);
        TriggerOutcome::Shown(outcome)
    }

    /// `mouseleave` on the element.
    pub fn on_pointer_leave<H: Host + ?Sized>(&mut self, cx: BindingCx<'_, H>) -> TriggerOutcome {
        if cx.host.touch_capabilities().device_class().is_touch() {
            return TriggerOutcome::Skipped(SkipReason::TouchDevice);
        }
        let Some(content) = self.config.content.as_ref() else {
            return TriggerOutcome::Skipped(SkipReason::NoContent);
        };
        // Content length only. A tall render of short text still closes here;
        // the measured result governs the surface's own leave listener.
        if cx.overlay.scroll_heuristics().provisional(content) {
            return TriggerOutcome::KeptOpen;
        }
        let closed = cx.overlay.hide_tooltip(cx.host);
        self.outside_click.detach(cx.host);
        TriggerOutcome::Hidden { closed }
    }

    /// `touchstart` on the element: close now, queue the show.
    ///
    /// Returns the overlay revision the queued show must still see. The
    /// caller owns the task's cancellation.
    pub fn on_touch_start<H: Host + ?Sized>(&mut self, cx: BindingCx<'_, H>) -> Result<u64, SkipReason> {
        if self.config.content.is_none() {
            return Err(SkipReason::NoContent);
        }
        cx.overlay.hide_tooltip(cx.host);
        Ok(cx.overlay.revision())
    }

    /// The deferred half of a tap.
    pub fn run_touch_show<H: Host + ?Sized>(&mut self, cx: BindingCx<'_, H>) -> TriggerOutcome {
        let Some(content) = self.config.content.clone() else {
            return TriggerOutcome::Skipped(SkipReason::NoContent);
        };
        let outcome = cx
            .overlay
            .show_tooltip(cx.host, cx.tasks, self.show_request(content));
        self.outside_click.attach(cx.host);
        TriggerOutcome::Shown(outcome)
    }

    /// Document `click` while listening: hide when the click is outside.
    ///
    /// A click with no resolvable target counts as outside.
    pub fn on_document_click<H: Host + ?Sized>(
        &mut self,
        cx: BindingCx<'_, H>,
        target: Option<&H::Node>,
    ) -> TriggerOutcome {
        if !self.outside_click.is_attached() {
            return TriggerOutcome::Skipped(SkipReason::NotListening);
        }
        if target.is_some_and(|node| cx.host.contains(self.element, node)) {
            return TriggerOutcome::Skipped(SkipReason::InsideTrigger);
        }
        let closed = cx.overlay.hide_tooltip(cx.host);
        self.outside_click.detach(cx.host);
        TriggerOutcome::Hidden { closed }
    }
}
