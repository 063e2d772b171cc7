#![forbid(unsafe_code)]

//! Host event and listener types.
//!
//! A listener is identified by a [`ListenerSpec`]: the target it is attached
//! to, the event kind, the phase, and the [`HandlerId`] of the callback. The
//! handler id plays the role of the bound callback reference in a browser:
//! removal only succeeds when every field, the handler included, matches the
//! spec that was added. Components therefore mint their handler ids once and
//! reuse them for every attach/detach pair.

use std::fmt;

use crate::element::ElementId;

/// DOM event kinds the tooltip system listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `mouseenter` on a trigger.
    MouseEnter,
    /// `mouseleave` on a trigger.
    MouseLeave,
    /// `touchstart` on a trigger.
    TouchStart,
    /// `click`, observed on the document.
    Click,
}

impl EventKind {
    /// DOM event type string.
    #[must_use]
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::TouchStart => "touchstart",
            Self::Click => "click",
        }
    }

    /// Parse a DOM event type string.
    #[must_use]
    pub fn from_dom_name(name: &str) -> Option<Self> {
        match name {
            "mouseenter" => Some(Self::MouseEnter),
            "mouseleave" => Some(Self::MouseLeave),
            "touchstart" => Some(Self::TouchStart),
            "click" => Some(Self::Click),
            _ => None,
        }
    }
}

/// Listener registration phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListenerPhase {
    /// Ordinary bubbling-phase listener.
    #[default]
    Bubble,
    /// Capture-phase listener (`addEventListener(.., true)`).
    Capture,
}

impl ListenerPhase {
    /// The `useCapture` flag for this phase.
    #[must_use]
    pub const fn use_capture(self) -> bool {
        matches!(self, Self::Capture)
    }
}

/// What a listener is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    /// The document root.
    Document,
    /// A specific element.
    Element(ElementId),
}

/// Identity of a bound callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Wrap a raw handler id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// Full identity of one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerSpec {
    pub target: ListenerTarget,
    pub kind: EventKind,
    pub phase: ListenerPhase,
    pub handler: HandlerId,
}

impl ListenerSpec {
    /// Bubbling listener on an element.
    #[must_use]
    pub const fn on_element(element: ElementId, kind: EventKind, handler: HandlerId) -> Self {
        Self {
            target: ListenerTarget::Element(element),
            kind,
            phase: ListenerPhase::Bubble,
            handler,
        }
    }

    /// Listener on the document in the given phase.
    #[must_use]
    pub const fn on_document(kind: EventKind, phase: ListenerPhase, handler: HandlerId) -> Self {
        Self {
            target: ListenerTarget::Document,
            kind,
            phase,
            handler,
        }
    }
}

/// An event delivered by the host to a handler.
///
/// `N` is the host's node type; the headless document uses [`ElementId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEvent<N = ElementId> {
    /// The event kind.
    pub kind: EventKind,
    /// The node the event was dispatched at, if the host could resolve one.
    pub target: Option<N>,
}

impl<N> HostEvent<N> {
    /// Create an event with no resolved target.
    #[must_use]
    pub const fn new(kind: EventKind) -> Self {
        Self { kind, target: None }
    }

    /// Attach the dispatch target.
    #[must_use]
    pub fn with_target(mut self, target: N) -> Self {
        self.target = Some(target);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_names_match_browser_event_types() {
        assert_eq!(EventKind::MouseEnter.dom_name(), "mouseenter");
        assert_eq!(EventKind::MouseLeave.dom_name(), "mouseleave");
        assert_eq!(EventKind::TouchStart.dom_name(), "touchstart");
        assert_eq!(EventKind::Click.dom_name(), "click");
    }

    #[test]
    fn specs_differing_only_in_handler_are_distinct() {
        let a = ListenerSpec::on_document(EventKind::Click, ListenerPhase::Capture, HandlerId::new(1));
        let b = ListenerSpec::on_document(EventKind::Click, ListenerPhase::Capture, HandlerId::new(2));
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn capture_flag() {
        assert!(ListenerPhase::Capture.use_capture());
        assert!(!ListenerPhase::Bubble.use_capture());
    }

    #[test]
    fn host_event_builder() {
        let ev: HostEvent = HostEvent::new(EventKind::Click).with_target(ElementId::new(4));
        assert_eq!(ev.target, Some(ElementId::new(4)));
        assert_eq!(ev.kind, EventKind::Click);
    }
}
