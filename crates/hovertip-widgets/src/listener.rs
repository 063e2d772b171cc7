#![forbid(unsafe_code)]

//! Owned listener registrations.
//!
//! A [`ListenerSlot`] pairs one [`ListenerSpec`] with whether it is currently
//! attached. The owning component calls [`attach`](ListenerSlot::attach) and
//! [`detach`](ListenerSlot::detach) freely; the slot guarantees the host sees
//! at most one add per attached period and exactly one matching remove, always
//! with the same spec.

use hovertip_core::event::ListenerSpec;
use hovertip_core::host::Listeners;
use hovertip_core::logging::trace;

/// One listener an owner may attach and detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerSlot {
    spec: ListenerSpec,
    attached: bool,
}

impl ListenerSlot {
    /// A detached slot for `spec`.
    #[must_use]
    pub const fn new(spec: ListenerSpec) -> Self {
        Self {
            spec,
            attached: false,
        }
    }

    /// The registration this slot manages.
    #[must_use]
    pub const fn spec(&self) -> &ListenerSpec {
        &self.spec
    }

    /// Whether the listener is registered with the host.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// Register with the host. Returns `false` if already attached.
    pub fn attach<L: Listeners + ?Sized>(&mut self, host: &mut L) -> bool {
        if self.attached {
            return false;
        }
        host.add_listener(self.spec);
        self.attached = true;
        trace!(
            handler = %self.spec.handler,
            kind = self.spec.kind.dom_name(),
            "listener attached"
        );
        true
    }

    /// Unregister from the host. Returns `false` if nothing was attached.
    pub fn detach<L: Listeners + ?Sized>(&mut self, host: &mut L) -> bool {
        if !self.attached {
            return false;
        }
        host.remove_listener(&self.spec);
        self.attached = false;
        trace!(
            handler = %self.spec.handler,
            kind = self.spec.kind.dom_name(),
            "listener detached"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hovertip_core::event::{EventKind, HandlerId, ListenerPhase};
    use hovertip_core::memory::MemoryDocument;

    fn slot() -> ListenerSlot {
        ListenerSlot::new(ListenerSpec::on_document(
            EventKind::Click,
            ListenerPhase::Capture,
            HandlerId::new(7),
        ))
    }

    #[test]
    fn attach_twice_adds_once() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let mut s = slot();
        assert!(s.attach(&mut doc));
        assert!(!s.attach(&mut doc));
        assert_eq!(doc.listener_stats().add_calls, 1);
        assert_eq!(doc.live_listeners(), &[*s.spec()]);
    }

    #[test]
    fn detach_without_attach_never_reaches_host() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let mut s = slot();
        assert!(!s.detach(&mut doc));
        assert_eq!(doc.listener_stats().remove_calls, 0);
    }

    #[test]
    fn cycles_pair_every_add_with_one_remove() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let mut s = slot();
        for _ in 0..5 {
            s.attach(&mut doc);
            s.attach(&mut doc);
            s.detach(&mut doc);
            s.detach(&mut doc);
        }
        let stats = doc.listener_stats();
        assert_eq!(stats.add_calls, 5);
        assert_eq!(stats.remove_calls, 5);
        assert_eq!(stats.missed_removes, 0);
        assert!(doc.live_listeners().is_empty());
    }
}
