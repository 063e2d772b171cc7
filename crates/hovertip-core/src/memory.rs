#![forbid(unsafe_code)]

//! Headless in-memory document.
//!
//! [`MemoryDocument`] implements [`Host`](crate::host::Host) without a browser:
//! an element tree with explicit rectangles, a listener registry that follows
//! DOM add/remove semantics and counts every call, and a renderer that keeps
//! mounted views with deterministic metrics.
//!
//! It is deterministic by construction (ordered maps, monotonically minted
//! ids), so the same sequence of calls always yields the same state.
//!
//! # Rendered metrics
//!
//! Text is laid out with a fixed [`TextLayout`]: `ceil(len / chars_per_line)`
//! lines of `line_height` pixels plus vertical padding. Rich templates carry
//! their own text and may have explicit metrics. Tests can pin the metrics of
//! a mounted view with [`MemoryDocument::set_view_metrics`].

use std::collections::BTreeMap;

use crate::content::{ContentMetrics, ContentPayload, TemplateRef, text_len};
use crate::device::TouchCapabilities;
use crate::element::ElementId;
use crate::event::{EventKind, HandlerId, ListenerPhase, ListenerSpec, ListenerTarget};
use crate::geometry::Rect;
use crate::host::{DeviceInfo, Geometry, Listeners, MountRequest, NodeTree, Renderer, ViewId};
use crate::logging::trace;

/// Fixed text layout used to derive view metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    pub line_height: f64,
    pub chars_per_line: usize,
    pub vertical_padding: f64,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            line_height: 18.0,
            chars_per_line: 40,
            vertical_padding: 16.0,
        }
    }
}

impl TextLayout {
    /// Metrics of `len` characters laid out with this layout.
    #[must_use]
    pub fn metrics_for_len(&self, len: usize) -> ContentMetrics {
        let per_line = self.chars_per_line.max(1);
        let lines = len.div_ceil(per_line).max(1);
        ContentMetrics::new(
            lines as f64 * self.line_height + self.vertical_padding,
            len,
        )
    }
}

/// Counters over every listener registry call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerStats {
    /// `add_listener` calls, including ones that matched an existing spec.
    pub add_calls: u64,
    /// `remove_listener` calls, including ones that matched nothing.
    pub remove_calls: u64,
    /// `add_listener` calls ignored because the spec was already registered.
    pub duplicate_adds: u64,
    /// `remove_listener` calls that matched nothing.
    pub missed_removes: u64,
}

#[derive(Debug, Clone)]
struct ElementNode {
    parent: Option<ElementId>,
    rect: Rect,
}

#[derive(Debug, Clone)]
struct Template {
    text: String,
    metrics: Option<ContentMetrics>,
}

/// A mounted tooltip view.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedView {
    pub request: MountRequest,
    pub metrics: ContentMetrics,
    pub open: bool,
}

/// Headless [`Host`](crate::host::Host) implementation.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    elements: BTreeMap<ElementId, ElementNode>,
    next_element: u64,
    viewport_width: f64,
    viewport_height: f64,
    touch: TouchCapabilities,
    listeners: Vec<ListenerSpec>,
    stats: ListenerStats,
    templates: BTreeMap<TemplateRef, Template>,
    next_template: u64,
    views: BTreeMap<ViewId, MountedView>,
    next_view: u64,
    mount_count: u64,
    dispose_count: u64,
    layout: TextLayout,
}

impl MemoryDocument {
    /// Create an empty document with the given viewport size.
    #[must_use]
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            elements: BTreeMap::new(),
            next_element: 1,
            viewport_width,
            viewport_height,
            touch: TouchCapabilities::NONE,
            listeners: Vec::new(),
            stats: ListenerStats::default(),
            templates: BTreeMap::new(),
            next_template: 1,
            views: BTreeMap::new(),
            next_view: 1,
            mount_count: 0,
            dispose_count: 0,
            layout: TextLayout::default(),
        }
    }

    /// Replace touch capabilities.
    #[must_use]
    pub fn with_touch(mut self, touch: TouchCapabilities) -> Self {
        self.touch = touch;
        self
    }

    /// Replace the text layout model.
    #[must_use]
    pub fn with_layout(mut self, layout: TextLayout) -> Self {
        self.layout = layout;
        self
    }

    // --- Elements ------------------------------------------------------

    /// Create an element. `parent` must exist if given; otherwise the
    /// element is attached to the document root.
    pub fn create_element(&mut self, parent: Option<ElementId>, rect: Rect) -> ElementId {
        let id = ElementId::new(self.next_element);
        self.next_element += 1;
        let parent = parent.filter(|p| self.elements.contains_key(p));
        self.elements.insert(id, ElementNode { parent, rect });
        id
    }

    /// Move/resize an element.
    pub fn set_rect(&mut self, element: ElementId, rect: Rect) -> bool {
        match self.elements.get_mut(&element) {
            Some(node) => {
                node.rect = rect;
                true
            }
            None => false,
        }
    }

    /// Remove an element and its subtree. Listeners attached to removed
    /// elements go with them.
    pub fn remove_element(&mut self, element: ElementId) -> bool {
        if !self.elements.contains_key(&element) {
            return false;
        }
        let doomed: Vec<ElementId> = self
            .elements
            .keys()
            .copied()
            .filter(|id| self.is_ancestor_or_self(element, *id))
            .collect();
        for id in &doomed {
            self.elements.remove(id);
        }
        self.listeners.retain(|spec| match spec.target {
            ListenerTarget::Element(el) => !doomed.contains(&el),
            ListenerTarget::Document => true,
        });
        true
    }

    /// Whether `element` exists.
    #[must_use]
    pub fn has_element(&self, element: ElementId) -> bool {
        self.elements.contains_key(&element)
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Viewport width.
    #[must_use]
    pub const fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    /// Replace touch capabilities on a live document.
    pub fn set_touch(&mut self, touch: TouchCapabilities) {
        self.touch = touch;
    }

    fn is_ancestor_or_self(&self, ancestor: ElementId, mut node: ElementId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.elements.get(&node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    // --- Templates -----------------------------------------------------

    /// Register rich content whose rendered text is `text`.
    pub fn register_template(&mut self, text: impl Into<String>) -> TemplateRef {
        let id = TemplateRef::new(self.next_template);
        self.next_template += 1;
        self.templates.insert(
            id,
            Template {
                text: text.into(),
                metrics: None,
            },
        );
        id
    }

    /// Pin the rendered metrics of a template.
    pub fn set_template_metrics(&mut self, template: TemplateRef, metrics: ContentMetrics) -> bool {
        match self.templates.get_mut(&template) {
            Some(t) => {
                t.metrics = Some(metrics);
                true
            }
            None => false,
        }
    }

    fn metrics_for(&self, content: &ContentPayload) -> ContentMetrics {
        match content {
            ContentPayload::Text(text) => self.layout.metrics_for_len(text_len(text)),
            ContentPayload::Rich(template) => match self.templates.get(template) {
                Some(Template {
                    metrics: Some(metrics),
                    ..
                }) => *metrics,
                Some(t) => self.layout.metrics_for_len(text_len(&t.text)),
                None => self.layout.metrics_for_len(0),
            },
        }
    }

    // --- Views ---------------------------------------------------------

    /// Pin the metrics a mounted view will report.
    pub fn set_view_metrics(&mut self, view: ViewId, metrics: ContentMetrics) -> bool {
        match self.views.get_mut(&view) {
            Some(v) => {
                v.metrics = metrics;
                true
            }
            None => false,
        }
    }

    /// A mounted view.
    #[must_use]
    pub fn view(&self, view: ViewId) -> Option<&MountedView> {
        self.views.get(&view)
    }

    /// All mounted views, oldest first.
    pub fn live_views(&self) -> impl Iterator<Item = (ViewId, &MountedView)> + '_ {
        self.views.iter().map(|(id, v)| (*id, v))
    }

    /// Number of mounted views.
    #[must_use]
    pub fn live_view_count(&self) -> usize {
        self.views.len()
    }

    /// Total successful mounts.
    #[must_use]
    pub const fn mount_count(&self) -> u64 {
        self.mount_count
    }

    /// Total disposals of live views.
    #[must_use]
    pub const fn dispose_count(&self) -> u64 {
        self.dispose_count
    }

    // --- Listeners -----------------------------------------------------

    /// Listener call counters.
    #[must_use]
    pub const fn listener_stats(&self) -> ListenerStats {
        self.stats
    }

    /// All live listener registrations in registration order.
    #[must_use]
    pub fn live_listeners(&self) -> &[ListenerSpec] {
        &self.listeners
    }

    /// Number of live registrations on `target` for `kind`.
    #[must_use]
    pub fn listener_count(&self, target: ListenerTarget, kind: EventKind) -> usize {
        self.listeners
            .iter()
            .filter(|spec| spec.target == target && spec.kind == kind)
            .count()
    }

    /// Whether `spec` is registered.
    #[must_use]
    pub fn is_registered(&self, spec: &ListenerSpec) -> bool {
        self.listeners.contains(spec)
    }

    /// Handlers that would run, in order, for an event of `kind` dispatched
    /// at `target`.
    ///
    /// Order: document capture listeners, then the target's own listeners,
    /// then (for bubbling kinds) each ancestor and the document's bubbling
    /// listeners. `mouseenter`/`mouseleave` do not bubble.
    #[must_use]
    pub fn dispatch_path(&self, kind: EventKind, target: ElementId) -> Vec<HandlerId> {
        let mut path = Vec::new();
        let collect = |target: ListenerTarget, phase: ListenerPhase, out: &mut Vec<HandlerId>| {
            out.extend(
                self.listeners
                    .iter()
                    .filter(|s| s.target == target && s.kind == kind && s.phase == phase)
                    .map(|s| s.handler),
            );
        };

        collect(ListenerTarget::Document, ListenerPhase::Capture, &mut path);
        if !self.elements.contains_key(&target) {
            return path;
        }
        let bubbles = matches!(kind, EventKind::Click | EventKind::TouchStart);
        let mut node = Some(target);
        while let Some(el) = node {
            for phase in [ListenerPhase::Capture, ListenerPhase::Bubble] {
                collect(ListenerTarget::Element(el), phase, &mut path);
            }
            if !bubbles {
                return path;
            }
            node = self.elements.get(&el).and_then(|n| n.parent);
        }
        collect(ListenerTarget::Document, ListenerPhase::Bubble, &mut path);
        path
    }
}

impl Geometry for MemoryDocument {
    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        self.elements.get(&element).map(|n| n.rect)
    }

    fn viewport_height(&self) -> Option<f64> {
        Some(self.viewport_height)
    }
}

impl Listeners for MemoryDocument {
    fn add_listener(&mut self, spec: ListenerSpec) {
        self.stats.add_calls += 1;
        if let ListenerTarget::Element(el) = spec.target
            && !self.elements.contains_key(&el)
        {
            return;
        }
        if self.listeners.contains(&spec) {
            self.stats.duplicate_adds += 1;
            return;
        }
        trace!(?spec, "listener added");
        self.listeners.push(spec);
    }

    fn remove_listener(&mut self, spec: &ListenerSpec) {
        self.stats.remove_calls += 1;
        let before = self.listeners.len();
        self.listeners.retain(|s| s != spec);
        if self.listeners.len() == before {
            self.stats.missed_removes += 1;
        } else {
            trace!(?spec, "listener removed");
        }
    }
}

impl NodeTree for MemoryDocument {
    type Node = ElementId;

    fn contains(&self, ancestor: ElementId, node: &ElementId) -> bool {
        self.elements.contains_key(&ancestor)
            && self.elements.contains_key(node)
            && self.is_ancestor_or_self(ancestor, *node)
    }
}

impl Renderer for MemoryDocument {
    fn mount(&mut self, request: MountRequest) -> Option<ViewId> {
        let id = ViewId::new(self.next_view);
        self.next_view += 1;
        let metrics = self.metrics_for(&request.content);
        self.views.insert(
            id,
            MountedView {
                request,
                metrics,
                open: false,
            },
        );
        self.mount_count += 1;
        Some(id)
    }

    fn measure(&self, view: ViewId) -> Option<ContentMetrics> {
        self.views.get(&view).map(|v| v.metrics)
    }

    fn set_open(&mut self, view: ViewId, open: bool) {
        if let Some(v) = self.views.get_mut(&view) {
            v.open = open;
        }
    }

    fn dispose(&mut self, view: ViewId) {
        if self.views.remove(&view).is_some() {
            self.dispose_count += 1;
        }
    }
}

impl DeviceInfo for MemoryDocument {
    fn touch_capabilities(&self) -> TouchCapabilities {
        self.touch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{OverlayPosition, Placement};

    fn doc() -> MemoryDocument {
        MemoryDocument::new(1024.0, 768.0)
    }

    fn request(trigger: ElementId, content: ContentPayload) -> MountRequest {
        MountRequest {
            trigger,
            content,
            scrollable: false,
            panel_class: None,
            position: OverlayPosition::resolve(Placement::BelowCentered, Rect::default()),
        }
    }

    #[test]
    fn contains_walks_parents() {
        let mut d = doc();
        let root = d.create_element(None, Rect::default());
        let child = d.create_element(Some(root), Rect::default());
        let other = d.create_element(None, Rect::default());
        assert!(d.contains(root, &root));
        assert!(d.contains(root, &child));
        assert!(!d.contains(child, &root));
        assert!(!d.contains(root, &other));
    }

    #[test]
    fn duplicate_add_is_ignored_and_counted() {
        let mut d = doc();
        let spec = ListenerSpec::on_document(EventKind::Click, ListenerPhase::Capture, HandlerId::new(1));
        d.add_listener(spec);
        d.add_listener(spec);
        assert_eq!(d.live_listeners().len(), 1);
        let stats = d.listener_stats();
        assert_eq!(stats.add_calls, 2);
        assert_eq!(stats.duplicate_adds, 1);
    }

    #[test]
    fn removing_unknown_spec_is_a_counted_noop() {
        let mut d = doc();
        let spec = ListenerSpec::on_document(EventKind::Click, ListenerPhase::Capture, HandlerId::new(1));
        d.remove_listener(&spec);
        assert_eq!(d.listener_stats().missed_removes, 1);
        assert!(d.live_listeners().is_empty());
    }

    #[test]
    fn remove_needs_matching_phase_and_handler() {
        let mut d = doc();
        let spec = ListenerSpec::on_document(EventKind::Click, ListenerPhase::Capture, HandlerId::new(1));
        d.add_listener(spec);
        d.remove_listener(&ListenerSpec::on_document(
            EventKind::Click,
            ListenerPhase::Bubble,
            HandlerId::new(1),
        ));
        d.remove_listener(&ListenerSpec::on_document(
            EventKind::Click,
            ListenerPhase::Capture,
            HandlerId::new(2),
        ));
        assert!(d.is_registered(&spec));
        d.remove_listener(&spec);
        assert!(!d.is_registered(&spec));
    }

    #[test]
    fn removing_element_drops_subtree_and_listeners() {
        let mut d = doc();
        let root = d.create_element(None, Rect::default());
        let child = d.create_element(Some(root), Rect::default());
        d.add_listener(ListenerSpec::on_element(child, EventKind::MouseLeave, HandlerId::new(3)));
        assert!(d.remove_element(root));
        assert!(!d.has_element(child));
        assert!(d.live_listeners().is_empty());
        assert_eq!(d.bounding_rect(child), None);
    }

    #[test]
    fn dispatch_path_orders_capture_target_bubble() {
        let mut d = doc();
        let root = d.create_element(None, Rect::default());
        let child = d.create_element(Some(root), Rect::default());
        d.add_listener(ListenerSpec::on_document(EventKind::Click, ListenerPhase::Bubble, HandlerId::new(1)));
        d.add_listener(ListenerSpec::on_element(root, EventKind::Click, HandlerId::new(2)));
        d.add_listener(ListenerSpec::on_element(child, EventKind::Click, HandlerId::new(3)));
        d.add_listener(ListenerSpec::on_document(EventKind::Click, ListenerPhase::Capture, HandlerId::new(4)));
        let path: Vec<u64> = d
            .dispatch_path(EventKind::Click, child)
            .into_iter()
            .map(HandlerId::get)
            .collect();
        assert_eq!(path, vec![4, 3, 2, 1]);
    }

    #[test]
    fn mouseenter_does_not_bubble() {
        let mut d = doc();
        let root = d.create_element(None, Rect::default());
        let child = d.create_element(Some(root), Rect::default());
        d.add_listener(ListenerSpec::on_element(root, EventKind::MouseEnter, HandlerId::new(1)));
        assert!(d.dispatch_path(EventKind::MouseEnter, child).is_empty());
        assert_eq!(d.dispatch_path(EventKind::MouseEnter, root), vec![HandlerId::new(1)]);
    }

    #[test]
    fn text_metrics_follow_layout() {
        let mut d = doc();
        let el = d.create_element(None, Rect::default());
        let view = d
            .mount(request(el, ContentPayload::text("x".repeat(81))))
            .expect("mount");
        let m = d.measure(view).expect("metrics");
        assert_eq!(m.text_len, 81);
        assert_eq!(m.scroll_height, 3.0 * 18.0 + 16.0);
    }

    #[test]
    fn template_metrics_can_be_pinned() {
        let mut d = doc();
        let el = d.create_element(None, Rect::default());
        let t = d.register_template("rich");
        d.set_template_metrics(t, ContentMetrics::new(420.0, 4));
        let view = d.mount(request(el, ContentPayload::rich(t))).expect("mount");
        assert_eq!(d.measure(view), Some(ContentMetrics::new(420.0, 4)));
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut d = doc();
        let el = d.create_element(None, Rect::default());
        let view = d.mount(request(el, "hi".into())).expect("mount");
        d.dispose(view);
        d.dispose(view);
        assert_eq!(d.dispose_count(), 1);
        assert_eq!(d.measure(view), None);
    }
}
