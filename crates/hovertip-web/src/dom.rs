#![forbid(unsafe_code)]

//! Browser host over `web-sys`, exported to JavaScript as `TooltipApp`.
//!
//! [`DomHost`] implements every host trait against the live DOM. Each
//! registered [`ListenerSpec`] owns one `Closure`; the closure forwards the
//! event to the controller by [`HandlerId`] and calls `preventDefault()` when
//! the dispatch asks for it. Deferred work is drained from a
//! `setTimeout(0)` callback, scheduled whenever tasks are pending.
//!
//! Panels are `div.hovertip-pane > div.hovertip-panel` appended to `body`,
//! positioned `fixed` at the resolved origin. The `hovertip-open` class is
//! set once the panel has been measured; `hovertip-scrollable` marks
//! provisionally scrollable content.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use hovertip_core::content::{ContentMetrics, ContentPayload, TemplateRef, text_len};
use hovertip_core::device::TouchCapabilities;
use hovertip_core::element::ElementId;
use hovertip_core::event::{EventKind, HandlerId, HostEvent, ListenerSpec, ListenerTarget};
use hovertip_core::geometry::Rect;
use hovertip_core::host::{DeviceInfo, Geometry, Listeners, MountRequest, NodeTree, Renderer, ViewId};
use hovertip_runtime::TooltipPolicy;
use hovertip_widgets::controller::TooltipController;
use hovertip_widgets::trigger::{BindingConfig, BindingId};
use js_sys::{Function, Reflect};
use tracing::{debug, trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement, HtmlTemplateElement, Node, Window};

use crate::WebHostError;
use crate::registry::ElementRegistry;

const LOG_TARGET: &str = "hovertip_web::dom";

type Callback = Closure<dyn FnMut(Event)>;

impl From<WebHostError> for JsValue {
    fn from(err: WebHostError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn js_error(value: &JsValue) -> WebHostError {
    WebHostError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

struct MountedPane {
    pane: HtmlElement,
    panel: HtmlElement,
}

/// The live DOM as a tooltip host.
pub struct DomHost {
    window: Window,
    document: Document,
    body: HtmlElement,
    elements: ElementRegistry<Element>,
    templates: HashMap<TemplateRef, HtmlTemplateElement>,
    next_template: u64,
    listeners: HashMap<ListenerSpec, Callback>,
    views: HashMap<ViewId, MountedPane>,
    next_view: u64,
    sink: Weak<RefCell<AppState>>,
}

impl DomHost {
    fn new(window: Window, document: Document, body: HtmlElement, sink: Weak<RefCell<AppState>>) -> Self {
        Self {
            window,
            document,
            body,
            elements: ElementRegistry::new(),
            templates: HashMap::new(),
            next_template: 1,
            listeners: HashMap::new(),
            views: HashMap::new(),
            next_view: 1,
            sink,
        }
    }

    /// Give `element` a handle. Registering the same node twice returns the
    /// existing handle.
    pub fn register_element(&mut self, element: Element) -> ElementId {
        self.elements.register(element)
    }

    /// Drop the handle for `element`.
    pub fn forget_element(&mut self, element: ElementId) -> Result<(), WebHostError> {
        self.elements.forget(element).map(drop)
    }

    /// Resolve a handle to its node.
    pub fn element(&self, element: ElementId) -> Result<&Element, WebHostError> {
        self.elements.get(element)
    }

    pub fn register_template(&mut self, template: HtmlTemplateElement) -> TemplateRef {
        let id = TemplateRef::new(self.next_template);
        self.next_template += 1;
        self.templates.insert(id, template);
        id
    }

    fn event_target(&self, target: ListenerTarget) -> Option<&EventTarget> {
        match target {
            ListenerTarget::Document => Some(AsRef::<EventTarget>::as_ref(&self.document)),
            ListenerTarget::Element(id) => self.element(id).ok().map(AsRef::<EventTarget>::as_ref),
        }
    }

    fn build_pane(&self, request: &MountRequest) -> Result<MountedPane, WebHostError> {
        // Panels only mount for triggers this host still knows.
        self.element(request.trigger)?;
        let pane: HtmlElement = self
            .document
            .create_element("div")
            .map_err(|e| js_error(&e))?
            .unchecked_into();
        let panel: HtmlElement = self
            .document
            .create_element("div")
            .map_err(|e| js_error(&e))?
            .unchecked_into();

        let pane_classes = pane.class_list();
        pane_classes.add_1("hovertip-pane").map_err(|e| js_error(&e))?;
        if let Some(class) = &request.panel_class {
            for name in class.split_whitespace() {
                pane_classes.add_1(name).map_err(|e| js_error(&e))?;
            }
        }
        let panel_classes = panel.class_list();
        panel_classes.add_1("hovertip-panel").map_err(|e| js_error(&e))?;
        if request.scrollable {
            panel_classes
                .add_1("hovertip-scrollable")
                .map_err(|e| js_error(&e))?;
        }

        match &request.content {
            ContentPayload::Text(text) => panel.set_text_content(Some(text.as_str())),
            ContentPayload::Rich(template) => {
                let Some(template) = self.templates.get(template) else {
                    return Err(WebHostError::Js(format!("unknown template {}", template.get())));
                };
                let fragment = template
                    .content()
                    .clone_node_with_deep(true)
                    .map_err(|e| js_error(&e))?;
                panel.append_child(&fragment).map_err(|e| js_error(&e))?;
            }
        }

        let (dx, dy) = request.position.connection.overlay_offset();
        let style = pane.style();
        for (property, value) in [
            ("position", "fixed".to_owned()),
            ("left", format!("{}px", request.position.origin.x)),
            ("top", format!("{}px", request.position.origin.y)),
            ("transform", format!("translate({}%, {}%)", dx * 100.0, dy * 100.0)),
        ] {
            style
                .set_property(property, &value)
                .map_err(|e| js_error(&e))?;
        }

        pane.append_child(&panel).map_err(|e| js_error(&e))?;
        self.body.append_child(&pane).map_err(|e| js_error(&e))?;
        Ok(MountedPane { pane, panel })
    }
}

impl Geometry for DomHost {
    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        let el = self.element(element).ok()?;
        if !el.is_connected() {
            return None;
        }
        let r = el.get_bounding_client_rect();
        Some(Rect::new(r.x(), r.y(), r.width(), r.height()))
    }

    fn viewport_height(&self) -> Option<f64> {
        self.window.inner_height().ok().and_then(|v| v.as_f64())
    }
}

impl Listeners for DomHost {
    fn add_listener(&mut self, spec: ListenerSpec) {
        if self.listeners.contains_key(&spec) {
            return;
        }
        let Some(target) = self.event_target(spec.target) else {
            trace!(target: LOG_TARGET, ?spec, "listener target gone");
            return;
        };
        let sink = self.sink.clone();
        let handler = spec.handler;
        let kind = spec.kind;
        let callback: Callback = Closure::new(move |event: Event| deliver(&sink, handler, kind, &event));

        let options = AddEventListenerOptions::new();
        options.set_capture(spec.phase.use_capture());
        options.set_passive(false);
        if let Err(err) = target.add_event_listener_with_callback_and_add_event_listener_options(
            kind.dom_name(),
            callback.as_ref().unchecked_ref::<Function>(),
            &options,
        ) {
            warn!(target: LOG_TARGET, ?spec, error = ?err, "addEventListener failed");
            return;
        }
        self.listeners.insert(spec, callback);
    }

    fn remove_listener(&mut self, spec: &ListenerSpec) {
        let Some(callback) = self.listeners.remove(spec) else {
            return;
        };
        let Some(target) = self.event_target(spec.target) else {
            return;
        };
        if let Err(err) = target.remove_event_listener_with_callback_and_bool(
            spec.kind.dom_name(),
            callback.as_ref().unchecked_ref::<Function>(),
            spec.phase.use_capture(),
        ) {
            warn!(target: LOG_TARGET, ?spec, error = ?err, "removeEventListener failed");
        }
    }
}

impl NodeTree for DomHost {
    type Node = Node;

    fn contains(&self, ancestor: ElementId, node: &Node) -> bool {
        self.element(ancestor)
            .is_ok_and(|el| el.contains(Some(node)))
    }
}

impl Renderer for DomHost {
    fn mount(&mut self, request: MountRequest) -> Option<ViewId> {
        match self.build_pane(&request) {
            Ok(mounted) => {
                let id = ViewId::new(self.next_view);
                self.next_view += 1;
                self.views.insert(id, mounted);
                Some(id)
            }
            Err(err) => {
                warn!(target: LOG_TARGET, trigger = %request.trigger, error = %err, "pane mount failed");
                None
            }
        }
    }

    fn measure(&self, view: ViewId) -> Option<ContentMetrics> {
        let mounted = self.views.get(&view)?;
        let text = mounted.panel.text_content().unwrap_or_default();
        Some(ContentMetrics::new(
            f64::from(mounted.panel.scroll_height()),
            text_len(&text),
        ))
    }

    fn set_open(&mut self, view: ViewId, open: bool) {
        if let Some(mounted) = self.views.get(&view)
            && let Err(err) = mounted.pane.class_list().toggle_with_force("hovertip-open", open)
        {
            warn!(target: LOG_TARGET, %view, error = ?err, "open flag not applied");
        }
    }

    fn dispose(&mut self, view: ViewId) {
        if let Some(mounted) = self.views.remove(&view) {
            mounted.pane.remove();
        }
    }
}

impl DeviceInfo for DomHost {
    fn touch_capabilities(&self) -> TouchCapabilities {
        let touch_events = Reflect::has(&self.window, &JsValue::from_str("ontouchstart")).unwrap_or(false);
        let max_touch_points = u32::try_from(self.window.navigator().max_touch_points()).unwrap_or(0);
        TouchCapabilities {
            touch_events,
            max_touch_points,
        }
    }
}

// ── Application state ───────────────────────────────────────────────────

struct AppState {
    host: DomHost,
    tips: TooltipController,
    tick_scheduled: bool,
}

fn deliver(sink: &Weak<RefCell<AppState>>, handler: HandlerId, kind: EventKind, event: &Event) {
    let Some(state) = sink.upgrade() else {
        return;
    };
    let Ok(mut app) = state.try_borrow_mut() else {
        warn!(target: LOG_TARGET, %handler, kind = kind.dom_name(), "re-entrant event dropped");
        return;
    };
    let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
    let host_event = HostEvent { kind, target };
    let AppState { host, tips, .. } = &mut *app;
    let dispatch = tips.dispatch(host, handler, &host_event);
    if dispatch.default_prevented {
        event.prevent_default();
    }
    debug!(
        target: LOG_TARGET,
        %handler,
        kind = kind.dom_name(),
        outcome = dispatch.outcome.label(),
        "dom event dispatched"
    );
    schedule_tick(sink, &mut app);
}

fn schedule_tick(sink: &Weak<RefCell<AppState>>, app: &mut AppState) {
    if app.tick_scheduled || app.tips.pending_tasks() == 0 {
        return;
    }
    let sink = sink.clone();
    let callback = Closure::once_into_js(move || run_tick(&sink));
    match app
        .host
        .window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)
    {
        Ok(_) => app.tick_scheduled = true,
        Err(err) => warn!(target: LOG_TARGET, error = ?err, "setTimeout failed"),
    }
}

fn run_tick(sink: &Weak<RefCell<AppState>>) {
    let Some(state) = sink.upgrade() else {
        return;
    };
    let Ok(mut app) = state.try_borrow_mut() else {
        return;
    };
    app.tick_scheduled = false;
    let AppState { host, tips, .. } = &mut *app;
    let ran = tips.run_deferred(host);
    trace!(target: LOG_TARGET, ran, "tick drained");
    schedule_tick(sink, &mut app);
}

// ── JavaScript surface ──────────────────────────────────────────────────

/// Tooltips for a web page.
#[wasm_bindgen]
pub struct TooltipApp {
    state: Rc<RefCell<AppState>>,
}

impl TooltipApp {
    fn with_state<T>(&self, f: impl FnOnce(&mut AppState) -> T) -> Result<T, JsValue> {
        let mut app = self
            .state
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("tooltip app is busy"))?;
        let out = f(&mut app);
        schedule_tick(&Rc::downgrade(&self.state), &mut app);
        Ok(out)
    }

    fn bind(&self, element: Element, content: BindContent, class: Option<String>) -> Result<u32, JsValue> {
        self.with_state(|app| {
            let el = app.host.register_element(element);
            let content = match content {
                BindContent::Text(text) => ContentPayload::Text(text),
                BindContent::Template(template) => ContentPayload::Rich(app.host.register_template(template)),
            };
            let config = BindingConfig {
                content: Some(content),
                panel_class: class,
            };
            app.tips.bind(&mut app.host, el, config)
        })
        .and_then(|id| u32::try_from(id.get()).map_err(|_| JsValue::from_str("binding id overflow")))
    }
}

enum BindContent {
    Text(String),
    Template(HtmlTemplateElement),
}

#[wasm_bindgen]
impl TooltipApp {
    /// Attach to the current page.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<TooltipApp, JsValue> {
        let window = web_sys::window().ok_or(WebHostError::NoWindow)?;
        let document = window.document().ok_or(WebHostError::NoDocument)?;
        let body = document.body().ok_or(WebHostError::NoBody)?;
        let state = Rc::new_cyclic(|sink| {
            RefCell::new(AppState {
                host: DomHost::new(window, document, body, sink.clone()),
                tips: TooltipController::new(TooltipPolicy::default()),
                tick_scheduled: false,
            })
        });
        debug!(target: LOG_TARGET, "tooltip app attached");
        Ok(TooltipApp { state })
    }

    /// Bind a plain-text tooltip to `element`. Returns the binding id.
    #[wasm_bindgen(js_name = bindText)]
    pub fn bind_text(&self, element: Element, text: String, class: Option<String>) -> Result<u32, JsValue> {
        self.bind(element, BindContent::Text(text), class)
    }

    /// Bind a tooltip rendered from a `<template>` to `element`.
    #[wasm_bindgen(js_name = bindTemplate)]
    pub fn bind_template(
        &self,
        element: Element,
        template: HtmlTemplateElement,
        class: Option<String>,
    ) -> Result<u32, JsValue> {
        self.bind(element, BindContent::Template(template), class)
    }

    /// Replace a binding's text; `null` disables it.
    #[wasm_bindgen(js_name = setText)]
    pub fn set_text(&self, binding: u32, text: Option<String>) -> Result<bool, JsValue> {
        self.with_state(|app| {
            app.tips
                .set_content(BindingId::new(u64::from(binding)), text.map(ContentPayload::Text))
        })
    }

    /// Remove a binding and every listener it registered.
    pub fn unbind(&self, binding: u32) -> Result<bool, JsValue> {
        self.with_state(|app| {
            let id = BindingId::new(u64::from(binding));
            let element = app.tips.binding(id).map(|b| b.element());
            let removed = app.tips.unbind(&mut app.host, id);
            if let Some(element) = element
                && !app.tips.binding_ids().iter().any(|other| {
                    app.tips.binding(*other).is_some_and(|b| b.element() == element)
                })
                && let Err(err) = app.host.forget_element(element)
            {
                warn!(target: LOG_TARGET, %element, error = %err, "element handle already gone");
            }
            removed
        })
    }

    /// Close the open tooltip, if any.
    pub fn hide(&self) -> Result<bool, JsValue> {
        self.with_state(|app| app.tips.hide_tooltip(&mut app.host))
    }

    /// Whether a tooltip is open.
    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> Result<bool, JsValue> {
        self.with_state(|app| app.tips.overlay().is_open())
    }

    /// Unbind everything and remove any open panel.
    pub fn dispose(&self) -> Result<u32, JsValue> {
        self.with_state(|app| {
            let removed = app.tips.shutdown(&mut app.host);
            u32::try_from(removed).unwrap_or(u32::MAX)
        })
    }
}
