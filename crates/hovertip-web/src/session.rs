#![forbid(unsafe_code)]

//! Deterministic headless sessions with JSONL recording and replay.
//!
//! A [`HeadlessSession`] drives a [`TooltipController`] against a
//! [`MemoryDocument`]. Every mutation and input is appended to the session
//! log as a [`SessionRecord`], together with the outcome labels it
//! produced. [`replay`] feeds a log through a fresh session and reports the
//! first record that differs.
//!
//! # Record stream
//!
//! - **Header**: schema, viewport and touch capabilities (always first).
//! - **Element / Template / Viewport / Touch / RemoveElement**: document
//!   setup and changes.
//! - **Bind / SetContent / Unbind**: binding lifecycle.
//! - **Input**: a host event fired along the dispatch path.
//! - **Show / Hide**: direct manager calls.
//! - **Tick**: one drain of the deferred queue.
//! - **Summary**: written by [`HeadlessSession::finish`] (always last).
//!
//! # Example
//!
//! ```
//! use hovertip_core::geometry::Rect;
//! use hovertip_web::session::{HeadlessSession, replay};
//! use hovertip_runtime::TooltipPolicy;
//! use hovertip_widgets::trigger::BindingConfig;
//!
//! let mut session = HeadlessSession::new(1024.0, 768.0);
//! let button = session.create_element(None, Rect::new(100.0, 100.0, 80.0, 24.0));
//! session.bind(button, BindingConfig::new("Save"));
//! session.mouse_enter(button);
//! session.advance_tick();
//! let records = session.finish();
//!
//! let result = replay(&records, TooltipPolicy::default()).unwrap();
//! assert!(result.ok());
//! ```

use hovertip_core::content::{ContentPayload, TemplateRef};
use hovertip_core::device::TouchCapabilities;
use hovertip_core::element::ElementId;
use hovertip_core::event::{EventKind, HandlerId, HostEvent, ListenerPhase, ListenerTarget};
use hovertip_core::geometry::Rect;
use hovertip_core::memory::MemoryDocument;
use hovertip_runtime::TooltipPolicy;
use hovertip_widgets::controller::{Dispatch, TickReport, TooltipController};
use hovertip_widgets::overlay::{ShowOutcome, ShowRequest};
use hovertip_widgets::trigger::{BindingConfig, BindingId};
use serde::{Deserialize, Serialize};

/// Schema version written in every header.
pub const SCHEMA_VERSION: &str = "hovertip-session-v1";

const LOG_TARGET: &str = "hovertip_web::session";

/// Serialized element rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<Rect> for RecordedRect {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        }
    }
}

impl From<RecordedRect> for Rect {
    fn from(r: RecordedRect) -> Self {
        Rect::new(r.x, r.y, r.width, r.height)
    }
}

/// Serialized content payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordedContent {
    Text { text: String },
    Template { template: u64 },
}

impl From<&ContentPayload> for RecordedContent {
    fn from(content: &ContentPayload) -> Self {
        match content {
            ContentPayload::Text(text) => Self::Text { text: text.clone() },
            ContentPayload::Rich(template) => Self::Template {
                template: template.get(),
            },
        }
    }
}

impl From<RecordedContent> for ContentPayload {
    fn from(content: RecordedContent) -> Self {
        match content {
            RecordedContent::Text { text } => Self::Text(text),
            RecordedContent::Template { template } => Self::Rich(TemplateRef::new(template)),
        }
    }
}

/// One line of a session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionRecord {
    Header {
        schema: String,
        viewport_width: f64,
        viewport_height: f64,
        touch_events: bool,
        max_touch_points: u32,
    },
    Element {
        element: u64,
        parent: Option<u64>,
        rect: RecordedRect,
    },
    RemoveElement {
        element: u64,
        removed: bool,
    },
    Template {
        template: u64,
        text: String,
    },
    Viewport {
        width: f64,
        height: f64,
    },
    Touch {
        touch_events: bool,
        max_touch_points: u32,
    },
    Bind {
        binding: u64,
        element: u64,
        content: Option<RecordedContent>,
        class: Option<String>,
    },
    SetContent {
        binding: u64,
        content: Option<RecordedContent>,
        applied: bool,
    },
    Unbind {
        binding: u64,
        removed: bool,
    },
    Input {
        tick: u64,
        event: String,
        target: Option<u64>,
        outcomes: Vec<String>,
        default_prevented: bool,
    },
    Show {
        tick: u64,
        trigger: u64,
        content: RecordedContent,
        class: Option<String>,
        outcome: String,
    },
    Hide {
        tick: u64,
        closed: bool,
    },
    Tick {
        tick: u64,
        outcomes: Vec<String>,
        skipped: usize,
    },
    Summary {
        ticks: u64,
        opened: u64,
        disposed: u64,
        live_listeners: usize,
        live_views: usize,
    },
}

impl SessionRecord {
    /// Serialize as one JSON line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Result of firing one host event.
#[derive(Debug, Clone, PartialEq)]
pub struct InputReport {
    /// Dispatches in path order. Handlers removed earlier in the same
    /// dispatch are skipped.
    pub dispatches: Vec<Dispatch>,
    /// Whether any handler asked to suppress the default action.
    pub default_prevented: bool,
}

/// A host-driven tooltip session over an in-memory document.
#[derive(Debug)]
pub struct HeadlessSession {
    doc: MemoryDocument,
    tips: TooltipController,
    records: Vec<SessionRecord>,
    tick: u64,
}

impl HeadlessSession {
    /// A pointer-device session with the default policy.
    #[must_use]
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self::with_policy(
            viewport_width,
            viewport_height,
            TouchCapabilities::NONE,
            TooltipPolicy::default(),
        )
    }

    /// A session with explicit touch capabilities and policy.
    #[must_use]
    pub fn with_policy(
        viewport_width: f64,
        viewport_height: f64,
        touch: TouchCapabilities,
        policy: TooltipPolicy,
    ) -> Self {
        let doc = MemoryDocument::new(viewport_width, viewport_height).with_touch(touch);
        let header = SessionRecord::Header {
            schema: SCHEMA_VERSION.to_owned(),
            viewport_width,
            viewport_height,
            touch_events: touch.touch_events,
            max_touch_points: touch.max_touch_points,
        };
        tracing::debug!(
            target: LOG_TARGET,
            viewport_width,
            viewport_height,
            touch = touch.device_class().is_touch(),
            "session started"
        );
        Self {
            doc,
            tips: TooltipController::new(policy),
            records: vec![header],
            tick: 0,
        }
    }

    #[must_use]
    pub const fn document(&self) -> &MemoryDocument {
        &self.doc
    }

    /// Mutable document access for adjustments that are not recorded, such
    /// as pinning view metrics.
    pub fn document_mut(&mut self) -> &mut MemoryDocument {
        &mut self.doc
    }

    #[must_use]
    pub const fn controller(&self) -> &TooltipController {
        &self.tips
    }

    #[must_use]
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    /// Ticks advanced so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Serialize the log so far as JSONL.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.to_jsonl()?);
            out.push('\n');
        }
        Ok(out)
    }

    // --- Document ------------------------------------------------------

    pub fn create_element(&mut self, parent: Option<ElementId>, rect: Rect) -> ElementId {
        let element = self.doc.create_element(parent, rect);
        self.records.push(SessionRecord::Element {
            element: element.get(),
            parent: parent.map(ElementId::get),
            rect: rect.into(),
        });
        element
    }

    pub fn remove_element(&mut self, element: ElementId) -> bool {
        let removed = self.doc.remove_element(element);
        self.records.push(SessionRecord::RemoveElement {
            element: element.get(),
            removed,
        });
        removed
    }

    pub fn register_template(&mut self, text: impl Into<String>) -> TemplateRef {
        let text = text.into();
        let template = self.doc.register_template(text.clone());
        self.records.push(SessionRecord::Template {
            template: template.get(),
            text,
        });
        template
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.doc.set_viewport(width, height);
        self.records.push(SessionRecord::Viewport { width, height });
    }

    pub fn set_touch(&mut self, touch: TouchCapabilities) {
        self.doc.set_touch(touch);
        self.records.push(SessionRecord::Touch {
            touch_events: touch.touch_events,
            max_touch_points: touch.max_touch_points,
        });
    }

    // --- Bindings ------------------------------------------------------

    pub fn bind(&mut self, element: ElementId, config: BindingConfig) -> BindingId {
        let record_content = config.content.as_ref().map(RecordedContent::from);
        let class = config.panel_class.clone();
        let binding = self.tips.bind(&mut self.doc, element, config);
        self.records.push(SessionRecord::Bind {
            binding: binding.get(),
            element: element.get(),
            content: record_content,
            class,
        });
        binding
    }

    pub fn set_content(&mut self, binding: BindingId, content: Option<ContentPayload>) -> bool {
        let recorded = content.as_ref().map(RecordedContent::from);
        let applied = self.tips.set_content(binding, content);
        self.records.push(SessionRecord::SetContent {
            binding: binding.get(),
            content: recorded,
            applied,
        });
        applied
    }

    pub fn unbind(&mut self, binding: BindingId) -> bool {
        let removed = self.tips.unbind(&mut self.doc, binding);
        self.records.push(SessionRecord::Unbind {
            binding: binding.get(),
            removed,
        });
        removed
    }

    // --- Input ---------------------------------------------------------

    pub fn mouse_enter(&mut self, element: ElementId) -> InputReport {
        self.fire(EventKind::MouseEnter, Some(element))
    }

    pub fn mouse_leave(&mut self, element: ElementId) -> InputReport {
        self.fire(EventKind::MouseLeave, Some(element))
    }

    pub fn touch_start(&mut self, element: ElementId) -> InputReport {
        self.fire(EventKind::TouchStart, Some(element))
    }

    /// Click at `target`, or on the bare document when `None`.
    pub fn click(&mut self, target: Option<ElementId>) -> InputReport {
        self.fire(EventKind::Click, target)
    }

    /// Fire `kind` at `target` along the document's dispatch path.
    pub fn fire(&mut self, kind: EventKind, target: Option<ElementId>) -> InputReport {
        let path = match target {
            Some(element) => self.doc.dispatch_path(kind, element),
            None => self.document_path(kind),
        };
        let event = HostEvent { kind, target };
        let mut dispatches = Vec::with_capacity(path.len());
        for handler in path {
            let live = self
                .doc
                .live_listeners()
                .iter()
                .any(|s| s.handler == handler && s.kind == kind);
            if !live {
                tracing::trace!(target: LOG_TARGET, %handler, "handler removed mid-dispatch");
                continue;
            }
            dispatches.push(self.tips.dispatch(&mut self.doc, handler, &event));
        }
        let default_prevented = dispatches.iter().any(|d| d.default_prevented);
        let outcomes: Vec<String> = dispatches
            .iter()
            .map(|d| d.outcome.label().to_owned())
            .collect();
        tracing::debug!(
            target: LOG_TARGET,
            tick = self.tick,
            event = kind.dom_name(),
            target_element = ?target.map(ElementId::get),
            ?outcomes,
            default_prevented,
            "input dispatched"
        );
        self.records.push(SessionRecord::Input {
            tick: self.tick,
            event: kind.dom_name().to_owned(),
            target: target.map(ElementId::get),
            outcomes,
            default_prevented,
        });
        InputReport {
            dispatches,
            default_prevented,
        }
    }

    fn document_path(&self, kind: EventKind) -> Vec<HandlerId> {
        let mut path = Vec::new();
        for phase in [ListenerPhase::Capture, ListenerPhase::Bubble] {
            path.extend(
                self.doc
                    .live_listeners()
                    .iter()
                    .filter(|s| s.target == ListenerTarget::Document && s.kind == kind && s.phase == phase)
                    .map(|s| s.handler),
            );
        }
        path
    }

    // --- Overlay -------------------------------------------------------

    pub fn show(&mut self, request: ShowRequest) -> ShowOutcome {
        let trigger = request.trigger.get();
        let content = RecordedContent::from(&request.content);
        let class = request.panel_class.clone();
        let outcome = self.tips.show_tooltip(&mut self.doc, request);
        let label = hovertip_widgets::controller::Outcome::Shown(outcome).label();
        self.records.push(SessionRecord::Show {
            tick: self.tick,
            trigger,
            content,
            class,
            outcome: label.to_owned(),
        });
        outcome
    }

    pub fn hide(&mut self) -> bool {
        let closed = self.tips.hide_tooltip(&mut self.doc);
        self.records.push(SessionRecord::Hide {
            tick: self.tick,
            closed,
        });
        closed
    }

    /// Advance one tick and run the deferred work queued before it.
    pub fn advance_tick(&mut self) -> TickReport {
        self.tick += 1;
        let report = self.tips.run_deferred_report(&mut self.doc);
        let outcomes: Vec<String> = report
            .outcomes
            .iter()
            .map(|(_, outcome)| outcome.label().to_owned())
            .collect();
        tracing::debug!(
            target: LOG_TARGET,
            tick = self.tick,
            ran = report.ran(),
            skipped = report.skipped,
            "tick advanced"
        );
        self.records.push(SessionRecord::Tick {
            tick: self.tick,
            outcomes,
            skipped: report.skipped,
        });
        report
    }

    /// Shut the controller down and return the complete log.
    pub fn finish(mut self) -> Vec<SessionRecord> {
        self.tips.shutdown(&mut self.doc);
        let stats = self.tips.overlay().stats();
        self.records.push(SessionRecord::Summary {
            ticks: self.tick,
            opened: stats.opened,
            disposed: stats.disposed,
            live_listeners: self.doc.live_listeners().len(),
            live_views: self.doc.live_view_count(),
        });
        tracing::debug!(
            target: LOG_TARGET,
            ticks = self.tick,
            records = self.records.len(),
            "session finished"
        );
        self.records
    }
}

// ── Replay ──────────────────────────────────────────────────────────────

/// Why a log could not be replayed.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayError {
    /// The first record is not a header.
    MissingHeader,
    /// The header names a different schema.
    SchemaMismatch(String),
    /// An input record names an unknown event type.
    UnknownEvent(String),
    /// A replayed id differs from the recorded one.
    IdMismatch { index: usize, expected: u64, actual: u64 },
    /// A record after the summary.
    TrailingRecords(usize),
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "session log does not start with a header"),
            Self::SchemaMismatch(schema) => {
                write!(f, "schema {schema:?} is not {SCHEMA_VERSION:?}")
            }
            Self::UnknownEvent(event) => write!(f, "unknown event type {event:?}"),
            Self::IdMismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "record {index}: replay produced id {actual}, log has {expected}"
            ),
            Self::TrailingRecords(index) => write!(f, "record {index} follows the summary"),
        }
    }
}

impl std::error::Error for ReplayError {}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayResult {
    /// Records produced by the replay.
    pub records: Vec<SessionRecord>,
    /// Index of the first record that differs from the log.
    pub first_mismatch: Option<usize>,
}

impl ReplayResult {
    /// Whether the replay reproduced the log exactly.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

fn check_id(index: usize, expected: u64, actual: u64) -> Result<(), ReplayError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ReplayError::IdMismatch {
            index,
            expected,
            actual,
        })
    }
}

/// Feed `records` through a fresh session under `policy`.
pub fn replay(records: &[SessionRecord], policy: TooltipPolicy) -> Result<ReplayResult, ReplayError> {
    let Some(SessionRecord::Header {
        schema,
        viewport_width,
        viewport_height,
        touch_events,
        max_touch_points,
    }) = records.first()
    else {
        return Err(ReplayError::MissingHeader);
    };
    if schema != SCHEMA_VERSION {
        return Err(ReplayError::SchemaMismatch(schema.clone()));
    }
    let touch = TouchCapabilities {
        touch_events: *touch_events,
        max_touch_points: *max_touch_points,
    };
    let mut session = HeadlessSession::with_policy(*viewport_width, *viewport_height, touch, policy);
    let mut summarized = false;

    for (index, record) in records.iter().enumerate().skip(1) {
        if summarized {
            return Err(ReplayError::TrailingRecords(index));
        }
        match record {
            SessionRecord::Header { .. } => return Err(ReplayError::TrailingRecords(index)),
            SessionRecord::Element {
                element,
                parent,
                rect,
            } => {
                let id = session.create_element(parent.map(ElementId::new), (*rect).into());
                check_id(index, *element, id.get())?;
            }
            SessionRecord::RemoveElement { element, .. } => {
                session.remove_element(ElementId::new(*element));
            }
            SessionRecord::Template { template, text } => {
                let id = session.register_template(text.clone());
                check_id(index, *template, id.get())?;
            }
            SessionRecord::Viewport { width, height } => session.set_viewport(*width, *height),
            SessionRecord::Touch {
                touch_events,
                max_touch_points,
            } => session.set_touch(TouchCapabilities {
                touch_events: *touch_events,
                max_touch_points: *max_touch_points,
            }),
            SessionRecord::Bind {
                binding,
                element,
                content,
                class,
            } => {
                let config = BindingConfig {
                    content: content.clone().map(ContentPayload::from),
                    panel_class: class.clone(),
                };
                let id = session.bind(ElementId::new(*element), config);
                check_id(index, *binding, id.get())?;
            }
            SessionRecord::SetContent {
                binding, content, ..
            } => {
                session.set_content(
                    BindingId::new(*binding),
                    content.clone().map(ContentPayload::from),
                );
            }
            SessionRecord::Unbind { binding, .. } => {
                session.unbind(BindingId::new(*binding));
            }
            SessionRecord::Input { event, target, .. } => {
                let kind = EventKind::from_dom_name(event)
                    .ok_or_else(|| ReplayError::UnknownEvent(event.clone()))?;
                session.fire(kind, target.map(ElementId::new));
            }
            SessionRecord::Show {
                trigger,
                content,
                class,
                ..
            } => {
                session.show(ShowRequest {
                    trigger: ElementId::new(*trigger),
                    content: content.clone().into(),
                    panel_class: class.clone(),
                });
            }
            SessionRecord::Hide { .. } => {
                session.hide();
            }
            SessionRecord::Tick { .. } => {
                session.advance_tick();
            }
            SessionRecord::Summary { .. } => summarized = true,
        }
    }

    let produced = if summarized {
        session.finish()
    } else {
        session.records
    };
    let first_mismatch = records
        .iter()
        .zip(&produced)
        .position(|(a, b)| a != b)
        .or_else(|| (records.len() != produced.len()).then(|| records.len().min(produced.len())));
    if let Some(index) = first_mismatch {
        tracing::warn!(target: LOG_TARGET, index, "replay diverged");
    }
    Ok(ReplayResult {
        records: produced,
        first_mismatch,
    })
}
