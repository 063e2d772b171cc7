#![forbid(unsafe_code)]

//! Hovertip public facade crate.
//!
//! Re-exports the types most embedders need from the internal crates and
//! offers a small prelude. Hosts that want finer control can reach the
//! member crates through [`core`], [`runtime`], [`widgets`] and `web`.
//!
//! ```
//! use hovertip::prelude::*;
//!
//! let mut doc = MemoryDocument::new(1280.0, 800.0);
//! let save = doc.create_element(None, Rect::new(10.0, 10.0, 60.0, 24.0));
//! let mut tips = TooltipController::default();
//! let id = tips.bind(&mut doc, save, BindingConfig::new("Save"));
//! let enter = tips.binding(id).expect("bound").handlers().enter;
//! tips.dispatch(&mut doc, enter, &HostEvent::new(EventKind::MouseEnter));
//! assert!(tips.overlay().is_open());
//! ```

pub mod error;

// --- Core re-exports -------------------------------------------------------

pub use hovertip_core::content::{ContentMetrics, ContentPayload, TemplateRef};
pub use hovertip_core::device::{DeviceClass, TouchCapabilities};
pub use hovertip_core::element::ElementId;
pub use hovertip_core::event::{
    EventKind, HandlerId, HostEvent, ListenerPhase, ListenerSpec, ListenerTarget,
};
pub use hovertip_core::geometry::{Point, Rect};
pub use hovertip_core::host::{
    DeviceInfo, Geometry, Host, Listeners, MountRequest, NodeTree, Renderer, ViewId,
};
pub use hovertip_core::memory::MemoryDocument;
pub use hovertip_core::position::Placement;

// --- Runtime re-exports ----------------------------------------------------

pub use hovertip_runtime::{DeferredQueue, PolicyConfigError, TaskId, TooltipPolicy};

// --- Widget re-exports -----------------------------------------------------

pub use hovertip_widgets::{
    BindingConfig, BindingId, Dispatch, IgnoreReason, Outcome, OverlayManager, ShowOutcome,
    ShowRequest, TickReport, TooltipController,
};

// --- Web re-exports --------------------------------------------------------

#[cfg(feature = "web")]
pub use hovertip_web::WebHostError;
#[cfg(feature = "web")]
pub use hovertip_web::session::{HeadlessSession, SessionRecord};

// --- Errors ---------------------------------------------------------------

pub use error::{DegradationAction, Error, Result};

/// Prelude for day-to-day usage.
pub mod prelude {
    pub use crate::{
        BindingConfig, BindingId, ContentPayload, DegradationAction, Dispatch, ElementId, Error,
        EventKind, Host, HostEvent, MemoryDocument, Outcome, Rect, Result, ShowOutcome,
        ShowRequest, TooltipController, TooltipPolicy,
    };

    #[cfg(feature = "web")]
    pub use crate::HeadlessSession;

    pub use crate::{core, runtime, widgets};

    #[cfg(feature = "web")]
    pub use crate::web;
}

pub use hovertip_core as core;
pub use hovertip_runtime as runtime;
#[cfg(feature = "web")]
pub use hovertip_web as web;
pub use hovertip_widgets as widgets;
