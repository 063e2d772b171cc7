#![forbid(unsafe_code)]

//! Core: geometry, events, content payloads and host collaborator traits.
//!
//! # Role in Hovertip
//! `hovertip-core` is the vocabulary layer. It defines the values that flow
//! between a host environment (a browser document, or the headless
//! [`memory::MemoryDocument`]) and the tooltip state machine in
//! `hovertip-widgets`.
//!
//! # Primary responsibilities
//! - **Geometry**: [`geometry::Rect`] in viewport coordinates.
//! - **Events**: listener identity ([`event::ListenerSpec`]) and delivered
//!   events ([`event::HostEvent`]).
//! - **Content**: text or host-rendered rich payloads and their measured
//!   metrics.
//! - **Positions**: connected overlay placements above/below a trigger.
//! - **Host traits**: [`host::Host`] and its five collaborators.
//!
//! # How it fits in the system
//! Nothing here holds tooltip state. The widgets crate drives a
//! [`host::Host`]; the web crate provides a browser host and a headless
//! session built on [`memory::MemoryDocument`].

pub mod content;
pub mod device;
pub mod element;
pub mod event;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod memory;
pub mod position;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
