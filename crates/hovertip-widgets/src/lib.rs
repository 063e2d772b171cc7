#![forbid(unsafe_code)]

//! Tooltip behaviour for Hovertip.
//!
//! # Role in Hovertip
//! `hovertip-widgets` is where tooltips actually happen. It turns host events
//! into overlay operations against the collaborator traits defined in
//! `hovertip-core`, using the scheduling and policy types from
//! `hovertip-runtime`.
//!
//! # Layers
//! - [`placement`] and [`scroll`]: pure decisions (above/below, scrollable).
//! - [`listener`]: paired attach/detach of one listener registration.
//! - [`surface`]: one mounted overlay pane and its post-mount step.
//! - [`overlay`]: the single-overlay manager.
//! - [`trigger`]: per-element bindings.
//! - [`controller`]: the application-facing owner of all of the above.

pub mod controller;
pub mod listener;
pub mod overlay;
pub mod placement;
pub mod scroll;
pub mod surface;
pub mod task;
pub mod trigger;

pub use controller::{Dispatch, IgnoreReason, Outcome, TickReport, TooltipController};
pub use overlay::{OverlayManager, ShowOutcome, ShowRequest};
pub use trigger::{BindingConfig, BindingId};
