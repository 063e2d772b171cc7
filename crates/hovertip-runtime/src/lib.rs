#![forbid(unsafe_code)]

//! Hovertip Runtime
//!
//! Deferred-work plumbing and configuration shared by the tooltip widgets
//! and the hosts that drive them.
//!
//! # Key Components
//!
//! - [`CancellationSource`] / [`CancellationToken`] - Cooperative cancellation for queued work
//! - [`DeferredQueue`] - FIFO next-tick task queue driven by the host
//! - [`TooltipPolicy`] - Every tunable threshold as data, loadable from TOML/JSON
//!
//! # Role in Hovertip
//! The widgets crate never schedules timers itself. It pushes
//! [`DeferredQueue`] tasks and the host decides when a tick happens: a
//! `setTimeout(0)` in a browser, an explicit `advance_tick` in a headless
//! session.

pub mod cancellation;
pub mod policy_config;
pub mod scheduler;

pub use cancellation::{CancellationSource, CancellationToken};
pub use policy_config::{
    DismissPolicy, PlacementPolicy, PolicyConfigError, ScrollPolicy, TooltipPolicy, TouchPolicy,
};
pub use scheduler::{DeferredQueue, SchedulerStats, TaskId, TickBatch};
