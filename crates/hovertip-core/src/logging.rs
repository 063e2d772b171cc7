#![forbid(unsafe_code)]

//! Logging facade.
//!
//! With the `tracing` feature these are the `tracing` macros. Without it the
//! same names expand to nothing, so call sites never need their own
//! `#[cfg(feature = "tracing")]` guards.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

#[cfg(not(feature = "tracing"))]
mod noop {
    #[doc(hidden)]
    #[macro_export]
    macro_rules! __hovertip_noop_event {
        ($($arg:tt)*) => {{}};
    }

    #[doc(hidden)]
    #[macro_export]
    macro_rules! __hovertip_noop_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

#[cfg(not(feature = "tracing"))]
pub use crate::{
    __hovertip_noop_event as debug, __hovertip_noop_event as error,
    __hovertip_noop_event as info, __hovertip_noop_event as trace,
    __hovertip_noop_event as warn, __hovertip_noop_span as debug_span,
    __hovertip_noop_span as error_span, __hovertip_noop_span as info_span,
    __hovertip_noop_span as trace_span, __hovertip_noop_span as warn_span,
};

/// Stand-in for `tracing::Span` when logging is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Matches `Span::entered`; the guard does nothing.
    #[must_use]
    pub const fn entered(self) -> Self {
        self
    }
}
