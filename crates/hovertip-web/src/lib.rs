#![forbid(unsafe_code)]

//! `hovertip-web` hosts the tooltip controller.
//!
//! Design goals:
//! - **Host-driven**: the embedding environment pushes events and advances
//!   ticks explicitly.
//! - **Deterministic**: a [`HeadlessSession`](session::HeadlessSession)
//!   records every input as a [`SessionRecord`](session::SessionRecord) and
//!   replays it to the same records.
//! - **No threads**: suitable for `wasm32-unknown-unknown`.
//!
//! On `wasm32` the [`dom`] module wraps `web-sys` and exports `TooltipApp`
//! through `wasm-bindgen`.

pub mod registry;
pub mod session;

#[cfg(target_arch = "wasm32")]
pub mod dom;

/// DOM host setup and runtime errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebHostError {
    /// No global `window`.
    NoWindow,
    /// `window.document` is missing.
    NoDocument,
    /// `document.body` is missing.
    NoBody,
    /// The element handle is not registered with this host.
    UnknownElement(u64),
    /// A JavaScript call threw.
    Js(String),
}

impl core::fmt::Display for WebHostError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoWindow => write!(f, "no global window"),
            Self::NoDocument => write!(f, "window has no document"),
            Self::NoBody => write!(f, "document has no body"),
            Self::UnknownElement(id) => write!(f, "unknown element handle {id}"),
            Self::Js(msg) => write!(f, "javascript error: {msg}"),
        }
    }
}

impl std::error::Error for WebHostError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_their_cause() {
        assert_eq!(WebHostError::NoBody.to_string(), "document has no body");
        assert_eq!(
            WebHostError::UnknownElement(7).to_string(),
            "unknown element handle 7"
        );
        assert_eq!(
            WebHostError::Js("boom".into()).to_string(),
            "javascript error: boom"
        );
    }
}
