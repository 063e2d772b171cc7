#![forbid(unsafe_code)]

//! Hovertip error model and graceful degradation.
//!
//! Event handling never fails: the controller reports typed outcomes
//! instead. The errors gathered here come from the edges, loading a policy
//! or setting up a browser host, and each maps to a [`DegradationAction`]
//! so the embedder can keep the page usable.

use std::fmt;

use hovertip_runtime::PolicyConfigError;
#[cfg(feature = "web")]
use hovertip_web::WebHostError;

/// Top-level error type for Hovertip embedders.
///
/// Each variant wraps a domain-specific error. Use [`Error::degradation`] to
/// determine the appropriate recovery action.
#[derive(Debug)]
pub enum Error {
    /// Policy file could not be read, parsed or validated.
    Policy(PolicyConfigError),
    /// Browser host setup or a JavaScript call failed.
    #[cfg(feature = "web")]
    WebHost(WebHostError),
}

/// Standard result type for Hovertip APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// What the embedder should do when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// Continue with `TooltipPolicy::default()`.
    KeepDefaults,
    /// Drop the offending event or call and keep serving the rest.
    DropEvent,
    /// No usable host. Leave triggers without tooltips.
    DisableTooltips,
}

impl Error {
    /// Determine the graceful degradation action for this error.
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::Policy(_) => DegradationAction::KeepDefaults,
            #[cfg(feature = "web")]
            Self::WebHost(
                WebHostError::NoWindow | WebHostError::NoDocument | WebHostError::NoBody,
            ) => DegradationAction::DisableTooltips,
            #[cfg(feature = "web")]
            Self::WebHost(WebHostError::UnknownElement(_) | WebHostError::Js(_)) => {
                DegradationAction::DropEvent
            }
        }
    }

    /// Error type label for tracing fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Policy(_) => "policy",
            #[cfg(feature = "web")]
            Self::WebHost(_) => "web_host",
        }
    }

    /// Whether tooltips keep working after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.degradation(), DegradationAction::DisableTooltips)
    }
}

impl fmt::Display for DegradationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::KeepDefaults => "keep default policy",
            Self::DropEvent => "drop event",
            Self::DisableTooltips => "disable tooltips",
        };
        f.write_str(label)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Policy(e) => write!(f, "policy error: {e}"),
            #[cfg(feature = "web")]
            Self::WebHost(e) => write!(f, "web host error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Policy(e) => Some(e),
            #[cfg(feature = "web")]
            Self::WebHost(e) => Some(e),
        }
    }
}

impl From<PolicyConfigError> for Error {
    fn from(err: PolicyConfigError) -> Self {
        Self::Policy(err)
    }
}

#[cfg(feature = "web")]
impl From<WebHostError> for Error {
    fn from(err: WebHostError) -> Self {
        Self::WebHost(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use super::*;

    #[test]
    fn policy_errors_keep_defaults() {
        let err = Error::from(PolicyConfigError::Validation(vec![
            "placement.min_space_below must be finite".into(),
        ]));
        assert_eq!(err.degradation(), DegradationAction::KeepDefaults);
        assert!(err.is_recoverable());
        assert_eq!(err.error_type(), "policy");
        assert!(err.to_string().contains("min_space_below"));
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn policy_io_error_chains_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "hovertip.toml");
        let err = Error::from(PolicyConfigError::Io(io));
        let source = StdError::source(&err).expect("policy source");
        assert!(source.to_string().contains("hovertip.toml"));
    }

    #[cfg(feature = "web")]
    #[test]
    fn missing_page_disables_tooltips() {
        for host in [
            WebHostError::NoWindow,
            WebHostError::NoDocument,
            WebHostError::NoBody,
        ] {
            let err = Error::from(host);
            assert_eq!(err.degradation(), DegradationAction::DisableTooltips);
            assert!(!err.is_recoverable());
        }
    }

    #[cfg(feature = "web")]
    #[test]
    fn failed_calls_drop_the_event() {
        let err = Error::from(WebHostError::Js("TypeError".into()));
        assert_eq!(err.degradation(), DegradationAction::DropEvent);
        assert_eq!(err.error_type(), "web_host");
        assert_eq!(err.to_string(), "web host error: javascript error: TypeError");
        let err = Error::from(WebHostError::UnknownElement(7));
        assert_eq!(err.degradation(), DegradationAction::DropEvent);
    }

    #[test]
    fn degradation_actions_display() {
        assert_eq!(DegradationAction::KeepDefaults.to_string(), "keep default policy");
        assert_eq!(DegradationAction::DropEvent.to_string(), "drop event");
        assert_eq!(DegradationAction::DisableTooltips.to_string(), "disable tooltips");
    }
}
