#![forbid(unsafe_code)]

//! Policy-as-data configuration for tooltip behavior.
//!
//! Every tunable threshold lives in one [`TooltipPolicy`] that can be loaded
//! from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # hovertip.toml
//! [placement]
//! min_space_below = 240.0
//!
//! [scroll]
//! text_length_threshold = 80
//! ```
//!
//! ```rust,ignore
//! let policy = TooltipPolicy::from_toml_file("hovertip.toml")?;
//! let policy = TooltipPolicy::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `TooltipPolicy::default()` reproduces the stock behavior: prefer below
//! when at least 200px remain, text over 100 characters scrolls before
//! render, and a rendered height over 200px or text over 600 characters
//! scrolls after render.

#[cfg(feature = "policy-config")]
use std::path::Path;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level TooltipPolicy
// ---------------------------------------------------------------------------

/// Top-level tooltip policy.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct TooltipPolicy {
    /// Above/below placement.
    pub placement: PlacementPolicy,

    /// Scrollability thresholds.
    pub scroll: ScrollPolicy,

    /// Touch handling.
    pub touch: TouchPolicy,

    /// Outside-click dismissal.
    pub dismiss: DismissPolicy,
}

impl TooltipPolicy {
    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyConfigError> {
        toml::from_str(s).map_err(PolicyConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, PolicyConfigError> {
        serde_json::from_str(s).map_err(PolicyConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the policy
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let below = self.placement.min_space_below;
        if !below.is_finite() || below < 0.0 {
            errors.push(format!(
                "placement.min_space_below must be finite and >= 0, got {below}"
            ));
        }

        if self.scroll.text_length_threshold == 0 {
            errors.push("scroll.text_length_threshold must be > 0".into());
        }

        let height = self.scroll.rendered_height_threshold;
        if !height.is_finite() || height <= 0.0 {
            errors.push(format!(
                "scroll.rendered_height_threshold must be finite and > 0, got {height}"
            ));
        }

        if self.scroll.rendered_text_threshold == 0 {
            errors.push("scroll.rendered_text_threshold must be > 0".into());
        }

        // A rendered threshold below the pre-render one would flip text that
        // scrolled before render back to fixed after render.
        if self.scroll.rendered_text_threshold < self.scroll.text_length_threshold {
            errors.push(format!(
                "scroll.rendered_text_threshold ({}) must be >= scroll.text_length_threshold ({})",
                self.scroll.rendered_text_threshold, self.scroll.text_length_threshold
            ));
        }

        errors
    }

    /// Validate and convert to a `Result`.
    pub fn validated(self) -> Result<Self, PolicyConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(PolicyConfigError::Validation(errors))
        }
    }

    /// One-line JSON summary for logs.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"schema":"hovertip-policy-v1","min_space_below":{},"text_length_threshold":{},"rendered_height_threshold":{},"rendered_text_threshold":{},"touch_prevent_default":{},"outside_click_capture":{}}}"#,
            self.placement.min_space_below,
            self.scroll.text_length_threshold,
            self.scroll.rendered_height_threshold,
            self.scroll.rendered_text_threshold,
            self.touch.prevent_default,
            self.dismiss.outside_click_capture,
        )
    }
}

// ---------------------------------------------------------------------------
// Sub-policies (flat, serde-friendly)
// ---------------------------------------------------------------------------

/// Placement parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct PlacementPolicy {
    /// Space below the trigger (px) that always suffices for placing the
    /// panel below. Default: 200.
    pub min_space_below: f64,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            min_space_below: 200.0,
        }
    }
}

/// Scrollability thresholds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct ScrollPolicy {
    /// Text longer than this many characters scrolls before render. Default: 100.
    pub text_length_threshold: usize,
    /// Rendered scroll height (px) above which content scrolls. Default: 200.
    pub rendered_height_threshold: f64,
    /// Rendered text longer than this scrolls. Default: 600.
    pub rendered_text_threshold: usize,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            text_length_threshold: 100,
            rendered_height_threshold: 200.0,
            rendered_text_threshold: 600,
        }
    }
}

/// Touch handling.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct TouchPolicy {
    /// Suppress the browser's default touch behavior on a handled tap.
    /// Default: true.
    pub prevent_default: bool,
}

impl Default for TouchPolicy {
    fn default() -> Self {
        Self {
            prevent_default: true,
        }
    }
}

/// Outside-click dismissal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct DismissPolicy {
    /// Register the document click listener in the capture phase. Default: true.
    pub outside_click_capture: bool,
}

impl Default for DismissPolicy {
    fn default() -> Self {
        Self {
            outside_click_capture: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating a [`TooltipPolicy`].
#[derive(Debug)]
pub enum PolicyConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "policy-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for PolicyConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for PolicyConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
