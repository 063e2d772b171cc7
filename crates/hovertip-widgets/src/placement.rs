//! Above/below placement for tooltip panels.
//!
//! [`PlacementResolver`] makes a one-shot decision at open time from the
//! trigger's live bounding rectangle and the viewport height:
//!
//! - `space_below = viewport_height - trigger.bottom`
//! - `space_above = trigger.top`
//! - below when `space_below >= min_space_below` or `space_below >= space_above`,
//!   otherwise above.
//!
//! Ties go below. There is no reflow after the panel is mounted.
//!
//! # Example
//!
//! ```
//! use hovertip_core::geometry::Rect;
//! use hovertip_core::position::Placement;
//! use hovertip_widgets::placement::PlacementResolver;
//!
//! let resolver = PlacementResolver::default();
//! let trigger = Rect::new(0.0, 700.0, 80.0, 20.0);
//! assert_eq!(resolver.resolve(trigger, 768.0).placement, Placement::AboveCentered);
//! ```

#![forbid(unsafe_code)]

use hovertip_core::geometry::Rect;
use hovertip_core::position::{OverlayPosition, Placement};
use hovertip_runtime::PlacementPolicy;

/// Space on either side of a trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailableSpace {
    /// Pixels between the trigger's bottom edge and the viewport bottom.
    pub below: f64,
    /// Pixels between the viewport top and the trigger's top edge.
    pub above: f64,
}

impl AvailableSpace {
    /// Measure the space around `trigger` in a viewport of `viewport_height`.
    #[must_use]
    pub fn around(trigger: Rect, viewport_height: f64) -> Self {
        Self {
            below: viewport_height - trigger.bottom(),
            above: trigger.top(),
        }
    }
}

/// A resolved placement and the measurements behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementDecision {
    pub placement: Placement,
    pub space: AvailableSpace,
    pub position: OverlayPosition,
}

/// Two-case placement heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementResolver {
    /// Space below that always suffices for placing the panel below.
    pub min_space_below: f64,
}

impl Default for PlacementResolver {
    fn default() -> Self {
        Self::from_policy(&PlacementPolicy::default())
    }
}

impl PlacementResolver {
    /// Build from a policy.
    #[must_use]
    pub fn from_policy(policy: &PlacementPolicy) -> Self {
        Self {
            min_space_below: policy.min_space_below,
        }
    }

    /// Choose a side for `trigger`.
    #[must_use]
    pub fn resolve(&self, trigger: Rect, viewport_height: f64) -> PlacementDecision {
        let space = AvailableSpace::around(trigger, viewport_height);
        let placement = if space.below >= self.min_space_below || space.below >= space.above {
            Placement::BelowCentered
        } else {
            Placement::AboveCentered
        };
        PlacementDecision {
            placement,
            space,
            position: OverlayPosition::resolve(placement, trigger),
        }
    }
}
