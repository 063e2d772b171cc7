#![forbid(unsafe_code)]

//! Connected overlay positions.
//!
//! An overlay is connected to its trigger by pairing a point on the trigger
//! (the origin) with a point on the overlay panel. `BelowCentered` pairs the
//! trigger's bottom-center with the panel's top-center, so the panel grows
//! downward; `AboveCentered` pairs top-center with bottom-center.

use crate::geometry::{Point, Rect};

/// Which side of the trigger the panel sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Above the trigger, horizontally centered.
    AboveCentered,
    /// Below the trigger, horizontally centered.
    BelowCentered,
}

impl Placement {
    /// The connection points for this placement.
    #[must_use]
    pub const fn connection(self) -> ConnectedPosition {
        match self {
            Self::BelowCentered => ConnectedPosition {
                origin_x: HorizontalAnchor::Center,
                origin_y: VerticalAnchor::Bottom,
                overlay_x: HorizontalAnchor::Center,
                overlay_y: VerticalAnchor::Top,
            },
            Self::AboveCentered => ConnectedPosition {
                origin_x: HorizontalAnchor::Center,
                origin_y: VerticalAnchor::Top,
                overlay_x: HorizontalAnchor::Center,
                overlay_y: VerticalAnchor::Bottom,
            },
        }
    }

    /// Whether the panel grows downward.
    #[must_use]
    pub const fn is_below(self) -> bool {
        matches!(self, Self::BelowCentered)
    }

    /// Short label for logs and CSS hooks.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AboveCentered => "above",
            Self::BelowCentered => "below",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAnchor {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

/// Origin/overlay anchor pairing, in the vocabulary of connected overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectedPosition {
    pub origin_x: HorizontalAnchor,
    pub origin_y: VerticalAnchor,
    pub overlay_x: HorizontalAnchor,
    pub overlay_y: VerticalAnchor,
}

impl ConnectedPosition {
    /// The origin point on `trigger`.
    #[must_use]
    pub fn origin_point(&self, trigger: Rect) -> Point {
        let x = match self.origin_x {
            HorizontalAnchor::Start => trigger.left(),
            HorizontalAnchor::Center => trigger.center_x(),
            HorizontalAnchor::End => trigger.right(),
        };
        let y = match self.origin_y {
            VerticalAnchor::Top => trigger.top(),
            VerticalAnchor::Center => trigger.y + trigger.height / 2.0,
            VerticalAnchor::Bottom => trigger.bottom(),
        };
        Point::new(x, y)
    }

    /// Translation, as fractions of the panel size, that moves the panel's
    /// anchor point onto the origin. `(-0.5, -1.0)` is CSS
    /// `translate(-50%, -100%)`.
    #[must_use]
    pub const fn overlay_offset(&self) -> (f64, f64) {
        let dx = match self.overlay_x {
            HorizontalAnchor::Start => 0.0,
            HorizontalAnchor::Center => -0.5,
            HorizontalAnchor::End => -1.0,
        };
        let dy = match self.overlay_y {
            VerticalAnchor::Top => 0.0,
            VerticalAnchor::Center => -0.5,
            VerticalAnchor::Bottom => -1.0,
        };
        (dx, dy)
    }
}

/// A resolved overlay position: the side chosen and the origin point the
/// panel's anchor is pinned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPosition {
    pub placement: Placement,
    pub connection: ConnectedPosition,
    pub origin: Point,
}

impl OverlayPosition {
    /// Resolve `placement` against a trigger rectangle.
    #[must_use]
    pub fn resolve(placement: Placement, trigger: Rect) -> Self {
        let connection = placement.connection();
        Self {
            placement,
            connection,
            origin: connection.origin_point(trigger),
        }
    }
}
