#![forbid(unsafe_code)]

//! Input device classification.

/// Touch support reported by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchCapabilities {
    /// The runtime exposes touch events (`'ontouchstart' in window`).
    pub touch_events: bool,
    /// `navigator.maxTouchPoints`.
    pub max_touch_points: u32,
}

impl TouchCapabilities {
    /// A mouse-only desktop.
    pub const NONE: Self = Self {
        touch_events: false,
        max_touch_points: 0,
    };

    /// A typical phone or tablet.
    pub const TOUCHSCREEN: Self = Self {
        touch_events: true,
        max_touch_points: 5,
    };

    /// Classify the device.
    #[must_use]
    pub const fn device_class(self) -> DeviceClass {
        if self.touch_events || self.max_touch_points > 0 {
            DeviceClass::Touch
        } else {
            DeviceClass::Pointer
        }
    }
}

/// Which interaction path a trigger uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceClass {
    /// Hover-capable pointer; enter/leave drive the tooltip.
    #[default]
    Pointer,
    /// Touch-capable; taps drive the tooltip and hover events are ignored.
    Touch,
}

impl DeviceClass {
    /// Whether hover handlers should be skipped.
    #[must_use]
    pub const fn is_touch(self) -> bool {
        matches!(self, Self::Touch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_events_alone_classify_as_touch() {
        let caps = TouchCapabilities {
            touch_events: true,
            max_touch_points: 0,
        };
        assert_eq!(caps.device_class(), DeviceClass::Touch);
    }

    #[test]
    fn touch_points_alone_classify_as_touch() {
        let caps = TouchCapabilities {
            touch_events: false,
            max_touch_points: 1,
        };
        assert!(caps.device_class().is_touch());
    }

    #[test]
    fn no_touch_is_pointer() {
        assert_eq!(TouchCapabilities::NONE.device_class(), DeviceClass::Pointer);
        assert_eq!(TouchCapabilities::TOUCHSCREEN.device_class(), DeviceClass::Touch);
    }
}
