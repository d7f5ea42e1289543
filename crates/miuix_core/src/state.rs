//! Scroll state, axis locks and spring-back edges

use bitflags::bitflags;

/// Scroll state reported to scroll listeners
///
/// ```text
///   Idle ──drag──▶ Dragging ──release──▶ Settling ──rest──▶ Idle
///    ▲                ▲                      │
///    └────────────────┴──────grab────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollState {
    /// Nothing is moving
    #[default]
    Idle,
    /// A finger (or a nested touch scroll) is displacing the content
    Dragging,
    /// An animation is moving the content
    Settling,
}

/// Axis a gesture has been locked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollOrientation {
    /// Not decided yet (gesture below touch slop)
    #[default]
    Unchecked,
    Horizontal,
    Vertical,
}

impl ScrollOrientation {
    pub fn is_vertical(self) -> bool {
        self == ScrollOrientation::Vertical
    }

    pub fn is_horizontal(self) -> bool {
        self == ScrollOrientation::Horizontal
    }
}

/// Axes a spring-back container is allowed to overscroll on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrientationMode {
    Horizontal,
    #[default]
    Vertical,
    /// Both axes; each gesture is locked to one of them at runtime
    Angle,
}

impl OrientationMode {
    /// Whether overscroll along `orientation` is permitted
    pub fn allows(self, orientation: ScrollOrientation) -> bool {
        match (self, orientation) {
            (_, ScrollOrientation::Unchecked) => false,
            (OrientationMode::Angle, _) => true,
            (OrientationMode::Vertical, ScrollOrientation::Vertical) => true,
            (OrientationMode::Horizontal, ScrollOrientation::Horizontal) => true,
            _ => false,
        }
    }

    /// Axis used when a gesture does not lock one (vertical wins in `Angle`)
    pub fn primary(self) -> ScrollOrientation {
        match self {
            OrientationMode::Horizontal => ScrollOrientation::Horizontal,
            OrientationMode::Vertical | OrientationMode::Angle => ScrollOrientation::Vertical,
        }
    }
}

bitflags! {
    /// Edges that may be pulled past their limit
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpringBackMode: u8 {
        /// Top (or left) edge
        const TOP = 1;
        /// Bottom (or right) edge
        const BOTTOM = 2;
    }
}

impl Default for SpringBackMode {
    fn default() -> Self {
        SpringBackMode::all()
    }
}

/// Resting state of a collapsing app bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppBarState {
    #[default]
    Expanded,
    /// Somewhere between the two boundary states
    Intermediate,
    Collapsed,
}
