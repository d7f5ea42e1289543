//! Miuix Core
//!
//! Host-agnostic primitives shared by the Miuix scroll components:
//!
//! - **Touch Events**: Android-shaped `MotionEvent` with pointer ids and raw coordinates
//! - **Nested Scrolling**: Capability traits for the parent/child scroll protocol
//! - **Scroll State**: `Idle`/`Dragging`/`Settling`, axis locks and spring-back edges
//! - **Listener Registry**: Screen-scoped listener sets for app bar, IME and insets
//!
//! # Example
//!
//! ```rust
//! use miuix_core::events::{MotionAction, MotionEvent};
//!
//! let down = MotionEvent::single(MotionAction::Down, 0, 120.0, 480.0);
//! assert_eq!(down.find_pointer_index(0), Some(0));
//! assert_eq!(down.find_pointer_index(3), None);
//! ```

pub mod error;
pub mod events;
pub mod geometry;
pub mod listeners;
pub mod nested;
pub mod registry;
pub mod state;

pub use error::{Result, SpringError};
pub use events::{MotionAction, MotionEvent, Pointer};
pub use geometry::{Insets, Rect};
pub use listeners::ListenerSet;
pub use nested::{
    FlingObserver, NestedScrollForwarder, NestedScrollSink, NestedScrollSource, OnScrollListener,
    OnSpringListener, ScrollAxes, ScrollStateEmitter, ScrollTarget, ScrollType,
};
pub use registry::{
    AppBarStateListener, ImeVisibilityListener, ListenerRegistry, WindowInsetsListener,
};
pub use state::{AppBarState, OrientationMode, ScrollOrientation, ScrollState, SpringBackMode};
