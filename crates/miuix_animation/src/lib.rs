//! Miuix Animation System
//!
//! Frame-driven motion for the spring-back container and the collapsing app bar.
//!
//! # Features
//!
//! - **Spring Operator**: Semi-implicit Euler velocity step for a damped spring
//! - **Spring Scroller**: Drives `(x, y)` to a target with fling hand-off and first-step snap
//! - **Fling Scroller**: Decelerating fling between bounds for snap animations
//! - **Frame Scheduling**: `FrameTicker`s re-run every frame until they report done
//!
//! Nothing here reads the wall clock on its own; every step takes the frame
//! time from a [`FrameClock`], so tests drive animations deterministically
//! with a [`ManualClock`].

pub mod clock;
pub mod fling;
pub mod scheduler;
pub mod scroller;
pub mod spring;

pub use clock::{FrameClock, ManualClock, SystemClock};
pub use fling::FlingScroller;
pub use scheduler::{AnimationScheduler, FrameRequester, FrameTicker, TickerId};
pub use scroller::SpringScroller;
pub use spring::SpringOperator;
