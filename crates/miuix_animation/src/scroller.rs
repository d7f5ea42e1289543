//! Spring scroller
//!
//! Drives a scroll position toward a target with a critically damped spring.
//! One axis is integrated per animation (the `orientation` passed to
//! [`SpringScroller::scroll_by_fling`]); the other axis keeps its start value.
//!
//! # States
//!
//! ```text
//!  Idle ──scroll_by_fling──▶ Animating ──equilibrium──▶ LastStep ──▶ Idle
//!                    │            ▲
//!          set_first_step         │
//!                    └─▶ FirstStep┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use miuix_animation::SpringScroller;
//! use miuix_core::ScrollOrientation;
//!
//! let mut scroller = SpringScroller::new();
//! scroller.scroll_by_fling(0.0, 0.0, 100.0, 0.0, 0.0, ScrollOrientation::Vertical, false, 0);
//!
//! let mut now = 0;
//! while scroller.compute_scroll_offset(now) {
//!     now += 16;
//! }
//! assert!(scroller.is_finished());
//! assert_eq!(scroller.current_y(), 0);
//! ```

use miuix_core::ScrollOrientation;

use crate::spring::SpringOperator;

/// Natural period of the spring used for regular spring-back
pub const DEFAULT_PERIOD: f32 = 0.4;

/// Softer period used when the hand-off velocity is very high
pub const HIGH_SPEED_PERIOD: f32 = 0.55;

/// Velocity (px/s) above which [`HIGH_SPEED_PERIOD`] is used
pub const HIGH_SPEED_THRESHOLD: f64 = 5000.0;

/// Residual distance (px) under which the spring counts as settled
pub const EQUILIBRIUM_THRESHOLD: f64 = 1.0;

const MIN_FRAME_SECONDS: f32 = 0.001;
const MAX_FRAME_SECONDS: f32 = 0.016;

/// Critically damped spring animation over one axis of `(x, y)`
#[derive(Debug, Clone)]
pub struct SpringScroller {
    operator: Option<SpringOperator>,
    /// Exact position being integrated
    start_x: f64,
    start_y: f64,
    /// Where the current animation started
    origin_start_x: f64,
    origin_start_y: f64,
    target_x: f64,
    target_y: f64,
    /// Pixel position reported to the owner
    current_x: i32,
    current_y: i32,
    velocity: f64,
    start_time_ms: u64,
    orientation: ScrollOrientation,
    first_step: Option<i32>,
    last_step: bool,
    /// Whether the settle frame jumps onto the target
    snap_on_settle: bool,
    finished: bool,
}

impl SpringScroller {
    pub fn new() -> Self {
        Self {
            operator: None,
            start_x: 0.0,
            start_y: 0.0,
            origin_start_x: 0.0,
            origin_start_y: 0.0,
            target_x: 0.0,
            target_y: 0.0,
            current_x: 0,
            current_y: 0,
            velocity: 0.0,
            start_time_ms: 0,
            orientation: ScrollOrientation::Vertical,
            first_step: None,
            last_step: false,
            snap_on_settle: true,
            finished: true,
        }
    }

    /// Start a spring from `(start_x, start_y)` toward `(target_x, target_y)`
    /// with `velocity` along `orientation`
    ///
    /// Velocities above 5000 px/s get a softer spring unless
    /// `disable_high_speed` is set.
    #[allow(clippy::too_many_arguments)]
    pub fn scroll_by_fling(
        &mut self,
        start_x: f32,
        target_x: f32,
        start_y: f32,
        target_y: f32,
        velocity: f32,
        orientation: ScrollOrientation,
        disable_high_speed: bool,
        now_ms: u64,
    ) {
        self.finished = false;
        self.last_step = false;
        self.snap_on_settle = true;

        self.start_x = start_x as f64;
        self.origin_start_x = start_x as f64;
        self.target_x = target_x as f64;
        self.start_y = start_y as f64;
        self.origin_start_y = start_y as f64;
        self.target_y = target_y as f64;
        self.current_x = start_x as i32;
        self.current_y = start_y as i32;
        self.velocity = velocity as f64;

        let period = if self.velocity.abs() > HIGH_SPEED_THRESHOLD && !disable_high_speed {
            HIGH_SPEED_PERIOD
        } else {
            DEFAULT_PERIOD
        };
        self.operator = Some(SpringOperator::from_valid(1.0, period));
        self.orientation = orientation;
        self.start_time_ms = now_ms;

        tracing::debug!(
            "spring start ({:.1}, {:.1}) -> ({:.1}, {:.1}) v={:.1} period={} {:?}",
            start_x,
            start_y,
            target_x,
            target_y,
            velocity,
            period,
            orientation
        );
    }

    /// Snap the animated axis to `value` on the next frame before integrating
    pub fn set_first_step(&mut self, value: i32) {
        self.first_step = Some(value);
    }

    /// Advance the animation to `now_ms`
    ///
    /// Returns true while the owner should keep rendering frames. The frame
    /// after equilibrium is detected settles the animation and returns false.
    pub fn compute_scroll_offset(&mut self, now_ms: u64) -> bool {
        let Some(operator) = self.operator else {
            return false;
        };
        if self.finished {
            return false;
        }

        if let Some(value) = self.first_step.take() {
            if self.orientation.is_horizontal() {
                self.current_x = value;
                self.start_x = value as f64;
            } else {
                self.current_y = value;
                self.start_y = value as f64;
            }
            self.start_time_ms = now_ms;
            return true;
        }

        if self.last_step {
            if self.snap_on_settle {
                self.current_x = self.start_x as i32;
                self.current_y = self.start_y as i32;
            }
            self.finished = true;
            return false;
        }

        let elapsed = now_ms.saturating_sub(self.start_time_ms) as f32 / 1000.0;
        let dt = elapsed.clamp(MIN_FRAME_SECONDS, MAX_FRAME_SECONDS);
        self.start_time_ms = now_ms;

        if self.orientation.is_horizontal() {
            let velocity = operator.update_velocity(self.velocity, dt, self.target_x, self.start_x);
            self.start_x += dt as f64 * velocity;
            self.velocity = velocity;
            self.current_x = self.start_x as i32;
            if self.settle_if_at_equilibrium(self.start_x, self.origin_start_x, self.target_x)
                && self.snap_on_settle
            {
                self.start_x = self.target_x;
            }
        } else {
            let velocity = operator.update_velocity(self.velocity, dt, self.target_y, self.start_y);
            self.start_y += dt as f64 * velocity;
            self.velocity = velocity;
            self.current_y = self.start_y as i32;
            if self.settle_if_at_equilibrium(self.start_y, self.origin_start_y, self.target_y)
                && self.snap_on_settle
            {
                self.start_y = self.target_y;
            }
        }

        tracing::trace!(
            "spring step dt={:.4} pos=({}, {}) v={:.2}",
            dt,
            self.current_x,
            self.current_y,
            self.velocity
        );
        true
    }

    /// Mark the next frame as the settle frame if the spring is at rest
    fn settle_if_at_equilibrium(&mut self, current: f64, initial_start: f64, target: f64) -> bool {
        if !self.is_at_equilibrium(current, initial_start, target) {
            return false;
        }
        self.last_step = true;
        // A spring launched from its own target with velocity (a fling
        // bounce) rests at its turning point; the owner springs back from there.
        self.snap_on_settle = !self.is_turning_point(current, initial_start, target);
        true
    }

    fn is_turning_point(&self, current: f64, initial_start: f64, target: f64) -> bool {
        initial_start == target
            && sign(self.velocity) != sign(current - target)
            && (current - target).abs() >= EQUILIBRIUM_THRESHOLD
    }

    /// Equilibrium test for one axis
    ///
    /// - overshot the target coming from either side
    /// - launched from the target and the velocity now points back at it
    /// - within [`EQUILIBRIUM_THRESHOLD`] of the target
    pub fn is_at_equilibrium(&self, current: f64, initial_start: f64, target: f64) -> bool {
        if initial_start < target && current > target {
            return true;
        }
        if initial_start > target && current < target {
            return true;
        }
        if initial_start == target && sign(self.velocity) != sign(current - target) {
            return true;
        }
        (current - target).abs() < EQUILIBRIUM_THRESHOLD
    }

    /// Stop immediately, keeping the current position
    pub fn force_stop(&mut self) {
        self.finished = true;
        self.last_step = false;
        self.snap_on_settle = true;
        self.first_step = None;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Finished at a fling's turning point rather than on the target
    pub fn settled_on_turning_point(&self) -> bool {
        self.finished && !self.snap_on_settle
    }

    pub fn current_x(&self) -> i32 {
        self.current_x
    }

    pub fn current_y(&self) -> i32 {
        self.current_y
    }

    pub fn final_x(&self) -> f32 {
        self.target_x as f32
    }

    pub fn final_y(&self) -> f32 {
        self.target_y as f32
    }

    /// Velocity along the animated axis (px/s)
    pub fn velocity(&self) -> f32 {
        self.velocity as f32
    }

    pub fn orientation(&self) -> ScrollOrientation {
        self.orientation
    }
}

impl Default for SpringScroller {
    fn default() -> Self {
        Self::new()
    }
}

/// Sign with zero mapped to zero
fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}
