//! Collapsing app bar
//!
//! The app bar owns a single scroll offset in `[0, collapsible_scroll_range]`.
//! Nested scroll from the content below moves it: scrolling the content up
//! collapses the bar before the content moves, scrolling down past the top of
//! the content expands it again. Render values (title alphas and translations)
//! are pure functions of that offset.
//!
//! When a drag ends half-way, the bar snaps to the nearer boundary in the
//! direction of the last drag with a fling whose speed depends on the distance
//! left to travel.

use std::rc::Rc;

use miuix_animation::{FlingScroller, FrameClock, FrameRequester, FrameTicker};
use miuix_core::{AppBarState, ListenerRegistry, NestedScrollSink, ScrollAxes, ScrollType};

use crate::config::AppBarConfig;

/// Title alphas and translations for one offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppBarRenderValues {
    pub collapse_fraction: f32,
    pub large_title_alpha: f32,
    pub large_title_translation_y: f32,
    pub toolbar_title_alpha: f32,
    pub toolbar_title_translation_y: f32,
}

/// Scroll-offset engine of a collapsing app bar
pub struct AppBar {
    config: AppBarConfig,
    registry: Rc<ListenerRegistry>,
    clock: Rc<dyn FrameClock>,
    frame_requester: Option<FrameRequester>,
    /// Frozen once measured, until `reset_layout`
    collapsible_scroll_range: Option<i32>,
    current_scroll_offset: i32,
    toolbar_title_initial_offset: f32,
    is_scroll_down: bool,
    touch_scroll_active: bool,
    fling_scroll_active: bool,
    snap: FlingScroller,
    snap_target: Option<i32>,
    state: AppBarState,
}

impl AppBar {
    pub fn new(
        config: AppBarConfig,
        registry: Rc<ListenerRegistry>,
        clock: Rc<dyn FrameClock>,
    ) -> Self {
        let snap = FlingScroller::new(config.density);
        Self {
            config,
            registry,
            clock,
            frame_requester: None,
            collapsible_scroll_range: None,
            current_scroll_offset: 0,
            toolbar_title_initial_offset: 0.0,
            is_scroll_down: false,
            touch_scroll_active: false,
            fling_scroll_active: false,
            snap,
            snap_target: None,
            state: AppBarState::Expanded,
        }
    }

    pub fn set_frame_requester(&mut self, requester: Option<FrameRequester>) {
        self.frame_requester = requester;
    }

    /// Record the measured collapsible range
    ///
    /// Ignored while a range is already frozen; returns whether it was taken.
    pub fn set_collapsible_scroll_range(&mut self, range: i32) -> bool {
        if self.collapsible_scroll_range.is_some() {
            return false;
        }
        let range = range.max(0);
        self.collapsible_scroll_range = Some(range);
        tracing::debug!("app bar collapsible range {}", range);
        if self.current_scroll_offset > range {
            self.apply_offset(range);
        }
        true
    }

    /// Forget the measured range so the next measurement is taken
    pub fn reset_layout(&mut self) {
        self.cancel_snap_animation();
        self.collapsible_scroll_range = None;
    }

    /// Vertical offset of the toolbar title while the bar is expanded
    pub fn set_toolbar_title_initial_offset(&mut self, offset: f32) {
        self.toolbar_title_initial_offset = offset;
    }

    pub fn collapsible_scroll_range(&self) -> i32 {
        self.collapsible_scroll_range.unwrap_or(0)
    }

    pub fn current_scroll_offset(&self) -> i32 {
        self.current_scroll_offset
    }

    /// Move the bar to `offset` (clamped to the range) without animation
    pub fn set_current_scroll_offset(&mut self, offset: i32) {
        self.cancel_snap_animation();
        self.apply_offset(offset);
    }

    /// `offset / range`, clamped to `[0, 1]`
    pub fn overall_fraction(&self) -> f32 {
        let range = self.collapsible_scroll_range();
        if range <= 0 {
            return 0.0;
        }
        (self.current_scroll_offset as f32 / range as f32).clamp(0.0, 1.0)
    }

    pub fn state(&self) -> AppBarState {
        self.state
    }

    /// Whether the last drag moved the content down (expanding)
    pub fn is_scroll_down(&self) -> bool {
        self.is_scroll_down
    }

    pub fn is_snapping(&self) -> bool {
        self.snap_target.is_some()
    }

    pub fn snap_target(&self) -> Option<i32> {
        self.snap_target
    }

    pub fn render_values(&self) -> AppBarRenderValues {
        let fraction = self.overall_fraction();
        let config = &self.config;

        let large_title_alpha = (1.0 - fraction / config.large_title_fade_end).clamp(0.0, 1.0);
        let progress = ((fraction - config.toolbar_fade_start)
            / (config.toolbar_fade_end - config.toolbar_fade_start))
            .clamp(0.0, 1.0);
        // The two titles never show at once
        let toolbar_title_alpha = if large_title_alpha > config.exclusive_alpha {
            0.0
        } else {
            progress
        };

        AppBarRenderValues {
            collapse_fraction: fraction,
            large_title_alpha,
            large_title_translation_y: -(self.current_scroll_offset as f32),
            toolbar_title_alpha,
            toolbar_title_translation_y: self.toolbar_title_initial_offset * (1.0 - progress),
        }
    }

    fn apply_offset(&mut self, offset: i32) {
        let offset = offset.clamp(0, self.collapsible_scroll_range());
        if offset == self.current_scroll_offset {
            return;
        }
        self.current_scroll_offset = offset;
        self.registry.notify_collapse_fraction(self.overall_fraction());

        let state = if offset == 0 {
            AppBarState::Expanded
        } else if offset >= self.collapsible_scroll_range() {
            AppBarState::Collapsed
        } else {
            AppBarState::Intermediate
        };
        if state != self.state {
            tracing::debug!("app bar {:?} -> {:?}", self.state, state);
            self.state = state;
            self.registry.notify_app_bar_state(state);
        }
    }

    // =========================================================================
    // Snap
    // =========================================================================

    /// Launch speed (px/s, unsigned) for a snap that still has `distance` to go
    ///
    /// Short remaining distances get a relatively faster fling.
    pub fn snap_velocity(&self, distance: f32) -> f32 {
        let range = self.collapsible_scroll_range();
        let ratio = if range > 0 {
            (distance.abs() / range as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let config = &self.config;
        let spread = config.snap_max_multiplier - config.snap_min_multiplier;
        let multiplier = (config.snap_min_multiplier
            + spread * (1.0 - ratio.powf(config.snap_exponent)))
        .clamp(config.snap_min_multiplier, config.snap_max_multiplier);
        config.snap_base_velocity * multiplier
    }

    /// Start snapping to the boundary in the direction of the last drag
    ///
    /// Does nothing unless the bar rests strictly between its boundaries.
    pub fn handle_snap(&mut self) -> bool {
        let range = self.collapsible_scroll_range();
        let offset = self.current_scroll_offset;
        if range <= 0 || offset <= 0 || offset >= range {
            return false;
        }

        let target = if self.is_scroll_down { 0 } else { range };
        let distance = target - offset;
        let velocity = self.snap_velocity(distance as f32) * distance.signum() as f32;
        self.snap.fling(
            offset,
            velocity,
            offset.min(target),
            offset.max(target),
            self.clock.now_ms(),
        );
        self.snap_target = Some(target);
        tracing::debug!(
            "app bar snap {} -> {} at {:.0} px/s",
            offset,
            target,
            velocity
        );
        if let Some(requester) = &self.frame_requester {
            requester.request_frame();
        }
        true
    }

    /// Stop an in-flight snap where it is
    pub fn cancel_snap_animation(&mut self) {
        if self.snap_target.take().is_some() {
            self.snap.abort_animation();
            tracing::debug!("app bar snap cancelled at {}", self.current_scroll_offset);
        }
    }

    /// Advance the snap to `now_ms`; returns true while more frames are needed
    pub fn compute_snap_at(&mut self, now_ms: u64) -> bool {
        let Some(target) = self.snap_target else {
            return false;
        };
        if self.snap.compute_scroll_offset(now_ms) && !self.snap.is_finished() {
            self.apply_offset(self.snap.current());
            return true;
        }
        self.snap_target = None;
        self.apply_offset(target);
        false
    }

    pub fn compute_snap(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.compute_snap_at(now)
    }
}

impl NestedScrollSink for AppBar {
    fn on_start_nested_scroll(&mut self, axes: ScrollAxes, _scroll_type: ScrollType) -> bool {
        axes.contains(ScrollAxes::VERTICAL)
    }

    fn on_nested_scroll_accepted(&mut self, _axes: ScrollAxes, scroll_type: ScrollType) {
        if scroll_type.is_touch() {
            self.touch_scroll_active = true;
        } else {
            self.fling_scroll_active = true;
        }
        self.cancel_snap_animation();
    }

    fn on_nested_pre_scroll(&mut self, _dx: i32, dy: i32, _scroll_type: ScrollType) -> (i32, i32) {
        if dy != 0 {
            self.is_scroll_down = dy < 0;
        }
        if dy <= 0 {
            return (0, 0);
        }
        let room = self.collapsible_scroll_range() - self.current_scroll_offset;
        let consumed = dy.min(room.max(0));
        if consumed > 0 {
            self.apply_offset(self.current_scroll_offset + consumed);
        }
        (0, consumed)
    }

    fn on_nested_scroll(
        &mut self,
        _dx_consumed: i32,
        _dy_consumed: i32,
        _dx_unconsumed: i32,
        dy_unconsumed: i32,
        _scroll_type: ScrollType,
    ) -> (i32, i32) {
        if dy_unconsumed >= 0 || self.current_scroll_offset == 0 {
            return (0, 0);
        }
        let consumed = dy_unconsumed.max(-self.current_scroll_offset);
        self.apply_offset(self.current_scroll_offset + consumed);
        (0, consumed)
    }

    fn on_stop_nested_scroll(&mut self, scroll_type: ScrollType) {
        if scroll_type.is_touch() {
            self.touch_scroll_active = false;
        } else {
            self.fling_scroll_active = false;
        }
        // A fling that follows the drag snaps when it ends
        if !self.touch_scroll_active && !self.fling_scroll_active {
            self.handle_snap();
        }
    }
}

impl FrameTicker for AppBar {
    fn tick(&mut self, frame_time_ms: u64) -> bool {
        self.compute_snap_at(frame_time_ms)
    }
}

impl std::fmt::Debug for AppBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppBar")
            .field("range", &self.collapsible_scroll_range)
            .field("offset", &self.current_scroll_offset)
            .field("state", &self.state)
            .field("snap_target", &self.snap_target)
            .finish_non_exhaustive()
    }
}
