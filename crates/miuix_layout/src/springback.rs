//! Spring-back overscroll container
//!
//! [`SpringBackLayout`] wraps one scrollable target and turns scroll that the
//! target cannot consume at its edges into a damped displacement of the whole
//! container, then springs back to rest when the gesture ends.
//!
//! It sits in the middle of a nested-scroll chain and plays several roles at
//! once:
//!
//! - [`NestedScrollSink`]: receives pre-scroll, scroll and fling from the target
//! - [`NestedScrollSource`]: forwards what it leaves over to its own ancestor
//! - [`FlingObserver`]: learns the target's current fling velocity
//! - [`ScrollStateEmitter`]: reports `Idle`/`Dragging`/`Settling`
//! - [`FrameTicker`]: advances the spring once per frame
//!
//! When the target does not take part in nested scrolling, raw touch events
//! go through [`SpringBackLayout::dispatch_touch_event`] instead.
//!
//! # Coordinates
//!
//! The container's scroll position follows Android: pulling the top edge down
//! makes `scroll_y` negative, pulling the bottom edge up makes it positive.
//! Accumulators hold "virtual" touch travel; the visible offset is that travel
//! run through [`damping::spring_back_distance`].

use std::rc::Rc;

use miuix_animation::{FrameClock, FrameRequester, FrameTicker, SpringScroller};
use miuix_core::{
    FlingObserver, ListenerSet, MotionAction, MotionEvent, NestedScrollForwarder,
    NestedScrollSink, NestedScrollSource, OnScrollListener, OnSpringListener, OrientationMode,
    Pointer, ScrollAxes, ScrollOrientation, ScrollState, ScrollStateEmitter, ScrollTarget,
    ScrollType, SpringBackMode,
};

use crate::config::SpringBackConfig;
use crate::damping;
use crate::helper::SpringBackLayoutHelper;

/// Fling frames that may still be converted into overscroll at an edge
pub const MAX_FLING_CONSUME_COUNTER: u32 = 4;

/// Fling speed (px/s) above which pre-scroll consumes the displacement directly
pub const VELOCITY_THRESHOLD: f32 = 2000.0;

/// How a direct drag relates to the target's edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragKind {
    /// At both edges (or neither): either direction overscrolls
    Normal,
    /// At the end edge only: only pulling toward the start overscrolls
    Up,
    /// At the start edge only: only pulling toward the end overscrolls
    Down,
}

/// Overscroll container coordinating nested scroll, touch and spring-back
pub struct SpringBackLayout {
    target: Option<Box<dyn ScrollTarget>>,
    helper: SpringBackLayoutHelper,
    scroller: SpringScroller,
    forwarder: NestedScrollForwarder,
    clock: Rc<dyn FrameClock>,
    frame_requester: Option<FrameRequester>,
    listeners: ListenerSet<dyn OnScrollListener>,
    on_spring_listener: Option<Rc<dyn OnSpringListener>>,

    scroll_x: i32,
    scroll_y: i32,
    enabled: bool,
    spring_back_mode: SpringBackMode,
    origin_orientation: OrientationMode,
    scroll_orientation: ScrollOrientation,
    nested_scroll_axes: ScrollAxes,
    screen_width: i32,
    screen_height: i32,
    touch_slop: f32,
    scroll_state: ScrollState,

    total_scroll_top_unconsumed: f32,
    total_scroll_bottom_unconsumed: f32,
    total_fling_unconsumed: f32,
    velocity_x: f32,
    velocity_y: f32,
    nested_fling_in_progress: bool,
    nested_scroll_in_progress: bool,
    scroll_by_fling: bool,
    consume_nest_fling_counter: u32,

    active_pointer_id: Option<i32>,
    initial_down_x: f32,
    initial_down_y: f32,
    initial_motion_x: f32,
    initial_motion_y: f32,
    is_being_dragged: bool,
    disallow_intercept: bool,
    touch_captured: bool,
}

impl SpringBackLayout {
    pub fn new(config: &SpringBackConfig, clock: Rc<dyn FrameClock>) -> Self {
        Self {
            target: None,
            helper: SpringBackLayoutHelper::new(config.touch_slop),
            scroller: SpringScroller::new(),
            forwarder: NestedScrollForwarder::new(),
            clock,
            frame_requester: None,
            listeners: ListenerSet::new(),
            on_spring_listener: None,
            scroll_x: 0,
            scroll_y: 0,
            enabled: config.enabled,
            spring_back_mode: config.spring_back_mode.into(),
            origin_orientation: config.orientation.into(),
            scroll_orientation: ScrollOrientation::Unchecked,
            nested_scroll_axes: ScrollAxes::empty(),
            screen_width: config.screen_width,
            screen_height: config.screen_height,
            touch_slop: config.touch_slop,
            scroll_state: ScrollState::Idle,
            total_scroll_top_unconsumed: 0.0,
            total_scroll_bottom_unconsumed: 0.0,
            total_fling_unconsumed: 0.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            nested_fling_in_progress: false,
            nested_scroll_in_progress: false,
            scroll_by_fling: false,
            consume_nest_fling_counter: 0,
            active_pointer_id: None,
            initial_down_x: 0.0,
            initial_down_y: 0.0,
            initial_motion_x: 0.0,
            initial_motion_y: 0.0,
            is_being_dragged: false,
            disallow_intercept: false,
            touch_captured: false,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the scrollable content this container wraps
    pub fn set_target(&mut self, target: Box<dyn ScrollTarget>) {
        self.target = Some(target);
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Set the ancestor that receives forwarded nested scroll
    pub fn set_nested_parent(&mut self, parent: Option<Box<dyn NestedScrollSink>>) {
        self.forwarder.set_parent(parent);
    }

    /// Set how this container asks for animation frames
    pub fn set_frame_requester(&mut self, requester: Option<FrameRequester>) {
        self.frame_requester = requester;
    }

    pub fn set_on_spring_listener(&mut self, listener: Option<Rc<dyn OnSpringListener>>) {
        self.on_spring_listener = listener;
    }

    pub fn set_spring_back_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_spring_back_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_spring_back_mode(&mut self, mode: SpringBackMode) {
        self.spring_back_mode = mode;
    }

    pub fn spring_back_mode(&self) -> SpringBackMode {
        self.spring_back_mode
    }

    pub fn set_scroll_orientation(&mut self, mode: OrientationMode) {
        self.origin_orientation = mode;
        self.scroll_orientation = ScrollOrientation::Unchecked;
    }

    pub fn orientation_mode(&self) -> OrientationMode {
        self.origin_orientation
    }

    /// Enable or disable forwarding to the ancestor
    pub fn set_nested_scrolling_enabled(&mut self, enabled: bool) {
        self.forwarder.set_enabled(enabled);
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    pub fn scroll_x(&self) -> i32 {
        self.scroll_x
    }

    pub fn scroll_y(&self) -> i32 {
        self.scroll_y
    }

    pub fn total_scroll_top_unconsumed(&self) -> f32 {
        self.total_scroll_top_unconsumed
    }

    pub fn total_scroll_bottom_unconsumed(&self) -> f32 {
        self.total_scroll_bottom_unconsumed
    }

    pub fn total_fling_unconsumed(&self) -> f32 {
        self.total_fling_unconsumed
    }

    pub fn consume_nest_fling_counter(&self) -> u32 {
        self.consume_nest_fling_counter
    }

    pub fn is_being_dragged(&self) -> bool {
        self.is_being_dragged
    }

    /// Whether a spring animation is in flight
    pub fn is_animating(&self) -> bool {
        !self.scroller.is_finished()
    }

    /// Damping range along `orientation`
    fn range(&self, orientation: ScrollOrientation) -> f32 {
        if orientation.is_horizontal() {
            self.screen_width as f32
        } else {
            self.screen_height as f32
        }
    }

    /// Upper bound of every overscroll accumulator along `orientation`
    pub fn max_spring_back_distance(&self, orientation: ScrollOrientation) -> f32 {
        damping::max_spring_back_distance(self.range(orientation))
    }

    fn spring_back_distance(&self, distance: f32, orientation: ScrollOrientation) -> f32 {
        damping::spring_back_distance(distance, self.range(orientation))
    }

    fn touch_distance(&self, offset: f32, orientation: ScrollOrientation) -> f32 {
        damping::touch_distance(offset, self.range(orientation))
    }

    fn scroll_along(&self, orientation: ScrollOrientation) -> i32 {
        if orientation.is_horizontal() {
            self.scroll_x
        } else {
            self.scroll_y
        }
    }

    fn velocity_along(&self, orientation: ScrollOrientation) -> f32 {
        if orientation.is_horizontal() {
            self.velocity_x
        } else {
            self.velocity_y
        }
    }

    fn is_displaced(&self) -> bool {
        self.scroll_x != 0 || self.scroll_y != 0
    }

    fn nested_orientation(&self) -> ScrollOrientation {
        if self.nested_scroll_axes.contains(ScrollAxes::VERTICAL) {
            ScrollOrientation::Vertical
        } else if self.nested_scroll_axes.contains(ScrollAxes::HORIZONTAL) {
            ScrollOrientation::Horizontal
        } else {
            ScrollOrientation::Unchecked
        }
    }

    fn can_target_scroll(&self, orientation: ScrollOrientation, direction: i32) -> bool {
        match &self.target {
            Some(target) if orientation.is_horizontal() => {
                target.can_scroll_horizontally(direction)
            }
            Some(target) => target.can_scroll_vertically(direction),
            None => false,
        }
    }

    /// Target sits at its top (or left) limit and that edge may overscroll
    fn at_start_edge(&self, orientation: ScrollOrientation) -> bool {
        self.spring_back_mode.contains(SpringBackMode::TOP)
            && !self.can_target_scroll(orientation, -1)
    }

    /// Target sits at its bottom (or right) limit and that edge may overscroll
    fn at_end_edge(&self, orientation: ScrollOrientation) -> bool {
        self.spring_back_mode.contains(SpringBackMode::BOTTOM)
            && !self.can_target_scroll(orientation, 1)
    }

    fn request_frame(&self) {
        if let Some(requester) = &self.frame_requester {
            requester.request_frame();
        }
    }

    // =========================================================================
    // Position
    // =========================================================================

    /// Commit a new container position and notify scroll listeners
    pub fn scroll_to(&mut self, x: i32, y: i32) {
        if x == self.scroll_x && y == self.scroll_y {
            return;
        }
        let dx = x - self.scroll_x;
        let dy = y - self.scroll_y;
        self.scroll_x = x;
        self.scroll_y = y;
        tracing::trace!("scroll_to ({}, {})", x, y);
        for listener in self.listeners.snapshot() {
            listener.on_scrolled(dx, dy);
        }
    }

    /// Show a visible displacement of `distance` along `orientation`
    ///
    /// Positive distances pull the start edge, negative the end edge.
    fn move_target(&mut self, distance: f32, orientation: ScrollOrientation) {
        let offset = -(distance as i32);
        if orientation.is_horizontal() {
            self.scroll_to(offset, 0);
        } else {
            self.scroll_to(0, offset);
        }
    }

    /// Animate to an arbitrary position
    pub fn smooth_scroll_to(&mut self, x: i32, y: i32) {
        if x == self.scroll_x && y == self.scroll_y {
            return;
        }
        let orientation = if y != self.scroll_y {
            ScrollOrientation::Vertical
        } else {
            ScrollOrientation::Horizontal
        };
        self.scroller.force_stop();
        self.scroller.scroll_by_fling(
            self.scroll_x as f32,
            x as f32,
            self.scroll_y as f32,
            y as f32,
            0.0,
            orientation,
            true,
            self.clock.now_ms(),
        );
        self.dispatch_scroll_state(ScrollState::Settling);
        self.request_frame();
    }

    fn dispatch_scroll_state(&mut self, state: ScrollState) {
        if self.scroll_state == state {
            return;
        }
        let old = self.scroll_state;
        self.scroll_state = state;
        let from_user = self.is_being_dragged || self.nested_scroll_in_progress;
        tracing::debug!("scroll state {:?} -> {:?} (from_user={})", old, state, from_user);
        for listener in self.listeners.snapshot() {
            listener.on_state_changed(old, state, from_user);
        }
    }

    // =========================================================================
    // Spring-back
    // =========================================================================

    fn spring_back(&mut self, velocity: f32, orientation: ScrollOrientation) {
        if let Some(listener) = self.on_spring_listener.clone() {
            if listener.on_spring_back() {
                tracing::debug!("spring-back handled by listener");
                return;
            }
        }
        self.scroller.force_stop();
        self.scroller.scroll_by_fling(
            self.scroll_x as f32,
            0.0,
            self.scroll_y as f32,
            0.0,
            velocity,
            orientation,
            false,
            self.clock.now_ms(),
        );
        if !self.is_displaced() && velocity == 0.0 {
            self.dispatch_scroll_state(ScrollState::Idle);
        } else {
            self.dispatch_scroll_state(ScrollState::Settling);
        }
        self.request_frame();
    }

    /// Advance the spring using the container's clock
    pub fn compute_scroll(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.compute_scroll_at(now)
    }

    /// Advance the spring to `now_ms` and commit its position
    ///
    /// Returns true while more frames are needed.
    pub fn compute_scroll_at(&mut self, now_ms: u64) -> bool {
        if self.scroller.is_finished() {
            return false;
        }

        let advanced = self.scroller.compute_scroll_offset(now_ms);
        self.scroll_to(self.scroller.current_x(), self.scroller.current_y());
        if advanced {
            self.request_frame();
            return true;
        }

        let rest_x = self.scroller.final_x() as i32;
        let rest_y = self.scroller.final_y() as i32;
        let off_rest = self.scroll_x != rest_x || self.scroll_y != rest_y;
        if off_rest && rest_x == 0 && rest_y == 0 {
            if self.scroller.settled_on_turning_point() {
                tracing::debug!(
                    "fling turned at ({}, {}), springing back",
                    self.scroll_x,
                    self.scroll_y
                );
            } else {
                tracing::warn!(
                    "spring finished at ({}, {}) away from rest, springing back",
                    self.scroll_x,
                    self.scroll_y
                );
            }
            let orientation = self.scroller.orientation();
            self.spring_back(0.0, orientation);
            return !self.scroller.is_finished();
        }

        if !self.is_being_dragged && !self.nested_scroll_in_progress {
            self.dispatch_scroll_state(ScrollState::Idle);
        }
        false
    }

    // =========================================================================
    // Nested pre-scroll
    // =========================================================================

    /// Take back displacement before the target scrolls; returns the consumed delta
    fn pre_scroll_along(
        &mut self,
        delta: i32,
        orientation: ScrollOrientation,
        scroll_type: ScrollType,
    ) -> i32 {
        if scroll_type.is_touch() {
            self.pre_scroll_touch(delta, orientation)
        } else {
            self.pre_scroll_fling(delta, orientation)
        }
    }

    fn pre_scroll_touch(&mut self, delta: i32, orientation: ScrollOrientation) -> i32 {
        let amount = delta.unsigned_abs() as f32;
        if delta > 0 && self.total_scroll_top_unconsumed > 0.0 {
            let taken = amount.min(self.total_scroll_top_unconsumed);
            self.total_scroll_top_unconsumed -= taken;
            self.dispatch_scroll_state(ScrollState::Dragging);
            let distance =
                self.spring_back_distance(self.total_scroll_top_unconsumed, orientation);
            self.move_target(distance, orientation);
            return taken as i32;
        }
        if delta < 0 && self.total_scroll_bottom_unconsumed > 0.0 {
            let taken = amount.min(self.total_scroll_bottom_unconsumed);
            self.total_scroll_bottom_unconsumed -= taken;
            self.dispatch_scroll_state(ScrollState::Dragging);
            let distance =
                self.spring_back_distance(self.total_scroll_bottom_unconsumed, orientation);
            self.move_target(-distance, orientation);
            return -(taken as i32);
        }
        0
    }

    fn pre_scroll_fling(&mut self, delta: i32, orientation: ScrollOrientation) -> i32 {
        let scroll = self.scroll_along(orientation);
        // +1 while the start edge is pulled, -1 for the end edge
        let edge = if delta > 0 && scroll < 0 {
            1.0
        } else if delta < 0 && scroll > 0 {
            -1.0
        } else {
            return 0;
        };
        if self.total_fling_unconsumed <= 0.0 {
            return 0;
        }

        let velocity = self.velocity_along(orientation);
        if velocity.abs() > VELOCITY_THRESHOLD {
            let amount = delta.unsigned_abs() as f32;
            let taken = amount.min(self.total_fling_unconsumed);
            self.total_fling_unconsumed -= taken;
            let distance = self.spring_back_distance(self.total_fling_unconsumed, orientation);
            self.move_target(edge * distance, orientation);
            self.dispatch_scroll_state(ScrollState::Settling);
            return delta.signum() * taken as i32;
        }

        if !self.scroll_by_fling {
            self.scroll_by_fling = true;
            self.spring_back(velocity, orientation);
        }
        let now = self.clock.now_ms();
        if self.scroller.compute_scroll_offset(now) {
            self.scroll_to(self.scroller.current_x(), self.scroller.current_y());
            let offset = self.scroll_along(orientation).unsigned_abs() as f32;
            self.total_fling_unconsumed = self.touch_distance(offset, orientation);
        } else {
            self.total_fling_unconsumed = 0.0;
        }
        delta
    }

    // =========================================================================
    // Nested post-scroll
    // =========================================================================

    /// Turn scroll left over at an eligible edge into overscroll; returns the consumed delta
    fn handle_edge_spring_back(
        &mut self,
        net_unconsumed: i32,
        child_consumed: i32,
        orientation: ScrollOrientation,
        scroll_type: ScrollType,
    ) -> i32 {
        let top = net_unconsumed < 0 && self.at_start_edge(orientation);
        let bottom = net_unconsumed > 0 && self.at_end_edge(orientation);
        if !top && !bottom {
            return 0;
        }
        let edge = if top { 1.0 } else { -1.0 };
        let amount = net_unconsumed.unsigned_abs() as f32;
        let max = self.max_spring_back_distance(orientation);

        if scroll_type.is_touch() {
            if !self.scroller.is_finished() {
                return 0;
            }
            let total = if top {
                &mut self.total_scroll_top_unconsumed
            } else {
                &mut self.total_scroll_bottom_unconsumed
            };
            *total = (*total + amount).min(max);
            let total = *total;
            // Reported as raw state 1 by the touch path, which is Dragging
            self.dispatch_scroll_state(ScrollState::Dragging);
            let distance = self.spring_back_distance(total, orientation);
            self.move_target(edge * distance, orientation);
            return net_unconsumed;
        }

        let velocity = self.velocity_along(orientation);
        if velocity != 0.0 {
            if !self.scroll_by_fling {
                self.scroll_by_fling = true;
                self.spring_back(velocity, orientation);
            }
            let mut consumed = 0;
            if child_consumed != 0 && amount <= max {
                self.scroller.set_first_step(net_unconsumed);
                consumed = net_unconsumed;
            }
            self.dispatch_scroll_state(ScrollState::Settling);
            return consumed;
        }

        if self.consume_nest_fling_counter < MAX_FLING_CONSUME_COUNTER {
            let room = (max - self.total_fling_unconsumed).max(0.0);
            let taken = room.min(amount);
            self.total_fling_unconsumed += taken;
            self.dispatch_scroll_state(ScrollState::Settling);
            let distance = self.spring_back_distance(self.total_fling_unconsumed, orientation);
            self.move_target(edge * distance, orientation);
            self.consume_nest_fling_counter += 1;
            return net_unconsumed.signum() * taken as i32;
        }
        0
    }

    // =========================================================================
    // Touch handling
    // =========================================================================

    fn can_handle_touch(&self) -> bool {
        self.enabled
            && !self.nested_fling_in_progress
            && !self.nested_scroll_in_progress
            && !self
                .target
                .as_ref()
                .is_some_and(|t| t.is_nested_scrolling_enabled())
    }

    /// Host dispatch entry point for raw touch events
    ///
    /// A DOWN inside the target while settling grabs the animation; an UP that
    /// leaves nothing animating reports `Idle`.
    pub fn dispatch_touch_event(&mut self, event: &MotionEvent) -> bool {
        if event.action == MotionAction::Down && self.scroll_state == ScrollState::Settling {
            let in_target = self
                .target
                .as_ref()
                .is_some_and(|t| self.helper.is_touch_in_target(event, t.window_bounds()));
            if in_target {
                self.dispatch_scroll_state(ScrollState::Dragging);
            }
        }

        let handled = if self.touch_captured {
            self.on_touch_event(event)
        } else if self.on_intercept_touch_event(event) {
            self.touch_captured = true;
            if event.action == MotionAction::Down {
                self.on_touch_event(event);
            }
            true
        } else {
            false
        };

        if event.is_gesture_end() {
            self.touch_captured = false;
        }
        if event.action == MotionAction::Up && self.scroll_state != ScrollState::Settling {
            self.dispatch_scroll_state(ScrollState::Idle);
        }
        handled
    }

    /// Decide whether to take the gesture away from the target
    pub fn on_intercept_touch_event(&mut self, event: &MotionEvent) -> bool {
        if !self.can_handle_touch() {
            return false;
        }
        if event.action == MotionAction::Down {
            self.disallow_intercept = false;
            if !self.scroller.is_finished() {
                self.scroller.force_stop();
            }
            self.record_down(event);
        }
        if self.disallow_intercept || self.spring_back_mode.is_empty() {
            return false;
        }

        if self.origin_orientation == OrientationMode::Angle {
            self.helper.handle_touch_event(event);
            self.scroll_orientation = self.helper.scroll_orientation();
            // Never switch axes while the other one is still displaced
            if self.scroll_orientation.is_vertical() && self.scroll_x != 0 {
                return false;
            }
            if self.scroll_orientation.is_horizontal() && self.scroll_y != 0 {
                return false;
            }
            if self.scroll_orientation != ScrollOrientation::Unchecked {
                self.forwarder.request_internal_disallow_intercept(true);
            }
        } else {
            self.scroll_orientation = self.origin_orientation.primary();
        }

        match self.scroll_orientation {
            ScrollOrientation::Unchecked => false,
            orientation => self.intercept_along(event, orientation),
        }
    }

    fn drag_kind(&self, orientation: ScrollOrientation) -> Option<DragKind> {
        match (self.at_start_edge(orientation), self.at_end_edge(orientation)) {
            (true, true) => Some(DragKind::Normal),
            (true, false) => Some(DragKind::Down),
            (false, true) => Some(DragKind::Up),
            (false, false) => None,
        }
    }

    fn intercept_along(&mut self, event: &MotionEvent, orientation: ScrollOrientation) -> bool {
        let Some(kind) = self.drag_kind(orientation) else {
            return false;
        };
        match event.action {
            MotionAction::Down => {
                if self.scroll_along(orientation) != 0 {
                    self.is_being_dragged = true;
                    let down = self.initial_down(orientation);
                    let motion = self.regrab_origin(down, orientation);
                    self.set_initial_motion(orientation, motion);
                } else {
                    self.is_being_dragged = false;
                }
            }
            MotionAction::Move => {
                let Some(position) = self.active_position(event, orientation) else {
                    return false;
                };
                let down = self.initial_down(orientation);
                let toward_edge = match kind {
                    DragKind::Normal => true,
                    DragKind::Down => position > down,
                    DragKind::Up => position < down,
                };
                if toward_edge {
                    self.check_scroll_start(position, orientation, kind);
                }
            }
            MotionAction::Up | MotionAction::Cancel => {
                self.is_being_dragged = false;
                self.active_pointer_id = None;
            }
            MotionAction::PointerUp => self.on_secondary_pointer_up(event, orientation),
            MotionAction::PointerDown => {}
        }
        self.is_being_dragged
    }

    /// Handle a touch event for a gesture this container owns
    pub fn on_touch_event(&mut self, event: &MotionEvent) -> bool {
        if !self.can_handle_touch() {
            return false;
        }
        if event.action == MotionAction::Down && !self.scroller.is_finished() {
            self.scroller.force_stop();
        }
        if self.origin_orientation != OrientationMode::Angle {
            self.scroll_orientation = self.origin_orientation.primary();
        }
        match self.scroll_orientation {
            ScrollOrientation::Unchecked => false,
            orientation => self.touch_along(event, orientation),
        }
    }

    fn touch_along(&mut self, event: &MotionEvent, orientation: ScrollOrientation) -> bool {
        let kind = self.drag_kind(orientation).unwrap_or(DragKind::Normal);
        match event.action {
            MotionAction::Down => {
                if !self.record_down(event) {
                    return false;
                }
                if self.scroll_along(orientation) != 0 {
                    self.is_being_dragged = true;
                    let down = self.initial_down(orientation);
                    let motion = self.regrab_origin(down, orientation);
                    self.set_initial_motion(orientation, motion);
                } else {
                    self.is_being_dragged = false;
                }
                true
            }
            MotionAction::Move => {
                let Some(position) = self.active_position(event, orientation) else {
                    return false;
                };
                if !self.is_being_dragged {
                    self.check_scroll_start(position, orientation, kind);
                    if !self.is_being_dragged {
                        return true;
                    }
                }
                let travel = position - self.initial_motion(orientation);
                match kind {
                    DragKind::Normal => {
                        let distance = self.spring_back_distance(travel, orientation);
                        self.move_target(travel.signum() * distance, orientation);
                    }
                    DragKind::Down => {
                        if travel <= 0.0 {
                            self.move_target(0.0, orientation);
                            return false;
                        }
                        let distance = self.spring_back_distance(travel, orientation);
                        self.move_target(distance, orientation);
                    }
                    DragKind::Up => {
                        if travel >= 0.0 {
                            self.move_target(0.0, orientation);
                            return false;
                        }
                        let distance = self.spring_back_distance(travel, orientation);
                        self.move_target(-distance, orientation);
                    }
                }
                self.dispatch_scroll_state(ScrollState::Dragging);
                true
            }
            MotionAction::PointerDown => {
                let Some(pointer) = event.action_pointer().copied() else {
                    tracing::error!(
                        "POINTER_DOWN with invalid action index {}",
                        event.action_index
                    );
                    return false;
                };
                self.reanchor(pointer, orientation);
                true
            }
            MotionAction::PointerUp => {
                self.on_secondary_pointer_up(event, orientation);
                true
            }
            MotionAction::Up | MotionAction::Cancel => {
                let was_dragged = self.is_being_dragged;
                self.is_being_dragged = false;
                self.active_pointer_id = None;
                self.forwarder.request_internal_disallow_intercept(false);
                if was_dragged || self.scroll_along(orientation) != 0 {
                    self.spring_back(0.0, orientation);
                }
                false
            }
        }
    }

    fn record_down(&mut self, event: &MotionEvent) -> bool {
        let Some(pointer) = event.pointers.first().copied() else {
            tracing::error!("DOWN event without pointers");
            return false;
        };
        self.active_pointer_id = Some(pointer.id);
        self.initial_down_x = pointer.x;
        self.initial_down_y = pointer.y;
        true
    }

    fn initial_down(&self, orientation: ScrollOrientation) -> f32 {
        if orientation.is_horizontal() {
            self.initial_down_x
        } else {
            self.initial_down_y
        }
    }

    fn initial_motion(&self, orientation: ScrollOrientation) -> f32 {
        if orientation.is_horizontal() {
            self.initial_motion_x
        } else {
            self.initial_motion_y
        }
    }

    fn set_initial_motion(&mut self, orientation: ScrollOrientation, value: f32) {
        if orientation.is_horizontal() {
            self.initial_motion_x = value;
        } else {
            self.initial_motion_y = value;
        }
    }

    /// Motion origin that reproduces the current displacement at `position`
    fn regrab_origin(&self, position: f32, orientation: ScrollOrientation) -> f32 {
        let scroll = self.scroll_along(orientation);
        if scroll == 0 {
            return position;
        }
        let travel = self.touch_distance(scroll.unsigned_abs() as f32, orientation);
        position + scroll.signum() as f32 * travel
    }

    fn active_position(&self, event: &MotionEvent, orientation: ScrollOrientation) -> Option<f32> {
        let Some(id) = self.active_pointer_id else {
            tracing::error!("got {:?} but there is no active pointer id", event.action);
            return None;
        };
        let Some(index) = event.find_pointer_index(id) else {
            tracing::error!("invalid active pointer id {}", id);
            return None;
        };
        event
            .pointers
            .get(index)
            .map(|pointer| axis_position(pointer, orientation))
    }

    fn check_scroll_start(&mut self, position: f32, orientation: ScrollOrientation, kind: DragKind) {
        if self.is_being_dragged {
            return;
        }
        let delta = position - self.initial_down(orientation);
        let past_slop = match kind {
            DragKind::Normal => delta.abs() > self.touch_slop,
            DragKind::Down => delta > self.touch_slop,
            DragKind::Up => -delta > self.touch_slop,
        };
        if !past_slop {
            return;
        }
        let motion = if self.scroll_along(orientation) != 0 {
            self.regrab_origin(position, orientation)
        } else {
            self.initial_down(orientation) + delta.signum() * self.touch_slop
        };
        self.set_initial_motion(orientation, motion);
        self.is_being_dragged = true;
        self.dispatch_scroll_state(ScrollState::Dragging);
        self.forwarder.request_internal_disallow_intercept(true);
    }

    /// Continue the drag from `pointer` without a jump
    fn reanchor(&mut self, pointer: Pointer, orientation: ScrollOrientation) {
        self.active_pointer_id = Some(pointer.id);
        self.initial_down_x = pointer.x;
        self.initial_down_y = pointer.y;
        let position = axis_position(&pointer, orientation);
        let motion = self.regrab_origin(position, orientation);
        self.set_initial_motion(orientation, motion);
    }

    fn on_secondary_pointer_up(&mut self, event: &MotionEvent, orientation: ScrollOrientation) {
        let Some(pointer) = event.action_pointer().copied() else {
            tracing::error!("POINTER_UP with invalid action index {}", event.action_index);
            return;
        };
        if Some(pointer.id) != self.active_pointer_id {
            return;
        }
        let next_index = if event.action_index == 0 { 1 } else { 0 };
        match event.pointers.get(next_index).copied() {
            Some(next) => self.reanchor(next, orientation),
            None => self.active_pointer_id = None,
        }
    }
}

fn axis_position(pointer: &Pointer, orientation: ScrollOrientation) -> f32 {
    if orientation.is_horizontal() {
        pointer.x
    } else {
        pointer.y
    }
}

impl NestedScrollSink for SpringBackLayout {
    fn on_start_nested_scroll(&mut self, axes: ScrollAxes, scroll_type: ScrollType) -> bool {
        self.nested_scroll_axes = axes;
        let accepted = self.enabled && self.origin_orientation.allows(self.nested_orientation());
        tracing::trace!("start nested scroll {:?} {:?}: {}", axes, scroll_type, accepted);
        accepted
    }

    fn on_nested_scroll_accepted(&mut self, axes: ScrollAxes, scroll_type: ScrollType) {
        if self.enabled {
            let orientation = self.nested_orientation();
            let scroll = self.scroll_along(orientation);
            let travel = if scroll != 0 {
                self.touch_distance(scroll.unsigned_abs() as f32, orientation)
            } else {
                0.0
            };

            if scroll_type.is_touch() {
                if scroll < 0 {
                    self.total_scroll_top_unconsumed = travel;
                    self.total_scroll_bottom_unconsumed = 0.0;
                } else if scroll > 0 {
                    self.total_scroll_top_unconsumed = 0.0;
                    self.total_scroll_bottom_unconsumed = travel;
                } else {
                    self.total_scroll_top_unconsumed = 0.0;
                    self.total_scroll_bottom_unconsumed = 0.0;
                }
                self.nested_scroll_in_progress = true;
            } else {
                self.total_fling_unconsumed = travel;
                self.nested_fling_in_progress = true;
                self.consume_nest_fling_counter = 0;
            }

            self.velocity_x = 0.0;
            self.velocity_y = 0.0;
            self.scroll_by_fling = false;
            self.scroller.force_stop();
            tracing::debug!("nested {:?} scroll accepted at offset {}", scroll_type, scroll);
        }
        self.forwarder.start_nested_scroll(axes, scroll_type);
    }

    fn on_nested_pre_scroll(&mut self, dx: i32, dy: i32, scroll_type: ScrollType) -> (i32, i32) {
        let mut consumed = (0, 0);
        if self.enabled {
            let orientation = self.nested_orientation();
            if orientation.is_vertical() {
                consumed.1 = self.pre_scroll_along(dy, orientation, scroll_type);
            } else if orientation.is_horizontal() {
                consumed.0 = self.pre_scroll_along(dx, orientation, scroll_type);
            }
        }
        if let Some((parent_x, parent_y)) =
            self.forwarder
                .dispatch_nested_pre_scroll(dx - consumed.0, dy - consumed.1, scroll_type)
        {
            consumed.0 += parent_x;
            consumed.1 += parent_y;
        }
        consumed
    }

    fn on_nested_scroll(
        &mut self,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
        scroll_type: ScrollType,
    ) -> (i32, i32) {
        // The ancestor gets the leftover first
        let mut consumed = self.forwarder.dispatch_nested_scroll(
            dx_consumed,
            dy_consumed,
            dx_unconsumed,
            dy_unconsumed,
            scroll_type,
        );
        if !self.enabled {
            return consumed;
        }

        let orientation = self.nested_orientation();
        if orientation.is_vertical() {
            let net = dy_unconsumed - consumed.1;
            if net != 0 {
                consumed.1 += self.handle_edge_spring_back(net, dy_consumed, orientation, scroll_type);
            }
        } else if orientation.is_horizontal() {
            let net = dx_unconsumed - consumed.0;
            if net != 0 {
                consumed.0 += self.handle_edge_spring_back(net, dx_consumed, orientation, scroll_type);
            }
        }
        consumed
    }

    fn on_stop_nested_scroll(&mut self, scroll_type: ScrollType) {
        self.forwarder.stop_nested_scroll(scroll_type);
        if !self.enabled {
            return;
        }
        let orientation = self.nested_orientation();

        if scroll_type.is_touch() {
            if !self.nested_scroll_in_progress {
                return;
            }
            self.nested_scroll_in_progress = false;
            if self.is_displaced() {
                if self.nested_fling_in_progress {
                    self.dispatch_scroll_state(ScrollState::Settling);
                } else {
                    self.spring_back(0.0, orientation);
                }
            } else if !self.nested_fling_in_progress && self.scroller.is_finished() {
                self.dispatch_scroll_state(ScrollState::Idle);
            }
            return;
        }

        if !self.nested_fling_in_progress {
            return;
        }
        self.nested_fling_in_progress = false;
        if self.scroll_by_fling {
            if self.scroller.is_finished() && self.is_displaced() {
                self.spring_back(0.0, orientation);
            }
        } else if self.is_displaced() && !self.nested_scroll_in_progress {
            self.spring_back(0.0, orientation);
        } else if !self.is_displaced() && self.scroller.is_finished() {
            self.dispatch_scroll_state(ScrollState::Idle);
        }
        self.request_frame();
    }

    fn on_nested_pre_fling(&mut self, velocity_x: f32, velocity_y: f32) -> bool {
        self.forwarder.dispatch_nested_pre_fling(velocity_x, velocity_y)
    }

    fn on_nested_fling(&mut self, velocity_x: f32, velocity_y: f32, consumed: bool) -> bool {
        self.forwarder
            .dispatch_nested_fling(velocity_x, velocity_y, consumed)
    }

    /// Children cannot switch off interception while spring-back is enabled
    fn request_disallow_intercept_touch_event(&mut self, disallow: bool) {
        if self.enabled {
            return;
        }
        self.disallow_intercept = disallow;
        self.forwarder.request_disallow_intercept_touch_event(disallow);
    }

    /// A nested spring-back container owns the gesture; stop intercepting
    fn request_internal_disallow_intercept(&mut self, disallow: bool) {
        self.disallow_intercept = disallow;
        self.forwarder.request_internal_disallow_intercept(disallow);
    }
}

impl NestedScrollSource for SpringBackLayout {
    fn start_nested_scroll(&mut self, axes: ScrollAxes, scroll_type: ScrollType) -> bool {
        self.forwarder.start_nested_scroll(axes, scroll_type)
    }

    fn stop_nested_scroll(&mut self, scroll_type: ScrollType) {
        self.forwarder.stop_nested_scroll(scroll_type);
    }

    fn has_nested_scrolling_parent(&self, scroll_type: ScrollType) -> bool {
        self.forwarder.has_nested_scrolling_parent(scroll_type)
    }

    fn dispatch_nested_pre_scroll(
        &mut self,
        dx: i32,
        dy: i32,
        scroll_type: ScrollType,
    ) -> Option<(i32, i32)> {
        self.forwarder.dispatch_nested_pre_scroll(dx, dy, scroll_type)
    }

    fn dispatch_nested_scroll(
        &mut self,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
        scroll_type: ScrollType,
    ) -> (i32, i32) {
        self.forwarder.dispatch_nested_scroll(
            dx_consumed,
            dy_consumed,
            dx_unconsumed,
            dy_unconsumed,
            scroll_type,
        )
    }

    fn dispatch_nested_pre_fling(&mut self, velocity_x: f32, velocity_y: f32) -> bool {
        self.forwarder.dispatch_nested_pre_fling(velocity_x, velocity_y)
    }

    fn dispatch_nested_fling(&mut self, velocity_x: f32, velocity_y: f32, consumed: bool) -> bool {
        self.forwarder
            .dispatch_nested_fling(velocity_x, velocity_y, consumed)
    }
}

impl FlingObserver for SpringBackLayout {
    fn on_nested_current_fling(&mut self, velocity_x: f32, velocity_y: f32) -> bool {
        self.velocity_x = velocity_x;
        self.velocity_y = velocity_y;
        true
    }
}

impl ScrollStateEmitter for SpringBackLayout {
    fn add_on_scroll_listener(&mut self, listener: Rc<dyn OnScrollListener>) {
        self.listeners.add(listener);
    }

    fn remove_on_scroll_listener(&mut self, listener: &Rc<dyn OnScrollListener>) {
        self.listeners.remove(listener);
    }

    fn scroll_state(&self) -> ScrollState {
        self.scroll_state
    }
}

impl FrameTicker for SpringBackLayout {
    fn tick(&mut self, frame_time_ms: u64) -> bool {
        self.compute_scroll_at(frame_time_ms)
    }
}

impl std::fmt::Debug for SpringBackLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpringBackLayout")
            .field("scroll", &(self.scroll_x, self.scroll_y))
            .field("state", &self.scroll_state)
            .field("enabled", &self.enabled)
            .field("mode", &self.spring_back_mode)
            .field("orientation", &self.origin_orientation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miuix_animation::ManualClock;
    use miuix_core::Rect;
    use std::cell::RefCell;

    /// Scrollable content with fixed edge state
    struct TestTarget {
        can_up: bool,
        can_down: bool,
        can_left: bool,
        can_right: bool,
    }

    impl TestTarget {
        fn at_top() -> Self {
            Self {
                can_up: false,
                can_down: true,
                can_left: false,
                can_right: true,
            }
        }

        fn at_bottom() -> Self {
            Self {
                can_up: true,
                can_down: false,
                can_left: true,
                can_right: false,
            }
        }
    }

    impl ScrollTarget for TestTarget {
        fn can_scroll_vertically(&self, direction: i32) -> bool {
            if direction < 0 {
                self.can_up
            } else {
                self.can_down
            }
        }

        fn can_scroll_horizontally(&self, direction: i32) -> bool {
            if direction < 0 {
                self.can_left
            } else {
                self.can_right
            }
        }

        fn window_bounds(&self) -> Rect {
            Rect::from_location(0, 0, 1080, 2400)
        }
    }

    #[derive(Default)]
    struct StateRecorder {
        states: RefCell<Vec<ScrollState>>,
    }

    impl OnScrollListener for StateRecorder {
        fn on_state_changed(&self, _old: ScrollState, new: ScrollState, _from_user: bool) {
            self.states.borrow_mut().push(new);
        }
    }

    /// Ancestor that consumes nothing and records what it is offered
    #[derive(Default)]
    struct Ancestor {
        pre_scrolls: Vec<(i32, i32)>,
        scrolls: Vec<(i32, i32)>,
        disallow: Option<bool>,
    }

    impl NestedScrollSink for Ancestor {
        fn on_start_nested_scroll(&mut self, _axes: ScrollAxes, _scroll_type: ScrollType) -> bool {
            true
        }

        fn on_nested_scroll_accepted(&mut self, _axes: ScrollAxes, _scroll_type: ScrollType) {}

        fn on_nested_pre_scroll(&mut self, dx: i32, dy: i32, _: ScrollType) -> (i32, i32) {
            self.pre_scrolls.push((dx, dy));
            (0, 0)
        }

        fn on_nested_scroll(&mut self, _: i32, _: i32, dx: i32, dy: i32, _: ScrollType) -> (i32, i32) {
            self.scrolls.push((dx, dy));
            (0, 0)
        }

        fn on_stop_nested_scroll(&mut self, _scroll_type: ScrollType) {}

        fn request_disallow_intercept_touch_event(&mut self, disallow: bool) {
            self.disallow = Some(disallow);
        }
    }

    struct Fixture {
        clock: ManualClock,
        layout: SpringBackLayout,
        states: Rc<StateRecorder>,
    }

    impl Fixture {
        fn new(target: TestTarget) -> Self {
            Self::with_config(target, SpringBackConfig::default())
        }

        fn with_config(target: TestTarget, config: SpringBackConfig) -> Self {
            let clock = ManualClock::new(0);
            let mut layout = SpringBackLayout::new(&config, Rc::new(clock.clone()));
            layout.set_target(Box::new(target));
            let states = Rc::new(StateRecorder::default());
            layout.add_on_scroll_listener(states.clone());
            Self {
                clock,
                layout,
                states,
            }
        }

        /// Run frames until the spring stops; returns the most negative offset seen
        fn settle(&mut self) -> i32 {
            let mut min_y = self.layout.scroll_y();
            let mut frames = 0;
            while self.layout.is_animating() {
                let now = self.clock.advance(16);
                self.layout.compute_scroll_at(now);
                min_y = min_y.min(self.layout.scroll_y());
                frames += 1;
                assert!(frames < 500, "spring-back did not settle");
            }
            min_y
        }

        fn touch(&mut self, action: MotionAction, y: f32) -> bool {
            self.layout
                .dispatch_touch_event(&MotionEvent::single(action, 0, 540.0, y))
        }

        fn states(&self) -> Vec<ScrollState> {
            self.states.states.borrow().clone()
        }
    }

    fn vertical() -> ScrollAxes {
        ScrollAxes::VERTICAL
    }

    #[test]
    fn test_touch_accumulator_is_bounded() {
        let mut f = Fixture::new(TestTarget::at_top());
        assert!(f.layout.on_start_nested_scroll(vertical(), ScrollType::Touch));
        f.layout.on_nested_scroll_accepted(vertical(), ScrollType::Touch);

        let max = f.layout.max_spring_back_distance(ScrollOrientation::Vertical);
        for _ in 0..50 {
            f.layout.on_nested_scroll(0, 0, 0, -300, ScrollType::Touch);
            assert!(f.layout.total_scroll_top_unconsumed() <= max);
        }
        assert_eq!(f.layout.total_scroll_top_unconsumed(), max);
        assert!(f.layout.scroll_y() < 0);
        assert_eq!(f.layout.scroll_state(), ScrollState::Dragging);
    }

    #[test]
    fn test_pre_scroll_consumes_accumulator_then_forwards_rest() {
        let mut f = Fixture::new(TestTarget::at_top());
        let ancestor = Rc::new(RefCell::new(Ancestor::default()));
        f.layout.set_nested_parent(Some(Box::new(ancestor.clone())));

        f.layout.on_start_nested_scroll(vertical(), ScrollType::Touch);
        f.layout.on_nested_scroll_accepted(vertical(), ScrollType::Touch);
        f.layout.on_nested_scroll(0, 0, 0, -30, ScrollType::Touch);
        assert_eq!(f.layout.total_scroll_top_unconsumed(), 30.0);

        let consumed = f.layout.on_nested_pre_scroll(0, 50, ScrollType::Touch);
        assert_eq!(consumed, (0, 30));
        assert_eq!(f.layout.total_scroll_top_unconsumed(), 0.0);
        assert_eq!(f.layout.scroll_y(), 0);
        assert_eq!(ancestor.borrow().pre_scrolls, vec![(0, 20)]);
    }

    #[test]
    fn test_post_scroll_offers_leftover_to_ancestor_first() {
        let mut f = Fixture::new(TestTarget::at_top());
        let ancestor = Rc::new(RefCell::new(Ancestor::default()));
        f.layout.set_nested_parent(Some(Box::new(ancestor.clone())));

        f.layout.on_start_nested_scroll(vertical(), ScrollType::Touch);
        f.layout.on_nested_scroll_accepted(vertical(), ScrollType::Touch);
        let consumed = f.layout.on_nested_scroll(0, 5, 0, -40, ScrollType::Touch);

        assert_eq!(ancestor.borrow().scrolls, vec![(0, -40)]);
        assert_eq!(consumed, (0, -40));
        assert!(f.layout.scroll_y() < 0);
    }

    #[test]
    fn test_fling_conversion_is_capped() {
        let mut f = Fixture::new(TestTarget::at_top());
        f.layout.on_start_nested_scroll(vertical(), ScrollType::NonTouch);
        f.layout.on_nested_scroll_accepted(vertical(), ScrollType::NonTouch);

        for _ in 0..10 {
            f.layout.on_nested_scroll(0, 0, 0, -10, ScrollType::NonTouch);
            assert!(f.layout.consume_nest_fling_counter() <= MAX_FLING_CONSUME_COUNTER);
        }
        assert_eq!(f.layout.consume_nest_fling_counter(), MAX_FLING_CONSUME_COUNTER);
        assert_eq!(f.layout.total_fling_unconsumed(), 40.0);
        assert_eq!(f.layout.scroll_state(), ScrollState::Settling);
    }

    /// Overscroll the top edge by 40 px of fling travel through the counter path
    fn fling_overscroll() -> Fixture {
        let mut f = Fixture::new(TestTarget::at_top());
        f.layout.on_start_nested_scroll(vertical(), ScrollType::NonTouch);
        f.layout.on_nested_scroll_accepted(vertical(), ScrollType::NonTouch);
        for _ in 0..MAX_FLING_CONSUME_COUNTER {
            f.layout.on_nested_scroll(0, 0, 0, -10, ScrollType::NonTouch);
        }
        assert_eq!(f.layout.total_fling_unconsumed(), 40.0);
        assert!(f.layout.scroll_y() < 0);
        f
    }

    #[test]
    fn test_fast_reverse_fling_takes_back_overscroll() {
        let mut f = fling_overscroll();
        let before = f.layout.scroll_y();
        f.layout.on_nested_current_fling(0.0, 3000.0);

        let consumed = f.layout.on_nested_pre_scroll(0, 15, ScrollType::NonTouch);
        assert_eq!(consumed, (0, 15));
        assert_eq!(f.layout.total_fling_unconsumed(), 25.0);
        assert_eq!(
            f.layout.scroll_y(),
            -(damping::spring_back_distance(25.0, 2400.0) as i32)
        );
        assert!(f.layout.scroll_y() > before);
        assert!(!f.layout.is_animating());
        assert_eq!(f.layout.scroll_state(), ScrollState::Settling);

        // Scrolling away from the pulled edge is left to the target
        assert_eq!(f.layout.on_nested_pre_scroll(0, -15, ScrollType::NonTouch), (0, 0));
    }

    #[test]
    fn test_slow_reverse_fling_hands_off_to_spring() {
        let mut f = fling_overscroll();
        let before = f.layout.scroll_y();
        f.layout.on_nested_current_fling(0.0, 500.0);

        let consumed = f.layout.on_nested_pre_scroll(0, 15, ScrollType::NonTouch);
        assert_eq!(consumed, (0, 15));
        assert!(f.layout.is_animating());
        assert_eq!(f.layout.scroll_state(), ScrollState::Settling);
        let offset = f.layout.scroll_y();
        assert!(offset < 0 && offset >= before);
        assert_eq!(
            f.layout.total_fling_unconsumed(),
            damping::touch_distance(offset.unsigned_abs() as f32, 2400.0)
        );
        assert!(f.layout.total_fling_unconsumed() < 40.0);

        // Later frames keep following the running spring
        f.clock.advance(16);
        f.layout.on_nested_pre_scroll(0, 15, ScrollType::NonTouch);
        assert!(f.layout.scroll_y() > offset);

        f.layout.on_stop_nested_scroll(ScrollType::NonTouch);
        f.settle();
        assert_eq!(f.layout.scroll_y(), 0);
        assert_eq!(f.layout.scroll_state(), ScrollState::Idle);
    }

    #[test]
    fn test_edge_mode_gates_overscroll() {
        let config = SpringBackConfig {
            spring_back_mode: crate::config::EdgeSetting::Bottom,
            ..SpringBackConfig::default()
        };
        let mut f = Fixture::with_config(TestTarget::at_top(), config);
        f.layout.on_start_nested_scroll(vertical(), ScrollType::Touch);
        f.layout.on_nested_scroll_accepted(vertical(), ScrollType::Touch);

        let consumed = f.layout.on_nested_scroll(0, 0, 0, -100, ScrollType::Touch);
        assert_eq!(consumed, (0, 0));
        assert_eq!(f.layout.scroll_y(), 0);
    }

    #[test]
    fn test_nested_drag_springs_back_on_stop() {
        let mut f = Fixture::new(TestTarget::at_bottom());
        f.layout.on_start_nested_scroll(vertical(), ScrollType::Touch);
        f.layout.on_nested_scroll_accepted(vertical(), ScrollType::Touch);
        f.layout.on_nested_scroll(0, 0, 0, 200, ScrollType::Touch);
        assert!(f.layout.scroll_y() > 0);

        f.layout.on_stop_nested_scroll(ScrollType::Touch);
        assert_eq!(f.layout.scroll_state(), ScrollState::Settling);
        f.settle();

        assert_eq!(f.layout.scroll_y(), 0);
        assert_eq!(
            f.states(),
            vec![ScrollState::Dragging, ScrollState::Settling, ScrollState::Idle]
        );
    }

    #[test]
    fn test_accept_reconstructs_travel_from_offset() {
        let mut f = Fixture::new(TestTarget::at_top());
        f.layout.scroll_to(0, -120);
        f.layout.on_start_nested_scroll(vertical(), ScrollType::Touch);
        f.layout.on_nested_scroll_accepted(vertical(), ScrollType::Touch);

        let travel = f.layout.total_scroll_top_unconsumed();
        assert!(travel > 120.0);
        assert_eq!(f.layout.total_scroll_bottom_unconsumed(), 0.0);
        let shown = damping::spring_back_distance(travel, 2400.0);
        assert!((shown - 120.0).abs() < 1.0);
    }

    #[test]
    fn test_fling_hand_off_bounces_and_returns() {
        let mut f = Fixture::new(TestTarget::at_top());
        f.layout.on_start_nested_scroll(vertical(), ScrollType::NonTouch);
        f.layout.on_nested_scroll_accepted(vertical(), ScrollType::NonTouch);
        f.layout.on_nested_current_fling(0.0, -3000.0);

        let consumed = f.layout.on_nested_scroll(0, 12, 0, -40, ScrollType::NonTouch);
        assert_eq!(consumed, (0, -40));
        assert_eq!(f.layout.scroll_state(), ScrollState::Settling);

        f.layout.on_stop_nested_scroll(ScrollType::NonTouch);
        assert!(f.layout.is_animating());

        let deepest = f.settle();
        assert!(deepest < -40, "fling momentum should carry past the first step");
        assert_eq!(f.layout.scroll_y(), 0);
        assert_eq!(f.layout.scroll_state(), ScrollState::Idle);
    }

    #[test]
    fn test_direct_drag_and_release() {
        let mut f = Fixture::new(TestTarget::at_top());
        assert!(!f.touch(MotionAction::Down, 500.0));
        assert!(!f.touch(MotionAction::Move, 510.0));
        assert!(f.touch(MotionAction::Move, 600.0));
        f.touch(MotionAction::Move, 700.0);

        let pulled = f.layout.scroll_y();
        assert!(pulled < 0);
        // Damped: visible offset is less than the finger travel past the slop
        assert!(pulled.unsigned_abs() < 178);

        f.touch(MotionAction::Up, 700.0);
        assert_eq!(f.layout.scroll_state(), ScrollState::Settling);
        f.settle();
        assert_eq!(f.layout.scroll_y(), 0);
        assert_eq!(
            f.states(),
            vec![ScrollState::Dragging, ScrollState::Settling, ScrollState::Idle]
        );
    }

    #[test]
    fn test_drag_away_from_edge_is_not_intercepted() {
        let mut f = Fixture::new(TestTarget::at_top());
        f.touch(MotionAction::Down, 500.0);
        assert!(!f.touch(MotionAction::Move, 300.0));
        assert_eq!(f.layout.scroll_y(), 0);
        f.touch(MotionAction::Up, 300.0);
        assert!(f.states().is_empty());
    }

    #[test]
    fn test_grab_while_settling_keeps_position() {
        let mut f = Fixture::new(TestTarget::at_top());
        f.touch(MotionAction::Down, 500.0);
        f.touch(MotionAction::Move, 600.0);
        f.touch(MotionAction::Move, 800.0);
        f.touch(MotionAction::Up, 800.0);

        for _ in 0..3 {
            let now = f.clock.advance(16);
            f.layout.compute_scroll_at(now);
        }
        let before = f.layout.scroll_y();
        assert!(before < 0);

        f.touch(MotionAction::Down, 650.0);
        assert_eq!(f.layout.scroll_state(), ScrollState::Dragging);
        assert!(!f.layout.is_animating());

        f.touch(MotionAction::Move, 650.0);
        assert!((f.layout.scroll_y() - before).abs() <= 1);
    }

    #[test]
    fn test_second_pointer_takes_over_without_jump() {
        let mut f = Fixture::new(TestTarget::at_top());
        f.touch(MotionAction::Down, 500.0);
        f.touch(MotionAction::Move, 600.0);
        f.touch(MotionAction::Move, 700.0);
        let pulled = f.layout.scroll_y();

        let two = |action, index| {
            MotionEvent::new(
                action,
                [Pointer::new(0, 540.0, 700.0), Pointer::new(1, 540.0, 300.0)],
            )
            .with_action_index(index)
        };
        f.layout.dispatch_touch_event(&two(MotionAction::PointerDown, 1));
        f.layout.dispatch_touch_event(&two(MotionAction::Move, 0));
        assert!((f.layout.scroll_y() - pulled).abs() <= 1);

        // Second pointer moves further: drag follows it
        f.layout.dispatch_touch_event(&MotionEvent::new(
            MotionAction::Move,
            [Pointer::new(0, 540.0, 700.0), Pointer::new(1, 540.0, 400.0)],
        ));
        let deeper = f.layout.scroll_y();
        assert!(deeper < pulled);

        // Lifting it hands the drag back to the first pointer
        f.layout.dispatch_touch_event(
            &MotionEvent::new(
                MotionAction::PointerUp,
                [Pointer::new(0, 540.0, 700.0), Pointer::new(1, 540.0, 400.0)],
            )
            .with_action_index(1),
        );
        f.touch(MotionAction::Move, 700.0);
        assert!((f.layout.scroll_y() - deeper).abs() <= 1);
    }

    #[test]
    fn test_unknown_pointer_is_a_no_op() {
        let mut f = Fixture::new(TestTarget::at_top());
        f.touch(MotionAction::Down, 500.0);
        f.touch(MotionAction::Move, 600.0);
        f.touch(MotionAction::Move, 700.0);
        let pulled = f.layout.scroll_y();

        let stray = MotionEvent::single(MotionAction::Move, 7, 540.0, 900.0);
        assert!(!f.layout.dispatch_touch_event(&stray));
        assert_eq!(f.layout.scroll_y(), pulled);
    }

    #[test]
    fn test_angle_mode_follows_gesture_axis() {
        let config = SpringBackConfig {
            orientation: crate::config::OrientationSetting::Angle,
            ..SpringBackConfig::default()
        };
        let mut f = Fixture::with_config(TestTarget::at_top(), config);
        let down = |action, x| MotionEvent::single(action, 0, x, 500.0);

        f.layout.dispatch_touch_event(&down(MotionAction::Down, 500.0));
        assert!(f.layout.dispatch_touch_event(&down(MotionAction::Move, 600.0)));
        f.layout.dispatch_touch_event(&down(MotionAction::Move, 700.0));

        assert!(f.layout.scroll_x() < 0);
        assert_eq!(f.layout.scroll_y(), 0);
    }

    #[test]
    fn test_nested_scrolling_target_disables_touch_path() {
        struct NestedTarget;
        impl ScrollTarget for NestedTarget {
            fn can_scroll_vertically(&self, _direction: i32) -> bool {
                false
            }
            fn can_scroll_horizontally(&self, _direction: i32) -> bool {
                false
            }
            fn is_nested_scrolling_enabled(&self) -> bool {
                true
            }
            fn window_bounds(&self) -> Rect {
                Rect::default()
            }
        }

        let clock = ManualClock::new(0);
        let mut layout = SpringBackLayout::new(&SpringBackConfig::default(), Rc::new(clock));
        layout.set_target(Box::new(NestedTarget));
        layout.dispatch_touch_event(&MotionEvent::single(MotionAction::Down, 0, 0.0, 0.0));
        assert!(!layout.dispatch_touch_event(&MotionEvent::single(
            MotionAction::Move,
            0,
            0.0,
            400.0
        )));
        assert_eq!(layout.scroll_y(), 0);
    }

    #[test]
    fn test_disabled_layout_refuses_everything() {
        let config = SpringBackConfig {
            enabled: false,
            ..SpringBackConfig::default()
        };
        let mut f = Fixture::with_config(TestTarget::at_top(), config);
        assert!(!f.layout.on_start_nested_scroll(vertical(), ScrollType::Touch));
        f.touch(MotionAction::Down, 500.0);
        assert!(!f.touch(MotionAction::Move, 900.0));
        assert_eq!(f.layout.scroll_y(), 0);
    }

    #[test]
    fn test_smooth_scroll_rests_at_target() {
        let mut f = Fixture::new(TestTarget::at_top());
        f.layout.smooth_scroll_to(0, 300);
        assert_eq!(f.layout.scroll_state(), ScrollState::Settling);
        f.settle();
        assert_eq!(f.layout.scroll_y(), 300);
        assert_eq!(f.layout.scroll_state(), ScrollState::Idle);
    }

    #[test]
    fn test_spring_listener_can_take_over() {
        struct Veto;
        impl OnSpringListener for Veto {
            fn on_spring_back(&self) -> bool {
                true
            }
        }

        let mut f = Fixture::new(TestTarget::at_top());
        f.layout.set_on_spring_listener(Some(Rc::new(Veto)));
        f.touch(MotionAction::Down, 500.0);
        f.touch(MotionAction::Move, 600.0);
        f.touch(MotionAction::Move, 700.0);
        let pulled = f.layout.scroll_y();
        f.touch(MotionAction::Up, 700.0);

        assert!(!f.layout.is_animating());
        assert_eq!(f.layout.scroll_y(), pulled);
    }

    #[test]
    fn test_drag_start_blocks_ancestor_interception() {
        let mut f = Fixture::new(TestTarget::at_top());
        let ancestor = Rc::new(RefCell::new(Ancestor::default()));
        f.layout.set_nested_parent(Some(Box::new(ancestor.clone())));

        f.touch(MotionAction::Down, 500.0);
        f.touch(MotionAction::Move, 600.0);
        assert_eq!(ancestor.borrow().disallow, Some(true));
        f.touch(MotionAction::Move, 650.0);
        f.touch(MotionAction::Up, 650.0);
        assert_eq!(ancestor.borrow().disallow, Some(false));
    }

    #[test]
    fn test_inner_drag_stops_outer_layout_intercepting() {
        let clock = ManualClock::new(0);
        let config = SpringBackConfig::default();
        let outer = Rc::new(RefCell::new(SpringBackLayout::new(
            &config,
            Rc::new(clock.clone()),
        )));
        outer
            .borrow_mut()
            .set_target(Box::new(TestTarget::at_top()));
        let mut inner = SpringBackLayout::new(&config, Rc::new(clock));
        inner.set_target(Box::new(TestTarget::at_top()));
        inner.set_nested_parent(Some(Box::new(outer.clone())));

        let event = |action, y| MotionEvent::single(action, 0, 540.0, y);
        assert!(!outer
            .borrow_mut()
            .on_intercept_touch_event(&event(MotionAction::Down, 500.0)));
        assert!(!inner.dispatch_touch_event(&event(MotionAction::Down, 500.0)));
        assert!(inner.dispatch_touch_event(&event(MotionAction::Move, 600.0)));
        assert!(inner.is_being_dragged());

        assert!(!outer
            .borrow_mut()
            .on_intercept_touch_event(&event(MotionAction::Move, 600.0)));
        assert!(!outer.borrow().is_being_dragged());
        assert_eq!(outer.borrow().scroll_y(), 0);
        inner.dispatch_touch_event(&event(MotionAction::Up, 600.0));

        // Without a dragging child the outer layout takes the next gesture
        outer
            .borrow_mut()
            .on_intercept_touch_event(&event(MotionAction::Down, 500.0));
        assert!(outer
            .borrow_mut()
            .on_intercept_touch_event(&event(MotionAction::Move, 600.0)));
    }

    #[test]
    fn test_scroll_listener_sees_deltas() {
        #[derive(Default)]
        struct Deltas(RefCell<Vec<(i32, i32)>>);
        impl OnScrollListener for Deltas {
            fn on_state_changed(&self, _: ScrollState, _: ScrollState, _: bool) {}
            fn on_scrolled(&self, dx: i32, dy: i32) {
                self.0.borrow_mut().push((dx, dy));
            }
        }

        let mut f = Fixture::new(TestTarget::at_top());
        let deltas = Rc::new(Deltas::default());
        f.layout.add_on_scroll_listener(deltas.clone());
        f.layout.scroll_to(0, -10);
        f.layout.scroll_to(0, -10);
        f.layout.scroll_to(4, -6);
        assert_eq!(*deltas.0.borrow(), vec![(0, -10), (4, 4)]);
    }
}
