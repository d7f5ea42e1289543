//! Nested scrolling contracts
//!
//! A scroll gesture is offered to the innermost scrollable first, then to its
//! ancestors, in coordinated passes:
//!
//! 1. `pre-scroll`: ancestors may consume part of a delta before the child scrolls
//! 2. `scroll`: the child reports what it consumed and what is left over
//! 3. `fling` / `stop`: the gesture ends, possibly with velocity
//!
//! A container that sits in the middle of the chain plays several roles at
//! once. Each role is a small trait here so it can be implemented and tested
//! on its own:
//!
//! - [`NestedScrollSink`]: receives nested scroll from a child
//! - [`NestedScrollSource`]: forwards leftovers to its own ancestor
//! - [`FlingObserver`]: is told the child's instantaneous fling velocity
//! - [`ScrollStateEmitter`]: publishes [`ScrollState`] changes to listeners

use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;

use crate::geometry::Rect;
use crate::state::ScrollState;

bitflags! {
    /// Axes a nested scroll session covers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ScrollAxes: u8 {
        const HORIZONTAL = 1;
        const VERTICAL = 2;
    }
}

/// Source of a nested scroll delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollType {
    /// Driven by a finger on screen
    Touch,
    /// Driven by a fling animation after the finger lifted
    NonTouch,
}

impl ScrollType {
    pub fn is_touch(self) -> bool {
        self == ScrollType::Touch
    }
}

/// Parent side of the nested scrolling protocol
///
/// Consumed amounts are returned as `(x, y)` pixel pairs.
pub trait NestedScrollSink {
    /// Offered a new nested scroll; return true to take part in it
    fn on_start_nested_scroll(&mut self, axes: ScrollAxes, scroll_type: ScrollType) -> bool;

    /// Called once after `on_start_nested_scroll` returned true
    fn on_nested_scroll_accepted(&mut self, axes: ScrollAxes, scroll_type: ScrollType);

    /// Consume part of `(dx, dy)` before the child scrolls
    fn on_nested_pre_scroll(&mut self, dx: i32, dy: i32, scroll_type: ScrollType) -> (i32, i32);

    /// Consume part of what the child left unconsumed
    fn on_nested_scroll(
        &mut self,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
        scroll_type: ScrollType,
    ) -> (i32, i32);

    fn on_stop_nested_scroll(&mut self, scroll_type: ScrollType);

    /// Return true to consume the fling before the child sees it
    fn on_nested_pre_fling(&mut self, _velocity_x: f32, _velocity_y: f32) -> bool {
        false
    }

    fn on_nested_fling(&mut self, _velocity_x: f32, _velocity_y: f32, _consumed: bool) -> bool {
        false
    }

    /// A descendant asks this container not to steal the current gesture
    fn request_disallow_intercept_touch_event(&mut self, _disallow: bool) {}

    /// A descendant spring-back container started or ended its own drag
    ///
    /// Containers that refuse ordinary interception requests still honour
    /// this one and pass it further up.
    fn request_internal_disallow_intercept(&mut self, disallow: bool) {
        self.request_disallow_intercept_touch_event(disallow);
    }
}

impl<T: NestedScrollSink + ?Sized> NestedScrollSink for Rc<RefCell<T>> {
    fn on_start_nested_scroll(&mut self, axes: ScrollAxes, scroll_type: ScrollType) -> bool {
        self.borrow_mut().on_start_nested_scroll(axes, scroll_type)
    }

    fn on_nested_scroll_accepted(&mut self, axes: ScrollAxes, scroll_type: ScrollType) {
        self.borrow_mut().on_nested_scroll_accepted(axes, scroll_type)
    }

    fn on_nested_pre_scroll(&mut self, dx: i32, dy: i32, scroll_type: ScrollType) -> (i32, i32) {
        self.borrow_mut().on_nested_pre_scroll(dx, dy, scroll_type)
    }

    fn on_nested_scroll(
        &mut self,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
        scroll_type: ScrollType,
    ) -> (i32, i32) {
        self.borrow_mut().on_nested_scroll(
            dx_consumed,
            dy_consumed,
            dx_unconsumed,
            dy_unconsumed,
            scroll_type,
        )
    }

    fn on_stop_nested_scroll(&mut self, scroll_type: ScrollType) {
        self.borrow_mut().on_stop_nested_scroll(scroll_type)
    }

    fn on_nested_pre_fling(&mut self, velocity_x: f32, velocity_y: f32) -> bool {
        self.borrow_mut().on_nested_pre_fling(velocity_x, velocity_y)
    }

    fn on_nested_fling(&mut self, velocity_x: f32, velocity_y: f32, consumed: bool) -> bool {
        self.borrow_mut()
            .on_nested_fling(velocity_x, velocity_y, consumed)
    }

    fn request_disallow_intercept_touch_event(&mut self, disallow: bool) {
        self.borrow_mut()
            .request_disallow_intercept_touch_event(disallow)
    }

    fn request_internal_disallow_intercept(&mut self, disallow: bool) {
        self.borrow_mut().request_internal_disallow_intercept(disallow)
    }
}

/// Child side of the nested scrolling protocol
pub trait NestedScrollSource {
    fn start_nested_scroll(&mut self, axes: ScrollAxes, scroll_type: ScrollType) -> bool;

    fn stop_nested_scroll(&mut self, scroll_type: ScrollType);

    fn has_nested_scrolling_parent(&self, scroll_type: ScrollType) -> bool;

    /// Offer a delta to the ancestor; `Some(consumed)` if it took anything
    fn dispatch_nested_pre_scroll(
        &mut self,
        dx: i32,
        dy: i32,
        scroll_type: ScrollType,
    ) -> Option<(i32, i32)>;

    /// Report a scroll step to the ancestor; returns what the ancestor consumed
    fn dispatch_nested_scroll(
        &mut self,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
        scroll_type: ScrollType,
    ) -> (i32, i32);

    fn dispatch_nested_pre_fling(&mut self, velocity_x: f32, velocity_y: f32) -> bool;

    fn dispatch_nested_fling(&mut self, velocity_x: f32, velocity_y: f32, consumed: bool) -> bool;
}

/// Receives the child's current fling velocity while a fling is in progress
pub trait FlingObserver {
    fn on_nested_current_fling(&mut self, velocity_x: f32, velocity_y: f32) -> bool;
}

/// Scroll listener contract
pub trait OnScrollListener {
    /// `from_user` is false while an animation is driving the change
    fn on_state_changed(&self, old_state: ScrollState, new_state: ScrollState, from_user: bool);

    /// The committed scroll position moved by `(dx, dy)`
    fn on_scrolled(&self, _dx: i32, _dy: i32) {}
}

/// Host hook consulted before a spring-back animation starts
pub trait OnSpringListener {
    /// Return true to take over the spring-back (the built-in one is skipped)
    fn on_spring_back(&self) -> bool;
}

/// Publishes scroll state changes
pub trait ScrollStateEmitter {
    fn add_on_scroll_listener(&mut self, listener: Rc<dyn OnScrollListener>);

    fn remove_on_scroll_listener(&mut self, listener: &Rc<dyn OnScrollListener>);

    fn scroll_state(&self) -> ScrollState;
}

/// The scrollable content wrapped by a spring-back container
pub trait ScrollTarget {
    /// Negative `direction` checks scrolling up, positive checks down
    fn can_scroll_vertically(&self, direction: i32) -> bool;

    /// Negative `direction` checks scrolling left, positive checks right
    fn can_scroll_horizontally(&self, direction: i32) -> bool;

    /// Whether the content drives its own nested scrolling
    fn is_nested_scrolling_enabled(&self) -> bool {
        false
    }

    /// Bounds of the content in window coordinates
    fn window_bounds(&self) -> Rect;
}

impl<T: ScrollTarget + ?Sized> ScrollTarget for Rc<RefCell<T>> {
    fn can_scroll_vertically(&self, direction: i32) -> bool {
        self.borrow().can_scroll_vertically(direction)
    }

    fn can_scroll_horizontally(&self, direction: i32) -> bool {
        self.borrow().can_scroll_horizontally(direction)
    }

    fn is_nested_scrolling_enabled(&self) -> bool {
        self.borrow().is_nested_scrolling_enabled()
    }

    fn window_bounds(&self) -> Rect {
        self.borrow().window_bounds()
    }
}

/// Bookkeeping for the child side of nested scrolling
///
/// Tracks which scroll types currently have an accepting ancestor and routes
/// dispatches to it. Containers embed one and implement [`NestedScrollSource`]
/// by delegating.
pub struct NestedScrollForwarder {
    parent: Option<Box<dyn NestedScrollSink>>,
    enabled: bool,
    touch_active: bool,
    non_touch_active: bool,
}

impl NestedScrollForwarder {
    pub fn new() -> Self {
        Self {
            parent: None,
            enabled: true,
            touch_active: false,
            non_touch_active: false,
        }
    }

    pub fn with_parent(parent: Box<dyn NestedScrollSink>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new()
        }
    }

    /// Replace the ancestor; any session with the previous one is dropped
    pub fn set_parent(&mut self, parent: Option<Box<dyn NestedScrollSink>>) {
        self.parent = parent;
        self.touch_active = false;
        self.non_touch_active = false;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.stop_nested_scroll(ScrollType::Touch);
            self.stop_nested_scroll(ScrollType::NonTouch);
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_nested_scrolling_parent(&self, scroll_type: ScrollType) -> bool {
        match scroll_type {
            ScrollType::Touch => self.touch_active,
            ScrollType::NonTouch => self.non_touch_active,
        }
    }

    fn set_active(&mut self, scroll_type: ScrollType, active: bool) {
        match scroll_type {
            ScrollType::Touch => self.touch_active = active,
            ScrollType::NonTouch => self.non_touch_active = active,
        }
    }

    pub fn start_nested_scroll(&mut self, axes: ScrollAxes, scroll_type: ScrollType) -> bool {
        if self.has_nested_scrolling_parent(scroll_type) {
            return true;
        }
        if !self.enabled {
            return false;
        }
        let Some(parent) = self.parent.as_mut() else {
            return false;
        };
        if parent.on_start_nested_scroll(axes, scroll_type) {
            parent.on_nested_scroll_accepted(axes, scroll_type);
            self.set_active(scroll_type, true);
            return true;
        }
        false
    }

    pub fn stop_nested_scroll(&mut self, scroll_type: ScrollType) {
        if !self.has_nested_scrolling_parent(scroll_type) {
            return;
        }
        if let Some(parent) = self.parent.as_mut() {
            parent.on_stop_nested_scroll(scroll_type);
        }
        self.set_active(scroll_type, false);
    }

    pub fn dispatch_nested_pre_scroll(
        &mut self,
        dx: i32,
        dy: i32,
        scroll_type: ScrollType,
    ) -> Option<(i32, i32)> {
        if !self.enabled || !self.has_nested_scrolling_parent(scroll_type) || (dx == 0 && dy == 0)
        {
            return None;
        }
        let parent = self.parent.as_mut()?;
        let consumed = parent.on_nested_pre_scroll(dx, dy, scroll_type);
        (consumed != (0, 0)).then_some(consumed)
    }

    pub fn dispatch_nested_scroll(
        &mut self,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
        scroll_type: ScrollType,
    ) -> (i32, i32) {
        if !self.enabled || !self.has_nested_scrolling_parent(scroll_type) {
            return (0, 0);
        }
        if dx_consumed == 0 && dy_consumed == 0 && dx_unconsumed == 0 && dy_unconsumed == 0 {
            return (0, 0);
        }
        match self.parent.as_mut() {
            Some(parent) => parent.on_nested_scroll(
                dx_consumed,
                dy_consumed,
                dx_unconsumed,
                dy_unconsumed,
                scroll_type,
            ),
            None => (0, 0),
        }
    }

    pub fn dispatch_nested_pre_fling(&mut self, velocity_x: f32, velocity_y: f32) -> bool {
        if !self.enabled || !self.touch_active {
            return false;
        }
        self.parent
            .as_mut()
            .is_some_and(|p| p.on_nested_pre_fling(velocity_x, velocity_y))
    }

    pub fn dispatch_nested_fling(&mut self, velocity_x: f32, velocity_y: f32, consumed: bool) -> bool {
        if !self.enabled || !self.touch_active {
            return false;
        }
        self.parent
            .as_mut()
            .is_some_and(|p| p.on_nested_fling(velocity_x, velocity_y, consumed))
    }

    /// Forward an interception request to the ancestor, if any
    pub fn request_disallow_intercept_touch_event(&mut self, disallow: bool) {
        if let Some(parent) = self.parent.as_mut() {
            parent.request_disallow_intercept_touch_event(disallow);
        }
    }

    /// Forward a spring-back container's own drag to the ancestor, if any
    pub fn request_internal_disallow_intercept(&mut self, disallow: bool) {
        if let Some(parent) = self.parent.as_mut() {
            parent.request_internal_disallow_intercept(disallow);
        }
    }
}

impl Default for NestedScrollForwarder {
    fn default() -> Self {
        Self::new()
    }
}
