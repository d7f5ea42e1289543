//! Gesture orientation classifier
//!
//! Watches a gesture from DOWN and locks it to the axis that first moves
//! past the touch slop. Used by [`SpringBackLayout`](crate::SpringBackLayout)
//! in `Angle` mode, where either axis may overscroll.

use miuix_core::{MotionAction, MotionEvent, Rect, ScrollOrientation};

/// Per-gesture orientation lock and target hit test
#[derive(Debug, Clone)]
pub struct SpringBackLayoutHelper {
    touch_slop: f32,
    active_pointer_id: Option<i32>,
    initial_down_x: f32,
    initial_down_y: f32,
    scroll_orientation: ScrollOrientation,
}

impl SpringBackLayoutHelper {
    pub fn new(touch_slop: f32) -> Self {
        Self {
            touch_slop,
            active_pointer_id: None,
            initial_down_x: 0.0,
            initial_down_y: 0.0,
            scroll_orientation: ScrollOrientation::Unchecked,
        }
    }

    /// Whether the primary pointer's screen position falls inside `bounds`
    pub fn is_touch_in_target(&self, event: &MotionEvent, bounds: Rect) -> bool {
        let Some(id) = event.pointer_id(0) else {
            return false;
        };
        let Some(index) = event.find_pointer_index(id) else {
            return false;
        };
        match (event.raw_x(index), event.raw_y(index)) {
            (Some(x), Some(y)) => bounds.contains(x as i32, y as i32),
            _ => false,
        }
    }

    /// Feed one touch event and update the orientation lock
    pub fn handle_touch_event(&mut self, event: &MotionEvent) {
        match event.action {
            MotionAction::Down => {
                let Some(id) = event.pointer_id(0) else {
                    return;
                };
                let Some(index) = event.find_pointer_index(id) else {
                    return;
                };
                self.active_pointer_id = Some(id);
                self.initial_down_x = event.x(index).unwrap_or_default();
                self.initial_down_y = event.y(index).unwrap_or_default();
                self.scroll_orientation = ScrollOrientation::Unchecked;
            }
            MotionAction::Move => {
                let Some(id) = self.active_pointer_id else {
                    tracing::error!("orientation check got MOVE without an active pointer");
                    return;
                };
                let Some(index) = event.find_pointer_index(id) else {
                    tracing::error!("invalid pointer id {} for orientation check", id);
                    return;
                };
                if self.scroll_orientation != ScrollOrientation::Unchecked {
                    return;
                }
                let (Some(x), Some(y)) = (event.x(index), event.y(index)) else {
                    return;
                };
                let dx = (x - self.initial_down_x).abs();
                let dy = (y - self.initial_down_y).abs();
                if dx > self.touch_slop || dy > self.touch_slop {
                    self.scroll_orientation = if dx > dy {
                        ScrollOrientation::Horizontal
                    } else {
                        ScrollOrientation::Vertical
                    };
                    tracing::debug!(
                        "gesture locked {:?} (dx={:.1} dy={:.1})",
                        self.scroll_orientation,
                        dx,
                        dy
                    );
                }
            }
            MotionAction::Up | MotionAction::Cancel => {
                self.scroll_orientation = ScrollOrientation::Unchecked;
                self.active_pointer_id = None;
            }
            MotionAction::PointerDown | MotionAction::PointerUp => {}
        }
    }

    pub fn scroll_orientation(&self) -> ScrollOrientation {
        self.scroll_orientation
    }

    pub fn active_pointer_id(&self) -> Option<i32> {
        self.active_pointer_id
    }

    pub fn initial_down(&self) -> (f32, f32) {
        (self.initial_down_x, self.initial_down_y)
    }

    pub fn set_touch_slop(&mut self, touch_slop: f32) {
        self.touch_slop = touch_slop;
    }
}
