//! Touch events
//!
//! A platform-neutral rendition of Android's `MotionEvent`: one action plus
//! the full set of pointers that are down when the action happens.

use smallvec::SmallVec;

/// Touch action carried by a [`MotionEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionAction {
    /// First pointer went down
    Down,
    /// Last pointer went up
    Up,
    /// One or more pointers moved
    Move,
    /// Gesture aborted by the host (e.g. parent took over)
    Cancel,
    /// A non-primary pointer went down
    PointerDown,
    /// A non-primary pointer went up
    PointerUp,
}

/// A single touch pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Pointer ID (stable for the pointer's lifetime)
    pub id: i32,
    /// X coordinate relative to the receiving view
    pub x: f32,
    /// Y coordinate relative to the receiving view
    pub y: f32,
    /// X coordinate in window space
    pub raw_x: f32,
    /// Y coordinate in window space
    pub raw_y: f32,
}

impl Pointer {
    /// Pointer whose view and window coordinates coincide
    pub fn new(id: i32, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            raw_x: x,
            raw_y: y,
        }
    }

    /// Set window-space coordinates
    pub fn with_raw(mut self, raw_x: f32, raw_y: f32) -> Self {
        self.raw_x = raw_x;
        self.raw_y = raw_y;
        self
    }
}

/// A touch event delivered by the host toolkit
#[derive(Debug, Clone)]
pub struct MotionEvent {
    pub action: MotionAction,
    /// Index into `pointers` of the pointer that triggered
    /// `PointerDown`/`PointerUp` (0 for other actions)
    pub action_index: usize,
    pub pointers: SmallVec<[Pointer; 4]>,
    /// Event timestamp in milliseconds
    pub event_time_ms: u64,
}

impl MotionEvent {
    pub fn new(action: MotionAction, pointers: impl IntoIterator<Item = Pointer>) -> Self {
        Self {
            action,
            action_index: 0,
            pointers: pointers.into_iter().collect(),
            event_time_ms: 0,
        }
    }

    /// Single-pointer event
    pub fn single(action: MotionAction, id: i32, x: f32, y: f32) -> Self {
        Self::new(action, [Pointer::new(id, x, y)])
    }

    pub fn with_action_index(mut self, index: usize) -> Self {
        self.action_index = index;
        self
    }

    pub fn with_time(mut self, event_time_ms: u64) -> Self {
        self.event_time_ms = event_time_ms;
        self
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// ID of the pointer at `index`
    pub fn pointer_id(&self, index: usize) -> Option<i32> {
        self.pointers.get(index).map(|p| p.id)
    }

    /// Index of the pointer with the given ID, if it is part of this event
    pub fn find_pointer_index(&self, id: i32) -> Option<usize> {
        self.pointers.iter().position(|p| p.id == id)
    }

    pub fn x(&self, index: usize) -> Option<f32> {
        self.pointers.get(index).map(|p| p.x)
    }

    pub fn y(&self, index: usize) -> Option<f32> {
        self.pointers.get(index).map(|p| p.y)
    }

    pub fn raw_x(&self, index: usize) -> Option<f32> {
        self.pointers.get(index).map(|p| p.raw_x)
    }

    pub fn raw_y(&self, index: usize) -> Option<f32> {
        self.pointers.get(index).map(|p| p.raw_y)
    }

    /// The pointer that triggered this action
    pub fn action_pointer(&self) -> Option<&Pointer> {
        self.pointers.get(self.action_index)
    }

    /// True for `Up` and `Cancel`, the two actions that end a gesture
    pub fn is_gesture_end(&self) -> bool {
        matches!(self.action, MotionAction::Up | MotionAction::Cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_pointer_index() {
        let event = MotionEvent::new(
            MotionAction::Move,
            [Pointer::new(4, 10.0, 20.0), Pointer::new(7, 30.0, 40.0)],
        );

        assert_eq!(event.find_pointer_index(7), Some(1));
        assert_eq!(event.find_pointer_index(5), None);
        assert_eq!(event.y(1), Some(40.0));
        assert_eq!(event.y(2), None);
    }

    #[test]
    fn test_action_pointer() {
        let event = MotionEvent::new(
            MotionAction::PointerDown,
            [Pointer::new(0, 1.0, 2.0), Pointer::new(1, 3.0, 4.0)],
        )
        .with_action_index(1);

        assert_eq!(event.action_pointer().map(|p| p.id), Some(1));
        assert!(!event.is_gesture_end());
    }

    #[test]
    fn test_raw_coordinates_default_to_view_coordinates() {
        let pointer = Pointer::new(0, 5.0, 6.0);
        assert_eq!((pointer.raw_x, pointer.raw_y), (5.0, 6.0));

        let pointer = pointer.with_raw(105.0, 206.0);
        assert_eq!((pointer.raw_x, pointer.raw_y), (105.0, 206.0));
    }
}
