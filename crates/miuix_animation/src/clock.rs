//! Frame clocks
//!
//! Animations never read time themselves; the owner passes a clock in.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of animation frame timestamps in milliseconds
pub trait FrameClock {
    fn now_ms(&self) -> u64;
}

/// Monotonic wall clock measured from its creation
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-advanced clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, delta_ms: u64) -> u64 {
        let now = self.now.get() + delta_ms;
        self.now.set(now);
        now
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }
}

impl FrameClock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
