//! Animation scheduler
//!
//! Runs every posted [`FrameTicker`] once per frame and drops the ones that
//! report they are done. The scheduler is a cheap handle: clones share the
//! same ticker set, so an animation owner can keep one around (through a
//! [`FrameRequester`]) and ask for frames on itself while it is being ticked.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

use crate::clock::FrameClock;

new_key_type! {
    pub struct TickerId;
}

/// Something that animates frame by frame
pub trait FrameTicker {
    /// Advance to `frame_time_ms`; return true to be called again next frame
    fn tick(&mut self, frame_time_ms: u64) -> bool;
}

type SharedTicker = Rc<RefCell<dyn FrameTicker>>;

struct SchedulerInner {
    tickers: SlotMap<TickerId, SharedTicker>,
    frame_count: u64,
    last_frame_ms: Option<u64>,
}

/// The animation scheduler that ticks all active animations
#[derive(Clone)]
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
    clock: Rc<dyn FrameClock>,
}

impl AnimationScheduler {
    pub fn new(clock: Rc<dyn FrameClock>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                tickers: SlotMap::with_key(),
                frame_count: 0,
                last_frame_ms: None,
            })),
            clock,
        }
    }

    /// Schedule `ticker` for the next frame
    ///
    /// Posting a ticker that is already scheduled returns its existing id.
    pub fn post(&self, ticker: SharedTicker) -> TickerId {
        let mut inner = self.inner.borrow_mut();
        if let Some((id, _)) = inner.tickers.iter().find(|(_, t)| Rc::ptr_eq(t, &ticker)) {
            return id;
        }
        inner.tickers.insert(ticker)
    }

    /// Remove a ticker; returns false if it was not scheduled
    pub fn cancel(&self, id: TickerId) -> bool {
        self.inner.borrow_mut().tickers.remove(id).is_some()
    }

    pub fn is_posted(&self, id: TickerId) -> bool {
        self.inner.borrow().tickers.contains_key(id)
    }

    /// Handle that lets `ticker` schedule itself later
    pub fn requester_for(&self, ticker: &SharedTicker) -> FrameRequester {
        FrameRequester {
            scheduler: self.clone(),
            ticker: Rc::downgrade(ticker),
        }
    }

    /// Run one frame at the clock's current time
    ///
    /// Returns the number of tickers still scheduled afterwards.
    pub fn tick(&self) -> usize {
        let now = self.clock.now_ms();
        let snapshot: Vec<(TickerId, SharedTicker)> = {
            let mut inner = self.inner.borrow_mut();
            inner.frame_count += 1;
            inner.last_frame_ms = Some(now);
            inner
                .tickers
                .iter()
                .map(|(id, t)| (id, Rc::clone(t)))
                .collect()
        };

        let mut done = Vec::new();
        for (id, ticker) in snapshot {
            // Tickers may post or cancel while running, so no scheduler
            // borrow is held here
            let keep = match ticker.try_borrow_mut() {
                Ok(mut ticker) => ticker.tick(now),
                Err(_) => {
                    tracing::warn!("ticker {:?} is busy, skipping frame at {}ms", id, now);
                    true
                }
            };
            if !keep {
                done.push(id);
            }
        }

        let mut inner = self.inner.borrow_mut();
        for id in done {
            inner.tickers.remove(id);
        }
        tracing::trace!("frame {} at {}ms, {} active", inner.frame_count, now, inner.tickers.len());
        inner.tickers.len()
    }

    /// Check if any animations are still scheduled
    pub fn has_active_animations(&self) -> bool {
        !self.inner.borrow().tickers.is_empty()
    }

    pub fn ticker_count(&self) -> usize {
        self.inner.borrow().tickers.len()
    }

    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame_count
    }

    pub fn last_frame_ms(&self) -> Option<u64> {
        self.inner.borrow().last_frame_ms
    }
}

/// Posts one ticker back onto its scheduler on demand
///
/// Holds the ticker weakly so the owner can store its own requester.
#[derive(Clone)]
pub struct FrameRequester {
    scheduler: AnimationScheduler,
    ticker: Weak<RefCell<dyn FrameTicker>>,
}

impl FrameRequester {
    /// Ask for the ticker to run on the next frame
    pub fn request_frame(&self) {
        if let Some(ticker) = self.ticker.upgrade() {
            self.scheduler.post(ticker);
        }
    }
}

impl std::fmt::Debug for FrameRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRequester")
            .field("alive", &(self.ticker.strong_count() > 0))
            .finish()
    }
}
