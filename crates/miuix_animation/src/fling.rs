//! Fling scroller
//!
//! A single-axis, time-based fling between bounds using Android's spline
//! deceleration model: the travel distance and duration are derived from the
//! launch velocity, and the position follows the matching deceleration curve.

/// `ln(0.78) / ln(0.9)`
const DECELERATION_RATE: f64 = 2.358_201_815_127_582;
const INFLEXION: f64 = 0.35;
const SCROLL_FRICTION: f64 = 0.015;
const GRAVITY_EARTH: f64 = 9.806_65;
const INCHES_PER_METER: f64 = 39.37;

/// Time-based fling along one axis
#[derive(Debug, Clone)]
pub struct FlingScroller {
    start: i32,
    /// Unclamped landing position of the curve
    curve_end: i32,
    min: i32,
    max: i32,
    current: i32,
    velocity: f32,
    duration_ms: u64,
    start_time_ms: u64,
    finished: bool,
    physical_coeff: f64,
}

impl FlingScroller {
    /// Create a scroller for a display with the given density (1.0 = 160 dpi)
    pub fn new(density: f32) -> Self {
        let ppi = density as f64 * 160.0;
        Self {
            start: 0,
            curve_end: 0,
            min: i32::MIN,
            max: i32::MAX,
            current: 0,
            velocity: 0.0,
            duration_ms: 0,
            start_time_ms: 0,
            finished: true,
            physical_coeff: GRAVITY_EARTH * INCHES_PER_METER * ppi * 0.84,
        }
    }

    fn spline_deceleration(&self, velocity: f32) -> f64 {
        (INFLEXION * velocity.abs() as f64 / (SCROLL_FRICTION * self.physical_coeff)).ln()
    }

    /// Distance (px) a fling at `velocity` travels before stopping
    pub fn spline_fling_distance(&self, velocity: f32) -> f64 {
        if velocity == 0.0 {
            return 0.0;
        }
        let l = self.spline_deceleration(velocity);
        let decel_minus_one = DECELERATION_RATE - 1.0;
        SCROLL_FRICTION * self.physical_coeff * (DECELERATION_RATE / decel_minus_one * l).exp()
    }

    /// Duration (ms) of a fling at `velocity`
    pub fn spline_fling_duration(&self, velocity: f32) -> u64 {
        if velocity == 0.0 {
            return 0;
        }
        let l = self.spline_deceleration(velocity);
        (1000.0 * (l / (DECELERATION_RATE - 1.0)).exp()) as u64
    }

    /// Start a fling from `start` with `velocity` (px/s), confined to `[min, max]`
    pub fn fling(&mut self, start: i32, velocity: f32, min: i32, max: i32, now_ms: u64) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.start = start;
        self.current = start.clamp(min, max);
        self.min = min;
        self.max = max;
        self.velocity = velocity;
        self.start_time_ms = now_ms;
        self.duration_ms = self.spline_fling_duration(velocity);
        let distance = self.spline_fling_distance(velocity) * (velocity.signum() as f64);
        self.curve_end = start.saturating_add(distance.round() as i32);
        self.finished = self.duration_ms == 0;

        tracing::debug!(
            "fling start={} v={:.1} distance={:.1} duration={}ms bounds=[{}, {}]",
            start,
            velocity,
            distance,
            self.duration_ms,
            min,
            max
        );
    }

    /// Advance to `now_ms`
    ///
    /// Returns false once the fling had already finished before this call;
    /// the call that reaches the end still returns true.
    pub fn compute_scroll_offset(&mut self, now_ms: u64) -> bool {
        if self.finished {
            return false;
        }

        let elapsed = now_ms.saturating_sub(self.start_time_ms);
        if elapsed >= self.duration_ms {
            self.current = self.curve_end.clamp(self.min, self.max);
            self.finished = true;
            return true;
        }

        let t = elapsed as f32 / self.duration_ms as f32;
        let fraction = decelerate(t, (DECELERATION_RATE / 2.0) as f32) as f64;
        let position = self.start as f64 + (self.curve_end - self.start) as f64 * fraction;
        self.current = (position.round() as i32).clamp(self.min, self.max);

        // Hitting a bound ends the fling early
        if (self.current == self.max && self.curve_end > self.max)
            || (self.current == self.min && self.curve_end < self.min)
        {
            self.finished = true;
        }
        true
    }

    /// Stop where the fling currently is
    pub fn abort_animation(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    /// Where the fling will come to rest
    pub fn final_position(&self) -> i32 {
        self.curve_end.clamp(self.min, self.max)
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

/// `1 − (1 − t)^(2·factor)`, Android's decelerate interpolator
fn decelerate(t: f32, factor: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    1.0 - (1.0 - t).powf(2.0 * factor)
}

impl Default for FlingScroller {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decelerate_curve() {
        assert_eq!(decelerate(0.0, 1.18), 0.0);
        assert_eq!(decelerate(1.0, 1.18), 1.0);
        assert_eq!(decelerate(-0.5, 1.18), 0.0);
        assert_eq!(decelerate(1.5, 1.18), 1.0);
        // Factor one is the plain quadratic ease-out
        for t in [0.1, 0.35, 0.8] {
            let quad = 1.0 - (1.0 - t) * (1.0 - t);
            assert!((decelerate(t, 1.0) - quad).abs() < 1e-6);
        }
        assert!(decelerate(0.3, 1.18) > 0.3);
    }

    #[test]
    fn test_faster_flings_travel_further() {
        let scroller = FlingScroller::new(2.75);
        let slow = scroller.spline_fling_distance(1000.0);
        let fast = scroller.spline_fling_distance(4000.0);
        assert!(slow > 0.0);
        assert!(fast > slow);
        assert!(scroller.spline_fling_duration(4000.0) > scroller.spline_fling_duration(1000.0));
    }

    #[test]
    fn test_zero_velocity_finishes_immediately() {
        let mut scroller = FlingScroller::default();
        scroller.fling(120, 0.0, 0, 300, 0);
        assert!(scroller.is_finished());
        assert!(!scroller.compute_scroll_offset(16));
        assert_eq!(scroller.current(), 120);
    }

    #[test]
    fn test_fling_stops_at_bound() {
        let mut scroller = FlingScroller::new(2.75);
        scroller.fling(200, 4000.0, 0, 300, 0);
        assert_eq!(scroller.final_position(), 300);

        let mut now = 0;
        let mut last = 200;
        while scroller.compute_scroll_offset(now) {
            assert!(scroller.current() >= last);
            assert!(scroller.current() <= 300);
            last = scroller.current();
            now += 16;
            assert!(now < 10_000);
        }
        assert_eq!(scroller.current(), 300);
    }

    #[test]
    fn test_negative_fling_moves_down() {
        let mut scroller = FlingScroller::new(2.75);
        scroller.fling(100, -3000.0, 0, 300, 0);
        scroller.compute_scroll_offset(16);
        assert!(scroller.current() < 100);
    }

    #[test]
    fn test_abort_keeps_position() {
        let mut scroller = FlingScroller::new(2.75);
        scroller.fling(0, 2000.0, -1000, 1000, 0);
        scroller.compute_scroll_offset(32);
        let at = scroller.current();
        scroller.abort_animation();
        assert!(!scroller.compute_scroll_offset(64));
        assert_eq!(scroller.current(), at);
    }
}
