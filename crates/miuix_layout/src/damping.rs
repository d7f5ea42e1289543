//! Overscroll damping curve
//!
//! Maps "virtual" touch travel past an edge to the visible displacement:
//!
//! ```text
//! damped(x) = (x − x² + x³/3) · range        x = travel / range, x ∈ [0, 1]
//! ```
//!
//! The curve starts with slope 1, flattens to slope 0 at `x = 1` and tops out
//! at `range / 3`. [`touch_distance`] is its inverse, used whenever a gesture
//! re-grabs an existing displacement and has to continue on the same curve.

/// Visible displacement for a normalized travel `fraction` (clamped to `[0, 1]`)
pub fn damped(fraction: f32, range: f32) -> f32 {
    let x = fraction.clamp(0.0, 1.0);
    (x - x * x + x * x * x / 3.0) * range
}

/// Visible displacement for a touch travel of `distance` pixels
pub fn spring_back_distance(distance: f32, range: f32) -> f32 {
    if range <= 0.0 {
        return 0.0;
    }
    damped((distance.abs() / range).min(1.0), range)
}

/// Largest displacement the curve can produce (`range / 3`)
pub fn max_spring_back_distance(range: f32) -> f32 {
    damped(1.0, range)
}

/// Touch travel that produces the visible displacement `offset`
///
/// Saturates at `range` once `offset` reaches the top of the curve.
pub fn touch_distance(offset: f32, range: f32) -> f32 {
    if range <= 0.0 {
        return 0.0;
    }
    let offset = offset.abs();
    if offset == 0.0 {
        return 0.0;
    }
    if offset >= range / 3.0 {
        return range;
    }
    range - range.powf(2.0 / 3.0) * (range - 3.0 * offset).cbrt()
}
