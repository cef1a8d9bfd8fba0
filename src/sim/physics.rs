/// Host tick rate the defaults are tuned for.
pub const HZ: f32 = 60.0;
pub const DT: f32 = 1.0 / HZ;
pub const EPSILON: f32 = 1.192_093e-7;

/// Speed substituted when a profile entry is missing or unusable (m/s).
pub const DEFAULT_SPEED: f32 = 2.0;
/// Distance under which the current target sample counts as reached (m).
pub const ARRIVAL_THRESHOLD: f32 = 0.3;
/// Distance under which a tracked checkpoint counts as passed (m).
pub const CHECKPOINT_RADIUS: f32 = 1.0;
/// Lower bound of any speed profile entry, as a fraction of the base speed.
pub const MIN_SPEED_RATIO: f32 = 0.1;

/// Returns `speed` if it can drive motion, otherwise `fallback`.
///
/// A zero, negative or non-finite entry would stall the body, so it never
/// reaches the integrator.
pub fn usable_speed(speed: f32, fallback: f32) -> f32 {
    if speed.is_finite() && speed > 0.0 {
        return speed;
    }
    if fallback.is_finite() && fallback > 0.0 {
        fallback
    } else {
        DEFAULT_SPEED
    }
}

/// Maps `value` from `[lo, hi]` onto `[0, 1]`, clamped.
pub fn ramp(value: f32, lo: f32, hi: f32) -> f32 {
    if hi - lo <= EPSILON {
        return if value >= hi { 1.0 } else { 0.0 };
    }
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}
