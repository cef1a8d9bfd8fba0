use crate::sim::Float3;

use super::curve::{sample_segments, Curve};

const HANDLE_REACH: f32 = 0.3;
const HANDLE_LIFT: f32 = 0.2;
const EXTREMA_LIFT: f32 = 0.3;
const EXTREMA_INFLUENCE: f32 = 0.3;

/// Control points for one stop-and-go segment.
#[derive(Debug, Copy, Clone, PartialEq)]
struct ExtremaSegment {
    start: Float3,
    end: Float3,
    decel: Float3,
    accel: Float3,
    /// Offset of the extrema control point from the segment midpoint.
    bump: Float3,
}

impl ExtremaSegment {
    fn between(start: Float3, end: Float3) -> Self {
        let delta = end - start;
        let length = delta.magnitude();
        let direction = delta.normalize();
        let lateral = direction.perpendicular();
        let mid = start.lerp(end, 0.5);
        let extrema = mid + lateral * (length * EXTREMA_LIFT);

        Self {
            start,
            end,
            decel: start + direction * (length * HANDLE_REACH) + lateral * (length * HANDLE_LIFT),
            accel: end - direction * (length * HANDLE_REACH) + lateral * (length * HANDLE_LIFT),
            bump: extrema - mid,
        }
    }

    /// First half runs start → decel, second half accel → end, plus a
    /// lateral bump peaking at the midpoint.
    fn evaluate(&self, t: f32) -> Float3 {
        let base = if t < 0.5 {
            self.start.lerp(self.decel, 2.0 * t)
        } else {
            self.accel.lerp(self.end, 2.0 * (t - 0.5))
        };
        let weight = EXTREMA_INFLUENCE * (1.0 - (2.0 * t - 1.0).abs());
        base + self.bump * weight
    }
}

pub(crate) fn build(checkpoints: &[Float3], samples_per_segment: usize) -> Curve {
    let segments: Vec<ExtremaSegment> = checkpoints
        .windows(2)
        .map(|pair| ExtremaSegment::between(pair[0], pair[1]))
        .collect();

    sample_segments(checkpoints, samples_per_segment, |seg, t| {
        segments[seg].evaluate(t)
    })
}
