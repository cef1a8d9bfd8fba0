use crate::sim::Float3;

use super::curve::{sample_segments, Curve};

/// Fraction of the segment length the handles extend along the segment.
const HANDLE_WEIGHT: f32 = 1.0 / 3.0;

/// Control polygon of one cubic segment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubicSegment {
    pub p0: Float3,
    pub p1: Float3,
    pub p2: Float3,
    pub p3: Float3,
}

impl CubicSegment {
    /// Handles one third along the segment, pushed sideways by
    /// `curve_strength * length`. Coincident endpoints give a collapsed
    /// segment instead of NaN handles.
    pub fn between(start: Float3, end: Float3, curve_strength: f32) -> Self {
        let delta = end - start;
        let length = delta.magnitude();
        let direction = delta.normalize();
        let lateral = direction.perpendicular() * (length * curve_strength);

        Self {
            p0: start,
            p1: start + direction * (length * HANDLE_WEIGHT) + lateral,
            p2: end - direction * (length * HANDLE_WEIGHT) + lateral,
            p3: end,
        }
    }

    pub fn evaluate(&self, u: f32) -> Float3 {
        let one_minus_u = 1.0 - u;
        let one_minus_u2 = one_minus_u * one_minus_u;
        let one_minus_u3 = one_minus_u2 * one_minus_u;
        let u2 = u * u;
        let u3 = u2 * u;

        self.p0 * one_minus_u3
            + self.p1 * (3.0 * one_minus_u2 * u)
            + self.p2 * (3.0 * one_minus_u * u2)
            + self.p3 * u3
    }
}

pub(crate) fn build(
    checkpoints: &[Float3],
    samples_per_segment: usize,
    curve_strength: f32,
) -> Curve {
    let segments: Vec<CubicSegment> = checkpoints
        .windows(2)
        .map(|pair| CubicSegment::between(pair[0], pair[1], curve_strength))
        .collect();

    sample_segments(checkpoints, samples_per_segment, |seg, t| {
        segments[seg].evaluate(t)
    })
}
