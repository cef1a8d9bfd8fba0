use serde::{Deserialize, Serialize};

use super::math::{Float3, Quaternion};
use super::physics::ramp;
use crate::error::PathError;

/// Angles closer than this to 0 or 180 degrees skip the axis-angle path.
const PARALLEL_DOT: f32 = 0.9999;

/// Smoothing and lookup settings for camera orientation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationParams {
    /// Local axis the body looks along at identity rotation.
    pub forward: Float3,
    pub min_blend: f32,
    pub max_blend: f32,
    /// At or below this speed the rotation blends at `min_blend`.
    pub low_speed: f32,
    /// At or above this speed the rotation blends at `max_blend`.
    pub high_speed: f32,
    pub min_tangent_length: f32,
    /// How many samples past the next one to search for a usable tangent.
    pub lookahead: usize,
}

impl Default for OrientationParams {
    fn default() -> Self {
        Self {
            forward: Float3::BACK,
            min_blend: 0.05,
            max_blend: 0.3,
            low_speed: 0.5,
            high_speed: 5.0,
            min_tangent_length: 1e-3,
            lookahead: 3,
        }
    }
}

impl OrientationParams {
    pub fn validate(&self) -> Result<(), PathError> {
        if !self.forward.is_finite() || self.forward.normalize() == Float3::ZERO {
            return Err(PathError::invalid("forward", "must be a non-zero vector"));
        }
        for (name, value) in [("min_blend", self.min_blend), ("max_blend", self.max_blend)] {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(PathError::invalid(
                    name,
                    format!("must be in [0, 1], got {value}"),
                ));
            }
        }
        if !(self.low_speed.is_finite()
            && self.high_speed.is_finite()
            && self.low_speed <= self.high_speed)
        {
            return Err(PathError::invalid(
                "low_speed",
                format!(
                    "must not exceed high_speed ({} > {})",
                    self.low_speed, self.high_speed
                ),
            ));
        }
        if !(self.min_tangent_length.is_finite() && self.min_tangent_length > 0.0) {
            return Err(PathError::invalid(
                "min_tangent_length",
                format!("must be positive, got {}", self.min_tangent_length),
            ));
        }
        Ok(())
    }
}

/// Turns a body's forward axis toward the direction of travel, easing in
/// faster as the body speeds up.
#[derive(Debug, Clone)]
pub struct OrientationTracker {
    params: OrientationParams,
    rotation: Quaternion,
}

impl OrientationTracker {
    pub fn new(params: OrientationParams) -> Self {
        Self {
            params,
            rotation: Quaternion::IDENTITY,
        }
    }

    pub fn params(&self) -> &OrientationParams {
        &self.params
    }

    /// Last applied rotation.
    pub fn rotation(&self) -> Quaternion {
        self.rotation
    }

    /// Unit direction of travel at `position`.
    ///
    /// Anchors on the nearest sample. From there the tangent points at the
    /// next sample far enough away to give a direction; on the last sample
    /// it is the final segment's direction. Falls back to `UP`.
    pub fn tangent(&self, position: Float3, samples: &[Float3]) -> Float3 {
        let Some(nearest) = nearest_index(position, samples) else {
            return Float3::UP;
        };
        let min_length = self.params.min_tangent_length;
        let last = samples.len() - 1;

        if nearest < last {
            let end = (nearest + 1 + self.params.lookahead).min(last);
            for &sample in &samples[nearest + 1..=end] {
                let dir = sample - position;
                if dir.magnitude() >= min_length {
                    return dir.normalize();
                }
            }
        } else if last > 0 {
            let dir = samples[last] - samples[last - 1];
            if dir.magnitude() >= min_length {
                return dir.normalize();
            }
        }
        Float3::UP
    }

    /// Shortest rotation taking `forward` onto `tangent`.
    pub fn rotation_between(forward: Float3, tangent: Float3) -> Quaternion {
        let from = forward.normalize();
        let to = tangent.normalize();
        if from == Float3::ZERO || to == Float3::ZERO {
            return Quaternion::IDENTITY;
        }

        let dot = from.dot(to).clamp(-1.0, 1.0);
        if dot > PARALLEL_DOT {
            return Quaternion::IDENTITY;
        }
        if dot < -PARALLEL_DOT {
            return Quaternion::from_axis_angle(from.perpendicular(), std::f32::consts::PI);
        }
        Quaternion::from_axis_angle(from.cross(to), dot.acos())
    }

    /// Slerp weight for a body moving at `speed`.
    pub fn blend_factor(&self, speed: f32) -> f32 {
        let p = &self.params;
        let t = if speed.is_finite() {
            ramp(speed, p.low_speed, p.high_speed)
        } else {
            0.0
        };
        p.min_blend + (p.max_blend - p.min_blend) * t
    }

    /// Eases the stored rotation toward the direction of travel and returns it.
    pub fn update(&mut self, position: Float3, samples: &[Float3], speed: f32) -> Quaternion {
        let tangent = self.tangent(position, samples);
        let target = Self::rotation_between(self.params.forward, tangent);
        self.rotation = self.rotation.slerp(target, self.blend_factor(speed));
        self.rotation
    }

    pub fn reset(&mut self) {
        self.rotation = Quaternion::IDENTITY;
    }
}

fn nearest_index(position: Float3, samples: &[Float3]) -> Option<usize> {
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| (i, s.distance(position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
