use rand::Rng;
use serde::{Deserialize, Serialize};

use super::physics::{ramp, MIN_SPEED_RATIO};
use crate::error::PathError;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedPolicy {
    #[default]
    Uniform,
    CheckpointShaped,
}

/// Per-sample target speed. Never empty; every entry is strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedProfile {
    speeds: Vec<f32>,
}

impl SpeedProfile {
    /// Uses `base_speed` at every one of `len` samples.
    pub fn constant(len: usize, base_speed: f32) -> Result<Self, PathError> {
        validate(base_speed, 0.0)?;
        Ok(Self {
            speeds: vec![base_speed; len.max(1)],
        })
    }

    /// Every sample gets `base_speed` scaled by a factor drawn from
    /// `[1 - variation, 1 + variation]`.
    pub fn uniform<R: Rng + ?Sized>(
        len: usize,
        base_speed: f32,
        variation: f32,
        rng: &mut R,
    ) -> Result<Self, PathError> {
        validate(base_speed, variation)?;
        if len == 0 {
            return Ok(Self::degenerate(base_speed));
        }
        let speeds = (0..len)
            .map(|_| finish(base_speed, 1.0, variation, rng))
            .collect();
        Ok(Self { speeds })
    }

    /// Slows into each interior checkpoint and eases in and out at the ends.
    ///
    /// `boundaries` are the sample indices of the checkpoints, ascending;
    /// consecutive pairs delimit the ranges that get shaped.
    pub fn checkpoint_shaped<R: Rng + ?Sized>(
        boundaries: &[usize],
        len: usize,
        base_speed: f32,
        variation: f32,
        rng: &mut R,
    ) -> Result<Self, PathError> {
        validate(base_speed, variation)?;
        if len == 0 {
            return Ok(Self::degenerate(base_speed));
        }
        if boundaries.windows(2).any(|w| w[1] < w[0]) {
            return Err(PathError::invalid(
                "boundaries",
                "checkpoint sample indices must be ascending",
            ));
        }

        let ranges = boundaries.len().saturating_sub(1).max(1);
        let speeds = (0..len)
            .map(|i| {
                let (range, progress) = locate(boundaries, len, i);
                let factor = shape_factor(range, ranges, progress);
                finish(base_speed, factor, variation, rng)
            })
            .collect();
        Ok(Self { speeds })
    }

    /// Same shaping over `checkpoint_count - 1` equal-width ranges.
    pub fn checkpoint_shaped_even<R: Rng + ?Sized>(
        len: usize,
        checkpoint_count: usize,
        base_speed: f32,
        variation: f32,
        rng: &mut R,
    ) -> Result<Self, PathError> {
        let boundaries = even_boundaries(len, checkpoint_count);
        Self::checkpoint_shaped(&boundaries, len, base_speed, variation, rng)
    }

    fn degenerate(base_speed: f32) -> Self {
        Self {
            speeds: vec![base_speed],
        }
    }

    /// Speed at `index`, reusing the last entry past the end.
    pub fn speed_at(&self, index: usize) -> Option<f32> {
        self.speeds.get(index).or(self.speeds.last()).copied()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.speeds
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }
}

fn validate(base_speed: f32, variation: f32) -> Result<(), PathError> {
    if !(base_speed.is_finite() && base_speed > 0.0) {
        return Err(PathError::invalid(
            "base_speed",
            format!("must be a positive finite number, got {base_speed}"),
        ));
    }
    if !(variation.is_finite() && (0.0..1.0).contains(&variation)) {
        return Err(PathError::invalid(
            "variation",
            format!("must be in [0, 1), got {variation}"),
        ));
    }
    Ok(())
}

fn finish<R: Rng + ?Sized>(base_speed: f32, factor: f32, variation: f32, rng: &mut R) -> f32 {
    let jitter = if variation > 0.0 {
        rng.random_range(1.0 - variation..=1.0 + variation)
    } else {
        1.0
    };
    (base_speed * factor * jitter).max(base_speed * MIN_SPEED_RATIO)
}

/// Splits `len` samples into `checkpoint_count - 1` contiguous ranges.
fn even_boundaries(len: usize, checkpoint_count: usize) -> Vec<usize> {
    let ranges = checkpoint_count.saturating_sub(1).max(1);
    let last = len.saturating_sub(1);
    (0..=ranges).map(|k| k * last / ranges).collect()
}

/// Range index and progress within it for sample `index`.
fn locate(boundaries: &[usize], len: usize, index: usize) -> (usize, f32) {
    if boundaries.len() < 2 {
        let span = len.saturating_sub(1).max(1);
        return (0, index as f32 / span as f32);
    }
    let range = boundaries
        .partition_point(|&b| b <= index)
        .saturating_sub(1)
        .min(boundaries.len() - 2);
    let start = boundaries[range];
    let end = boundaries[range + 1];
    if end <= start {
        return (range, 1.0);
    }
    let progress = index.saturating_sub(start) as f32 / (end - start) as f32;
    (range, progress.clamp(0.0, 1.0))
}

/// Trapezoidal speed factor for `progress` through range `range` of `ranges`.
fn shape_factor(range: usize, ranges: usize, progress: f32) -> f32 {
    let is_first = range == 0;
    let is_last = range + 1 >= ranges;

    match (is_first, is_last) {
        (true, true) => {
            if progress < 0.3 {
                0.3 + 0.7 * ramp(progress, 0.0, 0.3)
            } else if progress <= 0.7 {
                1.0
            } else {
                1.0 - 0.7 * ramp(progress, 0.7, 1.0)
            }
        }
        (true, false) => {
            if progress < 0.3 {
                0.3 + 0.7 * ramp(progress, 0.0, 0.3)
            } else {
                1.0
            }
        }
        (false, true) => {
            if progress <= 0.7 {
                1.0
            } else {
                1.0 - 0.7 * ramp(progress, 0.7, 1.0)
            }
        }
        (false, false) => {
            if progress < 0.4 {
                1.0 - 0.5 * ramp(progress, 0.0, 0.4)
            } else if progress <= 0.6 {
                0.5
            } else {
                0.5 + 0.5 * ramp(progress, 0.6, 1.0)
            }
        }
    }
}
