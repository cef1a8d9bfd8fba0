use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PathError;
use crate::sim::Float3;

use super::{bezier, extrema, spline};

pub const DEFAULT_CURVE_STRENGTH: f32 = 0.2;

fn default_curve_strength() -> f32 {
    DEFAULT_CURVE_STRENGTH
}

/// Which boundary conditions the global spline strategy ended up using.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplineFit {
    Periodic,
    Natural,
    Linear,
}

/// Interpolation strategy used to densify a checkpoint list.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveStrategy {
    /// Piecewise cubic Bezier with handles offset sideways by
    /// `curve_strength * segment_length`.
    Bezier {
        #[serde(default = "default_curve_strength")]
        curve_strength: f32,
    },
    /// One cubic spline per axis over the checkpoint index.
    Spline,
    /// Split-weight Bezier that slows into each checkpoint. Cosmetic only:
    /// the tangent at a checkpoint has a kink rather than a true zero.
    Extrema,
}

impl Default for CurveStrategy {
    fn default() -> Self {
        CurveStrategy::Bezier {
            curve_strength: DEFAULT_CURVE_STRENGTH,
        }
    }
}

impl CurveStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            CurveStrategy::Bezier { .. } => "bezier",
            CurveStrategy::Spline => "spline",
            CurveStrategy::Extrema => "extrema",
        }
    }

    /// Builds the sampled curve through `checkpoints`.
    ///
    /// Fewer than two checkpoints come back unchanged. The first and last
    /// samples always equal the first and last checkpoint exactly.
    pub fn build(
        &self,
        checkpoints: &[Float3],
        samples_per_segment: usize,
    ) -> Result<Curve, PathError> {
        if samples_per_segment < 1 {
            return Err(PathError::invalid(
                "samples_per_segment",
                format!("must be at least 1, got {samples_per_segment}"),
            ));
        }
        if let CurveStrategy::Bezier { curve_strength } = self {
            if !curve_strength.is_finite() {
                return Err(PathError::invalid(
                    "curve_strength",
                    format!("must be finite, got {curve_strength}"),
                ));
            }
        }
        if let Some(index) = checkpoints.iter().position(|p| !p.is_finite()) {
            return Err(PathError::invalid(
                "checkpoints",
                format!("checkpoint {index} has a non-finite coordinate"),
            ));
        }
        if checkpoints.len() < 2 {
            return Ok(Curve::from_checkpoints(checkpoints));
        }

        let mut curve = match *self {
            CurveStrategy::Bezier { curve_strength } => {
                bezier::build(checkpoints, samples_per_segment, curve_strength)
            }
            CurveStrategy::Spline => spline::build(checkpoints, samples_per_segment),
            CurveStrategy::Extrema => extrema::build(checkpoints, samples_per_segment),
        };
        curve.pin_endpoints(checkpoints);

        debug!(
            strategy = self.name(),
            checkpoints = checkpoints.len(),
            samples = curve.len(),
            fit = ?curve.fit(),
            "built curve"
        );
        Ok(curve)
    }
}

/// Dense, immutable sampling of a path through its checkpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    samples: Vec<Float3>,
    /// Sample index that corresponds to each input checkpoint.
    checkpoint_indices: Vec<usize>,
    fit: Option<SplineFit>,
}

impl Curve {
    /// Polyline curve whose samples are the checkpoints themselves.
    pub fn from_checkpoints(checkpoints: &[Float3]) -> Self {
        Self {
            samples: checkpoints.to_vec(),
            checkpoint_indices: (0..checkpoints.len()).collect(),
            fit: None,
        }
    }

    pub(crate) fn from_parts(
        samples: Vec<Float3>,
        checkpoint_indices: Vec<usize>,
        fit: Option<SplineFit>,
    ) -> Self {
        Self {
            samples,
            checkpoint_indices,
            fit,
        }
    }

    pub fn samples(&self) -> &[Float3] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Float3> {
        self.samples.get(index).copied()
    }

    pub fn first(&self) -> Option<Float3> {
        self.samples.first().copied()
    }

    pub fn last(&self) -> Option<Float3> {
        self.samples.last().copied()
    }

    pub fn checkpoint_indices(&self) -> &[usize] {
        &self.checkpoint_indices
    }

    pub fn fit(&self) -> Option<SplineFit> {
        self.fit
    }

    /// Whether `index` sits exactly on an input checkpoint.
    pub fn is_checkpoint_sample(&self, index: usize) -> bool {
        self.checkpoint_indices.binary_search(&index).is_ok()
    }

    /// Progress of sample `index` through its checkpoint segment, in `[0, 1]`.
    pub fn segment_progress(&self, index: usize) -> f32 {
        let bounds = &self.checkpoint_indices;
        if bounds.len() < 2 {
            return 0.0;
        }
        let seg = bounds
            .partition_point(|&b| b <= index)
            .saturating_sub(1)
            .min(bounds.len() - 2);
        let start = bounds[seg];
        let end = bounds[seg + 1];
        if end <= start {
            return 0.0;
        }
        ((index.saturating_sub(start)) as f32 / (end - start) as f32).clamp(0.0, 1.0)
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [Float3] {
        &mut self.samples
    }

    fn pin_endpoints(&mut self, checkpoints: &[Float3]) {
        if let (Some(first), Some(sample)) = (checkpoints.first(), self.samples.first_mut()) {
            *sample = *first;
        }
        if let (Some(last), Some(sample)) = (checkpoints.last(), self.samples.last_mut()) {
            *sample = *last;
        }
    }
}

/// Evaluates `eval(segment, t)` at `samples_per_segment + 1` evenly spaced
/// parameters per checkpoint segment, sharing boundary samples.
pub(crate) fn sample_segments<F>(
    checkpoints: &[Float3],
    samples_per_segment: usize,
    mut eval: F,
) -> Curve
where
    F: FnMut(usize, f32) -> Float3,
{
    let segments = checkpoints.len().saturating_sub(1);
    let mut samples = Vec::with_capacity(segments * samples_per_segment + 1);
    let mut checkpoint_indices = Vec::with_capacity(checkpoints.len());

    for seg in 0..segments {
        let first = if seg == 0 {
            checkpoint_indices.push(0);
            0
        } else {
            1
        };
        for j in first..=samples_per_segment {
            let t = j as f32 / samples_per_segment as f32;
            samples.push(eval(seg, t));
        }
        checkpoint_indices.push(samples.len() - 1);
    }

    Curve::from_parts(samples, checkpoint_indices, None)
}
