//! Path construction: checkpoints in, dense curve samples out.

mod bezier;
mod checkpoint;
mod curve;
mod deviation;
mod extrema;
mod spline;

pub use bezier::CubicSegment;
pub use checkpoint::{Checkpoint, CheckpointSet};
pub use curve::{Curve, CurveStrategy, SplineFit, DEFAULT_CURVE_STRENGTH};
pub use deviation::apply_deviation;
