//! Math and per-tick simulation primitives.
//!
//! Everything here is deterministic given its inputs; randomness comes in
//! only through the `rng` handed to speed profile construction.

mod math;
mod motion;
mod orientation;
mod speed;

pub mod physics;

pub use math::{Float3, Quaternion};
pub use motion::{MotionIntegrator, MotionParams, MotionPhase, MotionState, StepOutcome};
pub use orientation::{OrientationParams, OrientationTracker};
pub use physics::{usable_speed, DT, EPSILON, HZ};
pub use speed::{SpeedPolicy, SpeedProfile};
