use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::math::Float3;
use super::physics::{
    usable_speed, ARRIVAL_THRESHOLD, CHECKPOINT_RADIUS, DEFAULT_SPEED, EPSILON,
};
use super::speed::SpeedProfile;
use crate::error::PathError;
use crate::path::Curve;

/// Remaining distance under which a step lands exactly on its target.
const SNAP_TOLERANCE: f32 = 1e-5;

/// Tolerances for following a curve.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParams {
    /// Distance under which the current target sample is reached.
    pub arrival_threshold: f32,
    /// Distance under which a tracked checkpoint counts as passed.
    pub checkpoint_radius: f32,
    /// Speed used when the profile has nothing usable.
    pub default_speed: f32,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            arrival_threshold: ARRIVAL_THRESHOLD,
            checkpoint_radius: CHECKPOINT_RADIUS,
            default_speed: DEFAULT_SPEED,
        }
    }
}

impl MotionParams {
    pub fn validate(&self) -> Result<(), PathError> {
        let fields = [
            ("arrival_threshold", self.arrival_threshold),
            ("checkpoint_radius", self.checkpoint_radius),
            ("default_speed", self.default_speed),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(PathError::invalid(
                    name,
                    format!("must be a positive finite number, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPhase {
    Idle,
    Moving,
    Stopped,
}

/// What a single `step` did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum StepOutcome {
    /// Not moving; nothing changed.
    Inactive,
    /// Position advanced (or held when it already sat on the target).
    Moved { position: Float3, speed: f32 },
    /// The last sample was reached this tick.
    Finished { position: Float3 },
}

/// Mutable per-run state.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionState {
    pub position: Float3,
    pub target_index: usize,
    pub checkpoints_passed: usize,
    pub moving: bool,
    passed: Vec<bool>,
}

impl MotionState {
    pub fn is_passed(&self, checkpoint: usize) -> bool {
        self.passed.get(checkpoint).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
struct ActiveRun {
    checkpoints: Vec<Float3>,
    curve: Curve,
    profile: SpeedProfile,
    state: MotionState,
}

/// Steps a body along a precomputed curve one fixed tick at a time.
#[derive(Debug, Clone)]
pub struct MotionIntegrator {
    params: MotionParams,
    run: Option<ActiveRun>,
}

impl MotionIntegrator {
    pub fn new(params: MotionParams) -> Self {
        Self { params, run: None }
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Begins following `curve`. `checkpoints` are the positions whose
    /// passage is counted.
    ///
    /// An empty curve is rejected and leaves the integrator untouched.
    pub fn start(
        &mut self,
        checkpoints: Vec<Float3>,
        curve: Curve,
        profile: SpeedProfile,
    ) -> Result<(), PathError> {
        let Some(origin) = curve.first() else {
            return Err(PathError::invalid("curve", "cannot follow an empty curve"));
        };

        let state = MotionState {
            position: origin,
            target_index: (curve.len() - 1).min(1),
            checkpoints_passed: 0,
            moving: true,
            passed: vec![false; checkpoints.len()],
        };
        let mut run = ActiveRun {
            checkpoints,
            curve,
            profile,
            state,
        };
        mark_passed(&mut run, self.params.checkpoint_radius);

        debug!(
            samples = run.curve.len(),
            checkpoints = run.checkpoints.len(),
            "motion started"
        );
        self.run = Some(run);
        Ok(())
    }

    /// Drops the run. The body stays wherever it was.
    pub fn stop(&mut self) {
        self.run = None;
    }

    pub fn phase(&self) -> MotionPhase {
        match &self.run {
            None => MotionPhase::Idle,
            Some(run) if run.state.moving => MotionPhase::Moving,
            Some(_) => MotionPhase::Stopped,
        }
    }

    pub fn state(&self) -> Option<&MotionState> {
        self.run.as_ref().map(|run| &run.state)
    }

    pub fn curve(&self) -> Option<&Curve> {
        self.run.as_ref().map(|run| &run.curve)
    }

    pub fn checkpoint_count(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.checkpoints.len())
    }

    /// Speed the body is currently travelling at.
    pub fn current_speed(&self) -> f32 {
        match &self.run {
            Some(run) if run.state.moving => speed_for(&self.params, run),
            _ => 0.0,
        }
    }

    /// Advances one tick of `dt` seconds.
    pub fn step(&mut self, dt: f32) -> StepOutcome {
        let params = self.params;
        let Some(run) = self.run.as_mut() else {
            return StepOutcome::Inactive;
        };
        if !run.state.moving || !(dt.is_finite() && dt > 0.0) {
            return StepOutcome::Inactive;
        }
        let last = run.curve.len() - 1;

        // Arrival is judged before moving, so the final snap and the stop
        // land on separate ticks.
        let mut target = run.curve.samples()[run.state.target_index];
        if run.state.position.distance(target) < params.arrival_threshold {
            if run.state.target_index < last {
                run.state.target_index += 1;
                target = run.curve.samples()[run.state.target_index];
            } else {
                run.state.moving = false;
                mark_passed(run, params.checkpoint_radius);
                info!(
                    passed = run.state.checkpoints_passed,
                    total = run.checkpoints.len(),
                    "path complete"
                );
                return StepOutcome::Finished {
                    position: run.state.position,
                };
            }
        }

        let speed = speed_for(&params, run);
        let delta = target - run.state.position;
        let distance = delta.magnitude();
        if distance > EPSILON {
            let travel = speed * dt;
            if travel >= distance - SNAP_TOLERANCE {
                run.state.position = target;
            } else {
                run.state.position += delta * (travel / distance);
            }
        }
        mark_passed(run, params.checkpoint_radius);

        StepOutcome::Moved {
            position: run.state.position,
            speed,
        }
    }
}

fn speed_for(params: &MotionParams, run: &ActiveRun) -> f32 {
    let raw = run
        .profile
        .speed_at(run.state.target_index)
        .unwrap_or(params.default_speed);
    if !(raw.is_finite() && raw > 0.0) {
        debug!(
            raw,
            index = run.state.target_index,
            "unusable profile speed, falling back to default"
        );
    }
    usable_speed(raw, params.default_speed)
}

/// Marks every not-yet-passed checkpoint within `radius`. The count only
/// grows and never exceeds the number of checkpoints.
fn mark_passed(run: &mut ActiveRun, radius: f32) {
    let position = run.state.position;
    for (flag, checkpoint) in run.state.passed.iter_mut().zip(&run.checkpoints) {
        if !*flag && position.distance(*checkpoint) <= radius {
            *flag = true;
            run.state.checkpoints_passed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::CurveStrategy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn straight(length: f32) -> (Vec<Float3>, Curve) {
        let checkpoints = vec![Float3::ZERO, Float3::new(length, 0.0, 0.0)];
        let curve = Curve::from_checkpoints(&checkpoints);
        (checkpoints, curve)
    }

    fn tight_params() -> MotionParams {
        MotionParams {
            arrival_threshold: 1e-3,
            ..MotionParams::default()
        }
    }

    #[test]
    fn new_integrator_is_idle() {
        let mut integrator = MotionIntegrator::new(MotionParams::default());
        assert_eq!(integrator.phase(), MotionPhase::Idle);
        assert_eq!(integrator.step(0.1), StepOutcome::Inactive);
        assert!(integrator.state().is_none());
    }

    #[test]
    fn start_rejects_empty_curve_without_mutation() {
        let mut integrator = MotionIntegrator::new(MotionParams::default());
        let profile = SpeedProfile::constant(1, 1.0).unwrap();
        let err = integrator
            .start(vec![], Curve::from_checkpoints(&[]), profile)
            .unwrap_err();
        assert!(matches!(err, PathError::InvalidParameter { name: "curve", .. }));
        assert_eq!(integrator.phase(), MotionPhase::Idle);
    }

    #[test]
    fn reaches_target_exactly_then_stops_next_tick() {
        let (checkpoints, curve) = straight(1.0);
        let profile = SpeedProfile::constant(curve.len(), 1.0).unwrap();
        let mut integrator = MotionIntegrator::new(tight_params());
        integrator.start(checkpoints, curve, profile).unwrap();

        let dt = 0.25;
        let ticks = (1.0_f32 / (1.0 * dt)).ceil() as usize;
        assert_eq!(ticks, 4);
        for _ in 0..ticks {
            assert!(matches!(integrator.step(dt), StepOutcome::Moved { .. }));
            let x = integrator.state().unwrap().position.x;
            assert!(x <= 1.0, "overshot to {x}");
        }
        assert_eq!(
            integrator.state().unwrap().position,
            Float3::new(1.0, 0.0, 0.0)
        );
        assert_eq!(integrator.phase(), MotionPhase::Moving);

        assert!(matches!(
            integrator.step(dt),
            StepOutcome::Finished { .. }
        ));
        assert_eq!(integrator.phase(), MotionPhase::Stopped);
    }

    #[test]
    fn stopped_is_terminal() {
        let (checkpoints, curve) = straight(0.5);
        let profile = SpeedProfile::constant(curve.len(), 10.0).unwrap();
        let mut integrator = MotionIntegrator::new(tight_params());
        integrator.start(checkpoints, curve, profile).unwrap();

        while integrator.phase() == MotionPhase::Moving {
            integrator.step(0.1);
        }
        let resting = integrator.state().unwrap().clone();
        for _ in 0..5 {
            assert_eq!(integrator.step(0.1), StepOutcome::Inactive);
        }
        assert_eq!(integrator.state().unwrap(), &resting);
    }

    #[test]
    fn large_step_never_overshoots() {
        let (checkpoints, curve) = straight(3.0);
        let profile = SpeedProfile::constant(curve.len(), 100.0).unwrap();
        let mut integrator = MotionIntegrator::new(tight_params());
        integrator.start(checkpoints, curve, profile).unwrap();

        integrator.step(1.0);
        assert_eq!(
            integrator.state().unwrap().position,
            Float3::new(3.0, 0.0, 0.0)
        );
    }

    #[test]
    fn step_uses_profile_speed_at_target() {
        let (checkpoints, curve) = straight(10.0);
        let profile = SpeedProfile::constant(curve.len(), 1.5).unwrap();
        let mut integrator = MotionIntegrator::new(tight_params());
        integrator.start(checkpoints, curve, profile).unwrap();
        assert_eq!(integrator.current_speed(), 1.5);

        match integrator.step(0.5) {
            StepOutcome::Moved { position, speed } => {
                assert_eq!(speed, 1.5);
                assert_eq!(position, Float3::new(0.75, 0.0, 0.0));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn non_positive_dt_is_ignored() {
        let (checkpoints, curve) = straight(2.0);
        let profile = SpeedProfile::constant(curve.len(), 1.0).unwrap();
        let mut integrator = MotionIntegrator::new(tight_params());
        integrator.start(checkpoints, curve, profile).unwrap();

        assert_eq!(integrator.step(0.0), StepOutcome::Inactive);
        assert_eq!(integrator.step(-1.0), StepOutcome::Inactive);
        assert_eq!(integrator.step(f32::NAN), StepOutcome::Inactive);
        assert_eq!(integrator.state().unwrap().position, Float3::ZERO);
    }

    #[test]
    fn coincident_samples_advance_without_moving() {
        let checkpoints = vec![Float3::ZERO, Float3::ZERO, Float3::new(1.0, 0.0, 0.0)];
        let curve = Curve::from_checkpoints(&checkpoints);
        let profile = SpeedProfile::constant(curve.len(), 1.0).unwrap();
        let mut integrator = MotionIntegrator::new(tight_params());
        integrator.start(checkpoints, curve, profile).unwrap();

        integrator.step(0.1);
        let state = integrator.state().unwrap();
        assert_eq!(state.target_index, 2);
        assert!(state.position.x > 0.0);
    }

    #[test]
    fn stop_discards_state() {
        let (checkpoints, curve) = straight(2.0);
        let profile = SpeedProfile::constant(curve.len(), 1.0).unwrap();
        let mut integrator = MotionIntegrator::new(tight_params());
        integrator.start(checkpoints, curve, profile).unwrap();
        integrator.step(0.1);
        integrator.stop();
        assert_eq!(integrator.phase(), MotionPhase::Idle);
        assert!(integrator.state().is_none());
        assert_eq!(integrator.step(0.1), StepOutcome::Inactive);
    }

    #[test]
    fn passed_count_is_monotonic_and_bounded() {
        let checkpoints = vec![
            Float3::ZERO,
            Float3::new(6.0, 0.0, 0.0),
            Float3::new(6.0, 0.0, 6.0),
            Float3::new(0.0, 0.0, 6.0),
        ];
        let curve = CurveStrategy::default().build(&checkpoints, 8).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let profile = SpeedProfile::uniform(curve.len(), 3.0, 0.02, &mut rng).unwrap();
        let mut integrator = MotionIntegrator::new(MotionParams::default());
        integrator.start(checkpoints.clone(), curve, profile).unwrap();

        let mut previous = integrator.state().unwrap().checkpoints_passed;
        for _ in 0..10_000 {
            integrator.step(1.0 / 60.0);
            let passed = integrator.state().unwrap().checkpoints_passed;
            assert!(passed >= previous);
            assert!(passed <= checkpoints.len());
            previous = passed;
            if integrator.phase() == MotionPhase::Stopped {
                break;
            }
        }
        assert_eq!(integrator.phase(), MotionPhase::Stopped);
        assert_eq!(previous, checkpoints.len());
    }

    #[test]
    fn scenario_three_checkpoints() {
        let checkpoints = vec![
            Float3::ZERO,
            Float3::new(10.0, 0.0, 0.0),
            Float3::new(10.0, 10.0, 0.0),
        ];
        let curve = CurveStrategy::default().build(&checkpoints, 10).unwrap();
        assert!(curve.len() >= 20);
        assert_eq!(curve.first(), Some(Float3::ZERO));
        assert_eq!(curve.last(), Some(Float3::new(10.0, 10.0, 0.0)));

        let mut rng = StdRng::seed_from_u64(1);
        let profile = SpeedProfile::uniform(curve.len(), 2.0, 0.02, &mut rng).unwrap();
        let mut integrator = MotionIntegrator::new(MotionParams::default());
        integrator.start(checkpoints, curve, profile).unwrap();

        let mut ticks = 0;
        while integrator.phase() == MotionPhase::Moving && ticks < 60 * 60 {
            integrator.step(1.0 / 60.0);
            ticks += 1;
        }
        let state = integrator.state().unwrap();
        assert!(!state.moving);
        assert_eq!(state.checkpoints_passed, 3);
        assert!(state.is_passed(0) && state.is_passed(1) && state.is_passed(2));
    }

    #[test]
    fn params_validation_rejects_non_positive_values() {
        assert!(MotionParams::default().validate().is_ok());
        let bad = MotionParams {
            arrival_threshold: 0.0,
            ..MotionParams::default()
        };
        assert!(bad.validate().is_err());
        let bad = MotionParams {
            default_speed: f32::NAN,
            ..MotionParams::default()
        };
        assert!(bad.validate().is_err());
    }
}
