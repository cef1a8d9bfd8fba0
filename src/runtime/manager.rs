use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::scene::Scene;
use super::status::RunStatus;
use super::telemetry::TickSampler;
use crate::config::DroneConfig;
use crate::error::{BodyId, PathError};
use crate::path::{apply_deviation, CheckpointSet};
use crate::sim::{
    Float3, MotionIntegrator, MotionPhase, OrientationTracker, SpeedPolicy, SpeedProfile,
    StepOutcome,
};

#[derive(Debug, Clone)]
struct DroneRun {
    motion: MotionIntegrator,
    orientation: OrientationTracker,
}

/// What one `tick` did across all bodies.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Bodies whose new position was written to the scene.
    pub moved: usize,
    /// Bodies that reached the end of their path this tick.
    pub finished: Vec<BodyId>,
    /// Scene failures, one per affected body. Other bodies still ticked.
    pub errors: Vec<(BodyId, PathError)>,
}

impl TickReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Owns every active run, keyed by body.
///
/// Finished runs stay registered (active, not moving) until `stop`.
pub struct SimulationManager {
    config: DroneConfig,
    rng: StdRng,
    runs: HashMap<BodyId, DroneRun>,
    sampler: TickSampler,
}

impl SimulationManager {
    pub fn new(config: DroneConfig) -> Result<Self, PathError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            sampler: TickSampler::new(config.log_every_ticks),
            config,
            rng,
            runs: HashMap::new(),
        })
    }

    pub fn config(&self) -> &DroneConfig {
        &self.config
    }

    /// Builds a path from the body's current position through `checkpoints`
    /// and starts following it. Replaces any run the body already had.
    ///
    /// Nothing is registered or written if any step fails.
    pub fn start(
        &mut self,
        scene: &mut dyn Scene,
        body: impl Into<BodyId>,
        checkpoints: &[Float3],
        base_speed: f32,
    ) -> Result<(), PathError> {
        let body = body.into();
        if checkpoints.is_empty() {
            return Err(PathError::invalid(
                "checkpoints",
                "at least one checkpoint is required",
            ));
        }
        let origin = scene.read_position(&body)?;

        let mut waypoints = Vec::with_capacity(checkpoints.len() + 1);
        waypoints.push(origin);
        waypoints.extend_from_slice(checkpoints);

        let curve_config = &self.config.curve;
        let curve = curve_config
            .strategy
            .build(&waypoints, curve_config.samples_per_segment)?;
        let curve = apply_deviation(&curve, curve_config.deviation, &mut self.rng);

        let variation = self.config.speed.variation;
        let profile = match self.config.speed.policy {
            SpeedPolicy::Uniform => {
                SpeedProfile::uniform(curve.len(), base_speed, variation, &mut self.rng)?
            }
            SpeedPolicy::CheckpointShaped => SpeedProfile::checkpoint_shaped(
                curve.checkpoint_indices(),
                curve.len(),
                base_speed,
                variation,
                &mut self.rng,
            )?,
        };

        let samples = curve.len();
        let mut motion = MotionIntegrator::new(self.config.motion);
        motion.start(checkpoints.to_vec(), curve, profile)?;
        scene.write_position(&body, origin)?;

        info!(
            body = %body,
            checkpoints = checkpoints.len(),
            samples,
            base_speed,
            strategy = self.config.curve.strategy.name(),
            "run started"
        );
        self.sampler.forget(&body);
        self.runs.insert(
            body,
            DroneRun {
                motion,
                orientation: OrientationTracker::new(self.config.orientation),
            },
        );
        Ok(())
    }

    /// Starts a run through the enabled checkpoints of `set`.
    pub fn start_with_set(
        &mut self,
        scene: &mut dyn Scene,
        body: impl Into<BodyId>,
        set: &CheckpointSet,
        base_speed: f32,
    ) -> Result<(), PathError> {
        self.start(scene, body, &set.enabled(), base_speed)
    }

    /// Drops the body's run. The body stays where it is.
    pub fn stop(&mut self, body: &BodyId) -> bool {
        self.sampler.forget(body);
        match self.runs.remove(body) {
            Some(_) => {
                info!(body = %body, "run stopped");
                true
            }
            None => false,
        }
    }

    /// Advances every moving body by `dt` seconds and pushes the results
    /// into `scene`.
    pub fn tick(&mut self, scene: &mut dyn Scene, dt: f32) -> TickReport {
        let mut report = TickReport::default();

        for (body, run) in self.runs.iter_mut() {
            match run.motion.step(dt) {
                StepOutcome::Inactive => {}
                StepOutcome::Finished { position } => {
                    info!(body = %body, ?position, "run finished");
                    report.finished.push(body.clone());
                }
                StepOutcome::Moved { position, speed } => {
                    if let Err(err) = scene.write_position(body, position) {
                        warn!(body = %body, error = %err, "position write failed");
                        report.errors.push((body.clone(), err));
                        continue;
                    }
                    report.moved += 1;

                    let Some(curve) = run.motion.curve() else {
                        continue;
                    };
                    let rotation = run.orientation.update(position, curve.samples(), speed);
                    if let Err(err) = scene.write_rotation(body, rotation) {
                        warn!(body = %body, error = %err, "rotation write failed");
                        report.errors.push((body.clone(), err));
                        continue;
                    }

                    if self.sampler.sample(body) {
                        if let Some(state) = run.motion.state() {
                            debug!(
                                body = %body,
                                ?position,
                                speed,
                                target = state.target_index,
                                samples = curve.len(),
                                passed = state.checkpoints_passed,
                                "tick"
                            );
                        }
                    }
                }
            }
        }
        report
    }

    pub fn status(&self, body: &BodyId) -> RunStatus {
        let Some(run) = self.runs.get(body) else {
            return RunStatus::inactive(body.clone());
        };
        let state = run.motion.state();
        RunStatus {
            body: body.clone(),
            active: true,
            moving: run.motion.phase() == MotionPhase::Moving,
            checkpoints_passed: state.map_or(0, |s| s.checkpoints_passed),
            checkpoints_total: run.motion.checkpoint_count(),
            path_index: state.map_or(0, |s| s.target_index),
            path_total: run.motion.curve().map_or(0, |c| c.len()),
            position: state.map(|s| s.position),
        }
    }

    pub fn is_active(&self, body: &BodyId) -> bool {
        self.runs.contains_key(body)
    }

    /// Registered bodies, sorted by id.
    pub fn active_bodies(&self) -> Vec<BodyId> {
        let mut bodies: Vec<BodyId> = self.runs.keys().cloned().collect();
        bodies.sort();
        bodies
    }

    /// Whether any registered body is still moving.
    pub fn any_moving(&self) -> bool {
        self.runs
            .values()
            .any(|run| run.motion.phase() == MotionPhase::Moving)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryScene;
    use crate::sim::{Quaternion, DT};

    fn seeded() -> SimulationManager {
        let config = DroneConfig {
            seed: Some(9),
            ..DroneConfig::default()
        };
        SimulationManager::new(config).unwrap()
    }

    fn scene_with(body: &str) -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.spawn(body, Float3::ZERO);
        scene
    }

    fn route() -> Vec<Float3> {
        vec![Float3::new(4.0, 0.0, 0.0), Float3::new(4.0, 0.0, 4.0)]
    }

    #[test]
    fn start_registers_run_and_reports_status() {
        let mut manager = seeded();
        let mut scene = scene_with("drone");
        let body = BodyId::from("drone");
        manager.start(&mut scene, "drone", &route(), 2.0).unwrap();

        assert!(manager.is_active(&body));
        let status = manager.status(&body);
        assert!(status.active && status.moving);
        assert_eq!(status.checkpoints_total, 2);
        assert_eq!(status.path_total, 2 * 15 + 1);
        assert_eq!(status.position, Some(Float3::ZERO));
    }

    #[test]
    fn start_failures_leave_no_run() {
        let mut manager = seeded();
        let mut scene = scene_with("drone");
        let ghost = BodyId::from("ghost");

        let err = manager.start(&mut scene, "ghost", &route(), 2.0).unwrap_err();
        assert_eq!(err, PathError::NotFound(ghost.clone()));
        assert!(!manager.is_active(&ghost));

        assert!(manager.start(&mut scene, "drone", &[], 2.0).is_err());
        assert!(manager.start(&mut scene, "drone", &route(), 0.0).is_err());
        assert!(manager.active_bodies().is_empty());
    }

    #[test]
    fn non_finite_input_is_rejected_at_start() {
        let mut manager = seeded();
        let mut scene = scene_with("drone");
        let body = BodyId::from("drone");

        let nan_route = [Float3::new(f32::NAN, 0.0, 0.0), Float3::new(5.0, 0.0, 0.0)];
        let err = manager.start(&mut scene, "drone", &nan_route, 2.0).unwrap_err();
        assert!(matches!(
            err,
            PathError::InvalidParameter {
                name: "checkpoints",
                ..
            }
        ));
        assert!(!manager.is_active(&body));

        scene.spawn("drone", Float3::new(0.0, f32::INFINITY, 0.0));
        assert!(manager.start(&mut scene, "drone", &route(), 2.0).is_err());
        assert!(manager.active_bodies().is_empty());
        assert!(!manager.any_moving());
    }

    #[test]
    fn tick_moves_and_rotates_body() {
        let mut manager = seeded();
        let mut scene = scene_with("drone");
        let body = BodyId::from("drone");
        manager.start(&mut scene, "drone", &route(), 2.0).unwrap();

        let report = manager.tick(&mut scene, DT);
        assert!(report.is_ok());
        assert_eq!(report.moved, 1);
        let pose = scene.pose(&body).unwrap();
        assert!(pose.position.distance(Float3::ZERO) > 0.0);
        assert_ne!(pose.rotation, Quaternion::IDENTITY);
    }

    #[test]
    fn missing_body_error_does_not_block_others() {
        let mut manager = seeded();
        let mut scene = MemoryScene::new();
        scene.spawn("a", Float3::ZERO);
        scene.spawn("b", Float3::ZERO);
        manager.start(&mut scene, "a", &route(), 2.0).unwrap();
        manager.start(&mut scene, "b", &route(), 2.0).unwrap();

        let gone = BodyId::from("a");
        scene.despawn(&gone);
        let report = manager.tick(&mut scene, DT);
        assert_eq!(report.moved, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, gone);
        assert!(scene.pose(&BodyId::from("b")).unwrap().position.x > 0.0);
    }

    #[test]
    fn stop_discards_run_and_keeps_position() {
        let mut manager = seeded();
        let mut scene = scene_with("drone");
        let body = BodyId::from("drone");
        manager.start(&mut scene, "drone", &route(), 2.0).unwrap();
        for _ in 0..10 {
            manager.tick(&mut scene, DT);
        }
        let before = scene.pose(&body).unwrap();

        assert!(manager.stop(&body));
        assert!(!manager.stop(&body));
        assert!(!manager.status(&body).active);

        manager.tick(&mut scene, DT);
        assert_eq!(scene.pose(&body).unwrap(), before);
    }

    #[test]
    fn finished_run_stays_registered() {
        let mut manager = seeded();
        let mut scene = scene_with("drone");
        let body = BodyId::from("drone");
        manager
            .start(&mut scene, "drone", &[Float3::new(1.0, 0.0, 0.0)], 5.0)
            .unwrap();

        let mut finished = Vec::new();
        for _ in 0..600 {
            finished.extend(manager.tick(&mut scene, DT).finished);
        }
        assert_eq!(finished, vec![body.clone()]);
        let status = manager.status(&body);
        assert!(status.active);
        assert!(!status.moving);
        assert_eq!(status.checkpoints_passed, 1);
        assert!(!manager.any_moving());
    }

    #[test]
    fn start_with_set_uses_enabled_checkpoints() {
        let mut manager = seeded();
        let mut scene = scene_with("drone");
        let mut set: CheckpointSet = route().into_iter().collect();
        set.add(Float3::new(0.0, 0.0, 4.0));
        set.set_enabled(0, false).unwrap();

        manager.start_with_set(&mut scene, "drone", &set, 2.0).unwrap();
        assert_eq!(manager.status(&BodyId::from("drone")).checkpoints_total, 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = DroneConfig::default();
        config.curve.samples_per_segment = 0;
        assert!(SimulationManager::new(config).is_err());
    }
}
