use std::collections::HashMap;

use serde::Serialize;

use crate::error::{BodyId, PathError};
use crate::sim::{Float3, Quaternion};

/// Host-side store of body transforms.
///
/// The simulation reads a body's position once when a run starts and
/// writes position and rotation every tick after that.
pub trait Scene {
    fn read_position(&self, body: &BodyId) -> Result<Float3, PathError>;
    fn write_position(&mut self, body: &BodyId, position: Float3) -> Result<(), PathError>;
    fn write_rotation(&mut self, body: &BodyId, rotation: Quaternion) -> Result<(), PathError>;
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct Pose {
    pub position: Float3,
    pub rotation: Quaternion,
}

/// In-memory scene. Writes to unknown bodies fail with `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    bodies: HashMap<BodyId, Pose>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `body` at `position` with identity rotation, replacing any
    /// previous pose.
    pub fn spawn(&mut self, body: impl Into<BodyId>, position: Float3) {
        self.bodies.insert(
            body.into(),
            Pose {
                position,
                rotation: Quaternion::IDENTITY,
            },
        );
    }

    pub fn despawn(&mut self, body: &BodyId) -> Option<Pose> {
        self.bodies.remove(body)
    }

    pub fn pose(&self, body: &BodyId) -> Option<Pose> {
        self.bodies.get(body).copied()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn pose_mut(&mut self, body: &BodyId) -> Result<&mut Pose, PathError> {
        self.bodies
            .get_mut(body)
            .ok_or_else(|| PathError::NotFound(body.clone()))
    }
}

impl Scene for MemoryScene {
    fn read_position(&self, body: &BodyId) -> Result<Float3, PathError> {
        self.pose(body)
            .map(|pose| pose.position)
            .ok_or_else(|| PathError::NotFound(body.clone()))
    }

    fn write_position(&mut self, body: &BodyId, position: Float3) -> Result<(), PathError> {
        self.pose_mut(body)?.position = position;
        Ok(())
    }

    fn write_rotation(&mut self, body: &BodyId, rotation: Quaternion) -> Result<(), PathError> {
        self.pose_mut(body)?.rotation = rotation;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_body_round_trips_writes() {
        let mut scene = MemoryScene::new();
        let body = BodyId::from("drone");
        scene.spawn("drone", Float3::new(1.0, 2.0, 3.0));
        assert_eq!(scene.read_position(&body), Ok(Float3::new(1.0, 2.0, 3.0)));

        scene.write_position(&body, Float3::UP).unwrap();
        scene.write_position(&body, Float3::UP).unwrap();
        let q = Quaternion::from_axis_angle(Float3::UP, 1.0);
        scene.write_rotation(&body, q).unwrap();

        let pose = scene.pose(&body).unwrap();
        assert_eq!(pose.position, Float3::UP);
        assert_eq!(pose.rotation, q);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn unknown_body_is_not_found() {
        let mut scene = MemoryScene::new();
        let ghost = BodyId::from("ghost");
        assert_eq!(
            scene.read_position(&ghost),
            Err(PathError::NotFound(ghost.clone()))
        );
        assert!(scene.write_position(&ghost, Float3::ZERO).is_err());
        assert!(scene.write_rotation(&ghost, Quaternion::IDENTITY).is_err());
    }

    #[test]
    fn despawn_removes_body() {
        let mut scene = MemoryScene::new();
        scene.spawn("drone", Float3::ZERO);
        assert!(scene.despawn(&BodyId::from("drone")).is_some());
        assert!(scene.is_empty());
    }
}
