use serde::{Deserialize, Serialize};

use crate::error::PathError;
use crate::sim::Float3;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub position: Float3,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Checkpoint {
    pub const fn new(position: Float3) -> Self {
        Self {
            position,
            enabled: true,
        }
    }
}

/// Ordered checkpoints authored for one body, each with an enable flag.
///
/// Only enabled checkpoints are handed to a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckpointSet {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, position: Float3) -> usize {
        self.checkpoints.push(Checkpoint::new(position));
        self.checkpoints.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Result<Float3, PathError> {
        self.check_index(index)?;
        Ok(self.checkpoints.remove(index).position)
    }

    pub fn clear(&mut self) {
        self.checkpoints.clear();
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<(), PathError> {
        self.check_index(index)?;
        self.checkpoints[index].enabled = enabled;
        Ok(())
    }

    /// Unknown indices read as enabled.
    pub fn is_enabled(&self, index: usize) -> bool {
        self.checkpoints
            .get(index)
            .map(|cp| cp.enabled)
            .unwrap_or(true)
    }

    pub fn enabled(&self) -> Vec<Float3> {
        self.checkpoints
            .iter()
            .filter(|cp| cp.enabled)
            .map(|cp| cp.position)
            .collect()
    }

    pub fn all(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<(), PathError> {
        if index >= self.checkpoints.len() {
            return Err(PathError::invalid(
                "index",
                format!(
                    "checkpoint {index} out of range ({} checkpoints)",
                    self.checkpoints.len()
                ),
            ));
        }
        Ok(())
    }
}

impl FromIterator<Float3> for CheckpointSet {
    fn from_iter<I: IntoIterator<Item = Float3>>(iter: I) -> Self {
        Self {
            checkpoints: iter.into_iter().map(Checkpoint::new).collect(),
        }
    }
}
