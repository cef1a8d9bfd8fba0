//! JSON configuration for a simulation manager. Every field has a default,
//! so `{}` is a complete config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PathError};
use crate::path::CurveStrategy;
use crate::sim::{MotionParams, OrientationParams, SpeedPolicy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub strategy: CurveStrategy,
    pub samples_per_segment: usize,
    /// Peak per-axis jitter added mid-segment. Zero disables it.
    pub deviation: f32,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            strategy: CurveStrategy::default(),
            samples_per_segment: 15,
            deviation: 0.03,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub policy: SpeedPolicy,
    /// Half-width of the multiplicative jitter band.
    pub variation: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            policy: SpeedPolicy::default(),
            variation: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroneConfig {
    pub curve: CurveConfig,
    pub speed: SpeedConfig,
    pub motion: MotionParams,
    pub orientation: OrientationParams,
    /// Per-body tick interval for debug telemetry. Zero silences it.
    pub log_every_ticks: u32,
    /// Fixed RNG seed; unseeded runs draw from the OS.
    pub seed: Option<u64>,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            curve: CurveConfig::default(),
            speed: SpeedConfig::default(),
            motion: MotionParams::default(),
            orientation: OrientationParams::default(),
            log_every_ticks: 60,
            seed: None,
        }
    }
}

impl DroneConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), PathError> {
        if self.curve.samples_per_segment < 1 {
            return Err(PathError::invalid(
                "samples_per_segment",
                "must be at least 1",
            ));
        }
        if let CurveStrategy::Bezier { curve_strength } = self.curve.strategy {
            if !curve_strength.is_finite() {
                return Err(PathError::invalid("curve_strength", "must be finite"));
            }
        }
        if !(self.curve.deviation.is_finite() && self.curve.deviation >= 0.0) {
            return Err(PathError::invalid(
                "deviation",
                format!("must be non-negative, got {}", self.curve.deviation),
            ));
        }
        let variation = self.speed.variation;
        if !(variation.is_finite() && (0.0..1.0).contains(&variation)) {
            return Err(PathError::invalid(
                "variation",
                format!("must be in [0, 1), got {variation}"),
            ));
        }
        self.motion.validate()?;
        self.orientation.validate()
    }
}
