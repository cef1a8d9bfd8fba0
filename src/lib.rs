//! Dronepath - checkpoint-driven camera flight paths for fixed-step hosts.
//!
//! # Architecture
//!
//! Layered modules with strict inward-only dependencies:
//!
//! - **sim**: Math primitives, speed profiles, motion and orientation
//! - **path**: Curve strategies that densify checkpoints into samples
//! - **runtime**: Scene seam, run manager, status snapshots, telemetry
//! - **config**: JSON configuration with defaults for every field
//!
//! # Usage
//!
//! ```ignore
//! use dronepath::{DroneConfig, MemoryScene, SimulationManager, Float3};
//!
//! let mut scene = MemoryScene::new();
//! scene.spawn("drone", Float3::ZERO);
//! let mut manager = SimulationManager::new(DroneConfig::default())?;
//! manager.start(&mut scene, "drone", &[Float3::new(10.0, 0.0, 0.0)], 2.0)?;
//! manager.tick(&mut scene, dronepath::sim::DT);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod path;
pub mod runtime;
pub mod sim;

// Re-export commonly used types at crate root
pub use config::DroneConfig;
pub use error::{BodyId, ConfigError, PathError};
pub use path::{CheckpointSet, Curve, CurveStrategy};
pub use runtime::{MemoryScene, RunStatus, Scene, SimulationManager};
pub use sim::{Float3, Quaternion, SpeedProfile};
