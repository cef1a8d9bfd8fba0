//! Per-body run bookkeeping driven from the host's fixed-step tick.

mod manager;
mod scene;
mod status;
pub mod telemetry;

pub use manager::{SimulationManager, TickReport};
pub use scene::{MemoryScene, Pose, Scene};
pub use status::RunStatus;
pub use telemetry::TickSampler;
