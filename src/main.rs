use std::process::ExitCode;

use dronepath::logging::init_tracing;
use dronepath::path::CheckpointSet;
use dronepath::sim::DT;
use dronepath::{BodyId, DroneConfig, Float3, MemoryScene, SimulationManager};
use tracing::{error, info};

const BODY: &str = "drone";
const BASE_SPEED: f32 = 2.0;
/// Ten simulated minutes.
const MAX_TICKS: u32 = 60 * 60 * 10;

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading config");
            DroneConfig::load(path)?
        }
        None => DroneConfig::default(),
    };

    let mut scene = MemoryScene::new();
    scene.spawn(BODY, Float3::ZERO);

    let checkpoints: CheckpointSet = [
        Float3::new(10.0, 0.0, 0.0),
        Float3::new(10.0, 10.0, 0.0),
        Float3::new(0.0, 10.0, 5.0),
    ]
    .into_iter()
    .collect();

    let mut manager = SimulationManager::new(config)?;
    manager.start_with_set(&mut scene, BODY, &checkpoints, BASE_SPEED)?;

    let body = BodyId::from(BODY);
    let mut ticks = 0;
    while manager.any_moving() && ticks < MAX_TICKS {
        let report = manager.tick(&mut scene, DT);
        if let Some((_, err)) = report.errors.into_iter().next() {
            return Err(err.into());
        }
        ticks += 1;
    }
    info!(ticks, seconds = ticks as f32 * DT, "simulation ended");

    let status = manager.status(&body);
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
