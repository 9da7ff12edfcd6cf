//! Headless engine binary for the Swarm simulation.
//!
//! Wires the arena to a stand-in physics collaborator and runs the frame
//! loop until the game ends, the simulated-time limit is reached, or the
//! process is interrupted.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `swarm-config.yaml`
//! 3. Load the `run` section
//! 4. Build the arena and the stand-in physics
//! 5. Run the frame loop
//! 6. Log the run report and optionally write it to disk

mod collaborators;
mod error;
mod headless;
mod report;
mod runner;

use std::path::Path;

use swarm_core::arena::Arena;
use swarm_core::config::SimulationConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::collaborators::{EngineLifecycle, TracingAudio};
use crate::error::EngineError;
use crate::headless::HeadlessPhysics;
use crate::report::RunReport;
use crate::runner::RunConfig;

const CONFIG_PATH: &str = "swarm-config.yaml";

/// Application entry point for the headless engine.
///
/// # Errors
///
/// Returns an error if configuration is unusable, simulated time
/// overflows, or the report cannot be written.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("swarm-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        seed = config.world.seed,
        frame_ms = config.world.frame_ms,
        max_run_ms = config.world.max_run_ms,
        cap = config.population.cap,
        spawn_interval_ms = config.population.spawn_interval_ms,
        "Configuration loaded"
    );

    // 3. Load the run section.
    let run = load_run_config()?;
    info!(
        real_time = run.real_time,
        restart_on_game_over = run.restart_on_game_over,
        max_games = run.max_games,
        "Run configuration loaded"
    );

    // 4. Build the arena and physics.
    let mut physics = HeadlessPhysics::new(config.world.clone());
    let mut arena = Arena::new(config, TracingAudio::default(), EngineLifecycle::default())?;

    // 5. Run.
    let stats = runner::run_frames(&mut arena, &mut physics, &run).await?;

    // 6. Report.
    let report = RunReport::capture(&arena, stats);
    info!(
        end_reason = ?report.end_reason,
        frames = report.frames,
        simulated_ms = report.simulated_ms,
        games = report.games,
        score = report.score,
        level = report.level,
        active = report.active,
        audit = %report.audit,
        "Run ended"
    );
    info!(
        game_overs = arena.lifecycle().game_overs,
        highest_level = arena.lifecycle().highest_level,
        one_shots = ?arena.audio().one_shots(),
        looping = ?arena.audio().looping(),
        "Collaborator totals"
    );
    if let Some(path) = &run.report_path {
        report.write_to(path)?;
        info!(path = %path.display(), "Report written");
    }

    info!("swarm-engine shutdown complete");
    Ok(())
}

/// Load the simulation configuration from `swarm-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}

/// Load the `run` section from `swarm-config.yaml`.
///
/// If the file does not exist or lacks the `run` key, defaults are used.
fn load_run_config() -> Result<RunConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if !config_path.exists() {
        return Ok(RunConfig::default());
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| EngineError::RunConfig {
        message: format!("failed to read config file: {e}"),
    })?;
    let raw: serde_yml::Value =
        serde_yml::from_str(&contents).map_err(|e| EngineError::RunConfig {
            message: format!("failed to parse config YAML: {e}"),
        })?;

    match raw.get("run") {
        Some(run_value) => {
            serde_yml::from_value(run_value.clone()).map_err(|e| EngineError::RunConfig {
                message: format!("failed to parse run config: {e}"),
            })
        }
        None => Ok(RunConfig::default()),
    }
}
