//! The headless frame loop.
//!
//! Each frame steps the stand-in physics, feeds positions and contacts to
//! the arena, then advances simulated time by one frame. The loop stops on
//! game over (unless restarts are enabled), at the simulated-time limit, or
//! on Ctrl-C.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use swarm_core::arena::Arena;
use swarm_core::audio::AudioSink;
use swarm_core::lifecycle::GameLifecycle;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::headless::{Contact, HeadlessPhysics};
use crate::report::{EndReason, RunStats};

/// The `run` section of `swarm-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Sleep one frame of wall-clock time per frame.
    #[serde(default)]
    pub real_time: bool,

    /// Start a new game after game over instead of stopping.
    #[serde(default)]
    pub restart_on_game_over: bool,

    /// Number of games to play when restarting.
    #[serde(default = "default_max_games")]
    pub max_games: u32,

    /// Where to write the JSON run report, if anywhere.
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            real_time: false,
            restart_on_game_over: false,
            max_games: default_max_games(),
            report_path: None,
        }
    }
}

const fn default_max_games() -> u32 {
    3
}

/// Run frames until a stop condition is met.
///
/// # Errors
///
/// Returns [`EngineError::Clock`] if simulated time cannot advance.
pub async fn run_frames<A: AudioSink, L: GameLifecycle>(
    arena: &mut Arena<A, L>,
    physics: &mut HeadlessPhysics,
    run: &RunConfig,
) -> Result<RunStats, EngineError> {
    let started_at = Utc::now();
    let frame_ms = arena.config().world.frame_ms;
    let max_run_ms = arena.config().world.max_run_ms;
    let pause_ms = if run.real_time { frame_ms } else { 0 };
    let mut frames: u64 = 0;
    let mut games: u32 = 1;

    arena.start()?;
    info!(frame_ms, max_run_ms, real_time = run.real_time, "Frame loop starting");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let end_reason = loop {
        if arena.is_game_over() {
            if run.restart_on_game_over && games < run.max_games {
                arena.restart()?;
                physics.reset();
                games = games.saturating_add(1);
                info!(game = games, score = arena.current_score(), "New game");
            } else {
                break EndReason::GameOver;
            }
        }

        if arena.now_ms() >= max_run_ms {
            info!(simulated_ms = arena.now_ms(), "Simulated-time limit reached");
            break EndReason::TimeLimit;
        }

        run_frame(arena, physics, frame_ms)?;
        frames = frames.saturating_add(1);

        let pace = async {
            if pause_ms > 0 {
                tokio::time::sleep(Duration::from_millis(pause_ms)).await;
            } else {
                tokio::task::yield_now().await;
            }
        };
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break EndReason::Interrupted;
            }
            () = pace => {}
        }
    };

    Ok(RunStats {
        started_at,
        end_reason,
        frames,
        games,
    })
}

/// One physics step followed by one clock step.
///
/// # Errors
///
/// Returns [`EngineError::Clock`] if simulated time cannot advance.
pub fn run_frame<A: AudioSink, L: GameLifecycle>(
    arena: &mut Arena<A, L>,
    physics: &mut HeadlessPhysics,
    frame_ms: u64,
) -> Result<(), EngineError> {
    let frame = physics.step(arena.agents(), frame_ms);
    for (id, position) in frame.moves {
        arena.update_position(id, position);
    }
    for contact in frame.contacts {
        match contact {
            Contact::Agents(first, second) => {
                if let Some(outcome) = arena.on_contact(first, second) {
                    debug!(outcome = ?outcome, "Contact resolved");
                }
            }
            Contact::Player(id) => {
                let contact = arena.on_player_contact(id);
                let player = physics.player();
                debug!(
                    agent_id = %id,
                    contact = ?contact,
                    player_x = player.x,
                    player_y = player.y,
                    "Player touched"
                );
            }
        }
    }
    let summary = arena.advance(frame_ms)?;
    if summary.fired > 0 {
        debug!(
            fired = summary.fired,
            spawned = summary.spawned,
            culled = summary.culled,
            "Timers fired"
        );
    }
    Ok(())
}
