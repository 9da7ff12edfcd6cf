//! Collaborators for a headless run.
//!
//! There is no sound device and no menu system, so both collaborators
//! turn their calls into log lines and keep a few counters for the report.

use std::collections::BTreeMap;

use swarm_core::audio::AudioSink;
use swarm_core::lifecycle::GameLifecycle;
use swarm_types::AudioCue;
use tracing::{debug, info};

/// Logs every cue and counts one-shots.
#[derive(Debug, Clone, Default)]
pub struct TracingAudio {
    one_shots: BTreeMap<String, u64>,
    looping: Vec<AudioCue>,
}

impl TracingAudio {
    /// One-shot counts keyed by cue name.
    pub const fn one_shots(&self) -> &BTreeMap<String, u64> {
        &self.one_shots
    }

    /// Cues currently looping.
    pub fn looping(&self) -> &[AudioCue] {
        &self.looping
    }
}

impl AudioSink for TracingAudio {
    fn play_one_shot(&mut self, cue: AudioCue) {
        debug!(cue = ?cue, "audio one-shot");
        let count = self.one_shots.entry(format!("{cue:?}")).or_insert(0);
        *count = count.saturating_add(1);
    }

    fn play_loop(&mut self, cue: AudioCue) {
        debug!(cue = ?cue, "audio loop started");
        if !self.looping.contains(&cue) {
            self.looping.push(cue);
        }
    }

    fn stop_loop(&mut self, cue: AudioCue) {
        debug!(cue = ?cue, "audio loop stopped");
        self.looping.retain(|c| *c != cue);
    }
}

/// Logs lifecycle signals and remembers how far the game got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineLifecycle {
    /// Game-over signals received over the whole process.
    pub game_overs: u32,
    /// Highest level announced.
    pub highest_level: u32,
}

impl GameLifecycle for EngineLifecycle {
    fn signal_game_over(&mut self) {
        self.game_overs = self.game_overs.saturating_add(1);
        info!(game_overs = self.game_overs, "Game over");
    }

    fn signal_level_advance(&mut self, level: u32) {
        self.highest_level = self.highest_level.max(level);
        info!(level, "Level advanced");
    }
}
