//! End-of-run report.
//!
//! [`RunReport`] is a plain serializable snapshot of an arena after the
//! frame loop stops. The binary logs it and optionally writes it to disk
//! as pretty JSON.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use swarm_core::arena::Arena;
use swarm_core::audio::AudioSink;
use swarm_core::audit::{PopulationAudit, audit_destructions, audit_population};
use swarm_core::lifecycle::GameLifecycle;

use crate::error::EngineError;

/// Why the frame loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// A classified agent reached the player.
    GameOver,
    /// The configured simulated-time limit was reached.
    TimeLimit,
    /// Ctrl-C was received.
    Interrupted,
}

/// Summary of one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of the run.
    pub ended_at: DateTime<Utc>,
    /// Why the run stopped.
    pub end_reason: EndReason,
    /// Frames executed.
    pub frames: u64,
    /// Simulated time at the end of the run.
    pub simulated_ms: u64,
    /// Games started, counting restarts.
    pub games: u32,
    /// Final score of the last game.
    pub score: u64,
    /// Points by event for the last game.
    pub score_breakdown: BTreeMap<String, u64>,
    /// Level reached in the last game.
    pub level: u32,
    /// Agents alive when the run stopped.
    pub active: u32,
    /// Agents spawned in the last game.
    pub spawned: u64,
    /// Agents destroyed in the last game, by cause.
    pub destroyed: BTreeMap<String, u64>,
    /// `"balanced"` or a description of the first anomaly.
    pub audit: String,
}

/// Counters the frame loop hands over alongside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Why the loop stopped.
    pub end_reason: EndReason,
    /// Frames executed.
    pub frames: u64,
    /// Games started.
    pub games: u32,
}

impl RunReport {
    /// Snapshot `arena` now.
    pub fn capture<A: AudioSink, L: GameLifecycle>(arena: &Arena<A, L>, stats: RunStats) -> Self {
        let population = arena.population();

        let mut destroyed = BTreeMap::new();
        for record in population.destroyed() {
            let count = destroyed.entry(record.cause.to_string()).or_insert(0_u64);
            *count = count.saturating_add(1);
        }

        let score_breakdown = arena
            .score()
            .breakdown()
            .iter()
            .map(|(event, points)| (format!("{event:?}"), *points))
            .collect();

        let audit = match audit_population(population) {
            PopulationAudit::Balanced => audit_destructions(population.destroyed()),
            anomaly @ PopulationAudit::Anomaly(_) => anomaly,
        };
        let audit = match audit {
            PopulationAudit::Balanced => "balanced".to_owned(),
            PopulationAudit::Anomaly(anomaly) => format!("{anomaly:?}"),
        };

        Self {
            started_at: stats.started_at,
            ended_at: Utc::now(),
            end_reason: stats.end_reason,
            frames: stats.frames,
            simulated_ms: arena.now_ms(),
            games: stats.games,
            score: arena.current_score(),
            score_breakdown,
            level: arena.current_level(),
            active: arena.active_count(),
            spawned: population.spawned_total(),
            destroyed,
            audit,
        }
    }

    /// Render as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Report`] if serialization fails.
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON rendering to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Report`] or [`EngineError::Io`].
    pub fn write_to(&self, path: &Path) -> Result<(), EngineError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use swarm_core::audio::NullAudio;
    use swarm_core::config::SimulationConfig;
    use swarm_core::lifecycle::NoOpLifecycle;

    use super::*;

    fn stats() -> RunStats {
        RunStats {
            started_at: Utc::now(),
            end_reason: EndReason::TimeLimit,
            frames: 0,
            games: 1,
        }
    }

    #[test]
    fn fresh_arena_reports_balanced() {
        let mut arena = Arena::new(SimulationConfig::default(), NullAudio, NoOpLifecycle).unwrap();
        arena.start().unwrap();
        arena.advance(0).unwrap();

        let report = RunReport::capture(&arena, stats());
        assert_eq!(report.audit, "balanced");
        assert_eq!(report.level, 1);
        assert_eq!(report.spawned, 1);
        assert_eq!(report.active, 1);
        assert!(report.destroyed.is_empty());
        assert!(report.ended_at >= report.started_at);
    }

    #[test]
    fn json_uses_snake_case_reason() {
        let arena = Arena::new(SimulationConfig::default(), NullAudio, NoOpLifecycle).unwrap();
        let json = RunReport::capture(&arena, stats()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["end_reason"], "time_limit");
        assert_eq!(value["score"], 0);
    }
}
