//! Mass-presence scan.
//!
//! On each scan the live population is grouped by derived kind. The first
//! classified group, in [`Kind::CLASSIFIED`] order (Small, Normal, Large),
//! whose size reaches the threshold is culled as a whole. At most one
//! group is culled per scan even when several qualify.

use swarm_agents::ClassifierConfig;
use swarm_types::{AgentId, AudioCue, DestroyCause, Kind, ScoreEvent};
use tracing::info;

use crate::audio::AudioSink;
use crate::config::MassPresenceConfig;
use crate::population::PopulationController;
use crate::score::ScoreLedger;

/// What a triggering scan did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MassPresenceReport {
    /// The culled kind.
    pub kind: Kind,
    /// Every agent removed by the cull.
    pub culled: Vec<AgentId>,
    /// The spawn period after the decrease.
    pub new_interval_ms: u64,
}

/// Periodic group-size watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MassPresenceMonitor {
    config: MassPresenceConfig,
}

impl MassPresenceMonitor {
    /// Create a monitor.
    pub const fn new(config: MassPresenceConfig) -> Self {
        Self { config }
    }

    /// Period between scans.
    pub const fn check_interval_ms(&self) -> u64 {
        self.config.check_interval_ms
    }

    /// Group size that triggers a cull.
    pub const fn threshold(&self) -> u32 {
        self.config.threshold
    }

    /// The first classified kind whose group has reached the threshold.
    pub fn triggering_kind(
        &self,
        population: &PopulationController,
        classifier: &ClassifierConfig,
    ) -> Option<Kind> {
        let counts = population.kind_counts(classifier);
        Kind::CLASSIFIED.into_iter().find(|kind| {
            counts
                .get(kind)
                .is_some_and(|&count| count >= self.config.threshold)
        })
    }

    /// Run one scan.
    ///
    /// On trigger every agent of the group is deactivated, the bonus is
    /// scored once, the mass-destroy cue plays once, and the spawn period
    /// is shortened once. Returns `None` when no group qualifies.
    pub fn scan(
        &self,
        population: &mut PopulationController,
        classifier: &ClassifierConfig,
        now_ms: u64,
        score: &mut ScoreLedger,
        audio: &mut impl AudioSink,
    ) -> Option<MassPresenceReport> {
        let kind = self.triggering_kind(population, classifier)?;

        let mut culled = Vec::new();
        for id in population.ids_of_kind(kind, classifier) {
            if population
                .deactivate(id, DestroyCause::MassPresence, now_ms, classifier)
                .is_some()
            {
                culled.push(id);
            }
        }

        score.record(ScoreEvent::MassPresence);
        audio.play_one_shot(AudioCue::MassDestroy);
        let new_interval_ms = population.decrease_interval(self.config.interval_decrease_ms);

        info!(
            kind = %kind,
            culled = culled.len(),
            active = population.active_count(),
            interval_ms = new_interval_ms,
            "Mass presence: group culled"
        );

        Some(MassPresenceReport {
            kind,
            culled,
            new_interval_ms,
        })
    }
}
