//! Score accumulation.
//!
//! The ledger only ever grows, and it stops growing for good once
//! [`ScoreLedger::freeze`] is called at game over.

use std::collections::BTreeMap;

use swarm_types::ScoreEvent;

use crate::config::ScoringConfig;

/// Running score total with a per-event breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLedger {
    weights: ScoringConfig,
    total: u64,
    frozen: bool,
    by_event: BTreeMap<ScoreEvent, u64>,
}

impl ScoreLedger {
    /// An empty, unfrozen ledger.
    pub const fn new(weights: ScoringConfig) -> Self {
        Self {
            weights,
            total: 0,
            frozen: false,
            by_event: BTreeMap::new(),
        }
    }

    /// Current total.
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// `true` once game over has latched the score.
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Points attributed to each kind of event so far.
    pub const fn breakdown(&self) -> &BTreeMap<ScoreEvent, u64> {
        &self.by_event
    }

    /// The weights this ledger scores with.
    pub const fn weights(&self) -> &ScoringConfig {
        &self.weights
    }

    /// Add `points` under `event`. A no-op once frozen. Saturates at
    /// `u64::MAX`. Returns the points actually added.
    pub fn add(&mut self, event: ScoreEvent, points: u64) -> u64 {
        if self.frozen {
            return 0;
        }
        let before = self.total;
        self.total = self.total.saturating_add(points);
        let added = self.total.saturating_sub(before);
        let slot = self.by_event.entry(event).or_insert(0);
        *slot = slot.saturating_add(added);
        added
    }

    /// Award the configured points for a discrete event.
    ///
    /// [`ScoreEvent::PopulationSample`] has no fixed weight; use
    /// [`record_sample`](Self::record_sample).
    pub fn record(&mut self, event: ScoreEvent) -> u64 {
        let points = match event {
            ScoreEvent::Fusion => self.weights.fusion,
            ScoreEvent::Battle => self.weights.battle,
            ScoreEvent::MassPresence => self.weights.mass_presence,
            ScoreEvent::PopulationSample => 0,
        };
        self.add(event, points)
    }

    /// Award a population sample computed from scratch.
    pub fn record_sample(&mut self, unclassified: u64, classified: u64) -> u64 {
        let points = unclassified
            .saturating_mul(self.weights.per_unclassified)
            .saturating_add(classified.saturating_mul(self.weights.per_classified));
        self.add(ScoreEvent::PopulationSample, points)
    }

    /// Latch the score. Idempotent.
    pub const fn freeze(&mut self) {
        self.frozen = true;
    }
}

impl Default for ScoreLedger {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
