//! Population bookkeeping checks.
//!
//! The active count is only ever moved by spawn and deactivate, so it must
//! always equal `spawned - deactivated`, match the number of agents in the
//! pool, and stay within the cap. The destruction log must show that
//! unclassified agents only ever leave through fusion and classified agents
//! only through mass presence.
//!
//! Both checks hold by construction. A failure means a bookkeeping bug, and
//! produces a typed anomaly rather than a panic.

use swarm_types::DestroyCause;

use crate::population::{DestroyRecord, PopulationController};

/// A bookkeeping inconsistency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulationAnomaly {
    /// `active != spawned - deactivated`.
    CountDrift {
        /// Reported active count.
        active: u32,
        /// Lifetime spawns.
        spawned: u64,
        /// Lifetime deactivations.
        deactivated: u64,
    },
    /// The active count disagrees with the pool contents.
    PoolMismatch {
        /// Reported active count.
        active: u32,
        /// Agents actually in the pool.
        pooled: usize,
    },
    /// More agents are active than the cap allows.
    OverCap {
        /// Reported active count.
        active: u32,
        /// Configured cap.
        cap: u32,
    },
    /// A destruction took a path its kind is not allowed to take.
    IllegalDestruction(DestroyRecord),
}

/// Outcome of a population audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulationAudit {
    /// Every check passed.
    Balanced,
    /// The first failing check.
    Anomaly(PopulationAnomaly),
}

impl PopulationAudit {
    /// `true` if every check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Check the counters of `population` against each other and the cap.
pub fn audit_population(population: &PopulationController) -> PopulationAudit {
    let active = population.active_count();
    let spawned = population.spawned_total();
    let deactivated = population.deactivated_total();

    if spawned.checked_sub(deactivated) != Some(u64::from(active)) {
        return PopulationAudit::Anomaly(PopulationAnomaly::CountDrift {
            active,
            spawned,
            deactivated,
        });
    }

    let pooled = population.len();
    if usize::try_from(active).ok() != Some(pooled) {
        return PopulationAudit::Anomaly(PopulationAnomaly::PoolMismatch { active, pooled });
    }

    if active > population.cap() {
        return PopulationAudit::Anomaly(PopulationAnomaly::OverCap {
            active,
            cap: population.cap(),
        });
    }

    PopulationAudit::Balanced
}

/// `true` if `record` took a legal destruction path for its kind.
pub const fn is_legal_destruction(record: &DestroyRecord) -> bool {
    match record.cause {
        DestroyCause::Fusion => !record.kind.is_classified(),
        DestroyCause::MassPresence => record.kind.is_classified(),
    }
}

/// Check every entry of the destruction log.
pub fn audit_destructions(records: &[DestroyRecord]) -> PopulationAudit {
    records
        .iter()
        .find(|record| !is_legal_destruction(record))
        .map_or(PopulationAudit::Balanced, |record| {
            PopulationAudit::Anomaly(PopulationAnomaly::IllegalDestruction(*record))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use swarm_agents::{ClassifierConfig, ImmunityConfig, ProfileConfig};
    use swarm_types::{AgentId, Kind};

    use super::*;
    use crate::config::PopulationConfig;

    fn record(kind: Kind, cause: DestroyCause) -> DestroyRecord {
        DestroyRecord {
            agent_id: AgentId::new(),
            kind,
            cause,
            at_ms: 0,
        }
    }

    #[test]
    fn fresh_and_churned_pool_is_balanced() {
        let mut pop = PopulationController::new(
            &PopulationConfig::default(),
            &ProfileConfig::default(),
            &ImmunityConfig::default(),
        );
        assert!(audit_population(&pop).is_balanced());

        let mut rng = SmallRng::seed_from_u64(3);
        let ids = pop.spawn_at(swarm_types::Position::ORIGIN, 10, None, 0, &mut rng);
        for id in ids.iter().take(4) {
            pop.deactivate(*id, DestroyCause::Fusion, 1, &ClassifierConfig::default());
        }
        pop.deactivate(AgentId::new(), DestroyCause::Fusion, 1, &ClassifierConfig::default());
        assert_eq!(audit_population(&pop), PopulationAudit::Balanced);
        assert_eq!(pop.active_count(), 6);
    }

    #[test]
    fn destruction_paths() {
        assert!(is_legal_destruction(&record(Kind::Unclassified, DestroyCause::Fusion)));
        assert!(is_legal_destruction(&record(Kind::Large, DestroyCause::MassPresence)));
        assert!(!is_legal_destruction(&record(Kind::Unclassified, DestroyCause::MassPresence)));
        assert!(!is_legal_destruction(&record(Kind::Small, DestroyCause::Fusion)));
    }

    #[test]
    fn illegal_destruction_is_reported() {
        let bad = record(Kind::Normal, DestroyCause::Fusion);
        let log = [record(Kind::Unclassified, DestroyCause::Fusion), bad];
        assert_eq!(
            audit_destructions(&log),
            PopulationAudit::Anomaly(PopulationAnomaly::IllegalDestruction(bad))
        );
    }
}
