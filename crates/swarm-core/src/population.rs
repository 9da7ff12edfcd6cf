//! The population pool and its spawn cadence.
//!
//! [`PopulationController`] owns every live agent. The active count moves
//! in exactly two places: [`PopulationController::spawn_tick`] /
//! [`PopulationController::spawn_at`] increment it once per agent created,
//! and [`PopulationController::deactivate`] decrements it once per agent
//! removed. Both paths also bump a lifetime counter so the two can be
//! audited against each other (see [`crate::audit`]).

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use swarm_agents::{Agent, ClassifierConfig, ImmunityConfig, KindProfile, ProfileConfig};
use swarm_types::{AgentId, DestroyCause, Kind, Position};
use tracing::{debug, error, info, warn};

use crate::config::PopulationConfig;

/// One entry of the append-only destruction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DestroyRecord {
    /// The agent that left the pool.
    pub agent_id: AgentId,
    /// Its derived kind at the moment of removal.
    pub kind: Kind,
    /// Which path removed it.
    pub cause: DestroyCause,
    /// Simulated time of removal.
    pub at_ms: u64,
}

/// Returns `true` if a population of `active` may grow under `cap`.
pub const fn can_spawn(active: u32, cap: u32) -> bool {
    active < cap
}

/// Bounded pool of live agents with a shortening spawn period.
#[derive(Debug, Clone)]
pub struct PopulationController {
    agents: BTreeMap<AgentId, Agent>,
    active_count: u32,
    cap: u32,
    batch_size: u32,
    spawn_interval_ms: u64,
    min_spawn_interval_ms: u64,
    spawn_points: Vec<Position>,
    jitter_radius: f32,
    baseline: KindProfile,
    max_speed: f32,
    spawn_immunity_ms: u64,
    spawned_total: u64,
    deactivated_total: u64,
    destroyed: Vec<DestroyRecord>,
}

impl PopulationController {
    /// Create an empty pool.
    ///
    /// A starting interval below the floor is raised to the floor.
    pub fn new(
        population: &PopulationConfig,
        profiles: &ProfileConfig,
        immunity: &ImmunityConfig,
    ) -> Self {
        Self {
            agents: BTreeMap::new(),
            active_count: 0,
            cap: population.cap,
            batch_size: population.batch_size,
            spawn_interval_ms: population
                .spawn_interval_ms
                .max(population.min_spawn_interval_ms),
            min_spawn_interval_ms: population.min_spawn_interval_ms,
            spawn_points: population.spawn_points.clone(),
            jitter_radius: population.jitter_radius,
            baseline: profiles.baseline,
            max_speed: profiles.max_speed,
            spawn_immunity_ms: immunity.spawn_ms,
            spawned_total: 0,
            deactivated_total: 0,
            destroyed: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Counters
    // -----------------------------------------------------------------------

    /// Number of active agents.
    pub const fn active_count(&self) -> u32 {
        self.active_count
    }

    /// Maximum number of active agents.
    pub const fn cap(&self) -> u32 {
        self.cap
    }

    /// Current spawn period.
    pub const fn spawn_interval_ms(&self) -> u64 {
        self.spawn_interval_ms
    }

    /// Agents created since construction.
    pub const fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Agents removed since construction.
    pub const fn deactivated_total(&self) -> u64 {
        self.deactivated_total
    }

    /// Number of agents physically in the pool.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// `true` if the pool holds no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Every removal so far, oldest first.
    pub fn destroyed(&self) -> &[DestroyRecord] {
        &self.destroyed
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Live agents in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// A live agent by id.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// A live agent by id, mutably.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Two distinct live agents, mutably, in argument order.
    ///
    /// Returns `None` if the ids are equal or either is not in the pool.
    pub fn pair_mut(&mut self, first: AgentId, second: AgentId) -> Option<(&mut Agent, &mut Agent)> {
        if first == second {
            return None;
        }
        let mut found = self
            .agents
            .iter_mut()
            .filter(|(id, _)| **id == first || **id == second);
        let (a_id, a) = found.next()?;
        let (_, b) = found.next()?;
        if *a_id == first { Some((a, b)) } else { Some((b, a)) }
    }

    /// Live agents grouped by derived kind. Kinds with no agents are absent.
    pub fn kind_counts(&self, classifier: &ClassifierConfig) -> BTreeMap<Kind, u32> {
        let mut counts = BTreeMap::new();
        for agent in self.agents.values() {
            let slot = counts.entry(agent.kind(classifier)).or_insert(0_u32);
            *slot = slot.saturating_add(1);
        }
        counts
    }

    /// Ids of every live agent that currently derives to `kind`.
    pub fn ids_of_kind(&self, kind: Kind, classifier: &ClassifierConfig) -> Vec<AgentId> {
        self.agents
            .values()
            .filter(|agent| agent.kind(classifier) == kind)
            .map(Agent::id)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Spawning
    // -----------------------------------------------------------------------

    /// Run one periodic spawn tick.
    ///
    /// Spawns up to the batch size, each agent at a randomly chosen spawn
    /// point, stopping at the cap. With no spawn points configured nothing
    /// spawns. Returns the ids of the new agents.
    pub fn spawn_tick(&mut self, now_ms: u64, rng: &mut impl Rng) -> Vec<AgentId> {
        if self.spawn_points.is_empty() {
            error!("No spawn points configured; skipping spawn tick");
            return Vec::new();
        }

        let mut spawned = Vec::new();
        for _ in 0..self.batch_size {
            if !can_spawn(self.active_count, self.cap) {
                debug!(active = self.active_count, cap = self.cap, "Population at cap");
                break;
            }
            let Some(&point) = self.spawn_points.choose(rng) else {
                break;
            };
            spawned.push(self.spawn_one(point, None, now_ms));
        }

        if !spawned.is_empty() {
            info!(
                count = spawned.len(),
                active = self.active_count,
                "Spawn tick"
            );
        }
        spawned
    }

    /// Spawn up to `count` agents around `position`.
    ///
    /// Each agent is offset by an independent jitter in
    /// `[-jitter_radius, jitter_radius]` on both axes. If `scale_override` is
    /// set it replaces the baseline scale. Stops early, with a warning, when
    /// the cap is reached. Returns the ids of the new agents.
    pub fn spawn_at(
        &mut self,
        position: Position,
        count: u32,
        scale_override: Option<f32>,
        now_ms: u64,
        rng: &mut impl Rng,
    ) -> Vec<AgentId> {
        let radius = self.jitter_radius.abs();
        let mut spawned = Vec::new();
        for _ in 0..count {
            if !can_spawn(self.active_count, self.cap) {
                warn!(
                    requested = count,
                    spawned = spawned.len(),
                    cap = self.cap,
                    "Population cap reached during bulk spawn"
                );
                break;
            }
            let point = if radius.is_finite() && radius > 0.0 {
                position.offset(
                    rng.random_range(-radius..=radius),
                    rng.random_range(-radius..=radius),
                )
            } else {
                position
            };
            spawned.push(self.spawn_one(point, scale_override, now_ms));
        }
        spawned
    }

    fn spawn_one(&mut self, position: Position, scale_override: Option<f32>, now_ms: u64) -> AgentId {
        let id = AgentId::new();
        let mut agent = Agent::spawn(
            id,
            position,
            self.baseline,
            self.max_speed,
            now_ms,
            self.spawn_immunity_ms,
        );
        if let Some(scale) = scale_override {
            agent.set_scale(scale);
        }
        self.agents.insert(id, agent);
        self.active_count = self.active_count.saturating_add(1);
        self.spawned_total = self.spawned_total.saturating_add(1);
        debug!(agent_id = %id, x = position.x, y = position.y, "Agent spawned");
        id
    }

    // -----------------------------------------------------------------------
    // Removal and cadence
    // -----------------------------------------------------------------------

    /// Remove an agent from the pool.
    ///
    /// Decrements the active count once, floored at zero, and appends to the
    /// destruction log. An unknown id changes nothing.
    pub fn deactivate(
        &mut self,
        id: AgentId,
        cause: DestroyCause,
        now_ms: u64,
        classifier: &ClassifierConfig,
    ) -> Option<Agent> {
        let Some(agent) = self.agents.remove(&id) else {
            warn!(agent_id = %id, cause = %cause, "Deactivation of unknown agent ignored");
            return None;
        };

        if self.active_count == 0 {
            warn!(agent_id = %id, "Active count already zero; clamping");
        } else {
            self.active_count = self.active_count.saturating_sub(1);
        }
        self.deactivated_total = self.deactivated_total.saturating_add(1);

        let kind = agent.kind(classifier);
        self.destroyed.push(DestroyRecord {
            agent_id: id,
            kind,
            cause,
            at_ms: now_ms,
        });
        debug!(agent_id = %id, kind = %kind, cause = %cause, "Agent deactivated");
        Some(agent)
    }

    /// Shorten the spawn period by `amount_ms`, floored at the minimum.
    /// Returns the new period.
    pub fn decrease_interval(&mut self, amount_ms: u64) -> u64 {
        self.spawn_interval_ms = self
            .spawn_interval_ms
            .saturating_sub(amount_ms)
            .max(self.min_spawn_interval_ms);
        info!(interval_ms = self.spawn_interval_ms, "Spawn interval decreased");
        self.spawn_interval_ms
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn controller(cap: u32, batch_size: u32) -> PopulationController {
        let population = PopulationConfig {
            cap,
            batch_size,
            ..PopulationConfig::default()
        };
        PopulationController::new(&population, &ProfileConfig::default(), &ImmunityConfig::default())
    }

    #[test]
    fn spawn_tick_spawns_a_batch_of_unclassified_agents() {
        let mut pop = controller(10, 3);
        let mut rng = SmallRng::seed_from_u64(1);
        let ids = pop.spawn_tick(100, &mut rng);

        assert_eq!(ids.len(), 3);
        assert_eq!(pop.active_count(), 3);
        assert_eq!(pop.len(), 3);
        let spawn_points = PopulationConfig::default().spawn_points;
        for id in ids {
            let agent = pop.agent(id).unwrap();
            assert!(agent.is_unclassified());
            assert_eq!(agent.immune_until(), Some(600));
            assert!(spawn_points.contains(&agent.position()));
        }
    }

    #[test]
    fn spawn_tick_stops_at_cap() {
        let mut pop = controller(4, 3);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(pop.spawn_tick(0, &mut rng).len(), 3);
        assert_eq!(pop.spawn_tick(0, &mut rng).len(), 1);
        assert!(pop.spawn_tick(0, &mut rng).is_empty());
        assert_eq!(pop.active_count(), 4);
    }

    #[test]
    fn no_spawn_points_skips_tick() {
        let population = PopulationConfig {
            spawn_points: Vec::new(),
            ..PopulationConfig::default()
        };
        let mut pop = PopulationController::new(
            &population,
            &ProfileConfig::default(),
            &ImmunityConfig::default(),
        );
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(pop.spawn_tick(0, &mut rng).is_empty());
        assert_eq!(pop.active_count(), 0);
    }

    #[test]
    fn bulk_spawn_jitters_and_overrides_scale() {
        let mut pop = controller(50, 1);
        let mut rng = SmallRng::seed_from_u64(9);
        let origin = Position::new(2.0, -3.0);
        let ids = pop.spawn_at(origin, 6, Some(1.2), 0, &mut rng);

        assert_eq!(ids.len(), 6);
        for id in ids {
            let agent = pop.agent(id).unwrap();
            let p = agent.position();
            assert!((p.x - origin.x).abs() <= 1.0);
            assert!((p.y - origin.y).abs() <= 1.0);
            assert!((agent.scale() - 1.2).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn bulk_spawn_stops_early_at_cap() {
        let mut pop = controller(5, 1);
        let mut rng = SmallRng::seed_from_u64(9);
        let ids = pop.spawn_at(Position::ORIGIN, 8, None, 0, &mut rng);
        assert_eq!(ids.len(), 5);
        assert_eq!(pop.active_count(), 5);
    }

    #[test]
    fn deactivate_decrements_once_and_logs() {
        let mut pop = controller(10, 2);
        let mut rng = SmallRng::seed_from_u64(1);
        let ids = pop.spawn_tick(0, &mut rng);
        let classifier = ClassifierConfig::default();

        let removed = pop.deactivate(ids[0], DestroyCause::Fusion, 50, &classifier);
        assert!(removed.is_some());
        assert_eq!(pop.active_count(), 1);
        assert_eq!(pop.deactivated_total(), 1);
        assert_eq!(
            pop.destroyed(),
            &[DestroyRecord {
                agent_id: ids[0],
                kind: Kind::Unclassified,
                cause: DestroyCause::Fusion,
                at_ms: 50,
            }]
        );

        assert!(pop.deactivate(ids[0], DestroyCause::Fusion, 60, &classifier).is_none());
        assert_eq!(pop.active_count(), 1);
        assert_eq!(pop.deactivated_total(), 1);
    }

    #[test]
    fn interval_decrease_is_floored() {
        let mut pop = controller(10, 1);
        assert_eq!(pop.spawn_interval_ms(), 3000);
        assert_eq!(pop.decrease_interval(500), 2500);
        assert_eq!(pop.decrease_interval(5000), 1000);
        assert_eq!(pop.decrease_interval(1), 1000);
    }

    #[test]
    fn pair_mut_returns_argument_order() {
        let mut pop = controller(10, 2);
        let mut rng = SmallRng::seed_from_u64(1);
        let ids = pop.spawn_tick(0, &mut rng);
        let (a, b) = (ids[0], ids[1]);

        let (first, second) = pop.pair_mut(b, a).unwrap();
        assert_eq!(first.id(), b);
        assert_eq!(second.id(), a);
        assert!(pop.pair_mut(a, a).is_none());
        assert!(pop.pair_mut(a, AgentId::new()).is_none());
    }

    #[test]
    fn kind_counts_group_live_agents() {
        let mut pop = controller(10, 4);
        let mut rng = SmallRng::seed_from_u64(1);
        pop.spawn_tick(0, &mut rng);
        let counts = pop.kind_counts(&ClassifierConfig::default());
        assert_eq!(counts.get(&Kind::Unclassified), Some(&4));
        assert_eq!(counts.get(&Kind::Small), None);
    }
}
