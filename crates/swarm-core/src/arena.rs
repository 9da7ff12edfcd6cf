//! The arena: every service of one game, wired together.
//!
//! [`Arena`] is constructed explicitly with its collaborators and owns the
//! population, the score, the fusion resolver, the mass-presence monitor,
//! and the single timer wheel that drives all periodic work. The physics
//! collaborator reports contacts through [`Arena::on_contact`] and
//! [`Arena::on_player_contact`]; the frame loop moves time forward with
//! [`Arena::advance`].
//!
//! Game over is a latch. Once it fires the score is frozen, every pending
//! timer is dropped, and further contacts are ignored until
//! [`Arena::restart`].

use rand::SeedableRng;
use rand::rngs::StdRng;
use swarm_agents::{
    Agent, AgentError, ClassifierConfig, Effect, FusionOutcome, FusionResolver, PlayerContact,
    SkipReason,
};
use swarm_types::{AgentId, AudioCue, DestroyCause, Kind, Position, TimerKey};
use tracing::{debug, error, info};

use crate::audio::AudioSink;
use crate::clock::{ClockError, TimerWheel};
use crate::config::{ConfigError, SimulationConfig};
use crate::lifecycle::GameLifecycle;
use crate::monitor::MassPresenceMonitor;
use crate::population::PopulationController;
use crate::score::ScoreLedger;

/// What one call to [`Arena::advance`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceSummary {
    /// Timer firings processed.
    pub fired: usize,
    /// Agents created by spawn ticks.
    pub spawned: usize,
    /// Agents removed by mass-presence culls.
    pub culled: usize,
    /// Population score samples taken.
    pub samples: usize,
}

/// One running game.
#[derive(Debug)]
pub struct Arena<A, L> {
    config: SimulationConfig,
    resolver: FusionResolver,
    population: PopulationController,
    monitor: MassPresenceMonitor,
    score: ScoreLedger,
    timers: TimerWheel,
    rng: StdRng,
    audio: A,
    lifecycle: L,
    level: u32,
    started: bool,
    game_over: bool,
}

impl<A: AudioSink, L: GameLifecycle> Arena<A, L> {
    /// Build an arena from configuration and collaborators.
    ///
    /// Degraded-mode problems from [`SimulationConfig::validate`] are logged
    /// and the arena is built anyway. Call [`start`](Self::start) to arm the
    /// timers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration cannot run at
    /// all (zero timer period or zero cap).
    pub fn new(config: SimulationConfig, audio: A, lifecycle: L) -> Result<Self, ConfigError> {
        config.ensure_runnable()?;
        for warning in config.validate() {
            error!(warning = %warning, "Configuration problem; continuing in degraded mode");
        }

        let resolver = FusionResolver::new(config.fusion_rules());
        let population = fresh_population(&config);
        Ok(Self {
            monitor: MassPresenceMonitor::new(config.mass_presence),
            score: ScoreLedger::new(config.scoring),
            rng: StdRng::seed_from_u64(config.world.seed),
            timers: TimerWheel::new(),
            level: 1,
            started: false,
            game_over: false,
            resolver,
            population,
            audio,
            lifecycle,
            config,
        })
    }

    /// Arm the periodic timers and start the background loop.
    ///
    /// The first spawn tick fires immediately; the mass-presence scan and
    /// the score sample fire one period from now. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if a first deadline is not
    /// representable.
    pub fn start(&mut self) -> Result<(), ClockError> {
        if self.started {
            return Ok(());
        }
        self.timers.schedule_in(TimerKey::Spawn, 0)?;
        self.timers
            .schedule_in(TimerKey::MassPresence, self.monitor.check_interval_ms())?;
        self.timers
            .schedule_in(TimerKey::ScoreSample, self.config.scoring.sample_interval_ms)?;
        self.audio.play_loop(AudioCue::Background);
        self.started = true;
        info!(
            cap = self.population.cap(),
            interval_ms = self.population.spawn_interval_ms(),
            "Arena started"
        );
        Ok(())
    }

    /// Tear down the current game and start a fresh one at the current time.
    ///
    /// # Errors
    ///
    /// Propagates [`start`](Self::start) errors.
    pub fn restart(&mut self) -> Result<(), ClockError> {
        self.timers.clear();
        self.population = fresh_population(&self.config);
        self.score = ScoreLedger::new(self.config.scoring);
        self.level = 1;
        self.game_over = false;
        self.started = false;
        info!(now_ms = self.timers.now_ms(), "Arena restarted");
        self.start()
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Move simulated time forward by `dt_ms`, running every timer that
    /// falls due, in deadline order.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if the target time or a rescheduled
    /// deadline is not representable.
    pub fn advance(&mut self, dt_ms: u64) -> Result<AdvanceSummary, ClockError> {
        let now_ms = self.timers.now_ms();
        let target_ms = now_ms.checked_add(dt_ms).ok_or(ClockError::Overflow {
            now_ms,
            delay_ms: dt_ms,
        })?;

        let mut summary = AdvanceSummary::default();
        while let Some((at_ms, key)) = self.timers.pop_due(target_ms) {
            summary.fired = summary.fired.saturating_add(1);
            self.fire(at_ms, key, &mut summary)?;
        }
        self.timers.advance_to(target_ms)?;
        Ok(summary)
    }

    fn fire(&mut self, now_ms: u64, key: TimerKey, summary: &mut AdvanceSummary) -> Result<(), ClockError> {
        match key {
            TimerKey::Spawn => {
                let ids = self.population.spawn_tick(now_ms, &mut self.rng);
                summary.spawned = summary.spawned.saturating_add(ids.len());
                self.arm_immunity(&ids);
                self.timers
                    .schedule_in(TimerKey::Spawn, self.population.spawn_interval_ms())?;
            }
            TimerKey::MassPresence => {
                let classifier = self.classifier();
                if let Some(report) = self.monitor.scan(
                    &mut self.population,
                    &classifier,
                    now_ms,
                    &mut self.score,
                    &mut self.audio,
                ) {
                    summary.culled = summary.culled.saturating_add(report.culled.len());
                    for id in &report.culled {
                        self.timers.cancel(TimerKey::Immunity(*id));
                    }
                    self.level = self.level.saturating_add(1);
                    self.lifecycle.signal_level_advance(self.level);
                    info!(level = self.level, "Level advanced");
                    // The spawn loop restarts on the new period.
                    self.timers
                        .schedule_in(TimerKey::Spawn, report.new_interval_ms)?;
                }
                self.timers
                    .schedule_in(TimerKey::MassPresence, self.monitor.check_interval_ms())?;
            }
            TimerKey::ScoreSample => {
                let counts = self.population.kind_counts(&self.classifier());
                let unclassified = counts.get(&Kind::Unclassified).copied().unwrap_or(0);
                let classified: u32 = counts
                    .iter()
                    .filter(|(kind, _)| kind.is_classified())
                    .map(|(_, &count)| count)
                    .fold(0, u32::saturating_add);
                let points = self
                    .score
                    .record_sample(u64::from(unclassified), u64::from(classified));
                summary.samples = summary.samples.saturating_add(1);
                debug!(unclassified, classified, points, "Population sampled");
                self.timers
                    .schedule_in(TimerKey::ScoreSample, self.config.scoring.sample_interval_ms)?;
            }
            TimerKey::Immunity(id) => {
                // A firing that predates the agent's current deadline re-arms.
                let pending = self.population.agent_mut(id).and_then(|agent| {
                    if agent.expire_immunity(now_ms) {
                        None
                    } else {
                        agent.immune_until()
                    }
                });
                if let Some(until_ms) = pending {
                    self.timers.schedule_at(key, until_ms);
                }
            }
        }
        Ok(())
    }

    fn arm_immunity(&mut self, ids: &[AgentId]) {
        for &id in ids {
            if let Some(until_ms) = self.population.agent(id).and_then(Agent::immune_until) {
                self.timers.schedule_at(TimerKey::Immunity(id), until_ms);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Contacts
    // -----------------------------------------------------------------------

    /// Resolve a contact between two agents reported by physics.
    ///
    /// Returns `None` after game over or when either id is not live.
    pub fn on_contact(&mut self, first: AgentId, second: AgentId) -> Option<FusionOutcome> {
        if self.game_over {
            return None;
        }
        if first == second {
            return self
                .population
                .agent(first)
                .map(|_| FusionOutcome::Skipped(SkipReason::SameAgent));
        }

        let now_ms = self.timers.now_ms();
        let (a, b) = self.population.pair_mut(first, second)?;
        let resolution = self.resolver.resolve(a, b, now_ms, &mut self.rng);

        self.apply_effects(resolution.effects, now_ms);
        Some(resolution.outcome)
    }

    /// Transform a live agent into `target` outside of a contact.
    ///
    /// Plays the target's cue and re-arms the agent's immunity timer, the
    /// same as a transformation caused by a contact.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownAgent`] for an id that is not live, or
    /// [`AgentError::NoProfile`] for [`Kind::Unclassified`].
    pub fn transform(&mut self, id: AgentId, target: Kind) -> Result<(), AgentError> {
        let now_ms = self.timers.now_ms();
        let agent = self
            .population
            .agent_mut(id)
            .ok_or(AgentError::UnknownAgent { agent_id: id })?;
        let mut effects = Vec::new();
        self.resolver
            .apply_transformation(agent, target, now_ms, &mut effects)?;
        if let Some(until_ms) = agent.immune_until() {
            effects.push(Effect::Immunity { agent_id: id, until_ms });
        }
        self.apply_effects(effects, now_ms);
        Ok(())
    }

    fn apply_effects(&mut self, effects: Vec<Effect>, now_ms: u64) {
        let classifier = self.classifier();
        for effect in effects {
            match effect {
                Effect::Deactivate(id) => {
                    self.population
                        .deactivate(id, DestroyCause::Fusion, now_ms, &classifier);
                    self.timers.cancel(TimerKey::Immunity(id));
                }
                Effect::Score(event) => {
                    self.score.record(event);
                }
                Effect::Cue(cue) => self.audio.play_one_shot(cue),
                Effect::Immunity { agent_id, until_ms } => {
                    self.timers.schedule_at(TimerKey::Immunity(agent_id), until_ms);
                }
            }
        }
    }

    /// Handle an agent touching the player.
    ///
    /// A classified agent ends the game; an unclassified one is harmless.
    /// Game over is signalled at most once.
    pub fn on_player_contact(&mut self, id: AgentId) -> PlayerContact {
        let Some(agent) = self.population.agent(id) else {
            return PlayerContact::Harmless;
        };
        let contact = self.resolver.player_contact(agent);
        if let (PlayerContact::GameOver(kind), false) = (contact, self.game_over) {
            self.end_game(id, kind);
        }
        contact
    }

    fn end_game(&mut self, culprit: AgentId, kind: Kind) {
        self.game_over = true;
        self.score.freeze();
        self.timers.clear();
        self.audio.stop_loop(AudioCue::Background);
        self.audio.play_one_shot(AudioCue::GameOver);
        self.lifecycle.signal_game_over();
        info!(
            agent_id = %culprit,
            kind = %kind,
            score = self.score.total(),
            level = self.level,
            "Game over"
        );
    }

    // -----------------------------------------------------------------------
    // Population passthroughs
    // -----------------------------------------------------------------------

    /// Spawn up to `count` agents around `position`. Nothing spawns after
    /// game over.
    pub fn spawn_at(&mut self, position: Position, count: u32, scale_override: Option<f32>) -> Vec<AgentId> {
        if self.game_over {
            return Vec::new();
        }
        let now_ms = self.timers.now_ms();
        let ids = self
            .population
            .spawn_at(position, count, scale_override, now_ms, &mut self.rng);
        self.arm_immunity(&ids);
        ids
    }

    /// Record a position reported by physics. Returns `false` for an
    /// unknown agent.
    pub fn update_position(&mut self, id: AgentId, position: Position) -> bool {
        match self.population.agent_mut(id) {
            Some(agent) => {
                agent.set_position(position);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Read-only views
    // -----------------------------------------------------------------------

    /// Score for display.
    pub const fn current_score(&self) -> u64 {
        self.score.total()
    }

    /// Level for display. Starts at 1.
    pub const fn current_level(&self) -> u32 {
        self.level
    }

    /// `true` once a classified agent has reached the player.
    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Current simulated time.
    pub const fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Number of active agents.
    pub const fn active_count(&self) -> u32 {
        self.population.active_count()
    }

    /// Live agents in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.population.agents()
    }

    /// A live agent by id.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.population.agent(id)
    }

    /// Derived kind of a live agent.
    pub fn kind_of(&self, id: AgentId) -> Option<Kind> {
        self.population.agent(id).map(|agent| self.resolver.kind_of(agent))
    }

    /// The population pool.
    pub const fn population(&self) -> &PopulationController {
        &self.population
    }

    /// The score ledger.
    pub const fn score(&self) -> &ScoreLedger {
        &self.score
    }

    /// The timer wheel.
    pub const fn timers(&self) -> &TimerWheel {
        &self.timers
    }

    /// The configuration this arena was built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The audio collaborator.
    pub const fn audio(&self) -> &A {
        &self.audio
    }

    /// The lifecycle collaborator.
    pub const fn lifecycle(&self) -> &L {
        &self.lifecycle
    }

    fn classifier(&self) -> ClassifierConfig {
        self.resolver.rules().classifier
    }
}

fn fresh_population(config: &SimulationConfig) -> PopulationController {
    PopulationController::new(&config.population, &config.profiles, &config.immunity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::audio::{AudioCall, RecordingAudio};
    use crate::lifecycle::RecordingLifecycle;

    fn arena() -> Arena<RecordingAudio, RecordingLifecycle> {
        Arena::new(
            SimulationConfig::default(),
            RecordingAudio::new(),
            RecordingLifecycle::default(),
        )
        .unwrap()
    }

    #[test]
    fn start_spawns_immediately_and_plays_background() {
        let mut arena = arena();
        arena.start().unwrap();
        let summary = arena.advance(0).unwrap();
        assert_eq!(summary.spawned, 1);
        assert_eq!(arena.active_count(), 1);
        assert_eq!(arena.audio().calls, vec![AudioCall::LoopStarted(AudioCue::Background)]);
        assert_eq!(arena.timers().deadline(TimerKey::Spawn), Some(3000));
    }

    #[test]
    fn start_is_idempotent() {
        let mut arena = arena();
        arena.start().unwrap();
        arena.start().unwrap();
        assert_eq!(arena.audio().calls.len(), 1);
    }

    #[test]
    fn spawn_immunity_expires_on_schedule() {
        let mut arena = arena();
        let ids = arena.spawn_at(Position::ORIGIN, 1, None);
        let id = ids.first().copied().unwrap();
        assert!(arena.agent(id).unwrap().is_immune());
        arena.advance(499).unwrap();
        assert!(arena.agent(id).unwrap().is_immune());
        arena.advance(1).unwrap();
        assert!(!arena.agent(id).unwrap().is_immune());
    }

    #[test]
    fn samples_score_live_population() {
        let mut arena = arena();
        arena.start().unwrap();
        arena.advance(1000).unwrap();
        // One unclassified agent from the t=0 spawn.
        assert_eq!(arena.current_score(), 1);
    }

    #[test]
    fn zero_cap_is_rejected() {
        let mut config = SimulationConfig::default();
        config.population.cap = 0;
        let err = Arena::new(config, RecordingAudio::new(), RecordingLifecycle::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn contact_with_unknown_agent_is_ignored() {
        let mut arena = arena();
        let ids = arena.spawn_at(Position::ORIGIN, 1, None);
        let id = ids.first().copied().unwrap();
        assert_eq!(arena.on_contact(id, AgentId::new()), None);
        assert_eq!(
            arena.on_contact(id, id),
            Some(FusionOutcome::Skipped(SkipReason::SameAgent))
        );
    }
}
