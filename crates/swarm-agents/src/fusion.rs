//! The contact rule hierarchy.
//!
//! When the physics collaborator reports two agents in contact, the
//! [`FusionResolver`] decides what happens. Rules are evaluated in order and
//! the first match is terminal:
//!
//! | # | Condition | Result |
//! |---|-----------|--------|
//! | 0 | same agent, or either agent immune | no-op |
//! | 1 | both unclassified | coin flip: one survives and transforms into a random kind, the other is deactivated; fusion score |
//! | 2 | exactly one unclassified | both get a short cooldown |
//! | 3 | both classified, same kind | both get a short cooldown |
//! | 4 | both classified, different kinds | dominance table picks a winner; loser transforms into the winner's kind; battle score |
//!
//! If rule 4's table has no single winner for the pair, both agents get a
//! short cooldown and the pair is logged as a configuration error.
//!
//! The resolver mutates only the two agents it is handed. Everything else
//! (removing the loser from the pool, scoring, audio, rescheduling immunity
//! timers) is returned as a list of [`Effect`] values for the caller to
//! carry out in order.

use rand::Rng;
use rand::seq::IndexedRandom;
use swarm_types::{AgentId, AudioCue, Kind, ScoreEvent};
use tracing::{debug, error, info};

use crate::agent::Agent;
use crate::config::{ClassifierConfig, ImmunityConfig, ProfileConfig};
use crate::dominance::DominanceTable;
use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// A side effect requested by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Remove this agent from the population (decrements the active count).
    Deactivate(AgentId),
    /// Award the points configured for this event.
    Score(ScoreEvent),
    /// Play a one-shot cue.
    Cue(AudioCue),
    /// The agent's immunity now lapses at `until_ms`; reschedule its timer.
    Immunity {
        /// The agent whose guard changed.
        agent_id: AgentId,
        /// New expiry in simulated milliseconds.
        until_ms: u64,
    },
}

/// Why a contact was ignored before any rule ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Both sides of the contact are the same agent.
    SameAgent,
    /// At least one agent is still immune.
    Immune,
}

/// Why a contact between two live agents changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeflectReason {
    /// Rule 2: one agent is unclassified, the other is not.
    MixedClassification,
    /// Rule 3: both agents are classified as the same kind.
    SameKind(Kind),
}

/// What a contact resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionOutcome {
    /// The re-entrancy guard swallowed the contact.
    Skipped(SkipReason),
    /// Rule 1: two unclassified agents fused.
    Fused {
        /// The agent that transformed.
        survivor: AgentId,
        /// The agent that is deactivated.
        removed: AgentId,
        /// The kind the survivor became.
        kind: Kind,
    },
    /// Rules 2 and 3: nothing structural happened.
    Deflected(DeflectReason),
    /// Rule 4: a dominance battle.
    Battle {
        /// The agent whose kind won.
        winner: AgentId,
        /// The agent that transformed into the winner's kind.
        loser: AgentId,
        /// The winning kind.
        kind: Kind,
    },
    /// Rule 4 with a pair the dominance table cannot resolve.
    Unresolved {
        /// Kind of the first agent.
        first: Kind,
        /// Kind of the second agent.
        second: Kind,
    },
}

/// The outcome of one contact plus the effects the caller must apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Which rule fired.
    pub outcome: FusionOutcome,
    /// Side effects, in the order they must be applied.
    pub effects: Vec<Effect>,
}

impl Resolution {
    const fn skipped(reason: SkipReason) -> Self {
        Self {
            outcome: FusionOutcome::Skipped(reason),
            effects: Vec::new(),
        }
    }
}

/// Result of an agent touching the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerContact {
    /// Unclassified agents never hurt the player.
    Harmless,
    /// A classified agent reached the player.
    GameOver(Kind),
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Everything the rule hierarchy needs to know about the world.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FusionRules {
    /// Kind derivation thresholds.
    pub classifier: ClassifierConfig,
    /// Canonical per-kind attributes.
    pub profiles: ProfileConfig,
    /// Battle relation.
    pub dominance: DominanceTable,
    /// Cooldown durations.
    pub immunity: ImmunityConfig,
}

impl FusionRules {
    /// Every configuration problem these rules would hit at runtime.
    pub fn problems(&self) -> Vec<AgentError> {
        let mut problems = self.profiles.mismatches(&self.classifier);
        problems.extend(self.dominance.unresolved_pairs());
        problems
    }
}

/// Applies the contact rule hierarchy.
#[derive(Debug, Clone, Default)]
pub struct FusionResolver {
    rules: FusionRules,
}

impl FusionResolver {
    /// Create a resolver over the given rules.
    pub const fn new(rules: FusionRules) -> Self {
        Self { rules }
    }

    /// The rules this resolver applies.
    pub const fn rules(&self) -> &FusionRules {
        &self.rules
    }

    /// Derive the kind of an agent under these rules.
    pub fn kind_of(&self, agent: &Agent) -> Kind {
        agent.kind(&self.rules.classifier)
    }

    /// Resolve a contact between two agents.
    ///
    /// `first` and `second` must be distinct live agents. Both are marked
    /// immune before any rule runs.
    pub fn resolve(
        &self,
        first: &mut Agent,
        second: &mut Agent,
        now_ms: u64,
        rng: &mut impl Rng,
    ) -> Resolution {
        if first.id() == second.id() {
            return Resolution::skipped(SkipReason::SameAgent);
        }
        if first.is_immune() || second.is_immune() {
            return Resolution::skipped(SkipReason::Immune);
        }

        let short = self.rules.immunity.short_ms;
        first.grant_immunity(now_ms, short);
        second.grant_immunity(now_ms, short);

        let mut effects = Vec::new();
        let outcome = match (first.is_unclassified(), second.is_unclassified()) {
            (true, true) => self.fuse(first, second, now_ms, rng, &mut effects),
            (true, false) | (false, true) => {
                debug!(
                    first = %first.id(),
                    second = %second.id(),
                    "Unclassified met classified, no fusion"
                );
                FusionOutcome::Deflected(DeflectReason::MixedClassification)
            }
            (false, false) => self.battle(first, second, now_ms, &mut effects),
        };

        // Whatever survived carries its final immunity; the removed agent is
        // gone before any timer could matter.
        let removed = match outcome {
            FusionOutcome::Fused { removed, .. } => Some(removed),
            _ => None,
        };
        for agent in [&*first, &*second] {
            if Some(agent.id()) == removed {
                continue;
            }
            if let Some(until_ms) = agent.immune_until() {
                effects.push(Effect::Immunity {
                    agent_id: agent.id(),
                    until_ms,
                });
            }
        }

        Resolution { outcome, effects }
    }

    /// Rule 1.
    fn fuse(
        &self,
        first: &mut Agent,
        second: &mut Agent,
        now_ms: u64,
        rng: &mut impl Rng,
        effects: &mut Vec<Effect>,
    ) -> FusionOutcome {
        let (survivor, removed) = if rng.random_bool(0.5) {
            (first, second)
        } else {
            (second, first)
        };

        effects.push(Effect::Deactivate(removed.id()));

        survivor.mark_classified();
        let kind = Kind::CLASSIFIED
            .choose(rng)
            .copied()
            .unwrap_or(Kind::Normal);
        if let Err(e) = self.apply_transformation(survivor, kind, now_ms, effects) {
            error!(agent_id = %survivor.id(), error = %e, "Fusion transformation skipped");
        }
        effects.push(Effect::Score(ScoreEvent::Fusion));

        info!(
            survivor = %survivor.id(),
            removed = %removed.id(),
            kind = %kind,
            "Fusion: two unclassified agents merged"
        );

        FusionOutcome::Fused {
            survivor: survivor.id(),
            removed: removed.id(),
            kind,
        }
    }

    /// Rules 3 and 4.
    fn battle(
        &self,
        first: &mut Agent,
        second: &mut Agent,
        now_ms: u64,
        effects: &mut Vec<Effect>,
    ) -> FusionOutcome {
        let first_kind = self.kind_of(first);
        let second_kind = self.kind_of(second);

        if first_kind == second_kind {
            debug!(kind = %first_kind, "Same-kind contact ignored");
            return FusionOutcome::Deflected(DeflectReason::SameKind(first_kind));
        }

        let Some(winning_kind) = self.rules.dominance.winner(first_kind, second_kind) else {
            error!(
                first = %first_kind,
                second = %second_kind,
                "Dominance table does not resolve this pair; check configuration"
            );
            return FusionOutcome::Unresolved {
                first: first_kind,
                second: second_kind,
            };
        };

        let (winner, loser) = if winning_kind == first_kind {
            (first, second)
        } else {
            (second, first)
        };

        if let Err(e) = self.apply_transformation(loser, winning_kind, now_ms, effects) {
            error!(agent_id = %loser.id(), error = %e, "Battle transformation skipped");
        }
        winner.grant_immunity(now_ms, self.rules.immunity.medium_ms);
        effects.push(Effect::Score(ScoreEvent::Battle));

        info!(
            winner = %winner.id(),
            loser = %loser.id(),
            kind = %winning_kind,
            "Battle: loser transformed into winner's kind"
        );

        FusionOutcome::Battle {
            winner: winner.id(),
            loser: loser.id(),
            kind: winning_kind,
        }
    }

    /// Transform `agent` into `target`.
    ///
    /// Clears the unclassified flag, sets speed and scale to the target's
    /// canonical profile, queues the target's audio cue, and grants a medium
    /// cooldown. The cue is pushed onto `effects`; the immunity change is
    /// reported by the caller once resolution finishes.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NoProfile`] for [`Kind::Unclassified`]; the
    /// agent is left untouched.
    pub fn apply_transformation(
        &self,
        agent: &mut Agent,
        target: Kind,
        now_ms: u64,
        effects: &mut Vec<Effect>,
    ) -> Result<(), AgentError> {
        let profile = self
            .rules
            .profiles
            .profile_for(target)
            .ok_or(AgentError::NoProfile { kind: target })?;

        agent.mark_classified();
        agent.set_speed(profile.speed, self.rules.profiles.max_speed);
        agent.set_scale(profile.scale);
        if let Some(cue) = AudioCue::for_transformation(target) {
            effects.push(Effect::Cue(cue));
        }
        agent.grant_immunity(now_ms, self.rules.immunity.medium_ms);

        debug!(agent_id = %agent.id(), kind = %target, "Agent transformed");
        Ok(())
    }

    /// Decide what an agent touching the player means.
    pub fn player_contact(&self, agent: &Agent) -> PlayerContact {
        match self.kind_of(agent) {
            Kind::Unclassified => PlayerContact::Harmless,
            kind => PlayerContact::GameOver(kind),
        }
    }
}
