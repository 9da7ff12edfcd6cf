//! The agent record.
//!
//! An [`Agent`] holds the two continuously mutable attributes that its kind
//! is derived from (speed and scale), the one-way unclassified flag, and the
//! immunity guard. It never stores a kind; see [`crate::classify`].
//!
//! Fields are private so the invariants hold by construction:
//! - `is_unclassified` can only go from `true` to `false`.
//! - `speed` never exceeds the ceiling passed to [`Agent::set_speed`].
//! - `immune` is `true` exactly when `immune_until` is `Some`.

use serde::{Deserialize, Serialize};
use swarm_types::{AgentId, Kind, Position};

use crate::classify;
use crate::config::{ClassifierConfig, KindProfile};

/// A single simulated enemy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    id: AgentId,
    speed: f32,
    scale: f32,
    is_unclassified: bool,
    immune: bool,
    immune_until: Option<u64>,
    position: Position,
    spawned_at_ms: u64,
}

impl Agent {
    /// Create a freshly spawned, unclassified agent.
    ///
    /// The agent starts at `baseline`, immune for `immunity_ms`.
    pub fn spawn(
        id: AgentId,
        position: Position,
        baseline: KindProfile,
        max_speed: f32,
        now_ms: u64,
        immunity_ms: u64,
    ) -> Self {
        let mut agent = Self {
            id,
            speed: 0.0,
            scale: baseline.scale.max(0.0),
            is_unclassified: true,
            immune: false,
            immune_until: None,
            position,
            spawned_at_ms: now_ms,
        };
        agent.set_speed(baseline.speed, max_speed);
        agent.grant_immunity(now_ms, immunity_ms);
        agent
    }

    /// The agent's identity.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Current chase speed.
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Current uniform scale.
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// `true` until the agent's first transformation.
    pub const fn is_unclassified(&self) -> bool {
        self.is_unclassified
    }

    /// `true` while the re-resolution guard is active.
    pub const fn is_immune(&self) -> bool {
        self.immune
    }

    /// Simulated time at which the current immunity lapses.
    pub const fn immune_until(&self) -> Option<u64> {
        self.immune_until
    }

    /// Last position reported by the physics collaborator.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Simulated time of the spawn.
    pub const fn spawned_at_ms(&self) -> u64 {
        self.spawned_at_ms
    }

    /// Derive the agent's current kind.
    pub fn kind(&self, classifier: &ClassifierConfig) -> Kind {
        classify::classify(self, classifier)
    }

    /// Set the chase speed, clamped to `[0, max_speed]`.
    pub fn set_speed(&mut self, speed: f32, max_speed: f32) {
        self.speed = speed.clamp(0.0, max_speed.max(0.0));
    }

    /// Set the uniform scale. Negative values are clamped to zero.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.max(0.0);
    }

    /// Permanently clear the unclassified flag.
    pub const fn mark_classified(&mut self) {
        self.is_unclassified = false;
    }

    /// Record a new position from the physics collaborator.
    pub const fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Make the agent immune until `now_ms + duration_ms`.
    ///
    /// Replaces any earlier expiry, whether sooner or later. Returns the new
    /// expiry time so the caller can reschedule the matching timer.
    pub const fn grant_immunity(&mut self, now_ms: u64, duration_ms: u64) -> u64 {
        let until = now_ms.saturating_add(duration_ms);
        self.immune = true;
        self.immune_until = Some(until);
        until
    }

    /// Clear immunity if it has lapsed at `now_ms`.
    ///
    /// Returns `true` if the guard was cleared. A stale timer firing before
    /// the current expiry leaves the agent immune.
    pub fn expire_immunity(&mut self, now_ms: u64) -> bool {
        match self.immune_until {
            Some(until) if until <= now_ms => {
                self.immune = false;
                self.immune_until = None;
                true
            }
            _ => false,
        }
    }

    /// Velocity that chases `target` at the agent's current speed.
    pub fn chase_velocity(&self, target: Position) -> Position {
        self.position.direction_to(target).scaled(self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn fresh(now_ms: u64) -> Agent {
        Agent::spawn(
            AgentId::new(),
            Position::ORIGIN,
            KindProfile::new(3.0, 1.0),
            7.0,
            now_ms,
            500,
        )
    }

    #[test]
    fn spawned_agent_is_unclassified_and_immune() {
        let agent = fresh(100);
        assert!(agent.is_unclassified());
        assert!(agent.is_immune());
        assert_eq!(agent.immune_until(), Some(600));
        assert_eq!(agent.spawned_at_ms(), 100);
        assert!(close(agent.speed(), 3.0));
        assert!(close(agent.scale(), 1.0));
    }

    #[test]
    fn speed_is_clamped_to_ceiling() {
        let mut agent = fresh(0);
        agent.set_speed(12.0, 7.0);
        assert!(close(agent.speed(), 7.0));
        agent.set_speed(-1.0, 7.0);
        assert!(close(agent.speed(), 0.0));
    }

    #[test]
    fn classification_is_one_way() {
        let mut agent = fresh(0);
        agent.mark_classified();
        assert!(!agent.is_unclassified());
        agent.mark_classified();
        assert!(!agent.is_unclassified());
    }

    #[test]
    fn immunity_expires_only_at_or_after_deadline() {
        let mut agent = fresh(0);
        assert!(!agent.expire_immunity(499));
        assert!(agent.is_immune());
        assert!(agent.expire_immunity(500));
        assert!(!agent.is_immune());
        assert_eq!(agent.immune_until(), None);
        assert!(!agent.expire_immunity(1000));
    }

    #[test]
    fn regranting_immunity_replaces_deadline() {
        let mut agent = fresh(0);
        assert_eq!(agent.grant_immunity(300, 200), 500);
        assert_eq!(agent.grant_immunity(310, 800), 1110);
        // The timer scheduled for the first grant is stale now.
        assert!(!agent.expire_immunity(500));
        assert!(agent.expire_immunity(1110));
    }

    #[test]
    fn chase_velocity_points_at_target_with_speed() {
        let agent = fresh(0);
        let v = agent.chase_velocity(Position::new(0.0, 10.0));
        assert!(close(v.x, 0.0));
        assert!(close(v.y, 3.0));
    }
}
