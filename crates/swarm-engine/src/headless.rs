//! Stand-in physics for running without a game engine.
//!
//! Every frame the scripted player moves along a circular orbit, each agent
//! steps straight toward the player at its own speed, and every pair of
//! overlapping circles is reported as a contact. Overlaps are reported on
//! every frame they persist; the immunity guard in the arena absorbs the
//! repeats.

use swarm_agents::Agent;
use swarm_core::config::WorldConfig;
use swarm_types::{AgentId, Position};

/// A contact reported to the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Two agents overlap.
    Agents(AgentId, AgentId),
    /// An agent overlaps the player.
    Player(AgentId),
}

/// Result of one physics step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// New agent positions.
    pub moves: Vec<(AgentId, Position)>,
    /// Overlaps at the new positions.
    pub contacts: Vec<Contact>,
}

/// Chase-and-overlap physics over a square arena.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessPhysics {
    world: WorldConfig,
    player: Position,
    elapsed_ms: u64,
}

impl HeadlessPhysics {
    /// Create the physics with the player at the start of its orbit.
    pub fn new(world: WorldConfig) -> Self {
        let player = orbit_position(&world, 0);
        Self {
            world,
            player,
            elapsed_ms: 0,
        }
    }

    /// Current player position.
    pub const fn player(&self) -> Position {
        self.player
    }

    /// Drop all motion state, as after a restart.
    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
        self.player = orbit_position(&self.world, 0);
    }

    /// Advance by `dt_ms` and report the resulting positions and overlaps.
    pub fn step<'a>(&mut self, agents: impl IntoIterator<Item = &'a Agent>, dt_ms: u64) -> Frame {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        self.player = orbit_position(&self.world, self.elapsed_ms);

        let dt_s = dt_ms as f32 / 1000.0;
        let bound = self.world.arena_half_extent.abs();
        let bodies: Vec<(AgentId, Position, f32)> = agents
            .into_iter()
            .map(|agent| {
                let v = agent.chase_velocity(self.player);
                let p = agent.position().offset(v.x * dt_s, v.y * dt_s);
                let p = Position::new(p.x.clamp(-bound, bound), p.y.clamp(-bound, bound));
                (agent.id(), p, self.world.contact_radius * agent.scale())
            })
            .collect();

        let mut contacts = Vec::new();
        for (i, &(id, pos, radius)) in bodies.iter().enumerate() {
            if pos.distance(self.player) < radius + self.world.player_radius {
                contacts.push(Contact::Player(id));
            }
            for &(other_id, other_pos, other_radius) in bodies.iter().skip(i.saturating_add(1)) {
                if pos.distance(other_pos) < radius + other_radius {
                    contacts.push(Contact::Agents(id, other_id));
                }
            }
        }

        Frame {
            moves: bodies.into_iter().map(|(id, pos, _)| (id, pos)).collect(),
            contacts,
        }
    }
}

fn orbit_position(world: &WorldConfig, elapsed_ms: u64) -> Position {
    let angle = world.player_angular_speed * (elapsed_ms as f32 / 1000.0);
    Position::new(
        world.player_orbit_radius * angle.cos(),
        world.player_orbit_radius * angle.sin(),
    )
}
