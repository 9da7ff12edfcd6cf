//! Enumeration types for the Swarm simulation.
//!
//! [`Kind`] is never stored on an agent; it is derived from the agent's
//! speed, scale, and unclassified flag every time it is needed. The other
//! enums name the side effects the rules emit: audio cues, score events,
//! the cause recorded when an agent leaves the pool, and the keys of the
//! simulation's timers.

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// Discrete classification of an agent.
///
/// Declaration order is also the order the mass-presence scan visits
/// classified groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// Freshly spawned, not yet differentiated. Harmless to the player.
    Unclassified,
    /// High speed, reduced scale.
    Small,
    /// Baseline speed and scale.
    Normal,
    /// Low speed, increased scale.
    Large,
}

impl Kind {
    /// The three kinds an agent can be transformed into.
    pub const CLASSIFIED: [Self; 3] = [Self::Small, Self::Normal, Self::Large];

    /// Returns `true` for every kind except [`Kind::Unclassified`].
    pub const fn is_classified(self) -> bool {
        !matches!(self, Self::Unclassified)
    }
}

impl core::fmt::Display for Kind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unclassified => write!(f, "unclassified"),
            Self::Small => write!(f, "small"),
            Self::Normal => write!(f, "normal"),
            Self::Large => write!(f, "large"),
        }
    }
}

// ---------------------------------------------------------------------------
// Audio cues
// ---------------------------------------------------------------------------

/// Identifier of a sound the audio collaborator can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// An agent became [`Kind::Small`].
    TransformSmall,
    /// An agent became [`Kind::Normal`].
    TransformNormal,
    /// An agent became [`Kind::Large`].
    TransformLarge,
    /// A whole kind group was culled by mass presence.
    MassDestroy,
    /// Looping background track, started with the game and stopped at game over.
    Background,
    /// Played once when the game ends.
    GameOver,
}

impl AudioCue {
    /// The transformation cue for a classified kind.
    ///
    /// Returns `None` for [`Kind::Unclassified`], which has no
    /// transformation sound.
    pub const fn for_transformation(kind: Kind) -> Option<Self> {
        match kind {
            Kind::Small => Some(Self::TransformSmall),
            Kind::Normal => Some(Self::TransformNormal),
            Kind::Large => Some(Self::TransformLarge),
            Kind::Unclassified => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Score events
// ---------------------------------------------------------------------------

/// A discrete event that awards points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoreEvent {
    /// Two unclassified agents fused into one classified survivor.
    Fusion,
    /// A dominance battle transformed the losing agent.
    Battle,
    /// A kind group crossed the mass-presence threshold and was culled.
    MassPresence,
    /// Periodic sample of the live population.
    PopulationSample,
}

// ---------------------------------------------------------------------------
// Destroy causes
// ---------------------------------------------------------------------------

/// The only two ways an agent can leave the population pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DestroyCause {
    /// Lost the coin flip when two unclassified agents fused.
    Fusion,
    /// Member of a kind group culled by the mass-presence monitor.
    MassPresence,
}

impl core::fmt::Display for DestroyCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Fusion => write!(f, "fusion"),
            Self::MassPresence => write!(f, "mass_presence"),
        }
    }
}

// ---------------------------------------------------------------------------
// Timer keys
// ---------------------------------------------------------------------------

/// Identity of a pending timer in the simulation clock.
///
/// Each key has at most one pending firing; scheduling a key again replaces
/// the earlier firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimerKey {
    /// The population spawn tick.
    Spawn,
    /// The mass-presence scan.
    MassPresence,
    /// The periodic population score sample.
    ScoreSample,
    /// Expiry of one agent's immunity.
    Immunity(AgentId),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_unclassified_is_not_classified() {
        assert!(!Kind::Unclassified.is_classified());
        for kind in Kind::CLASSIFIED {
            assert!(kind.is_classified());
        }
    }

    #[test]
    fn every_classified_kind_has_a_transformation_cue() {
        for kind in Kind::CLASSIFIED {
            assert!(AudioCue::for_transformation(kind).is_some());
        }
        assert_eq!(AudioCue::for_transformation(Kind::Unclassified), None);
    }

    #[test]
    fn kind_roundtrips_through_json() {
        let json = serde_json::to_string(&Kind::Large).unwrap();
        assert_eq!(json, "\"Large\"");
        let back: Kind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Kind::Large);
    }

    #[test]
    fn periodic_timers_sort_before_immunity() {
        assert!(TimerKey::ScoreSample < TimerKey::Immunity(AgentId::new()));
        assert!(TimerKey::Spawn < TimerKey::MassPresence);
    }

    #[test]
    fn display_names() {
        assert_eq!(Kind::Small.to_string(), "small");
        assert_eq!(DestroyCause::MassPresence.to_string(), "mass_presence");
    }
}
