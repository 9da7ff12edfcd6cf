//! Error types for the swarm-agents crate.
//!
//! None of these stop the simulation. They describe rule configuration that
//! cannot be honoured, or agents that are no longer live; callers log them
//! and skip the affected operation.

use swarm_types::{AgentId, Kind};

/// Errors that can occur while building or applying agent rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// A kind's canonical profile does not classify back to that kind.
    #[error("profile for {kind} classifies as {classified_as}")]
    ProfileMismatch {
        /// The kind whose profile was checked.
        kind: Kind,
        /// The kind the profile actually derives to.
        classified_as: Kind,
    },

    /// There is no canonical profile for the requested kind.
    #[error("no transformation profile for {kind}")]
    NoProfile {
        /// The kind that was requested.
        kind: Kind,
    },

    /// The dominance configuration names the unclassified kind.
    #[error("dominance table may only relate classified kinds, got {kind}")]
    UnclassifiedInDominance {
        /// The offending entry.
        kind: Kind,
    },

    /// The dominance table has no single winner for a pair of kinds.
    #[error("dominance table does not resolve {first} vs {second}")]
    UnresolvedDominance {
        /// First kind of the pair.
        first: Kind,
        /// Second kind of the pair.
        second: Kind,
    },

    /// No live agent has this id.
    #[error("agent {agent_id} is not in the population")]
    UnknownAgent {
        /// The id that was looked up.
        agent_id: AgentId,
    },
}
