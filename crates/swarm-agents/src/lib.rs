//! Agent state, classification, and the fusion rule hierarchy for the Swarm
//! simulation.
//!
//! This crate contains the logic layer for agents -- everything that
//! operates on agent state without touching timers, the population pool, or
//! any collaborator. Rules report what should happen as [`Effect`] values
//! and the caller (the arena in `swarm-core`) carries them out.
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] record and its one-way mutations
//! - [`classify`] -- Pure derivation of a [`Kind`] from speed, scale, and the unclassified flag
//! - [`config`] -- Thresholds, per-kind profiles, and immunity durations
//! - [`dominance`] -- The cyclic-dominance table used by battles
//! - [`error`] -- Error types for rule configuration ([`AgentError`])
//! - [`fusion`] -- The contact rule hierarchy and `apply_transformation`
//!
//! [`Kind`]: swarm_types::Kind

pub mod agent;
pub mod classify;
pub mod config;
pub mod dominance;
pub mod error;
pub mod fusion;

// Re-export primary types at crate root for convenience.
pub use agent::Agent;
pub use classify::{classify, classify_attributes};
pub use config::{ClassifierConfig, ImmunityConfig, KindProfile, ProfileConfig};
pub use dominance::{DEFAULT_DOMINANCE_CYCLE, DominanceTable};
pub use error::AgentError;
pub use fusion::{
    DeflectReason, Effect, FusionOutcome, FusionResolver, FusionRules, PlayerContact, Resolution,
    SkipReason,
};
