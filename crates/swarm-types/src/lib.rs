//! Shared type definitions for the Swarm fusion simulation.
//!
//! This crate is the single source of truth for the vocabulary shared by
//! the agent rules, the population services, and the engine binary.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for agent identity
//! - [`enums`] -- Derived agent kinds, audio cues, score events, destroy causes, timer keys
//! - [`geometry`] -- 2D positions used for spawn placement and chase steering

pub mod enums;
pub mod geometry;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{AudioCue, DestroyCause, Kind, ScoreEvent, TimerKey};
pub use geometry::Position;
pub use ids::AgentId;
