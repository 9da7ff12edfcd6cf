//! Simulation clock, population services, and the arena for the Swarm
//! simulation.
//!
//! Everything here is single-threaded and driven by one simulated clock.
//! The [`Arena`] owns all services of a game and is the only entry point
//! the engine binary talks to.
//!
//! # Modules
//!
//! - [`arena`] -- [`Arena`]: contact handling, timer dispatch, game-over latch
//! - [`audio`] -- [`AudioSink`] collaborator trait with null and recording sinks
//! - [`audit`] -- Population bookkeeping and destruction-path checks
//! - [`clock`] -- [`TimerWheel`], the keyed timer wheel over simulated milliseconds
//! - [`config`] -- Configuration loading from `swarm-config.yaml`
//! - [`lifecycle`] -- [`GameLifecycle`] collaborator trait
//! - [`monitor`] -- [`MassPresenceMonitor`] group-size scan and cull
//! - [`population`] -- [`PopulationController`]: pool, cap, spawn cadence
//! - [`score`] -- [`ScoreLedger`]
//!
//! [`Arena`]: arena::Arena
//! [`AudioSink`]: audio::AudioSink
//! [`TimerWheel`]: clock::TimerWheel
//! [`GameLifecycle`]: lifecycle::GameLifecycle
//! [`MassPresenceMonitor`]: monitor::MassPresenceMonitor
//! [`PopulationController`]: population::PopulationController
//! [`ScoreLedger`]: score::ScoreLedger

pub mod arena;
pub mod audio;
pub mod audit;
pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod monitor;
pub mod population;
pub mod score;
