//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the frame loop.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: swarm_core::config::ConfigError,
    },

    /// The simulated clock rejected a step.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: swarm_core::clock::ClockError,
    },

    /// The `run` section of the config file is malformed.
    #[error("run config error: {message}")]
    RunConfig {
        /// Description of the failure.
        message: String,
    },

    /// The end-of-run report could not be produced.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// Writing the report file failed.
    #[error("failed to write report: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
