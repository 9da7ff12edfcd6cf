//! Game-lifecycle collaborator interface.

/// Receiver of game-level signals.
///
/// The arena calls [`signal_game_over`](GameLifecycle::signal_game_over) at
/// most once per game, and
/// [`signal_level_advance`](GameLifecycle::signal_level_advance) every time
/// the spawn interval is shortened.
pub trait GameLifecycle {
    /// The player was reached by a classified agent.
    fn signal_game_over(&mut self);

    /// The game moved up to `level`.
    fn signal_level_advance(&mut self, level: u32);
}

/// Ignores every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLifecycle;

impl GameLifecycle for NoOpLifecycle {
    fn signal_game_over(&mut self) {}

    fn signal_level_advance(&mut self, _level: u32) {}
}

/// Counts game-over signals and records level advances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingLifecycle {
    /// Number of game-over signals received.
    pub game_overs: u32,
    /// Levels announced, in order.
    pub levels: Vec<u32>,
}

impl GameLifecycle for RecordingLifecycle {
    fn signal_game_over(&mut self) {
        self.game_overs = self.game_overs.saturating_add(1);
    }

    fn signal_level_advance(&mut self, level: u32) {
        self.levels.push(level);
    }
}
