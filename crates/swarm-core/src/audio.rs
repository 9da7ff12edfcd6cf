//! Audio collaborator interface.
//!
//! The core never waits on audio and never reads anything back. Cues are
//! fire-and-forget. [`NullAudio`] discards them; [`RecordingAudio`] keeps
//! them in order for assertions.

use swarm_types::AudioCue;

/// Receiver of audio triggers.
pub trait AudioSink {
    /// Play `cue` once.
    fn play_one_shot(&mut self, cue: AudioCue);

    /// Start `cue` looping.
    fn play_loop(&mut self, cue: AudioCue);

    /// Stop a looping `cue`.
    fn stop_loop(&mut self, cue: AudioCue);
}

/// Discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_one_shot(&mut self, _cue: AudioCue) {}

    fn play_loop(&mut self, _cue: AudioCue) {}

    fn stop_loop(&mut self, _cue: AudioCue) {}
}

/// One call received by a [`RecordingAudio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCall {
    /// `play_one_shot`
    OneShot(AudioCue),
    /// `play_loop`
    LoopStarted(AudioCue),
    /// `stop_loop`
    LoopStopped(AudioCue),
}

/// Records every call in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingAudio {
    /// Calls received so far.
    pub calls: Vec<AudioCall>,
}

impl RecordingAudio {
    /// An empty recorder.
    pub const fn new() -> Self {
        Self { calls: Vec::new() }
    }

    /// How many times `cue` was played as a one-shot.
    pub fn one_shots(&self, cue: AudioCue) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == AudioCall::OneShot(cue))
            .count()
    }
}

impl AudioSink for RecordingAudio {
    fn play_one_shot(&mut self, cue: AudioCue) {
        self.calls.push(AudioCall::OneShot(cue));
    }

    fn play_loop(&mut self, cue: AudioCue) {
        self.calls.push(AudioCall::LoopStarted(cue));
    }

    fn stop_loop(&mut self, cue: AudioCue) {
        self.calls.push(AudioCall::LoopStopped(cue));
    }
}
