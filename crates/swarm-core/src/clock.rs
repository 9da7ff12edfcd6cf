//! Simulated clock and timer wheel.
//!
//! All periodic work in the simulation (spawn ticks, mass-presence scans,
//! score samples) and every immunity expiry is a keyed timer on a single
//! [`TimerWheel`]. Time only moves when the owner calls
//! [`TimerWheel::pop_due`] or [`TimerWheel::advance_to`], so a run is fully
//! deterministic for a given sequence of calls.
//!
//! # Design Principles
//!
//! - One pending firing per [`TimerKey`]. Scheduling a key that is already
//!   pending cancels the earlier firing first.
//! - Firings that share a deadline pop in the order they were scheduled.
//! - All deadline arithmetic is checked; overflow is an error, never a wrap.

use std::collections::BTreeMap;

use swarm_types::TimerKey;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// A deadline would exceed `u64::MAX` milliseconds.
    #[error("timer deadline overflow: {now_ms} + {delay_ms} exceeds u64::MAX")]
    Overflow {
        /// Current simulated time.
        now_ms: u64,
        /// Requested delay.
        delay_ms: u64,
    },

    /// The caller asked the clock to move backwards.
    #[error("cannot move clock from {now_ms}ms back to {target_ms}ms")]
    TimeReversal {
        /// Current simulated time.
        now_ms: u64,
        /// Requested time.
        target_ms: u64,
    },

    /// A periodic timer was configured with a zero period.
    #[error("timer period for {key:?} must be at least 1ms")]
    ZeroPeriod {
        /// The offending timer.
        key: TimerKey,
    },
}

/// Ordering slot of a pending firing: deadline first, then schedule order.
type Slot = (u64, u64);

/// Single-threaded keyed timer wheel over simulated milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerWheel {
    now_ms: u64,
    queue: BTreeMap<Slot, TimerKey>,
    pending: BTreeMap<TimerKey, Slot>,
    next_seq: u64,
}

impl TimerWheel {
    /// Create an empty wheel at simulated time 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time.
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of pending firings.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// `true` if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Deadline of the pending firing for `key`, if any.
    pub fn deadline(&self, key: TimerKey) -> Option<u64> {
        self.pending.get(&key).map(|&(at, _)| at)
    }

    /// Schedule `key` to fire at absolute time `at_ms`, replacing any
    /// pending firing of the same key.
    ///
    /// A deadline in the past fires on the next [`pop_due`](Self::pop_due).
    pub fn schedule_at(&mut self, key: TimerKey, at_ms: u64) {
        self.cancel(key);
        let slot = (at_ms, self.next_seq);
        self.next_seq = self.next_seq.wrapping_add(1);
        self.queue.insert(slot, key);
        self.pending.insert(key, slot);
    }

    /// Schedule `key` to fire `delay_ms` after the current time, replacing
    /// any pending firing of the same key. Returns the deadline.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if the deadline is not representable.
    pub fn schedule_in(&mut self, key: TimerKey, delay_ms: u64) -> Result<u64, ClockError> {
        let at_ms = self
            .now_ms
            .checked_add(delay_ms)
            .ok_or(ClockError::Overflow {
                now_ms: self.now_ms,
                delay_ms,
            })?;
        self.schedule_at(key, at_ms);
        Ok(at_ms)
    }

    /// Cancel the pending firing of `key`. Returns `true` if one existed.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        match self.pending.remove(&key) {
            Some(slot) => {
                self.queue.remove(&slot);
                true
            }
            None => false,
        }
    }

    /// Remove every pending firing. The current time is kept.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.pending.clear();
    }

    /// Pop the earliest firing due at or before `until_ms`.
    ///
    /// The clock moves to the firing's deadline (never backwards), so work
    /// done by the caller for this firing observes the time it was due.
    /// Returns `None` once nothing more is due.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(u64, TimerKey)> {
        let (&slot, _) = self.queue.first_key_value()?;
        if slot.0 > until_ms {
            return None;
        }
        let key = self.queue.remove(&slot)?;
        self.pending.remove(&key);
        self.now_ms = self.now_ms.max(slot.0);
        Some((self.now_ms, key))
    }

    /// Move the clock to `target_ms` without firing anything.
    ///
    /// Call after draining [`pop_due`](Self::pop_due) for the same target.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TimeReversal`] if `target_ms` is in the past.
    pub const fn advance_to(&mut self, target_ms: u64) -> Result<(), ClockError> {
        if target_ms < self.now_ms {
            return Err(ClockError::TimeReversal {
                now_ms: self.now_ms,
                target_ms,
            });
        }
        self.now_ms = target_ms;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use swarm_types::AgentId;

    use super::*;

    #[test]
    fn fires_in_deadline_order() {
        let mut wheel = TimerWheel::new();
        wheel.schedule_at(TimerKey::MassPresence, 30);
        wheel.schedule_at(TimerKey::Spawn, 10);
        wheel.schedule_at(TimerKey::ScoreSample, 20);

        let fired: Vec<_> = std::iter::from_fn(|| wheel.pop_due(100)).collect();
        assert_eq!(
            fired,
            vec![
                (10, TimerKey::Spawn),
                (20, TimerKey::ScoreSample),
                (30, TimerKey::MassPresence),
            ]
        );
        assert_eq!(wheel.now_ms(), 30);
        assert!(wheel.is_empty());
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let mut wheel = TimerWheel::new();
        let a = TimerKey::Immunity(AgentId::new());
        let b = TimerKey::Immunity(AgentId::new());
        wheel.schedule_at(b, 5);
        wheel.schedule_at(a, 5);
        assert_eq!(wheel.pop_due(5), Some((5, b)));
        assert_eq!(wheel.pop_due(5), Some((5, a)));
    }

    #[test]
    fn rescheduling_replaces_pending_firing() {
        let mut wheel = TimerWheel::new();
        wheel.schedule_at(TimerKey::Spawn, 10);
        wheel.schedule_at(TimerKey::Spawn, 50);
        assert_eq!(wheel.len(), 1);
        assert_eq!(wheel.deadline(TimerKey::Spawn), Some(50));
        assert_eq!(wheel.pop_due(49), None);
        assert_eq!(wheel.pop_due(50), Some((50, TimerKey::Spawn)));
    }

    #[test]
    fn cancel_removes_firing() {
        let mut wheel = TimerWheel::new();
        wheel.schedule_at(TimerKey::Spawn, 10);
        assert!(wheel.cancel(TimerKey::Spawn));
        assert!(!wheel.cancel(TimerKey::Spawn));
        assert_eq!(wheel.pop_due(100), None);
    }

    #[test]
    fn nothing_due_leaves_time_alone() {
        let mut wheel = TimerWheel::new();
        wheel.schedule_at(TimerKey::Spawn, 100);
        assert_eq!(wheel.pop_due(99), None);
        assert_eq!(wheel.now_ms(), 0);
    }

    #[test]
    fn past_deadline_fires_at_current_time() {
        let mut wheel = TimerWheel::new();
        wheel.advance_to(40).unwrap();
        wheel.schedule_at(TimerKey::Spawn, 10);
        assert_eq!(wheel.pop_due(40), Some((40, TimerKey::Spawn)));
    }

    #[test]
    fn schedule_in_is_relative_and_checked() {
        let mut wheel = TimerWheel::new();
        wheel.advance_to(100).unwrap();
        assert_eq!(wheel.schedule_in(TimerKey::Spawn, 25).unwrap(), 125);

        wheel.advance_to(u64::MAX).unwrap();
        let err = wheel.schedule_in(TimerKey::Spawn, 1).unwrap_err();
        assert!(matches!(err, ClockError::Overflow { .. }));
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut wheel = TimerWheel::new();
        wheel.advance_to(10).unwrap();
        let err = wheel.advance_to(5).unwrap_err();
        assert_eq!(err, ClockError::TimeReversal { now_ms: 10, target_ms: 5 });
    }
}
