//! Minimal 2D geometry.
//!
//! The core never integrates motion; positions exist so bulk spawns can
//! jitter around a point and so agents can steer toward the player.

use serde::{Deserialize, Serialize};

/// A point (or vector) in the 2D arena.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Position {
    /// The arena origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Construct a position from coordinates.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Return this position shifted by `(dx, dy)`.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Unit vector pointing from `self` toward `target`.
    ///
    /// Returns the zero vector when the two points coincide.
    pub fn direction_to(self, target: Self) -> Self {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let len = dx.hypot(dy);
        if len <= f32::EPSILON {
            return Self::ORIGIN;
        }
        Self::new(dx / len, dy / len)
    }

    /// Multiply both components by `factor`.
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Length of this position treated as a vector.
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }
}
