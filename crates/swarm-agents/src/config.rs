//! Configuration constants and defaults for agent rules.
//!
//! These structs are embedded in the `classifier`, `profiles`, and
//! `immunity` sections of `swarm-config.yaml`. Every field has a default so
//! partial YAML (or no YAML at all) still yields a playable rule set.

use serde::{Deserialize, Serialize};
use swarm_types::Kind;

use crate::classify::classify_attributes;
use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Classifier thresholds
// ---------------------------------------------------------------------------

/// Thresholds that turn (speed, scale) into a [`Kind`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Speed at or above which a classified agent is [`Kind::Small`] (default: 4.5).
    #[serde(default = "default_small_speed_threshold")]
    pub small_speed_threshold: f32,

    /// Scale at or above which a classified agent is [`Kind::Large`] (default: 1.4).
    #[serde(default = "default_large_scale_threshold")]
    pub large_scale_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            small_speed_threshold: default_small_speed_threshold(),
            large_scale_threshold: default_large_scale_threshold(),
        }
    }
}

const fn default_small_speed_threshold() -> f32 {
    4.5
}

const fn default_large_scale_threshold() -> f32 {
    1.4
}

// ---------------------------------------------------------------------------
// Kind profiles
// ---------------------------------------------------------------------------

/// A canonical (speed, scale) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindProfile {
    /// Chase speed in arena units per second.
    pub speed: f32,
    /// Uniform scale factor (1.0 = baseline size).
    pub scale: f32,
}

impl KindProfile {
    /// Construct a profile.
    pub const fn new(speed: f32, scale: f32) -> Self {
        Self { speed, scale }
    }
}

/// Per-kind canonical attributes plus the spawn baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Attributes of a freshly spawned agent (default: speed 3.0, scale 1.0).
    #[serde(default = "default_baseline")]
    pub baseline: KindProfile,

    /// Canonical [`Kind::Small`] attributes (default: speed 5.0, scale 0.75).
    #[serde(default = "default_small")]
    pub small: KindProfile,

    /// Canonical [`Kind::Normal`] attributes (default: speed 3.0, scale 1.0).
    #[serde(default = "default_normal")]
    pub normal: KindProfile,

    /// Canonical [`Kind::Large`] attributes (default: speed 2.5, scale 1.5).
    #[serde(default = "default_large")]
    pub large: KindProfile,

    /// Global speed ceiling applied to every speed assignment (default: 7.0).
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            baseline: default_baseline(),
            small: default_small(),
            normal: default_normal(),
            large: default_large(),
            max_speed: default_max_speed(),
        }
    }
}

const fn default_baseline() -> KindProfile {
    KindProfile::new(3.0, 1.0)
}

const fn default_small() -> KindProfile {
    KindProfile::new(5.0, 0.75)
}

const fn default_normal() -> KindProfile {
    KindProfile::new(3.0, 1.0)
}

const fn default_large() -> KindProfile {
    KindProfile::new(2.5, 1.5)
}

const fn default_max_speed() -> f32 {
    7.0
}

impl ProfileConfig {
    /// The canonical profile for a classified kind.
    ///
    /// Returns `None` for [`Kind::Unclassified`]: nothing transforms into it.
    pub const fn profile_for(&self, kind: Kind) -> Option<KindProfile> {
        match kind {
            Kind::Small => Some(self.small),
            Kind::Normal => Some(self.normal),
            Kind::Large => Some(self.large),
            Kind::Unclassified => None,
        }
    }

    /// Check that every canonical profile derives back to its own kind.
    ///
    /// The speed ceiling is applied before classifying, exactly as
    /// `apply_transformation` does. Returns one
    /// [`AgentError::ProfileMismatch`] per inconsistent kind.
    pub fn mismatches(&self, classifier: &ClassifierConfig) -> Vec<AgentError> {
        Kind::CLASSIFIED
            .iter()
            .filter_map(|&kind| {
                let profile = self.profile_for(kind)?;
                let speed = profile.speed.clamp(0.0, self.max_speed.max(0.0));
                let classified_as = classify_attributes(speed, profile.scale, false, classifier);
                (classified_as != kind).then_some(AgentError::ProfileMismatch {
                    kind,
                    classified_as,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Immunity durations
// ---------------------------------------------------------------------------

/// Durations (simulated milliseconds) of the re-resolution guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImmunityConfig {
    /// Immunity granted to newly spawned agents (default: 500).
    #[serde(default = "default_spawn_ms")]
    pub spawn_ms: u64,

    /// Cooldown after a contact that changed nothing (default: 200).
    #[serde(default = "default_short_ms")]
    pub short_ms: u64,

    /// Cooldown after a transformation (default: 800).
    #[serde(default = "default_medium_ms")]
    pub medium_ms: u64,
}

impl Default for ImmunityConfig {
    fn default() -> Self {
        Self {
            spawn_ms: default_spawn_ms(),
            short_ms: default_short_ms(),
            medium_ms: default_medium_ms(),
        }
    }
}

const fn default_spawn_ms() -> u64 {
    500
}

const fn default_short_ms() -> u64 {
    200
}

const fn default_medium_ms() -> u64 {
    800
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_profiles_are_self_consistent() {
        let profiles = ProfileConfig::default();
        assert!(profiles.mismatches(&ClassifierConfig::default()).is_empty());
    }

    #[test]
    fn small_profile_below_threshold_is_reported() {
        let profiles = ProfileConfig {
            small: KindProfile::new(4.0, 0.75),
            ..ProfileConfig::default()
        };
        let errors = profiles.mismatches(&ClassifierConfig::default());
        assert_eq!(
            errors,
            vec![AgentError::ProfileMismatch {
                kind: Kind::Small,
                classified_as: Kind::Normal,
            }]
        );
    }

    #[test]
    fn speed_ceiling_can_break_small_profile() {
        let profiles = ProfileConfig {
            max_speed: 4.0,
            ..ProfileConfig::default()
        };
        let errors = profiles.mismatches(&ClassifierConfig::default());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unclassified_has_no_profile() {
        assert!(ProfileConfig::default().profile_for(Kind::Unclassified).is_none());
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let cfg: ClassifierConfig = serde_yml::from_str("small_speed_threshold: 6.0").unwrap();
        assert!((cfg.small_speed_threshold - 6.0).abs() < f32::EPSILON);
        assert!((cfg.large_scale_threshold - 1.4).abs() < f32::EPSILON);

        let immunity: ImmunityConfig = serde_yml::from_str("short_ms: 50").unwrap();
        assert_eq!(immunity.short_ms, 50);
        assert_eq!(immunity.medium_ms, 800);
    }
}
