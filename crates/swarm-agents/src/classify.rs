//! Kind derivation.
//!
//! The kind is a pure, total function of `(speed, scale, is_unclassified)`:
//!
//! 1. unclassified flag set => [`Kind::Unclassified`]
//! 2. `speed >= small_speed_threshold` => [`Kind::Small`]
//! 3. `scale >= large_scale_threshold` => [`Kind::Large`]
//! 4. otherwise => [`Kind::Normal`]
//!
//! The speed check precedes the scale check, so an agent that is both fast
//! and big is Small.

use swarm_types::Kind;

use crate::agent::Agent;
use crate::config::ClassifierConfig;

/// Derive the kind of `agent` from its current attributes.
pub fn classify(agent: &Agent, config: &ClassifierConfig) -> Kind {
    classify_attributes(agent.speed(), agent.scale(), agent.is_unclassified(), config)
}

/// Derive a kind from raw attributes.
pub fn classify_attributes(
    speed: f32,
    scale: f32,
    is_unclassified: bool,
    config: &ClassifierConfig,
) -> Kind {
    if is_unclassified {
        Kind::Unclassified
    } else if speed >= config.small_speed_threshold {
        Kind::Small
    } else if scale >= config.large_scale_threshold {
        Kind::Large
    } else {
        Kind::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ClassifierConfig {
        ClassifierConfig::default()
    }

    #[test]
    fn unclassified_flag_overrides_attributes() {
        assert_eq!(classify_attributes(9.0, 9.0, true, &cfg()), Kind::Unclassified);
        assert_eq!(classify_attributes(0.0, 0.1, true, &cfg()), Kind::Unclassified);
    }

    #[test]
    fn speed_takes_precedence_over_scale() {
        assert_eq!(classify_attributes(5.0, 2.0, false, &cfg()), Kind::Small);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(classify_attributes(4.5, 1.0, false, &cfg()), Kind::Small);
        assert_eq!(classify_attributes(3.0, 1.4, false, &cfg()), Kind::Large);
    }

    #[test]
    fn below_both_thresholds_is_normal() {
        assert_eq!(classify_attributes(4.49, 1.39, false, &cfg()), Kind::Normal);
    }

    #[test]
    fn classification_is_idempotent() {
        for &(speed, scale) in &[(1.0, 1.0), (4.5, 0.5), (2.0, 3.0), (6.0, 6.0)] {
            let first = classify_attributes(speed, scale, false, &cfg());
            let second = classify_attributes(speed, scale, false, &cfg());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn nan_attributes_classify_as_normal() {
        assert_eq!(classify_attributes(f32::NAN, f32::NAN, false, &cfg()), Kind::Normal);
    }
}
