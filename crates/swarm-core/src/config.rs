//! Configuration loading and typed config structures for the Swarm simulation.
//!
//! The canonical configuration lives in `swarm-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, a loader, and a validator that reports problems the arena
//! can run through in degraded mode.
//!
//! Every field has a default, so an empty document is a complete, playable
//! configuration.

use std::path::Path;

use serde::Deserialize;
use swarm_agents::{
    AgentError, ClassifierConfig, DEFAULT_DOMINANCE_CYCLE, DominanceTable, FusionRules,
    ImmunityConfig, ProfileConfig,
};
use swarm_types::{Kind, Position};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration cannot drive a simulation at all.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// A configuration problem the simulation survives by skipping work.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigWarning {
    /// A rule-level inconsistency (profile or dominance table).
    #[error(transparent)]
    Rules(#[from] AgentError),

    /// Spawn ticks have nowhere to place agents.
    #[error("no spawn points configured; periodic spawning is disabled")]
    NoSpawnPoints,

    /// The spawn interval starts below its own floor.
    #[error("spawn interval {interval_ms}ms is below the minimum {min_ms}ms")]
    IntervalBelowMinimum {
        /// Configured starting interval.
        interval_ms: u64,
        /// Configured floor.
        min_ms: u64,
    },

    /// A mass-presence threshold of zero would cull every group every scan.
    #[error("mass presence threshold is zero")]
    ZeroThreshold,
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `swarm-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World settings (seed, frame length, arena geometry).
    #[serde(default)]
    pub world: WorldConfig,

    /// Kind derivation thresholds.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Per-kind canonical attributes and the speed ceiling.
    #[serde(default)]
    pub profiles: ProfileConfig,

    /// The battle relation.
    #[serde(default)]
    pub dominance: DominanceConfig,

    /// Spawn cap, batch size, and cadence.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Mass-presence scan parameters.
    #[serde(default)]
    pub mass_presence: MassPresenceConfig,

    /// Immunity cooldowns.
    #[serde(default)]
    pub immunity: ImmunityConfig,

    /// Score weights.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Reject configurations that cannot run at all.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero timer period or a zero
    /// population cap.
    pub fn ensure_runnable(&self) -> Result<(), ConfigError> {
        let periods = [
            ("population.spawn_interval_ms", self.population.spawn_interval_ms),
            ("population.min_spawn_interval_ms", self.population.min_spawn_interval_ms),
            ("mass_presence.check_interval_ms", self.mass_presence.check_interval_ms),
            ("scoring.sample_interval_ms", self.scoring.sample_interval_ms),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be at least 1"),
                });
            }
        }
        if self.population.cap == 0 {
            return Err(ConfigError::Invalid {
                reason: "population.cap must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// Every problem the simulation can run through in degraded mode.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings: Vec<ConfigWarning> = self
            .profiles
            .mismatches(&self.classifier)
            .into_iter()
            .map(ConfigWarning::from)
            .collect();

        match self.dominance.table() {
            Ok(table) => warnings.extend(table.unresolved_pairs().into_iter().map(ConfigWarning::from)),
            Err(e) => warnings.push(ConfigWarning::from(e)),
        }

        if self.population.spawn_points.is_empty() {
            warnings.push(ConfigWarning::NoSpawnPoints);
        }
        if self.population.spawn_interval_ms < self.population.min_spawn_interval_ms {
            warnings.push(ConfigWarning::IntervalBelowMinimum {
                interval_ms: self.population.spawn_interval_ms,
                min_ms: self.population.min_spawn_interval_ms,
            });
        }
        if self.mass_presence.threshold == 0 {
            warnings.push(ConfigWarning::ZeroThreshold);
        }
        warnings
    }

    /// The rule set the fusion resolver runs with.
    ///
    /// A dominance cycle that names [`Kind::Unclassified`] yields an empty
    /// table, so every battle takes the unresolved branch.
    pub fn fusion_rules(&self) -> FusionRules {
        let dominance = self
            .dominance
            .table()
            .unwrap_or_else(|_| DominanceTable::empty());
        FusionRules {
            classifier: self.classifier,
            profiles: self.profiles,
            dominance,
            immunity: self.immunity,
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated milliseconds per frame of the headless engine.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,

    /// Half the side length of the square arena.
    #[serde(default = "default_arena_half_extent")]
    pub arena_half_extent: f32,

    /// Contact radius of an agent at scale 1.0.
    #[serde(default = "default_contact_radius")]
    pub contact_radius: f32,

    /// Contact radius of the player.
    #[serde(default = "default_player_radius")]
    pub player_radius: f32,

    /// Radius of the scripted player's orbit around the arena centre.
    #[serde(default = "default_player_orbit_radius")]
    pub player_orbit_radius: f32,

    /// Angular speed of the scripted player, in radians per second.
    #[serde(default = "default_player_angular_speed")]
    pub player_angular_speed: f32,

    /// Simulated time after which the headless run stops on its own.
    #[serde(default = "default_max_run_ms")]
    pub max_run_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            frame_ms: default_frame_ms(),
            arena_half_extent: default_arena_half_extent(),
            contact_radius: default_contact_radius(),
            player_radius: default_player_radius(),
            player_orbit_radius: default_player_orbit_radius(),
            player_angular_speed: default_player_angular_speed(),
            max_run_ms: default_max_run_ms(),
        }
    }
}

/// The dominance cycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DominanceConfig {
    /// Each kind beats the next; the last beats the first
    /// (default: `[Small, Large, Normal]`).
    #[serde(default = "default_cycle")]
    pub cycle: Vec<Kind>,
}

impl Default for DominanceConfig {
    fn default() -> Self {
        Self {
            cycle: default_cycle(),
        }
    }
}

impl DominanceConfig {
    /// Build the table for this cycle.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnclassifiedInDominance`] if the cycle names
    /// [`Kind::Unclassified`].
    pub fn table(&self) -> Result<DominanceTable, AgentError> {
        DominanceTable::from_cycle(&self.cycle)
    }
}

/// Population parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationConfig {
    /// Maximum number of simultaneously active agents.
    #[serde(default = "default_cap")]
    pub cap: u32,

    /// Agents spawned per spawn tick.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Starting spawn period.
    #[serde(default = "default_spawn_interval_ms")]
    pub spawn_interval_ms: u64,

    /// Floor for the spawn period.
    #[serde(default = "default_min_spawn_interval_ms")]
    pub min_spawn_interval_ms: u64,

    /// Candidate spawn points; each spawned agent picks one at random.
    #[serde(default = "default_spawn_points")]
    pub spawn_points: Vec<Position>,

    /// Bulk spawns offset each agent by up to this much on each axis.
    #[serde(default = "default_jitter_radius")]
    pub jitter_radius: f32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            cap: default_cap(),
            batch_size: default_batch_size(),
            spawn_interval_ms: default_spawn_interval_ms(),
            min_spawn_interval_ms: default_min_spawn_interval_ms(),
            spawn_points: default_spawn_points(),
            jitter_radius: default_jitter_radius(),
        }
    }
}

/// Mass-presence scan parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MassPresenceConfig {
    /// Group size at which a kind is culled.
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    /// Period of the scan.
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// How much each cull shortens the spawn period.
    #[serde(default = "default_interval_decrease_ms")]
    pub interval_decrease_ms: u64,
}

impl Default for MassPresenceConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            check_interval_ms: default_check_interval_ms(),
            interval_decrease_ms: default_interval_decrease_ms(),
        }
    }
}

/// Score weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScoringConfig {
    /// Points for a fusion.
    #[serde(default = "default_fusion_points")]
    pub fusion: u64,

    /// Points for a dominance battle.
    #[serde(default = "default_battle_points")]
    pub battle: u64,

    /// Bonus for a mass-presence cull.
    #[serde(default = "default_mass_presence_points")]
    pub mass_presence: u64,

    /// Points per live unclassified agent per sample.
    #[serde(default = "default_per_unclassified")]
    pub per_unclassified: u64,

    /// Points per live classified agent per sample.
    #[serde(default = "default_per_classified")]
    pub per_classified: u64,

    /// Period of the population sample.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fusion: default_fusion_points(),
            battle: default_battle_points(),
            mass_presence: default_mass_presence_points(),
            per_unclassified: default_per_unclassified(),
            per_classified: default_per_classified(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_frame_ms() -> u64 {
    20
}

const fn default_arena_half_extent() -> f32 {
    12.0
}

const fn default_contact_radius() -> f32 {
    0.5
}

const fn default_player_radius() -> f32 {
    0.5
}

const fn default_player_orbit_radius() -> f32 {
    6.0
}

const fn default_player_angular_speed() -> f32 {
    0.8
}

const fn default_max_run_ms() -> u64 {
    120_000
}

fn default_cycle() -> Vec<Kind> {
    DEFAULT_DOMINANCE_CYCLE.to_vec()
}

const fn default_cap() -> u32 {
    50
}

const fn default_batch_size() -> u32 {
    1
}

const fn default_spawn_interval_ms() -> u64 {
    3000
}

const fn default_min_spawn_interval_ms() -> u64 {
    1000
}

fn default_spawn_points() -> Vec<Position> {
    vec![
        Position::new(-10.0, -10.0),
        Position::new(10.0, -10.0),
        Position::new(-10.0, 10.0),
        Position::new(10.0, 10.0),
    ]
}

const fn default_jitter_radius() -> f32 {
    1.0
}

const fn default_threshold() -> u32 {
    5
}

const fn default_check_interval_ms() -> u64 {
    2000
}

const fn default_interval_decrease_ms() -> u64 {
    250
}

const fn default_fusion_points() -> u64 {
    10
}

const fn default_battle_points() -> u64 {
    25
}

const fn default_mass_presence_points() -> u64 {
    100
}

const fn default_per_unclassified() -> u64 {
    1
}

const fn default_per_classified() -> u64 {
    2
}

const fn default_sample_interval_ms() -> u64 {
    1000
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.population.cap, 50);
        assert_eq!(config.population.spawn_interval_ms, 3000);
        assert_eq!(config.immunity.medium_ms, 800);
        assert!(config.validate().is_empty());
        assert!(config.ensure_runnable().is_ok());
        assert!(config.fusion_rules().dominance.is_total());
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(SimulationConfig::parse("").unwrap(), SimulationConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  seed: 7
  frame_ms: 16
classifier:
  small_speed_threshold: 5.0
  large_scale_threshold: 1.3
profiles:
  small: { speed: 6.0, scale: 0.7 }
  max_speed: 8.0
dominance:
  cycle: [Small, Normal, Large]
population:
  cap: 10
  batch_size: 2
  spawn_interval_ms: 500
  min_spawn_interval_ms: 100
  spawn_points:
    - { x: 0.0, y: 5.0 }
  jitter_radius: 0.5
mass_presence:
  threshold: 3
  check_interval_ms: 250
  interval_decrease_ms: 50
immunity:
  short_ms: 100
scoring:
  battle: 40
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.frame_ms, 16);
        assert_eq!(config.population.cap, 10);
        assert_eq!(config.population.batch_size, 2);
        assert_eq!(config.population.spawn_points, vec![Position::new(0.0, 5.0)]);
        assert_eq!(config.mass_presence.threshold, 3);
        assert_eq!(config.immunity.short_ms, 100);
        assert_eq!(config.immunity.medium_ms, 800);
        assert_eq!(config.scoring.battle, 40);
        assert_eq!(config.scoring.fusion, 10);
        assert_eq!(config.dominance.cycle, vec![Kind::Small, Kind::Normal, Kind::Large]);
        assert!((config.profiles.max_speed - 8.0).abs() < f32::EPSILON);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = SimulationConfig::parse("population: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimulationConfig::from_file(Path::new("/nonexistent/swarm-config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn zero_periods_are_rejected() {
        let mut config = SimulationConfig::default();
        config.mass_presence.check_interval_ms = 0;
        assert!(matches!(config.ensure_runnable(), Err(ConfigError::Invalid { .. })));

        let mut config = SimulationConfig::default();
        config.population.cap = 0;
        assert!(config.ensure_runnable().is_err());
    }

    #[test]
    fn degraded_configurations_are_reported() {
        let yaml = r"
profiles:
  large: { speed: 2.5, scale: 1.2 }
dominance:
  cycle: [Small, Large]
population:
  spawn_points: []
";
        let config = SimulationConfig::parse(yaml).unwrap();
        let warnings = config.validate();
        assert!(warnings.contains(&ConfigWarning::NoSpawnPoints));
        assert!(warnings.contains(&ConfigWarning::Rules(AgentError::ProfileMismatch {
            kind: Kind::Large,
            classified_as: Kind::Normal,
        })));
        assert!(warnings.iter().any(|w| matches!(
            w,
            ConfigWarning::Rules(AgentError::UnresolvedDominance { .. })
        )));
        assert!(config.ensure_runnable().is_ok());
    }

    #[test]
    fn unclassified_in_cycle_degrades_to_empty_table() {
        let config = SimulationConfig::parse("dominance:\n  cycle: [Small, Unclassified, Large]\n").unwrap();
        assert!(config.validate().contains(&ConfigWarning::Rules(
            AgentError::UnclassifiedInDominance { kind: Kind::Unclassified }
        )));
        assert_eq!(config.fusion_rules().dominance.unresolved_pairs().len(), 3);
    }
}
