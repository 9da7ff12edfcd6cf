//! Cyclic dominance between classified kinds.
//!
//! A [`DominanceTable`] is a set of directed "winner beats loser" edges.
//! It is total when every unordered pair of distinct classified kinds has
//! exactly one edge. Tables built from a three-element cycle over all
//! classified kinds are always total; other configurations may leave pairs
//! unresolved (no edge) or contradictory (both edges), and battles between
//! such pairs fall through to the defensive branch of the fusion rules.

use std::collections::BTreeSet;

use swarm_types::Kind;

use crate::error::AgentError;

/// The configured cycle: Small beats Large, Large beats Normal, Normal
/// beats Small.
pub const DEFAULT_DOMINANCE_CYCLE: [Kind; 3] = [Kind::Small, Kind::Large, Kind::Normal];

/// Directed dominance relation over classified kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominanceTable {
    /// `(winner, loser)` edges.
    wins: BTreeSet<(Kind, Kind)>,
}

impl DominanceTable {
    /// A table with no edges; every battle is unresolved.
    pub const fn empty() -> Self {
        Self {
            wins: BTreeSet::new(),
        }
    }

    /// Build a table from a cycle where each entry beats the next and the
    /// last entry beats the first.
    ///
    /// Repeated adjacent entries add no edge.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnclassifiedInDominance`] if the cycle names
    /// [`Kind::Unclassified`].
    pub fn from_cycle(cycle: &[Kind]) -> Result<Self, AgentError> {
        let successors = cycle.iter().cycle().skip(1);
        let edges = cycle
            .iter()
            .zip(successors)
            .map(|(&winner, &loser)| (winner, loser));
        Self::from_edges(edges)
    }

    /// Build a table from explicit `(winner, loser)` edges.
    ///
    /// Self-edges are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnclassifiedInDominance`] if any edge names
    /// [`Kind::Unclassified`].
    pub fn from_edges(edges: impl IntoIterator<Item = (Kind, Kind)>) -> Result<Self, AgentError> {
        let mut wins = BTreeSet::new();
        for (winner, loser) in edges {
            for kind in [winner, loser] {
                if !kind.is_classified() {
                    return Err(AgentError::UnclassifiedInDominance { kind });
                }
            }
            if winner != loser {
                wins.insert((winner, loser));
            }
        }
        Ok(Self { wins })
    }

    /// `true` if the table has an edge `winner -> loser`.
    pub fn beats(&self, winner: Kind, loser: Kind) -> bool {
        self.wins.contains(&(winner, loser))
    }

    /// The winning kind of a battle between `first` and `second`.
    ///
    /// Returns `None` unless exactly one direction is an edge.
    pub fn winner(&self, first: Kind, second: Kind) -> Option<Kind> {
        match (self.beats(first, second), self.beats(second, first)) {
            (true, false) => Some(first),
            (false, true) => Some(second),
            _ => None,
        }
    }

    /// Every unordered pair of distinct classified kinds without a single
    /// winner, as [`AgentError::UnresolvedDominance`] values.
    pub fn unresolved_pairs(&self) -> Vec<AgentError> {
        let mut unresolved = Vec::new();
        for (i, &first) in Kind::CLASSIFIED.iter().enumerate() {
            for &second in Kind::CLASSIFIED.iter().skip(i.saturating_add(1)) {
                if self.winner(first, second).is_none() {
                    unresolved.push(AgentError::UnresolvedDominance { first, second });
                }
            }
        }
        unresolved
    }

    /// `true` if every pair of distinct classified kinds resolves.
    pub fn is_total(&self) -> bool {
        self.unresolved_pairs().is_empty()
    }
}

impl Default for DominanceTable {
    fn default() -> Self {
        let wins = DEFAULT_DOMINANCE_CYCLE
            .iter()
            .zip(DEFAULT_DOMINANCE_CYCLE.iter().cycle().skip(1))
            .map(|(&winner, &loser)| (winner, loser))
            .collect();
        Self { wins }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_cycle_is_total() {
        let table = DominanceTable::default();
        assert!(table.is_total());
        assert_eq!(table, DominanceTable::from_cycle(&DEFAULT_DOMINANCE_CYCLE).unwrap());
    }

    #[test]
    fn default_cycle_directions() {
        let table = DominanceTable::default();
        assert_eq!(table.winner(Kind::Small, Kind::Large), Some(Kind::Small));
        assert_eq!(table.winner(Kind::Large, Kind::Normal), Some(Kind::Large));
        assert_eq!(table.winner(Kind::Normal, Kind::Small), Some(Kind::Normal));
    }

    #[test]
    fn every_distinct_pair_has_exactly_one_winner() {
        let table = DominanceTable::default();
        for a in Kind::CLASSIFIED {
            for b in Kind::CLASSIFIED {
                if a == b {
                    assert_eq!(table.winner(a, b), None);
                    continue;
                }
                assert_ne!(table.beats(a, b), table.beats(b, a));
                assert_eq!(table.winner(a, b), table.winner(b, a));
            }
        }
    }

    #[test]
    fn alternative_cycle_is_also_total() {
        let table = DominanceTable::from_cycle(&[Kind::Small, Kind::Normal, Kind::Large]).unwrap();
        assert!(table.is_total());
        assert_eq!(table.winner(Kind::Small, Kind::Normal), Some(Kind::Small));
    }

    #[test]
    fn two_element_cycle_is_contradictory() {
        let table = DominanceTable::from_cycle(&[Kind::Small, Kind::Large]).unwrap();
        assert_eq!(table.winner(Kind::Small, Kind::Large), None);
        assert_eq!(table.unresolved_pairs().len(), 3);
    }

    #[test]
    fn missing_edge_is_unresolved() {
        let table = DominanceTable::from_edges([
            (Kind::Small, Kind::Large),
            (Kind::Large, Kind::Normal),
        ])
        .unwrap();
        assert_eq!(
            table.unresolved_pairs(),
            vec![AgentError::UnresolvedDominance {
                first: Kind::Small,
                second: Kind::Normal,
            }]
        );
    }

    #[test]
    fn unclassified_is_rejected() {
        let err = DominanceTable::from_cycle(&[Kind::Small, Kind::Unclassified]).unwrap_err();
        assert_eq!(err, AgentError::UnclassifiedInDominance { kind: Kind::Unclassified });
    }

    #[test]
    fn empty_cycle_resolves_nothing() {
        let table = DominanceTable::from_cycle(&[]).unwrap();
        assert_eq!(table.unresolved_pairs().len(), 3);
    }
}
