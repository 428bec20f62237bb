//! # Expected Value Table
//!
//! Empirical expectation of value over replacement (VOR) for every
//! (position, overall pick) cell observed in history. Cells that were never
//! drafted fall back to the mean of the populated cells in a symmetric window
//! around the requested pick; the table never extrapolates past that window.

use crate::aggregator::ResolvedPick;
use crate::replacement::ReplacementLevels;
use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How an expectation was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpectationBasis {
    /// The exact cell had observations
    Exact { samples: usize },
    /// Mean of populated neighbor cells inside the window
    Window { cells: usize },
    /// Nothing inside the window; expectation is zero
    NoData,
}

impl ExpectationBasis {
    /// True when the value did not come from an observed cell
    pub fn is_low_confidence(&self) -> bool {
        !matches!(self, ExpectationBasis::Exact { .. })
    }
}

/// Result of a table lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    pub value: f64,
    pub basis: ExpectationBasis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Cell {
    sum: f64,
    count: usize,
}

impl Cell {
    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// VOR of a pick given its position's replacement level
pub fn vor(resolved: &ResolvedPick, replacement: &ReplacementLevels) -> f64 {
    resolved.points - replacement.level(resolved.position)
}

/// Sparse (position, overall pick) -> mean VOR table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpectedValueTable {
    cells: BTreeMap<Position, BTreeMap<u32, Cell>>,
    window: u32,
}

impl ExpectedValueTable {
    /// Build the table from resolved picks and replacement levels
    pub fn build(picks: &[ResolvedPick], replacement: &ReplacementLevels, window: u32) -> Self {
        let mut cells: BTreeMap<Position, BTreeMap<u32, Cell>> = BTreeMap::new();
        for resolved in picks {
            let cell = cells
                .entry(resolved.position)
                .or_default()
                .entry(resolved.pick.overall_pick)
                .or_default();
            cell.sum += vor(resolved, replacement);
            cell.count += 1;
        }
        Self { cells, window }
    }

    /// Neighbor window half-width
    pub fn window(&self) -> u32 {
        self.window
    }

    /// Expected VOR for a position at an overall pick
    pub fn lookup(&self, position: Position, overall_pick: u32) -> Expectation {
        let Some(by_pick) = self.cells.get(&position) else {
            return Expectation { value: 0.0, basis: ExpectationBasis::NoData };
        };

        if let Some(cell) = by_pick.get(&overall_pick).filter(|c| c.count > 0) {
            return Expectation {
                value: cell.mean(),
                basis: ExpectationBasis::Exact { samples: cell.count },
            };
        }

        let low = overall_pick.saturating_sub(self.window);
        let high = overall_pick.saturating_add(self.window);
        let neighbors: Vec<f64> = by_pick
            .range(low..=high)
            .filter(|(pick, cell)| **pick != overall_pick && cell.count > 0)
            .map(|(_, cell)| cell.mean())
            .collect();

        if neighbors.is_empty() {
            return Expectation { value: 0.0, basis: ExpectationBasis::NoData };
        }

        Expectation {
            value: neighbors.iter().sum::<f64>() / neighbors.len() as f64,
            basis: ExpectationBasis::Window { cells: neighbors.len() },
        }
    }

    /// Expected VOR value only
    pub fn expected(&self, position: Position, overall_pick: u32) -> f64 {
        self.lookup(position, overall_pick).value
    }

    /// Populated cells as (position -> pick -> mean VOR); every position is
    /// present, possibly empty
    pub fn to_map(&self) -> BTreeMap<Position, BTreeMap<u32, f64>> {
        Position::ALL
            .iter()
            .map(|position| {
                let picks = self
                    .cells
                    .get(position)
                    .map(|by_pick| by_pick.iter().map(|(pick, cell)| (*pick, cell.mean())).collect())
                    .unwrap_or_default();
                (*position, picks)
            })
            .collect()
    }

    /// Number of populated cells
    pub fn cell_count(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReplacementThresholds;
    use crate::types::DraftPick;

    fn resolved(position: Position, overall_pick: u32, points: f64) -> ResolvedPick {
        ResolvedPick {
            pick: DraftPick {
                season_id: 1,
                team_id: 1,
                player_id: overall_pick,
                round: 1,
                pick: overall_pick,
                overall_pick,
            },
            position,
            points,
        }
    }

    fn zero_replacement() -> ReplacementLevels {
        ReplacementLevels::estimate(&[], &ReplacementThresholds::default())
    }

    #[test]
    fn test_exact_cell_is_historical_average() {
        let picks = vec![
            resolved(Position::RB, 3, 200.0),
            resolved(Position::RB, 3, 100.0),
            resolved(Position::RB, 4, 90.0),
        ];
        let table = ExpectedValueTable::build(&picks, &zero_replacement(), 5);

        let expectation = table.lookup(Position::RB, 3);
        assert_eq!(expectation.value, 150.0);
        assert_eq!(expectation.basis, ExpectationBasis::Exact { samples: 2 });
        assert!(!expectation.basis.is_low_confidence());
    }

    #[test]
    fn test_vor_subtracts_replacement_level() {
        let picks = vec![
            resolved(Position::WR, 1, 100.0),
            resolved(Position::WR, 2, 80.0),
            resolved(Position::WR, 3, 50.0),
            resolved(Position::WR, 4, 10.0),
        ];
        let replacement = ReplacementLevels::estimate(&picks, &ReplacementThresholds::uniform(2));
        let table = ExpectedValueTable::build(&picks, &replacement, 5);

        assert_eq!(table.expected(Position::WR, 1), 35.0);
        assert_eq!(table.expected(Position::WR, 4), -55.0);
    }

    #[test]
    fn test_window_fallback_averages_populated_neighbors() {
        let picks = vec![
            resolved(Position::TE, 20, 100.0),
            resolved(Position::TE, 20, 60.0),
            resolved(Position::TE, 26, 40.0),
        ];
        let table = ExpectedValueTable::build(&picks, &zero_replacement(), 5);

        // cell 20 mean 80 and cell 26 mean 40 both lie within 5 of pick 23
        let expectation = table.lookup(Position::TE, 23);
        assert_eq!(expectation.value, 60.0);
        assert_eq!(expectation.basis, ExpectationBasis::Window { cells: 2 });
        assert!(expectation.basis.is_low_confidence());
    }

    #[test]
    fn test_window_is_symmetric_and_bounded() {
        let base = vec![resolved(Position::QB, 47, 30.0)];
        let table = ExpectedValueTable::build(&base, &zero_replacement(), 5);
        assert_eq!(table.expected(Position::QB, 50), 30.0);

        // a populated cell three picks above changes the fallback
        let mut inside = base.clone();
        inside.push(resolved(Position::QB, 53, 90.0));
        let table = ExpectedValueTable::build(&inside, &zero_replacement(), 5);
        assert_eq!(table.expected(Position::QB, 50), 60.0);

        // a populated cell six picks above does not
        let mut outside = base;
        outside.push(resolved(Position::QB, 56, 90.0));
        let table = ExpectedValueTable::build(&outside, &zero_replacement(), 5);
        assert_eq!(table.expected(Position::QB, 50), 30.0);
    }

    #[test]
    fn test_no_data_returns_zero() {
        let picks = vec![resolved(Position::K, 150, 120.0)];
        let table = ExpectedValueTable::build(&picks, &zero_replacement(), 5);

        let far = table.lookup(Position::K, 100);
        assert_eq!(far.value, 0.0);
        assert_eq!(far.basis, ExpectationBasis::NoData);

        let other_position = table.lookup(Position::DST, 150);
        assert_eq!(other_position.basis, ExpectationBasis::NoData);
    }

    #[test]
    fn test_window_near_first_pick_does_not_underflow() {
        let picks = vec![resolved(Position::RB, 4, 75.0)];
        let table = ExpectedValueTable::build(&picks, &zero_replacement(), 5);
        assert_eq!(table.expected(Position::RB, 1), 75.0);
    }

    #[test]
    fn test_to_map_lists_every_position() {
        let picks = vec![resolved(Position::RB, 4, 75.0), resolved(Position::RB, 9, 25.0)];
        let table = ExpectedValueTable::build(&picks, &zero_replacement(), 5);

        let map = table.to_map();
        assert_eq!(map.len(), 6);
        assert_eq!(map[&Position::RB].len(), 2);
        assert!(map[&Position::QB].is_empty());
        assert_eq!(table.cell_count(), 2);
    }
}
