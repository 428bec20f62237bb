//! # Performance Aggregation
//!
//! Collapses roster entries into one season point total per player, and joins
//! draft picks with the drafted player's position and season output.

use crate::store::CorpusIndex;
use crate::types::{DraftPick, PlayerId, Position, RosterEntry, SeasonId};
use std::collections::HashMap;
use tracing::debug;

/// Season point totals keyed by (player, season)
#[derive(Debug, Clone, Default)]
pub struct PointsTable {
    totals: HashMap<(PlayerId, SeasonId), f64>,
}

impl PointsTable {
    /// Sum every entry sharing a (player, season) key.
    ///
    /// Weekly rows and pre-summed season rows are both valid input; they are
    /// simply added together.
    pub fn from_entries(entries: &[RosterEntry]) -> Self {
        let mut totals: HashMap<(PlayerId, SeasonId), f64> = HashMap::new();
        for entry in entries {
            *totals.entry((entry.player_id, entry.season_id)).or_insert(0.0) += entry.points;
        }
        Self { totals }
    }

    /// Season total for a player, `0.0` when nothing was recorded
    pub fn points(&self, player_id: PlayerId, season_id: SeasonId) -> f64 {
        self.totals.get(&(player_id, season_id)).copied().unwrap_or(0.0)
    }

    /// Number of (player, season) keys with at least one entry
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// A draft pick joined with its player's position and season output
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPick {
    pub pick: DraftPick,
    pub position: Position,
    pub points: f64,
}

/// Join picks with positions and season totals.
///
/// Picks whose player is absent from the corpus cannot be positioned and are
/// skipped; the skip count is returned alongside the resolved picks.
pub fn resolve_picks(
    picks: &[DraftPick],
    index: &CorpusIndex<'_>,
    points: &PointsTable,
) -> (Vec<ResolvedPick>, usize) {
    let mut resolved = Vec::with_capacity(picks.len());
    let mut skipped = 0;

    for pick in picks {
        let Some(player) = index.player(pick.player_id) else {
            debug!(
                "Skipping pick {} of season {}: unknown player {}",
                pick.overall_pick, pick.season_id, pick.player_id
            );
            skipped += 1;
            continue;
        };

        resolved.push(ResolvedPick {
            pick: pick.clone(),
            position: player.canonical_position(),
            points: points.points(pick.player_id, pick.season_id),
        });
    }

    (resolved, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Corpus;
    use crate::types::Player;

    fn entry(player_id: PlayerId, season_id: SeasonId, week: Option<u32>, points: f64) -> RosterEntry {
        RosterEntry { team_id: 1, player_id, season_id, week, points }
    }

    #[test]
    fn test_weekly_rows_are_summed() {
        let table = PointsTable::from_entries(&[
            entry(1, 2023, Some(1), 12.5),
            entry(1, 2023, Some(2), 7.5),
            entry(1, 2024, Some(1), 3.0),
        ]);

        assert_eq!(table.points(1, 2023), 20.0);
        assert_eq!(table.points(1, 2024), 3.0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_weekly_and_combined_rows_mix() {
        let table = PointsTable::from_entries(&[
            entry(5, 1, None, 150.0),
            entry(5, 1, Some(17), 10.0),
        ]);
        assert_eq!(table.points(5, 1), 160.0);
    }

    #[test]
    fn test_missing_key_defaults_to_zero() {
        let table = PointsTable::from_entries(&[]);
        assert!(table.is_empty());
        assert_eq!(table.points(42, 1), 0.0);
    }

    #[test]
    fn test_resolve_skips_unknown_players() {
        let corpus = Corpus {
            players: vec![Player {
                id: 1,
                name: "Travis Kelce".to_string(),
                position: "te".to_string(),
                nfl_team: Some("KC".to_string()),
            }],
            ..Default::default()
        };
        let picks = vec![
            DraftPick { season_id: 9, team_id: 1, player_id: 1, round: 2, pick: 3, overall_pick: 15 },
            DraftPick { season_id: 9, team_id: 1, player_id: 2, round: 3, pick: 3, overall_pick: 27 },
        ];
        let points = PointsTable::from_entries(&[entry(1, 9, None, 180.0)]);

        let (resolved, skipped) = resolve_picks(&picks, &corpus.index(), &points);

        assert_eq!(skipped, 1);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].position, Position::TE);
        assert_eq!(resolved[0].points, 180.0);
    }
}
